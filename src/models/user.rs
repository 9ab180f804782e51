//! User model and role credential types

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::error::AppError;

/// User roles carried in the signed credential.
///
/// The numeric ids are part of the wire contract with existing clients
/// and must not be renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i16)]
#[serde(into = "i16", try_from = "i16")]
pub enum Role {
    Member = 2,
    Staff = 3,
    Admin = 4,
}

impl Role {
    pub fn name(&self) -> &'static str {
        match self {
            Role::Member => "Member",
            Role::Staff => "Staff",
            Role::Admin => "Admin",
        }
    }
}

impl TryFrom<i16> for Role {
    type Error = String;

    // Unknown role ids fail closed rather than defaulting to a role.
    fn try_from(v: i16) -> Result<Self, Self::Error> {
        match v {
            2 => Ok(Role::Member),
            3 => Ok(Role::Staff),
            4 => Ok(Role::Admin),
            other => Err(format!("Unknown role id: {}", other)),
        }
    }
}

impl From<Role> for i16 {
    fn from(r: Role) -> Self {
        r as i16
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// User record. Authentication (login, passwords) is handled by the
/// identity service that issues the credentials; this table only anchors
/// loans and book submissions.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: Option<String>,
    pub role_id: i16,
    pub created_at: DateTime<Utc>,
}

/// JWT claims for authenticated callers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub user_id: i32,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user_id: i32, username: &str, role: Role, valid_hours: u64) -> Self {
        let now = Utc::now();
        Self {
            sub: username.to_string(),
            user_id,
            role,
            iat: now.timestamp(),
            exp: (now + Duration::hours(valid_hours as i64)).timestamp(),
        }
    }

    /// Sign the claims into a compact JWT
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Verify signature and expiry, returning the claims
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    /// Gate an operation to the given roles. Denials are logged.
    pub fn require_any(&self, allowed: &[Role]) -> Result<(), AppError> {
        if allowed.contains(&self.role) {
            Ok(())
        } else {
            tracing::warn!(
                user_id = self.user_id,
                role = %self.role,
                required = ?allowed.iter().map(Role::name).collect::<Vec<_>>(),
                "access denied: role not allowed"
            );
            Err(AppError::Authorization(format!(
                "Role {} not allowed for this operation",
                self.role
            )))
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Require admin privileges
    pub fn require_admin(&self) -> Result<(), AppError> {
        self.require_any(&[Role::Admin])
    }

    /// Require staff or admin privileges
    pub fn require_staff(&self) -> Result<(), AppError> {
        self.require_any(&[Role::Staff, Role::Admin])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn role_ids_round_trip() {
        for role in [Role::Member, Role::Staff, Role::Admin] {
            assert_eq!(Role::try_from(i16::from(role)).unwrap(), role);
        }
    }

    #[test]
    fn unknown_role_id_is_rejected() {
        assert!(Role::try_from(0).is_err());
        assert!(Role::try_from(1).is_err());
        assert!(Role::try_from(5).is_err());
    }

    #[test]
    fn token_round_trip() {
        let claims = Claims::new(42, "budi", Role::Member, 1);
        let token = claims.create_token(SECRET).unwrap();
        let parsed = Claims::from_token(&token, SECRET).unwrap();
        assert_eq!(parsed.user_id, 42);
        assert_eq!(parsed.sub, "budi");
        assert_eq!(parsed.role, Role::Member);
    }

    #[test]
    fn tampered_signature_is_rejected() {
        let claims = Claims::new(1, "admin", Role::Admin, 1);
        let token = claims.create_token(SECRET).unwrap();
        assert!(Claims::from_token(&token, "other-secret").is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let now = Utc::now();
        let claims = Claims {
            sub: "budi".to_string(),
            user_id: 42,
            role: Role::Member,
            iat: (now - Duration::hours(2)).timestamp(),
            exp: (now - Duration::hours(1)).timestamp(),
        };
        let token = claims.create_token(SECRET).unwrap();
        assert!(Claims::from_token(&token, SECRET).is_err());
    }

    #[test]
    fn role_gate_fails_closed() {
        let member = Claims::new(1, "budi", Role::Member, 1);
        assert!(member.require_any(&[Role::Member, Role::Admin]).is_ok());
        assert!(member.require_admin().is_err());
        assert!(member.require_staff().is_err());

        let staff = Claims::new(2, "sari", Role::Staff, 1);
        assert!(staff.require_staff().is_ok());
        assert!(staff.require_admin().is_err());

        let admin = Claims::new(3, "root", Role::Admin, 1);
        assert!(admin.require_admin().is_ok());
        assert!(admin.require_staff().is_ok());
    }
}
