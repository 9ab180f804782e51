//! Book (catalog entry) model and approval state

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::ToSchema;
use validator::Validate;

/// Approval state of a catalog entry.
///
/// Only approved books are visible to members and borrowable; the other
/// two states exist for the staff submission pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "pending",
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::Rejected => "rejected",
        }
    }

    /// A decision has been made; pending is the only undecided state.
    pub fn is_decided(&self) -> bool {
        !matches!(self, ApprovalStatus::Pending)
    }
}

impl std::fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ApprovalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ApprovalStatus::Pending),
            "approved" => Ok(ApprovalStatus::Approved),
            "rejected" => Ok(ApprovalStatus::Rejected),
            _ => Err(format!("Invalid approval status: {}", s)),
        }
    }
}

// SQLx conversion for ApprovalStatus (stored as TEXT)
impl sqlx::Type<Postgres> for ApprovalStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for ApprovalStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for ApprovalStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <String as Encode<Postgres>>::encode(self.as_str().to_string(), buf)
    }
}

/// Decision applied to a pending book by an admin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalDecision {
    Approve,
    Reject,
}

impl ApprovalDecision {
    pub fn resulting_status(&self) -> ApprovalStatus {
        match self {
            ApprovalDecision::Approve => ApprovalStatus::Approved,
            ApprovalDecision::Reject => ApprovalStatus::Rejected,
        }
    }
}

/// Full book model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author: Option<String>,
    pub publisher: Option<String>,
    pub publication_year: Option<i16>,
    pub isbn: Option<String>,
    pub pages: Option<i32>,
    pub description: Option<String>,
    pub cover_url: Option<String>,
    pub genre_id: Option<i32>,
    pub stock_available: i32,
    pub stock_total: i32,
    pub status: ApprovalStatus,
    pub created_by: Option<i32>,
    pub approved_by: Option<i32>,
    pub approved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Catalog listing entry (approved books, with genre name joined)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookSummary {
    pub id: i32,
    pub title: String,
    pub author: Option<String>,
    pub cover_url: Option<String>,
    pub genre_id: Option<i32>,
    pub genre_name: Option<String>,
    pub stock_available: i32,
    pub stock_total: i32,
}

/// Staff book submission
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, message = "Title must not be empty"))]
    pub title: String,
    pub author: Option<String>,
    pub publisher: Option<String>,
    pub publication_year: Option<i16>,
    pub isbn: Option<String>,
    pub pages: Option<i32>,
    pub description: Option<String>,
    pub cover_url: Option<String>,
    pub genre_id: Option<i32>,
    #[validate(range(min = 0, message = "Stock must not be negative"))]
    pub stock_total: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn approval_status_round_trip() {
        for status in [
            ApprovalStatus::Pending,
            ApprovalStatus::Approved,
            ApprovalStatus::Rejected,
        ] {
            assert_eq!(status.as_str().parse::<ApprovalStatus>().unwrap(), status);
        }
        assert!("dipinjam".parse::<ApprovalStatus>().is_err());
    }

    #[test]
    fn decisions_map_to_terminal_states() {
        assert_eq!(
            ApprovalDecision::Approve.resulting_status(),
            ApprovalStatus::Approved
        );
        assert_eq!(
            ApprovalDecision::Reject.resulting_status(),
            ApprovalStatus::Rejected
        );
        assert!(ApprovalDecision::Approve.resulting_status().is_decided());
        assert!(!ApprovalStatus::Pending.is_decided());
    }
}
