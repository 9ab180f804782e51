//! API handlers for Pustaka REST endpoints

pub mod approvals;
pub mod books;
pub mod genres;
pub mod health;
pub mod loans;
pub mod openapi;
pub mod settings;
pub mod users;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use axum_extra::extract::cookie::CookieJar;

use crate::{error::AppError, models::user::Claims, AppState};

/// Cookie names probed for a credential, in order. Kept for compatibility
/// with the existing web clients.
const TOKEN_COOKIES: [&str; 4] = ["token", "session", "auth-token", "jwt"];

/// Pull the signed credential out of a request: cookies first (in the
/// order above), then the Authorization bearer header. First non-empty
/// wins.
fn extract_token(parts: &Parts) -> Option<String> {
    let jar = CookieJar::from_headers(&parts.headers);
    for name in TOKEN_COOKIES {
        if let Some(cookie) = jar.get(name) {
            if !cookie.value().is_empty() {
                return Some(cookie.value().to_string());
            }
        }
    }

    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .filter(|token| !token.is_empty())
        .map(|token| token.to_string())
}

/// Extractor for the authenticated caller's role claims
pub struct AuthenticatedUser(pub Claims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = extract_token(parts)
            .ok_or_else(|| AppError::Authentication("Missing credential".to_string()))?;

        // Fails closed: bad signature, expiry and unknown roles all end here
        let claims = Claims::from_token(&token, &state.config.auth.jwt_secret).map_err(|e| {
            tracing::warn!("credential rejected: {}", e);
            AppError::Authentication("Invalid or expired credential".to_string())
        })?;

        Ok(AuthenticatedUser(claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with_headers(headers: &[(&str, &str)]) -> Parts {
        let mut builder = Request::builder().uri("/");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn bearer_header_is_used_when_no_cookie() {
        let parts = parts_with_headers(&[("authorization", "Bearer abc")]);
        assert_eq!(extract_token(&parts).as_deref(), Some("abc"));
    }

    #[test]
    fn cookie_wins_over_bearer_header() {
        let parts = parts_with_headers(&[
            ("cookie", "token=from-cookie"),
            ("authorization", "Bearer from-header"),
        ]);
        assert_eq!(extract_token(&parts).as_deref(), Some("from-cookie"));
    }

    #[test]
    fn cookie_names_are_probed_in_order() {
        let parts = parts_with_headers(&[("cookie", "jwt=last; session=second")]);
        assert_eq!(extract_token(&parts).as_deref(), Some("second"));
    }

    #[test]
    fn empty_cookie_falls_through() {
        let parts = parts_with_headers(&[
            ("cookie", "token="),
            ("authorization", "Bearer fallback"),
        ]);
        assert_eq!(extract_token(&parts).as_deref(), Some("fallback"));
    }

    #[test]
    fn missing_credential_yields_none() {
        let parts = parts_with_headers(&[]);
        assert_eq!(extract_token(&parts), None);

        let parts = parts_with_headers(&[("authorization", "Basic abc")]);
        assert_eq!(extract_token(&parts), None);
    }
}
