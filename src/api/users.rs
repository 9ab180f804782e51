//! User endpoints

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    error::{AppError, AppResult},
    models::{loan::LoanDetails, user::Role},
};

use super::AuthenticatedUser;

/// Get loans for a specific user
#[utoipa::path(
    get,
    path = "/users/{id}/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User's loans", body = Vec<LoanDetails>),
        (status = 403, description = "Members may only view their own loans"),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user_loans(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(user_id): Path<i32>,
) -> AppResult<Json<Vec<LoanDetails>>> {
    if claims.role == Role::Member && user_id != claims.user_id {
        return Err(AppError::Authorization(
            "Members may only view their own loans".to_string(),
        ));
    }
    claims.require_any(&[Role::Member, Role::Staff, Role::Admin])?;

    let loans = state.services.loans.get_user_loans(user_id).await?;
    Ok(Json(loans))
}
