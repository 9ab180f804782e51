//! Book approval workflow endpoints (admin only)

use axum::{extract::State, Json};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::book::{ApprovalDecision, Book},
};

use super::AuthenticatedUser;

/// Approval decision request
#[derive(Deserialize, ToSchema)]
pub struct DecideBookRequest {
    /// Book ID
    pub book_id: i32,
    /// Decision to apply
    pub decision: ApprovalDecision,
}

/// List books pending approval
#[utoipa::path(
    get,
    path = "/approvals/pending",
    tag = "approvals",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Books awaiting decision", body = Vec<Book>),
        (status = 403, description = "Administrator privileges required")
    )
)]
pub async fn list_pending_books(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<Book>>> {
    claims.require_admin()?;

    let books = state.services.approvals.pending_books().await?;
    Ok(Json(books))
}

/// Approve or reject a submitted book
#[utoipa::path(
    post,
    path = "/approvals",
    tag = "approvals",
    security(("bearer_auth" = [])),
    request_body = DecideBookRequest,
    responses(
        (status = 200, description = "Decision applied", body = Book),
        (status = 403, description = "Administrator privileges required"),
        (status = 404, description = "Book not found"),
        (status = 409, description = "Book already decided (strict mode)")
    )
)]
pub async fn decide_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<DecideBookRequest>,
) -> AppResult<Json<Book>> {
    claims.require_admin()?;

    let book = state
        .services
        .approvals
        .decide(request.book_id, request.decision, claims.user_id)
        .await?;

    Ok(Json(book))
}
