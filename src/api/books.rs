//! Catalog endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        book::{Book, BookSummary, CreateBook},
        user::Role,
    },
};

use super::AuthenticatedUser;

/// List the approved catalog
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Approved books", body = Vec<BookSummary>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_books(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<BookSummary>>> {
    claims.require_any(&[Role::Member, Role::Staff, Role::Admin])?;

    let books = state.services.catalog.list_books().await?;
    Ok(Json(books))
}

/// Get an approved book
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book details", body = Book),
        (status = 400, description = "Book not found or not approved")
    )
)]
pub async fn get_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(book_id): Path<i32>,
) -> AppResult<Json<Book>> {
    claims.require_any(&[Role::Member, Role::Staff, Role::Admin])?;

    let book = state.services.catalog.get_book(book_id).await?;
    Ok(Json(book))
}

/// Submit a book for approval (staff)
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    security(("bearer_auth" = [])),
    request_body = CreateBook,
    responses(
        (status = 201, description = "Book submitted, pending approval", body = Book),
        (status = 400, description = "Invalid request"),
        (status = 403, description = "Staff privileges required")
    )
)]
pub async fn create_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateBook>,
) -> AppResult<(StatusCode, Json<Book>)> {
    claims.require_staff()?;

    let book = state
        .services
        .catalog
        .create_book(request, claims.user_id)
        .await?;

    Ok((StatusCode::CREATED, Json(book)))
}
