//! Genre endpoints

use axum::{extract::State, Json};

use crate::{
    error::AppResult,
    models::{genre::Genre, user::Role},
};

use super::AuthenticatedUser;

/// List genres
#[utoipa::path(
    get,
    path = "/genres",
    tag = "books",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All genres", body = Vec<Genre>)
    )
)]
pub async fn list_genres(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<Genre>>> {
    claims.require_any(&[Role::Member, Role::Staff, Role::Admin])?;

    let genres = state.services.catalog.list_genres().await?;
    Ok(Json(genres))
}
