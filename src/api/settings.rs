//! Fine settings endpoints (admin only)

use axum::{extract::State, Json};

use crate::{error::AppResult, models::loan::FineSettings};

use super::AuthenticatedUser;

/// Get the fine/duration policy
#[utoipa::path(
    get,
    path = "/settings/fines",
    tag = "settings",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current fine settings", body = FineSettings),
        (status = 403, description = "Administrator privileges required")
    )
)]
pub async fn get_fine_settings(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<FineSettings>> {
    claims.require_admin()?;

    let settings = state.services.settings.get_fine_settings().await?;
    Ok(Json(settings))
}

/// Update the fine/duration policy
#[utoipa::path(
    put,
    path = "/settings/fines",
    tag = "settings",
    security(("bearer_auth" = [])),
    request_body = FineSettings,
    responses(
        (status = 200, description = "Settings updated", body = FineSettings),
        (status = 400, description = "Invalid values"),
        (status = 403, description = "Administrator privileges required")
    )
)]
pub async fn update_fine_settings(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<FineSettings>,
) -> AppResult<Json<FineSettings>> {
    claims.require_admin()?;

    let settings = state.services.settings.update_fine_settings(request).await?;
    Ok(Json(settings))
}
