//! User role routes

use crate::error::ApiResult;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use identity_shared::validation::validate_user_id;
use identity_shared::IsAdminResponse;

/// Create user routes
pub fn user_routes() -> Router<AppState> {
    Router::new().route("/:user_id/admin", get(is_admin))
}

/// Whether a user holds the admin role
///
/// GET /api/v1/users/:user_id/admin
async fn is_admin(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<IsAdminResponse>> {
    validate_user_id(user_id)?;

    let is_admin = state.auth().is_admin(user_id).await?;
    Ok(Json(IsAdminResponse { user_id, is_admin }))
}
