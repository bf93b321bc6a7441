// src/handlers/rbac.rs

use axum::{extract::State, Json};

use crate::{common::error::AppError, config::AppState, models::rbac::Permission};

// GET /api/permissions (para que el frontend sepa qué mostrar al armar roles)
#[utoipa::path(
    get,
    path = "/api/permissions",
    tag = "RBAC",
    responses((status = 200, description = "Catálogo de capacidades", body = [Permission]))
)]
pub async fn list_permissions(
    State(app_state): State<AppState>,
) -> Result<Json<Vec<Permission>>, AppError> {
    let permissions = app_state.rbac_repo.list_all_permissions().await?;
    Ok(Json(permissions))
}
