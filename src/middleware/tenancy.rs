// src/middleware/tenancy.rs

use axum::{
    extract::{FromRequestParts, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::{common::error::AppError, config::AppState, middleware::auth::authenticate};

// El nombre de nuestro encabezado HTTP personalizado
const TENANT_ID_HEADER: &str = "x-tenant-id";

// El extractor: guarda el UUID del tenant al que el usuario quiere acceder.
#[derive(Debug, Clone, Copy)]
pub struct TenantContext(pub Uuid);

impl<S> FromRequestParts<S> for TenantContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<TenantContext>()
            .copied()
            .ok_or_else(|| AppError::InvalidInput("Contexto de tenant no encontrado.".to_string()))
    }
}

// Middleware: token válido + encabezado X-Tenant-ID + membresía activa.
// Todas las rutas del núcleo pasan por aquí.
pub async fn tenant_guard(
    State(app_state): State<AppState>,
    mut request: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, AppError> {
    // 1. Autentica (mismo camino que auth_guard)
    let user = authenticate(&app_state, request.headers()).await?;

    // 2. Lee y parsea el encabezado X-Tenant-ID
    let header_value = request
        .headers()
        .get(TENANT_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| {
            AppError::InvalidInput("El encabezado X-Tenant-ID es obligatorio.".to_string())
        })?;

    let tenant_id = Uuid::parse_str(header_value).map_err(|_| {
        AppError::InvalidInput("Encabezado X-Tenant-ID inválido (no es un UUID).".to_string())
    })?;

    // 3. Verifica membresía activa. Un tenant ajeno responde igual que uno
    // inexistente: jamás filtramos existencia entre tenants.
    let is_member = app_state
        .rbac_repo
        .is_active_member(user.id, tenant_id)
        .await?;

    if !is_member {
        return Err(AppError::NotFound("Tenant no encontrado.".to_string()));
    }

    request.extensions_mut().insert(user);
    request.extensions_mut().insert(TenantContext(tenant_id));
    Ok(next.run(request).await)
}
