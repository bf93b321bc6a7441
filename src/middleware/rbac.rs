// src/middleware/rbac.rs

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use std::marker::PhantomData;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::tenancy::TenantContext,
    models::auth::User,
};

/// 1. El trait que define qué es una capacidad
pub trait PermissionDef: Send + Sync + 'static {
    fn slug() -> &'static str;
}

/// 2. El extractor (guardián): se declara como argumento del handler y
/// convierte "no tienes la capacidad" en Forbidden antes de cualquier mutación.
pub struct RequirePermission<T>(pub PhantomData<T>);

// 3. Implementación de FromRequestParts

impl<T, S> FromRequestParts<S> for RequirePermission<T>
where
    T: PermissionDef,
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        // A. Extrae usuario (lo insertó tenant_guard)
        let user = parts
            .extensions
            .get::<User>()
            .ok_or(AppError::InvalidToken)?;

        // B. Extrae tenant
        let tenant = parts.extensions.get::<TenantContext>().ok_or_else(|| {
            AppError::InvalidInput("Contexto de tenant no encontrado.".to_string())
        })?;

        // C. Slug de la capacidad requerida
        let required_perm = T::slug();

        // D. Verifica en el banco
        let has_permission = app_state
            .rbac_repo
            .user_has_permission(user.id, tenant.0, required_perm)
            .await?;

        if !has_permission {
            return Err(AppError::Forbidden(format!(
                "Necesitas la capacidad '{required_perm}' para realizar esta acción."
            )));
        }

        Ok(RequirePermission(PhantomData))
    }
}

// ---
// DEFINICIÓN DE LAS CAPACIDADES (TIPOS)
// ---

pub struct PermWorkOrdersCreate;
impl PermissionDef for PermWorkOrdersCreate {
    fn slug() -> &'static str {
        "workorders:create"
    }
}

pub struct PermWorkOrdersExecute;
impl PermissionDef for PermWorkOrdersExecute {
    fn slug() -> &'static str {
        "workorders:execute"
    }
}

pub struct PermWorkOrdersApprove;
impl PermissionDef for PermWorkOrdersApprove {
    fn slug() -> &'static str {
        "workorders:approve"
    }
}

pub struct PermWorkOrdersClose;
impl PermissionDef for PermWorkOrdersClose {
    fn slug() -> &'static str {
        "workorders:close"
    }
}
