// src/models/rbac.rs

use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// Lo que sale del banco (tabla permissions). El catálogo es global y se
// siembra en las migraciones; los roles se arman por tenant.
#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440001")]
    pub id: Uuid,

    #[schema(example = "workorders:create")]
    pub slug: String,

    #[schema(example = "Crear órdenes de trabajo")]
    pub description: Option<String>,

    #[schema(example = "workorders")]
    pub module: Option<String>,
}
