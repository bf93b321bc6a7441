// src/db/catalog_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::catalog::{MantItem, MasterPart},
};

#[derive(Clone)]
pub struct CatalogRepository {
    #[allow(dead_code)]
    pool: PgPool,
}

impl CatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_mant_item<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        mant_item_id: Uuid,
    ) -> Result<Option<MantItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let item = sqlx::query_as::<_, MantItem>(
            r#"
            SELECT id, tenant_id, name, kind, category, master_part_id, created_at
            FROM mant_items
            WHERE tenant_id = $1 AND id = $2
            "#,
        )
        .bind(tenant_id)
        .bind(mant_item_id)
        .fetch_optional(executor)
        .await?;

        Ok(item)
    }

    pub async fn find_master_part<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        master_part_id: Uuid,
    ) -> Result<Option<MasterPart>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let part = sqlx::query_as::<_, MasterPart>(
            r#"
            SELECT id, tenant_id, part_code, description, reference_price, created_at
            FROM master_parts
            WHERE tenant_id = $1 AND id = $2
            "#,
        )
        .bind(tenant_id)
        .bind(master_part_id)
        .fetch_optional(executor)
        .await?;

        Ok(part)
    }
}
