// src/db/fleet_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, models::fleet::Vehicle};

#[derive(Clone)]
pub struct FleetRepository {
    #[allow(dead_code)]
    pool: PgPool,
}

impl FleetRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Búsqueda siempre acotada al tenant: un vehículo ajeno simplemente
    // "no existe" para el llamador.
    pub async fn find_vehicle<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        vehicle_id: Uuid,
    ) -> Result<Option<Vehicle>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let vehicle = sqlx::query_as::<_, Vehicle>(
            r#"
            SELECT id, tenant_id, license_plate, brand, line, vehicle_type,
                   mileage, created_at, updated_at
            FROM vehicles
            WHERE tenant_id = $1 AND id = $2
            "#,
        )
        .bind(tenant_id)
        .bind(vehicle_id)
        .fetch_optional(executor)
        .await?;

        Ok(vehicle)
    }
}
