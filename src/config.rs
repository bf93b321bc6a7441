// src/config.rs

use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, time::Duration};

use crate::db::{
    AlertRepository, CatalogRepository, FinanceRepository, FleetRepository, InventoryRepository,
    ProcurementRepository, RbacRepository, UserRepository, WorkOrderRepository,
};
use crate::services::{
    auth::AuthService, inventory_service::InventoryService,
    procurement_service::ProcurementService, watchdog_service::WatchdogService,
    work_order_service::WorkOrderService,
};

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub auth_service: AuthService,
    pub rbac_repo: RbacRepository,
    pub work_order_service: WorkOrderService,
    pub procurement_service: ProcurementService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL debe estar definida");
        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET debe estar definido");

        // Conecta a la base de datos, propagando errores con '?'
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexión con la base de datos establecida con éxito!");

        // --- Arma el grafo de dependencias ---
        let user_repo = UserRepository::new(db_pool.clone());
        let rbac_repo = RbacRepository::new(db_pool.clone());
        let fleet_repo = FleetRepository::new(db_pool.clone());
        let catalog_repo = CatalogRepository::new(db_pool.clone());
        let alert_repo = AlertRepository::new(db_pool.clone());
        let work_order_repo = WorkOrderRepository::new(db_pool.clone());
        let procurement_repo = ProcurementRepository::new(db_pool.clone());
        let inventory_repo = InventoryRepository::new(db_pool.clone());
        let finance_repo = FinanceRepository::new(db_pool.clone());

        let auth_service = AuthService::new(user_repo.clone(), jwt_secret, db_pool.clone());
        let inventory_service = InventoryService::new(inventory_repo);
        let watchdog = WatchdogService::new(
            finance_repo,
            catalog_repo.clone(),
            work_order_repo.clone(),
            db_pool.clone(),
        );
        let work_order_service = WorkOrderService::new(
            work_order_repo.clone(),
            alert_repo,
            fleet_repo,
            catalog_repo,
            inventory_service.clone(),
            watchdog,
        );
        let procurement_service = ProcurementService::new(
            procurement_repo,
            work_order_repo,
            user_repo,
            inventory_service,
        );

        Ok(Self {
            db_pool,
            auth_service,
            rbac_repo,
            work_order_service,
            procurement_service,
        })
    }
}
