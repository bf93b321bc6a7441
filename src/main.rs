// src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

// Declaración de nuestros módulos
mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::AppState;
use crate::middleware::auth::auth_guard;
use crate::middleware::tenancy::tenant_guard;

#[tokio::main]
async fn main() {
    // Inicializa el logger
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() está bien aquí: si la configuración falla, la aplicación
    // no debe arrancar.
    let app_state = AppState::new()
        .await
        .expect("Falló la inicialización del estado de la aplicación.");

    // Corre las migraciones de SQLx al arrancar
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Fallaron las migraciones de la base de datos.");

    tracing::info!("✅ Migraciones de la base de datos ejecutadas con éxito!");

    // Rutas de autenticación (públicas)
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    // Rutas de usuario (protegidas por el guard de token)
    let user_routes = Router::new()
        .route("/me", get(handlers::auth::get_me))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // El núcleo: órdenes de trabajo y su ciclo de vida. Todo detrás del
    // guard de tenant (token + X-Tenant-ID + membresía).
    let work_order_routes = Router::new()
        .route(
            "/",
            post(handlers::work_orders::create_work_order)
                .get(handlers::work_orders::list_work_orders),
        )
        .route("/{work_order_id}", get(handlers::work_orders::get_work_order))
        .route(
            "/{work_order_id}/transition",
            post(handlers::work_orders::transition_work_order),
        )
        .route(
            "/{work_order_id}/cancel",
            post(handlers::work_orders::cancel_work_order),
        )
        .route(
            "/{work_order_id}/items",
            post(handlers::work_orders::add_work_order_item)
                .get(handlers::work_orders::list_work_order_items),
        )
        .route(
            "/{work_order_id}/expenses",
            post(handlers::work_orders::add_work_order_expense),
        )
        .route(
            "/{work_order_id}/purchase-orders",
            post(handlers::procurement::create_purchase_order),
        )
        .route(
            "/{work_order_id}/internal-tickets",
            post(handlers::procurement::create_internal_ticket),
        )
        .route(
            "/{work_order_id}/items/{item_id}/consume-stock",
            post(handlers::procurement::consume_stock_for_item),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            tenant_guard,
        ));

    // Alertas por vehículo: la antesala de la creación de órdenes
    let vehicle_routes = Router::new()
        .route(
            "/{vehicle_id}/alerts",
            get(handlers::work_orders::list_vehicle_alerts),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            tenant_guard,
        ));

    // Combina todo en el router principal
    let app = Router::new()
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", docs::ApiDoc::openapi()))
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/permissions", get(handlers::rbac::list_permissions))
        .nest("/api/auth", auth_routes)
        .nest("/api/users", user_routes)
        .nest("/api/work-orders", work_order_routes)
        .nest("/api/vehicles", vehicle_routes)
        .with_state(app_state);

    // Arranca el servidor
    let addr = "0.0.0.0:3000";
    let listener = TcpListener::bind(addr)
        .await
        .expect("Falló el arranque del listener TCP");
    tracing::info!("🚀 Servidor escuchando en {}", listener.local_addr().unwrap());
    axum::serve(listener, app).await.expect("Error en el servidor Axum");
}
