// src/handlers/work_orders.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{db_utils::get_rls_connection, error::AppError},
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{PermWorkOrdersCreate, PermWorkOrdersExecute, RequirePermission},
        tenancy::TenantContext,
    },
    models::catalog::MantItemKind,
    models::maintenance::MaintenanceAlert,
    models::work_orders::{
        ItemSource, MantType, Priority, WorkOrder, WorkOrderExpense, WorkOrderItemDetail,
        WorkOrderStatus, WorkType,
    },
    services::state_machine,
    services::work_order_service::{AddItemInput, CreateWorkOrderInput},
};

// =============================================================================
//  1. CREACIÓN (LA FÁBRICA)
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateWorkOrderPayload {
    pub vehicle_id: Uuid,

    // Vacío solo es legal para órdenes CORRECTIVE
    #[serde(default)]
    pub alert_ids: Vec<Uuid>,

    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Mantenimiento 45.000 km")]
    pub title: String,

    pub description: Option<String>,
    pub technician_id: Option<Uuid>,
    pub provider_id: Option<Uuid>,
    pub scheduled_date: Option<DateTime<Utc>>,

    #[schema(example = "MEDIUM")]
    pub priority: Option<Priority>,
    #[schema(example = "PREVENTIVE")]
    pub mant_type: Option<MantType>,
    #[schema(example = "EXTERNAL")]
    pub work_type: Option<WorkType>,
}

// POST /api/work-orders
#[utoipa::path(
    post,
    path = "/api/work-orders",
    tag = "WorkOrders",
    request_body = CreateWorkOrderPayload,
    responses(
        (status = 201, description = "Orden creada con sus ítems", body = WorkOrder),
        (status = 404, description = "Vehículo o alertas no encontrados")
    ),
    params(("x-tenant-id" = Uuid, Header, description = "ID del tenant")),
    security(("api_jwt" = []))
)]
pub async fn create_work_order(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _perm: RequirePermission<PermWorkOrdersCreate>,
    Json(payload): Json<CreateWorkOrderPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user).await?;

    let order = app_state
        .work_order_service
        .create_work_order(
            &mut rls_conn,
            tenant.0,
            &user.0,
            CreateWorkOrderInput {
                vehicle_id: payload.vehicle_id,
                alert_ids: payload.alert_ids,
                title: payload.title,
                description: payload.description,
                technician_id: payload.technician_id,
                provider_id: payload.provider_id,
                scheduled_date: payload.scheduled_date,
                priority: payload.priority,
                mant_type: payload.mant_type,
                work_type: payload.work_type,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(order)))
}

// GET /api/work-orders
#[utoipa::path(
    get,
    path = "/api/work-orders",
    tag = "WorkOrders",
    responses((status = 200, description = "Órdenes del tenant", body = [WorkOrder])),
    params(("x-tenant-id" = Uuid, Header, description = "ID del tenant")),
    security(("api_jwt" = []))
)]
pub async fn list_work_orders(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    tenant: TenantContext,
) -> Result<Json<Vec<WorkOrder>>, AppError> {
    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user).await?;

    let orders = app_state
        .work_order_service
        .list_work_orders(&mut rls_conn, tenant.0)
        .await?;

    Ok(Json(orders))
}

// GET /api/work-orders/{id}
#[utoipa::path(
    get,
    path = "/api/work-orders/{work_order_id}",
    tag = "WorkOrders",
    responses(
        (status = 200, description = "Detalle de la orden", body = WorkOrder),
        (status = 404, description = "Orden no encontrada")
    ),
    params(
        ("work_order_id" = Uuid, Path, description = "ID de la orden"),
        ("x-tenant-id" = Uuid, Header, description = "ID del tenant")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_work_order(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    tenant: TenantContext,
    Path(work_order_id): Path<Uuid>,
) -> Result<Json<WorkOrder>, AppError> {
    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user).await?;

    let order = app_state
        .work_order_service
        .get_work_order(&mut rls_conn, tenant.0, work_order_id)
        .await?;

    Ok(Json(order))
}

// GET /api/vehicles/{vehicle_id}/alerts — la antesala de la fábrica
#[utoipa::path(
    get,
    path = "/api/vehicles/{vehicle_id}/alerts",
    tag = "WorkOrders",
    responses(
        (status = 200, description = "Alertas de mantenimiento del vehículo", body = [MaintenanceAlert]),
        (status = 404, description = "Vehículo no encontrado")
    ),
    params(
        ("vehicle_id" = Uuid, Path, description = "ID del vehículo"),
        ("x-tenant-id" = Uuid, Header, description = "ID del tenant")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_vehicle_alerts(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    tenant: TenantContext,
    Path(vehicle_id): Path<Uuid>,
) -> Result<Json<Vec<MaintenanceAlert>>, AppError> {
    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user).await?;

    let alerts = app_state
        .work_order_service
        .list_vehicle_alerts(&mut rls_conn, tenant.0, vehicle_id)
        .await?;

    Ok(Json(alerts))
}

// =============================================================================
//  2. TRANSICIONES
// =============================================================================

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransitionWorkOrderPayload {
    #[schema(example = "IN_PROGRESS")]
    pub status: WorkOrderStatus,
    pub completion_mileage: Option<Decimal>,
}

// POST /api/work-orders/{id}/transition
#[utoipa::path(
    post,
    path = "/api/work-orders/{work_order_id}/transition",
    tag = "WorkOrders",
    request_body = TransitionWorkOrderPayload,
    responses(
        (status = 200, description = "Orden actualizada", body = WorkOrder),
        (status = 409, description = "Transición no permitida o ítems pendientes de cierre")
    ),
    params(
        ("work_order_id" = Uuid, Path, description = "ID de la orden"),
        ("x-tenant-id" = Uuid, Header, description = "ID del tenant")
    ),
    security(("api_jwt" = []))
)]
pub async fn transition_work_order(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    tenant: TenantContext,
    Path(work_order_id): Path<Uuid>,
    Json(payload): Json<TransitionWorkOrderPayload>,
) -> Result<Json<WorkOrder>, AppError> {
    // La capacidad depende del estado destino (ejecutar / aprobar / cerrar),
    // así que el chequeo es dinámico en lugar del extractor tipado
    let slug = state_machine::required_capability(payload.status);
    let allowed = app_state
        .rbac_repo
        .user_has_permission(user.0.id, tenant.0, slug)
        .await?;
    if !allowed {
        return Err(AppError::Forbidden(format!(
            "Necesitas la capacidad '{slug}' para realizar esta acción."
        )));
    }

    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user).await?;

    let order = app_state
        .work_order_service
        .transition_work_order(
            &mut rls_conn,
            tenant.0,
            work_order_id,
            payload.status,
            payload.completion_mileage,
        )
        .await?;

    Ok(Json(order))
}

// POST /api/work-orders/{id}/cancel
#[utoipa::path(
    post,
    path = "/api/work-orders/{work_order_id}/cancel",
    tag = "WorkOrders",
    responses(
        (status = 200, description = "Orden cancelada; sus alertas vuelven a PENDING", body = WorkOrder),
        (status = 409, description = "La orden ya está completada")
    ),
    params(
        ("work_order_id" = Uuid, Path, description = "ID de la orden"),
        ("x-tenant-id" = Uuid, Header, description = "ID del tenant")
    ),
    security(("api_jwt" = []))
)]
pub async fn cancel_work_order(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _perm: RequirePermission<PermWorkOrdersExecute>,
    Path(work_order_id): Path<Uuid>,
) -> Result<Json<WorkOrder>, AppError> {
    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user).await?;

    let order = app_state
        .work_order_service
        .cancel_work_order(&mut rls_conn, tenant.0, work_order_id)
        .await?;

    Ok(Json(order))
}

// =============================================================================
//  3. ÍTEMS
// =============================================================================

#[derive(Debug, Deserialize, ToSchema)]
pub struct ListItemsQuery {
    // Uno o varios tipos separados por coma: ?kind=PART,SERVICE
    pub kind: Option<String>,
}

// Tipos de catálogo del filtro; un valor desconocido es un rechazo, no una coerción
fn parse_kind_filter(raw: &str) -> Result<Vec<MantItemKind>, AppError> {
    raw.split(',')
        .map(|s| match s.trim().to_uppercase().as_str() {
            "PART" => Ok(MantItemKind::Part),
            "SERVICE" => Ok(MantItemKind::Service),
            "ACTION" => Ok(MantItemKind::Action),
            other => Err(AppError::InvalidInput(format!(
                "tipo de ítem desconocido: {other}"
            ))),
        })
        .collect()
}

// GET /api/work-orders/{id}/items
#[utoipa::path(
    get,
    path = "/api/work-orders/{work_order_id}/items",
    tag = "WorkOrders",
    responses(
        (status = 200, description = "Ítems con su catálogo aplanado", body = [WorkOrderItemDetail]),
        (status = 404, description = "Orden no encontrada")
    ),
    params(
        ("work_order_id" = Uuid, Path, description = "ID de la orden"),
        ("kind" = Option<String>, Query, description = "Filtro por tipo: PART, SERVICE, ACTION"),
        ("x-tenant-id" = Uuid, Header, description = "ID del tenant")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_work_order_items(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    tenant: TenantContext,
    Path(work_order_id): Path<Uuid>,
    Query(query): Query<ListItemsQuery>,
) -> Result<Json<Vec<WorkOrderItemDetail>>, AppError> {
    let kinds = match &query.kind {
        Some(raw) => Some(parse_kind_filter(raw)?),
        None => None,
    };

    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user).await?;

    let items = app_state
        .work_order_service
        .list_items(&mut rls_conn, tenant.0, work_order_id, kinds.as_deref())
        .await?;

    Ok(Json(items))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddWorkOrderItemPayload {
    pub mant_item_id: Uuid,
    pub master_part_id: Option<Uuid>,

    #[schema(example = "2.0")]
    pub quantity: Decimal,

    #[schema(example = "35000.0")]
    pub unit_price: Decimal,

    pub description: Option<String>,

    #[schema(example = "EXTERNAL")]
    pub item_source: Option<ItemSource>,
}

// POST /api/work-orders/{id}/items
#[utoipa::path(
    post,
    path = "/api/work-orders/{work_order_id}/items",
    tag = "WorkOrders",
    request_body = AddWorkOrderItemPayload,
    responses(
        (status = 201, description = "Ítem agregado", body = WorkOrderItemDetail),
        (status = 404, description = "Orden o ítem de catálogo no encontrado")
    ),
    params(
        ("work_order_id" = Uuid, Path, description = "ID de la orden"),
        ("x-tenant-id" = Uuid, Header, description = "ID del tenant")
    ),
    security(("api_jwt" = []))
)]
pub async fn add_work_order_item(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _perm: RequirePermission<PermWorkOrdersExecute>,
    Path(work_order_id): Path<Uuid>,
    Json(payload): Json<AddWorkOrderItemPayload>,
) -> Result<impl IntoResponse, AppError> {
    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user).await?;

    let item = app_state
        .work_order_service
        .add_item(
            &mut rls_conn,
            tenant.0,
            &user.0,
            work_order_id,
            AddItemInput {
                mant_item_id: payload.mant_item_id,
                master_part_id: payload.master_part_id,
                quantity: payload.quantity,
                unit_price: payload.unit_price,
                description: payload.description,
                item_source: payload.item_source,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(item)))
}

// =============================================================================
//  4. GASTOS
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddExpensePayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Transporte del vehículo al taller")]
    pub concept: String,

    #[schema(example = "20000.0")]
    pub amount: Decimal,
}

// POST /api/work-orders/{id}/expenses
#[utoipa::path(
    post,
    path = "/api/work-orders/{work_order_id}/expenses",
    tag = "WorkOrders",
    request_body = AddExpensePayload,
    responses(
        (status = 201, description = "Gasto registrado (entra al costo real al cerrar)", body = WorkOrderExpense),
        (status = 404, description = "Orden no encontrada")
    ),
    params(
        ("work_order_id" = Uuid, Path, description = "ID de la orden"),
        ("x-tenant-id" = Uuid, Header, description = "ID del tenant")
    ),
    security(("api_jwt" = []))
)]
pub async fn add_work_order_expense(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _perm: RequirePermission<PermWorkOrdersExecute>,
    Path(work_order_id): Path<Uuid>,
    Json(payload): Json<AddExpensePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user).await?;

    let expense = app_state
        .work_order_service
        .add_expense(
            &mut rls_conn,
            tenant.0,
            &user.0,
            work_order_id,
            &payload.concept,
            payload.amount,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(expense)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filtro_de_tipos_acepta_lista_separada_por_comas() {
        let kinds = parse_kind_filter("PART, service").unwrap();
        assert_eq!(kinds, vec![MantItemKind::Part, MantItemKind::Service]);
    }

    #[test]
    fn filtro_de_tipos_rechaza_valores_desconocidos() {
        let err = parse_kind_filter("PART,REPUESTO").unwrap_err();
        match err {
            AppError::InvalidInput(msg) => assert!(msg.contains("REPUESTO")),
            other => panic!("se esperaba InvalidInput, llegó {other:?}"),
        }
    }
}
