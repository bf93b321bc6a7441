// src/handlers/procurement.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::{db_utils::get_rls_connection, error::AppError},
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{PermWorkOrdersExecute, RequirePermission},
        tenancy::TenantContext,
    },
    models::procurement::{InternalTicket, PurchaseOrder},
    models::work_orders::WorkOrderItem,
};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePurchaseOrderPayload {
    pub provider_id: Uuid,
    pub item_ids: Vec<Uuid>,
    pub notes: Option<String>,
}

// POST /api/work-orders/{id}/purchase-orders
#[utoipa::path(
    post,
    path = "/api/work-orders/{work_order_id}/purchase-orders",
    tag = "Procurement",
    request_body = CreatePurchaseOrderPayload,
    responses(
        (status = 201, description = "Orden de compra creada; ítems cerrados como EXTERNAL_INVOICE", body = PurchaseOrder),
        (status = 409, description = "Algún ítem ya fue enrutado")
    ),
    params(
        ("work_order_id" = Uuid, Path, description = "ID de la orden de trabajo"),
        ("x-tenant-id" = Uuid, Header, description = "ID del tenant")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_purchase_order(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _perm: RequirePermission<PermWorkOrdersExecute>,
    Path(work_order_id): Path<Uuid>,
    Json(payload): Json<CreatePurchaseOrderPayload>,
) -> Result<impl IntoResponse, AppError> {
    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user).await?;

    let po = app_state
        .procurement_service
        .create_purchase_order(
            &mut rls_conn,
            tenant.0,
            user.0.id,
            work_order_id,
            payload.provider_id,
            &payload.item_ids,
            payload.notes.as_deref(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(po)))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateInternalTicketPayload {
    pub technician_id: Uuid,
    pub item_ids: Vec<Uuid>,
    pub notes: Option<String>,
}

// POST /api/work-orders/{id}/internal-tickets
#[utoipa::path(
    post,
    path = "/api/work-orders/{work_order_id}/internal-tickets",
    tag = "Procurement",
    request_body = CreateInternalTicketPayload,
    responses(
        (status = 201, description = "Ticket interno creado; ítems cerrados como INTERNAL_TICKET", body = InternalTicket),
        (status = 409, description = "Algún ítem ya fue enrutado")
    ),
    params(
        ("work_order_id" = Uuid, Path, description = "ID de la orden de trabajo"),
        ("x-tenant-id" = Uuid, Header, description = "ID del tenant")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_internal_ticket(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _perm: RequirePermission<PermWorkOrdersExecute>,
    Path(work_order_id): Path<Uuid>,
    Json(payload): Json<CreateInternalTicketPayload>,
) -> Result<impl IntoResponse, AppError> {
    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user).await?;

    let ticket = app_state
        .procurement_service
        .create_internal_ticket(
            &mut rls_conn,
            tenant.0,
            user.0.id,
            work_order_id,
            payload.technician_id,
            &payload.item_ids,
            payload.notes.as_deref(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(ticket)))
}

// POST /api/work-orders/{id}/items/{item_id}/consume-stock
#[utoipa::path(
    post,
    path = "/api/work-orders/{work_order_id}/items/{item_id}/consume-stock",
    tag = "Procurement",
    responses(
        (status = 200, description = "Ítem cerrado contra el stock interno", body = WorkOrderItem),
        (status = 409, description = "Stock insuficiente o ítem ya enrutado")
    ),
    params(
        ("work_order_id" = Uuid, Path, description = "ID de la orden de trabajo"),
        ("item_id" = Uuid, Path, description = "ID del ítem"),
        ("x-tenant-id" = Uuid, Header, description = "ID del tenant")
    ),
    security(("api_jwt" = []))
)]
pub async fn consume_stock_for_item(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _perm: RequirePermission<PermWorkOrdersExecute>,
    Path((work_order_id, item_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<WorkOrderItem>, AppError> {
    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user).await?;

    let item = app_state
        .procurement_service
        .consume_stock_for_item(&mut rls_conn, tenant.0, work_order_id, item_id)
        .await?;

    Ok(Json(item))
}
