// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::get_me,

        // --- RBAC ---
        handlers::rbac::list_permissions,

        // --- WORK ORDERS ---
        handlers::work_orders::list_vehicle_alerts,
        handlers::work_orders::create_work_order,
        handlers::work_orders::list_work_orders,
        handlers::work_orders::get_work_order,
        handlers::work_orders::transition_work_order,
        handlers::work_orders::cancel_work_order,
        handlers::work_orders::list_work_order_items,
        handlers::work_orders::add_work_order_item,
        handlers::work_orders::add_work_order_expense,

        // --- PROCUREMENT ---
        handlers::procurement::create_purchase_order,
        handlers::procurement::create_internal_ticket,
        handlers::procurement::consume_stock_for_item,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::User,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,

            // --- Flota y catálogo ---
            models::fleet::Vehicle,
            models::catalog::MantItemKind,
            models::catalog::MantItem,
            models::catalog::MasterPart,

            // --- Mantenimiento ---
            models::maintenance::AlertStatus,
            models::maintenance::ProgramItemStatus,
            models::maintenance::VehicleProgramItem,
            models::maintenance::MaintenanceAlert,

            // --- Work Orders ---
            models::work_orders::WorkOrderStatus,
            models::work_orders::MantType,
            models::work_orders::WorkType,
            models::work_orders::Priority,
            models::work_orders::ClosureType,
            models::work_orders::ItemSource,
            models::work_orders::WorkOrderItemStatus,
            models::work_orders::WorkOrder,
            models::work_orders::WorkOrderItem,
            models::work_orders::WorkOrderItemDetail,
            models::work_orders::WorkOrderExpense,

            // --- Procurement ---
            models::procurement::PurchaseOrder,
            models::procurement::InternalTicket,

            // --- Inventario y finanzas ---
            models::inventory::StockLevel,
            models::inventory::StockAvailability,
            models::finance::FinancialAlertKind,
            models::finance::FinancialAlert,

            // --- RBAC ---
            models::rbac::Permission,

            // --- Payloads ---
            handlers::work_orders::CreateWorkOrderPayload,
            handlers::work_orders::TransitionWorkOrderPayload,
            handlers::work_orders::AddWorkOrderItemPayload,
            handlers::work_orders::AddExpensePayload,
            handlers::procurement::CreatePurchaseOrderPayload,
            handlers::procurement::CreateInternalTicketPayload,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticación y registro"),
        (name = "Users", description = "Datos del usuario autenticado"),
        (name = "RBAC", description = "Control de acceso (capacidades)"),
        (name = "WorkOrders", description = "Ciclo de vida de órdenes de trabajo"),
        (name = "Procurement", description = "Órdenes de compra, tickets internos y stock")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
