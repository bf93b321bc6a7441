pub mod auth;
pub mod cost_resolver;
pub mod inventory_service;
pub mod procurement_service;
pub mod state_machine;
pub mod watchdog_service;
pub mod work_order_service;
