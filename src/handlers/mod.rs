pub mod auth;
pub mod procurement;
pub mod rbac;
pub mod work_orders;
