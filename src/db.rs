pub mod user_repo;
pub use user_repo::UserRepository;
pub mod rbac_repo;
pub use rbac_repo::RbacRepository;
pub mod fleet_repo;
pub use fleet_repo::FleetRepository;
pub mod catalog_repo;
pub use catalog_repo::CatalogRepository;
pub mod alert_repo;
pub use alert_repo::AlertRepository;
pub mod work_order_repo;
pub use work_order_repo::WorkOrderRepository;
pub mod procurement_repo;
pub use procurement_repo::ProcurementRepository;
pub mod inventory_repo;
pub use inventory_repo::InventoryRepository;
pub mod finance_repo;
pub use finance_repo::FinanceRepository;
