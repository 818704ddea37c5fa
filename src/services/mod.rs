//! Business logic services layer

pub mod audit_service;
pub mod auth_service;
pub mod order_service;
pub mod product_service;
pub mod stock_service;
pub mod supplier_service;
pub mod user_service;
pub mod warehouse_service;

pub use audit_service::AuditService;
pub use auth_service::AuthService;
pub use order_service::OrderService;
pub use product_service::ProductService;
pub use stock_service::StockService;
pub use supplier_service::SupplierService;
pub use user_service::UserService;
pub use warehouse_service::WarehouseService;
