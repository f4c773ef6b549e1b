pub mod library_store;
pub mod notification_service;
pub mod payment_gateway;

pub use library_store::LibraryStore;
pub use notification_service::NotificationService;
pub use payment_gateway::PaymentGateway;
