pub mod book_repository;
pub mod borrowing_repository;
pub mod notification_service;
pub mod pagination;
pub mod payment_gateway;
pub mod payment_repository;
pub mod user_repository;

pub use book_repository::BookRepository;
pub use borrowing_repository::{BorrowingFilter, BorrowingRepository, CloseOutcome, OpenOutcome};
pub use notification_service::NotificationService;
pub use pagination::{Page, PageRequest};
pub use payment_gateway::{
    CheckoutRequest, CheckoutSession, GatewayError, PaymentGateway, SessionStatus,
};
pub use payment_repository::PaymentRepository;
pub use user_repository::UserRepository;
