pub mod book_repository;
pub mod borrowing_repository;
pub mod payment_repository;
pub mod user_repository;

mod row_error;

// パブリックに型を再エクスポート
pub use book_repository::BookRepository as PostgresBookRepository;
pub use borrowing_repository::BorrowingRepository as PostgresBorrowingRepository;
pub use payment_repository::PaymentRepository as PostgresPaymentRepository;
pub use user_repository::UserRepository as PostgresUserRepository;
