mod borrowing_service;
mod errors;
mod overdue_detection;

pub use borrowing_service::{
    BorrowingCreation, BorrowingDetail, ReturnOutcome, build_filter, create_borrowing,
    get_borrowing, list_borrowings, return_book,
};
pub use errors::{BorrowingApplicationError, Result};
pub use overdue_detection::detect_overdue_borrowings;
