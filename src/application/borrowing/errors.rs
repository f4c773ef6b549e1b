use crate::application::payment::PaymentApplicationError;
use crate::domain::{BorrowingId, CreateBorrowingError, ReturnBookError};
use thiserror::Error;

/// 貸出管理アプリケーション層のエラー
#[derive(Debug, Error)]
pub enum BorrowingApplicationError {
    /// 書籍が見つからない
    #[error("Book not found")]
    BookNotFound,

    /// 貸出が見つからない（または閲覧権限がない）
    #[error("Borrowing not found")]
    BorrowingNotFound,

    /// 貸出作成のビジネスルール違反
    #[error(transparent)]
    InvalidBorrowing(#[from] CreateBorrowingError),

    /// 既に返却済み
    #[error(transparent)]
    AlreadyReturned(#[from] ReturnBookError),

    /// 参照先（書籍・利用者）が欠けている
    #[error("Borrowing {0} references missing records")]
    DanglingReference(BorrowingId),

    /// 支払い処理のエラー
    #[error(transparent)]
    Payment(#[from] PaymentApplicationError),

    /// Repositoryのエラー
    #[error("Borrowing repository error")]
    RepositoryError(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// アプリケーション層の Result型
pub type Result<T> = std::result::Result<T, BorrowingApplicationError>;
