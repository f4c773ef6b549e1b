use crate::domain::BookValidationError;
use thiserror::Error;

/// カタログ管理アプリケーション層のエラー
#[derive(Debug, Error)]
pub enum CatalogApplicationError {
    /// 書籍が見つからない
    #[error("Book not found")]
    BookNotFound,

    /// 入力値が不正
    #[error(transparent)]
    InvalidBook(#[from] BookValidationError),

    /// 貸出記録が残っているため削除不可
    #[error("Book can't be deleted while it has borrowings")]
    BookHasBorrowings,

    /// BookRepositoryのエラー
    #[error("Book repository error")]
    RepositoryError(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// アプリケーション層の Result型
pub type Result<T> = std::result::Result<T, CatalogApplicationError>;
