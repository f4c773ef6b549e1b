use thiserror::Error;

/// 書籍入力のバリデーションエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookValidationError {
    #[error("Title must not be empty")]
    EmptyTitle,

    #[error("Title can't be longer than 60 characters")]
    TitleTooLong,

    #[error("Author can't be longer than 60 characters")]
    AuthorTooLong,

    #[error("Inventory can't be less than 1")]
    InventoryBelowOne,

    #[error("Daily fee must be greater than 0")]
    NonPositiveDailyFee,
}

/// 貸出作成のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CreateBorrowingError {
    /// 返却予定日が「現在 + 1日」より前
    #[error("Expected return date must be at least one day from now")]
    ReturnDateTooSoon,

    /// 在庫切れ
    #[error("Book is out of stock")]
    OutOfStock,
}

/// 返却のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReturnBookError {
    /// 既に返却済み
    #[error("Borrowing has already been returned")]
    AlreadyReturned,
}

/// 利用者入力のバリデーションエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserValidationError {
    #[error("Enter a valid email address")]
    InvalidEmail,

    #[error("Password must contain at least 5 characters")]
    PasswordTooShort,
}
