use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{BookId, BorrowingId, UserId};

/// コマンド：書籍を借りる
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateBorrowing {
    pub book_id: BookId,
    pub user_id: UserId,
    pub expected_return_date: DateTime<Utc>,
    pub requested_at: DateTime<Utc>,
}

/// コマンド：書籍を返却する
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnBorrowing {
    pub borrowing_id: BorrowingId,
    pub returned_at: DateTime<Utc>,
}

/// コマンド：利用者を登録する
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterUser {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}
