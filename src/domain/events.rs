use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{BookId, BorrowingId, UserId};

/// イベント：貸出が作成された
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorrowingCreated {
    pub borrowing_id: BorrowingId,
    pub user_email: String,
    pub borrow_date: DateTime<Utc>,
    pub expected_return_date: DateTime<Utc>,
}

/// イベント：支払いが完了した
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSucceeded {
    pub borrowing_id: BorrowingId,
    pub user_email: String,
    pub money_to_pay: Decimal,
}

/// イベント：延滞中の貸出が検出された
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorrowingOverdue {
    pub borrowing_id: BorrowingId,
    pub book_id: BookId,
    pub user_id: UserId,
    pub expected_return_date: DateTime<Utc>,
    pub overdue_days: i64,
}

/// イベント：延滞チェックで該当なし
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoOverdueBorrowings {
    pub checked_at: DateTime<Utc>,
}

/// 通知対象のドメインイベント統合型
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LibraryEvent {
    BorrowingCreated(BorrowingCreated),
    PaymentSucceeded(PaymentSucceeded),
    BorrowingOverdue(BorrowingOverdue),
    NoOverdueBorrowings(NoOverdueBorrowings),
}

impl LibraryEvent {
    /// 通知用のプレーンテキスト
    pub fn message(&self) -> String {
        match self {
            LibraryEvent::BorrowingCreated(e) => format!(
                "Borrowing {} was created by {}.\nBorrow date: {}.\nExpected return date: {}",
                e.borrowing_id,
                e.user_email,
                e.borrow_date.format("%Y-%m-%d %H:%M"),
                e.expected_return_date.format("%Y-%m-%d %H:%M"),
            ),
            LibraryEvent::PaymentSucceeded(e) => format!(
                "Customer: {}\nsuccessfully paid {} for borrowing with id: {}.",
                e.user_email, e.money_to_pay, e.borrowing_id,
            ),
            LibraryEvent::BorrowingOverdue(e) => format!(
                "Borrowing {} (user {}) is overdue by {} day(s).\nExpected return date: {}",
                e.borrowing_id,
                e.user_id,
                e.overdue_days,
                e.expected_return_date.format("%Y-%m-%d"),
            ),
            LibraryEvent::NoOverdueBorrowings(e) => format!(
                "No borrowings overdue today! (checked at {})",
                e.checked_at.format("%Y-%m-%d %H:%M"),
            ),
        }
    }
}
