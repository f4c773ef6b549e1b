use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::{Book, BookId, BorrowingId, CreateBorrowingError, ReturnBookError, UserId};

/// 最短の貸出期間（日数）
pub const MIN_BORROWING_DAYS: i64 = 1;

/// 延滞として報告するまでの猶予（日数）
pub const OVERDUE_THRESHOLD_DAYS: i64 = 1;

/// Borrowing集約 - 1人の利用者が1冊の書籍を借りている期間
///
/// 不変条件：actual_return_dateは返却操作まではNone、一度設定されたら消えない
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Borrowing {
    pub id: BorrowingId,
    pub borrow_date: DateTime<Utc>,
    pub expected_return_date: DateTime<Utc>,
    pub actual_return_date: Option<DateTime<Utc>>,
    pub book_id: BookId,
    pub user_id: UserId,
}

impl Borrowing {
    /// まだ返却されていないか
    pub fn is_active(&self) -> bool {
        self.actual_return_date.is_none()
    }
}

/// 返却結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnedBorrowing {
    pub borrowing: Borrowing,
    /// 返却予定日を過ぎて返却されたか
    pub was_late: bool,
}

/// 純粋関数：貸出作成の事前チェック
///
/// ビジネスルール：
/// - 返却予定日は「現在 + 1日」以降
/// - 在庫が1冊以上
///
/// 副作用なし。在庫の減算は永続化時に行う。
pub fn validate_create(
    expected_return_date: DateTime<Utc>,
    book: &Book,
    now: DateTime<Utc>,
) -> Result<(), CreateBorrowingError> {
    if expected_return_date < now + Duration::days(MIN_BORROWING_DAYS) {
        return Err(CreateBorrowingError::ReturnDateTooSoon);
    }
    if !book.in_stock() {
        return Err(CreateBorrowingError::OutOfStock);
    }
    Ok(())
}

/// 純粋関数：書籍を貸し出す
///
/// 検証に通れば、borrow_date = now の新しい貸出を返す。
pub fn open_borrowing(
    book: &Book,
    user_id: UserId,
    expected_return_date: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<Borrowing, CreateBorrowingError> {
    validate_create(expected_return_date, book, now)?;

    Ok(Borrowing {
        id: BorrowingId::new(),
        borrow_date: now,
        expected_return_date,
        actual_return_date: None,
        book_id: book.id,
        user_id,
    })
}

/// 純粋関数：書籍を返却する
///
/// ビジネスルール：
/// - 返却済みの貸出は再返却不可
/// - 返却予定日を過ぎていれば延滞（罰金対象）
pub fn return_book(
    borrowing: &Borrowing,
    returned_at: DateTime<Utc>,
) -> Result<ReturnedBorrowing, ReturnBookError> {
    if !borrowing.is_active() {
        return Err(ReturnBookError::AlreadyReturned);
    }

    let was_late = returned_at > borrowing.expected_return_date;

    Ok(ReturnedBorrowing {
        borrowing: Borrowing {
            actual_return_date: Some(returned_at),
            ..borrowing.clone()
        },
        was_late,
    })
}

/// 純粋関数：延滞判定（定期チェック用）
///
/// 未返却かつ返却予定日から1日より長く経過している貸出を延滞とする。
pub fn is_overdue(borrowing: &Borrowing, now: DateTime<Utc>) -> bool {
    borrowing.is_active()
        && now - borrowing.expected_return_date > Duration::days(OVERDUE_THRESHOLD_DAYS)
}

/// 返却予定日からの経過日数（未到来なら0）
pub fn days_overdue(borrowing: &Borrowing, now: DateTime<Utc>) -> i64 {
    (now - borrowing.expected_return_date).num_days().max(0)
}
