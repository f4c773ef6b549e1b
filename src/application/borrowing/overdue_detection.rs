use crate::application::ServiceDependencies;
use crate::domain::{self, BorrowingOverdue, LibraryEvent, NoOverdueBorrowings};
use chrono::{DateTime, Utc};
use futures::StreamExt;

/// 延滞チェック（定期実行）
///
/// 貸出台帳を全件走査し、未返却かつ返却予定日から1日より長く経過した貸出を
/// 1件ずつ通知する。該当がなければ「延滞なし」を1通だけ通知する。
///
/// 状態は変更しない（通知のみ）。
///
/// # 戻り値
/// 延滞として報告した貸出の件数
pub async fn detect_overdue_borrowings(
    deps: &ServiceDependencies,
    now: DateTime<Utc>,
) -> std::result::Result<usize, Box<dyn std::error::Error + Send + Sync>> {
    let mut detected_count = 0;
    let mut ledger = deps.borrowings.stream_all();

    while let Some(borrowing) = ledger.next().await {
        let borrowing = borrowing?;

        if !domain::borrowing::is_overdue(&borrowing, now) {
            continue;
        }

        deps.notifier
            .try_notify(LibraryEvent::BorrowingOverdue(BorrowingOverdue {
                borrowing_id: borrowing.id,
                book_id: borrowing.book_id,
                user_id: borrowing.user_id,
                expected_return_date: borrowing.expected_return_date,
                overdue_days: domain::borrowing::days_overdue(&borrowing, now),
            }));
        detected_count += 1;
    }

    if detected_count == 0 {
        deps.notifier
            .try_notify(LibraryEvent::NoOverdueBorrowings(NoOverdueBorrowings {
                checked_at: now,
            }));
    }

    tracing::info!(detected_count, "Overdue sweep finished");
    Ok(detected_count)
}
