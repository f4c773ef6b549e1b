use crate::application::{Actor, ServiceDependencies, payment};
use crate::domain::{
    self, Book, BookId, Borrowing, BorrowingCreated, BorrowingId, CreateBorrowingError,
    LibraryEvent, Payment, ReturnBookError, User, UserId, commands::*,
};
use crate::ports::{BorrowingFilter, CloseOutcome, OpenOutcome, Page, PageRequest};

use super::errors::{BorrowingApplicationError, Result};

/// 貸出作成の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BorrowingCreation {
    pub borrowing: Borrowing,
    pub payment: Payment,
}

/// 返却の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnOutcome {
    /// 期限内（または罰金0）の返却
    Returned(Borrowing),
    /// 延滞返却。罰金の決済セッションへ誘導する
    FineDue { borrowing: Borrowing, fine: Payment },
}

/// 貸出詳細（書籍・利用者・支払いを含む）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BorrowingDetail {
    pub borrowing: Borrowing,
    pub book: Book,
    pub user: User,
    pub payments: Vec<Payment>,
}

/// クエリパラメータから一覧フィルタを組み立てる（純粋な関数）
///
/// - 職員以外は自分の貸出のみ
/// - `user_id`: 所有者で絞り込む（職員以外では自分の貸出との積になる）
/// - `is_active`: "true" / "false"（大文字小文字を区別しない）
///
/// 解釈できない値は無視する。
pub fn build_filter(
    actor: Actor,
    user_id: Option<&str>,
    is_active: Option<&str>,
) -> BorrowingFilter {
    let user_id = user_id
        .and_then(|raw| uuid::Uuid::parse_str(raw.trim()).ok())
        .map(UserId::from_uuid);

    let is_active = is_active.and_then(|raw| match raw.trim().to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    });

    BorrowingFilter {
        visible_to: (!actor.is_staff).then_some(actor.user_id),
        user_id,
        is_active,
    }
}

async fn load_book(deps: &ServiceDependencies, book_id: BookId) -> Result<Book> {
    deps.books
        .get_by_id(book_id)
        .await
        .map_err(BorrowingApplicationError::RepositoryError)?
        .ok_or(BorrowingApplicationError::BookNotFound)
}

async fn load_borrowing(deps: &ServiceDependencies, borrowing_id: BorrowingId) -> Result<Borrowing> {
    deps.borrowings
        .get_by_id(borrowing_id)
        .await
        .map_err(BorrowingApplicationError::RepositoryError)?
        .ok_or(BorrowingApplicationError::BorrowingNotFound)
}

/// 書籍を借りる
///
/// ビジネスルール：
/// - 書籍が存在すること
/// - 返却予定日が「現在 + 1日」以降であること
/// - 在庫が1冊以上あること
///
/// 処理フロー：
/// 1. 事前チェック（純粋関数）
/// 2. 貸出料金の決済セッションを開く
/// 3. 在庫の減算・貸出・支払いを1トランザクションで保存
/// 4. 作成通知をキューに積む
///
/// 在庫の減算は「在庫 > 0」を条件に行うため、最後の1冊を同時に借りようとした
/// 場合も片方は在庫切れになる。
pub async fn create_borrowing(
    deps: &ServiceDependencies,
    cmd: CreateBorrowing,
) -> Result<BorrowingCreation> {
    // 1. 書籍の取得と事前チェック
    let book = load_book(deps, cmd.book_id).await?;
    let borrowing = domain::borrowing::open_borrowing(
        &book,
        cmd.user_id,
        cmd.expected_return_date,
        cmd.requested_at,
    )?;

    // 2. 決済セッション（失敗した場合は何も保存しない）
    let payment = payment::create_payment(deps, &borrowing, &book).await?;

    // 3. 作業単位で保存
    let outcome = deps
        .borrowings
        .open(&borrowing, &payment)
        .await
        .map_err(BorrowingApplicationError::RepositoryError)?;

    if outcome == OpenOutcome::OutOfStock {
        return Err(CreateBorrowingError::OutOfStock.into());
    }

    tracing::info!(
        borrowing_id = %borrowing.id,
        book_id = %book.id.value(),
        user_id = %borrowing.user_id,
        "Borrowing created"
    );

    // 4. 通知
    notify_borrowing_created(deps, &borrowing).await;

    Ok(BorrowingCreation { borrowing, payment })
}

async fn notify_borrowing_created(deps: &ServiceDependencies, borrowing: &Borrowing) {
    match deps.users.get_by_id(borrowing.user_id).await {
        Ok(Some(user)) => deps
            .notifier
            .try_notify(LibraryEvent::BorrowingCreated(BorrowingCreated {
                borrowing_id: borrowing.id,
                user_email: user.email,
                borrow_date: borrowing.borrow_date,
                expected_return_date: borrowing.expected_return_date,
            })),
        Ok(None) => {}
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load user for borrowing notification");
        }
    }
}

/// 書籍を返却する
///
/// ビジネスルール：
/// - 返却済みの貸出は再返却不可（競合）
/// - 返却日時 = 現在、在庫 +1
/// - 返却予定日を過ぎていれば罰金の支払いを作成する
///
/// 返却日時の設定・在庫の加算・罰金の保存は1トランザクションで行う。
pub async fn return_book(deps: &ServiceDependencies, cmd: ReturnBorrowing) -> Result<ReturnOutcome> {
    let borrowing = load_borrowing(deps, cmd.borrowing_id).await?;

    let returned = domain::borrowing::return_book(&borrowing, cmd.returned_at)?;

    let fine = if returned.was_late {
        let book = load_book(deps, borrowing.book_id).await?;
        payment::calculate_fine(deps, &returned.borrowing, &book).await?
    } else {
        None
    };

    let outcome = deps
        .borrowings
        .close(&returned.borrowing, fine.as_ref())
        .await
        .map_err(BorrowingApplicationError::RepositoryError)?;

    if outcome == CloseOutcome::AlreadyReturned {
        // 並行して返却された。開いた罰金セッションはプロバイダ側で期限切れになる
        if let Some(fine) = &fine {
            tracing::warn!(
                borrowing_id = %returned.borrowing.id,
                session_id = %fine.session_id,
                "Borrowing was returned concurrently, fine checkout session left unused"
            );
        }
        return Err(ReturnBookError::AlreadyReturned.into());
    }

    tracing::info!(
        borrowing_id = %returned.borrowing.id,
        was_late = returned.was_late,
        "Book returned"
    );

    Ok(match fine {
        Some(fine) => ReturnOutcome::FineDue {
            borrowing: returned.borrowing,
            fine,
        },
        None => ReturnOutcome::Returned(returned.borrowing),
    })
}

/// 貸出一覧
pub async fn list_borrowings(
    deps: &ServiceDependencies,
    filter: &BorrowingFilter,
    page: PageRequest,
) -> Result<Page<Borrowing>> {
    deps.borrowings
        .list(filter, page)
        .await
        .map_err(BorrowingApplicationError::RepositoryError)
}

/// 貸出詳細（本人または職員のみ。それ以外は存在しない扱い）
pub async fn get_borrowing(
    deps: &ServiceDependencies,
    actor: Actor,
    borrowing_id: BorrowingId,
) -> Result<BorrowingDetail> {
    let borrowing = load_borrowing(deps, borrowing_id).await?;

    if !actor.can_see(borrowing.user_id) {
        return Err(BorrowingApplicationError::BorrowingNotFound);
    }

    let book = deps
        .books
        .get_by_id(borrowing.book_id)
        .await
        .map_err(BorrowingApplicationError::RepositoryError)?
        .ok_or(BorrowingApplicationError::DanglingReference(borrowing.id))?;

    let user = deps
        .users
        .get_by_id(borrowing.user_id)
        .await
        .map_err(BorrowingApplicationError::RepositoryError)?
        .ok_or(BorrowingApplicationError::DanglingReference(borrowing.id))?;

    let payments = deps
        .payments
        .find_by_borrowing(borrowing.id)
        .await
        .map_err(BorrowingApplicationError::RepositoryError)?;

    Ok(BorrowingDetail {
        borrowing,
        book,
        user,
        payments,
    })
}
