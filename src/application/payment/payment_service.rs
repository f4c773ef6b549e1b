use crate::application::{Actor, ServiceDependencies};
use crate::domain::{
    self, Book, Borrowing, LibraryEvent, Payment, PaymentId, PaymentStatus, PaymentSucceeded,
    PaymentType,
};
use crate::ports::{CheckoutRequest, Page, PageRequest};
use rust_decimal::Decimal;

use super::errors::{PaymentApplicationError, Result};

/// 決済セッションを開き、未払いの支払いを組み立てる
///
/// 永続化は呼び出し側の作業単位（貸出の作成・返却）で行う。
async fn open_checkout(
    deps: &ServiceDependencies,
    payment_type: PaymentType,
    borrowing: &Borrowing,
    book: &Book,
    amount: Decimal,
) -> Result<Payment> {
    let session = deps
        .payment_gateway
        .create_checkout_session(CheckoutRequest {
            product_name: book.title.clone(),
            amount,
        })
        .await?;

    tracing::debug!(
        borrowing_id = %borrowing.id,
        session_id = %session.id,
        payment_type = payment_type.as_str(),
        %amount,
        "Checkout session opened"
    );

    Ok(Payment::pending(
        payment_type,
        borrowing.id,
        session.id,
        session.url,
        amount,
    ))
}

/// 貸出料金の支払いを作成する
///
/// 料金 = (返却予定日 - 貸出日).days × 日額料金
pub async fn create_payment(
    deps: &ServiceDependencies,
    borrowing: &Borrowing,
    book: &Book,
) -> Result<Payment> {
    let amount = domain::payment::borrowing_fee(borrowing, book.daily_fee);
    open_checkout(deps, PaymentType::Payment, borrowing, book, amount).await
}

/// 延滞罰金の支払いを作成する
///
/// 罰金 = (実返却日 - 返却予定日).days × 日額料金 × 2
///
/// 延滞が1日未満で罰金が0になる場合はセッションを開かず`None`を返す。
pub async fn calculate_fine(
    deps: &ServiceDependencies,
    borrowing: &Borrowing,
    book: &Book,
) -> Result<Option<Payment>> {
    let amount = domain::payment::fine_amount(borrowing, book.daily_fee);
    if amount <= Decimal::ZERO {
        return Ok(None);
    }
    open_checkout(deps, PaymentType::Fine, borrowing, book, amount)
        .await
        .map(Some)
}

/// 決済完了を反映する
///
/// プロバイダがセッションを認識しない場合はプロバイダのエラーをそのまま返す。
/// 冪等性の保証はない（2回目も同じPAIDを書き込むだけ）。
pub async fn set_paid_status(deps: &ServiceDependencies, session_id: &str) -> Result<Payment> {
    deps.payment_gateway.retrieve_session(session_id).await?;

    let payment = deps
        .payments
        .find_by_session_id(session_id)
        .await
        .map_err(PaymentApplicationError::RepositoryError)?
        .ok_or(PaymentApplicationError::PaymentNotFound)?;

    let found = deps
        .payments
        .update_status(payment.id, PaymentStatus::Paid)
        .await
        .map_err(PaymentApplicationError::RepositoryError)?;

    if !found {
        return Err(PaymentApplicationError::PaymentNotFound);
    }

    let paid = Payment {
        status: PaymentStatus::Paid,
        ..payment
    };

    tracing::info!(payment_id = %paid.id.value(), session_id, "Payment marked as paid");
    notify_payment_succeeded(deps, &paid).await;

    Ok(paid)
}

/// 支払い完了通知（失敗してもエラーにしない）
async fn notify_payment_succeeded(deps: &ServiceDependencies, payment: &Payment) {
    let borrowing = match deps.borrowings.get_by_id(payment.borrowing_id).await {
        Ok(Some(borrowing)) => borrowing,
        Ok(None) => return,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load borrowing for payment notification");
            return;
        }
    };

    let user_email = match deps.users.get_by_id(borrowing.user_id).await {
        Ok(Some(user)) => user.email,
        Ok(None) => return,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load user for payment notification");
            return;
        }
    };

    deps.notifier
        .try_notify(LibraryEvent::PaymentSucceeded(PaymentSucceeded {
            borrowing_id: payment.borrowing_id,
            user_email,
            money_to_pay: payment.money_to_pay,
        }));
}

/// 支払い一覧（職員は全件、利用者は自分の貸出分のみ）
pub async fn list_payments(
    deps: &ServiceDependencies,
    actor: Actor,
    page: PageRequest,
) -> Result<Page<Payment>> {
    let owner = (!actor.is_staff).then_some(actor.user_id);
    deps.payments
        .list(owner, page)
        .await
        .map_err(PaymentApplicationError::RepositoryError)
}

/// 支払い詳細（本人または職員のみ）
pub async fn get_payment(
    deps: &ServiceDependencies,
    actor: Actor,
    payment_id: PaymentId,
) -> Result<Payment> {
    let payment = deps
        .payments
        .get_by_id(payment_id)
        .await
        .map_err(PaymentApplicationError::RepositoryError)?
        .ok_or(PaymentApplicationError::PaymentNotFound)?;

    if actor.is_staff {
        return Ok(payment);
    }

    let borrowing = deps
        .borrowings
        .get_by_id(payment.borrowing_id)
        .await
        .map_err(PaymentApplicationError::RepositoryError)?
        .ok_or(PaymentApplicationError::PaymentNotFound)?;

    if !actor.can_see(borrowing.user_id) {
        return Err(PaymentApplicationError::PaymentNotFound);
    }
    Ok(payment)
}
