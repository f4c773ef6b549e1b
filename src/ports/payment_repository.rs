use crate::domain::{BorrowingId, Payment, PaymentId, PaymentStatus, UserId};
use async_trait::async_trait;

use super::pagination::{Page, PageRequest};

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 支払い台帳の永続化ポート
///
/// 支払いの挿入は貸出と一緒に `BorrowingRepository` が行う。
/// このポートは読み取りとステータス更新のみ。
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// 支払い一覧（`owner` 指定時はその利用者の貸出の支払いのみ）
    async fn list(&self, owner: Option<UserId>, page: PageRequest) -> Result<Page<Payment>>;

    async fn get_by_id(&self, payment_id: PaymentId) -> Result<Option<Payment>>;

    async fn find_by_borrowing(&self, borrowing_id: BorrowingId) -> Result<Vec<Payment>>;

    async fn find_by_session_id(&self, session_id: &str) -> Result<Option<Payment>>;

    /// 該当する支払いがなければ `false`
    async fn update_status(&self, payment_id: PaymentId, status: PaymentStatus) -> Result<bool>;
}
