use crate::domain::{Borrowing, BorrowingId, Payment, UserId};
use async_trait::async_trait;
use futures::stream::BoxStream;

use super::pagination::{Page, PageRequest};

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 貸出一覧のフィルタ
///
/// 値のあるフィールドごとに結果を絞り込む。`None` は制限なし。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BorrowingFilter {
    /// 職員以外の呼び出し元は自分の貸出のみ
    pub visible_to: Option<UserId>,
    /// クエリパラメータの `user_id`
    pub user_id: Option<UserId>,
    /// `Some(true)` は未返却、`Some(false)` は返却済み
    pub is_active: Option<bool>,
}

impl BorrowingFilter {
    pub fn matches(&self, borrowing: &Borrowing) -> bool {
        self.visible_to.is_none_or(|id| borrowing.user_id == id)
            && self.user_id.is_none_or(|id| borrowing.user_id == id)
            && self
                .is_active
                .is_none_or(|active| borrowing.is_active() == active)
    }
}

/// 貸出作成の作業単位の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenOutcome {
    Opened,
    /// 条件付きの在庫減算が0行だった
    OutOfStock,
}

/// 返却の作業単位の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOutcome {
    Closed,
    /// 更新時点で `actual_return_date` が設定済みだった
    AlreadyReturned,
}

/// 貸出台帳の永続化ポート
///
/// `open` と `close` は複数ステップの書き込みで、それぞれ全体が成功するか何も残らない。
#[async_trait]
pub trait BorrowingRepository: Send + Sync {
    /// 在庫を減らし（正の間のみ）、貸出と支払いを挿入する
    async fn open(&self, borrowing: &Borrowing, payment: &Payment) -> Result<OpenOutcome>;

    /// `actual_return_date` を設定し（NULLの間のみ）、在庫を戻し、罰金があれば挿入する
    async fn close(&self, borrowing: &Borrowing, fine: Option<&Payment>) -> Result<CloseOutcome>;

    async fn get_by_id(&self, borrowing_id: BorrowingId) -> Result<Option<Borrowing>>;

    /// フィルタに合う貸出を新しい順に返す
    async fn list(&self, filter: &BorrowingFilter, page: PageRequest) -> Result<Page<Borrowing>>;

    /// 全貸出を貸出日順にストリームで返す
    ///
    /// 定期的な延滞チェックで使う。
    fn stream_all(&self) -> BoxStream<'_, Result<Borrowing>>;
}
