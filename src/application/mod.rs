pub mod account;
pub mod borrowing;
pub mod catalog;
pub mod notification;
pub mod payment;

use crate::ports::*;
use notification::Notifier;
use std::sync::Arc;

/// サービスの依存関係
///
/// 各ユースケース関数に明示的に渡す「作業単位」。
/// グローバルな設定やコネクションには依存しない。
#[derive(Clone)]
pub struct ServiceDependencies {
    pub books: Arc<dyn BookRepository>,
    pub borrowings: Arc<dyn BorrowingRepository>,
    pub payments: Arc<dyn PaymentRepository>,
    pub users: Arc<dyn UserRepository>,
    pub payment_gateway: Arc<dyn PaymentGateway>,
    pub notifier: Notifier,
}

/// ユースケースを呼び出す主体
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: crate::domain::UserId,
    pub is_staff: bool,
}

impl Actor {
    /// 本人または職員か
    pub fn can_see(&self, owner: crate::domain::UserId) -> bool {
        self.is_staff || self.user_id == owner
    }
}
