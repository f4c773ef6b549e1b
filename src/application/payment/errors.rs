use crate::ports::GatewayError;
use thiserror::Error;

/// 支払い管理アプリケーション層のエラー
#[derive(Debug, Error)]
pub enum PaymentApplicationError {
    /// 支払いが見つからない（または閲覧権限がない）
    #[error("Payment not found")]
    PaymentNotFound,

    /// 決済プロバイダのエラー
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// Repositoryのエラー
    #[error("Payment repository error")]
    RepositoryError(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// アプリケーション層の Result型
pub type Result<T> = std::result::Result<T, PaymentApplicationError>;
