use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

/// 決済セッション作成リクエスト（明細1行）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRequest {
    /// 明細名（書籍タイトル）
    pub product_name: String,
    pub amount: Decimal,
}

/// 作成直後の決済セッション
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSession {
    pub id: String,
    pub url: String,
}

/// 照会した決済セッションの状態
///
/// 完了・期限切れのセッションにはURLがないため、URLは持たない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStatus {
    pub id: String,
    pub status: Option<String>,
    pub payment_status: Option<String>,
}

#[derive(Debug, Error)]
pub enum GatewayError {
    /// プロバイダがリクエストを拒否した（不明なセッション、不正な金額など）
    ///
    /// メッセージはプロバイダのものをそのまま呼び出し元に返す。
    #[error("{0}")]
    InvalidRequest(String),

    /// プロバイダに到達できない、または想定外の応答
    #[error("Payment provider unavailable")]
    Unavailable(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// 決済プロバイダのポート
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_checkout_session(
        &self,
        request: CheckoutRequest,
    ) -> Result<CheckoutSession, GatewayError>;

    /// セッションを認識しない場合は `GatewayError::InvalidRequest`
    async fn retrieve_session(&self, session_id: &str) -> Result<SessionStatus, GatewayError>;
}
