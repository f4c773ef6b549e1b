use crate::ports::payment_gateway::{
    CheckoutRequest, CheckoutSession, GatewayError, PaymentGateway as PaymentGatewayTrait,
    SessionStatus,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

/// PaymentGatewayのモック実装
///
/// `cs_test_*` 形式の偽セッションを発行して記録する。
/// `retrieve_session` は自分が作ったセッションだけを認識する。
pub struct PaymentGateway {
    sessions: Mutex<HashMap<String, CheckoutSession>>,
    requests: Mutex<Vec<CheckoutRequest>>,
}

impl PaymentGateway {
    pub fn new() -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// これまでに受けたリクエスト（受信順）
    pub fn requests(&self) -> Vec<CheckoutRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// セッションを忘れる（プロバイダ側の期限切れ相当）
    pub fn expire(&self, session_id: &str) {
        self.sessions.lock().unwrap().remove(session_id);
    }
}

impl Default for PaymentGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PaymentGatewayTrait for PaymentGateway {
    async fn create_checkout_session(
        &self,
        request: CheckoutRequest,
    ) -> Result<CheckoutSession, GatewayError> {
        let id = format!("cs_test_{}", Uuid::new_v4().simple());
        let session = CheckoutSession {
            url: format!("https://checkout.stripe.test/c/pay/{}", id),
            id: id.clone(),
        };

        tracing::debug!(session_id = %id, amount = %request.amount, "Mock checkout session created");
        self.requests.lock().unwrap().push(request);
        self.sessions.lock().unwrap().insert(id, session.clone());
        Ok(session)
    }

    async fn retrieve_session(&self, session_id: &str) -> Result<SessionStatus, GatewayError> {
        self.sessions
            .lock()
            .unwrap()
            .get(session_id)
            .map(|session| SessionStatus {
                id: session.id.clone(),
                status: Some("complete".to_string()),
                payment_status: Some("paid".to_string()),
            })
            .ok_or_else(|| {
                GatewayError::InvalidRequest(format!(
                    "No such checkout.session: '{}'",
                    session_id
                ))
            })
    }
}
