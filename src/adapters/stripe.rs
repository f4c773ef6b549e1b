use crate::ports::payment_gateway::{
    CheckoutRequest, CheckoutSession, GatewayError, PaymentGateway, SessionStatus,
};
use async_trait::async_trait;
use reqwest::Url;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Deserialize;
use tracing::error;

const STRIPE_API_BASE: &str = "https://api.stripe.com/v1";

/// reqwestベースのStripe Checkoutクライアント
pub struct StripeClient {
    http: reqwest::Client,
    secret_key: String,
    success_url: String,
    cancel_url: String,
    api_base: String,
}

#[derive(Debug, Deserialize)]
struct StripeErrorEnvelope {
    error: StripeErrorDetails,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetails {
    #[serde(rename = "type")]
    type_: Option<String>,
    code: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreatedSessionResp {
    id: String,
    url: Option<String>,
}

/// 照会結果（完了・期限切れのセッションでは url が null）
#[derive(Debug, Deserialize)]
struct RetrievedSessionResp {
    id: String,
    status: Option<String>,
    payment_status: Option<String>,
}

/// 金額を最小通貨単位（セント）に変換する
///
/// 0.5セントは0から遠い方に丸める。
pub fn to_cents(amount: Decimal) -> Result<i64, GatewayError> {
    let cents = (amount * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    cents
        .to_i64()
        .ok_or_else(|| GatewayError::InvalidRequest(format!("Invalid amount: {}", amount)))
}

fn unavailable(err: impl std::error::Error + Send + Sync + 'static) -> GatewayError {
    GatewayError::Unavailable(Box::new(err))
}

impl StripeClient {
    pub fn new(secret_key: String, success_url: String, cancel_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            secret_key,
            success_url,
            cancel_url,
            api_base: STRIPE_API_BASE.to_string(),
        }
    }

    /// 接続先のAPIベースURLを差し替える（ローカルのスタブなど）
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// `{api_base}/checkout/sessions[/{session_id}]` を組み立てる
    ///
    /// セッションIDは1つのパスセグメントとしてエンコードする。
    fn sessions_url(&self, session_id: Option<&str>) -> Result<Url, GatewayError> {
        let mut url = Url::parse(&format!("{}/checkout/sessions", self.api_base))
            .map_err(unavailable)?;

        if let Some(id) = session_id {
            // "." と ".." はURL正規化で消えてしまう
            if id.is_empty() || id == "." || id == ".." {
                return Err(GatewayError::InvalidRequest(format!(
                    "No such checkout.session: '{}'",
                    id
                )));
            }
            url.path_segments_mut()
                .map_err(|_| {
                    GatewayError::Unavailable(
                        format!("Stripe API base is not a hierarchical URL: {}", self.api_base)
                            .into(),
                    )
                })?
                .push(id);
        }
        Ok(url)
    }

    /// 2xx以外の応答を `GatewayError` に変換する
    ///
    /// 4xxはStripeのメッセージを持つ `InvalidRequest`、それ以外は `Unavailable`。
    async fn ensure_success(
        resp: reqwest::Response,
        context: &str,
    ) -> Result<reqwest::Response, GatewayError> {
        if resp.status().is_success() {
            return Ok(resp);
        }

        let status = resp.status();
        let request_id = resp
            .headers()
            .get("request-id")
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());

        let body = match resp.text().await {
            Ok(text) if !text.is_empty() => text,
            Ok(_) => "<empty response body>".to_string(),
            Err(err) => format!("<failed to read response body: {err}>"),
        };

        let details = serde_json::from_str::<StripeErrorEnvelope>(&body)
            .ok()
            .map(|envelope| envelope.error);

        error!(
            status = %status,
            stripe_request_id = ?request_id,
            stripe_error_type = ?details.as_ref().and_then(|d| d.type_.as_deref()),
            stripe_error_code = ?details.as_ref().and_then(|d| d.code.as_deref()),
            response_body = %body,
            context = %context,
            "stripe api request failed"
        );

        if status.is_client_error() {
            let message = details
                .and_then(|d| d.message)
                .unwrap_or_else(|| format!("Stripe rejected the request ({})", status));
            return Err(GatewayError::InvalidRequest(message));
        }

        Err(GatewayError::Unavailable(
            format!("Stripe API request failed: {} (status {})", context, status).into(),
        ))
    }
}

#[async_trait]
impl PaymentGateway for StripeClient {
    async fn create_checkout_session(
        &self,
        request: CheckoutRequest,
    ) -> Result<CheckoutSession, GatewayError> {
        // https://stripe.com/docs/api/checkout/sessions/create
        let body: Vec<(&str, String)> = vec![
            ("mode", "payment".to_string()),
            ("payment_method_types[0]", "card".to_string()),
            ("line_items[0][price_data][currency]", "usd".to_string()),
            (
                "line_items[0][price_data][product_data][name]",
                request.product_name.clone(),
            ),
            (
                "line_items[0][price_data][unit_amount]",
                to_cents(request.amount)?.to_string(),
            ),
            ("line_items[0][quantity]", "1".to_string()),
            ("success_url", self.success_url.clone()),
            ("cancel_url", self.cancel_url.clone()),
        ];

        let resp = self
            .http
            .post(self.sessions_url(None)?)
            .header(AUTHORIZATION, format!("Bearer {}", self.secret_key))
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .form(&body)
            .send()
            .await
            .map_err(unavailable)?;
        let resp = Self::ensure_success(resp, "create checkout session").await?;

        let parsed: CreatedSessionResp = resp.json().await.map_err(unavailable)?;
        // 作成直後のセッションは必ず url を持つ
        let url = parsed.url.ok_or_else(|| {
            GatewayError::Unavailable("Stripe Checkout session URL is missing".into())
        })?;

        Ok(CheckoutSession { id: parsed.id, url })
    }

    async fn retrieve_session(&self, session_id: &str) -> Result<SessionStatus, GatewayError> {
        // https://stripe.com/docs/api/checkout/sessions/retrieve
        let resp = self
            .http
            .get(self.sessions_url(Some(session_id))?)
            .header(AUTHORIZATION, format!("Bearer {}", self.secret_key))
            .send()
            .await
            .map_err(unavailable)?;
        let resp = Self::ensure_success(resp, "retrieve checkout session").await?;

        let parsed: RetrievedSessionResp = resp.json().await.map_err(unavailable)?;
        Ok(SessionStatus {
            id: parsed.id,
            status: parsed.status,
            payment_status: parsed.payment_status,
        })
    }
}
