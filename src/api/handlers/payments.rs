use crate::application::payment;
use crate::domain::PaymentId;
use axum::{Json, extract::State};
use std::sync::Arc;
use uuid::Uuid;

use super::AppState;
use crate::api::{
    error::ApiError,
    extractors::{AuthUser, PathParam, QueryParams},
    types::{
        MessageResponse, PaginatedResponse, PaginationQuery, PaymentResponse,
        PaymentSuccessQuery,
    },
};

const CANCEL_MESSAGE: &str =
    "Your payment can be paid later, but the session is available for only 24 hours.";

/// GET /payments - 支払い一覧（職員以外は自分の貸出の支払いのみ）
pub async fn list_payments(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    QueryParams(query): QueryParams<PaginationQuery>,
) -> Result<Json<PaginatedResponse<PaymentResponse>>, ApiError> {
    let request = query.page_request();
    let page = payment::list_payments(&state.service_deps, user.actor(), request).await?;

    Ok(Json(PaginatedResponse::new(page, request)))
}

/// GET /payments/:id - 支払い詳細
pub async fn get_payment(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    PathParam(payment_id): PathParam<Uuid>,
) -> Result<Json<PaymentResponse>, ApiError> {
    let found = payment::get_payment(
        &state.service_deps,
        user.actor(),
        PaymentId::from_uuid(payment_id),
    )
    .await?;

    Ok(Json(found.into()))
}

/// GET /payments/success?session_id= - 決済完了の戻り先
///
/// プロバイダにセッションを照会してから支払いをPAIDにする。
pub async fn payment_success(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    QueryParams(query): QueryParams<PaymentSuccessQuery>,
) -> Result<Json<MessageResponse>, ApiError> {
    let session_id = query
        .session_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("session_id: This field is required.".to_string()))?;

    payment::set_paid_status(&state.service_deps, &session_id).await?;

    Ok(Json(MessageResponse::new(format!(
        "Thanks for your payment, {}!",
        user.0.email
    ))))
}

/// GET /payments/cancel - 決済キャンセルの戻り先（案内のみ）
pub async fn payment_cancel(_user: AuthUser) -> Json<MessageResponse> {
    Json(MessageResponse::new(CANCEL_MESSAGE))
}
