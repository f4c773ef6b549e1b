use crate::application::borrowing::{
    ReturnOutcome, build_filter, create_borrowing as execute_create_borrowing,
    get_borrowing as execute_get_borrowing, list_borrowings as execute_list_borrowings,
    return_book as execute_return_book,
};
use crate::domain::{
    BookId, BorrowingId,
    commands::{CreateBorrowing, ReturnBorrowing},
};
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;
use uuid::Uuid;

use super::AppState;
use crate::api::{
    error::ApiError,
    extractors::{AuthUser, JsonBody, PathParam, QueryParams},
    types::{
        BorrowingCreatedResponse, BorrowingDetailResponse, BorrowingResponse,
        CreateBorrowingRequest, ListBorrowingsQuery, PaginatedResponse,
    },
};

/// GET /borrowings - 貸出一覧
///
/// 職員以外は自分の貸出のみ。`user_id` と `is_active` で絞り込める。
pub async fn list_borrowings(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    QueryParams(query): QueryParams<ListBorrowingsQuery>,
) -> Result<Json<PaginatedResponse<BorrowingResponse>>, ApiError> {
    let filter = build_filter(
        user.actor(),
        query.user_id.as_deref(),
        query.is_active.as_deref(),
    );
    let request = query.page_request();

    let page = execute_list_borrowings(&state.service_deps, &filter, request).await?;

    Ok(Json(PaginatedResponse::new(page, request)))
}

/// POST /borrowings - 書籍を借りる
///
/// 貸出料金の決済セッションを開き、そのURLを含めて返す。
pub async fn create_borrowing(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    JsonBody(req): JsonBody<CreateBorrowingRequest>,
) -> Result<(StatusCode, Json<BorrowingCreatedResponse>), ApiError> {
    let cmd = CreateBorrowing {
        book_id: BookId::from_uuid(req.book),
        user_id: user.0.id,
        expected_return_date: req.expected_return_date,
        requested_at: chrono::Utc::now(),
    };

    let created = execute_create_borrowing(&state.service_deps, cmd).await?;

    let response = BorrowingCreatedResponse {
        borrowing: created.borrowing.into(),
        payment: created.payment.into(),
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /borrowings/:id - 貸出詳細（本人または職員）
pub async fn get_borrowing(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    PathParam(borrowing_id): PathParam<Uuid>,
) -> Result<Json<BorrowingDetailResponse>, ApiError> {
    let detail = execute_get_borrowing(
        &state.service_deps,
        user.actor(),
        BorrowingId::from_uuid(borrowing_id),
    )
    .await?;

    Ok(Json(detail.into()))
}

/// POST /borrowings/:id/return - 書籍を返却（職員のみ）
///
/// 延滞していれば罰金の決済ページへ 303 でリダイレクトする。
pub async fn return_borrowing(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    PathParam(borrowing_id): PathParam<Uuid>,
) -> Result<Response, ApiError> {
    user.require_staff()?;

    let cmd = ReturnBorrowing {
        borrowing_id: BorrowingId::from_uuid(borrowing_id),
        returned_at: chrono::Utc::now(),
    };

    let response = match execute_return_book(&state.service_deps, cmd).await? {
        ReturnOutcome::Returned(borrowing) => {
            (StatusCode::OK, Json(BorrowingResponse::from(borrowing))).into_response()
        }
        ReturnOutcome::FineDue { fine, .. } => Redirect::to(&fine.session_url).into_response(),
    };

    Ok(response)
}
