use crate::application::catalog;
use crate::domain::BookId;
use axum::{Json, extract::State, http::StatusCode};
use std::sync::Arc;
use uuid::Uuid;

use super::AppState;
use crate::api::{
    error::ApiError,
    extractors::{AuthUser, JsonBody, PathParam, QueryParams},
    types::{BookRequest, BookResponse, PaginatedResponse, PaginationQuery},
};

/// GET /books - 書籍一覧（認証不要）
pub async fn list_books(
    State(state): State<Arc<AppState>>,
    QueryParams(query): QueryParams<PaginationQuery>,
) -> Result<Json<PaginatedResponse<BookResponse>>, ApiError> {
    let request = query.page_request();
    let page = catalog::list_books(&state.service_deps, request).await?;

    Ok(Json(PaginatedResponse::new(page, request)))
}

/// GET /books/:id - 書籍詳細（認証不要）
pub async fn get_book(
    State(state): State<Arc<AppState>>,
    PathParam(book_id): PathParam<Uuid>,
) -> Result<Json<BookResponse>, ApiError> {
    let book = catalog::get_book(&state.service_deps, BookId::from_uuid(book_id)).await?;

    Ok(Json(book.into()))
}

/// POST /books - 書籍を登録（職員のみ）
pub async fn create_book(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    JsonBody(req): JsonBody<BookRequest>,
) -> Result<(StatusCode, Json<BookResponse>), ApiError> {
    user.require_staff()?;

    let book = catalog::create_book(&state.service_deps, req.into_draft()).await?;

    Ok((StatusCode::CREATED, Json(book.into())))
}

/// PUT /books/:id - 書籍を更新（職員のみ）
pub async fn update_book(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    PathParam(book_id): PathParam<Uuid>,
    JsonBody(req): JsonBody<BookRequest>,
) -> Result<Json<BookResponse>, ApiError> {
    user.require_staff()?;

    let book = catalog::update_book(
        &state.service_deps,
        BookId::from_uuid(book_id),
        req.into_draft(),
    )
    .await?;

    Ok(Json(book.into()))
}

/// DELETE /books/:id - 書籍を削除（職員のみ）
///
/// 貸出記録が1件でもあれば削除できない。
pub async fn delete_book(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    PathParam(book_id): PathParam<Uuid>,
) -> Result<StatusCode, ApiError> {
    user.require_staff()?;

    catalog::delete_book(&state.service_deps, BookId::from_uuid(book_id)).await?;

    Ok(StatusCode::NO_CONTENT)
}
