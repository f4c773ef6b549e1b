use crate::application::account;
use axum::{Json, extract::State, http::StatusCode};
use serde_json::{Value, json};
use std::sync::Arc;

use super::AppState;
use crate::api::{
    error::ApiError,
    extractors::{AuthUser, JsonBody},
    types::{
        AccessTokenResponse, TokenObtainRequest, TokenRefreshRequest, TokenVerifyRequest,
        UserRequest, UserResponse,
    },
};
use crate::auth::TokenPair;

/// POST /users - 利用者登録（認証不要）
pub async fn register(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<UserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let user = account::register(&state.service_deps, req.into_command()).await?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// GET /users/me
pub async fn get_me(user: AuthUser) -> Json<UserResponse> {
    Json(user.0.into())
}

/// PUT /users/me
pub async fn update_me(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    JsonBody(req): JsonBody<UserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let updated =
        account::update_profile(&state.service_deps, user.0.id, req.into_profile_update()).await?;

    Ok(Json(updated.into()))
}

/// POST /users/token
pub async fn obtain_token(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<TokenObtainRequest>,
) -> Result<Json<TokenPair>, ApiError> {
    let pair =
        account::obtain_token(&state.service_deps, &state.tokens, &req.email, &req.password)
            .await?;

    Ok(Json(pair))
}

/// POST /users/token/refresh
pub async fn refresh_token(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<TokenRefreshRequest>,
) -> Result<Json<AccessTokenResponse>, ApiError> {
    let access = account::refresh_token(&state.tokens, &req.refresh)?;

    Ok(Json(AccessTokenResponse { access }))
}

/// POST /users/token/verify
pub async fn verify_token(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<TokenVerifyRequest>,
) -> Result<Json<Value>, ApiError> {
    account::verify_token(&state.tokens, &req.token)?;

    Ok(Json(json!({})))
}
