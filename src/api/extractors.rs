use crate::application::{Actor, account};
use crate::domain::User;
use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts},
    http::request::Parts,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use std::sync::Arc;

use super::{error::ApiError, handlers::AppState};

/// JSONボディ（不正な場合は400）
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

/// クエリパラメータ（不正な場合は400）
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct QueryParams<T>(pub T);

/// パスパラメータ（不正な場合は400）
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct PathParam<T>(pub T);

/// `Authorization: Bearer <access token>` で認証された利用者
pub struct AuthUser(pub User);

impl AuthUser {
    pub fn actor(&self) -> Actor {
        Actor {
            user_id: self.0.id,
            is_staff: self.0.is_staff,
        }
    }

    pub fn require_staff(&self) -> Result<(), ApiError> {
        if self.0.is_staff {
            Ok(())
        } else {
            Err(ApiError::Forbidden)
        }
    }
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| {
                    ApiError::Unauthorized(
                        "Authentication credentials were not provided".to_string(),
                    )
                })?;

        let user =
            account::authenticate(&state.service_deps, &state.tokens, bearer.token()).await?;

        Ok(AuthUser(user))
    }
}
