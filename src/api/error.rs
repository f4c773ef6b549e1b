use crate::application::{
    account::AccountApplicationError, borrowing::BorrowingApplicationError,
    catalog::CatalogApplicationError, payment::PaymentApplicationError,
};
use crate::auth::AuthError;
use crate::ports::GatewayError;
use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::types::ErrorResponse;

/// API層のエラー型
///
/// 各アプリケーション層のエラーをラップし、HTTPレスポンスへのマッピングを提供する。
#[derive(Debug)]
pub enum ApiError {
    Catalog(CatalogApplicationError),
    Borrowing(BorrowingApplicationError),
    Payment(PaymentApplicationError),
    Account(AccountApplicationError),
    /// 認証情報が無い
    Unauthorized(String),
    /// 職員権限が必要
    Forbidden,
    /// リクエストの形が不正（JSON・クエリ・パス）
    BadRequest(String),
}

type Mapped = (StatusCode, &'static str, String);

fn internal(context: &str, error: &(dyn std::error::Error + Send + Sync)) -> Mapped {
    tracing::error!(error = %error, "{} error", context);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An unexpected error occurred".to_string(),
    )
}

fn map_catalog(err: CatalogApplicationError) -> Mapped {
    match err {
        CatalogApplicationError::BookNotFound => {
            (StatusCode::NOT_FOUND, "BOOK_NOT_FOUND", err.to_string())
        }
        CatalogApplicationError::InvalidBook(ref e) => {
            (StatusCode::BAD_REQUEST, "INVALID_BOOK", e.to_string())
        }
        CatalogApplicationError::BookHasBorrowings => {
            (StatusCode::BAD_REQUEST, "BOOK_HAS_BORROWINGS", err.to_string())
        }
        CatalogApplicationError::RepositoryError(ref e) => internal("Book repository", e.as_ref()),
    }
}

fn map_payment(err: PaymentApplicationError) -> Mapped {
    match err {
        PaymentApplicationError::PaymentNotFound => {
            (StatusCode::NOT_FOUND, "PAYMENT_NOT_FOUND", err.to_string())
        }
        // プロバイダのメッセージはそのまま返す
        PaymentApplicationError::Gateway(GatewayError::InvalidRequest(message)) => {
            (StatusCode::BAD_REQUEST, "PAYMENT_PROVIDER_ERROR", message)
        }
        PaymentApplicationError::Gateway(GatewayError::Unavailable(ref e)) => {
            tracing::error!(error = %e, "Payment provider unavailable");
            (
                StatusCode::BAD_GATEWAY,
                "PAYMENT_PROVIDER_UNAVAILABLE",
                "Payment provider is unavailable, try again later".to_string(),
            )
        }
        PaymentApplicationError::RepositoryError(ref e) => {
            internal("Payment repository", e.as_ref())
        }
    }
}

fn map_borrowing(err: BorrowingApplicationError) -> Mapped {
    match err {
        // 404 Not Found - 存在しない、または閲覧権限がない
        BorrowingApplicationError::BorrowingNotFound => {
            (StatusCode::NOT_FOUND, "BORROWING_NOT_FOUND", err.to_string())
        }

        // 400 Bad Request - ビジネスルール違反
        BorrowingApplicationError::BookNotFound => {
            (StatusCode::BAD_REQUEST, "BOOK_NOT_FOUND", err.to_string())
        }
        BorrowingApplicationError::InvalidBorrowing(ref e) => {
            (StatusCode::BAD_REQUEST, "INVALID_BORROWING", e.to_string())
        }

        // 409 Conflict - 二重返却
        BorrowingApplicationError::AlreadyReturned(ref e) => {
            (StatusCode::CONFLICT, "ALREADY_RETURNED", e.to_string())
        }

        BorrowingApplicationError::Payment(e) => map_payment(e),

        // 500 Internal Server Error
        BorrowingApplicationError::DanglingReference(id) => {
            tracing::error!(borrowing_id = %id, "Borrowing references missing records");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An unexpected error occurred".to_string(),
            )
        }
        BorrowingApplicationError::RepositoryError(ref e) => {
            internal("Borrowing repository", e.as_ref())
        }
    }
}

fn map_account(err: AccountApplicationError) -> Mapped {
    match err {
        AccountApplicationError::InvalidUser(ref e) => {
            (StatusCode::BAD_REQUEST, "INVALID_USER", e.to_string())
        }
        AccountApplicationError::EmailTaken => {
            (StatusCode::BAD_REQUEST, "EMAIL_TAKEN", err.to_string())
        }
        AccountApplicationError::InvalidCredentials => {
            (StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS", err.to_string())
        }
        AccountApplicationError::UserNotFound => (
            StatusCode::UNAUTHORIZED,
            "INVALID_TOKEN",
            "User not found".to_string(),
        ),
        AccountApplicationError::Auth(AuthError::Signing(ref e)) => internal("Token signing", e),
        AccountApplicationError::Auth(AuthError::PasswordHash(ref e)) => {
            tracing::error!(error = %e, "Password hashing error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An unexpected error occurred".to_string(),
            )
        }
        AccountApplicationError::Auth(ref e) => {
            (StatusCode::UNAUTHORIZED, "INVALID_TOKEN", e.to_string())
        }
        AccountApplicationError::RepositoryError(ref e) => internal("User repository", e.as_ref()),
    }
}

impl From<CatalogApplicationError> for ApiError {
    fn from(err: CatalogApplicationError) -> Self {
        ApiError::Catalog(err)
    }
}

impl From<BorrowingApplicationError> for ApiError {
    fn from(err: BorrowingApplicationError) -> Self {
        ApiError::Borrowing(err)
    }
}

impl From<PaymentApplicationError> for ApiError {
    fn from(err: PaymentApplicationError) -> Self {
        ApiError::Payment(err)
    }
}

impl From<AccountApplicationError> for ApiError {
    fn from(err: AccountApplicationError) -> Self {
        ApiError::Account(err)
    }
}

// 不正なJSONは axum既定の422ではなく400で返す
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            ApiError::Catalog(e) => map_catalog(e),
            ApiError::Borrowing(e) => map_borrowing(e),
            ApiError::Payment(e) => map_payment(e),
            ApiError::Account(e) => map_account(e),
            ApiError::Unauthorized(message) => (StatusCode::UNAUTHORIZED, "NOT_AUTHENTICATED", message),
            ApiError::Forbidden => (
                StatusCode::FORBIDDEN,
                "PERMISSION_DENIED",
                "You do not have permission to perform this action".to_string(),
            ),
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", message),
        };

        let body = Json(ErrorResponse::new(error_type, message));
        (status, body).into_response()
    }
}
