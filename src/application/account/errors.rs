use crate::auth::AuthError;
use crate::domain::UserValidationError;
use thiserror::Error;

/// アカウント管理アプリケーション層のエラー
#[derive(Debug, Error)]
pub enum AccountApplicationError {
    /// 入力値が不正
    #[error(transparent)]
    InvalidUser(#[from] UserValidationError),

    /// メールアドレスが登録済み
    #[error("User with this email already exists")]
    EmailTaken,

    /// メールアドレスまたはパスワードが違う
    #[error("No active account found with the given credentials")]
    InvalidCredentials,

    /// トークンの主体が存在しない
    #[error("User not found")]
    UserNotFound,

    /// トークン・パスワードハッシュのエラー
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// UserRepositoryのエラー
    #[error("User repository error")]
    RepositoryError(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// アプリケーション層の Result型
pub type Result<T> = std::result::Result<T, AccountApplicationError>;
