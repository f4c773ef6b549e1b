//! 認証情報：パスワードハッシュとJWTの発行・検証

pub mod password;
pub mod token;

pub use password::{hash_password, verify_password};
pub use token::{Claims, TokenIssuer, TokenPair, TokenType};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Token is invalid or expired")]
    InvalidToken(#[source] jsonwebtoken::errors::Error),

    #[error("Token has wrong type")]
    WrongTokenType,

    #[error("Token subject is not a user id")]
    InvalidSubject,

    #[error("Failed to sign token")]
    Signing(#[source] jsonwebtoken::errors::Error),

    #[error("Failed to hash password: {0}")]
    PasswordHash(String),
}
