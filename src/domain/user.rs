use serde::{Deserialize, Serialize};

use super::{UserId, UserValidationError};

/// パスワードの最小文字数
pub const MIN_PASSWORD_LENGTH: usize = 5;

/// User集約 - 図書館の利用者（職員を含む）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub is_staff: bool,
}

/// メールアドレスを正規化する（前後空白除去・小文字化）
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// 純粋関数：メールアドレスの形式チェック
pub fn validate_email(email: &str) -> Result<(), UserValidationError> {
    let (local, domain) = email
        .split_once('@')
        .ok_or(UserValidationError::InvalidEmail)?;

    if local.is_empty()
        || domain.is_empty()
        || !domain.contains('.')
        || domain.starts_with('.')
        || domain.ends_with('.')
        || email.chars().any(char::is_whitespace)
    {
        return Err(UserValidationError::InvalidEmail);
    }
    Ok(())
}

/// 純粋関数：パスワードの長さチェック
pub fn validate_password(password: &str) -> Result<(), UserValidationError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(UserValidationError::PasswordTooShort);
    }
    Ok(())
}
