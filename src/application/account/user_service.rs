use crate::application::ServiceDependencies;
use crate::auth::{self, TokenIssuer, TokenPair, TokenType};
use crate::domain::{
    User, UserId,
    commands::RegisterUser,
    user::{normalize_email, validate_email, validate_password},
};

use super::errors::{AccountApplicationError, Result};

/// プロフィール更新入力（PUT: 全項目置き換え）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

fn new_user(cmd: RegisterUser, is_staff: bool) -> Result<User> {
    let email = normalize_email(&cmd.email);
    validate_email(&email)?;
    validate_password(&cmd.password)?;

    Ok(User {
        id: UserId::new(),
        email,
        password_hash: auth::hash_password(&cmd.password)?,
        first_name: cmd.first_name.trim().to_string(),
        last_name: cmd.last_name.trim().to_string(),
        is_staff,
    })
}

/// 利用者を登録する（職員権限なし）
pub async fn register(deps: &ServiceDependencies, cmd: RegisterUser) -> Result<User> {
    let user = new_user(cmd, false)?;

    let inserted = deps
        .users
        .insert(&user)
        .await
        .map_err(AccountApplicationError::RepositoryError)?;

    if !inserted {
        return Err(AccountApplicationError::EmailTaken);
    }

    tracing::info!(user_id = %user.id, "User registered");
    Ok(user)
}

/// 起動時に職員アカウントを用意する
///
/// 既に同じメールアドレスのアカウントがあれば何もしない。
pub async fn ensure_staff_account(
    deps: &ServiceDependencies,
    email: &str,
    password: &str,
) -> Result<()> {
    let existing = deps
        .users
        .find_by_email(&normalize_email(email))
        .await
        .map_err(AccountApplicationError::RepositoryError)?;

    if existing.is_some() {
        return Ok(());
    }

    let staff = new_user(
        RegisterUser {
            email: email.to_string(),
            password: password.to_string(),
            first_name: String::new(),
            last_name: String::new(),
        },
        true,
    )?;

    deps.users
        .insert(&staff)
        .await
        .map_err(AccountApplicationError::RepositoryError)?;

    tracing::info!(user_id = %staff.id, "Staff account created");
    Ok(())
}

/// メールアドレスとパスワードでトークンを発行する
pub async fn obtain_token(
    deps: &ServiceDependencies,
    tokens: &TokenIssuer,
    email: &str,
    password: &str,
) -> Result<TokenPair> {
    let user = deps
        .users
        .find_by_email(&normalize_email(email))
        .await
        .map_err(AccountApplicationError::RepositoryError)?
        .ok_or(AccountApplicationError::InvalidCredentials)?;

    if !auth::verify_password(password, &user.password_hash) {
        return Err(AccountApplicationError::InvalidCredentials);
    }

    Ok(tokens.issue_pair(user.id)?)
}

/// リフレッシュトークンからアクセストークンを再発行する
pub fn refresh_token(tokens: &TokenIssuer, refresh: &str) -> Result<String> {
    Ok(tokens.refresh(refresh)?)
}

/// トークンの署名・有効期限を検証する（種別は問わない）
pub fn verify_token(tokens: &TokenIssuer, token: &str) -> Result<()> {
    tokens.decode(token)?;
    Ok(())
}

/// アクセストークンから利用者を解決する
pub async fn authenticate(
    deps: &ServiceDependencies,
    tokens: &TokenIssuer,
    access_token: &str,
) -> Result<User> {
    let user_id = tokens.verify(access_token, TokenType::Access)?;
    get_profile(deps, user_id).await
}

/// プロフィールを取得する
pub async fn get_profile(deps: &ServiceDependencies, user_id: UserId) -> Result<User> {
    deps.users
        .get_by_id(user_id)
        .await
        .map_err(AccountApplicationError::RepositoryError)?
        .ok_or(AccountApplicationError::UserNotFound)
}

/// プロフィールを更新する
pub async fn update_profile(
    deps: &ServiceDependencies,
    user_id: UserId,
    update: ProfileUpdate,
) -> Result<User> {
    let current = get_profile(deps, user_id).await?;

    let email = normalize_email(&update.email);
    validate_email(&email)?;
    validate_password(&update.password)?;

    let updated = User {
        email,
        password_hash: auth::hash_password(&update.password)?,
        first_name: update.first_name.trim().to_string(),
        last_name: update.last_name.trim().to_string(),
        ..current
    };

    let saved = deps
        .users
        .update(&updated)
        .await
        .map_err(AccountApplicationError::RepositoryError)?;

    if !saved {
        return Err(AccountApplicationError::EmailTaken);
    }
    Ok(updated)
}
