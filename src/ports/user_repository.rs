use crate::domain::{User, UserId};
use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 利用者アカウントの永続化ポート
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// メールアドレスが登録済みなら `false`
    async fn insert(&self, user: &User) -> Result<bool>;

    async fn get_by_id(&self, user_id: UserId) -> Result<Option<User>>;

    /// 正規化済み（小文字）のメールアドレスで検索
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    /// 新しいメールアドレスが他のアカウントのものなら `false`
    async fn update(&self, user: &User) -> Result<bool>;
}
