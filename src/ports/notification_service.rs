use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 外部通知のポート
///
/// プレーンテキストのメッセージをチャットやログに届ける。
/// 配信はベストエフォートで、失敗は呼び出し側がログに残して先に進む。
#[async_trait]
pub trait NotificationService: Send + Sync {
    async fn send(&self, text: &str) -> Result<()>;

    /// ログのフィールドに使う短い名前
    fn provider_name(&self) -> &'static str;
}
