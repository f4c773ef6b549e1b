use crate::ports::notification_service::{NotificationService, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

/// Telegram Bot API経由でチャットに通知を送る
pub struct TelegramNotifier {
    client: Client,
    endpoint: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(bot_token: &str, chat_id: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(5))
            .build()?;

        Ok(Self {
            client,
            endpoint: format!("https://api.telegram.org/bot{}/sendMessage", bot_token),
            chat_id,
        })
    }
}

#[async_trait]
impl NotificationService for TelegramNotifier {
    async fn send(&self, text: &str) -> Result<()> {
        let payload = json!({
            "chat_id": self.chat_id,
            "text": text,
        });

        let resp = self.client.post(&self.endpoint).json(&payload).send().await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(format!("telegram sendMessage failed: {} {}", status, body).into());
        }

        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "telegram"
    }
}
