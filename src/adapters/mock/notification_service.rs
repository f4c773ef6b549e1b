use crate::ports::notification_service::{NotificationService as NotificationServiceTrait, Result};
use async_trait::async_trait;
use std::sync::Mutex;

/// NotificationServiceのモック実装
///
/// 実際には送信せず、ログに出して記録だけする。
pub struct NotificationService {
    messages: Mutex<Vec<String>>,
}

impl NotificationService {
    pub fn new() -> Self {
        Self {
            messages: Mutex::new(Vec::new()),
        }
    }

    /// これまでに「送信」したメッセージ
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl Default for NotificationService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NotificationServiceTrait for NotificationService {
    async fn send(&self, text: &str) -> Result<()> {
        tracing::info!(message = %text, "Notification (not delivered)");
        self.messages.lock().unwrap().push(text.to_string());
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "log"
    }
}
