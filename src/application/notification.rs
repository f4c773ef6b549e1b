use crate::domain::LibraryEvent;
use crate::ports::NotificationService;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::warn;

/// 通知キューの容量
const QUEUE_CAPACITY: usize = 256;

/// 通知ディスパッチャ
///
/// リクエスト処理からは`try_notify`でキューに積むだけで、
/// 実際の送信はバックグラウンドのワーカーが行う。
/// 送信失敗はログに残して破棄する（再送しない）。
#[derive(Clone)]
pub struct Notifier {
    tx: mpsc::Sender<LibraryEvent>,
}

impl Notifier {
    /// ワーカーを起動する（Tokioランタイム内で呼ぶこと）
    pub fn new(providers: Vec<Arc<dyn NotificationService>>) -> Self {
        let (tx, mut rx) = mpsc::channel::<LibraryEvent>(QUEUE_CAPACITY);

        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                let text = event.message();
                for provider in &providers {
                    if let Err(error) = provider.send(&text).await {
                        warn!(
                            provider = provider.provider_name(),
                            error = %error,
                            "Notification provider failed"
                        );
                    }
                }
            }
        });

        Self { tx }
    }

    /// イベントをキューに積む（ブロックしない）
    pub fn try_notify(&self, event: LibraryEvent) {
        match self.tx.try_send(event) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!("Notification queue full; dropping event");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                warn!("Notification queue closed; dropping event");
            }
        }
    }
}
