//! 通知发布端口
//!
//! 投递引擎只向外发事件，不关心订阅方是否在线；
//! publish 不等待订阅方，也不提供送达保证。

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::debug;

use super::types::UserNotify;
use crate::error::Result;

/// 通知发布 trait（单向出站端口）
#[async_trait]
pub trait NotificationPublisher: Send + Sync {
    /// 向目标用户的指定通道推送一条事件（尽力而为）
    async fn publish(&self, target_user_id: &str, channel: &str, notify: UserNotify) -> Result<()>;
}

/// 进程内发布器
///
/// 按用户维护无界通道；没有订阅者或订阅方已断开时事件直接丢弃。
#[derive(Default)]
pub struct InProcessPublisher {
    subscribers: DashMap<String, mpsc::UnboundedSender<UserNotify>>,
}

impl InProcessPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// 订阅某个用户的通知流（重复订阅会替换旧通道）
    pub fn subscribe(&self, user_id: &str) -> mpsc::UnboundedReceiver<UserNotify> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.insert(user_id.to_string(), tx);
        rx
    }
}

#[async_trait]
impl NotificationPublisher for InProcessPublisher {
    async fn publish(&self, target_user_id: &str, channel: &str, notify: UserNotify) -> Result<()> {
        match self.subscribers.get(target_user_id) {
            Some(tx) => {
                if tx.send(notify).is_err() {
                    debug!(
                        "订阅通道已关闭，丢弃事件: user={}, channel={}",
                        target_user_id, channel
                    );
                }
            }
            None => {
                debug!(
                    "无在线订阅者，丢弃事件: user={}, channel={}",
                    target_user_id, channel
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::push::types::{NotifyStatus, NOTIFY_CHANNEL};

    #[tokio::test]
    async fn test_publish_reaches_subscriber() {
        let publisher = InProcessPublisher::new();
        let mut rx = publisher.subscribe("alice");

        publisher
            .publish(
                "alice",
                NOTIFY_CHANNEL,
                UserNotify::new(NotifyStatus::Sent, "bob", "alice"),
            )
            .await
            .unwrap();

        let notify = rx.try_recv().unwrap();
        assert_eq!(notify.status, NotifyStatus::Sent);
        assert_eq!(notify.sender_id, "bob");
    }

    #[tokio::test]
    async fn test_publish_without_subscriber_is_dropped() {
        let publisher = InProcessPublisher::new();
        let result = publisher
            .publish(
                "nobody",
                NOTIFY_CHANNEL,
                UserNotify::new(NotifyStatus::Seen, "a", "b"),
            )
            .await;
        assert!(result.is_ok());
    }
}
