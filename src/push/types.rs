//! 出站通知事件

use serde::{Deserialize, Serialize};

use crate::model::{Message, Room};

/// 用户通知通道名
pub const NOTIFY_CHANNEL: &str = "queue/messages";

/// 通知状态标签
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotifyStatus {
    Success,
    Sent,
    Seen,
    RevokedMessage,
    CallRequest,
    Error,
}

impl NotifyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotifyStatus::Success => "SUCCESS",
            NotifyStatus::Sent => "SENT",
            NotifyStatus::Seen => "SEEN",
            NotifyStatus::RevokedMessage => "REVOKED_MESSAGE",
            NotifyStatus::CallRequest => "CALL_REQUEST",
            NotifyStatus::Error => "ERROR",
        }
    }
}

/// 用户通知事件（瞬态，不落库）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserNotify {
    pub status: NotifyStatus,
    pub sender_id: String,
    pub receiver_id: String,
    pub message: Option<Message>,
    pub room: Option<Room>,
}

impl UserNotify {
    pub fn new(status: NotifyStatus, sender_id: &str, receiver_id: &str) -> Self {
        Self {
            status,
            sender_id: sender_id.to_string(),
            receiver_id: receiver_id.to_string(),
            message: None,
            room: None,
        }
    }

    /// 附带消息负载
    pub fn with_message(mut self, message: Message) -> Self {
        self.message = Some(message);
        self
    }

    /// 附带会话投影负载
    pub fn with_room(mut self, room: Room) -> Self {
        self.room = Some(room);
        self
    }
}
