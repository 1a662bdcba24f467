//! 会话投影模型
//!
//! 一个逻辑会话有 N 个参与者时就有 N 条共享 `room_id` 的投影记录，
//! 每条投影的未读数与预览独立维护。投影由会话建立方创建，本引擎只更新。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::message::MessageStatus;

/// 会话类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoomType {
    Direct,
    Group,
}

/// 会话投影（每个查看者一条）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub id: String,
    /// 共享会话键，同一逻辑会话的所有投影相同
    pub room_id: String,
    /// 该投影所属的查看者
    pub sender_id: String,
    /// 单聊中的对端（群聊中为群组 ID）
    pub receiver_id: String,
    pub room_type: RoomType,
    /// 最近一条消息的预览文本
    pub latest_message: String,
    /// 最近一条消息的状态镜像
    pub message_status: Option<MessageStatus>,
    pub number_of_unread_message: u32,
    /// 对端头像
    pub avatar_receiver: Option<String>,
    /// 最近活动时间
    pub time: DateTime<Utc>,
    /// 最近一条消息是否由该查看者发出
    pub is_sender: bool,
}

impl Room {
    /// 创建新投影
    pub fn new(room_id: &str, sender_id: &str, receiver_id: &str, room_type: RoomType) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            room_id: room_id.to_string(),
            sender_id: sender_id.to_string(),
            receiver_id: receiver_id.to_string(),
            room_type,
            latest_message: String::new(),
            message_status: None,
            number_of_unread_message: 0,
            avatar_receiver: None,
            time: Utc::now(),
            is_sender: false,
        }
    }

    /// 以发送者视角刷新投影：未读清零
    pub fn apply_outgoing(&mut self, preview: String, time: DateTime<Utc>) {
        self.latest_message = preview;
        self.time = time;
        self.is_sender = true;
        self.number_of_unread_message = 0;
    }

    /// 以接收者视角刷新投影：未读加一
    pub fn apply_incoming(&mut self, preview: String, time: DateTime<Utc>) {
        self.latest_message = preview;
        self.time = time;
        self.is_sender = false;
        self.number_of_unread_message += 1;
    }
}
