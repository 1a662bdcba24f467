//! 消息模型与消息状态机

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 消息类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageType {
    Text,
    Image,
    File,
    Audio,
    Video,
    AudioCall,
    VideoCall,
    System,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::Text => "TEXT",
            MessageType::Image => "IMAGE",
            MessageType::File => "FILE",
            MessageType::Audio => "AUDIO",
            MessageType::Video => "VIDEO",
            MessageType::AudioCall => "AUDIO_CALL",
            MessageType::VideoCall => "VIDEO_CALL",
            MessageType::System => "SYSTEM",
        }
    }

    /// 是否为通话消息
    pub fn is_call(&self) -> bool {
        matches!(self, MessageType::AudioCall | MessageType::VideoCall)
    }
}

/// 消息状态
///
/// 状态机：Sending → {Sent, Error}，Sent → Received → Seen，
/// 已发出的消息可以从任意状态撤回（Revoked 为终态）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageStatus {
    Sending,
    Sent,
    Error,
    Received,
    Seen,
    Revoked,
}

impl MessageStatus {
    /// 校验能否迁移到目标状态
    pub fn can_transition(self, next: MessageStatus) -> bool {
        use MessageStatus::*;
        match (self, next) {
            // 撤回对任何未撤回状态都可达
            (Revoked, Revoked) => false,
            (_, Revoked) => true,
            (Sending, Sent) | (Sending, Error) => true,
            (Sent, Received) => true,
            // 部分路径会跳过 Received 直接标记已读
            (Sent, Seen) | (Received, Seen) => true,
            _ => false,
        }
    }
}

/// 文件引用（文件名 + 扩展名）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileObject {
    pub file_name: String,
    pub file_extension: String,
}

impl FileObject {
    /// 按最后一个 `.` 拆分文件名与扩展名
    pub fn from_file_name(name: &str) -> Self {
        match name.rsplit_once('.') {
            Some((file_name, extension)) => Self {
                file_name: file_name.to_string(),
                file_extension: extension.to_string(),
            },
            None => Self {
                file_name: name.to_string(),
                file_extension: String::new(),
            },
        }
    }
}

/// 通话状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CallStatus {
    Start,
    Accept,
    Reject,
    End,
}

/// 通话信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallInfo {
    pub call_status: CallStatus,
}

/// 消息内容（带显式判别标签的和类型）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum MessageContent {
    /// 文本内容
    Text(String),
    /// 单个文件引用
    File(FileObject),
    /// 文件引用列表（图片组）
    Files(Vec<FileObject>),
    /// 通话信息
    Call(CallInfo),
}

impl MessageContent {
    /// 是否为文件类内容
    pub fn is_file(&self) -> bool {
        matches!(self, MessageContent::File(_) | MessageContent::Files(_))
    }
}

/// 消息模型
///
/// 消息只追加与改状态，撤回是一种状态而不是删除。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub sender_id: String,
    /// 用户 ID 或群组 ID
    pub receiver_id: String,
    pub room_id: String,
    /// 发送者昵称（从用户目录反规范化）
    pub sender_name: Option<String>,
    /// 发送者头像
    pub sender_avatar: Option<String>,
    pub message_type: MessageType,
    pub content: MessageContent,
    pub message_status: MessageStatus,
    pub send_date: DateTime<Utc>,
    pub seen_date: Option<DateTime<Utc>>,
    /// 发送方单侧隐藏标记（软删除）
    pub hidden_sender_side: bool,
}

impl Message {
    /// 创建处于 Sending 状态的新消息
    pub fn new(
        sender_id: &str,
        receiver_id: &str,
        room_id: &str,
        message_type: MessageType,
        content: MessageContent,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            sender_id: sender_id.to_string(),
            receiver_id: receiver_id.to_string(),
            room_id: room_id.to_string(),
            sender_name: None,
            sender_avatar: None,
            message_type,
            content,
            message_status: MessageStatus::Sending,
            send_date: Utc::now(),
            seen_date: None,
            hidden_sender_side: false,
        }
    }

    /// 标记为已发送（持久化确认后）
    pub fn mark_sent(&mut self, time: DateTime<Utc>) {
        self.message_status = MessageStatus::Sent;
        self.send_date = time;
    }

    /// 标记为发送失败
    pub fn mark_error(&mut self) {
        if self.message_status.can_transition(MessageStatus::Error) {
            self.message_status = MessageStatus::Error;
        }
    }

    /// 标记为已送达
    pub fn mark_received(&mut self) {
        if self.message_status.can_transition(MessageStatus::Received) {
            self.message_status = MessageStatus::Received;
        }
    }

    /// 标记为已读；已读与已撤回的消息不再变化
    pub fn mark_seen(&mut self, time: DateTime<Utc>) {
        if self.message_status.can_transition(MessageStatus::Seen) {
            self.message_status = MessageStatus::Seen;
            self.seen_date = Some(time);
        }
    }

    /// 标记为已撤回（终态，内容保留）
    pub fn mark_revoked(&mut self) {
        self.message_status = MessageStatus::Revoked;
    }

    /// 是否为系统消息
    pub fn is_system_message(&self) -> bool {
        matches!(self.message_type, MessageType::System)
    }

    /// 会话列表预览文本：文件/通话类内容显示消息类型标签，文本显示原文
    pub fn preview_text(&self) -> String {
        match &self.content {
            MessageContent::Text(text) => text.clone(),
            MessageContent::File(_) | MessageContent::Files(_) | MessageContent::Call(_) => {
                self.message_type.as_str().to_string()
            }
        }
    }

    /// 投递失败补偿时写入发送者投影的内容：单文件显示文件名
    pub fn failure_preview(&self) -> String {
        match &self.content {
            MessageContent::Text(text) => text.clone(),
            MessageContent::File(file) => file.file_name.clone(),
            MessageContent::Files(files) => files
                .first()
                .map(|f| f.file_name.clone())
                .unwrap_or_else(|| self.message_type.as_str().to_string()),
            MessageContent::Call(_) => self.message_type.as_str().to_string(),
        }
    }
}
