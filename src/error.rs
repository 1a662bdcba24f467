use std::error::Error as StdError;
use std::fmt;

use serde::{Deserialize, Serialize};

/// 聊天引擎错误类型
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ChatError {
    /// 内部错误
    Internal(String),
    /// 资源未找到
    NotFound(String),
    /// 用户未找到
    UserNotFound(String),
    /// 会话未找到
    RoomNotFound(String),
    /// 消息未找到
    MessageNotFound(String),
    /// 权限不足
    PermissionDenied(String),
    /// 验证错误
    Validation(String),
    /// 投递错误（持久化/扇出阶段的瞬时失败）
    Delivery(String),
    /// 序列化错误
    Serialization(String),
    /// 配置错误
    Configuration(String),
}

impl fmt::Display for ChatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatError::Internal(msg) => write!(f, "Internal error: {}", msg),
            ChatError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ChatError::UserNotFound(id) => write!(f, "User not found: {}", id),
            ChatError::RoomNotFound(msg) => write!(f, "Room not found: {}", msg),
            ChatError::MessageNotFound(id) => write!(f, "Message not found: {}", id),
            ChatError::PermissionDenied(msg) => write!(f, "Permission denied: {}", msg),
            ChatError::Validation(msg) => write!(f, "Validation error: {}", msg),
            ChatError::Delivery(msg) => write!(f, "Delivery error: {}", msg),
            ChatError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            ChatError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl StdError for ChatError {}

impl From<serde_json::Error> for ChatError {
    fn from(err: serde_json::Error) -> Self {
        ChatError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for ChatError {
    fn from(err: std::io::Error) -> Self {
        ChatError::Internal(err.to_string())
    }
}

/// 结果类型别名
pub type Result<T> = std::result::Result<T, ChatError>;
