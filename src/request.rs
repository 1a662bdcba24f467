//! 入站请求模型

use serde::{Deserialize, Serialize};

use crate::error::{ChatError, Result};
use crate::model::{FileObject, Message, MessageContent, MessageType};

/// 图片组消息允许的扩展名
const IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "png", "gif", "bmp"];

/// 上传附件（原始字节 + 文件名）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileAttachment {
    pub file_name: String,
    pub data: Vec<u8>,
}

/// 聊天消息请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub sender_id: String,
    /// 用户 ID 或群组 ID
    pub receiver_id: String,
    pub message_type: MessageType,
    pub text_content: Option<String>,
    pub file_content: Option<FileAttachment>,
    pub hidden_sender_side: bool,
}

impl ChatRequest {
    /// 构造文本消息请求
    pub fn text(sender_id: &str, receiver_id: &str, text: &str) -> Self {
        Self {
            sender_id: sender_id.to_string(),
            receiver_id: receiver_id.to_string(),
            message_type: MessageType::Text,
            text_content: Some(text.to_string()),
            file_content: None,
            hidden_sender_side: false,
        }
    }

    /// 构造文件消息请求
    pub fn with_file(
        sender_id: &str,
        receiver_id: &str,
        message_type: MessageType,
        attachment: FileAttachment,
    ) -> Self {
        Self {
            sender_id: sender_id.to_string(),
            receiver_id: receiver_id.to_string(),
            message_type,
            text_content: None,
            file_content: Some(attachment),
            hidden_sender_side: false,
        }
    }

    /// 转换为处于 Sending 状态的消息
    pub fn to_message(&self, room_id: &str) -> Message {
        let content = match &self.file_content {
            Some(attachment) => {
                MessageContent::File(FileObject::from_file_name(&attachment.file_name))
            }
            None => MessageContent::Text(self.text_content.clone().unwrap_or_default()),
        };
        let mut message = Message::new(
            &self.sender_id,
            &self.receiver_id,
            room_id,
            self.message_type,
            content,
        );
        message.hidden_sender_side = self.hidden_sender_side;
        message
    }
}

/// 图片组消息请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatFilesRequest {
    pub sender_id: String,
    pub receiver_id: String,
    pub message_type: MessageType,
    pub files_content: Vec<FileAttachment>,
}

impl ChatFilesRequest {
    /// 校验所有附件都是图片
    pub fn validate_images(&self) -> Result<()> {
        for attachment in &self.files_content {
            let file = FileObject::from_file_name(&attachment.file_name);
            let extension = file.file_extension.to_lowercase();
            if !IMAGE_EXTENSIONS.contains(&extension.as_str()) {
                return Err(ChatError::Validation("all files must be image".to_string()));
            }
        }
        Ok(())
    }

    /// 转换为处于 Sending 状态的消息
    pub fn to_message(&self, room_id: &str) -> Message {
        let files = self
            .files_content
            .iter()
            .map(|attachment| FileObject::from_file_name(&attachment.file_name))
            .collect();
        Message::new(
            &self.sender_id,
            &self.receiver_id,
            room_id,
            self.message_type,
            MessageContent::Files(files),
        )
    }
}

/// 通话请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallRequest {
    pub sender_id: String,
    pub receiver_id: String,
    pub message_id: Option<String>,
    pub message_type: MessageType,
}
