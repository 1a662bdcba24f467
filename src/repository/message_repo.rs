//! 消息存储契约与内存实现

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{PaginationParams, PaginationResult};
use crate::error::Result;
use crate::model::{Message, MessageStatus};

/// 消息存储 trait
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// 创建消息
    async fn create(&self, message: &Message) -> Result<Message>;

    /// 根据ID查找消息
    async fn find_by_id(&self, message_id: &str) -> Result<Option<Message>>;

    /// 保存消息（状态变更后回写）
    async fn save(&self, message: &Message) -> Result<Message>;

    /// 获取会话的消息（按发送时间倒序分页）
    async fn find_by_room_id(
        &self,
        room_id: &str,
        page: &PaginationParams,
    ) -> Result<PaginationResult<Message>>;

    /// 获取会话中处于指定状态的消息（按发送时间升序）
    async fn find_by_room_id_and_status(
        &self,
        room_id: &str,
        status: MessageStatus,
    ) -> Result<Vec<Message>>;

    /// 全局最近一条消息
    async fn find_most_recent(&self) -> Result<Option<Message>>;
}

/// 消息存储（内存实现）
#[derive(Clone, Default)]
pub struct InMemoryMessageRepository {
    messages: Arc<RwLock<HashMap<String, Message>>>,
}

impl InMemoryMessageRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessageRepository for InMemoryMessageRepository {
    async fn create(&self, message: &Message) -> Result<Message> {
        let mut messages = self.messages.write().await;
        messages.insert(message.id.clone(), message.clone());
        Ok(message.clone())
    }

    async fn find_by_id(&self, message_id: &str) -> Result<Option<Message>> {
        let messages = self.messages.read().await;
        Ok(messages.get(message_id).cloned())
    }

    async fn save(&self, message: &Message) -> Result<Message> {
        let mut messages = self.messages.write().await;
        messages.insert(message.id.clone(), message.clone());
        Ok(message.clone())
    }

    async fn find_by_room_id(
        &self,
        room_id: &str,
        page: &PaginationParams,
    ) -> Result<PaginationResult<Message>> {
        let messages = self.messages.read().await;
        let mut in_room: Vec<Message> = messages
            .values()
            .filter(|m| m.room_id == room_id)
            .cloned()
            .collect();
        in_room.sort_by(|a, b| b.send_date.cmp(&a.send_date));

        let total = in_room.len() as u64;
        let data: Vec<Message> = in_room
            .into_iter()
            .skip(page.offset as usize)
            .take(page.per_page as usize)
            .collect();
        Ok(PaginationResult::new(data, total, page.page, page.per_page))
    }

    async fn find_by_room_id_and_status(
        &self,
        room_id: &str,
        status: MessageStatus,
    ) -> Result<Vec<Message>> {
        let messages = self.messages.read().await;
        let mut matching: Vec<Message> = messages
            .values()
            .filter(|m| m.room_id == room_id && m.message_status == status)
            .cloned()
            .collect();
        matching.sort_by_key(|m| m.send_date);
        Ok(matching)
    }

    async fn find_most_recent(&self) -> Result<Option<Message>> {
        let messages = self.messages.read().await;
        Ok(messages
            .values()
            .max_by_key(|m| m.send_date)
            .cloned())
    }
}
