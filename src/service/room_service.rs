//! 会话投影访问服务

use std::sync::Arc;

use crate::error::{ChatError, Result};
use crate::model::Room;
use crate::repository::RoomRepository;

/// 会话投影服务（投影存储的薄封装）
pub struct RoomService {
    room_repository: Arc<dyn RoomRepository>,
}

impl RoomService {
    pub fn new(room_repository: Arc<dyn RoomRepository>) -> Self {
        Self { room_repository }
    }

    /// 取出同一会话键下的全部投影
    pub async fn find_by_room_id(&self, room_id: &str) -> Result<Vec<Room>> {
        self.room_repository.find_by_room_id(room_id).await
    }

    /// 按（查看者，对端）定位投影
    pub async fn find_by_participants(
        &self,
        sender_id: &str,
        receiver_id: &str,
    ) -> Result<Option<Room>> {
        self.room_repository
            .find_by_participants(sender_id, receiver_id)
            .await
    }

    /// 保存投影
    pub async fn save_room(&self, room: &Room) -> Result<Room> {
        self.room_repository.save(room).await
    }

    /// 由（发送者，接收者）解析共享会话键
    pub async fn get_room_id(&self, sender_id: &str, receiver_id: &str) -> Result<String> {
        let room = self
            .room_repository
            .find_by_participants(sender_id, receiver_id)
            .await?
            .ok_or_else(|| ChatError::RoomNotFound("room not found".to_string()))?;
        Ok(room.room_id)
    }
}
