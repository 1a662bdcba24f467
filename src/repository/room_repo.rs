//! 会话投影存储契约与内存实现

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::model::Room;

/// 会话投影存储 trait
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// 取出同一会话键下的全部投影（稳定顺序）
    async fn find_by_room_id(&self, room_id: &str) -> Result<Vec<Room>>;

    /// 按（查看者，对端）定位查看者自己的投影
    async fn find_by_participants(
        &self,
        sender_id: &str,
        receiver_id: &str,
    ) -> Result<Option<Room>>;

    /// 保存投影
    async fn save(&self, room: &Room) -> Result<Room>;
}

/// 会话投影存储（内存实现）
///
/// 投影按插入顺序保存，保证扇出遍历顺序可重现。
#[derive(Clone, Default)]
pub struct InMemoryRoomRepository {
    rooms: Arc<RwLock<Vec<Room>>>,
}

impl InMemoryRoomRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    async fn find_by_room_id(&self, room_id: &str) -> Result<Vec<Room>> {
        let rooms = self.rooms.read().await;
        Ok(rooms
            .iter()
            .filter(|r| r.room_id == room_id)
            .cloned()
            .collect())
    }

    async fn find_by_participants(
        &self,
        sender_id: &str,
        receiver_id: &str,
    ) -> Result<Option<Room>> {
        let rooms = self.rooms.read().await;
        Ok(rooms
            .iter()
            .find(|r| r.sender_id == sender_id && r.receiver_id == receiver_id)
            .cloned())
    }

    async fn save(&self, room: &Room) -> Result<Room> {
        let mut rooms = self.rooms.write().await;
        match rooms.iter_mut().find(|r| r.id == room.id) {
            Some(slot) => *slot = room.clone(),
            None => rooms.push(room.clone()),
        }
        Ok(room.clone())
    }
}
