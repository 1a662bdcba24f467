//! 存储契约层
//!
//! 持久化机制不属于本引擎，这里只定义读写契约；
//! 内存实现用于测试与独立运行。

pub mod group_repo;
pub mod message_repo;
pub mod room_repo;
pub mod user_repo;

pub use group_repo::{GroupRepository, InMemoryGroupRepository};
pub use message_repo::{InMemoryMessageRepository, MessageRepository};
pub use room_repo::{InMemoryRoomRepository, RoomRepository};
pub use user_repo::{InMemoryUserRepository, UserRepository};

/// 分页参数
#[derive(Debug, Clone)]
pub struct PaginationParams {
    pub page: u32,
    pub per_page: u32,
    pub offset: u32,
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 20,
            offset: 0,
        }
    }
}

impl PaginationParams {
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page,
            per_page,
            offset: (page - 1) * per_page,
        }
    }
}

/// 分页结果
#[derive(Debug, Clone)]
pub struct PaginationResult<T> {
    pub data: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u32,
}

impl<T> PaginationResult<T> {
    pub fn new(data: Vec<T>, total: u64, page: u32, per_page: u32) -> Self {
        let total_pages = ((total as f64) / (per_page as f64)).ceil() as u32;
        Self {
            data,
            total,
            page,
            per_page,
            total_pages,
        }
    }
}
