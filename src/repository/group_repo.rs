//! 群组目录契约与内存实现（本引擎只读）

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::model::Group;

/// 群组目录 trait
#[async_trait]
pub trait GroupRepository: Send + Sync {
    /// 根据群组ID查找（群组 ID 同时是群聊会话键）
    async fn find_by_id(&self, group_id: &str) -> Result<Option<Group>>;
}

/// 群组目录（内存实现）
#[derive(Clone, Default)]
pub struct InMemoryGroupRepository {
    groups: Arc<RwLock<HashMap<String, Group>>>,
}

impl InMemoryGroupRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 写入群组记录（群管理属于外部协作方，这里只为测试与演示提供入口）
    pub async fn insert(&self, group: Group) {
        let mut groups = self.groups.write().await;
        groups.insert(group.id.clone(), group);
    }
}

#[async_trait]
impl GroupRepository for InMemoryGroupRepository {
    async fn find_by_id(&self, group_id: &str) -> Result<Option<Group>> {
        let groups = self.groups.read().await;
        Ok(groups.get(group_id).cloned())
    }
}
