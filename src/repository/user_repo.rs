//! 用户目录契约与内存实现（本引擎只读）

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::model::User;

/// 用户目录 trait
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// 根据用户ID查找
    async fn find_by_user_id(&self, user_id: &str) -> Result<Option<User>>;
}

/// 用户目录（内存实现）
#[derive(Clone, Default)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<String, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 写入用户记录（账号体系属于外部协作方，这里只为测试与演示提供入口）
    pub async fn insert(&self, user: User) {
        let mut users = self.users.write().await;
        users.insert(user.id.clone(), user);
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_user_id(&self, user_id: &str) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(user_id).cloned())
    }
}
