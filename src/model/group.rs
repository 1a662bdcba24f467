//! 群组模型（本引擎只读，由群管理方维护）

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 群组状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GroupStatus {
    /// 活跃
    #[default]
    Active,
    /// 已停用（只保留系统消息可见）
    Inactive,
}

/// 群内发言权限策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SendMessagePermission {
    #[default]
    Everyone,
    OnlyAdmin,
    OnlyOwner,
}

/// 群组
///
/// 群组 ID 同时作为群聊的会话键使用。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub id: String,
    pub name: String,
    pub avatar: Option<String>,
    pub members: Vec<String>,
    pub admins: Vec<String>,
    pub owner: String,
    pub group_status: GroupStatus,
    pub send_message_permission: SendMessagePermission,
    pub created_at: DateTime<Utc>,
}

impl Group {
    /// 创建新群组（群主自动入群）
    pub fn new(id: &str, name: &str, owner: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            avatar: None,
            members: vec![owner.to_string()],
            admins: Vec::new(),
            owner: owner.to_string(),
            group_status: GroupStatus::Active,
            send_message_permission: SendMessagePermission::Everyone,
            created_at: Utc::now(),
        }
    }

    /// 是否为群成员
    pub fn is_member(&self, user_id: &str) -> bool {
        self.members.iter().any(|m| m == user_id)
    }

    /// 是否为管理员或群主
    pub fn is_admin(&self, user_id: &str) -> bool {
        self.owner == user_id || self.admins.iter().any(|a| a == user_id)
    }
}
