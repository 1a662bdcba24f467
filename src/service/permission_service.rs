//! 群聊发言权限评估

use std::sync::Arc;

use crate::error::{ChatError, Result};
use crate::model::{Group, GroupStatus, SendMessagePermission};
use crate::repository::GroupRepository;

/// 权限评估服务（纯读，无副作用）
pub struct PermissionService {
    group_repository: Arc<dyn GroupRepository>,
}

impl PermissionService {
    pub fn new(group_repository: Arc<dyn GroupRepository>) -> Self {
        Self { group_repository }
    }

    /// 校验发送者能否向目标会话发言
    ///
    /// 目标不是群组时返回 `None`（单聊在此层始终放行）；
    /// 目标是群组时返回群组上下文，或以 `PermissionDenied` 拒绝。
    pub async fn authorize(&self, sender_id: &str, target_id: &str) -> Result<Option<Group>> {
        let Some(group) = self.group_repository.find_by_id(target_id).await? else {
            return Ok(None);
        };

        if group.group_status == GroupStatus::Inactive {
            return Err(ChatError::PermissionDenied("group inactive".to_string()));
        }
        if !group.is_member(sender_id) {
            return Err(ChatError::PermissionDenied(
                "user is not in group".to_string(),
            ));
        }
        match group.send_message_permission {
            SendMessagePermission::OnlyAdmin if !group.is_admin(sender_id) => {
                Err(ChatError::PermissionDenied(
                    "only admins or owner can send message".to_string(),
                ))
            }
            SendMessagePermission::OnlyOwner if group.owner != sender_id => {
                Err(ChatError::PermissionDenied(
                    "only owner can send message".to_string(),
                ))
            }
            _ => Ok(Some(group)),
        }
    }

    /// 判断会话键是否对应群聊
    pub async fn is_group_chat(&self, room_id: &str) -> Result<bool> {
        Ok(self.group_repository.find_by_id(room_id).await?.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryGroupRepository;

    async fn service_with_group(group: Group) -> PermissionService {
        let repo = Arc::new(InMemoryGroupRepository::new());
        repo.insert(group).await;
        PermissionService::new(repo)
    }

    fn test_group() -> Group {
        let mut group = Group::new("g1", "team", "owner");
        group.members = vec![
            "owner".to_string(),
            "admin".to_string(),
            "member".to_string(),
        ];
        group.admins = vec!["admin".to_string()];
        group
    }

    #[tokio::test]
    async fn test_direct_chat_is_always_authorized() {
        let service = PermissionService::new(Arc::new(InMemoryGroupRepository::new()));
        let result = service.authorize("alice", "bob").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_inactive_group_is_rejected() {
        let mut group = test_group();
        group.group_status = GroupStatus::Inactive;
        let service = service_with_group(group).await;
        assert!(matches!(
            service.authorize("member", "g1").await,
            Err(ChatError::PermissionDenied(_))
        ));
    }

    #[tokio::test]
    async fn test_non_member_is_rejected() {
        let service = service_with_group(test_group()).await;
        assert!(matches!(
            service.authorize("stranger", "g1").await,
            Err(ChatError::PermissionDenied(_))
        ));
    }

    #[tokio::test]
    async fn test_only_admin_policy() {
        let mut group = test_group();
        group.send_message_permission = SendMessagePermission::OnlyAdmin;
        let service = service_with_group(group).await;

        assert!(service.authorize("admin", "g1").await.unwrap().is_some());
        assert!(service.authorize("owner", "g1").await.unwrap().is_some());
        assert!(matches!(
            service.authorize("member", "g1").await,
            Err(ChatError::PermissionDenied(_))
        ));
    }

    #[tokio::test]
    async fn test_only_owner_policy() {
        let mut group = test_group();
        group.send_message_permission = SendMessagePermission::OnlyOwner;
        let service = service_with_group(group).await;

        assert!(service.authorize("owner", "g1").await.unwrap().is_some());
        assert!(matches!(
            service.authorize("admin", "g1").await,
            Err(ChatError::PermissionDenied(_))
        ));
    }
}
