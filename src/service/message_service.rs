//! 消息投递引擎
//!
//! 一条入站消息/通话事件经过：权限评估 → 消息落库（状态机推进）→
//! 会话投影扇出（逐条更新未读数与预览）→ 通知推送 →（通话）信令桥接。
//! 扇出对同一会话键下的投影逐条顺序执行，不做内部并行；
//! 并发写同一投影时由存储的单文档原子性兜底，未读数按最后写入为准。

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::error::{ChatError, Result};
use crate::model::{
    CallInfo, CallStatus, Group, GroupStatus, Message, MessageContent, MessageStatus, MessageType,
    RoomType, User,
};
use crate::push::{NotificationPublisher, NotifyStatus, UserNotify, NOTIFY_CHANNEL};
use crate::repository::{GroupRepository, MessageRepository, PaginationParams, UserRepository};
use crate::request::{CallRequest, ChatFilesRequest, ChatRequest};
use crate::service::call_adapter::CallSessionAdapter;
use crate::service::permission_service::PermissionService;
use crate::service::room_service::RoomService;
use crate::service::upload_service::FileUploadService;

/// 单聊语音通话预览
const AUDIO_CALL_PREVIEW: &str = "语音通话";
/// 单聊视频通话预览
const VIDEO_CALL_PREVIEW: &str = "视频通话";
/// 群通话预览：发起者自己视角
const GROUP_CALL_STARTED_SELF: &str = "已发起群组通话";
/// 群通话预览：其他成员视角（前缀发起者昵称）
const GROUP_CALL_STARTED_OTHER: &str = "发起了群组通话";

/// 分页消息查询结果
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub messages: Vec<Message>,
    pub total_page: u32,
}

/// 消息投递引擎
pub struct MessageService {
    user_repository: Arc<dyn UserRepository>,
    group_repository: Arc<dyn GroupRepository>,
    message_repository: Arc<dyn MessageRepository>,
    room_service: Arc<RoomService>,
    permission_service: Arc<PermissionService>,
    upload_service: Arc<dyn FileUploadService>,
    publisher: Arc<dyn NotificationPublisher>,
    call_adapter: Arc<dyn CallSessionAdapter>,
}

impl MessageService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        group_repository: Arc<dyn GroupRepository>,
        message_repository: Arc<dyn MessageRepository>,
        room_service: Arc<RoomService>,
        permission_service: Arc<PermissionService>,
        upload_service: Arc<dyn FileUploadService>,
        publisher: Arc<dyn NotificationPublisher>,
        call_adapter: Arc<dyn CallSessionAdapter>,
    ) -> Self {
        Self {
            user_repository,
            group_repository,
            message_repository,
            room_service,
            permission_service,
            upload_service,
            publisher,
            call_adapter,
        }
    }

    /// 发送消息
    ///
    /// 权限与会话解析失败向上抛出；进入投递阶段后的失败不再向上抛出，
    /// 转为对发送者自己投影的尽力补偿写入（不发任何通知）。
    pub async fn send_message(&self, request: &ChatRequest) -> Result<()> {
        // 群聊发言权限（单聊直接放行）
        let group = self
            .permission_service
            .authorize(&request.sender_id, &request.receiver_id)
            .await?;
        let room_id = self
            .room_service
            .get_room_id(&request.sender_id, &request.receiver_id)
            .await?;
        let sender = self
            .user_repository
            .find_by_user_id(&request.sender_id)
            .await?
            .ok_or_else(|| ChatError::UserNotFound(request.sender_id.clone()))?;

        let mut message = request.to_message(&room_id);
        message.sender_name = Some(sender.name.clone());
        message.sender_avatar = sender.avatar.clone();

        if let Err(e) = self
            .deliver(request, &mut message, group.as_ref(), &sender)
            .await
        {
            warn!(
                "消息投递失败，进入补偿路径: message_id={}, err={}",
                message.id, e
            );
            self.compensate_send_failure(&message).await;
        }
        Ok(())
    }

    /// 投递主路径：落库 + 投影扇出 + 通知推送
    ///
    /// 任一步骤失败都交给调用方补偿，本函数不吞错误。
    async fn deliver(
        &self,
        request: &ChatRequest,
        message: &mut Message,
        group: Option<&Group>,
        sender: &User,
    ) -> Result<()> {
        if let Some(attachment) = &request.file_content {
            // 文件内容交给上传协作方，消息状态由其负责落实
            self.upload_service
                .upload_file(attachment.data.clone(), message.clone())
                .await?;
            return Ok(());
        }

        let time = Utc::now();
        message.mark_sent(time);
        let message = self.message_repository.create(message).await?;

        self.fan_out_rooms(&message, group, sender, time).await?;

        // 扇出完成后，向接收者推送一条 SENT 通知
        let sent = UserNotify::new(NotifyStatus::Sent, &message.sender_id, &message.receiver_id)
            .with_message(message.clone());
        self.publisher
            .publish(&message.receiver_id, NOTIFY_CHANNEL, sent)
            .await?;

        info!(
            "✅ 消息已投递: message_id={}, room_id={}, from={}, to={}",
            message.id, message.room_id, message.sender_id, message.receiver_id
        );
        Ok(())
    }

    /// 对共享同一会话键的所有投影逐条更新未读数与预览
    async fn fan_out_rooms(
        &self,
        message: &Message,
        group: Option<&Group>,
        sender: &User,
        time: DateTime<Utc>,
    ) -> Result<()> {
        let rooms = self.room_service.find_by_room_id(&message.room_id).await?;
        for mut room in rooms {
            // 已退群成员的残留投影不再更新
            if let Some(group) = group {
                if !group.is_member(&room.sender_id) {
                    continue;
                }
            }

            if room.sender_id == message.sender_id {
                room.apply_outgoing(message.preview_text(), time);
                room.message_status = Some(message.message_status);
                let saved = self.room_service.save_room(&room).await?;

                let success = UserNotify::new(
                    NotifyStatus::Success,
                    &message.sender_id,
                    &message.receiver_id,
                )
                .with_message(message.clone())
                .with_room(saved);
                self.publisher
                    .publish(&message.sender_id, NOTIFY_CHANNEL, success)
                    .await?;
            } else {
                let mut preview = message.preview_text();
                if self.permission_service.is_group_chat(&room.room_id).await? {
                    preview = format!("{}: {}", sender.name, preview);
                }
                room.apply_incoming(preview, time);
                room.message_status = Some(message.message_status);
                self.room_service.save_room(&room).await?;
            }
        }
        Ok(())
    }

    /// 投递失败后的尽力补偿
    ///
    /// 只刷新发送者自己的投影，让发送方界面能看到这条失败的内容；
    /// 补偿本身再失败就只记日志。
    async fn compensate_send_failure(&self, message: &Message) {
        let result: Result<()> = async {
            let rooms = self.room_service.find_by_room_id(&message.room_id).await?;
            for mut room in rooms {
                if room.sender_id == message.sender_id {
                    room.latest_message = message.failure_preview();
                    room.time = Utc::now();
                    room.is_sender = true;
                    room.number_of_unread_message = 0;
                    self.room_service.save_room(&room).await?;
                    break;
                }
            }
            Ok(())
        }
        .await;

        if let Err(e) = result {
            error!("补偿写入失败: message_id={}, err={}", message.id, e);
        }
    }

    /// 发送图片组消息
    ///
    /// 所有附件必须是图片；消息以 Sending 状态落库后，
    /// 字节逐个交给上传协作方，由其落实最终状态。
    pub async fn send_message_with_files(&self, request: &ChatFilesRequest) -> Result<Message> {
        request.validate_images()?;
        let room_id = self
            .room_service
            .get_room_id(&request.sender_id, &request.receiver_id)
            .await?;

        let message = request.to_message(&room_id);
        let message = self.message_repository.create(&message).await?;
        for attachment in &request.files_content {
            self.upload_service
                .upload_file(attachment.data.clone(), message.clone())
                .await?;
        }
        Ok(message)
    }

    /// 更新消息（状态、类型、内容与单侧隐藏标记）
    pub async fn update_message(&self, message_id: &str, request: &ChatRequest) -> Result<Message> {
        let mut stored = self
            .message_repository
            .find_by_id(message_id)
            .await?
            .ok_or_else(|| ChatError::MessageNotFound(message_id.to_string()))?;

        let patch = request.to_message(&stored.room_id);
        stored.message_status = patch.message_status;
        stored.message_type = patch.message_type;
        stored.content = patch.content;
        stored.hidden_sender_side = request.hidden_sender_side;
        self.message_repository.save(&stored).await
    }

    /// 撤回消息（只有发送者本人可以撤回；内容保留，状态置为 Revoked）
    pub async fn revoke_message(
        &self,
        message_id: &str,
        sender_id: &str,
        receiver_id: &str,
    ) -> Result<()> {
        let mut message = self
            .message_repository
            .find_by_id(message_id)
            .await?
            .ok_or_else(|| ChatError::MessageNotFound(message_id.to_string()))?;

        if message.sender_id != sender_id {
            return Err(ChatError::PermissionDenied(
                "permission access denied".to_string(),
            ));
        }

        message.mark_revoked();
        self.message_repository.save(&message).await?;

        let revoke = UserNotify::new(
            NotifyStatus::RevokedMessage,
            &message.sender_id,
            &message.receiver_id,
        );
        self.publisher
            .publish(receiver_id, NOTIFY_CHANNEL, revoke)
            .await?;

        info!("🗑️ 消息已撤回: message_id={}, sender={}", message_id, sender_id);
        Ok(())
    }

    /// 转发消息
    ///
    /// 按给定顺序逐个处理接收者，每个接收者生成一条新消息并更新该会话两侧投影；
    /// 中途失败时已完成的转发保持已提交，错误向上抛出（无补偿）。
    pub async fn forward_message(
        &self,
        message_id: &str,
        sender_id: &str,
        receiver_ids: &[String],
    ) -> Result<Vec<Message>> {
        let source = self
            .message_repository
            .find_by_id(message_id)
            .await?
            .ok_or_else(|| ChatError::MessageNotFound(message_id.to_string()))?;
        let sender = self
            .user_repository
            .find_by_user_id(sender_id)
            .await?
            .ok_or_else(|| ChatError::UserNotFound("user not found".to_string()))?;

        let mut forwarded = Vec::new();
        for receiver_id in receiver_ids {
            let room_id = self.room_service.get_room_id(sender_id, receiver_id).await?;
            let time = Utc::now();

            let mut message = Message::new(
                sender_id,
                receiver_id,
                &room_id,
                source.message_type,
                source.content.clone(),
            );
            message.sender_name = Some(sender.name.clone());
            message.sender_avatar = sender.avatar.clone();
            message.mark_sent(time);
            let message = self.message_repository.create(&message).await?;

            // 更新转发目标会话的两侧投影
            let rooms = self.room_service.find_by_room_id(&room_id).await?;
            for mut room in rooms {
                let preview = message.preview_text();
                if room.sender_id == sender_id {
                    room.apply_outgoing(preview, time);
                } else {
                    room.apply_incoming(preview, time);
                }
                room.message_status = Some(message.message_status);
                self.room_service.save_room(&room).await?;
            }

            let sent = UserNotify::new(NotifyStatus::Sent, sender_id, receiver_id)
                .with_message(message.clone());
            self.publisher
                .publish(receiver_id, NOTIFY_CHANNEL, sent)
                .await?;
            forwarded.push(message);
        }

        // 循环结束后给转发者一条汇总 SUCCESS 通知
        let last_receiver = receiver_ids
            .last()
            .cloned()
            .unwrap_or_else(|| source.receiver_id.clone());
        let mut success = UserNotify::new(NotifyStatus::Success, sender_id, &last_receiver);
        if let Some(last) = forwarded.last() {
            success = success.with_message(last.clone());
        }
        self.publisher
            .publish(sender_id, NOTIFY_CHANNEL, success)
            .await?;

        info!(
            "✅ 消息已转发: source={}, receivers={}",
            message_id,
            forwarded.len()
        );
        Ok(forwarded)
    }

    /// 标记会话已读
    ///
    /// 把会话里他人发出的 Sent/Received 消息置为 Seen 并记录时间，
    /// 再清零查看者自己的未读数。
    pub async fn seen_message(
        &self,
        room_id: &str,
        sender_id: &str,
        receiver_id: &str,
    ) -> Result<()> {
        let now = Utc::now();
        for status in [MessageStatus::Sent, MessageStatus::Received] {
            let messages = self
                .message_repository
                .find_by_room_id_and_status(room_id, status)
                .await?;
            for mut message in messages {
                if message.sender_id == sender_id {
                    continue;
                }
                message.mark_seen(now);
                self.message_repository.save(&message).await?;
            }
        }

        let mut room = self
            .room_service
            .find_by_participants(sender_id, receiver_id)
            .await?
            .ok_or_else(|| ChatError::RoomNotFound("room not found".to_string()))?;
        room.number_of_unread_message = 0;
        self.room_service.save_room(&room).await?;

        // SEEN 通知的 sender/receiver 字段取全局最近一条消息
        let latest = self
            .message_repository
            .find_most_recent()
            .await?
            .ok_or_else(|| ChatError::MessageNotFound("no message".to_string()))?;
        let seen = UserNotify::new(NotifyStatus::Seen, &latest.sender_id, &latest.receiver_id);
        self.publisher
            .publish(receiver_id, NOTIFY_CHANNEL, seen)
            .await?;
        Ok(())
    }

    /// 发起通话
    ///
    /// 通话消息落库并完成投影扇出后，才把消息交给信令适配器；
    /// 适配器失败只记日志，不回滚消息状态。
    pub async fn save_call(&self, request: &CallRequest) -> Result<Message> {
        let room_id = self
            .room_service
            .get_room_id(&request.sender_id, &request.receiver_id)
            .await?;
        let caller_room = self
            .room_service
            .find_by_participants(&request.sender_id, &request.receiver_id)
            .await?
            .ok_or_else(|| ChatError::RoomNotFound("room not found".to_string()))?;

        if caller_room.room_type == RoomType::Group {
            self.permission_service
                .authorize(&request.sender_id, &request.receiver_id)
                .await?;
        }

        let time = Utc::now();
        let mut message = Message::new(
            &request.sender_id,
            &request.receiver_id,
            &room_id,
            request.message_type,
            MessageContent::Call(CallInfo {
                call_status: CallStatus::Start,
            }),
        );
        message.mark_sent(time);
        let message = self.message_repository.create(&message).await?;

        let rooms = self.room_service.find_by_room_id(&room_id).await?;
        if caller_room.room_type == RoomType::Group {
            let caller = self
                .user_repository
                .find_by_user_id(&request.sender_id)
                .await?
                .ok_or_else(|| ChatError::UserNotFound(request.sender_id.clone()))?;
            for mut room in rooms {
                if room.sender_id == request.sender_id {
                    room.apply_outgoing(GROUP_CALL_STARTED_SELF.to_string(), time);
                } else {
                    room.apply_incoming(
                        format!("{} {}", caller.name, GROUP_CALL_STARTED_OTHER),
                        time,
                    );
                }
                self.room_service.save_room(&room).await?;
            }
        } else {
            let preview = match request.message_type {
                MessageType::AudioCall => AUDIO_CALL_PREVIEW,
                _ => VIDEO_CALL_PREVIEW,
            };
            for mut room in rooms {
                if room.sender_id == request.sender_id {
                    room.apply_outgoing(preview.to_string(), time);
                } else {
                    room.apply_incoming(preview.to_string(), time);
                }
                self.room_service.save_room(&room).await?;
            }
        }

        let notify = UserNotify::new(
            NotifyStatus::CallRequest,
            &message.sender_id,
            &message.receiver_id,
        )
        .with_message(message.clone());
        self.publisher
            .publish(&request.receiver_id, NOTIFY_CHANNEL, notify)
            .await?;

        if let Err(e) = self.call_adapter.start_call(&message).await {
            warn!(
                "通话适配器 start_call 失败: message_id={}, err={}",
                message.id, e
            );
        }
        Ok(message)
    }

    /// 接听通话
    pub async fn accept_call(&self, message_id: &str) -> Result<()> {
        let message = self.find_required(message_id).await?;
        self.call_adapter.accept_call(&message).await
    }

    /// 拒绝通话
    pub async fn reject_call(&self, message_id: &str) -> Result<()> {
        let message = self.find_required(message_id).await?;
        self.call_adapter.reject_call(&message).await
    }

    /// 结束通话
    pub async fn end_call(&self, message_id: &str) -> Result<()> {
        let message = self.find_required(message_id).await?;
        self.call_adapter.end_call(&message).await
    }

    async fn find_required(&self, message_id: &str) -> Result<Message> {
        self.message_repository
            .find_by_id(message_id)
            .await?
            .ok_or_else(|| ChatError::MessageNotFound(message_id.to_string()))
    }

    /// 查询会话消息（分页）
    ///
    /// 停用的群只返回系统消息且总页数置 0；非成员得到空结果。
    /// 他人的 Sending/Error 消息对查询者隐藏；过滤发生在已分页的切片上，
    /// 所以返回的总页数与过滤后的条数可能不一致。
    pub async fn get_all_by_room_id(
        &self,
        sender_id: &str,
        room_id: &str,
        page: &PaginationParams,
    ) -> Result<MessageResponse> {
        let group = self.group_repository.find_by_id(room_id).await?;
        let message_page = self.message_repository.find_by_room_id(room_id, page).await?;

        if let Some(group) = group {
            if group.group_status == GroupStatus::Inactive {
                let mut system: Vec<Message> = message_page
                    .data
                    .into_iter()
                    .filter(|m| m.is_system_message())
                    .collect();
                system.sort_by_key(|m| m.send_date);
                return Ok(MessageResponse {
                    messages: system,
                    total_page: 0,
                });
            }
            if !group.is_member(sender_id) {
                return Ok(MessageResponse {
                    messages: Vec::new(),
                    total_page: 0,
                });
            }
        }

        // 自己的消息全量保留，他人的消息滤掉发送中/失败的
        let (own, others): (Vec<Message>, Vec<Message>) = message_page
            .data
            .into_iter()
            .partition(|m| m.sender_id == sender_id);
        let mut messages: Vec<Message> = own
            .into_iter()
            .chain(others.into_iter().filter(|m| {
                !matches!(
                    m.message_status,
                    MessageStatus::Sending | MessageStatus::Error
                )
            }))
            .collect();
        messages.sort_by_key(|m| m.send_date);

        Ok(MessageResponse {
            messages,
            total_page: message_page.total_pages,
        })
    }
}
