//! 通话链路与消息查询集成测试

use std::sync::Arc;

use chrono::{Duration, Utc};

use chatsync::{
    CallRequest, ChatError, ChatFilesRequest, ChatRequest, FileAttachment, Group, GroupStatus,
    InMemoryGroupRepository, InMemoryMessageRepository, InMemoryRoomRepository,
    InMemoryUploadService, InMemoryUserRepository, InProcessPublisher, LoggingCallAdapter,
    Message, MessageContent, MessageRepository, MessageService, MessageStatus, MessageType,
    NotifyStatus, PaginationParams, PermissionService, Room, RoomRepository, RoomService,
    RoomType, User,
};

struct World {
    service: MessageService,
    users: Arc<InMemoryUserRepository>,
    groups: Arc<InMemoryGroupRepository>,
    messages: Arc<InMemoryMessageRepository>,
    rooms: Arc<InMemoryRoomRepository>,
    publisher: Arc<InProcessPublisher>,
    uploads: Arc<InMemoryUploadService>,
}

impl World {
    fn new() -> Self {
        let users = Arc::new(InMemoryUserRepository::new());
        let groups = Arc::new(InMemoryGroupRepository::new());
        let messages = Arc::new(InMemoryMessageRepository::new());
        let rooms = Arc::new(InMemoryRoomRepository::new());
        let publisher = Arc::new(InProcessPublisher::new());

        let room_service = Arc::new(RoomService::new(rooms.clone()));
        let permission_service = Arc::new(PermissionService::new(groups.clone()));
        let uploads = Arc::new(InMemoryUploadService::new(messages.clone()));

        let service = MessageService::new(
            users.clone(),
            groups.clone(),
            messages.clone(),
            room_service,
            permission_service,
            uploads.clone(),
            publisher.clone(),
            Arc::new(LoggingCallAdapter),
        );

        Self {
            service,
            users,
            groups,
            messages,
            rooms,
            publisher,
            uploads,
        }
    }
}

async fn seed_user(world: &World, id: &str, name: &str) {
    world.users.insert(User::new(id, name)).await;
}

async fn seed_direct_room(world: &World, a: &str, b: &str) -> String {
    let room_id = format!("room-{}-{}", a, b);
    world
        .rooms
        .save(&Room::new(&room_id, a, b, RoomType::Direct))
        .await
        .unwrap();
    world
        .rooms
        .save(&Room::new(&room_id, b, a, RoomType::Direct))
        .await
        .unwrap();
    room_id
}

async fn seed_group(world: &World, group: Group, viewers: &[&str]) {
    let group_id = group.id.clone();
    world.groups.insert(group).await;
    for viewer in viewers {
        world
            .rooms
            .save(&Room::new(&group_id, viewer, &group_id, RoomType::Group))
            .await
            .unwrap();
    }
}

async fn projection(world: &World, viewer: &str, counterpart: &str) -> Room {
    world
        .rooms
        .find_by_participants(viewer, counterpart)
        .await
        .unwrap()
        .expect("projection missing")
}

#[tokio::test]
async fn test_direct_audio_call_flow() {
    let world = World::new();
    seed_user(&world, "alice", "Alice").await;
    seed_user(&world, "bob", "Bob").await;
    let room_id = seed_direct_room(&world, "alice", "bob").await;

    let mut bob_inbox = world.publisher.subscribe("bob");

    let message = world
        .service
        .save_call(&CallRequest {
            sender_id: "alice".to_string(),
            receiver_id: "bob".to_string(),
            message_id: None,
            message_type: MessageType::AudioCall,
        })
        .await
        .unwrap();

    assert_eq!(message.message_type, MessageType::AudioCall);
    assert_eq!(message.message_status, MessageStatus::Sent);
    assert_eq!(message.room_id, room_id);
    assert!(matches!(message.content, MessageContent::Call(_)));

    let alice_view = projection(&world, "alice", "bob").await;
    assert_eq!(alice_view.latest_message, "语音通话");
    assert_eq!(alice_view.number_of_unread_message, 0);

    let bob_view = projection(&world, "bob", "alice").await;
    assert_eq!(bob_view.latest_message, "语音通话");
    assert_eq!(bob_view.number_of_unread_message, 1);

    let notify = bob_inbox.try_recv().unwrap();
    assert_eq!(notify.status, NotifyStatus::CallRequest);
    assert!(notify.message.is_some());

    // 通话生命周期桥接
    world.service.accept_call(&message.id).await.unwrap();
    world.service.end_call(&message.id).await.unwrap();
    assert!(matches!(
        world.service.accept_call("missing").await,
        Err(ChatError::MessageNotFound(_))
    ));
}

#[tokio::test]
async fn test_group_call_previews() {
    let world = World::new();
    seed_user(&world, "alice", "Alice").await;
    seed_user(&world, "bob", "Bob").await;
    seed_user(&world, "carol", "Carol").await;

    let mut group = Group::new("g1", "team", "alice");
    group.members = vec!["alice".to_string(), "bob".to_string(), "carol".to_string()];
    seed_group(&world, group, &["alice", "bob", "carol"]).await;

    world
        .service
        .save_call(&CallRequest {
            sender_id: "alice".to_string(),
            receiver_id: "g1".to_string(),
            message_id: None,
            message_type: MessageType::VideoCall,
        })
        .await
        .unwrap();

    let alice_view = projection(&world, "alice", "g1").await;
    assert_eq!(alice_view.latest_message, "已发起群组通话");
    assert_eq!(alice_view.number_of_unread_message, 0);

    for member in ["bob", "carol"] {
        let view = projection(&world, member, "g1").await;
        assert_eq!(view.latest_message, "Alice 发起了群组通话");
        assert_eq!(view.number_of_unread_message, 1);
    }
}

#[tokio::test]
async fn test_inactive_group_call_rejected_before_persist() {
    let world = World::new();
    seed_user(&world, "alice", "Alice").await;

    let mut group = Group::new("g1", "team", "alice");
    group.members = vec!["alice".to_string(), "bob".to_string()];
    group.group_status = GroupStatus::Inactive;
    seed_group(&world, group, &["alice", "bob"]).await;

    let result = world
        .service
        .save_call(&CallRequest {
            sender_id: "alice".to_string(),
            receiver_id: "g1".to_string(),
            message_id: None,
            message_type: MessageType::AudioCall,
        })
        .await;
    assert!(matches!(result, Err(ChatError::PermissionDenied(_))));

    let page = world
        .messages
        .find_by_room_id("g1", &PaginationParams::default())
        .await
        .unwrap();
    assert_eq!(page.total, 0);
}

/// 在会话里以固定时间间隔铺一条消息
async fn seed_message(
    world: &World,
    room_id: &str,
    sender: &str,
    receiver: &str,
    text: &str,
    status: MessageStatus,
    offset_secs: i64,
) -> Message {
    let mut message = Message::new(
        sender,
        receiver,
        room_id,
        MessageType::Text,
        MessageContent::Text(text.to_string()),
    );
    message.send_date = Utc::now() + Duration::seconds(offset_secs);
    message.message_status = status;
    world.messages.create(&message).await.unwrap();
    message
}

#[tokio::test]
async fn test_query_hides_others_in_flight_messages() {
    let world = World::new();
    seed_user(&world, "alice", "Alice").await;
    seed_user(&world, "bob", "Bob").await;
    let room_id = seed_direct_room(&world, "alice", "bob").await;

    seed_message(&world, &room_id, "alice", "bob", "a1", MessageStatus::Sent, 0).await;
    seed_message(&world, &room_id, "bob", "alice", "b1", MessageStatus::Sending, 1).await;
    seed_message(&world, &room_id, "bob", "alice", "b2", MessageStatus::Error, 2).await;
    seed_message(&world, &room_id, "bob", "alice", "b3", MessageStatus::Sent, 3).await;
    // 自己的在途消息不过滤
    seed_message(&world, &room_id, "alice", "bob", "a2", MessageStatus::Sending, 4).await;

    let response = world
        .service
        .get_all_by_room_id("alice", &room_id, &PaginationParams::new(1, 20))
        .await
        .unwrap();

    let texts: Vec<String> = response
        .messages
        .iter()
        .map(|m| match &m.content {
            MessageContent::Text(t) => t.clone(),
            _ => String::new(),
        })
        .collect();
    assert_eq!(texts, vec!["a1", "b3", "a2"]);
    assert_eq!(response.total_page, 1);
}

#[tokio::test]
async fn test_inactive_group_query_returns_system_only() {
    let world = World::new();
    seed_user(&world, "alice", "Alice").await;

    let mut group = Group::new("g1", "team", "alice");
    group.members = vec!["alice".to_string(), "bob".to_string()];
    group.group_status = GroupStatus::Inactive;
    seed_group(&world, group, &["alice", "bob"]).await;

    let mut system = Message::new(
        "g1",
        "g1",
        "g1",
        MessageType::System,
        MessageContent::Text("群已停用".to_string()),
    );
    system.message_status = MessageStatus::Sent;
    world.messages.create(&system).await.unwrap();
    seed_message(&world, "g1", "bob", "g1", "chat", MessageStatus::Sent, 1).await;

    let response = world
        .service
        .get_all_by_room_id("alice", "g1", &PaginationParams::new(1, 20))
        .await
        .unwrap();

    assert_eq!(response.messages.len(), 1);
    assert!(response.messages[0].is_system_message());
    assert_eq!(response.total_page, 0);
}

#[tokio::test]
async fn test_non_member_group_query_is_empty() {
    let world = World::new();
    seed_user(&world, "mallory", "Mallory").await;

    let mut group = Group::new("g1", "team", "alice");
    group.members = vec!["alice".to_string(), "bob".to_string()];
    seed_group(&world, group, &["alice", "bob"]).await;
    seed_message(&world, "g1", "alice", "g1", "hello", MessageStatus::Sent, 0).await;

    let response = world
        .service
        .get_all_by_room_id("mallory", "g1", &PaginationParams::new(1, 20))
        .await
        .unwrap();
    assert!(response.messages.is_empty());
    assert_eq!(response.total_page, 0);
}

#[tokio::test]
async fn test_update_message_overwrites_fields() {
    let world = World::new();
    seed_user(&world, "alice", "Alice").await;
    seed_user(&world, "bob", "Bob").await;
    let room_id = seed_direct_room(&world, "alice", "bob").await;

    world
        .service
        .send_message(&ChatRequest::text("alice", "bob", "草稿"))
        .await
        .unwrap();
    let message_id = world
        .messages
        .find_by_room_id(&room_id, &PaginationParams::default())
        .await
        .unwrap()
        .data[0]
        .id
        .clone();

    let mut patch = ChatRequest::text("alice", "bob", "改好了");
    patch.hidden_sender_side = true;
    let updated = world
        .service
        .update_message(&message_id, &patch)
        .await
        .unwrap();

    assert_eq!(updated.content, MessageContent::Text("改好了".to_string()));
    assert!(updated.hidden_sender_side);
    assert_eq!(updated.message_status, MessageStatus::Sending);

    assert!(matches!(
        world.service.update_message("missing", &patch).await,
        Err(ChatError::MessageNotFound(_))
    ));
}

#[tokio::test]
async fn test_send_single_file_delegates_to_uploader() {
    let world = World::new();
    seed_user(&world, "alice", "Alice").await;
    seed_user(&world, "bob", "Bob").await;
    let room_id = seed_direct_room(&world, "alice", "bob").await;

    let mut alice_inbox = world.publisher.subscribe("alice");
    let mut bob_inbox = world.publisher.subscribe("bob");

    world
        .service
        .send_message(&ChatRequest::with_file(
            "alice",
            "bob",
            MessageType::File,
            FileAttachment {
                file_name: "report.pdf".to_string(),
                data: vec![1, 2, 3, 4],
            },
        ))
        .await
        .unwrap();

    // 状态由上传协作方落实
    let page = world
        .messages
        .find_by_room_id(&room_id, &PaginationParams::default())
        .await
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.data[0].message_status, MessageStatus::Sent);
    assert!(matches!(page.data[0].content, MessageContent::File(_)));
    assert_eq!(world.uploads.stored_size(&page.data[0].id), Some(4));

    // 上传交接路径不做扇出，也不推送通知
    let alice_view = projection(&world, "alice", "bob").await;
    assert_eq!(alice_view.latest_message, "");
    assert!(alice_inbox.try_recv().is_err());
    assert!(bob_inbox.try_recv().is_err());
}

#[tokio::test]
async fn test_image_batch_validation_and_upload() {
    let world = World::new();
    seed_user(&world, "alice", "Alice").await;
    seed_user(&world, "bob", "Bob").await;
    let room_id = seed_direct_room(&world, "alice", "bob").await;

    // 含非图片附件的批次整体拒绝
    let invalid = ChatFilesRequest {
        sender_id: "alice".to_string(),
        receiver_id: "bob".to_string(),
        message_type: MessageType::Image,
        files_content: vec![
            FileAttachment {
                file_name: "a.jpg".to_string(),
                data: vec![0; 2],
            },
            FileAttachment {
                file_name: "script.sh".to_string(),
                data: vec![0; 2],
            },
        ],
    };
    assert!(matches!(
        world.service.send_message_with_files(&invalid).await,
        Err(ChatError::Validation(_))
    ));
    let page = world
        .messages
        .find_by_room_id(&room_id, &PaginationParams::default())
        .await
        .unwrap();
    assert_eq!(page.total, 0);

    // 全图片批次落库并交给上传协作方
    let valid = ChatFilesRequest {
        sender_id: "alice".to_string(),
        receiver_id: "bob".to_string(),
        message_type: MessageType::Image,
        files_content: vec![
            FileAttachment {
                file_name: "a.jpg".to_string(),
                data: vec![0; 3],
            },
            FileAttachment {
                file_name: "b.PNG".to_string(),
                data: vec![0; 5],
            },
        ],
    };
    let message = world.service.send_message_with_files(&valid).await.unwrap();
    assert!(matches!(message.content, MessageContent::Files(ref files) if files.len() == 2));
    assert_eq!(world.uploads.stored_size(&message.id), Some(8));

    let stored = world
        .messages
        .find_by_id(&message.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.message_status, MessageStatus::Sent);
}
