use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use chatsync::{
    cli::Cli, logging, CallRequest, ChatConfig, ChatRequest, Group, InMemoryGroupRepository,
    InMemoryMessageRepository, InMemoryRoomRepository, InMemoryUploadService,
    InMemoryUserRepository, InProcessPublisher, LoggingCallAdapter, MessageService, MessageType,
    PaginationParams, PermissionService, Room, RoomRepository, RoomService, RoomType, User,
};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载 .env 文件（如果存在）
    let _ = dotenvy::dotenv();

    // 解析命令行参数
    let cli = Cli::parse();

    // 加载配置（优先级：命令行 > 环境变量 > 配置文件 > 默认值）
    let config = ChatConfig::load(&cli).context("加载配置失败")?;
    logging::init_logging(&config.log_level, config.log_format.as_deref(), cli.quiet)?;

    info!("🚀 ChatSync engine starting...");
    run_walkthrough(&config).await?;
    info!("✅ ChatSync walkthrough finished");
    Ok(())
}

/// 用内存协作方跑一遍核心链路：发送 → 已读 → 撤回 → 通话
async fn run_walkthrough(config: &ChatConfig) -> Result<()> {
    let users = Arc::new(InMemoryUserRepository::new());
    let groups = Arc::new(InMemoryGroupRepository::new());
    let messages = Arc::new(InMemoryMessageRepository::new());
    let rooms = Arc::new(InMemoryRoomRepository::new());
    let publisher = Arc::new(InProcessPublisher::new());

    let room_service = Arc::new(RoomService::new(rooms.clone()));
    let permission_service = Arc::new(PermissionService::new(groups.clone()));
    let upload_service = Arc::new(InMemoryUploadService::new(messages.clone()));

    let service = MessageService::new(
        users.clone(),
        groups.clone(),
        messages.clone(),
        room_service.clone(),
        permission_service,
        upload_service,
        publisher.clone(),
        Arc::new(LoggingCallAdapter),
    );

    // 准备用户与会话（账号与会话建立属于外部协作方）
    users.insert(User::new("alice", "Alice")).await;
    users.insert(User::new("bob", "Bob")).await;
    users.insert(User::new("carol", "Carol")).await;

    let direct_room = "room-alice-bob";
    rooms
        .save(&Room::new(direct_room, "alice", "bob", RoomType::Direct))
        .await?;
    rooms
        .save(&Room::new(direct_room, "bob", "alice", RoomType::Direct))
        .await?;

    let mut group = Group::new("g-rustaceans", "Rustaceans", "alice");
    group.members = vec!["alice".to_string(), "bob".to_string(), "carol".to_string()];
    groups.insert(group).await;
    for member in ["alice", "bob", "carol"] {
        rooms
            .save(&Room::new(
                "g-rustaceans",
                member,
                "g-rustaceans",
                RoomType::Group,
            ))
            .await?;
    }

    let mut alice_inbox = publisher.subscribe("alice");
    let mut bob_inbox = publisher.subscribe("bob");

    // 单聊发送
    service
        .send_message(&ChatRequest::text("alice", "bob", "你好，Bob"))
        .await?;

    // 群聊发送
    service
        .send_message(&ChatRequest::text("alice", "g-rustaceans", "大家好"))
        .await?;

    // Bob 查看会话并标记已读
    service.seen_message(direct_room, "bob", "alice").await?;

    // Alice 再发一条然后撤回
    service
        .send_message(&ChatRequest::text("alice", "bob", "发错了"))
        .await?;
    let page = PaginationParams::new(1, config.default_page_size);
    let history = service.get_all_by_room_id("alice", direct_room, &page).await?;
    if let Some(last) = history.messages.last() {
        service.revoke_message(&last.id, "alice", "bob").await?;
    }

    // 发起一通语音通话
    let call = service
        .save_call(&CallRequest {
            sender_id: "alice".to_string(),
            receiver_id: "bob".to_string(),
            message_id: None,
            message_type: MessageType::AudioCall,
        })
        .await?;
    service.accept_call(&call.id).await?;
    service.end_call(&call.id).await?;

    // 汇总各方收到的通知
    while let Ok(notify) = alice_inbox.try_recv() {
        info!("alice 收到通知: {}", notify.status.as_str());
    }
    while let Ok(notify) = bob_inbox.try_recv() {
        info!("bob 收到通知: {}", notify.status.as_str());
    }

    // 汇总会话投影状态
    for room in rooms.find_by_room_id(direct_room).await? {
        info!(
            "投影: viewer={}, 未读={}, 预览={}",
            room.sender_id, room.number_of_unread_message, room.latest_message
        );
    }
    for room in rooms.find_by_room_id("g-rustaceans").await? {
        info!(
            "投影: viewer={}, 未读={}, 预览={}",
            room.sender_id, room.number_of_unread_message, room.latest_message
        );
    }

    Ok(())
}
