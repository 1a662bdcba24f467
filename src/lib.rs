pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod push;
pub mod repository;
pub mod request;
pub mod service;

pub use config::ChatConfig;
pub use error::{ChatError, Result};
pub use model::*;
pub use push::{InProcessPublisher, NotificationPublisher, NotifyStatus, UserNotify, NOTIFY_CHANNEL};
pub use repository::{
    GroupRepository, InMemoryGroupRepository, InMemoryMessageRepository, InMemoryRoomRepository,
    InMemoryUserRepository, MessageRepository, PaginationParams, PaginationResult, RoomRepository,
    UserRepository,
};
pub use request::{CallRequest, ChatFilesRequest, ChatRequest, FileAttachment};
pub use service::{
    CallSessionAdapter, FileUploadService, InMemoryUploadService, LoggingCallAdapter,
    MessageResponse, MessageService, PermissionService, RoomService,
};
