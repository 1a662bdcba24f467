// 业务服务层模块
pub mod call_adapter;
pub mod message_service;
pub mod permission_service;
pub mod room_service;
pub mod upload_service;

pub use call_adapter::{CallSessionAdapter, LoggingCallAdapter};
pub use message_service::{MessageResponse, MessageService};
pub use permission_service::PermissionService;
pub use room_service::RoomService;
pub use upload_service::{FileUploadService, InMemoryUploadService};
