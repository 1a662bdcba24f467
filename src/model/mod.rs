pub mod group;
pub mod message;
pub mod room;
pub mod user;

pub use group::{Group, GroupStatus, SendMessagePermission};
pub use message::{CallInfo, CallStatus, FileObject, Message, MessageContent, MessageStatus, MessageType};
pub use room::{Room, RoomType};
pub use user::User;
