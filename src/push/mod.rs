pub mod publisher;
pub mod types;

pub use publisher::{InProcessPublisher, NotificationPublisher};
pub use types::{NotifyStatus, UserNotify, NOTIFY_CHANNEL};
