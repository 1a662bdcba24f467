//! 通话会话协作方端口
//!
//! 引擎只负责把消息身份桥接给信令方，通话信令本身不在这里实现。

use async_trait::async_trait;
use tracing::info;

use crate::error::Result;
use crate::model::Message;

/// 通话会话适配器 trait
#[async_trait]
pub trait CallSessionAdapter: Send + Sync {
    async fn start_call(&self, message: &Message) -> Result<()>;
    async fn accept_call(&self, message: &Message) -> Result<()>;
    async fn reject_call(&self, message: &Message) -> Result<()>;
    async fn end_call(&self, message: &Message) -> Result<()>;
}

/// 日志适配器（不对接真实信令，只打日志）
pub struct LoggingCallAdapter;

#[async_trait]
impl CallSessionAdapter for LoggingCallAdapter {
    async fn start_call(&self, message: &Message) -> Result<()> {
        info!(
            "[CALL] start: message_id={}, type={:?}, from={}, to={}",
            message.id, message.message_type, message.sender_id, message.receiver_id
        );
        Ok(())
    }

    async fn accept_call(&self, message: &Message) -> Result<()> {
        info!("[CALL] accept: message_id={}", message.id);
        Ok(())
    }

    async fn reject_call(&self, message: &Message) -> Result<()> {
        info!("[CALL] reject: message_id={}", message.id);
        Ok(())
    }

    async fn end_call(&self, message: &Message) -> Result<()> {
        info!("[CALL] end: message_id={}", message.id);
        Ok(())
    }
}
