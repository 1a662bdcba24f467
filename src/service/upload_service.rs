//! 文件上传协作方端口
//!
//! 上传实现接收文件字节后负责落实消息状态（成功置为 Sent），
//! 投递引擎交出字节后不再假设结果。

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use tracing::info;

use crate::error::Result;
use crate::model::Message;
use crate::repository::MessageRepository;

/// 文件上传 trait
#[async_trait]
pub trait FileUploadService: Send + Sync {
    /// 接收文件字节；上传完成后由实现回写消息状态
    async fn upload_file(&self, data: Vec<u8>, message: Message) -> Result<()>;
}

/// 内存上传实现
///
/// 把字节留在内存并立即把消息落实为 Sent，用于测试与独立运行。
/// 同一条消息可以挂多个文件（图片组按附件逐个上传）。
pub struct InMemoryUploadService {
    storage: DashMap<String, Vec<Vec<u8>>>,
    message_repository: Arc<dyn MessageRepository>,
}

impl InMemoryUploadService {
    pub fn new(message_repository: Arc<dyn MessageRepository>) -> Self {
        Self {
            storage: DashMap::new(),
            message_repository,
        }
    }

    /// 已接收的总字节数（按消息ID）
    pub fn stored_size(&self, message_id: &str) -> Option<usize> {
        self.storage
            .get(message_id)
            .map(|chunks| chunks.iter().map(|c| c.len()).sum())
    }
}

#[async_trait]
impl FileUploadService for InMemoryUploadService {
    async fn upload_file(&self, data: Vec<u8>, message: Message) -> Result<()> {
        let size = data.len();
        self.storage
            .entry(message.id.clone())
            .or_default()
            .push(data);

        let mut message = message;
        message.mark_sent(Utc::now());
        self.message_repository.save(&message).await?;

        info!(
            "📁 文件已接收，消息状态已落实: message_id={}, bytes={}",
            message.id, size
        );
        Ok(())
    }
}
