use std::env;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::cli::Cli;

/// 默认配置文件名
const DEFAULT_CONFIG_FILE: &str = "chatsync.toml";

/// 引擎配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// 日志级别
    pub log_level: String,
    /// 日志格式（compact / pretty / json）
    pub log_format: Option<String>,
    /// 消息查询的默认分页条数
    pub default_page_size: u32,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: None,
            default_page_size: 20,
        }
    }
}

impl ChatConfig {
    /// 从 TOML 配置文件加载
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("读取配置文件失败: {}", path.display()))?;
        let config: ChatConfig = toml::from_str(&content)
            .with_context(|| format!("解析配置文件失败: {}", path.display()))?;
        Ok(config)
    }

    /// 应用环境变量覆盖
    pub fn apply_env(&mut self) {
        if let Ok(level) = env::var("CHATSYNC_LOG_LEVEL") {
            self.log_level = level;
        }
        if let Ok(format) = env::var("CHATSYNC_LOG_FORMAT") {
            self.log_format = Some(format);
        }
        if let Ok(size) = env::var("CHATSYNC_PAGE_SIZE") {
            if let Ok(size) = size.parse() {
                self.default_page_size = size;
            }
        }
    }

    /// 加载配置（优先级：命令行 > 环境变量 > 配置文件 > 默认值）
    pub fn load(cli: &Cli) -> Result<Self> {
        let mut config = match &cli.config_file {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => Self::from_file(DEFAULT_CONFIG_FILE)?,
            None => Self::default(),
        };

        config.apply_env();

        if let Some(level) = cli.get_log_level() {
            config.log_level = level;
        }
        if let Some(format) = &cli.log_format {
            config.log_format = Some(format.clone());
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ChatConfig::default();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.default_page_size, 20);
        assert!(config.log_format.is_none());
    }

    #[test]
    fn test_partial_toml() {
        let config: ChatConfig = toml::from_str("log_level = \"debug\"").unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.default_page_size, 20);
    }
}
