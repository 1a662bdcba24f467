use clap::Parser;

/// ChatSync - 消息投递与会话状态同步引擎
#[derive(Parser, Debug)]
#[command(name = "chatsync")]
#[command(version)]
#[command(about = "消息投递与会话状态同步引擎演示程序", long_about = None)]
pub struct Cli {
    /// 配置文件路径
    #[arg(long, value_name = "FILE", help = "指定配置文件路径")]
    pub config_file: Option<String>,

    /// 日志级别
    #[arg(
        long,
        value_name = "LEVEL",
        help = "日志级别: trace, debug, info, warn, error"
    )]
    pub log_level: Option<String>,

    /// 日志格式
    #[arg(long, value_name = "FORMAT", help = "日志格式: pretty, json, compact")]
    pub log_format: Option<String>,

    /// 静默模式
    #[arg(long, short = 'q', help = "静默模式（只输出错误日志）")]
    pub quiet: bool,
}

impl Cli {
    /// 获取日志级别（考虑 quiet）
    pub fn get_log_level(&self) -> Option<String> {
        if self.quiet {
            return Some("error".to_string());
        }
        self.log_level.clone()
    }
}
