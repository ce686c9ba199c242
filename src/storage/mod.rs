pub mod ftp;
pub mod local;
#[cfg(test)]
pub mod memory;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

pub use ftp::FtpClient;
pub use local::LocalFs;

/// 协议中的文件类型码
pub const ENTRY_TYPE_FILE: u8 = 0;
pub const ENTRY_TYPE_DIR: u8 = 1;

/// 传输协议返回的原始目录项，size/time 按协议习惯为字符串
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawEntry {
    #[serde(rename = "type")]
    pub typ: u8,
    pub name: String,
    pub size: String,
    pub time: String,
}

/// 传输协议客户端
///
/// 所有远程路径都是远程命名空间下的路径。会话是有状态的单连接，
/// 调用方保证同一时刻只有一个请求在进行。
#[async_trait]
pub trait TransferClient: Send + Sync {
    /// 列出目录的直接子项（非递归）
    async fn list(&self, path: &str) -> Result<Vec<RawEntry>>;

    /// 下载远程文件到本地路径
    async fn get(&self, remote_path: &str, local_path: &Path) -> Result<()>;

    /// 上传本地文件到远程路径
    async fn put(&self, local_path: &Path, remote_path: &str) -> Result<()>;

    /// 创建单级目录
    async fn mkdir(&self, path: &str) -> Result<()>;

    /// 关闭会话
    async fn quit(&self) -> Result<()>;

    /// 获取客户端名称（用于日志）
    fn name(&self) -> &str;
}

/// 根据配置创建客户端，不发起连接
pub fn create_client(config: &crate::config::FtpConfig) -> Result<Arc<dyn TransferClient>> {
    tracing::info!("初始化 FTP 客户端: {}:{}", config.host, config.port);
    Ok(Arc::new(FtpClient::new(config)?) as Arc<dyn TransferClient>)
}
