use super::{RawEntry, TransferClient, ENTRY_TYPE_DIR, ENTRY_TYPE_FILE};
use crate::config::FtpConfig;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use futures::TryStreamExt;
use opendal::{Metakey, Operator};
use std::path::Path;
use std::sync::RwLock;
use tokio::fs;

/// 基于 opendal 的 FTP 客户端
///
/// 构造时不建立连接，第一次真实操作时才握手。
pub struct FtpClient {
    operator: RwLock<Option<Operator>>,
    name: String,
}

impl FtpClient {
    pub fn new(config: &FtpConfig) -> Result<Self> {
        use opendal::services::Ftp;

        let endpoint = format!("ftp://{}:{}", config.host, config.port);
        let builder = Ftp::default()
            .endpoint(&endpoint)
            .user(&config.user)
            .password(&config.pass)
            .root("/");

        let operator = Operator::new(builder)?.finish();
        let name = format!("ftp://{}@{}:{}", config.user, config.host, config.port);

        Ok(Self {
            operator: RwLock::new(Some(operator)),
            name,
        })
    }

    /// quit 之后所有操作都返回错误
    fn operator(&self) -> Result<Operator> {
        self.operator
            .read()
            .map_err(|_| anyhow!("FTP 会话状态异常"))?
            .clone()
            .ok_or_else(|| anyhow!("FTP 会话已关闭"))
    }

    fn dir_path(path: &str) -> String {
        let trimmed = path.trim_end_matches('/');
        if trimmed.is_empty() {
            "/".to_string()
        } else {
            format!("{}/", trimmed)
        }
    }
}

#[async_trait]
impl TransferClient for FtpClient {
    async fn list(&self, path: &str) -> Result<Vec<RawEntry>> {
        let operator = self.operator()?;
        let dir = Self::dir_path(path);

        let mut lister = operator
            .lister_with(&dir)
            .metakey(Metakey::ContentLength | Metakey::LastModified | Metakey::Mode)
            .await?;

        let own_path = dir.trim_matches('/').to_string();
        let mut entries = Vec::new();
        while let Some(entry) = lister.try_next().await? {
            // 部分服务器会把目录自身也列出来
            if entry.path().trim_matches('/') == own_path {
                continue;
            }

            let meta = entry.metadata();
            entries.push(RawEntry {
                typ: if meta.is_dir() {
                    ENTRY_TYPE_DIR
                } else {
                    ENTRY_TYPE_FILE
                },
                name: entry.name().trim_end_matches('/').to_string(),
                size: meta.content_length().to_string(),
                time: meta
                    .last_modified()
                    .map_or(0, |t| t.timestamp_millis())
                    .to_string(),
            });
        }

        Ok(entries)
    }

    async fn get(&self, remote_path: &str, local_path: &Path) -> Result<()> {
        let data = self.operator()?.read(remote_path).await?;
        fs::write(local_path, data.to_vec()).await?;
        Ok(())
    }

    async fn put(&self, local_path: &Path, remote_path: &str) -> Result<()> {
        let data = fs::read(local_path).await?;
        self.operator()?.write(remote_path, data).await?;
        Ok(())
    }

    async fn mkdir(&self, path: &str) -> Result<()> {
        match self.operator()?.create_dir(&Self::dir_path(path)).await {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == opendal::ErrorKind::AlreadyExists => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn quit(&self) -> Result<()> {
        let mut guard = self
            .operator
            .write()
            .map_err(|_| anyhow!("FTP 会话状态异常"))?;
        if guard.take().is_some() {
            tracing::debug!("关闭 FTP 会话: {}", self.name);
        }
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
