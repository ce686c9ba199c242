//! 一次同步会话：本地根 + 单个协议连接 + 路径映射 + 忽略规则

use crate::config::Config;
use crate::core::entry::{base_name, parent_path, Side};
use crate::core::ignore::IgnoreMatcher;
use crate::core::materializer::{ancestor_prefixes, DirMaterializer};
use crate::core::path_map::PathMapper;
use crate::core::scanner::TreeLister;
use crate::error::{Result, SyncError};
use crate::storage::{LocalFs, TransferClient};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

pub struct Session {
    pub local: LocalFs,
    pub client: Arc<dyn TransferClient>,
    pub mapper: PathMapper,
    pub ignore: IgnoreMatcher,
}

impl Session {
    pub fn new(config: &Config, local_root: &Path, client: Arc<dyn TransferClient>) -> Self {
        Self {
            local: LocalFs::new(local_root),
            client,
            mapper: PathMapper::new(local_root, &config.sync.path),
            ignore: IgnoreMatcher::new(&config.sync.ignore),
        }
    }

    pub fn lister(&self) -> TreeLister<'_> {
        TreeLister::new(&self.local, self.client.as_ref(), &self.mapper)
    }

    pub fn materializer(&self) -> DirMaterializer<'_> {
        DirMaterializer::new(&self.local, self.client.as_ref(), &self.mapper)
    }

    /// 按完整路径和文件名判断是否忽略
    pub fn is_ignored(&self, path: &str) -> bool {
        self.ignore.is_ignored(&[path, base_name(path)])
    }

    /// 路径本身或任一上级目录被忽略
    pub fn is_excluded(&self, path: &str) -> bool {
        ancestor_prefixes(path).iter().any(|p| self.is_ignored(p))
    }

    /// 上传本地命名空间路径对应的文件
    pub async fn upload(&self, path: &str) -> Result<()> {
        let local_path = self.local.resolve(path);
        let remote_path = self.mapper.to_remote(path);
        debug!("上传: {} -> {}", path, remote_path);
        self.client
            .put(&local_path, &remote_path)
            .await
            .map_err(|e| SyncError::transfer(path, e))
    }

    /// 下载远程文件到本地命名空间路径
    pub async fn download(&self, path: &str) -> Result<()> {
        let local_path = self.local.resolve(path);
        let remote_path = self.mapper.to_remote(path);
        debug!("下载: {} -> {}", remote_path, path);
        self.client
            .get(&remote_path, &local_path)
            .await
            .map_err(|e| SyncError::transfer(path, e))
    }

    /// 上传失败时逐级补建远程父目录，再重试一次
    pub async fn upload_with_fallback(&self, path: &str) -> Result<()> {
        let first = match self.upload(path).await {
            Ok(()) => return Ok(()),
            Err(e) => e,
        };

        warn!("上传失败，补建目录后重试: {}", first);
        self.materializer()
            .ensure_dir_recursive(Side::Remote, &parent_path(path))
            .await?;
        self.upload(path).await
    }
}
