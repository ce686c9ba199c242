use std::fs::Metadata;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;

/// 本地一侧，所有路径都相对于 `root`（本地命名空间，根为 `.`）
#[derive(Debug, Clone)]
pub struct LocalFs {
    root: PathBuf,
}

impl LocalFs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 本地命名空间路径 -> 文件系统路径
    pub fn resolve(&self, path: &str) -> PathBuf {
        let path = path.trim_start_matches("./");
        if path.is_empty() || path == "." {
            self.root.clone()
        } else {
            self.root.join(path)
        }
    }

    /// 列出目录的直接子项及其元数据
    pub async fn read_dir(&self, path: &str) -> io::Result<Vec<(String, Metadata)>> {
        let mut reader = fs::read_dir(self.resolve(path)).await?;
        let mut items = Vec::new();

        while let Some(entry) = reader.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            // 单个条目读取失败（例如刚被删除）时跳过
            match entry.metadata().await {
                Ok(metadata) => items.push((name, metadata)),
                Err(e) => tracing::debug!("读取元数据失败，跳过: {} - {}", name, e),
            }
        }

        Ok(items)
    }

    pub async fn exists(&self, path: &str) -> bool {
        fs::metadata(self.resolve(path)).await.is_ok()
    }

    /// 创建单级目录
    pub async fn mkdir(&self, path: &str) -> io::Result<()> {
        fs::create_dir(self.resolve(path)).await
    }
}
