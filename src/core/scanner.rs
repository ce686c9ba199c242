//! 目录列表：把本地目录项 / 协议目录项统一成 [`FileEntry`]

use crate::core::entry::{join_path, EntryKind, FileEntry, Side};
use crate::core::path_map::PathMapper;
use crate::error::{Result, SyncError};
use crate::storage::{LocalFs, RawEntry, TransferClient, ENTRY_TYPE_DIR, ENTRY_TYPE_FILE};
use chrono::{DateTime, Utc};
use std::fs::Metadata;
use tracing::debug;

/// 非递归列出某一侧的一个目录
pub struct TreeLister<'a> {
    local: &'a LocalFs,
    client: &'a dyn TransferClient,
    mapper: &'a PathMapper,
}

impl<'a> TreeLister<'a> {
    pub fn new(local: &'a LocalFs, client: &'a dyn TransferClient, mapper: &'a PathMapper) -> Self {
        Self {
            local,
            client,
            mapper,
        }
    }

    /// `path` 为本地命名空间路径；目录不存在时返回 `ListError`
    pub async fn list(&self, side: Side, path: &str) -> Result<Vec<FileEntry>> {
        let entries = match side {
            Side::Local => self.list_local(path).await?,
            Side::Remote => self.list_remote(path).await?,
        };
        debug!("列出{}目录 {}: {} 项", side, path, entries.len());
        Ok(entries)
    }

    async fn list_local(&self, path: &str) -> Result<Vec<FileEntry>> {
        let items = self
            .local
            .read_dir(path)
            .await
            .map_err(|e| SyncError::list(Side::Local, path, e))?;

        Ok(items
            .into_iter()
            .map(|(name, metadata)| local_entry(path, name, &metadata))
            .collect())
    }

    async fn list_remote(&self, path: &str) -> Result<Vec<FileEntry>> {
        let remote_path = self.mapper.to_remote(path);
        let raw = self
            .client
            .list(&remote_path)
            .await
            .map_err(|e| SyncError::list(Side::Remote, &remote_path, e))?;

        // 子项路径从请求的命名空间路径拼出，不反解远程绝对路径
        Ok(raw
            .into_iter()
            .filter_map(|item| remote_entry(join_path(path, &item.name), item))
            .collect())
    }
}

fn local_entry(dir: &str, name: String, metadata: &Metadata) -> FileEntry {
    let modified_at = metadata
        .modified()
        .map(|t| DateTime::<Utc>::from(t).timestamp_millis())
        .unwrap_or(0);

    FileEntry {
        origin: Side::Local,
        kind: if metadata.is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::File
        },
        path: join_path(dir, &name),
        name,
        size: if metadata.is_dir() { 0 } else { metadata.len() },
        modified_at,
    }
}

/// 协议类型码 0 = 文件，1 = 目录，其他（如符号链接）跳过
fn remote_entry(path: String, raw: RawEntry) -> Option<FileEntry> {
    let kind = match raw.typ {
        ENTRY_TYPE_FILE => EntryKind::File,
        ENTRY_TYPE_DIR => EntryKind::Directory,
        other => {
            debug!("跳过不支持的远程条目类型 {}: {}", other, path);
            return None;
        }
    };

    Some(FileEntry {
        origin: Side::Remote,
        kind,
        name: raw.name,
        path,
        size: raw.size.trim().parse().unwrap_or(0),
        modified_at: raw.time.trim().parse().unwrap_or(0),
    })
}
