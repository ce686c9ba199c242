//! 目录补建

use crate::core::entry::Side;
use crate::core::path_map::PathMapper;
use crate::error::{Result, SyncError};
use crate::storage::{LocalFs, TransferClient};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Materialized {
    Existed,
    Created,
}

/// 保证某一侧的目录存在
pub struct DirMaterializer<'a> {
    local: &'a LocalFs,
    client: &'a dyn TransferClient,
    mapper: &'a PathMapper,
}

impl<'a> DirMaterializer<'a> {
    pub fn new(local: &'a LocalFs, client: &'a dyn TransferClient, mapper: &'a PathMapper) -> Self {
        Self {
            local,
            client,
            mapper,
        }
    }

    /// 只处理这一级目录：探测失败就 mkdir 一次，mkdir 失败向上传递
    pub async fn ensure_dir(&self, side: Side, path: &str) -> Result<Materialized> {
        match side {
            Side::Local => {
                if self.local.exists(path).await {
                    return Ok(Materialized::Existed);
                }
                self.local
                    .mkdir(path)
                    .await
                    .map_err(|e| SyncError::create_dir(side, path, e))?;
            }
            Side::Remote => {
                let remote_path = self.mapper.to_remote(path);
                // 远程以列表非空作为存在依据
                match self.client.list(&remote_path).await {
                    Ok(entries) if !entries.is_empty() => return Ok(Materialized::Existed),
                    Ok(_) => debug!("远程目录为空或不存在: {}", remote_path),
                    Err(e) => debug!("远程目录探测失败: {} - {}", remote_path, e),
                }
                self.client
                    .mkdir(&remote_path)
                    .await
                    .map_err(|e| SyncError::create_dir(side, &remote_path, e))?;
            }
        }

        info!("已创建{}目录: {}", side, path);
        Ok(Materialized::Created)
    }

    /// 从根到叶逐级 ensure_dir，仅在上传因目录缺失失败时使用
    pub async fn ensure_dir_recursive(&self, side: Side, path: &str) -> Result<usize> {
        let mut levels = ancestor_prefixes(path);
        // 远程根目录本身也可能缺失
        if matches!(side, Side::Remote) && (path == "." || path.starts_with("./")) {
            levels.insert(0, ".".to_string());
        }

        let mut created = 0;
        for prefix in levels {
            if self.ensure_dir(side, &prefix).await? == Materialized::Created {
                created += 1;
            }
        }
        Ok(created)
    }
}

/// "a/b/c" -> ["a", "a/b", "a/b/c"]；本地根 `.` 本身不算
pub fn ancestor_prefixes(path: &str) -> Vec<String> {
    let trimmed = path.trim_end_matches('/');
    let mut prefixes: Vec<String> = trimmed
        .match_indices('/')
        .map(|(i, _)| &trimmed[..i])
        .filter(|prefix| !prefix.is_empty() && *prefix != ".")
        .map(str::to_string)
        .collect();

    if !trimmed.is_empty() && trimmed != "." {
        prefixes.push(trimmed.to_string());
    }
    prefixes
}
