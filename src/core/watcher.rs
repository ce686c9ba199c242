//! 本地文件变更监听
//!
//! notify 事件转换成"文件已变更"的绝对路径，经 mpsc 交给编排器。
//! 删除事件丢弃，不做删除同步。

use crate::error::{Result, SyncError};
use notify::event::{CreateKind, ModifyKind};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// 保持 watcher 存活，drop 后停止监听
pub struct ChangeWatcher {
    _watcher: RecommendedWatcher,
}

impl ChangeWatcher {
    pub fn spawn(root: &Path) -> Result<(Self, mpsc::Receiver<PathBuf>)> {
        let (tx, rx) = mpsc::channel::<PathBuf>(1024);

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    for path in changed_files(event) {
                        // 回调运行在 notify 自己的线程上
                        if tx.blocking_send(path).is_err() {
                            return;
                        }
                    }
                }
                Err(e) => warn!("文件监听出错: {}", e),
            },
            notify::Config::default(),
        )
        .map_err(|e| SyncError::Watch(e.to_string()))?;

        watcher
            .watch(root, RecursiveMode::Recursive)
            .map_err(|e| SyncError::Watch(e.to_string()))?;
        debug!("开始监听: {}", root.display());

        Ok((Self { _watcher: watcher }, rx))
    }
}

/// 只保留新建/修改且仍是普通文件的路径
fn changed_files(event: Event) -> Vec<PathBuf> {
    let relevant = matches!(
        event.kind,
        EventKind::Create(CreateKind::File | CreateKind::Any)
            | EventKind::Modify(
                ModifyKind::Data(_) | ModifyKind::Any | ModifyKind::Name(_) | ModifyKind::Other
            )
    );
    if !relevant {
        return Vec::new();
    }

    event.paths.into_iter().filter(|p| p.is_file()).collect()
}
