use crate::config::Config;
use crate::core::comparator::TreeDiffer;
use crate::core::entry::Side;
use crate::core::materializer::Materialized;
use crate::core::queue::TransferQueue;
use crate::core::reload::{BroadcastReloader, ReloadHook};
use crate::core::session::Session;
use crate::core::watcher::ChangeWatcher;
use crate::error::{Result, SyncError};
use crate::storage::{create_client, TransferClient};
use futures::future::BoxFuture;
use serde::Serialize;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// 编排器阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Validating,
    Connecting,
    Syncing,
    Watching,
    Exiting,
}

/// 启动参数
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub config_path: PathBuf,
    pub local_root: PathBuf,
    /// 初次同步后进入监听
    pub watch: bool,
    pub initial_sync: bool,
}

/// 同步报告
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub dirs_visited: u32,
    pub files_uploaded: u32,
    pub files_downloaded: u32,
    pub dirs_created_local: u32,
    pub dirs_created_remote: u32,
    pub bytes_transferred: u64,
}

impl SyncReport {
    pub fn transfers(&self) -> u32 {
        self.files_uploaded + self.files_downloaded
    }
}

/// 同步引擎：一个会话 = 一个连接 + 一个上传队列
pub struct SyncEngine {
    session: Session,
    queue: TransferQueue,
}

impl SyncEngine {
    pub fn new(
        config: &Config,
        local_root: &Path,
        client: Arc<dyn TransferClient>,
        reloader: Arc<dyn ReloadHook>,
    ) -> Self {
        Self {
            session: Session::new(config, local_root, client),
            queue: TransferQueue::new(reloader),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn queue(&self) -> &TransferQueue {
        &self.queue
    }

    /// 从根目录开始完整同步一次
    pub async fn sync_all(&self) -> Result<SyncReport> {
        info!("开始初次同步: {}", self.session.client.name());
        let mut report = SyncReport::default();
        self.sync_dir(".".to_string(), &mut report).await?;

        info!(
            "同步完成: {} 个目录, 上传 {} 个, 下载 {} 个, {} 字节",
            report.dirs_visited, report.files_uploaded, report.files_downloaded, report.bytes_transferred
        );
        Ok(report)
    }

    /// 单层：补目录 -> 两侧列表 -> 比较 -> 传文件 -> 递归子目录
    fn sync_dir<'a>(&'a self, path: String, report: &'a mut SyncReport) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let materializer = self.session.materializer();
            if materializer.ensure_dir(Side::Local, &path).await? == Materialized::Created {
                report.dirs_created_local += 1;
            }
            if materializer.ensure_dir(Side::Remote, &path).await? == Materialized::Created {
                report.dirs_created_remote += 1;
            }

            let lister = self.session.lister();
            let (local, remote) = tokio::try_join!(
                lister.list(Side::Local, &path),
                lister.list(Side::Remote, &path)
            )?;
            report.dirs_visited += 1;

            let local: Vec<_> = local
                .into_iter()
                .filter(|e| !self.session.is_ignored(&e.path))
                .collect();
            let remote: Vec<_> = remote
                .into_iter()
                .filter(|e| !self.session.is_ignored(&e.path))
                .collect();

            let actions = TreeDiffer::new().diff(&local, &remote);
            let (files, dirs) = TreeDiffer::partition(actions);

            // 协议会话不支持并发请求，逐个传输
            for entry in &files {
                match entry.origin {
                    Side::Local => {
                        self.session.upload_with_fallback(&entry.path).await?;
                        report.files_uploaded += 1;
                        info!("已上传: {}", entry.path);
                    }
                    Side::Remote => {
                        self.session.download(&entry.path).await?;
                        report.files_downloaded += 1;
                        info!("已下载: {}", entry.path);
                    }
                }
                report.bytes_transferred += entry.size;
            }

            for entry in dirs {
                self.sync_dir(entry.path, report).await?;
            }

            Ok(())
        })
    }

    /// 把一次文件变更放进上传队列；返回 true 表示需要启动消费
    pub fn enqueue_change(&self, changed: &Path) -> bool {
        let path = self.session.mapper.to_local(&changed.to_string_lossy());
        if !path.starts_with("./") {
            debug!("不在同步目录内，忽略: {}", changed.display());
            return false;
        }
        if self.session.is_excluded(&path) {
            debug!("忽略变更: {}", path);
            return false;
        }
        self.queue.push(path)
    }

    /// 监听模式：处理变更直到 `shutdown` 完成或监听通道关闭
    pub async fn watch<F>(&self, mut changes: mpsc::Receiver<PathBuf>, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut draining: Option<BoxFuture<'_, Result<usize>>> = None;

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("收到退出信号，停止监听");
                    return Ok(());
                }
                changed = changes.recv() => match changed {
                    Some(path) => {
                        if self.enqueue_change(&path) {
                            draining = Some(Box::pin(self.queue.drain(&self.session)));
                        }
                    }
                    None => {
                        warn!("文件监听已关闭");
                        if let Some(pending) = draining.take() {
                            pending.await?;
                        }
                        return Ok(());
                    }
                },
                result = async {
                    match draining.as_mut() {
                        Some(pending) => pending.await,
                        None => std::future::pending().await,
                    }
                }, if draining.is_some() => {
                    draining = None;
                    let uploaded = result?;
                    debug!("上传队列已清空，本轮 {} 个", uploaded);
                }
            }
        }
    }

    /// 关闭连接，出错只记录
    pub async fn close(&self) {
        if let Err(e) = self.session.client.quit().await {
            warn!("关闭连接失败: {}", e);
        }
    }
}

fn enter(phase: Phase) {
    info!("进入阶段: {:?}", phase);
}

/// 完整流程：validating -> connecting -> syncing -> {watching | exiting}
pub async fn run<F>(options: RunOptions, shutdown: F) -> Result<()>
where
    F: Future<Output = ()>,
{
    enter(Phase::Validating);
    let config = Config::load(&options.config_path)?;
    let local_root = options.local_root.canonicalize()?;

    enter(Phase::Connecting);
    let client = create_client(&config.ftp)
        .map_err(|e| SyncError::ConfigValidation(format!("无法创建 FTP 客户端: {}", e)))?;
    let reloader = Arc::new(BroadcastReloader::new(&config.sync.url));
    let mut reloads = reloader.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = reloads.recv().await {
            debug!("刷新事件: {} -> {}", event.path, event.url);
        }
    });
    let engine = SyncEngine::new(&config, &local_root, client, reloader);

    let result = drive(&engine, &options, &local_root, shutdown).await;

    enter(Phase::Exiting);
    engine.close().await;
    result
}

async fn drive<F>(engine: &SyncEngine, options: &RunOptions, local_root: &Path, shutdown: F) -> Result<()>
where
    F: Future<Output = ()>,
{
    if options.initial_sync {
        enter(Phase::Syncing);
        engine.sync_all().await?;
    }

    if options.watch {
        enter(Phase::Watching);
        let (_watcher, changes) = ChangeWatcher::spawn(local_root)?;
        engine.watch(changes, shutdown).await?;
    }

    Ok(())
}
