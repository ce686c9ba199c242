//! 上传完成后的页面刷新通知

use async_trait::async_trait;
use std::path::Path;
use tokio::sync::broadcast;
use tracing::info;

/// 触发刷新的扩展名
pub const RELOAD_EXTENSIONS: &[&str] = &["css", "html", "js"];

pub fn should_reload(path: &str) -> bool {
    Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| RELOAD_EXTENSIONS.contains(&ext))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReloadEvent {
    /// 本地命名空间路径
    pub path: String,
    /// 站点上对应的地址
    pub url: String,
}

#[async_trait]
pub trait ReloadHook: Send + Sync {
    async fn reload(&self, path: &str);
}

/// 通过 broadcast 通道发布刷新事件，没有订阅者时只记日志
pub struct BroadcastReloader {
    base_url: String,
    tx: broadcast::Sender<ReloadEvent>,
}

impl BroadcastReloader {
    pub fn new(base_url: &str) -> Self {
        let (tx, _) = broadcast::channel(64);
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            tx,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ReloadEvent> {
        self.tx.subscribe()
    }
}

#[async_trait]
impl ReloadHook for BroadcastReloader {
    async fn reload(&self, path: &str) {
        let event = ReloadEvent {
            path: path.to_string(),
            url: format!("{}/{}", self.base_url, path.trim_start_matches("./")),
        };
        info!("通知刷新: {}", event.url);
        let _ = self.tx.send(event);
    }
}
