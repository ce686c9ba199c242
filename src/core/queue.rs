//! 变更上传队列
//!
//! FIFO + draining 标志。同一时刻只有一个消费循环；消费过程中 push
//! 的条目由当前循环处理。重复 push 会重复上传，不做去重。

use crate::core::reload::{should_reload, ReloadHook};
use crate::core::session::Session;
use crate::error::{Result, SyncError};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueState {
    Idle,
    Draining,
}

#[derive(Debug, Default)]
struct Inner {
    items: VecDeque<String>,
    draining: bool,
}

pub struct TransferQueue {
    inner: Mutex<Inner>,
    reloader: Arc<dyn ReloadHook>,
}

impl TransferQueue {
    pub fn new(reloader: Arc<dyn ReloadHook>) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            reloader,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// 入队；返回 true 表示队列从 idle 进入 draining，调用方需要启动 [`drain`](Self::drain)
    pub fn push(&self, path: String) -> bool {
        let mut inner = self.lock();
        debug!("加入上传队列: {} (排队 {})", path, inner.items.len());
        inner.items.push_back(path);
        if inner.draining {
            false
        } else {
            inner.draining = true;
            true
        }
    }

    pub fn state(&self) -> QueueState {
        if self.lock().draining {
            QueueState::Draining
        } else {
            QueueState::Idle
        }
    }

    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 取下一项，队列空时回到 idle
    fn next(&self) -> Option<String> {
        let mut inner = self.lock();
        let item = inner.items.pop_front();
        if item.is_none() {
            inner.draining = false;
        }
        item
    }

    fn abort(&self) {
        let mut inner = self.lock();
        inner.items.clear();
        inner.draining = false;
    }

    /// 逐项上传直到队列为空
    ///
    /// 每项失败后补建远程父目录重试一次；仍失败则清空队列并返回
    /// `QueueExhaustion`。返回成功上传的数量。
    pub async fn drain(&self, session: &Session) -> Result<usize> {
        let mut uploaded = 0;

        while let Some(path) = self.next() {
            match session.upload_with_fallback(&path).await {
                Ok(()) => {}
                Err(SyncError::Transfer { path, message }) => {
                    error!("上传最终失败，停止队列: {} - {}", path, message);
                    self.abort();
                    return Err(SyncError::QueueExhaustion { path, message });
                }
                Err(e) => {
                    error!("补建目录失败，停止队列: {}", e);
                    self.abort();
                    return Err(e);
                }
            }

            info!("已上传: {}", path);
            uploaded += 1;

            if should_reload(&path) {
                self.reloader.reload(&path).await;
            }
        }

        Ok(uploaded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::storage::memory::MemoryClient;
    use async_trait::async_trait;

    #[derive(Default)]
    struct RecordingReloader {
        paths: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ReloadHook for RecordingReloader {
        async fn reload(&self, path: &str) {
            self.paths.lock().unwrap().push(path.to_string());
        }
    }

    fn setup() -> (tempfile::TempDir, Arc<MemoryClient>, Session) {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::parse(
            r#"{ "ftp": { "host": "h", "port": 21, "user": "u", "pass": "p" },
                 "sync": { "url": "http://x", "path": "/www", "ignore": [] } }"#,
        )
        .unwrap();
        let client = Arc::new(MemoryClient::new());
        client.add_dir("/www");
        let session = Session::new(&config, dir.path(), client.clone());
        (dir, client, session)
    }

    #[test]
    fn test_push_state_transitions() {
        let queue = TransferQueue::new(Arc::new(RecordingReloader::default()));
        assert_eq!(queue.state(), QueueState::Idle);

        assert!(queue.push("./a.css".into()));
        assert_eq!(queue.state(), QueueState::Draining);
        // 已在消费中，不再启动第二个循环；重复条目保留
        assert!(!queue.push("./a.css".into()));
        assert_eq!(queue.len(), 2);
    }

    #[tokio::test]
    async fn test_drain_uploads_in_order_and_reloads() {
        let (dir, client, session) = setup();
        for name in ["index.html", "logo.png", "app.js"] {
            std::fs::write(dir.path().join(name), name.as_bytes()).unwrap();
        }
        let reloader = Arc::new(RecordingReloader::default());
        let queue = TransferQueue::new(reloader.clone());

        assert!(queue.push("./index.html".into()));
        assert!(!queue.push("./logo.png".into()));
        assert!(!queue.push("./app.js".into()));

        assert_eq!(queue.drain(&session).await.unwrap(), 3);
        assert_eq!(queue.state(), QueueState::Idle);
        assert_eq!(
            client.ops(),
            vec!["put /www/index.html", "put /www/logo.png", "put /www/app.js"]
        );
        assert_eq!(*reloader.paths.lock().unwrap(), vec!["./index.html", "./app.js"]);

        // 空闲后再次 push 会重新启动
        assert!(queue.push("./index.html".into()));
    }

    #[tokio::test]
    async fn test_missing_directory_fallback() {
        let (dir, client, session) = setup();
        std::fs::create_dir(dir.path().join("css")).unwrap();
        std::fs::write(dir.path().join("css/site.css"), b"body{}").unwrap();
        let queue = TransferQueue::new(Arc::new(RecordingReloader::default()));

        queue.push("./css/site.css".into());
        assert_eq!(queue.drain(&session).await.unwrap(), 1);
        assert_eq!(
            client.ops(),
            vec![
                "put /www/css/site.css",
                "list /www",
                "mkdir /www",
                "list /www/css",
                "mkdir /www/css",
                "put /www/css/site.css",
            ]
        );
        assert_eq!(client.file("/www/css/site.css").unwrap(), b"body{}");
    }

    #[tokio::test]
    async fn test_root_level_file_creates_remote_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), b"<p>hi</p>").unwrap();
        let config = Config::parse(
            r#"{ "ftp": { "host": "h", "port": 21, "user": "u", "pass": "p" },
                 "sync": { "url": "http://x", "path": "/www", "ignore": [] } }"#,
        )
        .unwrap();
        // 远程根目录不存在
        let client = Arc::new(MemoryClient::new());
        let session = Session::new(&config, dir.path(), client.clone());
        let queue = TransferQueue::new(Arc::new(RecordingReloader::default()));

        queue.push("./index.html".into());
        assert_eq!(queue.drain(&session).await.unwrap(), 1);
        assert_eq!(
            client.ops(),
            vec![
                "put /www/index.html",
                "list /www",
                "mkdir /www",
                "put /www/index.html",
            ]
        );
        assert_eq!(client.file("/www/index.html").unwrap(), b"<p>hi</p>");
    }

    #[tokio::test]
    async fn test_second_failure_aborts_queue() {
        let (dir, client, session) = setup();
        std::fs::write(dir.path().join("a.html"), b"a").unwrap();
        std::fs::write(dir.path().join("b.html"), b"b").unwrap();
        client.fail_next_puts(2);
        let reloader = Arc::new(RecordingReloader::default());
        let queue = TransferQueue::new(reloader.clone());

        queue.push("./a.html".into());
        queue.push("./b.html".into());
        let err = queue.drain(&session).await.unwrap_err();

        assert_eq!(err.name(), "QueueExhaustionError");
        assert!(queue.is_empty());
        assert_eq!(queue.state(), QueueState::Idle);
        assert!(client.file("/www/b.html").is_none());
        assert!(reloader.paths.lock().unwrap().is_empty());
    }
}
