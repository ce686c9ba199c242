//! 内存中的传输客户端，供测试使用

use super::{RawEntry, TransferClient, ENTRY_TYPE_DIR, ENTRY_TYPE_FILE};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Clone)]
enum Node {
    Dir,
    File { data: Vec<u8>, time: i64 },
}

#[derive(Debug, Default)]
struct State {
    nodes: BTreeMap<String, Node>,
    ops: Vec<String>,
    clock: i64,
    failing_puts: usize,
    closed: bool,
}

/// 行为接近 FTP 的内存树：上传要求父目录存在，mkdir 只建一级
pub struct MemoryClient {
    state: Mutex<State>,
}

fn normalize(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}

fn parent_of(path: &str) -> String {
    match path.rsplit_once('/') {
        Some(("", _)) => "/".to_string(),
        Some((parent, _)) => parent.to_string(),
        None => "/".to_string(),
    }
}

impl MemoryClient {
    pub fn new() -> Self {
        let mut state = State {
            clock: 1_000,
            ..Default::default()
        };
        state.nodes.insert("/".to_string(), Node::Dir);
        Self {
            state: Mutex::new(state),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn add_dir(&self, path: &str) {
        self.state().nodes.insert(normalize(path), Node::Dir);
    }

    pub fn add_file(&self, path: &str, data: &[u8], time: i64) {
        self.state().nodes.insert(
            normalize(path),
            Node::File {
                data: data.to_vec(),
                time,
            },
        );
    }

    pub fn file(&self, path: &str) -> Option<Vec<u8>> {
        match self.state().nodes.get(&normalize(path)) {
            Some(Node::File { data, .. }) => Some(data.clone()),
            _ => None,
        }
    }

    pub fn is_dir(&self, path: &str) -> bool {
        matches!(self.state().nodes.get(&normalize(path)), Some(Node::Dir))
    }

    /// 让接下来的 n 次上传失败
    pub fn fail_next_puts(&self, n: usize) {
        self.state().failing_puts = n;
    }

    pub fn ops(&self) -> Vec<String> {
        self.state().ops.clone()
    }

    pub fn clear_ops(&self) {
        self.state().ops.clear();
    }

    pub fn is_closed(&self) -> bool {
        self.state().closed
    }
}

#[async_trait]
impl TransferClient for MemoryClient {
    async fn list(&self, path: &str) -> Result<Vec<RawEntry>> {
        let mut state = self.state();
        let path = normalize(path);
        state.ops.push(format!("list {}", path));

        if !matches!(state.nodes.get(&path), Some(Node::Dir)) {
            return Err(anyhow!("550 {}: No such file or directory", path));
        }

        let entries = state
            .nodes
            .iter()
            .filter(|(p, _)| p.as_str() != path && parent_of(p) == path)
            .map(|(p, node)| {
                let name = p.rsplit('/').next().unwrap_or_default().to_string();
                match node {
                    Node::Dir => RawEntry {
                        typ: ENTRY_TYPE_DIR,
                        name,
                        size: "0".into(),
                        time: "0".into(),
                    },
                    Node::File { data, time } => RawEntry {
                        typ: ENTRY_TYPE_FILE,
                        name,
                        size: data.len().to_string(),
                        time: time.to_string(),
                    },
                }
            })
            .collect();
        Ok(entries)
    }

    async fn get(&self, remote_path: &str, local_path: &Path) -> Result<()> {
        let data = {
            let mut state = self.state();
            let remote_path = normalize(remote_path);
            state.ops.push(format!("get {}", remote_path));
            match state.nodes.get(&remote_path) {
                Some(Node::File { data, .. }) => data.clone(),
                _ => return Err(anyhow!("550 {}: No such file", remote_path)),
            }
        };
        std::fs::write(local_path, data)?;
        Ok(())
    }

    async fn put(&self, local_path: &Path, remote_path: &str) -> Result<()> {
        let data = std::fs::read(local_path);
        let mut state = self.state();
        let remote_path = normalize(remote_path);
        state.ops.push(format!("put {}", remote_path));

        if state.failing_puts > 0 {
            state.failing_puts -= 1;
            return Err(anyhow!("550 {}: injected failure", remote_path));
        }
        if !matches!(state.nodes.get(&parent_of(&remote_path)), Some(Node::Dir)) {
            return Err(anyhow!("553 {}: No such directory", remote_path));
        }

        state.clock += 1;
        let time = state.clock;
        state.nodes.insert(remote_path, Node::File { data: data?, time });
        Ok(())
    }

    async fn mkdir(&self, path: &str) -> Result<()> {
        let mut state = self.state();
        let path = normalize(path);
        state.ops.push(format!("mkdir {}", path));

        match state.nodes.get(&path) {
            Some(Node::Dir) => return Ok(()),
            Some(Node::File { .. }) => return Err(anyhow!("550 {}: File exists", path)),
            None => {}
        }
        if !matches!(state.nodes.get(&parent_of(&path)), Some(Node::Dir)) {
            return Err(anyhow!("550 {}: No such directory", path));
        }
        state.nodes.insert(path, Node::Dir);
        Ok(())
    }

    async fn quit(&self) -> Result<()> {
        let mut state = self.state();
        state.ops.push("quit".to_string());
        state.closed = true;
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
