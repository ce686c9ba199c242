use crate::core::entry::FileEntry;
use std::collections::HashSet;
use tracing::debug;

/// 目录比较器
///
/// 按名称配对两侧条目：
/// - 目录总是输出（需要递归），只在一侧存在的条目也输出（推送到缺失的一侧）；
/// - 两侧都有的文件只在大小不同时输出，取修改时间较新的一方；
/// - 大小相同即视为一致，不看时间。
///
/// 先扫本地再扫远程，已处理过的名称不会重复输出。
#[derive(Debug, Default)]
pub struct TreeDiffer;

impl TreeDiffer {
    pub fn new() -> Self {
        Self
    }

    pub fn diff(&self, local: &[FileEntry], remote: &[FileEntry]) -> Vec<FileEntry> {
        let mut recorded = HashSet::new();
        let mut result = Vec::new();

        Self::sweep(local, remote, &mut recorded, &mut result);
        Self::sweep(remote, local, &mut recorded, &mut result);

        debug!(
            "比较完成: 本地 {} 项, 远程 {} 项, 需处理 {} 项",
            local.len(),
            remote.len(),
            result.len()
        );
        result
    }

    fn sweep(
        ours: &[FileEntry],
        theirs: &[FileEntry],
        recorded: &mut HashSet<String>,
        result: &mut Vec<FileEntry>,
    ) {
        for entry in ours {
            if recorded.contains(&entry.name) {
                continue;
            }

            let counterpart = theirs.iter().find(|other| other.name == entry.name);
            match counterpart {
                Some(other) if !entry.is_dir() => {
                    if entry.size != other.size {
                        // 时间相同时保留先扫描的一侧
                        let newer = if other.modified_at > entry.modified_at {
                            other
                        } else {
                            entry
                        };
                        debug!(
                            "文件大小不同: {} ({}={}, {}={}), 取{}",
                            entry.path,
                            entry.origin,
                            entry.size,
                            other.origin,
                            other.size,
                            newer.origin
                        );
                        result.push(newer.clone());
                    }
                }
                _ => result.push(entry.clone()),
            }

            recorded.insert(entry.name.clone());
        }
    }

    /// 拆成（文件，目录），各自保持原顺序
    pub fn partition(actions: Vec<FileEntry>) -> (Vec<FileEntry>, Vec<FileEntry>) {
        actions.into_iter().partition(|entry| !entry.is_dir())
    }
}
