//! 忽略规则
//!
//! 内置规则 + 用户规则，任一候选（完整相对路径或文件名）命中任一规则即忽略。
//! 没有取反，也没有优先级。

use crate::config::CONFIG_FILE_NAME;
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use tracing::warn;

/// 内置忽略：版本控制元数据、系统文件、配置文件本身、常见构建/缓存目录
pub const BUILTIN_IGNORE: &[&str] = &[
    ".git",
    ".svn",
    ".hg",
    ".DS_Store",
    "Thumbs.db",
    "desktop.ini",
    CONFIG_FILE_NAME,
    ".ftpsync",
    "node_modules",
    "bower_components",
    ".sass-cache",
    ".cache",
];

#[derive(Debug, Clone)]
pub struct IgnoreMatcher {
    patterns: Vec<String>,
    set: GlobSet,
}

impl IgnoreMatcher {
    pub fn new(user_patterns: &[String]) -> Self {
        let patterns: Vec<String> = BUILTIN_IGNORE
            .iter()
            .map(|p| p.to_string())
            .chain(user_patterns.iter().cloned())
            .collect();

        let mut builder = GlobSetBuilder::new();
        for pattern in &patterns {
            // `*` 不跨越目录分隔符
            match GlobBuilder::new(pattern).literal_separator(true).build() {
                Ok(glob) => {
                    builder.add(glob);
                }
                Err(e) => warn!("忽略规则无效，已跳过: {} - {}", pattern, e),
            }
        }

        let set = builder.build().unwrap_or_else(|e| {
            warn!("忽略规则编译失败: {}", e);
            GlobSet::empty()
        });

        Self { patterns, set }
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// 任一候选命中即返回 true
    pub fn is_ignored<S: AsRef<str>>(&self, candidates: &[S]) -> bool {
        candidates.iter().any(|candidate| {
            let candidate = candidate.as_ref().trim_start_matches("./");
            !candidate.is_empty() && candidate != "." && self.set.is_match(candidate)
        })
    }
}
