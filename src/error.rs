//! 错误类型

use crate::core::Side;
use thiserror::Error;

/// 同步过程中的错误
#[derive(Debug, Error)]
pub enum SyncError {
    /// 配置文件缺失、格式错误或字段不合法（连接前致命）
    #[error("{0}")]
    ConfigValidation(String),

    /// 某一侧的目录不存在或无法列出
    #[error("无法列出{side}目录 {path}: {message}")]
    List {
        side: Side,
        path: String,
        message: String,
    },

    /// 目录创建失败
    #[error("无法创建{side}目录 {path}: {message}")]
    CreateDir {
        side: Side,
        path: String,
        message: String,
    },

    /// 上传/下载失败
    #[error("传输失败 {path}: {message}")]
    Transfer { path: String, message: String },

    /// 创建目录后重试仍然失败，队列终止
    #[error("上传 {path} 在补建目录后仍然失败: {message}")]
    QueueExhaustion { path: String, message: String },

    /// 文件监听失败
    #[error("文件监听失败: {0}")]
    Watch(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SyncError {
    /// 错误名称，输出到 stderr 时使用
    pub fn name(&self) -> &'static str {
        match self {
            SyncError::ConfigValidation(_) => "ConfigValidationError",
            SyncError::List { .. } => "ListError",
            SyncError::CreateDir { .. } => "CreateDirError",
            SyncError::Transfer { .. } => "TransferError",
            SyncError::QueueExhaustion { .. } => "QueueExhaustionError",
            SyncError::Watch(_) => "WatchError",
            SyncError::Io(_) => "IoError",
        }
    }

    pub(crate) fn list(side: Side, path: &str, err: impl std::fmt::Display) -> Self {
        SyncError::List {
            side,
            path: path.to_string(),
            message: err.to_string(),
        }
    }

    pub(crate) fn create_dir(side: Side, path: &str, err: impl std::fmt::Display) -> Self {
        SyncError::CreateDir {
            side,
            path: path.to_string(),
            message: err.to_string(),
        }
    }

    pub(crate) fn transfer(path: &str, err: impl std::fmt::Display) -> Self {
        SyncError::Transfer {
            path: path.to_string(),
            message: err.to_string(),
        }
    }
}

pub type Result<T, E = SyncError> = std::result::Result<T, E>;
