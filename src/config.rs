//! 同步配置模块
//!
//! 配置文件为 JSON：`ftp.{host,port,user,pass}` + `sync.{url,path,ignore[]}`，
//! 可选的 `log` 段见 [`crate::logging::LogConfig`]。启动时加载一次，之后只读。

use crate::error::{Result, SyncError};
use crate::logging::LogConfig;
use globset::Glob;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// 默认配置文件名（同时在内置忽略列表中）
pub const CONFIG_FILE_NAME: &str = ".ftpsync.json";

/// FTP 连接配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FtpConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub pass: String,
}

/// 同步配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncSettings {
    /// 站点地址，用于刷新通知
    pub url: String,
    /// 远程根目录
    pub path: String,
    /// 用户忽略规则（glob）
    pub ignore: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub ftp: FtpConfig,
    pub sync: SyncSettings,
    #[serde(default)]
    pub log: LogConfig,
}

impl Config {
    /// 从文件加载并校验配置
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            SyncError::ConfigValidation(format!("无法读取配置文件 {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
    }

    /// 解析并校验配置内容
    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(content)
            .map_err(|e| SyncError::ConfigValidation(format!("配置格式错误: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let required = [
            ("ftp.host", &self.ftp.host),
            ("ftp.user", &self.ftp.user),
            ("sync.url", &self.sync.url),
            ("sync.path", &self.sync.path),
        ];
        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(SyncError::ConfigValidation(format!("{} 不能为空", key)));
            }
        }

        if self.ftp.port == 0 {
            return Err(SyncError::ConfigValidation("ftp.port 不能为 0".to_string()));
        }

        if !self.sync.url.starts_with("http://") && !self.sync.url.starts_with("https://") {
            return Err(SyncError::ConfigValidation(format!(
                "sync.url 必须以 http:// 或 https:// 开头: {}",
                self.sync.url
            )));
        }

        // "." 是本地根目录标记，不能作为远程根
        if self.sync.path.trim_end_matches('/') == "." {
            return Err(SyncError::ConfigValidation(
                "sync.path 不能为 \".\"".to_string(),
            ));
        }

        for pattern in &self.sync.ignore {
            Glob::new(pattern).map_err(|e| {
                SyncError::ConfigValidation(format!("无效的忽略规则 {:?}: {}", pattern, e))
            })?;
        }

        Ok(())
    }
}
