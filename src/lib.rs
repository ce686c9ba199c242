pub mod config;
pub mod core;
pub mod error;
pub mod logging;
pub mod storage;

pub use config::{Config, CONFIG_FILE_NAME};
pub use core::{run, RunOptions, SyncEngine, SyncReport};
pub use error::{Result, SyncError};
