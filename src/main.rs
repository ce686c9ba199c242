use clap::Parser;
use ftpsync_lib::logging::{get_log_dir, LogConfig, SizeRotatingWriter};
use ftpsync_lib::{RunOptions, CONFIG_FILE_NAME};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// 本地目录与 FTP 远程目录双向同步，不删除任何文件
#[derive(Debug, Parser)]
#[command(name = "ftpsync", version, about)]
struct Cli {
    /// 配置文件
    #[arg(long, default_value = CONFIG_FILE_NAME)]
    config: PathBuf,

    /// 本地根目录，默认为当前目录
    #[arg(long)]
    root: Option<PathBuf>,

    /// 初次同步后持续监听本地变更
    #[arg(short, long)]
    watch: bool,

    /// 跳过初次同步
    #[arg(long)]
    no_initial_sync: bool,

    /// 输出 debug 日志
    #[arg(short, long)]
    verbose: bool,
}

/// 初始化日志系统，全局 subscriber 已存在时返回错误
fn init_logging(config_path: &Path, verbose: bool) -> Result<(), SetGlobalDefaultError> {
    let mut config = LogConfig::load(config_path);
    if verbose {
        config.level = "debug".to_string();
    }

    let env_filter = EnvFilter::builder()
        .with_default_directive(config.tracing_level().into())
        .from_env_lossy();

    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    // 文件日志层，创建失败时只输出到控制台
    let file_layer = config
        .enabled
        .then(|| SizeRotatingWriter::new(&get_log_dir(), config.max_size_mb))
        .and_then(|writer| match writer {
            Ok(writer) => Some(writer),
            Err(e) => {
                eprintln!("无法创建日志文件: {}", e);
                None
            }
        })
        .map(|writer| {
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(false)
        });

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer);

    tracing::subscriber::set_global_default(subscriber)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = init_logging(&cli.config, cli.verbose) {
        eprintln!("无法初始化日志: {}", e);
    }

    let options = RunOptions {
        config_path: cli.config,
        local_root: cli.root.unwrap_or_else(|| PathBuf::from(".")),
        watch: cli.watch,
        initial_sync: !cli.no_initial_sync,
    };

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("无法监听 Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    match ftpsync_lib::run(options, shutdown).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("同步失败: {}", e);
            eprintln!("{}: {}", e.name(), e);
            ExitCode::from(1)
        }
    }
}
