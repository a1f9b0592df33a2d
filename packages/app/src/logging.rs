//! tracing 初始化：stdout 始终输出，按 [`Config`] 可选挂一个按天滚动
//! 的文件层。

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;

const LOG_FILE_PREFIX: &str = "yuedu.log";

/// 文件日志的后台写线程句柄。丢弃即冲刷并停写，调用方要持有到进程
/// 结束。
pub struct FileLogGuard {
    _guard: WorkerGuard,
}

/// 初始化全局订阅器。文件日志开启但目录建不出来时退回纯 stdout，
/// 不阻塞启动。
pub fn init_tracing(config: &Config) -> Option<FileLogGuard> {
    let env_filter =
        EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let stdout_layer = fmt::layer().with_target(true);

    if config.file_logs {
        if let Err(err) = std::fs::create_dir_all(&config.log_dir) {
            eprintln!(
                "failed to create log directory {}: {err}",
                config.log_dir.display()
            );
        } else {
            let appender =
                RollingFileAppender::new(Rotation::DAILY, &config.log_dir, LOG_FILE_PREFIX);
            let (file_writer, guard) = tracing_appender::non_blocking(appender);
            let file_layer = fmt::layer()
                .with_writer(file_writer)
                .with_ansi(false)
                .with_target(true);

            tracing_subscriber::registry()
                .with(env_filter)
                .with(stdout_layer)
                .with(file_layer)
                .init();

            return Some(FileLogGuard { _guard: guard });
        }
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .init();

    None
}
