use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// 本地时区时间格式化器
struct LocalTimer;

impl fmt::time::FormatTime for LocalTimer {
    fn format_time(&self, w: &mut fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", chrono::Local::now().to_rfc3339())
    }
}

/// `gateway.YYYY-MM-DD.log` under `dir`, created on demand.
fn daily_appender(dir: &Path) -> Result<RollingFileAppender, InitError> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("gateway")
        .filename_suffix("log")
        .build(dir)
}

/// 初始化日志系统
///
/// Console output is always on; `log_dir` adds a non-blocking daily file.
/// Keep the returned guard alive for the file writer to flush.
pub fn init_logger(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    // 捕获 log 宏日志
    let _ = tracing_log::LogTracer::init();

    let (file_writer, guard) = match log_dir.map(|dir| (dir, daily_appender(dir))) {
        Some((_, Ok(appender))) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(writer), Some(guard))
        }
        Some((dir, Err(e))) => {
            eprintln!("cannot log to {}: {}; console only", dir.display(), e);
            (None, None)
        }
        None => (None, None),
    };

    let file_layer = file_writer.map(|writer| {
        fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .with_timer(LocalTimer)
    });

    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().with_target(false).with_timer(LocalTimer))
        .with(file_layer)
        .try_init();

    tracing::info!(file = guard.is_some(), "logger initialized");
    guard
}
