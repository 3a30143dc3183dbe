use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::AppError;

/// Global crash log directory, set during init.
static CRASH_LOG_DIR: OnceLock<PathBuf> = OnceLock::new();

const LOG_FILE_PREFIX: &str = "zendesk-view-copy";

/// Where and how much to keep on disk.
#[derive(Debug, Clone)]
pub struct LogSettings {
    pub log_dir: PathBuf,
    /// Rotated files retained beside the active one.
    pub max_log_files: usize,
}

fn file_appender(settings: &LogSettings) -> Result<RollingFileAppender, AppError> {
    std::fs::create_dir_all(&settings.log_dir)?;
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix("log")
        .max_log_files(settings.max_log_files.max(1))
        .build(&settings.log_dir)
        .map_err(|e| AppError::Internal(format!("Failed to open log file: {e}")))
}

/// Initialize tracing with stdout, rolling file and Sentry layers.
///
/// - Stdout: compact, human-readable, with file and line
/// - File: rotated daily under `log_dir`, keeping at most `max_log_files`.
///   Rotation is time-based (`tracing-appender` has no size trigger), so a
///   single day's file is not capped in size.
/// - Sentry: ERROR events as issues, WARN as breadcrumbs (no-op without a DSN)
/// - Default level: INFO for dependencies, DEBUG for this crate; override via RUST_LOG
///
/// The returned guard flushes the file writer on drop; hold it for the whole run.
pub fn init(settings: &LogSettings) -> Result<WorkerGuard, AppError> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,view_copy=debug,zendesk_view_copy=debug"));

    let stdout_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .compact();

    let (file_writer, guard) = tracing_appender::non_blocking(file_appender(settings)?);
    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true);

    let sentry_layer = sentry_tracing::layer().event_filter(|meta| match *meta.level() {
        tracing::Level::ERROR => sentry_tracing::EventFilter::Event,
        tracing::Level::WARN => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .with(sentry_layer)
        .try_init()
        .map_err(|e| AppError::Internal(format!("Failed to install tracing subscriber: {e}")))?;

    tracing::debug!(log_dir = %settings.log_dir.display(), "Tracing initialized");
    Ok(guard)
}

/// Install a panic hook that writes crash details under `{log_dir}/crash_logs`.
pub fn install_crash_hook(log_dir: &Path) {
    let crash_dir = log_dir.join("crash_logs");
    let _ = std::fs::create_dir_all(&crash_dir);
    CRASH_LOG_DIR.set(crash_dir).ok();

    let prev_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        if let Some(dir) = CRASH_LOG_DIR.get() {
            let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
            let path = dir.join(format!("crash_{}.log", timestamp));
            let _ = std::fs::write(&path, crash_report(info));
            eprintln!("[CRASH] Report written to: {}", path.display());
        }
        prev_hook(info);
    }));

    tracing::debug!("Crash hook installed");
}

fn crash_report(info: &std::panic::PanicHookInfo<'_>) -> String {
    let mut report = format!(
        "=== ZENDESK VIEW COPY CRASH REPORT ===\n\
         Time: {}\n\
         Version: {}\n\n",
        chrono::Local::now().to_rfc3339(),
        env!("CARGO_PKG_VERSION"),
    );

    if let Some(msg) = info.payload().downcast_ref::<&str>() {
        report.push_str(&format!("Panic: {}\n", msg));
    } else if let Some(msg) = info.payload().downcast_ref::<String>() {
        report.push_str(&format!("Panic: {}\n", msg));
    } else {
        report.push_str("Panic: <unknown payload>\n");
    }

    if let Some(loc) = info.location() {
        report.push_str(&format!("Location: {}:{}:{}\n", loc.file(), loc.line(), loc.column()));
    }

    report.push_str(&format!(
        "\nBacktrace:\n{}\n",
        std::backtrace::Backtrace::force_capture()
    ));
    report
}
