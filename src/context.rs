use std::path::PathBuf;

use chrono::{DateTime, Local};

/// File name of the plain-text record of views that could not be recreated.
pub const UNRECREATABLE_FILE: &str = "ViewsUnableToCreate.txt";

/// Per-run state handed to every component that needs the clock or a log handle.
///
/// Created once in `main`; the timestamp is frozen so every default description
/// and every unrecreatable record of a run carries the same value.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub run_id: String,
    pub started_at: DateTime<Local>,
    pub log_dir: PathBuf,
    span: tracing::Span,
}

impl RunContext {
    pub fn new(log_dir: impl Into<PathBuf>) -> Self {
        Self::with_clock(log_dir, Local::now())
    }

    /// Fixed-clock constructor, used by tests to pin the timestamp.
    pub fn with_clock(log_dir: impl Into<PathBuf>, started_at: DateTime<Local>) -> Self {
        let run_id = uuid::Uuid::new_v4().to_string();
        let span = tracing::info_span!("view_copy", run_id = %run_id);
        Self {
            run_id,
            started_at,
            log_dir: log_dir.into(),
            span,
        }
    }

    /// Span every log line of this run is recorded under.
    pub fn span(&self) -> &tracing::Span {
        &self.span
    }

    /// Human-readable run timestamp used in descriptions and records.
    pub fn timestamp(&self) -> String {
        self.started_at.format("%Y-%m-%d %H:%M:%S%.6f").to_string()
    }

    pub fn unrecreatable_path(&self) -> PathBuf {
        self.log_dir.join(UNRECREATABLE_FILE)
    }
}
