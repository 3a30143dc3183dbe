use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::context::RunContext;

/// Append-only text record of views that cannot be recreated, for manual follow-up.
#[derive(Debug, Clone)]
pub struct UnrecreatableLog {
    path: PathBuf,
}

impl UnrecreatableLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn for_run(ctx: &RunContext) -> Self {
        Self::new(ctx.unrecreatable_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record naming the view, the run timestamp and why it failed.
    pub fn record(&self, ctx: &RunContext, title: &str, reason: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut w = BufWriter::new(file);
        writeln!(w)?;
        writeln!(w, "Unable to recreate this view: {}", reason)?;
        writeln!(w, "\tTime: {}", ctx.timestamp())?;
        writeln!(w, "\tRun: {}", ctx.run_id)?;
        writeln!(w, "\tName: {}", title)?;
        w.flush()
    }
}
