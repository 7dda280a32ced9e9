//! Progress markers and report formatting

use crate::types::Counts;
use chrono::{DateTime, Local};
use std::io::{self, Write};

/// Default number of files between progress dots
pub const DEFAULT_PROGRESS_EVERY: u64 = 100;

/// Prints a dot every `every` files while copying
#[derive(Debug, Clone, Copy)]
pub struct ProgressDots {
    every: u64,
    enabled: bool,
}

impl ProgressDots {
    /// Create a dot printer; dots are suppressed when `enabled` is false
    pub fn new(every: u64, enabled: bool) -> Self {
        Self {
            every: every.max(1),
            enabled,
        }
    }

    /// Emit a dot if `files` lands on the interval
    pub fn tick<W: Write + ?Sized>(&self, out: &mut W, files: u64) -> io::Result<()> {
        if self.enabled && files % self.every == 0 {
            write!(out, ".")?;
            out.flush()?;
        }
        Ok(())
    }

    /// Terminate the dot line once a traversal has seen enough files
    pub fn finish<W: Write + ?Sized>(&self, out: &mut W, files: u64) -> io::Result<()> {
        if files >= self.every {
            writeln!(out)?;
        }
        Ok(())
    }
}

impl Default for ProgressDots {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRESS_EVERY, true)
    }
}

/// Per-directory summary line
pub fn format_summary(counts: &Counts, dry_run: bool) -> String {
    let label = if dry_run { "Would copy" } else { "Copied" };
    format!(
        "Dirs: {}, Files: {}, {}: {}",
        counts.dirs, counts.files, label, counts.copied
    )
}

/// Echo text for an applied `!@` directive
pub fn format_since(start: &DateTime<Local>) -> String {
    format!("since {}", start.format("%Y-%m-%d %H:%M:%S %:z"))
}

/// End-of-run error block, starting with a blank line
pub fn format_error_block(messages: &[String]) -> String {
    let mut lines = Vec::with_capacity(messages.len() + 2);
    lines.push(String::new());
    lines.push(format!("{} errors:", messages.len()));
    lines.extend(messages.iter().cloned());
    lines.join("\n")
}
