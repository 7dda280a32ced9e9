//! Error aggregation and the end-of-run report

use crate::types::{BackupError, Counts};
use serde::Serialize;

/// Default cap on aggregated errors before a run is abandoned
pub const DEFAULT_MAX_ERRORS: usize = 100;

/// Reason a run stops before its last configuration line
#[derive(Debug)]
pub enum Halt {
    /// Source path seen before any target directive
    TargetNotSpecified,
    /// Aggregated error count reached its cap
    TooManyErrors,
    /// Output sink failed
    Output(std::io::Error),
}

impl From<std::io::Error> for Halt {
    fn from(err: std::io::Error) -> Self {
        Halt::Output(err)
    }
}

/// Ordered list of non-fatal error messages with an abort threshold
#[derive(Debug, Clone)]
pub struct ErrorLog {
    messages: Vec<String>,
    max: usize,
}

impl ErrorLog {
    pub fn new(max: usize) -> Self {
        Self {
            messages: Vec::new(),
            max,
        }
    }

    /// Append a message
    ///
    /// Returns `Err(Halt::TooManyErrors)` once the log holds `max` messages;
    /// callers propagate it to stop the run.
    pub fn record(&mut self, message: impl Into<String>) -> Result<(), Halt> {
        let message = message.into();
        tracing::debug!(%message, "error recorded");
        self.messages.push(message);
        if self.messages.len() >= self.max {
            return Err(Halt::TooManyErrors);
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn into_messages(self) -> Vec<String> {
        self.messages
    }
}

impl Default for ErrorLog {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ERRORS)
    }
}

/// Whether a source argument was a single file or a directory tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    File,
    Directory,
}

/// Counters for one processed source argument
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceSummary {
    pub path: String,
    pub kind: SourceKind,
    #[serde(flatten)]
    pub counts: Counts,
}

/// How a run ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum Outcome {
    /// Every configuration line was processed
    Completed,
    TargetNotSpecified,
    TooManyErrors,
    Interrupted(String),
}

/// Summary of one backup run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub dry_run: bool,
    pub sources: Vec<SourceSummary>,
    pub errors: Vec<String>,
    pub outcome: Outcome,
}

impl RunReport {
    /// Files copied (or that would be copied) over all sources
    pub fn total_copied(&self) -> u64 {
        self.sources.iter().map(|s| s.counts.copied).sum()
    }

    pub fn total_files(&self) -> u64 {
        self.sources.iter().map(|s| s.counts.files).sum()
    }

    /// Collapse the report into the run's success/failure signal
    ///
    /// A missing target wins over aggregated errors; aggregated errors win
    /// over an interrupted output sink.
    pub fn into_result(self) -> Result<RunReport, BackupError> {
        if self.outcome == Outcome::TargetNotSpecified {
            return Err(BackupError::TargetNotSpecified);
        }
        if !self.errors.is_empty() {
            return Err(BackupError::Errors {
                count: self.errors.len(),
                messages: self.errors,
            });
        }
        if let Outcome::Interrupted(reason) = &self.outcome {
            return Err(BackupError::Interrupted(reason.clone()));
        }
        Ok(self)
    }
}
