//! Configuration management

use crate::executor::CopyMethod;
use crate::report::DEFAULT_MAX_ERRORS;
use crate::types::BackupError;
use crate::ui::progress::DEFAULT_PROGRESS_EVERY;
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};

/// Command-line arguments
#[derive(Debug, Parser)]
#[command(name = "locbak", version, about = "Incremental local backup driven by a directive file")]
pub struct Cli {
    /// Path to the directive file
    pub config: PathBuf,

    /// List files that would be copied without copying them
    #[arg(short, long)]
    pub dry_run: bool,

    /// Abort the run after this many errors
    #[arg(long, default_value_t = DEFAULT_MAX_ERRORS)]
    pub max_errors: usize,

    /// Print a progress dot every N files
    #[arg(long, default_value_t = DEFAULT_PROGRESS_EVERY)]
    pub progress_every: u64,

    /// Copy strategy (defaults to the best one for this platform)
    #[arg(long, value_enum)]
    pub copy_method: Option<CopyMethod>,

    /// Write a JSON run report to this file
    #[arg(long, value_name = "PATH")]
    pub report: Option<PathBuf>,

    /// Enable debug logging on stderr
    #[arg(short, long)]
    pub verbose: bool,
}

/// Options fixed for one backup run
#[derive(Debug, Clone)]
pub struct Config {
    /// Directive file
    pub config_path: PathBuf,

    /// Dry run (report the copy plan, touch nothing)
    pub dry_run: bool,

    /// Aggregated errors that abort the run
    pub max_errors: usize,

    /// Files between progress dots
    pub progress_every: u64,

    pub copy_method: CopyMethod,

    /// Clear the read-only bit of stale destinations before overwriting
    pub clear_readonly: bool,

    /// Where to write the JSON run report, if anywhere
    pub report_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_path: PathBuf::new(),
            dry_run: false,
            max_errors: DEFAULT_MAX_ERRORS,
            progress_every: DEFAULT_PROGRESS_EVERY,
            copy_method: CopyMethod::for_platform(),
            // Only Windows refuses to replace a read-only file.
            clear_readonly: cfg!(windows),
            report_path: None,
        }
    }
}

impl Config {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), BackupError> {
        if self.max_errors == 0 {
            return Err(BackupError::Config(
                "max errors must be at least 1".to_string(),
            ));
        }

        if self.progress_every == 0 {
            return Err(BackupError::Config(
                "progress interval must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

impl TryFrom<Cli> for Config {
    type Error = BackupError;

    fn try_from(cli: Cli) -> Result<Self, Self::Error> {
        let config = Config {
            config_path: cli.config,
            dry_run: cli.dry_run,
            max_errors: cli.max_errors,
            progress_every: cli.progress_every,
            copy_method: cli.copy_method.unwrap_or_else(CopyMethod::for_platform),
            report_path: cli.report,
            ..Config::default()
        };
        config.validate()?;
        Ok(config)
    }
}

/// Read a directive file into lines
pub fn read_config_lines(path: &Path) -> Result<Vec<String>, BackupError> {
    let text = fs::read_to_string(path).map_err(|e| {
        BackupError::Config(format!("cannot read {}: {}", path.display(), e))
    })?;
    Ok(text.lines().map(str::to_owned).collect())
}
