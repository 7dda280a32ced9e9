use anyhow::Context;
use clap::Parser;
use console::style;
use locbak::config::{read_config_lines, Cli};
use locbak::{Config, LocalFileSystem};
use std::io::Write;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Convert CLI args to Config - this validates immediately
    let config = Config::try_from(cli)?;
    let lines = read_config_lines(&config.config_path).context("cannot load directive file")?;
    let fs = LocalFileSystem::new(config.copy_method);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let report = locbak::execute(&lines, &mut out, &fs, &config);
    out.flush().context("cannot flush stdout")?;

    if let Some(path) = &config.report_path {
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(path, json)
            .with_context(|| format!("cannot write report to {}", path.display()))?;
    }

    match report.into_result() {
        Ok(_) => Ok(ExitCode::SUCCESS),
        Err(err) => {
            tracing::debug!(fatal = err.is_fatal(), errors = err.error_count(), "backup failed");
            eprintln!("{} {}", style("error:").red().bold(), err);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "locbak=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
