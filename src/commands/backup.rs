//! Backup command
//!
//! Reads configuration lines in order. Directives update the session's
//! target and filters; every other line is a source that is either walked
//! (directory) or synced directly (file).

use crate::config::Config;
use crate::diff::{check_filters, destination_path, is_up_to_date};
use crate::directive::{parse_days, parse_size, Directive};
use crate::filesystem::{FileSystem, DEST_DIR_MODE, DEST_FILE_MODE};
use crate::filter::{parse_patterns, ExcludeSet, FilterSet};
use crate::report::{ErrorLog, Halt, Outcome, RunReport, SourceKind, SourceSummary};
use crate::scanner::{walk_source, SourceVisitor};
use crate::types::{BackupError, Counts, FileEntry, FileOutcome, SkipReason};
use crate::ui::{format_error_block, format_since, format_summary, ProgressDots};
use camino::Utf8Path;
use chrono::Local;
use regex::Regex;
use std::io::Write;

/// Run a backup and collapse the report into success or failure
///
/// # Errors
/// * [`BackupError::TargetNotSpecified`] - a source line came before `=>`
/// * [`BackupError::Errors`] - one or more aggregated errors were recorded
/// * [`BackupError::Interrupted`] - the output sink failed mid-run
pub fn run<I, S, W>(
    lines: I,
    out: &mut W,
    fs: &dyn FileSystem,
    config: &Config,
) -> Result<RunReport, BackupError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
    W: Write + ?Sized,
{
    execute(lines, out, fs, config).into_result()
}

/// Run a backup and return the full report, whatever the outcome
pub fn execute<I, S, W>(lines: I, out: &mut W, fs: &dyn FileSystem, config: &Config) -> RunReport
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
    W: Write + ?Sized,
{
    let mut session = Session::new(out, fs, config);
    let result = session.process(lines);
    session.finish(result)
}

/// Run state for one backup invocation
struct Session<'a, W: Write + ?Sized> {
    out: &'a mut W,
    fs: &'a dyn FileSystem,
    config: &'a Config,
    dots: ProgressDots,
    /// Current target root; empty until the first `=>`
    target: String,
    filters: FilterSet,
    /// Counters of the source being processed
    counts: Counts,
    errors: ErrorLog,
    sources: Vec<SourceSummary>,
}

impl<'a, W: Write + ?Sized> Session<'a, W> {
    fn new(out: &'a mut W, fs: &'a dyn FileSystem, config: &'a Config) -> Self {
        Self {
            out,
            fs,
            config,
            dots: ProgressDots::new(config.progress_every, !config.dry_run),
            target: String::new(),
            filters: FilterSet::new(),
            counts: Counts::default(),
            errors: ErrorLog::new(config.max_errors),
            sources: Vec::new(),
        }
    }

    fn process<I, S>(&mut self, lines: I) -> Result<(), Halt>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for line in lines {
            let line = line.as_ref().trim();

            if self.apply_directive(line)? {
                continue;
            }

            if self.target.is_empty() {
                return Err(Halt::TargetNotSpecified);
            }

            self.backup_source(Utf8Path::new(line))?;
        }
        Ok(())
    }

    /// Apply `line` if it is a directive; returns whether it was one
    fn apply_directive(&mut self, line: &str) -> Result<bool, Halt> {
        let Some(directive) = Directive::parse(line) else {
            return Ok(false);
        };

        match directive {
            Directive::Ignore => {}
            Directive::Target(path) => {
                self.target = path.to_string();
                writeln!(self.out, "target {}", self.target)?;
            }
            Directive::MaxAge(arg) => {
                let start = parse_days(arg)
                    .ok()
                    .and_then(|days| self.filters.set_max_age(days, Local::now()));
                match start {
                    Some(start) => writeln!(self.out, "{}", format_since(&start))?,
                    None => self.warn_number(line)?,
                }
            }
            Directive::MaxSize(arg) => match parse_size(arg) {
                Ok(bytes) => {
                    self.filters.set_max_size(bytes);
                    writeln!(self.out, "max size {}", bytes)?;
                }
                Err(_) => self.warn_number(line)?,
            },
            Directive::ExtendExclude(arg) => {
                let patterns = self.compile_excludes(arg)?;
                self.filters.extend_excludes(patterns);
                writeln!(self.out, "extend exclude {}", arg)?;
            }
            Directive::Exclude(arg) => {
                let patterns = self.compile_excludes(arg)?;
                self.filters.replace_excludes(patterns);
                writeln!(self.out, "exclude {}", arg)?;
            }
        }
        Ok(true)
    }

    fn warn_number(&mut self, line: &str) -> Result<(), Halt> {
        tracing::warn!(%line, "ignoring directive with malformed number");
        writeln!(self.out, "WARN: Expected only number in: {}", line)?;
        Ok(())
    }

    fn compile_excludes(&mut self, arg: &str) -> Result<Vec<Regex>, Halt> {
        let parsed = parse_patterns(arg);
        for piece in &parsed.invalid {
            self.errors
                .record(format!("Error in exclude regexp: {}", piece))?;
        }
        Ok(parsed.patterns)
    }

    fn backup_source(&mut self, path: &Utf8Path) -> Result<(), Halt> {
        let entry = match self.fs.stat(path) {
            Ok(entry) => entry,
            Err(err) => {
                tracing::debug!(%err, "source stat failed");
                return self.errors.record(format!("Cannot stat, skipping: {}", path));
            }
        };

        let _span = tracing::info_span!("source", %path).entered();
        writeln!(self.out, "\n{}", path)?;
        self.counts = Counts::default();

        let kind = if entry.is_dir {
            SourceKind::Directory
        } else {
            SourceKind::File
        };

        let result = match kind {
            SourceKind::Directory => {
                let fs = self.fs;
                walk_source(fs, path, self)
            }
            SourceKind::File => self.sync_and_count(entry),
        };

        self.sources.push(SourceSummary {
            path: path.to_string(),
            kind,
            counts: self.counts,
        });
        result?;

        if kind == SourceKind::Directory {
            self.dots.finish(&mut *self.out, self.counts.files)?;
            writeln!(
                self.out,
                "{}",
                format_summary(&self.counts, self.config.dry_run)
            )?;
            tracing::info!(
                dirs = self.counts.dirs,
                files = self.counts.files,
                copied = self.counts.copied,
                bytes = self.counts.bytes,
                "source done"
            );
        }
        Ok(())
    }

    /// Sync one file and fold its outcome into the source counters
    fn sync_and_count(&mut self, src: FileEntry) -> Result<(), Halt> {
        let outcome = self.sync_file(src)?;
        if outcome.is_copy() {
            self.counts.copied += 1;
        }
        if let FileOutcome::Copied(bytes) = outcome {
            self.counts.bytes += bytes;
        }
        Ok(())
    }

    /// Decide whether one source file must be copied, and copy it
    fn sync_file(&mut self, src: FileEntry) -> Result<FileOutcome, Halt> {
        self.counts.files += 1;
        self.dots.tick(&mut *self.out, self.counts.files)?;

        if let Some(reason) = check_filters(&src, &self.filters) {
            return Ok(skip(&src, reason));
        }

        let dest = destination_path(&self.target, &src.path);

        match self.fs.stat(&dest) {
            Ok(existing) => {
                self.make_writable(&existing);
                if is_up_to_date(&src, &existing) {
                    return Ok(skip(&src, SkipReason::UpToDate));
                }
            }
            Err(_) if self.config.dry_run => {}
            Err(_) => {
                if let Some(parent) = dest.parent() {
                    if let Err(err) = self.fs.mkdir_all(parent, DEST_DIR_MODE) {
                        tracing::debug!(%err, "cannot create destination dirs");
                        self.errors
                            .record(format!("Cannot create dirs for: {}", dest))?;
                        return Ok(FileOutcome::Failed);
                    }
                }
            }
        }

        if self.config.dry_run {
            writeln!(self.out, "{}", src.path)?;
            return Ok(FileOutcome::WouldCopy);
        }

        match self.fs.copy_file(&src.path, &dest, &src) {
            Ok(bytes) => {
                tracing::debug!(src = %src.path, %dest, bytes, "copied");
                Ok(FileOutcome::Copied(bytes))
            }
            Err(err) => {
                self.errors.record(err.to_string())?;
                Ok(FileOutcome::Failed)
            }
        }
    }

    /// Clear the read-only bit of an existing destination
    fn make_writable(&self, existing: &FileEntry) {
        if self.config.dry_run || !self.config.clear_readonly || !existing.is_readonly() {
            return;
        }
        if let Err(err) = self.fs.chmod(&existing.path, DEST_FILE_MODE) {
            tracing::warn!(path = %existing.path, %err, "cannot clear read-only flag");
        }
    }

    /// Report how the run ended and build the final report
    fn finish(mut self, result: Result<(), Halt>) -> RunReport {
        let outcome = match result {
            Ok(()) => Outcome::Completed,
            Err(Halt::TargetNotSpecified) => {
                let err = BackupError::TargetNotSpecified;
                tracing::error!(%err, "fatal");
                self.emit(&format!("FATAL: {}", err));
                Outcome::TargetNotSpecified
            }
            Err(Halt::TooManyErrors) => {
                self.emit("Quitting due to too many errors!");
                Outcome::TooManyErrors
            }
            Err(Halt::Output(err)) => {
                tracing::error!(%err, "output failed, backup interrupted");
                Outcome::Interrupted(err.to_string())
            }
        };

        if !self.errors.is_empty() {
            let block = format_error_block(self.errors.messages());
            self.emit(&block);
        }

        RunReport {
            dry_run: self.config.dry_run,
            sources: self.sources,
            errors: self.errors.into_messages(),
            outcome,
        }
    }

    /// Write a line, logging instead of failing if the sink is broken
    fn emit(&mut self, text: &str) {
        if let Err(err) = writeln!(self.out, "{}", text) {
            tracing::error!(%err, "cannot write to output");
        }
    }
}

impl<W: Write + ?Sized> SourceVisitor for Session<'_, W> {
    fn excludes(&self) -> &ExcludeSet {
        &self.filters.exclude
    }

    fn enter_dir(&mut self, _dir: &FileEntry) {
        self.counts.dirs += 1;
    }

    fn visit_file(&mut self, file: FileEntry) -> Result<(), Halt> {
        self.sync_and_count(file)
    }

    fn walk_error(&mut self, err: BackupError) -> Result<(), Halt> {
        self.errors.record(format!("Cannot read {}", err))
    }
}

fn skip(src: &FileEntry, reason: SkipReason) -> FileOutcome {
    tracing::debug!(path = %src.path, %reason, "skipped");
    FileOutcome::Skipped(reason)
}
