//! Filter set: age and size thresholds plus exclude pattern snapshots
//!
//! Exclude patterns are regular expressions matched anywhere in a full path.
//! Each `!` or `!+` directive produces a new [`ExcludeSet`]; a set is never
//! mutated in place once built.

use chrono::{DateTime, Local, NaiveTime, TimeDelta};
use regex::Regex;
use std::sync::Arc;
use std::time::SystemTime;

/// Delimiter between patterns in one exclude directive
pub const PATTERN_DELIMITER: &str = ",,";

/// Immutable snapshot of active exclude patterns
#[derive(Debug, Clone, Default)]
pub struct ExcludeSet {
    patterns: Arc<[Regex]>,
}

impl ExcludeSet {
    pub fn new(patterns: Vec<Regex>) -> Self {
        Self {
            patterns: patterns.into(),
        }
    }

    /// New snapshot holding the current patterns followed by `more`
    pub fn extended(&self, more: Vec<Regex>) -> Self {
        let mut patterns: Vec<Regex> = self.patterns.to_vec();
        patterns.extend(more);
        Self::new(patterns)
    }

    /// Check if any pattern matches `path`
    pub fn matches(&self, path: &str) -> bool {
        self.patterns.iter().any(|rex| rex.is_match(path))
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Source text of each pattern, in order
    pub fn sources(&self) -> Vec<&str> {
        self.patterns.iter().map(Regex::as_str).collect()
    }
}

/// Outcome of parsing one exclude directive argument
#[derive(Debug, Default)]
pub struct ParsedPatterns {
    pub patterns: Vec<Regex>,
    /// Pieces that failed to compile
    pub invalid: Vec<String>,
}

/// Split an exclude argument on `,,` and compile each non-empty piece
///
/// An empty or all-whitespace argument yields no patterns; applied as a
/// replacement this clears every active exclusion.
pub fn parse_patterns(arg: &str) -> ParsedPatterns {
    let mut parsed = ParsedPatterns::default();
    let arg = arg.trim();
    if arg.is_empty() {
        return parsed;
    }

    for piece in arg.split(PATTERN_DELIMITER).filter(|p| !p.is_empty()) {
        match Regex::new(piece) {
            Ok(rex) => parsed.patterns.push(rex),
            Err(_) => parsed.invalid.push(piece.to_string()),
        }
    }
    parsed
}

/// Local midnight of the day `days` days before `now`
///
/// Returns `None` when the offset does not fit in the calendar.
pub fn midnight_days_ago(days: i64, now: DateTime<Local>) -> Option<DateTime<Local>> {
    let shifted = now.checked_sub_signed(TimeDelta::try_days(days)?)?;
    let midnight = shifted.date_naive().and_time(NaiveTime::MIN);
    // A DST gap can swallow midnight; fall back to the unaligned instant.
    Some(
        midnight
            .and_local_timezone(Local)
            .earliest()
            .unwrap_or(shifted),
    )
}

/// Active filters for the files of the current target section
#[derive(Debug, Clone, Default)]
pub struct FilterSet {
    /// Files modified strictly before this are ineligible; `None` = no limit
    pub start_date: Option<SystemTime>,
    /// Files strictly larger than this are ineligible; `None` = unbounded
    pub max_size: Option<u64>,
    pub exclude: ExcludeSet,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a max-age threshold of `days` relative to `now`
    ///
    /// Returns the resulting start date, or `None` (and keeps the previous
    /// threshold) if the offset is out of range.
    pub fn set_max_age(&mut self, days: i64, now: DateTime<Local>) -> Option<DateTime<Local>> {
        let start = midnight_days_ago(days, now)?;
        self.start_date = Some(start.into());
        Some(start)
    }

    pub fn set_max_size(&mut self, bytes: u64) {
        self.max_size = Some(bytes);
    }

    /// Replace the exclude snapshot
    pub fn replace_excludes(&mut self, patterns: Vec<Regex>) {
        self.exclude = ExcludeSet::new(patterns);
    }

    /// Append to the exclude snapshot
    pub fn extend_excludes(&mut self, patterns: Vec<Regex>) {
        self.exclude = self.exclude.extended(patterns);
    }

    pub fn is_too_large(&self, size: u64) -> bool {
        self.max_size.is_some_and(|max| size > max)
    }

    pub fn is_too_old(&self, mtime: SystemTime) -> bool {
        self.start_date.is_some_and(|start| mtime < start)
    }

    pub fn is_excluded(&self, path: &str) -> bool {
        self.exclude.matches(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone, Timelike};
    use std::time::Duration;

    const DAY: u64 = 24 * 60 * 60;

    fn patterns(arg: &str) -> Vec<Regex> {
        parse_patterns(arg).patterns
    }

    #[test]
    fn test_parse_patterns_splits_on_double_comma() {
        let parsed = parse_patterns(r"f5,,/d6/");
        assert_eq!(parsed.patterns.len(), 2);
        assert_eq!(parsed.patterns[0].as_str(), "f5");
        assert_eq!(parsed.patterns[1].as_str(), "/d6/");
        assert!(parsed.invalid.is_empty());
    }

    #[test]
    fn test_parse_patterns_keeps_single_commas() {
        let parsed = parse_patterns(r"a{1,2}b");
        assert_eq!(parsed.patterns.len(), 1);
        assert!(parsed.patterns[0].is_match("aab"));
    }

    #[test]
    fn test_parse_patterns_skips_empty_and_reports_invalid() {
        let parsed = parse_patterns("(notclosed,,");
        assert!(parsed.patterns.is_empty());
        assert_eq!(parsed.invalid, vec!["(notclosed".to_string()]);
    }

    #[test]
    fn test_parse_patterns_blank_argument_is_empty() {
        assert!(parse_patterns("").patterns.is_empty());
        assert!(parse_patterns("   \t ").patterns.is_empty());
        assert!(parse_patterns("").invalid.is_empty());
    }

    #[test]
    fn test_replace_then_extend_keeps_both() {
        let mut filters = FilterSet::new();
        filters.replace_excludes(patterns(r"\.log$"));
        filters.extend_excludes(patterns(r"\.tmp$"));

        assert_eq!(filters.exclude.sources(), vec![r"\.log$", r"\.tmp$"]);
        assert!(filters.is_excluded("/a/b.log"));
        assert!(filters.is_excluded("/a/b.tmp"));
        assert!(!filters.is_excluded("/a/b.txt"));
    }

    #[test]
    fn test_second_replace_drops_earlier_patterns() {
        let mut filters = FilterSet::new();
        filters.replace_excludes(patterns(r"\.log$"));
        filters.replace_excludes(patterns(r"\.tmp$"));

        assert_eq!(filters.exclude.sources(), vec![r"\.tmp$"]);
        assert!(!filters.is_excluded("/a/b.log"));
    }

    #[test]
    fn test_empty_replace_clears_patterns() {
        let mut filters = FilterSet::new();
        filters.replace_excludes(patterns(r"\.log$"));
        filters.replace_excludes(patterns(" "));
        assert!(filters.exclude.is_empty());
    }

    #[test]
    fn test_extend_does_not_touch_previous_snapshot() {
        let base = ExcludeSet::new(patterns("a"));
        let extended = base.extended(patterns("b"));
        assert_eq!(base.len(), 1);
        assert_eq!(extended.len(), 2);
    }

    #[test]
    fn test_max_size_is_strictly_greater() {
        let mut filters = FilterSet::new();
        assert!(!filters.is_too_large(u64::MAX));

        filters.set_max_size(150);
        assert!(filters.is_too_large(200));
        assert!(!filters.is_too_large(150));
        assert!(!filters.is_too_large(100));
    }

    #[test]
    fn test_midnight_days_ago_is_aligned() {
        let now = Local.with_ymd_and_hms(2024, 3, 21, 15, 30, 0).unwrap();
        let start = midnight_days_ago(20, now).expect("in range");

        assert_eq!((start.year(), start.month(), start.day()), (2024, 3, 1));
        assert_eq!((start.hour(), start.minute(), start.second()), (0, 0, 0));
    }

    #[test]
    fn test_midnight_days_ago_out_of_range() {
        assert!(midnight_days_ago(i64::MAX, Local::now()).is_none());
    }

    #[test]
    fn test_max_age_filters_older_files() {
        let now = Local::now();
        let mut filters = FilterSet::new();
        assert!(!filters.is_too_old(SystemTime::UNIX_EPOCH));

        filters.set_max_age(20, now).expect("in range");
        let now: SystemTime = now.into();
        assert!(filters.is_too_old(now - Duration::from_secs(30 * DAY)));
        assert!(!filters.is_too_old(now - Duration::from_secs(10 * DAY)));
    }

    #[test]
    fn test_failed_max_age_keeps_previous_threshold() {
        let mut filters = FilterSet::new();
        filters.set_max_age(5, Local::now()).expect("in range");
        let before = filters.start_date;

        assert!(filters.set_max_age(i64::MAX, Local::now()).is_none());
        assert_eq!(filters.start_date, before);
    }
}
