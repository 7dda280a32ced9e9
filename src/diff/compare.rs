//! Per-file eligibility and freshness checks

use crate::filter::FilterSet;
use crate::types::{FileEntry, SkipReason};

/// Apply the cheap, metadata-only checks to a source file
///
/// Checks run in a fixed order, cheapest first, and the first hit wins:
/// symlink, size, age, exclude patterns.
pub fn check_filters(entry: &FileEntry, filters: &FilterSet) -> Option<SkipReason> {
    if entry.is_symlink {
        return Some(SkipReason::Symlink);
    }
    if filters.is_too_large(entry.size) {
        return Some(SkipReason::TooLarge);
    }
    if filters.is_too_old(entry.mtime) {
        return Some(SkipReason::TooOld);
    }
    if filters.is_excluded(entry.path.as_str()) {
        return Some(SkipReason::Excluded);
    }
    None
}

/// A destination is current when it is not older than the source
///
/// Only modification times are compared; sizes and content are ignored.
pub fn is_up_to_date(src: &FileEntry, dest: &FileEntry) -> bool {
    dest.mtime >= src.mtime
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::parse_patterns;
    use chrono::Local;
    use std::time::{Duration, SystemTime};

    const DAY: u64 = 24 * 60 * 60;

    fn aged(path: &str, days: u64, size: u64) -> FileEntry {
        FileEntry::new(
            path,
            size,
            SystemTime::now() - Duration::from_secs(days * DAY),
            0o644,
        )
    }

    fn filters() -> FilterSet {
        let mut filters = FilterSet::new();
        filters.set_max_age(20, Local::now()).expect("in range");
        filters.set_max_size(150);
        filters.replace_excludes(parse_patterns("f5,,/d6/").patterns);
        filters
    }

    #[test]
    fn test_eligible_file_passes() {
        assert_eq!(check_filters(&aged("/d5/f1", 10, 100), &filters()), None);
    }

    #[test]
    fn test_symlink_wins_over_everything() {
        let link = FileEntry::new_symlink("/d5/f5", SystemTime::UNIX_EPOCH);
        assert_eq!(check_filters(&link, &filters()), Some(SkipReason::Symlink));
        assert_eq!(
            check_filters(&link, &FilterSet::new()),
            Some(SkipReason::Symlink)
        );
    }

    #[test]
    fn test_size_checked_before_age() {
        assert_eq!(
            check_filters(&aged("/d3/f4", 30, 200), &filters()),
            Some(SkipReason::TooLarge)
        );
    }

    #[test]
    fn test_old_file_skipped() {
        assert_eq!(
            check_filters(&aged("/d3/f3", 30, 100), &filters()),
            Some(SkipReason::TooOld)
        );
    }

    #[test]
    fn test_excluded_file_skipped() {
        assert_eq!(
            check_filters(&aged("/d5/f5", 10, 100), &filters()),
            Some(SkipReason::Excluded)
        );
        assert_eq!(
            check_filters(&aged("/d5/d6/f1", 10, 100), &filters()),
            Some(SkipReason::Excluded)
        );
    }

    #[test]
    fn test_default_filters_accept_anything() {
        assert_eq!(
            check_filters(&aged("/x", 10_000, u64::MAX), &FilterSet::new()),
            None
        );
    }

    #[test]
    fn test_up_to_date_when_dest_not_older() {
        let src = aged("/a", 5, 10);
        let same = FileEntry { path: "/b/a".into(), ..src.clone() };
        let newer = aged("/b/a", 1, 10);
        let older = aged("/b/a", 6, 10);

        assert!(is_up_to_date(&src, &same));
        assert!(is_up_to_date(&src, &newer));
        assert!(!is_up_to_date(&src, &older));
    }
}
