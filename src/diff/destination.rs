//! Mapping of source paths into the target tree

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use std::path::MAIN_SEPARATOR;

/// Re-root `src` under `target`
///
/// The volume prefix (`C:`, `\\server\share`) is dropped and the rest of the
/// path is appended verbatim, so `/home/me/a.txt` under `/backup` becomes
/// `/backup/home/me/a.txt`. Relative sources are joined with a separator.
pub fn destination_path(target: &str, src: &Utf8Path) -> Utf8PathBuf {
    let rest = match src.components().next() {
        Some(Utf8Component::Prefix(prefix)) => &src.as_str()[prefix.as_str().len()..],
        _ => src.as_str(),
    };

    let mut dest = String::with_capacity(target.len() + rest.len() + 1);
    dest.push_str(target);
    if !rest.starts_with(std::path::is_separator) {
        dest.push(MAIN_SEPARATOR);
    }
    dest.push_str(rest);
    Utf8PathBuf::from(dest)
}

/// Directory path as tested against exclude patterns: with a trailing separator
pub fn dir_match_key(dir: &Utf8Path) -> String {
    let mut key = dir.as_str().to_owned();
    if !key.ends_with(std::path::is_separator) {
        key.push(MAIN_SEPARATOR);
    }
    key
}
