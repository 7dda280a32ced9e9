//! Directive classification
//!
//! Every configuration line is either a directive, which changes run state,
//! or a source path. Classification is pure; applying a directive is done by
//! the backup session.
//!
//! | Prefix | Directive           |
//! |--------|---------------------|
//! | `#`    | comment             |
//! | `=>`   | set target root     |
//! | `!@`   | max age in days     |
//! | `!>`   | max size in bytes   |
//! | `!+`   | extend excludes     |
//! | `!`    | replace excludes    |

use std::num::ParseIntError;

/// A configuration line that is not a source path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive<'a> {
    /// Blank line or comment
    Ignore,
    /// `=> <path>`, trailing separator already stripped
    Target(&'a str),
    /// `!@ <days>`, argument not yet validated
    MaxAge(&'a str),
    /// `!> <bytes>`, argument not yet validated
    MaxSize(&'a str),
    /// `!+ <patterns>`
    ExtendExclude(&'a str),
    /// `! <patterns>`
    Exclude(&'a str),
}

impl<'a> Directive<'a> {
    /// Classify one trimmed line; `None` means the line names a source
    pub fn parse(line: &'a str) -> Option<Self> {
        if line.is_empty() || line.starts_with('#') {
            return Some(Directive::Ignore);
        }

        if let Some(rest) = line.strip_prefix("=>") {
            return Some(Directive::Target(strip_separator(rest.trim_start())));
        }

        let rest = line.strip_prefix('!')?;
        let directive = if let Some(arg) = rest.strip_prefix('@') {
            Directive::MaxAge(arg.trim())
        } else if let Some(arg) = rest.strip_prefix('>') {
            Directive::MaxSize(arg.trim())
        } else if let Some(arg) = rest.strip_prefix('+') {
            Directive::ExtendExclude(arg.trim_start())
        } else {
            Directive::Exclude(rest.trim_start())
        };
        Some(directive)
    }
}

/// Drop one trailing path separator
fn strip_separator(path: &str) -> &str {
    path.strip_suffix(std::path::MAIN_SEPARATOR).unwrap_or(path)
}

/// Parse a `!@` argument
pub fn parse_days(arg: &str) -> Result<i64, ParseIntError> {
    arg.parse()
}

/// Parse a `!>` argument
pub fn parse_size(arg: &str) -> Result<u64, ParseIntError> {
    arg.parse()
}
