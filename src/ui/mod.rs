//! Output text for the backup sink

pub mod progress;

pub use progress::{format_error_block, format_since, format_summary, ProgressDots};
