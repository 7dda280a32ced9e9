//! Source directory traversal

mod walker;

pub use walker::{walk_source, SourceVisitor};
