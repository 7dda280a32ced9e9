//! Sync policy checks - eligibility, destination mapping, freshness

mod compare;
mod destination;

pub use compare::{check_filters, is_up_to_date};
pub use destination::{destination_path, dir_match_key};
