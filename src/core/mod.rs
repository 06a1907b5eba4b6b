//! Core record handling
//!
//! Normalization of directory entries into candidate records, plus the
//! identity checks the claim flow runs against them.

pub mod record;

pub use record::{filter_by_year, normalize_records, CandidateRecord, Verification};
