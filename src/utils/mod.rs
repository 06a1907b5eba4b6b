//! Utility modules

pub mod fuzzy;

pub use fuzzy::{
    edit_distance, name_score, normalize_query, rank, rank_scored, rank_with, suggest,
    ScoredCandidate, ScoringConfig,
};
