//! Fuzzy matching and ranking for alumni name search
//!
//! Scores each candidate against the query in tiers (exact, prefix,
//! substring, then edit distance) and returns the survivors best-first.
//! Edit distance is only computed for names that failed the cheap checks.

use crate::core::CandidateRecord;
use strsim::levenshtein;

pub const EXACT_SCORE: u32 = 500;
pub const PREFIX_SCORE: u32 = 300;
pub const SUBSTRING_SCORE: u32 = 150;

/// Lowest score an accepted fuzzy match can get
pub const FUZZY_FLOOR: u32 = 80;
/// Score of a (theoretical) zero-distance fuzzy match
pub const FUZZY_CEILING: f64 = 200.0;
/// Fraction of the longer string allowed to differ
pub const FUZZY_TOLERANCE: f64 = 0.35;
/// Queries this short never use the fuzzy fallback
pub const MIN_FUZZY_QUERY_LEN: usize = 2;

/// Tunable scoring knobs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoringConfig {
    /// Added to a name-matched candidate whose graduation year equals the
    /// requested year. 0 leaves year out of relevance entirely.
    pub year_weight: u32,
}

/// A candidate paired with its relevance score
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    pub record: CandidateRecord,
    pub score: u32,
}

/// Levenshtein distance between two strings, counted in chars.
///
/// Unit cost for insertion, deletion and substitution; a swap of two
/// adjacent chars costs 2. Case-sensitive, callers lowercase first.
pub fn edit_distance(a: &str, b: &str) -> usize {
    levenshtein(a, b)
}

/// Lowercase and trim text for comparison
pub fn normalize_query(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Score a normalized name against a normalized query.
///
/// Only the first matching tier counts. Returns 0 for no match,
/// including any empty query.
pub fn name_score(name: &str, query: &str) -> u32 {
    if query.is_empty() {
        return 0;
    }

    if name == query {
        return EXACT_SCORE;
    }
    if name.starts_with(query) {
        return PREFIX_SCORE;
    }
    if name.contains(query) {
        return SUBSTRING_SCORE;
    }

    let query_len = query.chars().count();
    if query_len <= MIN_FUZZY_QUERY_LEN || name.is_empty() {
        return 0;
    }

    let distance = edit_distance(name, query);
    let max_len = name.chars().count().max(query_len);
    let allowed = (max_len as f64 * FUZZY_TOLERANCE).floor() as usize;
    if distance > allowed {
        return 0;
    }

    let similarity = 1.0 - distance as f64 / max_len as f64;
    let score = (similarity * FUZZY_CEILING).floor() as u32;
    score.max(FUZZY_FLOOR)
}

/// Score, filter and order candidates, keeping the scores.
///
/// Output holds only positive scores, highest first; equal scores keep
/// their input order.
pub fn rank_scored(
    candidates: &[CandidateRecord],
    query: &str,
    year: Option<&str>,
    config: &ScoringConfig,
) -> Vec<ScoredCandidate> {
    let query = normalize_query(query);
    let year = year.map(str::trim).filter(|y| !y.is_empty());

    let mut scored: Vec<ScoredCandidate> = candidates
        .iter()
        .filter_map(|record| {
            let mut score = name_score(&normalize_query(&record.full_name), &query);
            if score == 0 {
                return None;
            }
            if let Some(year) = year {
                if config.year_weight > 0 && record.graduated_in(year) {
                    score = score.saturating_add(config.year_weight);
                }
            }
            Some(ScoredCandidate {
                record: record.clone(),
                score,
            })
        })
        .collect();

    // sort_by is stable
    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored
}

/// Rank candidates with default scoring. The year does not affect order
/// unless a year weight is configured via [`rank_with`].
pub fn rank(candidates: &[CandidateRecord], query: &str, year: Option<&str>) -> Vec<CandidateRecord> {
    rank_with(candidates, query, year, &ScoringConfig::default())
}

pub fn rank_with(
    candidates: &[CandidateRecord],
    query: &str,
    year: Option<&str>,
    config: &ScoringConfig,
) -> Vec<CandidateRecord> {
    rank_scored(candidates, query, year, config)
        .into_iter()
        .map(|s| s.record)
        .collect()
}

/// Substring suggestions for a free-text entry, in list order.
///
/// Used for program/course hints during identity verification.
pub fn suggest(options: &[String], input: &str, limit: usize) -> Vec<String> {
    let needle = normalize_query(input);
    if needle.is_empty() {
        return Vec::new();
    }
    options
        .iter()
        .filter(|o| o.to_lowercase().contains(&needle))
        .take(limit)
        .cloned()
        .collect()
}
