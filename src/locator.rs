//! Record Locator
//!
//! Fetches candidate records from the directory, normalizes them and
//! ranks them against the typed name. The locator never picks a record
//! itself; the caller presents the ranked list for manual selection.

use crate::api::AlumniDirectory;
use crate::core::{filter_by_year, normalize_records, CandidateRecord};
use crate::error::{TraceError, TraceResult};
use crate::utils::fuzzy::{rank_with, ScoringConfig};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const EMPTY_QUERY_MESSAGE: &str = "Please enter a name or year to search";
pub const NO_MATCHES_MESSAGE: &str = "No matching alumni found. Try adjusting spelling or year.";
pub const SEARCH_FAILED_MESSAGE: &str = "Search failed. Please try again later.";

/// How a search ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeKind {
    Matches,
    NoMatches,
    /// The directory could not be reached or answered garbage
    Failed,
}

/// Result of one locator search
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub kind: OutcomeKind,
    /// Ranked records, best first
    pub results: Vec<CandidateRecord>,
    /// Short status line, e.g. "3 matches"
    pub status: String,
    /// Explanation to show when there is nothing to pick from
    pub message: Option<String>,
}

impl SearchOutcome {
    fn from_results(results: Vec<CandidateRecord>) -> Self {
        if results.is_empty() {
            return Self {
                kind: OutcomeKind::NoMatches,
                results,
                status: "No matches".to_string(),
                message: Some(NO_MATCHES_MESSAGE.to_string()),
            };
        }

        let status = if results.len() == 1 {
            "1 match".to_string()
        } else {
            format!("{} matches", results.len())
        };
        Self {
            kind: OutcomeKind::Matches,
            results,
            status,
            message: None,
        }
    }

    fn failed() -> Self {
        Self {
            kind: OutcomeKind::Failed,
            results: Vec::new(),
            status: "Search error".to_string(),
            message: Some(SEARCH_FAILED_MESSAGE.to_string()),
        }
    }
}

/// Searches the directory and ranks what comes back
pub struct RecordLocator {
    directory: Arc<dyn AlumniDirectory>,
    scoring: ScoringConfig,
}

impl RecordLocator {
    pub fn new(directory: Arc<dyn AlumniDirectory>, scoring: ScoringConfig) -> Self {
        Self { directory, scoring }
    }

    /// Run one search.
    ///
    /// Errors only when both inputs are blank; directory failures are
    /// reported through [`OutcomeKind::Failed`].
    pub async fn search(&self, name: &str, year: &str) -> TraceResult<SearchOutcome> {
        let name = name.trim();
        let year = year.trim();
        if name.is_empty() && year.is_empty() {
            return Err(TraceError::Validation(EMPTY_QUERY_MESSAGE.to_string()));
        }

        info!("🔍 Searching alumni: name='{}' year='{}'", name, year);
        let raw = match self.directory.search(name, year).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("❌ Alumni search failed: {}", e);
                return Ok(SearchOutcome::failed());
            }
        };

        let records = normalize_records(&raw);
        debug!("{} raw entries, {} with a usable name", raw.len(), records.len());

        let results = if name.is_empty() {
            // Year-only search: no name ranking, keep directory order
            filter_by_year(records, year)
        } else if self.scoring.year_weight > 0 {
            rank_with(&records, name, Some(year), &self.scoring)
        } else {
            let records = filter_by_year(records, year);
            rank_with(&records, name, None, &self.scoring)
        };

        let outcome = SearchOutcome::from_results(results);
        info!("   -> {}", outcome.status);
        Ok(outcome)
    }
}

/// Coalesces rapid-fire searches (one per keystroke) into the last one.
///
/// Every call takes a ticket; a call whose ticket is no longer the newest
/// when its delay ends, or when its search returns, yields `None`.
pub struct SearchDebouncer {
    locator: Arc<RecordLocator>,
    delay: Duration,
    generation: AtomicU64,
}

impl SearchDebouncer {
    pub fn new(locator: Arc<RecordLocator>, delay: Duration) -> Self {
        Self {
            locator,
            delay,
            generation: AtomicU64::new(0),
        }
    }

    fn take_ticket(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, ticket: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket
    }

    /// Search after the debounce delay unless superseded
    pub async fn schedule(&self, name: &str, year: &str) -> Option<TraceResult<SearchOutcome>> {
        let ticket = self.take_ticket();
        tokio::time::sleep(self.delay).await;
        if !self.is_current(ticket) {
            debug!("Search #{} superseded before it ran", ticket);
            return None;
        }
        self.run(ticket, name, year).await
    }

    /// Search immediately, still superseding anything pending
    pub async fn search_now(&self, name: &str, year: &str) -> Option<TraceResult<SearchOutcome>> {
        let ticket = self.take_ticket();
        self.run(ticket, name, year).await
    }

    async fn run(&self, ticket: u64, name: &str, year: &str) -> Option<TraceResult<SearchOutcome>> {
        let result = self.locator.search(name, year).await;
        if !self.is_current(ticket) {
            debug!("Discarding stale results of search #{}", ticket);
            return None;
        }
        Some(result)
    }
}
