//! Candidate Records
//!
//! Normalizes the loosely-shaped alumni objects returned by the directory
//! service into one record type the locator and ranking engine can work with.

use serde::{Deserialize, Serialize};
use serde_json::Value;

const ID_KEYS: [&str; 3] = ["id", "pk", "alumni_id"];
const NAME_KEYS: [&str; 2] = ["full_name", "name"];
const COURSE_KEYS: [&str; 3] = ["program_course", "program", "course_program"];
const YEAR_KEYS: [&str; 4] = ["year_graduated", "year", "graduation_year", "yearGraduated"];

/// A normalized alumni entry used as search input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRecord {
    /// Directory identifier, rendered as a string
    pub id: Option<String>,
    /// Trimmed display name, never empty
    pub full_name: String,
    pub program_course: String,
    /// Trimmed, possibly empty
    pub year_graduated: String,
    /// The source object exactly as the service sent it
    pub raw: Value,
}

/// Outcome of checking program/course and year against a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    Verified,
    /// One or both answers were blank
    Incomplete,
    Mismatch,
}

impl CandidateRecord {
    /// Build a record from a raw directory object.
    ///
    /// Returns `None` when the object has no usable display name.
    pub fn from_raw(raw: &Value) -> Option<Self> {
        let full_name = first_field(raw, &NAME_KEYS)
            .map(|n| n.trim().to_string())
            .unwrap_or_default();
        if full_name.is_empty() {
            return None;
        }

        Some(Self {
            id: first_field(raw, &ID_KEYS),
            full_name,
            program_course: first_field(raw, &COURSE_KEYS).unwrap_or_default(),
            year_graduated: first_field(raw, &YEAR_KEYS)
                .map(|y| y.trim().to_string())
                .unwrap_or_default(),
            raw: raw.clone(),
        })
    }

    /// Whether login credentials are already on file for this record
    pub fn has_credentials(&self) -> bool {
        let non_empty = |key: &str| {
            self.raw
                .get(key)
                .and_then(Value::as_str)
                .is_some_and(|s| !s.is_empty())
        };
        non_empty("username")
            || non_empty("user_name")
            || non_empty("password")
            || self.raw.get("has_account").is_some_and(is_truthy)
    }

    /// Exact match of the graduation year against a trimmed query year
    pub fn graduated_in(&self, year: &str) -> bool {
        self.year_graduated == year.trim()
    }

    /// Check identity answers before credentials may be attached.
    ///
    /// The year must match exactly; the course matches when either string
    /// contains the other (case-insensitive).
    pub fn verify_identity(&self, course: &str, year: &str) -> Verification {
        let provided_course = course.trim().to_lowercase();
        let provided_year = year.trim();
        if provided_course.is_empty() || provided_year.is_empty() {
            return Verification::Incomplete;
        }

        let record_course = self.program_course.trim().to_lowercase();
        let year_matches = self.graduated_in(provided_year);
        let course_matches = !record_course.is_empty()
            && (record_course.contains(&provided_course)
                || provided_course.contains(&record_course));

        if year_matches && course_matches {
            Verification::Verified
        } else {
            Verification::Mismatch
        }
    }
}

/// Normalize a batch of raw objects, dropping entries without a name
pub fn normalize_records(raw: &[Value]) -> Vec<CandidateRecord> {
    raw.iter().filter_map(CandidateRecord::from_raw).collect()
}

/// Keep records whose graduation year equals `year` exactly.
///
/// A blank year keeps everything.
pub fn filter_by_year(records: Vec<CandidateRecord>, year: &str) -> Vec<CandidateRecord> {
    let year = year.trim();
    if year.is_empty() {
        return records;
    }
    records
        .into_iter()
        .filter(|r| r.graduated_in(year))
        .collect()
}

/// First non-null value among `keys`, rendered as a string
fn first_field(raw: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| raw.get(*k))
        .find(|v| !v.is_null())
        .and_then(scalar_to_string)
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
