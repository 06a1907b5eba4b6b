pub mod mock_accounts;
pub mod mock_directory;

use alumtrace::core::CandidateRecord;
use serde_json::{json, Value};

/// A small directory: two unclaimed records, one claimed, one unusable
pub fn sample_directory() -> Vec<Value> {
    vec![
        json!({ "id": 11, "full_name": "Juan Dela Cruz", "program_course": "BS Computer Science", "year_graduated": "2019" }),
        json!({ "pk": 12, "name": "Juana Cruz", "program": "BS Nursing", "year": 2020 }),
        json!({ "alumni_id": "A-13", "full_name": "Maria Santos", "course_program": "BS Accountancy", "graduation_year": "2020", "username": "msantos" }),
        json!({ "id": 14, "first_name": "Nameless" }),
    ]
}

pub fn record(raw: Value) -> CandidateRecord {
    CandidateRecord::from_raw(&raw).expect("usable record")
}
