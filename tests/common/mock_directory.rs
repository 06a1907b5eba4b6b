//! Mock Alumni Directory for Testing
//!
//! Serves a fixed list of raw entries and records every query.

use alumtrace::api::AlumniDirectory;
use alumtrace::error::{TraceError, TraceResult};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::{Arc, Mutex};

#[derive(Debug)]
pub struct MockDirectory {
    pub entries: Vec<Value>,
    pub programs: Vec<String>,
    /// Every (name, year) pair searched for
    pub queries: Arc<Mutex<Vec<(String, String)>>>,
    /// Simulate the service being down
    pub should_fail: Arc<Mutex<bool>>,
}

impl MockDirectory {
    pub fn new(entries: Vec<Value>) -> Self {
        Self {
            entries,
            programs: Vec::new(),
            queries: Arc::new(Mutex::new(Vec::new())),
            should_fail: Arc::new(Mutex::new(false)),
        }
    }

    pub fn with_programs(mut self, programs: &[&str]) -> Self {
        self.programs = programs.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn get_queries(&self) -> Vec<(String, String)> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl AlumniDirectory for MockDirectory {
    async fn search(&self, name: &str, year: &str) -> TraceResult<Vec<Value>> {
        self.queries
            .lock()
            .unwrap()
            .push((name.to_string(), year.to_string()));
        if *self.should_fail.lock().unwrap() {
            return Err(TraceError::Network("Mock directory failure".to_string()));
        }
        Ok(self.entries.clone())
    }

    async fn programs(&self) -> TraceResult<Vec<String>> {
        Ok(self.programs.clone())
    }
}
