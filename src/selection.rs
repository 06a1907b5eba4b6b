//! Selection Handler
//!
//! Pages through ranked search results and lets the user pick one by
//! number. Nothing is ever selected automatically.

use crate::core::CandidateRecord;
use tracing::{debug, info};

/// Default number of records shown per page
pub const ITEMS_PER_PAGE: usize = 5;

/// Result of a selection command
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionResult {
    /// User picked a record (0-based index into the full list)
    Selected(CandidateRecord, usize),
    NextPage,
    PreviousPage,
    Cancelled,
    /// Already at the edge; show the current page again
    ShowOptions,
    NotRecognized,
}

/// State of the selection handler
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionState {
    Inactive,
    Active,
}

/// Pages through candidate records and interprets typed commands
#[derive(Debug)]
pub struct SelectionHandler {
    items: Vec<CandidateRecord>,
    page: usize,
    page_size: usize,
    state: SelectionState,
}

impl Default for SelectionHandler {
    fn default() -> Self {
        Self::new(ITEMS_PER_PAGE)
    }
}

impl SelectionHandler {
    pub fn new(page_size: usize) -> Self {
        Self {
            items: Vec::new(),
            page: 0,
            page_size: page_size.max(1),
            state: SelectionState::Inactive,
        }
    }

    /// Set items for selection and activate
    pub fn set_items(&mut self, items: Vec<CandidateRecord>) {
        info!("📋 Selection started: {} records", items.len());
        self.items = items;
        self.page = 0;
        self.state = if self.items.is_empty() {
            SelectionState::Inactive
        } else {
            SelectionState::Active
        };
    }

    pub fn is_active(&self) -> bool {
        self.state == SelectionState::Active
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn total_pages(&self) -> usize {
        if self.items.is_empty() {
            0
        } else {
            (self.items.len() - 1) / self.page_size + 1
        }
    }

    pub fn current_page_items(&self) -> &[CandidateRecord] {
        let start = (self.page * self.page_size).min(self.items.len());
        let end = std::cmp::min(start + self.page_size, self.items.len());
        &self.items[start..end]
    }

    /// Lines describing the current page, numbered across the whole list.
    ///
    /// Program and year stay hidden; only the name and whether an account
    /// already exists are shown.
    pub fn page_lines(&self) -> Vec<String> {
        if self.items.is_empty() {
            return vec!["No records to select from.".to_string()];
        }

        let start_idx = self.page * self.page_size;
        let mut lines = Vec::new();
        if self.total_pages() > 1 {
            lines.push(format!(
                "Page {} of {} ({} matches)",
                self.page + 1,
                self.total_pages(),
                self.items.len()
            ));
        }

        for (i, record) in self.current_page_items().iter().enumerate() {
            let badge = if record.has_credentials() {
                "Has account"
            } else {
                "No account"
            };
            lines.push(format!("{:>3}. {} [{}]", start_idx + i + 1, record.full_name, badge));
        }

        if start_idx + self.current_page_items().len() < self.items.len() {
            lines.push("Type 'next' for more.".to_string());
        }
        lines
    }

    /// Handle one typed command: a number, next, previous or cancel
    pub fn handle_command(&mut self, text: &str) -> SelectionResult {
        if !self.is_active() {
            return SelectionResult::NotRecognized;
        }

        let text = text.trim().to_lowercase();

        if matches!(text.as_str(), "n" | "next" | "more") {
            if self.page + 1 < self.total_pages() {
                self.page += 1;
                debug!("Selection: next page -> {}", self.page + 1);
                return SelectionResult::NextPage;
            }
            return SelectionResult::ShowOptions;
        }

        if matches!(text.as_str(), "p" | "prev" | "previous" | "back") {
            if self.page > 0 {
                self.page -= 1;
                debug!("Selection: previous page -> {}", self.page + 1);
                return SelectionResult::PreviousPage;
            }
            return SelectionResult::ShowOptions;
        }

        if matches!(text.as_str(), "q" | "quit" | "cancel" | "exit") {
            debug!("Selection: cancelled");
            self.clear();
            return SelectionResult::Cancelled;
        }

        if let Ok(number) = text.parse::<usize>() {
            if (1..=self.items.len()).contains(&number) {
                let idx = number - 1;
                let selected = self.items[idx].clone();
                info!("📌 Selected: {} (index {})", selected.full_name, idx);
                self.clear();
                return SelectionResult::Selected(selected, idx);
            }
        }

        SelectionResult::NotRecognized
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.page = 0;
        self.state = SelectionState::Inactive;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn make_record(name: &str) -> CandidateRecord {
        CandidateRecord::from_raw(&json!({ "id": name, "full_name": name })).expect("record")
    }

    #[test]
    fn test_selection_flow() {
        let mut handler = SelectionHandler::default();
        assert!(!handler.is_active());

        handler.set_items(vec![make_record("Juan Dela Cruz"), make_record("Juana Cruz")]);
        assert!(handler.is_active());

        match handler.handle_command("2") {
            SelectionResult::Selected(record, idx) => {
                assert_eq!(record.full_name, "Juana Cruz");
                assert_eq!(idx, 1);
            }
            other => panic!("Expected Selected, got {:?}", other),
        }
        assert!(!handler.is_active());
    }

    #[test]
    fn test_pagination() {
        let mut handler = SelectionHandler::default();
        let items = (1..=12).map(|i| make_record(&format!("Alumnus {}", i))).collect();
        handler.set_items(items);
        assert_eq!(handler.total_pages(), 3);
        assert_eq!(handler.current_page_items().len(), 5);

        assert_eq!(handler.handle_command("next"), SelectionResult::NextPage);
        assert_eq!(handler.page(), 1);
        assert_eq!(handler.handle_command("next"), SelectionResult::NextPage);
        assert_eq!(handler.current_page_items().len(), 2);
        assert_eq!(handler.handle_command("next"), SelectionResult::ShowOptions);

        assert_eq!(handler.handle_command("previous"), SelectionResult::PreviousPage);
        assert_eq!(handler.page(), 1);
    }

    #[test]
    fn test_numbers_span_pages() {
        let mut handler = SelectionHandler::new(2);
        handler.set_items((1..=5).map(|i| make_record(&format!("R{}", i))).collect());
        handler.handle_command("next");
        let lines = handler.page_lines();
        assert!(lines.iter().any(|l| l.contains("3. R3")));
        assert!(matches!(handler.handle_command("5"), SelectionResult::Selected(_, 4)));
    }

    #[test]
    fn test_out_of_range_and_garbage() {
        let mut handler = SelectionHandler::default();
        handler.set_items(vec![make_record("Only")]);
        assert_eq!(handler.handle_command("0"), SelectionResult::NotRecognized);
        assert_eq!(handler.handle_command("7"), SelectionResult::NotRecognized);
        assert_eq!(handler.handle_command("hello"), SelectionResult::NotRecognized);
        assert!(handler.is_active());
    }

    #[test]
    fn test_cancel() {
        let mut handler = SelectionHandler::default();
        handler.set_items(vec![make_record("Test")]);
        assert_eq!(handler.handle_command("cancel"), SelectionResult::Cancelled);
        assert!(!handler.is_active());
    }

    #[test]
    fn test_badges() {
        let mut handler = SelectionHandler::default();
        let claimed = CandidateRecord::from_raw(&json!({ "full_name": "Claimed", "username": "c" })).unwrap();
        handler.set_items(vec![claimed, make_record("Open")]);
        let lines = handler.page_lines();
        assert!(lines[0].contains("Claimed [Has account]"));
        assert!(lines[1].contains("Open [No account]"));
    }
}
