//! Claim Flow
//!
//! Walks a user from a picked search result to a claimed account:
//! confirm the record is theirs, verify program and year, choose
//! credentials, then sign in automatically when the service allows it.

use crate::api::{AccountService, UserRole};
use crate::core::{CandidateRecord, Verification};
use crate::error::{TraceError, TraceResult};
use crate::session::{Session, SessionManager};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const SELECT_FIRST: &str = "Please select your record first";
pub const USERNAME_REQUIRED: &str = "Please enter a username";
pub const PASSWORD_REQUIRED: &str = "Please enter a password";
pub const PASSWORD_MISMATCH: &str = "Passwords do not match";
pub const VERIFY_INCOMPLETE: &str = "Both program/course and year are required for verification.";
pub const VERIFY_FAILED: &str =
    "Verification failed. The program/course or year did not match our records.";

/// Where the flow currently is
#[derive(Debug, Clone, PartialEq)]
pub enum ClaimStep {
    Idle,
    /// "Is this you?"
    Confirming(CandidateRecord),
    Verifying(CandidateRecord),
    /// Identity verified, waiting for username and password
    Creating(CandidateRecord),
}

/// Answer to the "is this you?" question
#[derive(Debug, Clone, PartialEq)]
pub enum ConfirmOutcome {
    /// Continue with identity verification
    Verify,
    /// Credentials already exist; the user should log in instead
    AccountExists,
    Cancelled,
}

/// How a successful claim ended
#[derive(Debug, Clone, PartialEq)]
pub enum ClaimOutcome {
    /// Credentials saved and the user is now signed in
    SignedIn(Session),
    /// Credentials saved but automatic login failed
    LoginRequired { prefill_username: String },
}

/// State machine for claiming an alumni record
pub struct ClaimFlow {
    accounts: Arc<dyn AccountService>,
    sessions: Arc<SessionManager>,
    step: ClaimStep,
}

impl ClaimFlow {
    pub fn new(accounts: Arc<dyn AccountService>, sessions: Arc<SessionManager>) -> Self {
        Self {
            accounts,
            sessions,
            step: ClaimStep::Idle,
        }
    }

    pub fn step(&self) -> &ClaimStep {
        &self.step
    }

    /// Record currently being claimed, if any
    pub fn selected(&self) -> Option<&CandidateRecord> {
        match &self.step {
            ClaimStep::Idle => None,
            ClaimStep::Confirming(r) | ClaimStep::Verifying(r) | ClaimStep::Creating(r) => Some(r),
        }
    }

    /// Start claiming a record picked from the search results
    pub fn select(&mut self, record: CandidateRecord) {
        debug!("Claim: confirming {}", record.full_name);
        self.step = ClaimStep::Confirming(record);
    }

    pub fn confirm(&mut self, is_me: bool) -> TraceResult<ConfirmOutcome> {
        let ClaimStep::Confirming(record) = &self.step else {
            return Err(self.out_of_order("confirm"));
        };

        if !is_me {
            self.step = ClaimStep::Idle;
            return Ok(ConfirmOutcome::Cancelled);
        }
        if record.has_credentials() {
            info!("🔒 {} already has an account", record.full_name);
            self.step = ClaimStep::Idle;
            return Ok(ConfirmOutcome::AccountExists);
        }

        self.step = ClaimStep::Verifying(record.clone());
        Ok(ConfirmOutcome::Verify)
    }

    /// Check program/course and graduation year against the record
    pub fn verify(&mut self, course: &str, year: &str) -> TraceResult<()> {
        let ClaimStep::Verifying(record) = &self.step else {
            return Err(self.out_of_order("verify"));
        };

        match record.verify_identity(course, year) {
            Verification::Verified => {
                info!("✅ Verification successful for {}", record.full_name);
                self.step = ClaimStep::Creating(record.clone());
                Ok(())
            }
            Verification::Incomplete => Err(TraceError::Validation(VERIFY_INCOMPLETE.to_string())),
            Verification::Mismatch => {
                warn!("Verification failed for {}", record.full_name);
                Err(TraceError::Validation(VERIFY_FAILED.to_string()))
            }
        }
    }

    /// Save credentials on the record, then try to sign in with them
    pub async fn submit(
        &mut self,
        username: &str,
        password: &str,
        confirm: &str,
    ) -> TraceResult<ClaimOutcome> {
        let record = match &self.step {
            ClaimStep::Creating(record) => record.clone(),
            ClaimStep::Idle => return Err(TraceError::Validation(SELECT_FIRST.to_string())),
            _ => return Err(self.out_of_order("submit")),
        };

        let username = username.trim();
        if username.is_empty() {
            return Err(TraceError::Validation(USERNAME_REQUIRED.to_string()));
        }
        if password.is_empty() {
            return Err(TraceError::Validation(PASSWORD_REQUIRED.to_string()));
        }
        if password != confirm {
            return Err(TraceError::Validation(PASSWORD_MISMATCH.to_string()));
        }
        let Some(record_id) = record.id.as_deref() else {
            return Err(TraceError::Flow(format!(
                "record for {} has no identifier",
                record.full_name
            )));
        };

        self.accounts.claim(record_id, username, password).await?;
        self.step = ClaimStep::Idle;
        info!("🎓 Account created for {}", record.full_name);

        match self.accounts.login(username, password, UserRole::Alumni).await {
            Ok(profile) => {
                let session = Session::from_login(profile, UserRole::Alumni, Utc::now());
                self.sessions.sign_in(session.clone()).await?;
                Ok(ClaimOutcome::SignedIn(session))
            }
            Err(e) => {
                warn!("Automatic login after claim failed: {}", e);
                Ok(ClaimOutcome::LoginRequired {
                    prefill_username: username.to_string(),
                })
            }
        }
    }

    /// Abandon the flow at any step
    pub fn cancel(&mut self) {
        self.step = ClaimStep::Idle;
    }

    fn out_of_order(&self, action: &str) -> TraceError {
        TraceError::Flow(format!("cannot {} while {}", action, step_name(&self.step)))
    }
}

fn step_name(step: &ClaimStep) -> &'static str {
    match step {
        ClaimStep::Idle => "idle",
        ClaimStep::Confirming(_) => "confirming",
        ClaimStep::Verifying(_) => "verifying",
        ClaimStep::Creating(_) => "creating credentials",
    }
}
