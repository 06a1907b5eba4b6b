//! Login
//!
//! Signs a user in for a chosen role. Program heads must be approved
//! before they get a session, and first-time alumni are held back until
//! they answer the privacy notice (see [`crate::consent`]).

use crate::api::{AccountService, UserRole};
use crate::error::{TraceError, TraceResult};
use crate::session::{Session, SessionManager};
use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

pub const CREDENTIALS_REQUIRED: &str = "Please enter your username and password";
pub const INVALID_LOGIN: &str = "Invalid username or password.";
pub const UNREACHABLE: &str = "Unable to authenticate. Check the server or your network.";
pub const PENDING_APPROVAL: &str =
    "Your account is pending approval by an administrator. You will be able to login once approved.";
pub const REJECTED: &str = "Your account has been rejected. Contact an administrator for details.";

/// Where a successful login leaves the user
#[derive(Debug, Clone, PartialEq)]
pub enum LoginOutcome {
    /// Session stored and published
    SignedIn(Session),
    /// First alumni login; nothing stored until consent is recorded
    ConsentRequired(Session),
}

/// Approval state of a program head account
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Approval {
    Approved,
    Pending,
    Rejected,
}

impl Approval {
    /// Interpret whatever flag the server sent. A missing flag means pending.
    pub fn from_flag(flag: Option<&Value>) -> Self {
        let Some(flag) = flag else {
            return Approval::Pending;
        };

        let approved = match flag {
            Value::Bool(b) => *b,
            Value::Number(n) => n.as_f64() == Some(1.0),
            Value::String(s) => matches!(
                s.trim().to_lowercase().as_str(),
                "approved" | "true" | "1" | "yes"
            ),
            _ => false,
        };

        if approved {
            Approval::Approved
        } else if flag
            .as_str()
            .is_some_and(|s| s.to_lowercase().contains("reject"))
        {
            Approval::Rejected
        } else {
            Approval::Pending
        }
    }
}

pub struct LoginFlow {
    accounts: Arc<dyn AccountService>,
    sessions: Arc<SessionManager>,
}

impl LoginFlow {
    pub fn new(accounts: Arc<dyn AccountService>, sessions: Arc<SessionManager>) -> Self {
        Self { accounts, sessions }
    }

    pub async fn login(
        &self,
        username: &str,
        password: &str,
        role: UserRole,
    ) -> TraceResult<LoginOutcome> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(TraceError::Validation(CREDENTIALS_REQUIRED.to_string()));
        }

        info!("🔐 Logging in {} as {}", username, role);
        let profile = self
            .accounts
            .login(username, password, role)
            .await
            .map_err(friendlier_login_error)?;

        let session = Session::from_login(profile, role, Utc::now());

        if session.role == UserRole::ProgramHead {
            match Approval::from_flag(session.profile.approval_status()) {
                Approval::Approved => {}
                Approval::Pending => {
                    warn!("Program head {} is not approved yet", username);
                    return Err(TraceError::Validation(PENDING_APPROVAL.to_string()));
                }
                Approval::Rejected => {
                    warn!("Program head {} was rejected", username);
                    return Err(TraceError::Validation(REJECTED.to_string()));
                }
            }
        }

        if session.needs_consent() {
            info!("📜 First login for {}, consent required", username);
            return Ok(LoginOutcome::ConsentRequired(session));
        }

        self.sessions.sign_in(session.clone()).await?;
        Ok(LoginOutcome::SignedIn(session))
    }
}

fn friendlier_login_error(err: TraceError) -> TraceError {
    match err {
        TraceError::Api { status, message } if message == "Invalid credentials" => {
            TraceError::Api {
                status,
                message: INVALID_LOGIN.to_string(),
            }
        }
        e if e.is_transport() => TraceError::Network(UNREACHABLE.to_string()),
        e => e,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_approval_flags() {
        assert_eq!(Approval::from_flag(Some(&json!(true))), Approval::Approved);
        assert_eq!(Approval::from_flag(Some(&json!(1))), Approval::Approved);
        assert_eq!(Approval::from_flag(Some(&json!(" Approved "))), Approval::Approved);
        assert_eq!(Approval::from_flag(Some(&json!("yes"))), Approval::Approved);
        assert_eq!(Approval::from_flag(Some(&json!(false))), Approval::Pending);
        assert_eq!(Approval::from_flag(Some(&json!(0))), Approval::Pending);
        assert_eq!(Approval::from_flag(Some(&json!("pending"))), Approval::Pending);
        assert_eq!(Approval::from_flag(Some(&json!("Rejected"))), Approval::Rejected);
        assert_eq!(Approval::from_flag(None), Approval::Pending);
    }

    #[test]
    fn test_invalid_credentials_rewritten() {
        let err = friendlier_login_error(TraceError::Api {
            status: 401,
            message: "Invalid credentials".to_string(),
        });
        assert_eq!(err.user_message(), INVALID_LOGIN);

        let err = friendlier_login_error(TraceError::Network("refused".to_string()));
        assert_eq!(err.user_message(), format!("Network error: {}", UNREACHABLE));

        let err = friendlier_login_error(TraceError::Api {
            status: 500,
            message: "boom".to_string(),
        });
        assert_eq!(err.user_message(), "boom");
    }
}
