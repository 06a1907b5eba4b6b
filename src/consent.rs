//! Privacy Consent Gate
//!
//! A first-time alumni login is parked here until the user accepts or
//! declines the data privacy notice. Accepting records the decision and
//! completes the sign-in; declining records it and leaves nobody signed in.

use crate::api::AccountService;
use crate::error::{TraceError, TraceResult};
use crate::session::{Session, SessionManager};
use std::sync::Arc;
use tracing::{info, warn};

pub const CONSENT_DECLINED: &str = "You must accept the Data Privacy Consent to proceed.";
pub const CONSENT_FAILED: &str = "Failed to record consent. Please try again.";

pub const CONSENT_NOTICE: &str = "\
DATA PRIVACY CONSENT

Your alumni record holds personal information such as your name, program,
graduation year and contact details. It is used to keep the alumni
directory current and to reach you about school events and surveys.
It is not shared outside the institution without your permission.

Do you agree to the processing of your personal data for these purposes?";

#[derive(Debug, Clone, PartialEq)]
pub enum ConsentOutcome {
    Accepted(Session),
    /// Decision recorded; carries the message to show
    Declined(String),
}

pub struct ConsentGate {
    accounts: Arc<dyn AccountService>,
    sessions: Arc<SessionManager>,
}

impl ConsentGate {
    pub fn new(accounts: Arc<dyn AccountService>, sessions: Arc<SessionManager>) -> Self {
        Self { accounts, sessions }
    }

    /// Record the decision for a pending session
    pub async fn answer(&self, mut session: Session, accept: bool) -> TraceResult<ConsentOutcome> {
        let Some(user_id) = session.user_id.clone() else {
            return Err(TraceError::Flow(format!(
                "no user id for {}, cannot record consent",
                session.display_name()
            )));
        };

        self.accounts
            .record_consent(&user_id, accept)
            .await
            .map_err(|e| {
                warn!("❌ Consent not recorded for {}: {}", user_id, e);
                match e {
                    // Keep whatever the server said; fall back when it said nothing
                    TraceError::Api { status, message } if message.trim().is_empty() => {
                        TraceError::Api {
                            status,
                            message: CONSENT_FAILED.to_string(),
                        }
                    }
                    other => other,
                }
            })?;

        if !accept {
            info!("🚫 {} declined the privacy notice", session.display_name());
            return Ok(ConsentOutcome::Declined(CONSENT_DECLINED.to_string()));
        }

        info!("📜 Consent recorded for {}", session.display_name());
        session.consent_given = true;
        self.sessions.sign_in(session.clone()).await?;
        Ok(ConsentOutcome::Accepted(session))
    }
}
