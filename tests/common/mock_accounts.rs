//! Mock Account Service for Testing
//!
//! Records claims, logins and consent decisions for verification.

use alumtrace::api::{AccountService, LoginResponse, UserRole};
use alumtrace::error::{TraceError, TraceResult};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

#[derive(Debug)]
pub struct MockAccounts {
    /// (record id, username, password)
    pub claims: Arc<Mutex<Vec<(String, String, String)>>>,
    /// (username, role)
    pub logins: Arc<Mutex<Vec<(String, UserRole)>>>,
    /// (user id, consent)
    pub consents: Arc<Mutex<Vec<(String, bool)>>>,
    /// Profile handed back by a successful login
    pub profile: Arc<Mutex<LoginResponse>>,
    pub fail_claim: Arc<Mutex<bool>>,
    pub fail_login: Arc<Mutex<bool>>,
    /// Error message the consent endpoint answers with, if set
    pub fail_consent: Arc<Mutex<Option<String>>>,
}

impl MockAccounts {
    pub fn new(profile: LoginResponse) -> Self {
        Self {
            claims: Arc::new(Mutex::new(Vec::new())),
            logins: Arc::new(Mutex::new(Vec::new())),
            consents: Arc::new(Mutex::new(Vec::new())),
            profile: Arc::new(Mutex::new(profile)),
            fail_claim: Arc::new(Mutex::new(false)),
            fail_login: Arc::new(Mutex::new(false)),
            fail_consent: Arc::new(Mutex::new(None)),
        }
    }

    pub fn get_claims(&self) -> Vec<(String, String, String)> {
        self.claims.lock().unwrap().clone()
    }

    pub fn get_logins(&self) -> Vec<(String, UserRole)> {
        self.logins.lock().unwrap().clone()
    }

    pub fn get_consents(&self) -> Vec<(String, bool)> {
        self.consents.lock().unwrap().clone()
    }
}

#[async_trait]
impl AccountService for MockAccounts {
    async fn claim(&self, record_id: &str, username: &str, password: &str) -> TraceResult<()> {
        if *self.fail_claim.lock().unwrap() {
            return Err(TraceError::Api {
                status: 400,
                message: "Failed to save credentials. The username may already be taken."
                    .to_string(),
            });
        }
        self.claims.lock().unwrap().push((
            record_id.to_string(),
            username.to_string(),
            password.to_string(),
        ));
        Ok(())
    }

    async fn login(
        &self,
        username: &str,
        _password: &str,
        role: UserRole,
    ) -> TraceResult<LoginResponse> {
        self.logins.lock().unwrap().push((username.to_string(), role));
        if *self.fail_login.lock().unwrap() {
            return Err(TraceError::Api {
                status: 401,
                message: "Invalid credentials".to_string(),
            });
        }
        Ok(self.profile.lock().unwrap().clone())
    }

    async fn record_consent(&self, user_id: &str, consent: bool) -> TraceResult<()> {
        if let Some(message) = self.fail_consent.lock().unwrap().clone() {
            return Err(TraceError::Api {
                status: 500,
                message,
            });
        }
        self.consents
            .lock()
            .unwrap()
            .push((user_id.to_string(), consent));
        Ok(())
    }
}
