//! Session Manager
//!
//! Holds the signed-in user and tells interested parts of the app when
//! that changes. The session is persisted as JSON so separate CLI
//! invocations share it.

use crate::api::{LoginResponse, UserRole};
use crate::error::TraceResult;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info, warn};

/// Token lifetime assumed when the server does not send one
const DEFAULT_TOKEN_TTL_MINUTES: i64 = 10;

const EVENT_CAPACITY: usize = 16;

/// The signed-in user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub role: UserRole,
    pub user_id: Option<String>,
    pub username: Option<String>,
    pub token: Option<String>,
    pub token_expires_at: Option<DateTime<Utc>>,
    pub first_login: bool,
    #[serde(default)]
    pub consent_given: bool,
    /// Full profile as returned by the login endpoint
    pub profile: LoginResponse,
}

impl Session {
    /// Build a session from a login answer.
    ///
    /// The role the server reports wins over the one that was requested.
    pub fn from_login(profile: LoginResponse, requested: UserRole, now: DateTime<Utc>) -> Self {
        let role = profile
            .user_type
            .as_deref()
            .and_then(|t| t.parse().ok())
            .unwrap_or(requested);

        let token_expires_at = profile.token.as_ref().map(|_| {
            profile
                .token_expires_at
                .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
                .unwrap_or_else(|| now + Duration::minutes(DEFAULT_TOKEN_TTL_MINUTES))
        });

        Self {
            role,
            user_id: profile.user_id(),
            username: profile.username.clone(),
            token: profile.token.clone(),
            token_expires_at,
            first_login: profile.first_login,
            consent_given: false,
            profile,
        }
    }

    pub fn is_token_valid(&self, now: DateTime<Utc>) -> bool {
        match (&self.token, self.token_expires_at) {
            (Some(_), Some(expires)) => now < expires,
            _ => false,
        }
    }

    /// First-time alumni must answer the privacy notice before anything else
    pub fn needs_consent(&self) -> bool {
        self.role == UserRole::Alumni && self.first_login && !self.consent_given
    }

    /// Short label for status output
    pub fn display_name(&self) -> String {
        self.username
            .clone()
            .or_else(|| self.user_id.clone())
            .unwrap_or_else(|| "unknown user".to_string())
    }
}

/// Published whenever the signed-in user changes
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    UserUpdated(Session),
    LoggedOut,
}

/// Owns the current session and its change channel
pub struct SessionManager {
    current: RwLock<Option<Session>>,
    events: broadcast::Sender<SessionEvent>,
    /// Where the session is persisted. `None` keeps it in memory only.
    store_path: Option<PathBuf>,
}

impl SessionManager {
    /// In-memory session, nothing written to disk
    pub fn in_memory() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            current: RwLock::new(None),
            events,
            store_path: None,
        }
    }

    /// Session persisted at `path`, loading whatever is already there
    pub fn persistent(path: PathBuf) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let existing = load_session(&path);
        if let Some(ref session) = existing {
            debug!("Restored session for {}", session.display_name());
        }
        Self {
            current: RwLock::new(existing),
            events,
            store_path: Some(path),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub async fn current(&self) -> Option<Session> {
        self.current.read().await.clone()
    }

    /// Replace the session and notify subscribers
    pub async fn sign_in(&self, session: Session) -> TraceResult<()> {
        self.persist(Some(&session))?;
        {
            let mut guard = self.current.write().await;
            *guard = Some(session.clone());
        }
        info!("👤 Signed in as {} ({})", session.display_name(), session.role);
        let _ = self.events.send(SessionEvent::UserUpdated(session));
        Ok(())
    }

    /// Forget the session, on disk too
    pub async fn logout(&self) -> TraceResult<()> {
        {
            let mut guard = self.current.write().await;
            *guard = None;
        }
        self.persist(None)?;
        info!("👋 Signed out");
        let _ = self.events.send(SessionEvent::LoggedOut);
        Ok(())
    }

    fn persist(&self, session: Option<&Session>) -> TraceResult<()> {
        let Some(path) = &self.store_path else {
            return Ok(());
        };

        match session {
            Some(session) => {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(path, serde_json::to_string_pretty(session)?)?;
            }
            None => {
                if path.exists() {
                    std::fs::remove_file(path)?;
                }
            }
        }
        Ok(())
    }
}

fn load_session(path: &Path) -> Option<Session> {
    let content = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str(&content) {
        Ok(session) => Some(session),
        Err(e) => {
            warn!("⚠️ Ignoring unreadable session file {}: {}", path.display(), e);
            None
        }
    }
}

pub fn session_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("alumtrace")
        .join("session.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(token: Option<&str>, expires: Option<i64>) -> LoginResponse {
        LoginResponse {
            id: Some(serde_json::json!(42)),
            username: Some("jdc".to_string()),
            user_type: Some("alumni".to_string()),
            first_login: true,
            token: token.map(str::to_string),
            token_expires_at: expires,
            ..LoginResponse::default()
        }
    }

    #[test]
    fn test_from_login_uses_server_expiry() {
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let session = Session::from_login(profile(Some("tok"), Some(1_700_000_600)), UserRole::Admin, now);
        assert_eq!(session.role, UserRole::Alumni);
        assert_eq!(session.user_id.as_deref(), Some("42"));
        assert_eq!(session.token_expires_at, Utc.timestamp_opt(1_700_000_600, 0).single());
        assert!(session.is_token_valid(now));
        assert!(!session.is_token_valid(now + Duration::minutes(11)));
    }

    #[test]
    fn test_from_login_default_expiry() {
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let session = Session::from_login(profile(Some("tok"), None), UserRole::Alumni, now);
        assert_eq!(session.token_expires_at, Some(now + Duration::minutes(10)));
    }

    #[test]
    fn test_no_token_never_valid() {
        let now = Utc::now();
        let session = Session::from_login(profile(None, None), UserRole::Alumni, now);
        assert_eq!(session.token_expires_at, None);
        assert!(!session.is_token_valid(now));
    }

    #[test]
    fn test_needs_consent_only_for_first_alumni_login() {
        let now = Utc::now();
        let mut session = Session::from_login(profile(None, None), UserRole::Alumni, now);
        assert!(session.needs_consent());
        session.consent_given = true;
        assert!(!session.needs_consent());

        let mut admin = profile(None, None);
        admin.user_type = Some("admin".to_string());
        assert!(!Session::from_login(admin, UserRole::Admin, now).needs_consent());
    }

    #[tokio::test]
    async fn test_sign_in_publishes_and_persists() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("session.json");
        let manager = SessionManager::persistent(path.clone());
        let mut events = manager.subscribe();

        let session = Session::from_login(profile(Some("tok"), None), UserRole::Alumni, Utc::now());
        manager.sign_in(session.clone()).await.expect("sign in");

        assert_eq!(events.recv().await.expect("event"), SessionEvent::UserUpdated(session.clone()));
        assert!(path.exists());

        let restored = SessionManager::persistent(path.clone());
        assert_eq!(restored.current().await, Some(session));

        restored.logout().await.expect("logout");
        assert!(!path.exists());
        assert_eq!(restored.current().await, None);
    }

    #[test]
    fn test_corrupt_session_file_ignored() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("session.json");
        std::fs::write(&path, "not json").expect("write");
        assert!(load_session(&path).is_none());
    }
}
