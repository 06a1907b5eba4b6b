//! Remote service interfaces
//!
//! The alumni directory, account and announcement services are reached
//! over HTTP in production (see [`http::HttpApi`]); the workflows only
//! depend on these traits.

use crate::error::TraceResult;
use async_trait::async_trait;
use serde_json::Value;

pub mod http;
pub mod messages;

pub use http::HttpApi;
pub use messages::*;

/// Directory of alumni records
#[async_trait]
pub trait AlumniDirectory: Send + Sync {
    /// Raw candidate objects for a name/year search. Either argument may be empty.
    async fn search(&self, name: &str, year: &str) -> TraceResult<Vec<Value>>;

    /// Known program/course names, for verification hints
    async fn programs(&self) -> TraceResult<Vec<String>> {
        Ok(vec![])
    }
}

/// Credential, login and consent endpoints
#[async_trait]
pub trait AccountService: Send + Sync {
    /// Attach a username/password to an existing alumni record
    async fn claim(&self, record_id: &str, username: &str, password: &str) -> TraceResult<()>;

    async fn login(&self, username: &str, password: &str, role: UserRole)
        -> TraceResult<LoginResponse>;

    /// Record an explicit yes/no privacy consent decision
    async fn record_consent(&self, user_id: &str, consent: bool) -> TraceResult<()>;
}

/// Announcement posts
#[async_trait]
pub trait AnnouncementFeed: Send + Sync {
    async fn list_posts(&self) -> TraceResult<Vec<Post>>;

    async fn get_post(&self, id: u64) -> TraceResult<Post>;
}
