//! HTTP client for the alumni service
//!
//! One explicit endpoint per operation. Transport failures are retried
//! with backoff; HTTP error statuses are reported as-is.

use super::messages::{
    friendly_message, ClaimRequest, ConsentRequest, ConsentResponse, ListEnvelope, LoginRequest,
    LoginResponse, Post, Program,
};
use super::{AccountService, AlumniDirectory, AnnouncementFeed, UserRole};
use crate::config::Config;
use crate::error::{TraceError, TraceResult};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tokio_retry::strategy::ExponentialBackoff;
use tokio_retry::RetryIf;
use tracing::{debug, info, warn};

/// Extra attempts after the first one
const MAX_RETRIES: usize = 2;

const CLAIM_FAILED: &str = "Failed to save credentials. The username may already be taken.";
const LOGIN_FAILED: &str = "Invalid credentials";
const CONSENT_FAILED: &str = "Failed to record consent. Please try again.";

/// reqwest-backed implementation of every service trait
#[derive(Clone)]
pub struct HttpApi {
    client: Client,
    base: String,
}

impl HttpApi {
    pub fn new(config: &Config) -> TraceResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs.max(1)))
            .build()?;
        Ok(Self {
            client,
            base: config.api_base(),
        })
    }

    /// API base this client talks to
    pub fn base(&self) -> &str {
        &self.base
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// Send a request, retrying only when no answer came back.
    ///
    /// Writes (`idempotent == false`) are retried only when the connection
    /// was never made, so a claim or consent cannot be applied twice.
    async fn send<F>(&self, what: &str, idempotent: bool, build: F) -> TraceResult<Response>
    where
        F: Fn() -> RequestBuilder + Send + Sync,
    {
        let strategy = ExponentialBackoff::from_millis(2)
            .factor(100)
            .take(MAX_RETRIES);

        RetryIf::spawn(
            strategy,
            || {
                let request = build();
                async move { request.send().await.map_err(TraceError::from) }
            },
            |e: &TraceError| {
                let retry = should_retry(e, idempotent);
                if retry {
                    warn!("⚠️ {} request failed, retrying: {}", what, e);
                }
                retry
            },
        )
        .await
        .map_err(|e| {
            if e.is_transport() {
                TraceError::Network(format!("Could not reach {}: {}", self.base, e))
            } else {
                e
            }
        })
    }

    /// Read a JSON body, turning error statuses into [`TraceError::Api`]
    async fn read_json(response: Response, fallback: &str) -> TraceResult<Value> {
        let status = response.status();
        let body_text = response.text().await?;
        let body: Option<Value> = serde_json::from_str(&body_text).ok();

        if !status.is_success() {
            let message = body
                .as_ref()
                .and_then(friendly_message)
                .unwrap_or_else(|| fallback.to_string());
            debug!("API error {}: {}", status, body_text);
            return Err(TraceError::Api {
                status: status.as_u16(),
                message,
            });
        }

        match body {
            Some(value) => Ok(value),
            // 204 and friends
            None if body_text.trim().is_empty() => Ok(Value::Null),
            None => Err(TraceError::Decode(format!(
                "expected JSON, got: {}",
                truncate(&body_text, 120)
            ))),
        }
    }

    fn decode<T: DeserializeOwned>(value: Value, what: &str) -> TraceResult<T> {
        serde_json::from_value(value).map_err(|e| TraceError::Decode(format!("{}: {}", what, e)))
    }
}

#[async_trait]
impl AlumniDirectory for HttpApi {
    async fn search(&self, name: &str, year: &str) -> TraceResult<Vec<Value>> {
        let url = self.url("/api/alumni/");
        debug!("Directory search: name='{}' year='{}'", name, year);

        let response = self
            .send("alumni search", true, || {
                self.client
                    .get(&url)
                    .query(&[("search", name), ("year_graduated", year)])
            })
            .await?;
        let body = Self::read_json(response, "Search failed").await?;
        let list: ListEnvelope<Value> = Self::decode(body, "alumni list")?;
        Ok(list.into_vec())
    }

    async fn programs(&self) -> TraceResult<Vec<String>> {
        let url = self.url("/api/programs/");
        let response = self.send("program list", true, || self.client.get(&url)).await?;
        let body = Self::read_json(response, "Could not load programs").await?;
        let list: ListEnvelope<Program> = Self::decode(body, "program list")?;
        Ok(list.into_vec().into_iter().map(|p| p.program_name).collect())
    }
}

#[async_trait]
impl AccountService for HttpApi {
    async fn claim(&self, record_id: &str, username: &str, password: &str) -> TraceResult<()> {
        let url = self.url(&format!("/api/alumni/{}/", record_id));
        let payload = ClaimRequest { username, password };

        let response = self
            .send("claim", false, || self.client.patch(&url).json(&payload))
            .await?;
        Self::read_json(response, CLAIM_FAILED).await?;
        info!("🔑 Credentials saved for record {}", record_id);
        Ok(())
    }

    async fn login(
        &self,
        username: &str,
        password: &str,
        role: UserRole,
    ) -> TraceResult<LoginResponse> {
        let url = self.url("/api/login/");
        let payload = LoginRequest {
            username,
            password,
            user_type: role,
        };

        let response = self
            .send("login", false, || self.client.post(&url).json(&payload))
            .await?;
        let body = Self::read_json(response, LOGIN_FAILED).await?;
        LoginResponse::from_body(&body).map_err(|e| TraceError::Decode(format!("login: {}", e)))
    }

    async fn record_consent(&self, user_id: &str, consent: bool) -> TraceResult<()> {
        let url = self.url("/api/alumni/consent/");
        let payload = ConsentRequest { user_id, consent };

        let response = self
            .send("consent", false, || self.client.post(&url).json(&payload))
            .await?;
        let status = response.status().as_u16();
        let body = Self::read_json(response, CONSENT_FAILED).await?;
        let reply: ConsentResponse = Self::decode(body, "consent")?;
        if !reply.success {
            return Err(TraceError::Api {
                status,
                message: reply.error.unwrap_or_else(|| CONSENT_FAILED.to_string()),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl AnnouncementFeed for HttpApi {
    async fn list_posts(&self) -> TraceResult<Vec<Post>> {
        let url = self.url("/api/posts/");
        let response = self.send("post list", true, || self.client.get(&url)).await?;
        let body = Self::read_json(response, "Could not load posts").await?;
        let list: ListEnvelope<Post> = Self::decode(body, "post list")?;
        Ok(list.into_vec())
    }

    async fn get_post(&self, id: u64) -> TraceResult<Post> {
        let url = self.url(&format!("/api/posts/{}/", id));
        let response = self.send("post", true, || self.client.get(&url)).await?;
        let body = Self::read_json(response, "Post not found").await?;
        Self::decode(body, "post")
    }
}

fn should_retry(err: &TraceError, idempotent: bool) -> bool {
    if idempotent {
        return err.is_transport();
    }
    matches!(err, TraceError::Http(e) if e.is_connect())
}

fn truncate(text: &str, max_chars: usize) -> String {
    let mut out: String = text.chars().take(max_chars).collect();
    if text.chars().count() > max_chars {
        out.push('…');
    }
    out
}
