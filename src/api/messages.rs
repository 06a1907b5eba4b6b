//! API Message Types
//!
//! JSON bodies exchanged with the alumni service.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A list endpoint answer: either a bare array or a paginated page
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ListEnvelope<T> {
    Plain(Vec<T>),
    Paged { results: Vec<T> },
}

impl<T> ListEnvelope<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            ListEnvelope::Plain(items) => items,
            ListEnvelope::Paged { results } => results,
        }
    }
}

/// Account role sent with a login request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Alumni,
    Admin,
    #[serde(alias = "programhead")]
    ProgramHead,
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "alumni" => Ok(UserRole::Alumni),
            "admin" => Ok(UserRole::Admin),
            "program_head" | "programhead" | "program-head" => Ok(UserRole::ProgramHead),
            other => Err(format!(
                "Unknown role: {}. Available: alumni, admin, program_head",
                other
            )),
        }
    }
}

impl UserRole {
    pub fn id(&self) -> &'static str {
        match self {
            UserRole::Alumni => "alumni",
            UserRole::Admin => "admin",
            UserRole::ProgramHead => "program_head",
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

/// Credentials attached to an existing alumni record
#[derive(Debug, Clone, Serialize)]
pub struct ClaimRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
    pub user_type: UserRole,
}

/// Successful login answer.
///
/// Unknown fields are kept in `extra` so the whole user object survives
/// into the session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub user_type: Option<String>,
    #[serde(default)]
    pub first_login: bool,
    /// Approval state, only sent for program heads
    #[serde(default)]
    pub status: Option<Value>,
    #[serde(default)]
    pub token: Option<String>,
    /// Unix seconds
    #[serde(default)]
    pub token_expires_at: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LoginResponse {
    /// Decode a login body, unwrapping a nested `user` object when present.
    ///
    /// A top-level `user_type` wins over the one inside `user`.
    pub fn from_body(body: &Value) -> serde_json::Result<Self> {
        let user = body.get("user").filter(|u| u.is_object()).unwrap_or(body);
        let mut response: LoginResponse = serde_json::from_value(user.clone())?;
        if let Some(top) = body.get("user_type").and_then(Value::as_str) {
            response.user_type = Some(top.to_string());
        }
        Ok(response)
    }

    /// Approval flag under whichever key the server used
    pub fn approval_status(&self) -> Option<&Value> {
        const KEYS: [&str; 6] = [
            "user_status",
            "is_approved",
            "approval_status",
            "approved",
            "isApproved",
            "user_approved",
        ];
        self.status
            .as_ref()
            .filter(|v| !v.is_null())
            .or_else(|| {
                KEYS.iter()
                    .filter_map(|k| self.extra.get(*k))
                    .find(|v| !v.is_null())
            })
    }

    /// Identifier rendered as a string
    pub fn user_id(&self) -> Option<String> {
        match self.id.as_ref()? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ConsentRequest<'a> {
    pub user_id: &'a str,
    pub consent: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConsentResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Program {
    #[serde(default)]
    pub id: Option<u64>,
    pub program_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostImage {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub author_name: Option<String>,
    #[serde(default)]
    pub author_full_name: Option<String>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Comment {
    /// Best available author label
    pub fn author(&self) -> &str {
        [self.author_full_name.as_deref(), self.author_name.as_deref()]
            .into_iter()
            .flatten()
            .find(|a| !a.trim().is_empty())
            .unwrap_or("Anonymous")
    }
}

/// An announcement post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub images: Vec<PostImage>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub likes_count: u64,
    #[serde(default)]
    pub liked: bool,
}

/// Pull a human-readable message out of an error body.
///
/// Looks at `detail`, then `error`, then `non_field_errors`.
pub fn friendly_message(body: &Value) -> Option<String> {
    for key in ["detail", "error"] {
        if let Some(msg) = body.get(key).and_then(Value::as_str) {
            if !msg.trim().is_empty() {
                return Some(msg.to_string());
            }
        }
    }

    let errors: Vec<&str> = body
        .get("non_field_errors")
        .and_then(Value::as_array)
        .map(|a| a.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();
    if errors.is_empty() {
        None
    } else {
        Some(errors.join(", "))
    }
}
