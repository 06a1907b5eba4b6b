//! Announcements
//!
//! Lists and renders posts from the announcement feed.

use crate::api::{AnnouncementFeed, Post};
use crate::error::TraceResult;
use chrono::{DateTime, NaiveDateTime, Utc};
use std::sync::Arc;
use tracing::debug;

const PREVIEW_CHARS: usize = 80;

/// Parse a `created_at` value. Accepts RFC 3339 and naive "YYYY-MM-DD HH:MM:SS".
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

fn posted_at(post: &Post) -> Option<DateTime<Utc>> {
    post.created_at.as_deref().and_then(parse_timestamp)
}

/// Newest first. Undated posts go last, in feed order.
pub fn sort_newest_first(posts: &mut [Post]) {
    posts.sort_by(|a, b| posted_at(b).cmp(&posted_at(a)));
}

/// One line per post for listings
pub fn summary_line(post: &Post) -> String {
    let date = posted_at(post)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "----------".to_string());
    let title = if post.title.trim().is_empty() {
        "(untitled)"
    } else {
        post.title.trim()
    };

    let flat: String = post.content.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut preview: String = flat.chars().take(PREVIEW_CHARS).collect();
    if flat.chars().count() > PREVIEW_CHARS {
        preview.push('…');
    }

    format!(
        "#{:<4} {}  {}  [♥ {} · 💬 {}]\n      {}",
        post.id,
        date,
        title,
        post.likes_count,
        post.comments.len(),
        preview
    )
}

/// Full view of a single post with its comments
pub fn render_detail(post: &Post) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", post.title.trim()));
    if let Some(date) = posted_at(post) {
        out.push_str(&format!("Posted {}\n", date.format("%Y-%m-%d %H:%M UTC")));
    }
    out.push('\n');
    out.push_str(post.content.trim());
    out.push('\n');

    let images: Vec<&str> = post.images.iter().filter_map(|i| i.image.as_deref()).collect();
    if !images.is_empty() {
        out.push_str("\nImages:\n");
        for url in images {
            out.push_str(&format!("  {}\n", url));
        }
    }

    out.push_str(&format!(
        "\n♥ {}{}\n",
        post.likes_count,
        if post.liked { " (you liked this)" } else { "" }
    ));

    if post.comments.is_empty() {
        out.push_str("No comments yet.\n");
    } else {
        out.push_str(&format!("Comments ({}):\n", post.comments.len()));
        for comment in &post.comments {
            out.push_str(&format!("  {}: {}\n", comment.author(), comment.text.trim()));
        }
    }
    out
}

/// Reads the announcement feed
pub struct PostBoard {
    feed: Arc<dyn AnnouncementFeed>,
}

impl PostBoard {
    pub fn new(feed: Arc<dyn AnnouncementFeed>) -> Self {
        Self { feed }
    }

    /// All posts, newest first
    pub async fn latest(&self) -> TraceResult<Vec<Post>> {
        let mut posts = self.feed.list_posts().await?;
        sort_newest_first(&mut posts);
        debug!("Loaded {} posts", posts.len());
        Ok(posts)
    }

    pub async fn show(&self, id: u64) -> TraceResult<Post> {
        self.feed.get_post(id).await
    }
}
