//! Data Transfer Objects - request/response types for the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

// ---------------------------------------------------------------------------
// Authors
// ---------------------------------------------------------------------------

/// Request to register a new author.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, max = 80, message = "must be between 1 and 80 characters"))]
    pub display_name: String,
    #[validate(length(min = 8, message = "must be at least 8 characters"))]
    pub password: String,
}

/// Request to login.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1))]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// An author's public information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorResponse {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
}

/// Response containing an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub author: AuthorResponse,
}

// ---------------------------------------------------------------------------
// Posts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreatePostRequest {
    #[validate(length(min = 1, max = 250, message = "must be between 1 and 250 characters"))]
    pub title: String,
    #[validate(length(min = 1, max = 250))]
    pub slug: Option<String>,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub body: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// `draft` (default) or `published`.
    pub status: Option<String>,
    pub publish_at: Option<DateTime<Utc>>,
}

/// Partial update; omitted fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdatePostRequest {
    #[validate(length(min = 1, max = 250, message = "must be between 1 and 250 characters"))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 250))]
    pub slug: Option<String>,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub body: Option<String>,
    pub tags: Option<Vec<String>>,
    pub status: Option<String>,
    pub publish_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostResponse {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub slug: String,
    /// Site-relative permalink, `/{year}/{month}/{day}/{slug}`.
    pub permalink: String,
    pub body: String,
    /// Plain-text preview of the body.
    pub excerpt: String,
    pub tags: Vec<String>,
    pub status: String,
    pub publish_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostListResponse {
    pub items: Vec<PostResponse>,
    pub page: u64,
    pub per_page: u64,
    pub total: u64,
    pub total_pages: u64,
}

/// Query string for post listings.
///
/// `page` and `per_page` are taken as raw strings: anything that is not a
/// positive integer falls back to the default instead of rejecting the request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListPostsQuery {
    pub page: Option<String>,
    pub per_page: Option<String>,
    pub tag: Option<String>,
    #[serde(default)]
    pub mine: bool,
}

impl ListPostsQuery {
    pub fn page_number(&self) -> Option<u64> {
        parse_positive(self.page.as_deref())
    }

    pub fn page_size(&self) -> Option<u64> {
        parse_positive(self.per_page.as_deref())
    }
}

fn parse_positive(raw: Option<&str>) -> Option<u64> {
    raw.and_then(|s| s.trim().parse::<u64>().ok())
        .filter(|n| *n > 0)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDetailResponse {
    pub post: PostResponse,
    pub comments: Vec<CommentResponse>,
    pub similar: Vec<PostResponse>,
}

// ---------------------------------------------------------------------------
// Comments and sharing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CommentRequest {
    #[validate(length(min = 1, max = 80, message = "must be between 1 and 80 characters"))]
    pub name: String,
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub body: String,
}

/// A comment as shown to readers. The commenter's email is never echoed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentResponse {
    pub id: Uuid,
    pub post_id: Uuid,
    pub name: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SharePostRequest {
    #[validate(length(min = 1, max = 25, message = "must be between 1 and 25 characters"))]
    pub name: String,
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(email(message = "must be a valid email address"))]
    pub to: String,
    pub comments: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareResponse {
    pub sent: bool,
    pub to: String,
}

// ---------------------------------------------------------------------------
// Search and stats
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchQuery {
    pub query: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub post: PostResponse,
    pub similarity: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub query: String,
    pub results: Vec<SearchResult>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatsQuery {
    pub count: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentedPostResponse {
    pub post: PostResponse,
    pub comments: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsResponse {
    pub total_posts: u64,
    pub latest: Vec<PostResponse>,
    pub most_commented: Vec<CommentedPostResponse>,
}
