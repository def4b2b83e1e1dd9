use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::text::{is_valid_slug, normalize_tags, slugify};
use crate::error::{DomainError, DomainResult};

/// Maximum title length in characters.
pub const MAX_TITLE_LEN: usize = 250;

/// Publication state of a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Draft,
    Published,
}

impl PostStatus {
    /// Two-letter storage code.
    pub fn code(self) -> &'static str {
        match self {
            PostStatus::Draft => "DF",
            PostStatus::Published => "PB",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "DF" => Some(PostStatus::Draft),
            "PB" => Some(PostStatus::Published),
            _ => None,
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PostStatus::Draft => f.write_str("draft"),
            PostStatus::Published => f.write_str("published"),
        }
    }
}

impl FromStr for PostStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "draft" | "df" => Ok(PostStatus::Draft),
            "published" | "pb" => Ok(PostStatus::Published),
            other => Err(DomainError::validation(format!(
                "unknown post status `{other}`"
            ))),
        }
    }
}

/// Post entity - a single blog article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub slug: String,
    /// Markdown body; may embed images and fenced code blocks.
    pub body: String,
    pub tags: Vec<String>,
    pub status: PostStatus,
    pub publish_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a post.
#[derive(Debug, Clone, Default)]
pub struct NewPost {
    pub title: String,
    pub slug: Option<String>,
    pub body: String,
    pub tags: Vec<String>,
    pub status: PostStatus,
    pub publish_at: Option<DateTime<Utc>>,
}

/// Partial edit of a post. `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct PostChanges {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub body: Option<String>,
    pub tags: Option<Vec<String>>,
    pub status: Option<PostStatus>,
    pub publish_at: Option<DateTime<Utc>>,
}

impl PostChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.slug.is_none()
            && self.body.is_none()
            && self.tags.is_none()
            && self.status.is_none()
            && self.publish_at.is_none()
    }
}

fn validate_title(title: &str) -> DomainResult<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(DomainError::validation("title must not be empty"));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(DomainError::validation(format!(
            "title must be at most {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(title.to_string())
}

fn resolve_slug(explicit: Option<&str>, title: &str) -> DomainResult<String> {
    let slug = match explicit {
        Some(s) if !s.trim().is_empty() => {
            let s = s.trim();
            if !is_valid_slug(s) {
                return Err(DomainError::validation(format!(
                    "slug `{s}` may only contain lowercase letters, digits, `-` and `_`"
                )));
            }
            s.to_string()
        }
        _ => slugify(title),
    };
    if slug.is_empty() {
        return Err(DomainError::validation(
            "could not derive a slug from the title; provide one explicitly",
        ));
    }
    Ok(slug)
}

fn validate_body(body: &str) -> DomainResult<()> {
    if body.trim().is_empty() {
        return Err(DomainError::validation("body must not be empty"));
    }
    Ok(())
}

impl Post {
    /// Create a new post owned by `author_id`.
    pub fn new(author_id: Uuid, input: NewPost) -> DomainResult<Self> {
        let title = validate_title(&input.title)?;
        let slug = resolve_slug(input.slug.as_deref(), &title)?;
        validate_body(&input.body)?;

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            author_id,
            title,
            slug,
            body: input.body,
            tags: normalize_tags(input.tags),
            status: input.status,
            publish_at: input.publish_at.unwrap_or(now),
            created_at: now,
            updated_at: now,
        })
    }

    /// Apply an edit. The id and author never change; `updated_at` always moves forward.
    pub fn apply(&mut self, changes: PostChanges) -> DomainResult<()> {
        let title = changes.title.as_deref().map(validate_title).transpose()?;
        if let Some(body) = &changes.body {
            validate_body(body)?;
        }
        let slug = match changes.slug.as_deref() {
            Some(s) => Some(resolve_slug(Some(s), title.as_deref().unwrap_or(&self.title))?),
            None => None,
        };

        if let Some(title) = title {
            self.title = title;
        }
        if let Some(slug) = slug {
            self.slug = slug;
        }
        if let Some(body) = changes.body {
            self.body = body;
        }
        if let Some(tags) = changes.tags {
            self.tags = normalize_tags(tags);
        }
        if let Some(publish_at) = changes.publish_at {
            self.publish_at = publish_at;
        }
        match changes.status {
            Some(PostStatus::Published) => self.publish(changes.publish_at.is_some()),
            Some(PostStatus::Draft) => self.unpublish(),
            None => {}
        }

        self.touch();
        Ok(())
    }

    /// Draft -> Published. A stale publish time is moved to now unless it was set explicitly.
    fn publish(&mut self, keep_publish_at: bool) {
        if self.status == PostStatus::Draft && !keep_publish_at && self.publish_at < Utc::now() {
            self.publish_at = Utc::now();
        }
        self.status = PostStatus::Published;
    }

    /// Published -> Draft.
    fn unpublish(&mut self) {
        self.status = PostStatus::Draft;
    }

    fn touch(&mut self) {
        let now = Utc::now();
        self.updated_at = if now > self.updated_at {
            now
        } else {
            self.updated_at
        };
    }

    pub fn is_published(&self) -> bool {
        self.status == PostStatus::Published
    }

    pub fn is_owned_by(&self, author_id: Uuid) -> bool {
        self.author_id == author_id
    }

    /// Published posts are visible to everyone; drafts only to their author.
    pub fn is_visible_to(&self, viewer: Option<Uuid>) -> bool {
        self.is_published() || viewer.is_some_and(|v| self.is_owned_by(v))
    }

    /// Calendar date used for permalinks and slug uniqueness.
    pub fn publish_date(&self) -> NaiveDate {
        self.publish_at.date_naive()
    }

    /// Permalink path, e.g. `/2024/3/9/hello-world`.
    pub fn permalink(&self) -> String {
        use chrono::Datelike;
        let date = self.publish_date();
        format!(
            "/{}/{}/{}/{}",
            date.year(),
            date.month(),
            date.day(),
            self.slug
        )
    }

    pub fn shared_tag_count(&self, other: &Post) -> usize {
        self.tags.iter().filter(|t| other.tags.contains(t)).count()
    }
}
