use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::{Author, Comment, PageRequest, Paged, Post, PostStatus};
use crate::error::RepoError;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Save an entity (create or update).
    async fn save(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID. Missing rows are `RepoError::NotFound`.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// Author repository.
#[async_trait]
pub trait AuthorRepository: BaseRepository<Author, Uuid> {
    /// Find an author by (normalized) email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<Author>, RepoError>;
}

/// Listing filter. All set fields must match.
#[derive(Debug, Clone, Default)]
pub struct PostFilter {
    pub status: Option<PostStatus>,
    pub author_id: Option<Uuid>,
    pub tag: Option<String>,
}

impl PostFilter {
    pub fn published() -> Self {
        Self {
            status: Some(PostStatus::Published),
            ..Default::default()
        }
    }

    pub fn with_tag(mut self, tag: Option<String>) -> Self {
        self.tag = tag;
        self
    }

    pub fn matches(&self, post: &Post) -> bool {
        self.status.is_none_or(|s| post.status == s)
            && self.author_id.is_none_or(|a| post.author_id == a)
            && self.tag.as_ref().is_none_or(|t| post.tags.contains(t))
    }
}

/// Post repository. Listings are ordered by `publish_at` descending.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// One page of posts matching `filter`. Past-the-end pages clamp to the last page.
    async fn list(&self, filter: &PostFilter, page: PageRequest) -> Result<Paged<Post>, RepoError>;

    /// The post with `slug` published on `date`, in any status.
    async fn find_by_date_and_slug(
        &self,
        date: NaiveDate,
        slug: &str,
    ) -> Result<Option<Post>, RepoError>;

    /// Latest published posts, newest first.
    async fn list_published(&self, limit: Option<u64>) -> Result<Vec<Post>, RepoError>;

    /// Published posts carrying any of `tags`, excluding `exclude`.
    async fn find_published_with_any_tag(
        &self,
        tags: &[String],
        exclude: Uuid,
    ) -> Result<Vec<Post>, RepoError>;

    async fn count_published(&self) -> Result<u64, RepoError>;

    /// Published posts whose title similarity to `query` exceeds `threshold`,
    /// best match first, then newest.
    async fn search_titles(
        &self,
        query: &str,
        threshold: f32,
    ) -> Result<Vec<(Post, f32)>, RepoError>;

    /// Up to `limit` published posts ranked by comment total (active or not),
    /// then newest. Posts without comments are included with a zero count.
    async fn most_commented(&self, limit: u64) -> Result<Vec<(Post, u64)>, RepoError>;
}

/// Comment repository.
#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, Uuid> {
    /// Active comments on a post, oldest first.
    async fn list_active_for_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError>;
}
