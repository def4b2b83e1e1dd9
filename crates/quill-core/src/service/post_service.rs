use std::cmp::Reverse;
use std::sync::Arc;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::{Comment, NewPost, PageRequest, Paged, Post, PostChanges};
use crate::error::{DomainError, DomainResult, RepoError};
use crate::feed::FEED_CACHE_PREFIX;
use crate::ports::{Cache, CommentRepository, PostFilter, PostRepository};

/// Minimum title similarity for a search hit.
pub const SEARCH_THRESHOLD: f32 = 0.1;
/// Maximum number of related posts on a detail page.
pub const SIMILAR_POSTS_LIMIT: usize = 4;

/// Listing options beyond pagination.
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    pub tag: Option<String>,
    /// List the caller's own posts, drafts included.
    pub mine: bool,
}

/// A published post with its active comments and related posts.
#[derive(Debug, Clone)]
pub struct PostDetail {
    pub post: Post,
    pub comments: Vec<Comment>,
    pub similar: Vec<Post>,
}

#[derive(Debug, Clone)]
pub struct SearchHit {
    pub post: Post,
    pub similarity: f32,
}

#[derive(Debug, Clone)]
pub struct CommentedPost {
    pub post: Post,
    pub comments: u64,
}

#[derive(Debug, Clone)]
pub struct BlogStats {
    pub total_published: u64,
    pub latest: Vec<Post>,
    pub most_commented: Vec<CommentedPost>,
}

/// Post CRUD plus the read-side queries readers use.
pub struct PostService {
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
    cache: Arc<dyn Cache>,
}

impl PostService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        comments: Arc<dyn CommentRepository>,
        cache: Arc<dyn Cache>,
    ) -> Self {
        Self {
            posts,
            comments,
            cache,
        }
    }

    pub async fn create(&self, author_id: Uuid, input: NewPost) -> DomainResult<Post> {
        let post = Post::new(author_id, input)?;
        self.ensure_slug_free(&post).await?;

        let saved = self.posts.save(post).await?;
        tracing::info!(post_id = %saved.id, slug = %saved.slug, status = %saved.status, "Post created");

        self.invalidate_feeds().await;
        Ok(saved)
    }

    /// Fetch a post the viewer is allowed to see. Other authors' drafts are `NotFound`.
    pub async fn get(&self, id: Uuid, viewer: Option<Uuid>) -> DomainResult<Post> {
        self.posts
            .find_by_id(id)
            .await?
            .filter(|p| p.is_visible_to(viewer))
            .ok_or_else(|| DomainError::not_found("Post", id))
    }

    pub async fn list(
        &self,
        query: ListQuery,
        viewer: Option<Uuid>,
        page: PageRequest,
    ) -> DomainResult<Paged<Post>> {
        let tag = query
            .tag
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty());

        let filter = if query.mine {
            let author_id = viewer.ok_or(DomainError::Unauthorized)?;
            PostFilter {
                author_id: Some(author_id),
                ..Default::default()
            }
        } else {
            PostFilter::published()
        };

        Ok(self.posts.list(&filter.with_tag(tag), page).await?)
    }

    pub async fn update(
        &self,
        id: Uuid,
        editor: Uuid,
        changes: PostChanges,
    ) -> DomainResult<Post> {
        if changes.is_empty() {
            return Err(DomainError::validation("no fields to update"));
        }

        let mut post = self.owned(id, editor).await?;
        post.apply(changes)?;
        self.ensure_slug_free(&post).await?;

        let saved = self.posts.save(post).await?;
        tracing::info!(post_id = %saved.id, status = %saved.status, "Post updated");

        self.invalidate_feeds().await;
        Ok(saved)
    }

    pub async fn delete(&self, id: Uuid, editor: Uuid) -> DomainResult<()> {
        self.owned(id, editor).await?;

        match self.posts.delete(id).await {
            Ok(()) => {}
            Err(RepoError::NotFound) => return Err(DomainError::not_found("Post", id)),
            Err(e) => return Err(e.into()),
        }
        tracing::info!(post_id = %id, "Post deleted");

        self.invalidate_feeds().await;
        Ok(())
    }

    /// Published post by permalink, with comments and related posts.
    pub async fn detail(&self, date: NaiveDate, slug: &str) -> DomainResult<PostDetail> {
        let post = self
            .posts
            .find_by_date_and_slug(date, slug)
            .await?
            .filter(Post::is_published)
            .ok_or_else(|| DomainError::not_found("Post", format!("{date}/{slug}")))?;

        let comments = self.comments.list_active_for_post(post.id).await?;
        let similar = self.similar(&post).await?;

        Ok(PostDetail {
            post,
            comments,
            similar,
        })
    }

    /// Published posts ranked by tags shared with `post`, then recency.
    async fn similar(&self, post: &Post) -> DomainResult<Vec<Post>> {
        if post.tags.is_empty() {
            return Ok(Vec::new());
        }

        let mut candidates = self
            .posts
            .find_published_with_any_tag(&post.tags, post.id)
            .await?;
        candidates.sort_by_key(|c| (Reverse(post.shared_tag_count(c)), Reverse(c.publish_at)));
        candidates.truncate(SIMILAR_POSTS_LIMIT);
        Ok(candidates)
    }

    /// Published posts whose title resembles `query`, best match first.
    pub async fn search(&self, query: &str) -> DomainResult<Vec<SearchHit>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(DomainError::validation("search query must not be empty"));
        }

        let hits: Vec<SearchHit> = self
            .posts
            .search_titles(query, SEARCH_THRESHOLD)
            .await?
            .into_iter()
            .map(|(post, similarity)| SearchHit { post, similarity })
            .collect();

        tracing::debug!(query = %query, hits = hits.len(), "Search finished");
        Ok(hits)
    }

    /// Sidebar figures: total published, latest `count`, most commented `count`.
    pub async fn stats(&self, count: usize) -> DomainResult<BlogStats> {
        let limit = count as u64;
        let total_published = self.posts.count_published().await?;
        let latest = self.posts.list_published(Some(limit)).await?;
        let most_commented = self
            .posts
            .most_commented(limit)
            .await?
            .into_iter()
            .map(|(post, comments)| CommentedPost { post, comments })
            .collect();

        Ok(BlogStats {
            total_published,
            latest,
            most_commented,
        })
    }

    /// Load a post for modification by `editor`.
    async fn owned(&self, id: Uuid, editor: Uuid) -> DomainResult<Post> {
        let post = self
            .posts
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Post", id))?;

        if post.is_owned_by(editor) {
            return Ok(post);
        }
        if !post.is_published() {
            return Err(DomainError::not_found("Post", id));
        }
        tracing::warn!(post_id = %id, editor = %editor, "Rejected edit by non-author");
        Err(DomainError::Forbidden("post"))
    }

    async fn ensure_slug_free(&self, post: &Post) -> DomainResult<()> {
        let existing = self
            .posts
            .find_by_date_and_slug(post.publish_date(), &post.slug)
            .await?;

        match existing {
            Some(other) if other.id != post.id => Err(DomainError::Duplicate(format!(
                "a post with slug `{}` already exists on {}",
                post.slug,
                post.publish_date()
            ))),
            _ => Ok(()),
        }
    }

    async fn invalidate_feeds(&self) {
        if let Err(e) = self.cache.delete_prefix(FEED_CACHE_PREFIX).await {
            tracing::warn!(error = %e, "Failed to invalidate feed cache");
        }
    }
}
