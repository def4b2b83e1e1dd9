use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{Comment, NewComment, Post};
use crate::error::{DomainError, DomainResult};
use crate::ports::{CommentRepository, PostRepository};

/// Reader comments. Only published posts accept or show comments.
pub struct CommentService {
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
}

impl CommentService {
    pub fn new(posts: Arc<dyn PostRepository>, comments: Arc<dyn CommentRepository>) -> Self {
        Self { posts, comments }
    }

    pub async fn add(&self, post_id: Uuid, input: NewComment) -> DomainResult<Comment> {
        let post = self.published(post_id).await?;
        let comment = Comment::new(post.id, input)?;
        let saved = self.comments.save(comment).await?;
        tracing::info!(post_id = %post.id, comment_id = %saved.id, "Comment added");
        Ok(saved)
    }

    pub async fn list(&self, post_id: Uuid) -> DomainResult<Vec<Comment>> {
        let post = self.published(post_id).await?;
        Ok(self.comments.list_active_for_post(post.id).await?)
    }

    async fn published(&self, post_id: Uuid) -> DomainResult<Post> {
        self.posts
            .find_by_id(post_id)
            .await?
            .filter(Post::is_published)
            .ok_or_else(|| DomainError::not_found("Post", post_id))
    }
}
