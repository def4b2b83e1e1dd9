use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{Post, looks_like_email};
use crate::error::{DomainError, DomainResult};
use crate::ports::{Email, MailError, Mailer, PostRepository};

/// Maximum sender name length on a share form.
pub const MAX_SHARE_NAME_LEN: usize = 25;

/// A reader recommending a post to someone by email.
#[derive(Debug, Clone, Default)]
pub struct ShareRequest {
    pub name: String,
    pub email: String,
    pub to: String,
    pub comments: Option<String>,
}

impl ShareRequest {
    fn validate(&self) -> DomainResult<()> {
        let name = self.name.trim();
        if name.is_empty() || name.chars().count() > MAX_SHARE_NAME_LEN {
            return Err(DomainError::validation(format!(
                "name must be between 1 and {MAX_SHARE_NAME_LEN} characters"
            )));
        }
        if !looks_like_email(self.email.trim()) {
            return Err(DomainError::validation("invalid sender email address"));
        }
        if !looks_like_email(self.to.trim()) {
            return Err(DomainError::validation("invalid recipient email address"));
        }
        Ok(())
    }
}

pub struct ShareService {
    posts: Arc<dyn PostRepository>,
    mailer: Arc<dyn Mailer>,
    site_url: String,
}

impl ShareService {
    pub fn new(posts: Arc<dyn PostRepository>, mailer: Arc<dyn Mailer>, site_url: &str) -> Self {
        Self {
            posts,
            mailer,
            site_url: site_url.trim_end_matches('/').to_string(),
        }
    }

    /// Mail a recommendation for a published post. Returns the message sent.
    pub async fn share(&self, post_id: Uuid, request: ShareRequest) -> DomainResult<Email> {
        request.validate()?;

        let post = self
            .posts
            .find_by_id(post_id)
            .await?
            .filter(Post::is_published)
            .ok_or_else(|| DomainError::not_found("Post", post_id))?;

        let email = compose(&post, &request, &self.site_url);
        self.mailer.send(email.clone()).await.map_err(|e| match e {
            MailError::Address(detail) => DomainError::validation(detail),
            other => DomainError::Internal(other.to_string()),
        })?;

        tracing::info!(post_id = %post.id, "Post shared");
        Ok(email)
    }
}

fn compose(post: &Post, request: &ShareRequest, site_url: &str) -> Email {
    let name = request.name.trim();
    let url = format!("{site_url}{}", post.permalink());
    Email {
        to: request.to.trim().to_string(),
        subject: format!(
            "{name} ({}) recommends you read {}",
            request.email.trim(),
            post.title
        ),
        body: format!(
            "Read {} at {url}\n\n{name}'s comments: {}",
            post.title,
            request.comments.as_deref().unwrap_or("").trim()
        ),
    }
}
