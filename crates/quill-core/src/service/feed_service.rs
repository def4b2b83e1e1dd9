use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{DomainError, DomainResult};
use crate::feed::{FEED_CACHE_PREFIX, FEED_SIZE, FeedChannel, render_rss, render_sitemap};
use crate::ports::{Cache, PostRepository};

/// Serves the RSS feed and sitemap, caching the rendered XML.
pub struct FeedService {
    posts: Arc<dyn PostRepository>,
    cache: Arc<dyn Cache>,
    channel: FeedChannel,
    ttl: Duration,
}

impl FeedService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        cache: Arc<dyn Cache>,
        channel: FeedChannel,
        ttl: Duration,
    ) -> Self {
        Self {
            posts,
            cache,
            channel,
            ttl,
        }
    }

    pub async fn rss(&self) -> DomainResult<String> {
        self.cached("rss", move || async move {
            let posts = self.posts.list_published(Some(FEED_SIZE)).await?;
            Ok::<_, DomainError>(render_rss(&self.channel, &posts))
        })
        .await
    }

    pub async fn sitemap(&self) -> DomainResult<String> {
        self.cached("sitemap", move || async move {
            let posts = self.posts.list_published(None).await?;
            Ok::<_, DomainError>(render_sitemap(&self.channel, &posts))
        })
        .await
    }

    async fn cached<F, Fut>(&self, name: &str, render: F) -> DomainResult<String>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = DomainResult<String>>,
    {
        let key = format!("{FEED_CACHE_PREFIX}{name}");
        if let Some(hit) = self.cache.get(&key).await {
            tracing::debug!(key = %key, "Feed cache hit");
            return Ok(hit);
        }

        let xml = render().await?;
        if let Err(e) = self.cache.set(&key, &xml, Some(self.ttl)).await {
            tracing::warn!(key = %key, error = %e, "Failed to cache rendered feed");
        }
        Ok(xml)
    }
}
