//! Application state - shared across all handlers.

use std::sync::Arc;

use anyhow::Context;
use quill_core::feed::FeedChannel;
use quill_core::ports::{
    AuthorRepository, Cache, CommentRepository, Mailer, PasswordService, PostRepository,
    RateLimiter, TokenService,
};
use quill_core::service::{AuthorService, CommentService, FeedService, PostService, ShareService};
use quill_infra::database::{
    PostgresAuthorRepository, PostgresCommentRepository, PostgresPostRepository, connect,
};
use quill_infra::{
    Argon2PasswordService, InMemoryAuthorRepository, InMemoryCache, InMemoryCommentRepository,
    InMemoryPostRepository, InMemoryRateLimiter, JwtTokenService, LogMailer, MailConfig,
    SmtpMailer,
};

use crate::config::{AppConfig, BlogConfig};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub authors: Arc<AuthorService>,
    pub posts: Arc<PostService>,
    pub comments: Arc<CommentService>,
    pub share: Arc<ShareService>,
    pub feeds: Arc<FeedService>,
    pub tokens: Arc<dyn TokenService>,
    pub limiter: Arc<dyn RateLimiter>,
    /// Key rate limits on forwarded client addresses.
    pub trust_proxy_headers: bool,
    pub blog: BlogConfig,
}

struct Repositories {
    authors: Arc<dyn AuthorRepository>,
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
}

impl AppState {
    /// Build the state, backed by Postgres when `DATABASE_URL` is configured.
    pub async fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let repos = match &config.database {
            Some(db_config) => {
                let db = connect(db_config)
                    .await
                    .context("failed to connect to database")?;
                Repositories {
                    authors: Arc::new(PostgresAuthorRepository::new(db.clone())),
                    posts: Arc::new(PostgresPostRepository::new(db.clone())),
                    comments: Arc::new(PostgresCommentRepository::new(db)),
                }
            }
            None => {
                tracing::warn!("DATABASE_URL not set. Content is kept in memory and lost on restart.");
                Repositories::in_memory()
            }
        };

        Self::assemble(config, repos)
    }

    /// State over empty in-memory stores.
    pub fn in_memory(config: &AppConfig) -> anyhow::Result<Self> {
        Self::assemble(config, Repositories::in_memory())
    }

    fn assemble(config: &AppConfig, repos: Repositories) -> anyhow::Result<Self> {
        let cache: Arc<dyn Cache> = Arc::new(InMemoryCache::new());
        let mailer = mailer(&config.mail)?;
        let passwords: Arc<dyn PasswordService> = Arc::new(Argon2PasswordService::new());

        let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(config.jwt.clone()));
        let limiter: Arc<dyn RateLimiter> =
            Arc::new(InMemoryRateLimiter::new(config.rate_limit.clone()));

        let channel = FeedChannel::new(
            &config.site.title,
            &config.site.url,
            &config.site.description,
        );

        tracing::info!("Application state initialized");

        Ok(Self {
            authors: Arc::new(AuthorService::new(repos.authors, passwords)),
            posts: Arc::new(PostService::new(
                repos.posts.clone(),
                repos.comments.clone(),
                cache.clone(),
            )),
            comments: Arc::new(CommentService::new(repos.posts.clone(), repos.comments)),
            share: Arc::new(ShareService::new(
                repos.posts.clone(),
                mailer,
                &config.site.url,
            )),
            feeds: Arc::new(FeedService::new(
                repos.posts,
                cache,
                channel,
                config.blog.feed_cache_ttl,
            )),
            tokens,
            limiter,
            trust_proxy_headers: config.trust_proxy_headers,
            blog: config.blog.clone(),
        })
    }
}

/// SMTP when a relay is configured, otherwise mail is only logged.
fn mailer(config: &MailConfig) -> anyhow::Result<Arc<dyn Mailer>> {
    match &config.smtp {
        Some(smtp) => {
            let mailer = SmtpMailer::new(smtp, &config.from)
                .context("failed to configure SMTP mailer")?;
            Ok(Arc::new(mailer))
        }
        None => {
            tracing::warn!("SMTP_HOST not set. Share emails are logged, not delivered.");
            Ok(Arc::new(LogMailer::new()))
        }
    }
}

impl Repositories {
    fn in_memory() -> Self {
        let comments = Arc::new(InMemoryCommentRepository::new());
        Self {
            authors: Arc::new(InMemoryAuthorRepository::new()),
            posts: Arc::new(InMemoryPostRepository::new(comments.clone())),
            comments,
        }
    }
}
