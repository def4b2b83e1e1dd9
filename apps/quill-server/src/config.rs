//! Application configuration loaded from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use quill_core::domain::DEFAULT_PER_PAGE;
use quill_infra::database::DatabaseConfig;
use quill_infra::{JwtConfig, MailConfig, RateLimitConfig, SmtpConfig};

/// Site identity used by feeds, sitemaps and share emails.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub title: String,
    pub url: String,
    pub description: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Quill".to_string(),
            url: "http://localhost:8080".to_string(),
            description: "Latest posts".to_string(),
        }
    }
}

/// Blog behaviour knobs.
#[derive(Debug, Clone)]
pub struct BlogConfig {
    pub posts_per_page: u64,
    pub feed_cache_ttl: Duration,
}

impl Default for BlogConfig {
    fn default() -> Self {
        Self {
            posts_per_page: DEFAULT_PER_PAGE,
            feed_cache_ttl: Duration::from_secs(300),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// `None` runs the blog on the in-memory store.
    pub database: Option<DatabaseConfig>,
    pub jwt: JwtConfig,
    pub rate_limit: RateLimitConfig,
    /// Trust `Forwarded` / `X-Forwarded-For` for client addresses. Only enable
    /// behind a reverse proxy that overwrites those headers.
    pub trust_proxy_headers: bool,
    pub mail: MailConfig,
    pub site: SiteConfig,
    pub blog: BlogConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            database: None,
            jwt: JwtConfig::default(),
            rate_limit: RateLimitConfig::default(),
            trust_proxy_headers: false,
            mail: MailConfig::default(),
            site: SiteConfig::default(),
            blog: BlogConfig::default(),
        }
    }
}

fn parsed<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

fn flag(key: &str) -> Option<bool> {
    env::var(key).ok().map(|v| {
        matches!(
            v.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        )
    })
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let database = env::var("DATABASE_URL").ok().map(|url| DatabaseConfig {
            url,
            max_connections: parsed("DB_MAX_CONNECTIONS").unwrap_or(20),
            min_connections: parsed("DB_MIN_CONNECTIONS").unwrap_or(2),
        });

        let jwt = JwtConfig {
            secret: env::var("JWT_SECRET").unwrap_or(defaults.jwt.secret),
            expiration_hours: parsed("JWT_EXPIRATION_HOURS").unwrap_or(defaults.jwt.expiration_hours),
            issuer: env::var("JWT_ISSUER").unwrap_or(defaults.jwt.issuer),
        };

        let rate_limit = RateLimitConfig {
            max_requests: parsed("RATE_LIMIT_MAX_REQUESTS")
                .unwrap_or(defaults.rate_limit.max_requests),
            window: parsed("RATE_LIMIT_WINDOW_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.rate_limit.window),
        };

        // An empty host keeps the log-only mailer.
        let mail = MailConfig {
            smtp: env::var("SMTP_HOST")
                .ok()
                .filter(|host| !host.trim().is_empty())
                .map(|host| SmtpConfig {
                    host,
                    port: parsed("SMTP_PORT").unwrap_or(587),
                    username: env::var("SMTP_USERNAME").ok().filter(|u| !u.is_empty()),
                    password: env::var("SMTP_PASSWORD").ok().filter(|p| !p.is_empty()),
                    use_starttls: flag("SMTP_USE_STARTTLS").unwrap_or(true),
                    timeout: parsed("SMTP_TIMEOUT_SECS")
                        .map(Duration::from_secs)
                        .unwrap_or(Duration::from_secs(10)),
                }),
            from: env::var("MAIL_FROM").unwrap_or(defaults.mail.from),
        };

        let site = SiteConfig {
            title: env::var("SITE_TITLE").unwrap_or(defaults.site.title),
            url: env::var("SITE_URL").unwrap_or(defaults.site.url),
            description: env::var("SITE_DESCRIPTION").unwrap_or(defaults.site.description),
        };

        let blog = BlogConfig {
            posts_per_page: parsed("POSTS_PER_PAGE")
                .filter(|n: &u64| *n > 0)
                .unwrap_or(defaults.blog.posts_per_page),
            feed_cache_ttl: parsed("FEED_CACHE_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.blog.feed_cache_ttl),
        };

        Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: parsed("PORT").unwrap_or(defaults.port),
            database,
            jwt,
            rate_limit,
            trust_proxy_headers: flag("TRUST_PROXY_HEADERS")
                .unwrap_or(defaults.trust_proxy_headers),
            mail,
            site,
            blog,
        }
    }
}
