//! HTTP handlers and route configuration.

mod auth;
mod comments;
mod discovery;
mod health;
mod posts;

use std::sync::Arc;

use actix_web::web;

use quill_core::ports::RateLimiter;

use crate::middleware::rate_limit::RateLimitMiddleware;

/// Configure all application routes.
///
/// `trust_proxy_headers` lets the rate limiter key on forwarded client addresses.
pub fn configure_routes(
    cfg: &mut web::ServiceConfig,
    limiter: Arc<dyn RateLimiter>,
    trust_proxy_headers: bool,
) {
    cfg.service(
        web::scope("/api")
            // Public routes
            .route("/health", web::get().to(health::health_check))
            .route("/search", web::get().to(discovery::search))
            .route("/stats", web::get().to(discovery::stats))
            // Auth routes
            .service(
                web::scope("/auth")
                    .route("/register", web::post().to(auth::register))
                    .route("/login", web::post().to(auth::login))
                    .route("/me", web::get().to(auth::me)),
            )
            // Posts
            .service(
                web::scope("/posts")
                    .service(
                        web::resource("")
                            .route(web::get().to(posts::list))
                            .route(web::post().to(posts::create)),
                    )
                    .service(
                        web::resource("/{year}/{month}/{day}/{slug}")
                            .route(web::get().to(posts::detail)),
                    )
                    .service(
                        web::resource("/{id}/comments")
                            .wrap(
                                RateLimitMiddleware::new(limiter.clone(), "comments")
                                    .trust_forwarded(trust_proxy_headers),
                            )
                            .route(web::get().to(comments::list))
                            .route(web::post().to(comments::create)),
                    )
                    .service(
                        web::resource("/{id}/share")
                            .wrap(
                                RateLimitMiddleware::new(limiter, "share")
                                    .trust_forwarded(trust_proxy_headers),
                            )
                            .route(web::post().to(comments::share)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(posts::get))
                            .route(web::put().to(posts::update))
                            .route(web::delete().to(posts::delete)),
                    ),
            ),
    )
    .route("/feed/rss.xml", web::get().to(discovery::rss))
    .route("/sitemap.xml", web::get().to(discovery::sitemap))
    // Canonical post URLs, as emitted in feeds, sitemaps and share emails.
    .route(
        "/{year}/{month}/{day}/{slug}",
        web::get().to(posts::detail),
    );
}
