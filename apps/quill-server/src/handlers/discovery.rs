//! Search, sidebar stats and machine-readable feeds.

use actix_web::{HttpResponse, http::header::ContentType, web};

use quill_shared::ApiResponse;
use quill_shared::dto::{SearchQuery, SearchResponse, StatsQuery};

use crate::middleware::error::{AppError, AppResult};
use crate::presenter;
use crate::state::AppState;

/// Default number of posts in each stats list.
const DEFAULT_STATS_COUNT: usize = 5;
const MAX_STATS_COUNT: usize = 50;

/// GET /api/search?query=
pub async fn search(
    state: web::Data<AppState>,
    query: web::Query<SearchQuery>,
) -> AppResult<HttpResponse> {
    let Some(text) = query.into_inner().query else {
        return Err(AppError::BadRequest("missing `query` parameter".to_string()));
    };

    let hits = state.posts.search(&text).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(SearchResponse {
        query: text.trim().to_string(),
        results: presenter::search_results(&hits),
    })))
}

/// GET /api/stats?count=
pub async fn stats(
    state: web::Data<AppState>,
    query: web::Query<StatsQuery>,
) -> AppResult<HttpResponse> {
    let count = query
        .count
        .unwrap_or(DEFAULT_STATS_COUNT)
        .clamp(1, MAX_STATS_COUNT);

    let stats = state.posts.stats(count).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(presenter::stats(&stats))))
}

/// GET /feed/rss.xml
pub async fn rss(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let xml = state.feeds.rss().await?;
    Ok(HttpResponse::Ok()
        .content_type("application/rss+xml; charset=utf-8")
        .body(xml))
}

/// GET /sitemap.xml
pub async fn sitemap(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let xml = state.feeds.sitemap().await?;
    Ok(HttpResponse::Ok().content_type(ContentType::xml()).body(xml))
}
