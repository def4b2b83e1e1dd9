//! # Quill Server
//!
//! Actix-web front end for the blog: JSON API under `/api`, plus RSS and
//! sitemap documents at the site root.

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod observability;
pub mod presenter;
pub mod state;
pub mod telemetry;

use std::fmt;

use actix_web::{ResponseError, error::InternalError, web};

use middleware::error::AppError;
use state::AppState;

/// Render extractor failures (malformed JSON, bad query strings) as problem details.
fn bad_request<E: fmt::Debug + fmt::Display + 'static>(err: E) -> actix_web::Error {
    let response = AppError::BadRequest(err.to_string()).error_response();
    InternalError::from_response(err, response).into()
}

/// Register state, extractor error handling and routes on an app.
pub fn configure_app(state: AppState) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        let limiter = state.limiter.clone();
        let trust_proxy_headers = state.trust_proxy_headers;

        cfg.app_data(web::Data::new(state))
            .app_data(web::JsonConfig::default().error_handler(|err, _| bad_request(err)))
            .app_data(web::QueryConfig::default().error_handler(|err, _| bad_request(err)))
            .app_data(web::PathConfig::default().error_handler(|err, _| {
                let response = AppError::NotFound(err.to_string()).error_response();
                InternalError::from_response(err, response).into()
            }));

        handlers::configure_routes(cfg, limiter, trust_proxy_headers);
    }
}
