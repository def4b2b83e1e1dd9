//! Authentication handlers.

use actix_web::{HttpResponse, web};
use validator::Validate;

use quill_core::domain::Author;
use quill_shared::ApiResponse;
use quill_shared::dto::{AuthResponse, LoginRequest, RegisterRequest};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::presenter;
use crate::state::AppState;

fn token_for(state: &AppState, author: &Author) -> AppResult<AuthResponse> {
    let token = state
        .tokens
        .generate_token(author.id, &author.email, &author.display_name)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(AuthResponse {
        access_token: token,
        token_type: "Bearer".to_string(),
        expires_in: state.tokens.expiration_seconds().max(0) as u64,
        author: presenter::author(author),
    })
}

/// POST /api/auth/register
pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    req.validate()?;

    let author = state
        .authors
        .register(&req.email, &req.display_name, &req.password)
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::ok(token_for(&state, &author)?)))
}

/// POST /api/auth/login
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    req.validate()?;

    let author = state.authors.authenticate(&req.email, &req.password).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(token_for(&state, &author)?)))
}

/// GET /api/auth/me
pub async fn me(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    let author = state.authors.get(identity.author_id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(presenter::author(&author))))
}
