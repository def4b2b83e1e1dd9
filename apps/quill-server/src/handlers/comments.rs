//! Reader comments and post sharing.

use actix_web::{HttpResponse, web};
use uuid::Uuid;
use validator::Validate;

use quill_core::domain::NewComment;
use quill_core::service::ShareRequest;
use quill_shared::ApiResponse;
use quill_shared::dto::{CommentRequest, SharePostRequest, ShareResponse};

use crate::middleware::error::AppResult;
use crate::observability::RequestId;
use crate::presenter;
use crate::state::AppState;

/// GET /api/posts/{id}/comments
pub async fn list(state: web::Data<AppState>, path: web::Path<Uuid>) -> AppResult<HttpResponse> {
    let comments = state.comments.list(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(presenter::comments(&comments))))
}

/// POST /api/posts/{id}/comments
pub async fn create(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<CommentRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    req.validate()?;

    let comment = state
        .comments
        .add(
            path.into_inner(),
            NewComment {
                name: req.name,
                email: req.email,
                body: req.body,
            },
        )
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::ok_with_message(
        presenter::comment(&comment),
        "Your comment has been added.",
    )))
}

/// POST /api/posts/{id}/share
pub async fn share(
    state: web::Data<AppState>,
    request_id: RequestId,
    path: web::Path<Uuid>,
    body: web::Json<SharePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    req.validate()?;

    let email = state
        .share
        .share(
            path.into_inner(),
            ShareRequest {
                name: req.name,
                email: req.email,
                to: req.to,
                comments: req.comments,
            },
        )
        .await?;
    tracing::debug!(request_id = %request_id.as_str(), "Share email dispatched");

    Ok(HttpResponse::Ok().json(ApiResponse::ok(ShareResponse {
        sent: true,
        to: email.to,
    })))
}
