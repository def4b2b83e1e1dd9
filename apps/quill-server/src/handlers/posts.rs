//! Post CRUD and permalink handlers.

use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use uuid::Uuid;
use validator::Validate;

use quill_core::domain::{NewPost, PageRequest, PostChanges, PostStatus};
use quill_core::service::ListQuery;
use quill_shared::ApiResponse;
use quill_shared::dto::{CreatePostRequest, ListPostsQuery, UpdatePostRequest};

use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::{AppError, AppResult};
use crate::presenter;
use crate::state::AppState;

fn parse_status(raw: Option<&str>) -> AppResult<Option<PostStatus>> {
    Ok(raw.map(str::parse::<PostStatus>).transpose()?)
}

/// GET /api/posts
pub async fn list(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    query: web::Query<ListPostsQuery>,
) -> AppResult<HttpResponse> {
    let page = PageRequest::new(
        query.page_number(),
        query.page_size(),
        state.blog.posts_per_page,
    );
    let filter = ListQuery {
        tag: query.tag.clone(),
        mine: query.mine,
    };

    let posts = state.posts.list(filter, viewer.author_id(), page).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(presenter::post_page(&posts))))
}

/// POST /api/posts
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    req.validate()?;

    let input = NewPost {
        title: req.title,
        slug: req.slug,
        body: req.body,
        tags: req.tags,
        status: parse_status(req.status.as_deref())?.unwrap_or_default(),
        publish_at: req.publish_at,
    };

    let post = state.posts.create(identity.author_id, input).await?;
    Ok(HttpResponse::Created()
        .insert_header(("Location", format!("/api/posts/{}", post.id)))
        .json(ApiResponse::ok(presenter::post(&post))))
}

/// GET /api/posts/{id}
pub async fn get(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post = state.posts.get(path.into_inner(), viewer.author_id()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(presenter::post(&post))))
}

/// PUT /api/posts/{id}
pub async fn update(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<UpdatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    req.validate()?;

    let changes = PostChanges {
        title: req.title,
        slug: req.slug,
        body: req.body,
        tags: req.tags,
        status: parse_status(req.status.as_deref())?,
        publish_at: req.publish_at,
    };

    let post = state
        .posts
        .update(path.into_inner(), identity.author_id, changes)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(presenter::post(&post))))
}

/// DELETE /api/posts/{id}
pub async fn delete(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    state
        .posts
        .delete(path.into_inner(), identity.author_id)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// GET /{year}/{month}/{day}/{slug} and /api/posts/{year}/{month}/{day}/{slug}
pub async fn detail(
    state: web::Data<AppState>,
    path: web::Path<(i32, u32, u32, String)>,
) -> AppResult<HttpResponse> {
    let (year, month, day, slug) = path.into_inner();
    let date = NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| AppError::NotFound(format!("No post at {year}/{month}/{day}/{slug}")))?;

    let detail = state.posts.detail(date, &slug).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(presenter::post_detail(&detail))))
}
