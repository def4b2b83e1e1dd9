//! HTTP-level behavior of the blog API over the in-memory store.

use std::time::Duration;

use actix_web::http::{StatusCode, header};
use actix_web::{App, test};
use serde_json::{Value, json};
use uuid::Uuid;

use quill_core::domain::{NewComment, NewPost, Post, PostStatus};
use quill_server::config::AppConfig;
use quill_server::configure_app;
use quill_server::observability::RequestIdMiddleware;
use quill_server::state::AppState;

macro_rules! blog_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .wrap(RequestIdMiddleware)
                .configure(configure_app($state.clone())),
        )
        .await
    };
}

fn state() -> AppState {
    AppState::in_memory(&AppConfig::default()).unwrap()
}

fn bearer(state: &AppState, author_id: Uuid) -> (header::HeaderName, String) {
    let token = state
        .tokens
        .generate_token(author_id, "writer@example.com", "Writer")
        .unwrap();
    (header::AUTHORIZATION, format!("Bearer {token}"))
}

async fn seed(state: &AppState, author_id: Uuid, title: &str, status: PostStatus) -> Post {
    state
        .posts
        .create(
            author_id,
            NewPost {
                title: title.to_string(),
                body: format!("About {title}"),
                tags: vec!["rust".to_string()],
                status,
                ..Default::default()
            },
        )
        .await
        .unwrap()
}

#[actix_web::test]
async fn health_check_echoes_request_id() {
    let state = state();
    let app = blog_app!(state);

    let req = test::TestRequest::get()
        .uri("/api/health")
        .insert_header(("X-Request-ID", "abc-123"))
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers().get("x-request-id").unwrap(), "abc-123");
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["status"], "ok");
}

#[actix_web::test]
async fn create_then_get_returns_same_content() {
    let state = state();
    let app = blog_app!(state);
    let author = Uuid::new_v4();

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .insert_header(bearer(&state, author))
        .set_json(json!({
            "title": "Hello, World",
            "body": "First post with `code`",
            "tags": ["Rust", "intro"],
            "status": "published"
        }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: Value = test::read_body_json(res).await;
    let post = &created["data"];
    assert_eq!(post["slug"], "hello-world");
    assert_eq!(post["tags"], json!(["intro", "rust"]));

    let id = post["id"].as_str().unwrap();
    let req = test::TestRequest::get()
        .uri(&format!("/api/posts/{id}"))
        .to_request();
    let fetched: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(&fetched["data"], post);
}

#[actix_web::test]
async fn writing_requires_a_token() {
    let state = state();
    let app = blog_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .set_json(json!({ "title": "Anon", "body": "nope" }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get()
        .uri("/api/posts")
        .insert_header((header::AUTHORIZATION, "Bearer not-a-token"))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn deleted_post_is_not_found() {
    let state = state();
    let app = blog_app!(state);
    let author = Uuid::new_v4();
    let post = seed(&state, author, "Short lived", PostStatus::Published).await;

    let req = test::TestRequest::delete()
        .uri(&format!("/api/posts/{}", post.id))
        .insert_header(bearer(&state, author))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NO_CONTENT
    );

    let req = test::TestRequest::get()
        .uri(&format!("/api/posts/{}", post.id))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["status"], 404);
    assert_eq!(body["title"], "Not Found");
}

#[actix_web::test]
async fn anonymous_listing_only_shows_published() {
    let state = state();
    let app = blog_app!(state);
    let author = Uuid::new_v4();
    seed(&state, author, "Out there", PostStatus::Published).await;
    seed(&state, author, "Work in progress", PostStatus::Draft).await;

    let req = test::TestRequest::get().uri("/api/posts").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["items"][0]["title"], "Out there");

    let req = test::TestRequest::get()
        .uri("/api/posts?mine=true")
        .insert_header(bearer(&state, author))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["total"], 2);

    let req = test::TestRequest::get()
        .uri("/api/posts?mine=true")
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn drafts_are_private_to_their_author() {
    let state = state();
    let app = blog_app!(state);
    let author = Uuid::new_v4();
    let draft = seed(&state, author, "Hidden", PostStatus::Draft).await;
    let uri = format!("/api/posts/{}", draft.id);

    let req = test::TestRequest::get().uri(&uri).to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NOT_FOUND
    );

    let req = test::TestRequest::get()
        .uri(&uri)
        .insert_header(bearer(&state, author))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::put()
        .uri(&uri)
        .insert_header(bearer(&state, Uuid::new_v4()))
        .set_json(json!({ "title": "Mine now" }))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NOT_FOUND
    );
}

#[actix_web::test]
async fn edit_updates_content_and_timestamp_but_not_id() {
    let state = state();
    let app = blog_app!(state);
    let author = Uuid::new_v4();
    let post = seed(&state, author, "Before", PostStatus::Draft).await;
    tokio::time::sleep(Duration::from_millis(5)).await;

    let req = test::TestRequest::put()
        .uri(&format!("/api/posts/{}", post.id))
        .insert_header(bearer(&state, author))
        .set_json(json!({ "body": "After", "status": "published" }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    let edited = &body["data"];

    assert_eq!(edited["id"], post.id.to_string());
    assert_eq!(edited["body"], "After");
    assert_eq!(edited["status"], "published");
    assert_eq!(edited["title"], "Before");
    let updated_at: chrono::DateTime<chrono::Utc> =
        serde_json::from_value(edited["updated_at"].clone()).unwrap();
    assert!(updated_at > post.updated_at);
}

#[actix_web::test]
async fn empty_or_invalid_edits_are_unprocessable() {
    let state = state();
    let app = blog_app!(state);
    let author = Uuid::new_v4();
    let post = seed(&state, author, "Stable", PostStatus::Draft).await;
    let uri = format!("/api/posts/{}", post.id);

    let req = test::TestRequest::put()
        .uri(&uri)
        .insert_header(bearer(&state, author))
        .set_json(json!({}))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNPROCESSABLE_ENTITY
    );

    let req = test::TestRequest::put()
        .uri(&uri)
        .insert_header(bearer(&state, author))
        .set_json(json!({ "status": "archived" }))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNPROCESSABLE_ENTITY
    );

    let req = test::TestRequest::put()
        .uri(&uri)
        .insert_header(bearer(&state, author))
        .set_json(json!({ "title": "" }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(res).await;
    assert!(body["detail"].as_str().unwrap().starts_with("title:"));
}

#[actix_web::test]
async fn non_author_cannot_edit_or_delete() {
    let state = state();
    let app = blog_app!(state);
    let author = Uuid::new_v4();
    let intruder = Uuid::new_v4();
    let post = seed(&state, author, "Guarded", PostStatus::Published).await;
    let uri = format!("/api/posts/{}", post.id);

    let req = test::TestRequest::put()
        .uri(&uri)
        .insert_header(bearer(&state, intruder))
        .set_json(json!({ "body": "defaced" }))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::FORBIDDEN
    );

    let req = test::TestRequest::delete()
        .uri(&uri)
        .insert_header(bearer(&state, intruder))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::FORBIDDEN
    );

    let unchanged = state.posts.get(post.id, None).await.unwrap();
    assert_eq!(unchanged.body, post.body);
}

#[actix_web::test]
async fn page_numbers_are_forgiving() {
    let state = state();
    let app = blog_app!(state);
    let author = Uuid::new_v4();
    for i in 0..7 {
        seed(&state, author, &format!("Post {i}"), PostStatus::Published).await;
    }

    let req = test::TestRequest::get()
        .uri("/api/posts?page=99")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["page"], 3);
    assert_eq!(body["data"]["total_pages"], 3);
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 1);

    let req = test::TestRequest::get()
        .uri("/api/posts?page=abc")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["page"], 1);
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 3);

    let req = test::TestRequest::get()
        .uri("/api/posts?per_page=10")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 7);
}

#[actix_web::test]
async fn slug_collisions_conflict() {
    let state = state();
    let app = blog_app!(state);
    let author = Uuid::new_v4();
    seed(&state, author, "Same Day", PostStatus::Published).await;

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .insert_header(bearer(&state, author))
        .set_json(json!({ "title": "Same day!", "body": "again" }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["title"], "Conflict");
}

#[actix_web::test]
async fn permalink_shows_comments_and_similar_posts() {
    let state = state();
    let app = blog_app!(state);
    let author = Uuid::new_v4();
    let post = seed(&state, author, "Main", PostStatus::Published).await;
    let related = seed(&state, author, "Related", PostStatus::Published).await;
    state
        .comments
        .add(
            post.id,
            NewComment {
                name: "Reader".into(),
                email: "reader@example.com".into(),
                body: "Nice".into(),
            },
        )
        .await
        .unwrap();

    let req = test::TestRequest::get()
        .uri(&format!("/api/posts{}", post.permalink()))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["data"]["post"]["id"], post.id.to_string());
    assert_eq!(body["data"]["comments"][0]["name"], "Reader");
    assert!(body["data"]["comments"][0].get("email").is_none());
    assert_eq!(body["data"]["similar"][0]["id"], related.id.to_string());

    let req = test::TestRequest::get()
        .uri("/api/posts/2024/2/30/main")
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NOT_FOUND
    );
}

#[actix_web::test]
async fn comments_only_on_published_posts() {
    let state = state();
    let app = blog_app!(state);
    let author = Uuid::new_v4();
    let draft = seed(&state, author, "Quiet", PostStatus::Draft).await;
    let public = seed(&state, author, "Loud", PostStatus::Published).await;
    let comment = json!({ "name": "Ana", "email": "ana@example.com", "body": "Hi" });

    let req = test::TestRequest::post()
        .uri(&format!("/api/posts/{}/comments", draft.id))
        .set_json(&comment)
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NOT_FOUND
    );

    let req = test::TestRequest::post()
        .uri(&format!("/api/posts/{}/comments", public.id))
        .set_json(&comment)
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::CREATED
    );

    let req = test::TestRequest::post()
        .uri(&format!("/api/posts/{}/comments", public.id))
        .set_json(json!({ "name": "Ana", "email": "not-an-email", "body": "Hi" }))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNPROCESSABLE_ENTITY
    );

    let req = test::TestRequest::get()
        .uri(&format!("/api/posts/{}/comments", public.id))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[actix_web::test]
async fn comment_posting_is_rate_limited() {
    let mut config = AppConfig::default();
    config.rate_limit.max_requests = 2;
    config.rate_limit.window = Duration::from_secs(60);
    let state = AppState::in_memory(&config).unwrap();
    let app = blog_app!(state);
    let post = seed(&state, Uuid::new_v4(), "Popular", PostStatus::Published).await;
    let uri = format!("/api/posts/{}/comments", post.id);
    let comment = json!({ "name": "Ana", "email": "ana@example.com", "body": "Hi" });

    for _ in 0..2 {
        let req = test::TestRequest::post()
            .uri(&uri)
            .set_json(&comment)
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::CREATED
        );
    }

    let req = test::TestRequest::post()
        .uri(&uri)
        .set_json(&comment)
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(res.headers().contains_key("Retry-After"));

    // Reading comments is never limited.
    let req = test::TestRequest::get().uri(&uri).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
}

fn limited_state(max_requests: u32, trust_proxy_headers: bool) -> AppState {
    let mut config = AppConfig::default();
    config.rate_limit.max_requests = max_requests;
    config.rate_limit.window = Duration::from_secs(60);
    config.trust_proxy_headers = trust_proxy_headers;
    AppState::in_memory(&config).unwrap()
}

#[actix_web::test]
async fn forwarded_for_header_does_not_reset_the_budget() {
    let state = limited_state(2, false);
    let app = blog_app!(state);
    let post = seed(&state, Uuid::new_v4(), "Popular", PostStatus::Published).await;
    let uri = format!("/api/posts/{}/comments", post.id);
    let comment = json!({ "name": "Ana", "email": "ana@example.com", "body": "Hi" });

    let mut statuses = Vec::new();
    for i in 1..=4 {
        let req = test::TestRequest::post()
            .uri(&uri)
            .peer_addr("10.0.0.1:40000".parse().unwrap())
            .insert_header(("X-Forwarded-For", format!("203.0.113.{i}")))
            .set_json(&comment)
            .to_request();
        statuses.push(test::call_service(&app, req).await.status());
    }

    assert_eq!(
        statuses,
        vec![
            StatusCode::CREATED,
            StatusCode::CREATED,
            StatusCode::TOO_MANY_REQUESTS,
            StatusCode::TOO_MANY_REQUESTS,
        ]
    );
}

#[actix_web::test]
async fn trusted_proxy_headers_identify_each_client() {
    let state = limited_state(1, true);
    let app = blog_app!(state);
    let post = seed(&state, Uuid::new_v4(), "Popular", PostStatus::Published).await;
    let uri = format!("/api/posts/{}/comments", post.id);
    let comment = json!({ "name": "Ana", "email": "ana@example.com", "body": "Hi" });

    for client in ["203.0.113.1", "203.0.113.2"] {
        let req = test::TestRequest::post()
            .uri(&uri)
            .peer_addr("10.0.0.1:40000".parse().unwrap())
            .insert_header(("X-Forwarded-For", client))
            .set_json(&comment)
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::CREATED
        );
    }

    let req = test::TestRequest::post()
        .uri(&uri)
        .peer_addr("10.0.0.1:40000".parse().unwrap())
        .insert_header(("X-Forwarded-For", "203.0.113.1"))
        .set_json(&comment)
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::TOO_MANY_REQUESTS
    );
}

#[actix_web::test]
async fn sharing_a_post_sends_mail() {
    let state = state();
    let app = blog_app!(state);
    let post = seed(&state, Uuid::new_v4(), "Worth reading", PostStatus::Published).await;

    let req = test::TestRequest::post()
        .uri(&format!("/api/posts/{}/share", post.id))
        .set_json(json!({
            "name": "Sam",
            "email": "sam@example.com",
            "to": "kim@example.com",
            "comments": "You will like this"
        }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["data"]["sent"], true);
    assert_eq!(body["data"]["to"], "kim@example.com");
}

#[actix_web::test]
async fn search_and_stats() {
    let state = state();
    let app = blog_app!(state);
    let author = Uuid::new_v4();
    seed(&state, author, "Learning Rust", PostStatus::Published).await;
    seed(&state, author, "Gardening", PostStatus::Published).await;
    seed(&state, author, "Rust drafts", PostStatus::Draft).await;

    let req = test::TestRequest::get()
        .uri("/api/search?query=rust")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let results = body["data"]["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["post"]["title"], "Learning Rust");

    let req = test::TestRequest::get().uri("/api/search").to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::BAD_REQUEST
    );

    let req = test::TestRequest::get()
        .uri("/api/stats?count=1")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["total_posts"], 2);
    assert_eq!(body["data"]["latest"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"]["most_commented"].as_array().unwrap().len(), 1);
}

#[actix_web::test]
async fn feeds_are_xml() {
    let state = state();
    let app = blog_app!(state);
    let author = Uuid::new_v4();
    seed(&state, author, "Fish & Chips", PostStatus::Published).await;
    seed(&state, author, "Unfinished", PostStatus::Draft).await;

    let req = test::TestRequest::get().uri("/feed/rss.xml").to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(
        res.headers()
            .get(header::CONTENT_TYPE)
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("application/rss+xml")
    );
    let rss = String::from_utf8(test::read_body(res).await.to_vec()).unwrap();
    assert!(rss.contains("<title>Fish &amp; Chips</title>"));
    assert!(!rss.contains("Unfinished"));

    let req = test::TestRequest::get().uri("/sitemap.xml").to_request();
    let sitemap = test::call_and_read_body(&app, req).await;
    let sitemap = String::from_utf8(sitemap.to_vec()).unwrap();
    assert_eq!(sitemap.matches("<url>").count(), 1);
    assert!(sitemap.contains("<changefreq>weekly</changefreq>"));
}

fn first_between<'a>(xml: &'a str, open: &str, close: &str) -> &'a str {
    let start = xml.find(open).unwrap() + open.len();
    let end = start + xml[start..].find(close).unwrap();
    &xml[start..end]
}

#[actix_web::test]
async fn feed_links_resolve_to_the_post() {
    let state = state();
    let app = blog_app!(state);
    seed(&state, Uuid::new_v4(), "Linked post", PostStatus::Published).await;

    let req = test::TestRequest::get().uri("/feed/rss.xml").to_request();
    let rss = String::from_utf8(test::call_and_read_body(&app, req).await.to_vec()).unwrap();
    let item = first_between(&rss, "<item>", "</item>");
    let link = first_between(item, "<link>", "</link>");
    let path = link.strip_prefix("http://localhost:8080").unwrap();
    assert!(path.starts_with('/') && !path.starts_with("/api/"));

    let req = test::TestRequest::get().uri("/sitemap.xml").to_request();
    let sitemap = String::from_utf8(test::call_and_read_body(&app, req).await.to_vec()).unwrap();
    assert_eq!(first_between(&sitemap, "<loc>", "</loc>"), link);

    let req = test::TestRequest::get().uri(path).to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["data"]["post"]["title"], "Linked post");

    let req = test::TestRequest::get().uri("/2024/13/40/linked-post").to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NOT_FOUND
    );
}

#[actix_web::test]
async fn register_login_and_me() {
    let state = state();
    let app = blog_app!(state);
    let credentials = json!({
        "email": "Writer@Example.com",
        "display_name": "Writer",
        "password": "correct horse battery"
    });

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(&credentials)
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["data"]["token_type"], "Bearer");
    assert_eq!(body["data"]["author"]["email"], "writer@example.com");

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(&credentials)
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::CONFLICT
    );

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "email": "writer@example.com", "password": "wrong password" }))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNAUTHORIZED
    );

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "email": "writer@example.com", "password": "correct horse battery" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let token = body["data"]["access_token"].as_str().unwrap().to_string();

    let req = test::TestRequest::get()
        .uri("/api/auth/me")
        .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["display_name"], "Writer");
}

#[actix_web::test]
async fn malformed_json_is_a_problem_document() {
    let state = state();
    let app = blog_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .insert_header(bearer(&state, Uuid::new_v4()))
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_payload("{ not json")
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["type"], "about:blank");
    assert_eq!(body["status"], 400);
}
