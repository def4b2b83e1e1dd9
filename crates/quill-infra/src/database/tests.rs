use std::collections::BTreeMap;

use chrono::Utc;
use sea_orm::{
    DatabaseBackend, DbErr, IdenStatic, Iterable, MockDatabase, MockExecResult, ModelTrait,
    RuntimeErr, Value,
};
use uuid::Uuid;

use quill_core::domain::{Author, NewPost, PageRequest, Post, PostStatus};
use quill_core::error::RepoError;
use quill_core::ports::{AuthorRepository, BaseRepository, PostFilter, PostRepository};

use super::entity::{author, post};
use super::postgres_repo::{PostgresAuthorRepository, PostgresPostRepository};

fn post_model(id: Uuid, status: &str) -> post::Model {
    let now = Utc::now();
    post::Model {
        id,
        author_id: Uuid::new_v4(),
        title: "Test Post".to_owned(),
        slug: "test-post".to_owned(),
        body: "Content with `code`".to_owned(),
        tags: vec!["rust".to_owned()],
        status: status.to_owned(),
        publish_at: now.into(),
        publish_date: now.date_naive(),
        created_at: now.into(),
        updated_at: now.into(),
    }
}

#[tokio::test]
async fn test_find_post_by_id() {
    let post_id = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![post_model(post_id, "PB")]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let result: Option<Post> = repo.find_by_id(post_id).await.unwrap();

    let post = result.expect("post should be found");
    assert_eq!(post.id, post_id);
    assert_eq!(post.title, "Test Post");
    assert_eq!(post.status, PostStatus::Published);
    assert_eq!(post.tags, vec!["rust"]);
}

#[tokio::test]
async fn test_unknown_status_code_reads_as_draft() {
    let post_id = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![post_model(post_id, "XX")]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let post: Post = repo.find_by_id(post_id).await.unwrap().unwrap();

    assert_eq!(post.status, PostStatus::Draft);
}

#[tokio::test]
async fn test_list_published_maps_rows() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![
            post_model(Uuid::new_v4(), "PB"),
            post_model(Uuid::new_v4(), "PB"),
        ]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let posts = repo.list_published(Some(5)).await.unwrap();

    assert_eq!(posts.len(), 2);
    assert!(posts.iter().all(Post::is_published));
}

#[tokio::test]
async fn test_delete_missing_post_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results(vec![MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let result = BaseRepository::<Post, Uuid>::delete(&repo, Uuid::new_v4()).await;

    assert!(matches!(result, Err(RepoError::NotFound)));
}

#[tokio::test]
async fn test_find_author_by_email() {
    let now = Utc::now();
    let author_id = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![author::Model {
            id: author_id,
            email: "writer@example.com".to_owned(),
            display_name: "Writer".to_owned(),
            password_hash: "hash".to_owned(),
            created_at: now.into(),
            updated_at: now.into(),
        }]])
        .into_connection();

    let repo = PostgresAuthorRepository::new(db);
    let author: Author = repo
        .find_by_email("writer@example.com")
        .await
        .unwrap()
        .unwrap();

    assert_eq!(author.id, author_id);
    assert_eq!(author.display_name, "Writer");
}

fn new_post() -> Post {
    Post::new(
        Uuid::new_v4(),
        NewPost {
            title: "Test Post".to_owned(),
            body: "Content".to_owned(),
            ..Default::default()
        },
    )
    .unwrap()
}

fn count_row(total: i64) -> BTreeMap<&'static str, Value> {
    BTreeMap::from([("num_items", Value::from(total))])
}

#[tokio::test]
async fn test_save_inserts_when_no_row_was_updated() {
    let post = new_post();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        // UPDATE ... RETURNING matches nothing, then INSERT ... RETURNING
        .append_query_results(vec![Vec::new(), vec![post_model(post.id, "DF")]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let saved = BaseRepository::<Post, Uuid>::save(&repo, post.clone())
        .await
        .unwrap();

    assert_eq!(saved.id, post.id);
    assert_eq!(repo.db.into_transaction_log().len(), 2);
}

#[tokio::test]
async fn test_save_updates_existing_row() {
    let post = new_post();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![post_model(post.id, "PB")]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let saved = BaseRepository::<Post, Uuid>::save(&repo, post.clone())
        .await
        .unwrap();

    assert_eq!(saved.id, post.id);
    assert_eq!(saved.status, PostStatus::Published);
    assert_eq!(repo.db.into_transaction_log().len(), 1);
}

#[tokio::test]
async fn test_unique_violation_is_a_constraint_error() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![Vec::<post::Model>::new()])
        .append_query_errors(vec![DbErr::Query(RuntimeErr::Internal(
            "duplicate key value violates unique constraint \"uq_posts_publish_date_slug\""
                .to_owned(),
        ))])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let result = BaseRepository::<Post, Uuid>::save(&repo, new_post()).await;

    assert!(matches!(result, Err(RepoError::Constraint(_))));
}

#[tokio::test]
async fn test_list_clamps_past_the_end_page() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![count_row(7)]])
        .append_query_results(vec![vec![post_model(Uuid::new_v4(), "PB")]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let page = repo
        .list(&PostFilter::published(), PageRequest::new(Some(9), Some(3), 3))
        .await
        .unwrap();

    assert_eq!(page.total, 7);
    assert_eq!(page.total_pages, 3);
    assert_eq!(page.page, 3);
    assert_eq!(page.items.len(), 1);

    let log = repo.db.into_transaction_log();
    assert_eq!(log.len(), 2);
    let select = &log[1].statements()[0];
    assert!(select.sql.contains("OFFSET"), "{}", select.sql);
    // Page 3 of 3 starts at row 6.
    let values = select.values.as_ref().expect("bound values");
    assert!(values.0.contains(&Value::BigUnsigned(Some(6))));
}

/// A post row with one extra computed column.
fn ranked_row(model: post::Model, column: &str, value: Value) -> BTreeMap<String, Value> {
    let mut row: BTreeMap<String, Value> = post::Column::iter()
        .map(|c| (c.as_str().to_owned(), model.get(c)))
        .collect();
    row.insert(column.to_owned(), value);
    row
}

#[tokio::test]
async fn test_search_titles_ranks_in_sql() {
    let best = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![
            ranked_row(post_model(best, "PB"), "similarity", Value::from(0.8f32)),
            ranked_row(post_model(Uuid::new_v4(), "PB"), "similarity", Value::from(0.2f32)),
        ]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let hits = repo.search_titles("test", 0.1).await.unwrap();

    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].0.id, best);
    assert!((hits[0].1 - 0.8).abs() < f32::EPSILON);

    let log = repo.db.into_transaction_log();
    let sql = &log[0].statements()[0].sql;
    assert!(sql.contains("similarity(\"posts\".\"title\", $"), "{sql}");
    assert!(sql.contains("ORDER BY"), "{sql}");
}

#[tokio::test]
async fn test_most_commented_counts_with_a_grouped_join() {
    let busy = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![
            ranked_row(post_model(busy, "PB"), "comment_count", Value::from(4i64)),
            ranked_row(post_model(Uuid::new_v4(), "PB"), "comment_count", Value::from(0i64)),
        ]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let ranked = repo.most_commented(2).await.unwrap();

    assert_eq!((ranked[0].0.id, ranked[0].1), (busy, 4));
    assert_eq!(ranked[1].1, 0);

    let log = repo.db.into_transaction_log();
    let sql = &log[0].statements()[0].sql;
    assert!(sql.contains("LEFT JOIN \"comments\""), "{sql}");
    assert!(sql.contains("GROUP BY"), "{sql}");
    assert!(sql.contains("LIMIT"), "{sql}");
}
