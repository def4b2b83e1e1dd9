//! PostgreSQL repository implementations.

use async_trait::async_trait;
use chrono::NaiveDate;
use sea_orm::sea_query::{Alias, Expr, SimpleExpr};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DbBackend, EntityTrait, FromQueryResult, JoinType, Order,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, QueryTrait, RelationTrait, Select,
    Value,
};
use uuid::Uuid;

use quill_core::domain::{Author, Comment, PageRequest, Paged, Post, PostStatus};
use quill_core::error::RepoError;
use quill_core::ports::{AuthorRepository, CommentRepository, PostFilter, PostRepository};

use super::entity::author::{self, Entity as AuthorEntity};
use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::postgres_base::{PostgresBaseRepository, query_err};

/// PostgreSQL author repository.
pub type PostgresAuthorRepository = PostgresBaseRepository<AuthorEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

/// PostgreSQL comment repository.
pub type PostgresCommentRepository = PostgresBaseRepository<CommentEntity>;

/// Mask an email for logging to avoid PII in logs.
fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => {
            let head: String = local.chars().take(1).collect();
            if local.chars().count() > 1 {
                format!("{head}***@{domain}")
            } else {
                format!("***@{domain}")
            }
        }
        None => "***".to_string(),
    }
}

#[async_trait]
impl AuthorRepository for PostgresAuthorRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<Author>, RepoError> {
        tracing::debug!(author_email = %mask_email(email), "Finding author by email");

        let result = AuthorEntity::find()
            .filter(author::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(query_err)?;

        Ok(result.map(Into::into))
    }
}

fn published() -> Select<PostEntity> {
    PostEntity::find().filter(post::Column::Status.eq(PostStatus::Published.code()))
}

/// `pg_trgm` similarity of the post title to `query`.
fn title_similarity(query: &str) -> SimpleExpr {
    Expr::cust_with_values("similarity(\"posts\".\"title\", ?)", [query.to_owned()])
}

fn newest_first(select: Select<PostEntity>) -> Select<PostEntity> {
    select
        .order_by_desc(post::Column::PublishAt)
        .order_by_asc(post::Column::Id)
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn list(&self, filter: &PostFilter, page: PageRequest) -> Result<Paged<Post>, RepoError> {
        let mut select = PostEntity::find();
        if let Some(status) = filter.status {
            select = select.filter(post::Column::Status.eq(status.code()));
        }
        if let Some(author_id) = filter.author_id {
            select = select.filter(post::Column::AuthorId.eq(author_id));
        }
        if let Some(tag) = &filter.tag {
            select = select.filter(Expr::cust_with_values("? = ANY(\"tags\")", [tag.clone()]));
        }

        let total = select.clone().count(&self.db).await.map_err(query_err)?;
        let page = page.clamp_to(total);

        let models = newest_first(select)
            .offset(page.offset())
            .limit(page.per_page)
            .all(&self.db)
            .await
            .map_err(query_err)?;

        Ok(Paged::new(
            models.into_iter().map(Into::into).collect(),
            page,
            total,
        ))
    }

    async fn find_by_date_and_slug(
        &self,
        date: NaiveDate,
        slug: &str,
    ) -> Result<Option<Post>, RepoError> {
        let result = PostEntity::find()
            .filter(post::Column::PublishDate.eq(date))
            .filter(post::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(query_err)?;

        Ok(result.map(Into::into))
    }

    async fn list_published(&self, limit: Option<u64>) -> Result<Vec<Post>, RepoError> {
        let models = newest_first(published())
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(query_err)?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn find_published_with_any_tag(
        &self,
        tags: &[String],
        exclude: Uuid,
    ) -> Result<Vec<Post>, RepoError> {
        if tags.is_empty() {
            return Ok(Vec::new());
        }

        let models = newest_first(published())
            .filter(post::Column::Id.ne(exclude))
            .filter(Expr::cust_with_values("\"tags\" && ?", [tags.to_vec()]))
            .all(&self.db)
            .await
            .map_err(query_err)?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn count_published(&self) -> Result<u64, RepoError> {
        published().count(&self.db).await.map_err(query_err)
    }

    async fn search_titles(
        &self,
        query: &str,
        threshold: f32,
    ) -> Result<Vec<(Post, f32)>, RepoError> {
        let stmt = published()
            .column_as(title_similarity(query), "similarity")
            .filter(Expr::cust_with_values(
                "similarity(\"posts\".\"title\", ?) > ?",
                [Value::from(query.to_owned()), Value::from(threshold)],
            ))
            .order_by(title_similarity(query), Order::Desc)
            .order_by_desc(post::Column::PublishAt)
            .build(DbBackend::Postgres);

        let rows = self.db.query_all(stmt).await.map_err(query_err)?;
        rows.iter()
            .map(|row| -> Result<(Post, f32), RepoError> {
                let model = post::Model::from_query_result(row, "").map_err(query_err)?;
                let similarity: f32 = row.try_get("", "similarity").map_err(query_err)?;
                Ok((model.into(), similarity))
            })
            .collect()
    }

    async fn most_commented(&self, limit: u64) -> Result<Vec<(Post, u64)>, RepoError> {
        let stmt = published()
            .column_as(
                Expr::col((CommentEntity, comment::Column::Id)).count(),
                "comment_count",
            )
            .join(JoinType::LeftJoin, post::Relation::Comment.def())
            .group_by(post::Column::Id)
            .order_by(Expr::col(Alias::new("comment_count")), Order::Desc)
            .order_by_desc(post::Column::PublishAt)
            .order_by_asc(post::Column::Id)
            .limit(limit)
            .build(DbBackend::Postgres);

        let rows = self.db.query_all(stmt).await.map_err(query_err)?;
        rows.iter()
            .map(|row| -> Result<(Post, u64), RepoError> {
                let model = post::Model::from_query_result(row, "").map_err(query_err)?;
                let total: i64 = row.try_get("", "comment_count").map_err(query_err)?;
                Ok((model.into(), total.max(0) as u64))
            })
            .collect()
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn list_active_for_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError> {
        let models = CommentEntity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .filter(comment::Column::Active.eq(true))
            .order_by_asc(comment::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(query_err)?;

        Ok(models.into_iter().map(Into::into).collect())
    }
}
