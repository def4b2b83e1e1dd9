use std::cmp::{Ordering, Reverse};
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;
use uuid::Uuid;

use quill_core::domain::text::trigram_similarity;
use quill_core::domain::{Author, Comment, PageRequest, Paged, Post};
use quill_core::error::RepoError;
use quill_core::ports::{
    AuthorRepository, BaseRepository, CommentRepository, PostFilter, PostRepository,
};

/// A row type the in-memory store can hold.
pub trait Record: Clone + Send + Sync + 'static {
    fn id(&self) -> Uuid;

    /// Whether storing `self` next to `other` would break a unique constraint.
    fn conflicts_with(&self, _other: &Self) -> bool {
        false
    }
}

impl Record for Author {
    fn id(&self) -> Uuid {
        self.id
    }

    fn conflicts_with(&self, other: &Self) -> bool {
        self.email == other.email
    }
}

impl Record for Post {
    fn id(&self) -> Uuid {
        self.id
    }

    fn conflicts_with(&self, other: &Self) -> bool {
        self.slug == other.slug && self.publish_date() == other.publish_date()
    }
}

impl Record for Comment {
    fn id(&self) -> Uuid {
        self.id
    }
}

/// Generic in-memory repository backed by a `HashMap` behind an async `RwLock`.
pub struct InMemoryRepository<T: Record> {
    rows: RwLock<HashMap<Uuid, T>>,
}

pub type InMemoryAuthorRepository = InMemoryRepository<Author>;
pub type InMemoryCommentRepository = InMemoryRepository<Comment>;

/// In-memory posts. Reads the comment store to rank posts by discussion.
pub struct InMemoryPostRepository {
    posts: InMemoryRepository<Post>,
    comments: Arc<InMemoryCommentRepository>,
}

impl InMemoryPostRepository {
    pub fn new(comments: Arc<InMemoryCommentRepository>) -> Self {
        Self {
            posts: InMemoryRepository::new(),
            comments,
        }
    }

    async fn select<F>(&self, predicate: F) -> Vec<Post>
    where
        F: Fn(&Post) -> bool,
    {
        self.posts.select(predicate).await
    }
}

impl<T: Record> InMemoryRepository<T> {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(HashMap::new()),
        }
    }

    async fn select<F>(&self, predicate: F) -> Vec<T>
    where
        F: Fn(&T) -> bool,
    {
        let rows = self.rows.read().await;
        rows.values().filter(|r| predicate(r)).cloned().collect()
    }
}

impl<T: Record> Default for InMemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Record> BaseRepository<T, Uuid> for InMemoryRepository<T> {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<T>, RepoError> {
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn save(&self, entity: T) -> Result<T, RepoError> {
        let mut rows = self.rows.write().await;
        let id = entity.id();
        if rows
            .values()
            .any(|other| other.id() != id && entity.conflicts_with(other))
        {
            return Err(RepoError::Constraint("Entity already exists".to_string()));
        }
        rows.insert(id, entity.clone());
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        match self.rows.write().await.remove(&id) {
            Some(_) => Ok(()),
            None => Err(RepoError::NotFound),
        }
    }
}

#[async_trait]
impl AuthorRepository for InMemoryAuthorRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<Author>, RepoError> {
        Ok(self.select(|a| a.email == email).await.into_iter().next())
    }
}

fn newest_first(posts: &mut [Post]) {
    posts.sort_by(|a, b| b.publish_at.cmp(&a.publish_at).then(a.id.cmp(&b.id)));
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        self.posts.find_by_id(id).await
    }

    async fn save(&self, entity: Post) -> Result<Post, RepoError> {
        self.posts.save(entity).await
    }

    /// Comments go with their post, as the foreign key cascade does in Postgres.
    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.posts.delete(id).await?;
        self.comments.rows.write().await.retain(|_, c| c.post_id != id);
        Ok(())
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn list(&self, filter: &PostFilter, page: PageRequest) -> Result<Paged<Post>, RepoError> {
        let mut posts = self.select(|p| filter.matches(p)).await;
        newest_first(&mut posts);
        Ok(Paged::from_all(posts, page))
    }

    async fn find_by_date_and_slug(
        &self,
        date: NaiveDate,
        slug: &str,
    ) -> Result<Option<Post>, RepoError> {
        Ok(self
            .select(|p| p.slug == slug && p.publish_date() == date)
            .await
            .into_iter()
            .next())
    }

    async fn list_published(&self, limit: Option<u64>) -> Result<Vec<Post>, RepoError> {
        let mut posts = self.select(Post::is_published).await;
        newest_first(&mut posts);
        if let Some(limit) = limit {
            posts.truncate(limit as usize);
        }
        Ok(posts)
    }

    async fn find_published_with_any_tag(
        &self,
        tags: &[String],
        exclude: Uuid,
    ) -> Result<Vec<Post>, RepoError> {
        let mut posts = self
            .select(|p| {
                p.is_published() && p.id != exclude && p.tags.iter().any(|t| tags.contains(t))
            })
            .await;
        newest_first(&mut posts);
        Ok(posts)
    }

    async fn count_published(&self) -> Result<u64, RepoError> {
        Ok(self.select(Post::is_published).await.len() as u64)
    }

    async fn search_titles(
        &self,
        query: &str,
        threshold: f32,
    ) -> Result<Vec<(Post, f32)>, RepoError> {
        let mut hits: Vec<(Post, f32)> = self
            .select(Post::is_published)
            .await
            .into_iter()
            .filter_map(|post| {
                let similarity = trigram_similarity(&post.title, query);
                (similarity > threshold).then_some((post, similarity))
            })
            .collect();

        hits.sort_by(|(a, a_sim), (b, b_sim)| {
            b_sim
                .partial_cmp(a_sim)
                .unwrap_or(Ordering::Equal)
                .then(b.publish_at.cmp(&a.publish_at))
        });
        Ok(hits)
    }

    async fn most_commented(&self, limit: u64) -> Result<Vec<(Post, u64)>, RepoError> {
        let mut counts: HashMap<Uuid, u64> = HashMap::new();
        for comment in self.comments.select(|_| true).await {
            *counts.entry(comment.post_id).or_insert(0) += 1;
        }

        let mut ranked: Vec<(Post, u64)> = self
            .select(Post::is_published)
            .await
            .into_iter()
            .map(|post| {
                let total = counts.get(&post.id).copied().unwrap_or(0);
                (post, total)
            })
            .collect();

        ranked.sort_by_key(|(post, total)| (Reverse(*total), Reverse(post.publish_at), post.id));
        ranked.truncate(limit as usize);
        Ok(ranked)
    }
}

#[async_trait]
impl CommentRepository for InMemoryCommentRepository {
    async fn list_active_for_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError> {
        let mut comments = self
            .select(|c| c.post_id == post_id && c.active)
            .await;
        comments.sort_by_key(|c| c.created_at);
        Ok(comments)
    }
}
