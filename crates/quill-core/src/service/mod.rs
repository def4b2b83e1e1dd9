//! Use-case services.
//!
//! Each service owns `Arc<dyn Port>` handles and enforces the rules the
//! repositories do not: validation, ownership, visibility and slug uniqueness.

mod author_service;
mod comment_service;
mod feed_service;
mod post_service;
mod share_service;

pub use author_service::AuthorService;
pub use comment_service::CommentService;
pub use feed_service::FeedService;
pub use post_service::{
    BlogStats, CommentedPost, ListQuery, PostDetail, PostService, SIMILAR_POSTS_LIMIT,
    SearchHit, SEARCH_THRESHOLD,
};
pub use share_service::{ShareRequest, ShareService};
