//! Domain entities - the core business objects.

mod author;
mod comment;
mod page;
mod post;
pub mod text;

pub use author::{Author, looks_like_email};
pub use comment::{Comment, MAX_COMMENT_NAME_LEN, NewComment};
pub use page::{DEFAULT_PER_PAGE, MAX_PER_PAGE, PageRequest, Paged};
pub use post::{MAX_TITLE_LEN, NewPost, Post, PostChanges, PostStatus};
