//! In-memory repositories - used when no database is configured, and in tests.
//!
//! Note: Data is lost on process restart.

mod repository;

pub use repository::{
    InMemoryAuthorRepository, InMemoryCommentRepository, InMemoryPostRepository,
    InMemoryRepository, Record,
};
