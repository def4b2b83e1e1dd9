//! SeaORM entities.

pub mod author;
pub mod comment;
pub mod post;
