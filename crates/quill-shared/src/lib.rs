//! # Quill Shared
//!
//! Wire types for the blog API. Kept free of server dependencies so API
//! clients can depend on it directly.

pub mod dto;
pub mod response;

pub use response::{ApiResponse, ErrorResponse};
