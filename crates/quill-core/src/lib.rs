//! # Quill Core
//!
//! The domain layer of the Quill blog.
//! This crate contains pure business logic with zero infrastructure dependencies:
//! entities, the ports infrastructure implements, and the use-case services
//! that HTTP handlers call.

pub mod domain;
pub mod error;
pub mod feed;
pub mod ports;
pub mod service;

pub use error::{DomainError, DomainResult, RepoError};
