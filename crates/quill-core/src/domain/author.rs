use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{DomainError, DomainResult};

/// Author entity - a user permitted to write posts.
///
/// Credentials are opaque here; hashing and verification belong to the
/// [`PasswordService`](crate::ports::PasswordService) port.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Author {
    /// Create a new author with generated ID and timestamps.
    pub fn new(email: &str, display_name: &str, password_hash: String) -> DomainResult<Self> {
        let email = email.trim().to_lowercase();
        if !looks_like_email(&email) {
            return Err(DomainError::validation("invalid email address"));
        }
        let display_name = display_name.trim();
        if display_name.is_empty() {
            return Err(DomainError::validation("display name must not be empty"));
        }

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            email,
            display_name: display_name.to_string(),
            password_hash,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Cheap shape check: one `@` with something on both sides and a dot in the domain.
pub fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}
