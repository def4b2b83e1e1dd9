use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::author::looks_like_email;
use crate::error::{DomainError, DomainResult};

/// Maximum commenter name length.
pub const MAX_COMMENT_NAME_LEN: usize = 80;

/// A reader's comment on a published post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub name: String,
    pub email: String,
    pub body: String,
    /// Inactive comments are hidden from readers.
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct NewComment {
    pub name: String,
    pub email: String,
    pub body: String,
}

impl Comment {
    pub fn new(post_id: Uuid, input: NewComment) -> DomainResult<Self> {
        let name = input.name.trim();
        if name.is_empty() || name.chars().count() > MAX_COMMENT_NAME_LEN {
            return Err(DomainError::validation(format!(
                "name must be between 1 and {MAX_COMMENT_NAME_LEN} characters"
            )));
        }
        let email = input.email.trim();
        if !looks_like_email(email) {
            return Err(DomainError::validation("invalid email address"));
        }
        if input.body.trim().is_empty() {
            return Err(DomainError::validation("comment body must not be empty"));
        }

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            post_id,
            name: name.to_string(),
            email: email.to_string(),
            body: input.body.trim().to_string(),
            active: true,
            created_at: now,
            updated_at: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_comment_is_active() {
        let post_id = Uuid::new_v4();
        let comment = Comment::new(
            post_id,
            NewComment {
                name: "Reader".into(),
                email: "reader@example.com".into(),
                body: " Nice post! ".into(),
            },
        )
        .unwrap();

        assert!(comment.active);
        assert_eq!(comment.post_id, post_id);
        assert_eq!(comment.body, "Nice post!");
    }

    #[test]
    fn new_comment_validates_fields() {
        let long_name = "x".repeat(MAX_COMMENT_NAME_LEN + 1);
        let cases = [
            ("", "reader@example.com", "body"),
            (long_name.as_str(), "reader@example.com", "body"),
            ("Reader", "nope", "body"),
            ("Reader", "reader@example.com", "   "),
        ];
        for (name, email, body) in cases {
            let input = NewComment {
                name: name.into(),
                email: email.into(),
                body: body.into(),
            };
            assert!(Comment::new(Uuid::new_v4(), input).is_err(), "{name:?} {email:?} {body:?}");
        }
    }
}
