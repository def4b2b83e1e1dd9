use std::sync::Arc;

use uuid::Uuid;

use crate::domain::Author;
use crate::error::{DomainError, DomainResult};
use crate::ports::{AuthError, AuthorRepository, PasswordService};

/// Minimum accepted password length.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Author registration and credential checks.
pub struct AuthorService {
    authors: Arc<dyn AuthorRepository>,
    passwords: Arc<dyn PasswordService>,
}

impl AuthorService {
    pub fn new(authors: Arc<dyn AuthorRepository>, passwords: Arc<dyn PasswordService>) -> Self {
        Self { authors, passwords }
    }

    pub async fn register(
        &self,
        email: &str,
        display_name: &str,
        password: &str,
    ) -> DomainResult<Author> {
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(DomainError::validation(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        let hash = self.passwords.hash(password).map_err(internal)?;
        let author = Author::new(email, display_name, hash)?;

        if self.authors.find_by_email(&author.email).await?.is_some() {
            return Err(DomainError::Duplicate("email already registered".to_string()));
        }

        let saved = self.authors.save(author).await?;
        tracing::info!(author_id = %saved.id, "Author registered");
        Ok(saved)
    }

    /// Check credentials. Unknown emails and wrong passwords are indistinguishable.
    pub async fn authenticate(&self, email: &str, password: &str) -> DomainResult<Author> {
        let email = email.trim().to_lowercase();
        let author = self
            .authors
            .find_by_email(&email)
            .await?
            .ok_or(DomainError::Unauthorized)?;

        if !self
            .passwords
            .verify(password, &author.password_hash)
            .map_err(internal)?
        {
            tracing::debug!(author_id = %author.id, "Password mismatch");
            return Err(DomainError::Unauthorized);
        }
        Ok(author)
    }

    pub async fn get(&self, id: Uuid) -> DomainResult<Author> {
        self.authors
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Author", id))
    }
}

fn internal(err: AuthError) -> DomainError {
    DomainError::Internal(err.to_string())
}
