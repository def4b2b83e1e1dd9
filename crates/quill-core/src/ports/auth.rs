//! Authentication ports.
//!
//! Identity is established elsewhere; this service only issues and verifies
//! bearer tokens and checks stored credentials.

use uuid::Uuid;

/// Claims carried by an author's bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    pub author_id: Uuid,
    pub email: String,
    pub display_name: String,
    pub exp: i64,
}

/// Token service trait for issuing and validating bearer tokens.
pub trait TokenService: Send + Sync {
    /// Issue an access token for an author.
    fn generate_token(
        &self,
        author_id: Uuid,
        email: &str,
        display_name: &str,
    ) -> Result<String, AuthError>;

    /// Validate and decode a token.
    fn validate_token(&self, token: &str) -> Result<TokenClaims, AuthError>;

    /// Lifetime of issued tokens.
    fn expiration_seconds(&self) -> i64;
}

/// Password hashing service.
pub trait PasswordService: Send + Sync {
    /// Hash a plain text password.
    fn hash(&self, password: &str) -> Result<String, AuthError>;

    /// Verify a password against a hash.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError>;
}

/// Authentication errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Missing authorization header")]
    MissingAuth,

    #[error("Hashing error: {0}")]
    HashingError(String),
}
