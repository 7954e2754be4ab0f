//! Authentication ports: token issue/verify and password hashing.

use uuid::Uuid;

use crate::domain::{Role, User};

/// Claims carried by an access token.
#[derive(Debug, Clone)]
pub struct AccessClaims {
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
    pub exp: i64,
}

/// Token service - issues and verifies the access/refresh token pair.
/// Refresh tokens carry only the user id plus a type marker so an access
/// token can never be replayed on the refresh path.
pub trait TokenService: Send + Sync {
    fn issue_access(&self, user: &User) -> Result<String, AuthError>;

    fn issue_refresh(&self, user_id: Uuid) -> Result<String, AuthError>;

    fn verify_access(&self, token: &str) -> Result<AccessClaims, AuthError>;

    /// Verify a refresh token and return the user id it was issued for.
    fn verify_refresh(&self, token: &str) -> Result<Uuid, AuthError>;

    fn access_ttl_seconds(&self) -> i64;
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
