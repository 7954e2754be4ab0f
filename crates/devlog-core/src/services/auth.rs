//! Auth service - registration, credential check and the
//! access/refresh token rotation. Token crypto and password hashing live
//! behind their ports; this layer only orchestrates.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use devlog_shared::dto::{AuthSession, LoginRequest, RegisterRequest, TokenPair, UserResponse};

use crate::domain::User;
use crate::error::DomainError;
use crate::ports::{AuthError, Cache, PasswordService, TokenService, UserStore};
use crate::services::Snapshots;
use crate::shape;

const USERNAME_MIN_LEN: usize = 3;
const USERNAME_MAX_LEN: usize = 30;
const PASSWORD_MIN_LEN: usize = 8;

fn user_key(id: Uuid) -> String {
    format!("user:{id}")
}

impl From<AuthError> for DomainError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::HashingError(msg) => DomainError::Transient(msg),
            _ => DomainError::Unauthorized,
        }
    }
}

pub struct AuthService {
    users: Arc<dyn UserStore>,
    passwords: Arc<dyn PasswordService>,
    tokens: Arc<dyn TokenService>,
    snapshots: Snapshots,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserStore>,
        passwords: Arc<dyn PasswordService>,
        tokens: Arc<dyn TokenService>,
        cache: Arc<dyn Cache>,
    ) -> Self {
        Self {
            users,
            passwords,
            tokens,
            snapshots: Snapshots::new(cache),
        }
    }

    pub async fn register(&self, data: RegisterRequest) -> Result<AuthSession, DomainError> {
        let email = data.email.trim().to_lowercase();
        let username = data.username.trim().to_string();
        validate_registration(&email, &username, &data.password)?;

        if self.users.find_by_email(&email).await?.is_some()
            || self.users.find_by_username(&username).await?.is_some()
        {
            return Err(DomainError::Conflict(
                "user with this email or username already exists".into(),
            ));
        }

        let password_hash = self.passwords.hash(&data.password)?;
        let mut user = User::new(email, username, password_hash);
        user.first_name = data.first_name.filter(|n| !n.trim().is_empty());
        user.last_name = data.last_name.filter(|n| !n.trim().is_empty());

        // unique email/username indexes backstop the checks above
        let mut user = self.users.insert(user).await?;

        let tokens = self.issue_pair(&mut user).await?;
        tracing::info!(user_id = %user.id, email = %user.email, "user registered");
        Ok(AuthSession {
            user: shape::user_response(&user),
            tokens,
        })
    }

    pub async fn login(&self, data: LoginRequest) -> Result<AuthSession, DomainError> {
        let email = data.email.trim().to_lowercase();
        let mut user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(DomainError::Unauthorized)?;

        if !self.passwords.verify(&data.password, &user.password_hash)? {
            return Err(DomainError::Unauthorized);
        }

        user.last_login = Some(Utc::now());
        let tokens = self.issue_pair(&mut user).await?;

        let response = shape::user_response(&user);
        self.snapshots
            .put(&user_key(user.id), &response, None)
            .await;

        tracing::info!(user_id = %user.id, "user logged in");
        Ok(AuthSession {
            user: response,
            tokens,
        })
    }

    /// Rotate a refresh token. The presented token must be the one
    /// currently stored for its holder and must verify as a refresh
    /// token issued to that same user.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, DomainError> {
        let mut user = self
            .users
            .find_by_refresh_token(refresh_token)
            .await?
            .ok_or(DomainError::Unauthorized)?;

        let claimed_id = self.tokens.verify_refresh(refresh_token)?;
        if claimed_id != user.id {
            return Err(DomainError::Unauthorized);
        }

        let tokens = self.issue_pair(&mut user).await?;
        tracing::info!(user_id = %user.id, "tokens refreshed");
        Ok(tokens)
    }

    /// Revoke the stored refresh token. Idempotent: logging out an
    /// unknown user is a no-op.
    pub async fn logout(&self, user_id: Uuid) -> Result<(), DomainError> {
        if let Some(mut user) = self.users.find_by_id(user_id).await? {
            user.refresh_token = None;
            user.updated_at = Utc::now();
            self.users.update(user).await?;
        }
        self.snapshots.remove(&user_key(user_id)).await;
        tracing::info!(user_id = %user_id, "user logged out");
        Ok(())
    }

    pub async fn current_user(&self, user_id: Uuid) -> Result<UserResponse, DomainError> {
        let key = user_key(user_id);
        if let Some(cached) = self.snapshots.get::<UserResponse>(&key).await {
            return Ok(cached);
        }

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(DomainError::not_found("user"))?;

        let response = shape::user_response(&user);
        self.snapshots.put(&key, &response, None).await;
        Ok(response)
    }

    /// Issue a fresh access/refresh pair and persist the rotated refresh
    /// token on the user record.
    async fn issue_pair(&self, user: &mut User) -> Result<TokenPair, DomainError> {
        let access_token = self.tokens.issue_access(user)?;
        let refresh_token = self.tokens.issue_refresh(user.id)?;

        user.refresh_token = Some(refresh_token.clone());
        user.updated_at = Utc::now();
        *user = self.users.update(user.clone()).await?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.tokens.access_ttl_seconds().max(0) as u64,
        })
    }
}

fn validate_registration(
    email: &str,
    username: &str,
    password: &str,
) -> Result<(), DomainError> {
    if email.is_empty() || !email.contains('@') {
        return Err(DomainError::Validation("invalid email address".into()));
    }
    let username_len = username.chars().count();
    if !(USERNAME_MIN_LEN..=USERNAME_MAX_LEN).contains(&username_len) {
        return Err(DomainError::Validation(format!(
            "username must be {USERNAME_MIN_LEN}-{USERNAME_MAX_LEN} characters"
        )));
    }
    if password.chars().count() < PASSWORD_MIN_LEN {
        return Err(DomainError::Validation(format!(
            "password must be at least {PASSWORD_MIN_LEN} characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_input_is_validated() {
        assert!(validate_registration("not-an-email", "ada", "longenough").is_err());
        assert!(validate_registration("a@b.c", "ab", "longenough").is_err());
        assert!(validate_registration("a@b.c", "ada", "short").is_err());
        assert!(validate_registration("a@b.c", "ada", "longenough").is_ok());
    }

    #[test]
    fn auth_errors_map_to_unauthorized() {
        let err: DomainError = AuthError::TokenExpired.into();
        assert!(matches!(err, DomainError::Unauthorized));
        let err: DomainError = AuthError::HashingError("oom".into()).into();
        assert!(matches!(err, DomainError::Transient(_)));
    }
}
