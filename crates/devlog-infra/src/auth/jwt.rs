//! JWT token service implementation.
//!
//! Access and refresh tokens are signed with the same secret but carry a
//! `typ` claim, so one can never stand in for the other.

use chrono::{TimeDelta, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use devlog_core::domain::{Role, User};
use devlog_core::ports::{AccessClaims, AuthError, TokenService};

/// JWT token service configuration.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub access_ttl_minutes: i64,
    pub refresh_ttl_days: i64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: "change-me-in-production".to_string(),
            issuer: "devlog-api".to_string(),
            audience: "devlog-users".to_string(),
            access_ttl_minutes: 15,
            refresh_ttl_days: 7,
        }
    }
}

const TYP_ACCESS: &str = "access";
const TYP_REFRESH: &str = "refresh";

/// Internal JWT claims structure for serialization.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String, // user_id
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    typ: String, // access | refresh
    /// Unique id on refresh tokens, so two rotations within the same
    /// second still produce distinct tokens.
    #[serde(skip_serializing_if = "Option::is_none")]
    jti: Option<String>,
    exp: i64, // expiration timestamp
    iat: i64, // issued at
    iss: String, // issuer
    aud: String, // audience
}

/// JWT-based token service.
pub struct JwtTokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    config: JwtConfig,
}

impl JwtTokenService {
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            encoding_key,
            decoding_key,
            config,
        }
    }

    pub fn from_env() -> Self {
        let secret =
            std::env::var("JWT_SECRET").unwrap_or_else(|_| "change-me-in-production".to_string());

        if secret == "change-me-in-production" {
            let is_production = std::env::var("RUST_ENV")
                .map(|v| v == "production" || v == "prod")
                .unwrap_or(false);

            if is_production {
                tracing::error!(
                    "SECURITY: Using default JWT secret in production! Set JWT_SECRET environment variable."
                );
            } else {
                tracing::warn!("Using default JWT secret. Set JWT_SECRET for production use.");
            }
        }

        let defaults = JwtConfig::default();
        let config = JwtConfig {
            secret,
            issuer: std::env::var("JWT_ISSUER").unwrap_or(defaults.issuer),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or(defaults.audience),
            access_ttl_minutes: std::env::var("JWT_ACCESS_TTL_MINUTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.access_ttl_minutes),
            refresh_ttl_days: std::env::var("JWT_REFRESH_TTL_DAYS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.refresh_ttl_days),
        };
        Self::new(config)
    }

    fn sign(&self, claims: &Claims) -> Result<String, AuthError> {
        encode(&Header::default(), claims, &self.encoding_key)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))
    }

    fn decode_checked(&self, token: &str, expected_typ: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_audience(&[&self.config.audience]);

        let token_data =
            decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken(e.to_string()),
            })?;

        if token_data.claims.typ != expected_typ {
            return Err(AuthError::InvalidToken(format!(
                "expected {expected_typ} token"
            )));
        }
        Ok(token_data.claims)
    }
}

impl TokenService for JwtTokenService {
    fn issue_access(&self, user: &User) -> Result<String, AuthError> {
        let now = Utc::now();
        let exp = now + TimeDelta::minutes(self.config.access_ttl_minutes);

        self.sign(&Claims {
            sub: user.id.to_string(),
            email: Some(user.email.clone()),
            role: Some(user.role.as_str().to_string()),
            typ: TYP_ACCESS.to_string(),
            jti: None,
            exp: exp.timestamp(),
            iat: now.timestamp(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
        })
    }

    fn issue_refresh(&self, user_id: Uuid) -> Result<String, AuthError> {
        let now = Utc::now();
        let exp = now + TimeDelta::days(self.config.refresh_ttl_days);

        self.sign(&Claims {
            sub: user_id.to_string(),
            email: None,
            role: None,
            typ: TYP_REFRESH.to_string(),
            jti: Some(Uuid::new_v4().to_string()),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
        })
    }

    fn verify_access(&self, token: &str) -> Result<AccessClaims, AuthError> {
        let claims = self.decode_checked(token, TYP_ACCESS)?;

        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;
        let role = claims
            .role
            .as_deref()
            .and_then(Role::parse)
            .ok_or_else(|| AuthError::InvalidToken("missing role claim".to_string()))?;

        Ok(AccessClaims {
            user_id,
            email: claims.email.unwrap_or_default(),
            role,
            exp: claims.exp,
        })
    }

    fn verify_refresh(&self, token: &str) -> Result<Uuid, AuthError> {
        let claims = self.decode_checked(token, TYP_REFRESH)?;
        Uuid::parse_str(&claims.sub).map_err(|e| AuthError::InvalidToken(e.to_string()))
    }

    fn access_ttl_seconds(&self) -> i64 {
        self.config.access_ttl_minutes * 60
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret-key".to_string(),
            ..Default::default()
        }
    }

    fn test_user(role: Role) -> User {
        let mut user = User::new("test@example.com".into(), "tester".into(), "hash".into());
        user.role = role;
        user
    }

    #[test]
    fn access_token_round_trips() {
        let service = JwtTokenService::new(test_config());
        let user = test_user(Role::Admin);

        let token = service.issue_access(&user).unwrap();
        let claims = service.verify_access(&token).unwrap();

        assert_eq!(claims.user_id, user.id);
        assert_eq!(claims.email, user.email);
        assert_eq!(claims.role, Role::Admin);
    }

    #[test]
    fn refresh_token_round_trips() {
        let service = JwtTokenService::new(test_config());
        let id = Uuid::new_v4();

        let token = service.issue_refresh(id).unwrap();
        assert_eq!(service.verify_refresh(&token).unwrap(), id);
    }

    #[test]
    fn refresh_tokens_are_unique_per_issue() {
        let service = JwtTokenService::new(test_config());
        let id = Uuid::new_v4();

        let first = service.issue_refresh(id).unwrap();
        let second = service.issue_refresh(id).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn token_types_are_not_interchangeable() {
        let service = JwtTokenService::new(test_config());
        let user = test_user(Role::User);

        let access = service.issue_access(&user).unwrap();
        let refresh = service.issue_refresh(user.id).unwrap();

        assert!(service.verify_refresh(&access).is_err());
        assert!(service.verify_access(&refresh).is_err());
    }

    #[test]
    fn garbage_token_is_rejected() {
        let service = JwtTokenService::new(test_config());
        assert!(matches!(
            service.verify_access("invalid-token"),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn wrong_issuer_is_rejected() {
        let issuer1 = JwtTokenService::new(JwtConfig {
            secret: "same-secret".to_string(),
            issuer: "issuer1".to_string(),
            ..Default::default()
        });
        let issuer2 = JwtTokenService::new(JwtConfig {
            secret: "same-secret".to_string(),
            issuer: "issuer2".to_string(),
            ..Default::default()
        });

        let token = issuer1.issue_access(&test_user(Role::User)).unwrap();
        assert!(issuer2.verify_access(&token).is_err());
    }

    #[test]
    fn ttl_is_reported_in_seconds() {
        let service = JwtTokenService::new(test_config());
        assert_eq!(service.access_ttl_seconds(), 15 * 60);
    }
}
