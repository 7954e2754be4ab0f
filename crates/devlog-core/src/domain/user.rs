use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role of a user. Admins may mutate any content and delete categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Self::User),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

/// User entity. Email and username are unique; `refresh_token` holds the
/// currently valid (last rotated) refresh token, cleared on logout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub avatar: String,
    pub bio: String,
    pub role: Role,
    pub is_verified: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub refresh_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new unprivileged user with generated ID and timestamps.
    pub fn new(email: String, username: String, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email,
            username,
            password_hash,
            first_name: None,
            last_name: None,
            avatar: String::new(),
            bio: String::new(),
            role: Role::User,
            is_verified: false,
            last_login: None,
            refresh_token: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// "First Last", trimmed; `None` when both components are blank.
    pub fn full_name(&self) -> Option<String> {
        let name = format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or(""),
            self.last_name.as_deref().unwrap_or("")
        );
        let name = name.trim();
        if name.is_empty() {
            None
        } else {
            Some(name.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_name_trims_and_blanks() {
        let mut user = User::new("a@b.c".into(), "ab".into(), "hash".into());
        assert_eq!(user.full_name(), None);

        user.first_name = Some("Ada".into());
        assert_eq!(user.full_name(), Some("Ada".into()));

        user.last_name = Some("Lovelace".into());
        assert_eq!(user.full_name(), Some("Ada Lovelace".into()));

        user.first_name = Some("  ".into());
        user.last_name = Some(" ".into());
        assert_eq!(user.full_name(), None);
    }
}
