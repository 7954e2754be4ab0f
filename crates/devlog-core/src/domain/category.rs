use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Category entity. Name is unique case-insensitively; the slug derives
/// from it. The published-post count is computed on read, never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub created_by: Uuid,
    /// Inactive categories stay listable but reject new post assignment.
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Category {
    pub fn new(created_by: Uuid, name: String, description: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            slug: String::new(),
            description,
            created_by,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}
