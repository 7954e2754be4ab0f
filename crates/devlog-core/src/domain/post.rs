use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Publication state of a post. Only published posts are visible on the
/// public read paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Draft,
    Published,
    Archived,
}

impl PostStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(Self::Draft),
            "published" => Some(Self::Published),
            "archived" => Some(Self::Archived),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
            Self::Archived => "archived",
        }
    }
}

/// Post entity - a blog article.
///
/// `slug`, `excerpt`, `read_time`, `published_at` and the meta fields are
/// derived by the prepare-for-persist step; `views` and `likes` only move
/// forward, through the store's atomic increments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    /// Sanitized HTML, rendered from the submitted markdown source.
    pub content: String,
    pub excerpt: String,
    pub featured_image: String,
    pub author_id: Uuid,
    pub category_id: Uuid,
    pub tags: Vec<String>,
    pub status: PostStatus,
    pub is_featured: bool,
    pub read_time: u32,
    pub views: u64,
    pub likes: u64,
    pub published_at: Option<DateTime<Utc>>,
    pub meta_title: String,
    pub meta_description: String,
    pub keywords: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Create a new draft-by-default post. Derived fields start empty and
    /// are filled in by the prepare step before the first persist.
    pub fn new(author_id: Uuid, category_id: Uuid, title: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title,
            slug: String::new(),
            content: String::new(),
            excerpt: String::new(),
            featured_image: String::new(),
            author_id,
            category_id,
            tags: Vec::new(),
            status: PostStatus::Draft,
            is_featured: false,
            read_time: 0,
            views: 0,
            likes: 0,
            published_at: None,
            meta_title: String::new(),
            meta_description: String::new(),
            keywords: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_published(&self) -> bool {
        self.status == PostStatus::Published
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips() {
        for s in ["draft", "published", "archived"] {
            assert_eq!(PostStatus::parse(s).unwrap().as_str(), s);
        }
        assert!(PostStatus::parse("deleted").is_none());
    }

    #[test]
    fn new_post_is_draft() {
        let post = Post::new(Uuid::new_v4(), Uuid::new_v4(), "Hello".into());
        assert_eq!(post.status, PostStatus::Draft);
        assert_eq!(post.views, 0);
        assert!(post.published_at.is_none());
    }
}
