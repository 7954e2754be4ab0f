//! Store ports - typed repositories over the document store.
//!
//! The store is an external collaborator. Implementations must enforce the
//! unique indexes themselves (slug, case-folded category name, user email
//! and username) and fail a violating write with
//! [`StoreError::Duplicate`](crate::StoreError::Duplicate): application-level
//! existence checks can race, the index cannot.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Category, Post, PostStatus, User};
use crate::error::StoreError;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Sortable post fields, the whitelist exposed to listing queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostSortField {
    CreatedAt,
    UpdatedAt,
    PublishedAt,
    Title,
    Views,
    Likes,
    ReadTime,
}

impl PostSortField {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "createdAt" => Some(Self::CreatedAt),
            "updatedAt" => Some(Self::UpdatedAt),
            "publishedAt" => Some(Self::PublishedAt),
            "title" => Some(Self::Title),
            "views" => Some(Self::Views),
            "likes" => Some(Self::Likes),
            "readTime" => Some(Self::ReadTime),
            _ => None,
        }
    }
}

/// One sort key; `find` takes a slice so trending can order by
/// (views desc, likes desc).
#[derive(Debug, Clone, Copy)]
pub struct PostSort {
    pub field: PostSortField,
    pub order: SortOrder,
}

impl PostSort {
    pub fn desc(field: PostSortField) -> Self {
        Self {
            field,
            order: SortOrder::Desc,
        }
    }

    pub fn asc(field: PostSortField) -> Self {
        Self {
            field,
            order: SortOrder::Asc,
        }
    }
}

/// Filter predicate for post queries. All present fields must match.
#[derive(Debug, Clone, Default)]
pub struct PostFilter {
    /// Free-text search over the text-indexed fields
    /// (title, content, excerpt).
    pub search: Option<String>,
    pub category_id: Option<Uuid>,
    /// Lowercase exact tag match.
    pub tag: Option<String>,
    pub status: Option<PostStatus>,
    pub author_id: Option<Uuid>,
    pub featured: Option<bool>,
    /// Excluded document, used by the related-posts query.
    pub exclude_id: Option<Uuid>,
}

/// Filter predicate for category queries.
#[derive(Debug, Clone, Default)]
pub struct CategoryFilter {
    /// Case-insensitive substring match on the name.
    pub search: Option<String>,
    pub is_active: Option<bool>,
}

/// Post collection.
#[async_trait]
pub trait PostStore: Send + Sync {
    async fn insert(&self, post: Post) -> Result<Post, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, StoreError>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, StoreError>;

    async fn find(
        &self,
        filter: &PostFilter,
        sort: &[PostSort],
        skip: u64,
        limit: u64,
    ) -> Result<Vec<Post>, StoreError>;

    async fn count(&self, filter: &PostFilter) -> Result<u64, StoreError>;

    /// Replace the stored document (last-write-wins).
    async fn update(&self, post: Post) -> Result<Post, StoreError>;

    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;

    /// Atomic at-least-once view increment; returns the new count.
    async fn increment_views(&self, id: Uuid) -> Result<u64, StoreError>;

    /// Atomic at-least-once like increment; returns the new count.
    async fn increment_likes(&self, id: Uuid) -> Result<u64, StoreError>;
}

/// Category collection.
#[async_trait]
pub trait CategoryStore: Send + Sync {
    async fn insert(&self, category: Category) -> Result<Category, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, StoreError>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, StoreError>;

    /// Case-insensitive name lookup, optionally excluding one document
    /// (the entity being renamed).
    async fn find_by_name(
        &self,
        name: &str,
        exclude_id: Option<Uuid>,
    ) -> Result<Option<Category>, StoreError>;

    /// List categories ordered by name.
    async fn find(
        &self,
        filter: &CategoryFilter,
        name_order: SortOrder,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<Category>, StoreError>;

    async fn count(&self, filter: &CategoryFilter) -> Result<u64, StoreError>;

    async fn update(&self, category: Category) -> Result<Category, StoreError>;

    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;
}

/// User collection.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert(&self, user: User) -> Result<User, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    async fn find_by_refresh_token(&self, token: &str) -> Result<Option<User>, StoreError>;

    async fn update(&self, user: User) -> Result<User, StoreError>;
}
