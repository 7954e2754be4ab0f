//! In-memory document store.
//!
//! One collection per entity behind an async RwLock. The unique indexes
//! the core relies on (post slug; category slug and case-folded name;
//! user email and username) are enforced here, on every insert and
//! update, so a racing writer gets `StoreError::Duplicate` exactly like
//! it would from a real document database. Counter increments take the
//! write lock, which makes them atomic within the process.

use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use devlog_core::StoreError;
use devlog_core::domain::{Category, Post, User};
use devlog_core::ports::{
    CategoryFilter, CategoryStore, PostFilter, PostSort, PostSortField, PostStore, SortOrder,
    UserStore,
};

// ---------------------------------------------------------------------------
// Posts
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryPostStore {
    posts: RwLock<HashMap<Uuid, Post>>,
}

impl MemoryPostStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn post_matches(post: &Post, filter: &PostFilter) -> bool {
    if let Some(exclude) = filter.exclude_id
        && post.id == exclude
    {
        return false;
    }
    if let Some(status) = filter.status
        && post.status != status
    {
        return false;
    }
    if let Some(category_id) = filter.category_id
        && post.category_id != category_id
    {
        return false;
    }
    if let Some(author_id) = filter.author_id
        && post.author_id != author_id
    {
        return false;
    }
    if let Some(featured) = filter.featured
        && post.is_featured != featured
    {
        return false;
    }
    if let Some(tag) = &filter.tag
        && !post.tags.iter().any(|t| t == tag)
    {
        return false;
    }
    if let Some(search) = &filter.search {
        // text search over the designated field set
        let needle = search.to_lowercase();
        let hit = post.title.to_lowercase().contains(&needle)
            || post.content.to_lowercase().contains(&needle)
            || post.excerpt.to_lowercase().contains(&needle);
        if !hit {
            return false;
        }
    }
    true
}

fn compare_posts(a: &Post, b: &Post, sort: &[PostSort]) -> Ordering {
    for key in sort {
        let ordering = match key.field {
            PostSortField::CreatedAt => a.created_at.cmp(&b.created_at),
            PostSortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
            // missing publishedAt sorts before any concrete date
            PostSortField::PublishedAt => a.published_at.cmp(&b.published_at),
            PostSortField::Title => a.title.cmp(&b.title),
            PostSortField::Views => a.views.cmp(&b.views),
            PostSortField::Likes => a.likes.cmp(&b.likes),
            PostSortField::ReadTime => a.read_time.cmp(&b.read_time),
        };
        let ordering = match key.order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

#[async_trait]
impl PostStore for MemoryPostStore {
    async fn insert(&self, post: Post) -> Result<Post, StoreError> {
        let mut posts = self.posts.write().await;
        if posts
            .values()
            .any(|existing| existing.slug == post.slug && existing.id != post.id)
        {
            return Err(StoreError::Duplicate("slug"));
        }
        posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, StoreError> {
        Ok(self.posts.read().await.get(&id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, StoreError> {
        Ok(self
            .posts
            .read()
            .await
            .values()
            .find(|post| post.slug == slug)
            .cloned())
    }

    async fn find(
        &self,
        filter: &PostFilter,
        sort: &[PostSort],
        skip: u64,
        limit: u64,
    ) -> Result<Vec<Post>, StoreError> {
        let posts = self.posts.read().await;
        let mut matched: Vec<Post> = posts
            .values()
            .filter(|post| post_matches(post, filter))
            .cloned()
            .collect();
        matched.sort_by(|a, b| compare_posts(a, b, sort));
        Ok(matched
            .into_iter()
            .skip(skip as usize)
            .take(limit as usize)
            .collect())
    }

    async fn count(&self, filter: &PostFilter) -> Result<u64, StoreError> {
        let posts = self.posts.read().await;
        Ok(posts.values().filter(|post| post_matches(post, filter)).count() as u64)
    }

    async fn update(&self, post: Post) -> Result<Post, StoreError> {
        let mut posts = self.posts.write().await;
        if !posts.contains_key(&post.id) {
            return Err(StoreError::NotFound);
        }
        if posts
            .values()
            .any(|existing| existing.slug == post.slug && existing.id != post.id)
        {
            return Err(StoreError::Duplicate("slug"));
        }
        posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let mut posts = self.posts.write().await;
        posts.remove(&id).map(|_| ()).ok_or(StoreError::NotFound)
    }

    async fn increment_views(&self, id: Uuid) -> Result<u64, StoreError> {
        let mut posts = self.posts.write().await;
        let post = posts.get_mut(&id).ok_or(StoreError::NotFound)?;
        post.views += 1;
        Ok(post.views)
    }

    async fn increment_likes(&self, id: Uuid) -> Result<u64, StoreError> {
        let mut posts = self.posts.write().await;
        let post = posts.get_mut(&id).ok_or(StoreError::NotFound)?;
        post.likes += 1;
        Ok(post.likes)
    }
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryCategoryStore {
    categories: RwLock<HashMap<Uuid, Category>>,
}

impl MemoryCategoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn category_matches(category: &Category, filter: &CategoryFilter) -> bool {
    if let Some(is_active) = filter.is_active
        && category.is_active != is_active
    {
        return false;
    }
    if let Some(search) = &filter.search
        && !category
            .name
            .to_lowercase()
            .contains(&search.to_lowercase())
    {
        return false;
    }
    true
}

#[async_trait]
impl CategoryStore for MemoryCategoryStore {
    async fn insert(&self, category: Category) -> Result<Category, StoreError> {
        let mut categories = self.categories.write().await;
        let name = category.name.to_lowercase();
        for existing in categories.values() {
            if existing.id == category.id {
                continue;
            }
            if existing.name.to_lowercase() == name {
                return Err(StoreError::Duplicate("name"));
            }
            if existing.slug == category.slug {
                return Err(StoreError::Duplicate("slug"));
            }
        }
        categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, StoreError> {
        Ok(self.categories.read().await.get(&id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, StoreError> {
        Ok(self
            .categories
            .read()
            .await
            .values()
            .find(|category| category.slug == slug)
            .cloned())
    }

    async fn find_by_name(
        &self,
        name: &str,
        exclude_id: Option<Uuid>,
    ) -> Result<Option<Category>, StoreError> {
        let name = name.to_lowercase();
        Ok(self
            .categories
            .read()
            .await
            .values()
            .find(|category| {
                category.name.to_lowercase() == name && Some(category.id) != exclude_id
            })
            .cloned())
    }

    async fn find(
        &self,
        filter: &CategoryFilter,
        name_order: SortOrder,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<Category>, StoreError> {
        let categories = self.categories.read().await;
        let mut matched: Vec<Category> = categories
            .values()
            .filter(|category| category_matches(category, filter))
            .cloned()
            .collect();
        matched.sort_by(|a, b| {
            let ordering = a.name.to_lowercase().cmp(&b.name.to_lowercase());
            match name_order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });
        Ok(matched
            .into_iter()
            .skip(skip as usize)
            .take(limit as usize)
            .collect())
    }

    async fn count(&self, filter: &CategoryFilter) -> Result<u64, StoreError> {
        let categories = self.categories.read().await;
        Ok(categories
            .values()
            .filter(|category| category_matches(category, filter))
            .count() as u64)
    }

    async fn update(&self, category: Category) -> Result<Category, StoreError> {
        let mut categories = self.categories.write().await;
        if !categories.contains_key(&category.id) {
            return Err(StoreError::NotFound);
        }
        let name = category.name.to_lowercase();
        for existing in categories.values() {
            if existing.id == category.id {
                continue;
            }
            if existing.name.to_lowercase() == name {
                return Err(StoreError::Duplicate("name"));
            }
            if existing.slug == category.slug {
                return Err(StoreError::Duplicate("slug"));
            }
        }
        categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let mut categories = self.categories.write().await;
        categories.remove(&id).map(|_| ()).ok_or(StoreError::NotFound)
    }
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<Uuid, User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn insert(&self, user: User) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        for existing in users.values() {
            if existing.id == user.id {
                continue;
            }
            if existing.email == user.email {
                return Err(StoreError::Duplicate("email"));
            }
            if existing.username == user.username {
                return Err(StoreError::Duplicate("username"));
            }
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|user| user.email == email)
            .cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|user| user.username == username)
            .cloned())
    }

    async fn find_by_refresh_token(&self, token: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|user| user.refresh_token.as_deref() == Some(token))
            .cloned())
    }

    async fn update(&self, user: User) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        if !users.contains_key(&user.id) {
            return Err(StoreError::NotFound);
        }
        for existing in users.values() {
            if existing.id == user.id {
                continue;
            }
            if existing.email == user.email {
                return Err(StoreError::Duplicate("email"));
            }
            if existing.username == user.username {
                return Err(StoreError::Duplicate("username"));
            }
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }
}
