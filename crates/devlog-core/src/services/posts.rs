//! Post service - the write/read orchestration around the post
//! collection: category resolution, slug generation, prepare-for-persist,
//! cache invalidation and response shaping.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use devlog_shared::dto::{CreatePostRequest, PostQuery, PostResponse, UpdatePostRequest};
use devlog_shared::response::PaginatedResponse;

use crate::domain::{Category, Post, PostStatus, Role, User};
use crate::error::DomainError;
use crate::ports::{
    Cache, CategoryStore, ContentRenderer, PostFilter, PostSort, PostSortField, PostStore,
    SortOrder, UserStore,
};
use crate::services::{FEATURED_TTL, SHORT_TTL, Snapshots, prepare};
use crate::shape;
use crate::slug::unique_slug;

const DEFAULT_PAGE_SIZE: u64 = 10;
const MAX_PAGE_SIZE: u64 = 100;
const DEFAULT_RELATED_LIMIT: u64 = 5;
const DEFAULT_FEED_LIMIT: u64 = 10;
const TITLE_MIN_LEN: usize = 5;
const TITLE_MAX_LEN: usize = 200;

/// Cache key for a single post by id.
fn post_key(id: Uuid) -> String {
    format!("post:{id}")
}

fn post_slug_key(slug: &str) -> String {
    format!("post:slug:{slug}")
}

/// Prefix shared by every post listing (paged lists, featured, trending).
const LISTINGS_PREFIX: &str = "posts:";

fn author_listings_prefix(author_id: Uuid) -> String {
    format!("author:{author_id}:posts:")
}

fn category_listings_prefix(category_id: Uuid) -> String {
    format!("category:{category_id}:posts:")
}

pub struct PostService {
    posts: Arc<dyn PostStore>,
    categories: Arc<dyn CategoryStore>,
    users: Arc<dyn UserStore>,
    renderer: Arc<dyn ContentRenderer>,
    snapshots: Snapshots,
}

impl PostService {
    pub fn new(
        posts: Arc<dyn PostStore>,
        categories: Arc<dyn CategoryStore>,
        users: Arc<dyn UserStore>,
        renderer: Arc<dyn ContentRenderer>,
        cache: Arc<dyn Cache>,
    ) -> Self {
        Self {
            posts,
            categories,
            users,
            renderer,
            snapshots: Snapshots::new(cache),
        }
    }

    // -- write path ---------------------------------------------------------

    pub async fn create_post(
        &self,
        author_id: Uuid,
        author_role: Role,
        data: CreatePostRequest,
    ) -> Result<PostResponse, DomainError> {
        let title = data.title.trim().to_string();
        validate_title(&title)?;
        if data.content.trim().is_empty() {
            return Err(DomainError::Validation("content is required".into()));
        }

        let category = self
            .resolve_category(author_id, data.category_id, data.category_name.as_deref())
            .await?;

        let mut post = Post::new(author_id, category.id, title);
        post.tags = prepare::normalize_tags(&data.tags)?;
        post.featured_image = data.featured_image.unwrap_or_default();
        post.is_featured = data.is_featured.unwrap_or(false);
        post.keywords = data.keywords;
        post.meta_title = data.meta_title.unwrap_or_default();
        post.meta_description = data.meta_description.unwrap_or_default();
        if let Some(excerpt) = data.excerpt {
            prepare::validate_excerpt(&excerpt)?;
            post.excerpt = excerpt;
        }

        let status = match data.status.as_deref() {
            Some(raw) => {
                let status = parse_status(raw)?;
                if status == PostStatus::Archived && !author_role.is_admin() {
                    return Err(DomainError::Forbidden(
                        "only admins may create archived posts",
                    ));
                }
                status
            }
            None => PostStatus::Draft,
        };

        let rendered = self.renderer.render(&data.content);
        prepare::apply_content(&mut post, &rendered);
        prepare::apply_status(&mut post, status);
        prepare::apply_meta_defaults(&mut post);

        post.slug = self.next_post_slug(&post.title, None).await?;

        // the store's unique slug index is the backstop for the race two
        // concurrent creates with the same title can win
        let post = self.posts.insert(post).await?;

        self.invalidate_listings(&post).await;

        tracing::info!(post_id = %post.id, slug = %post.slug, author = %author_id, "post created");
        self.shape_post(&post).await
    }

    pub async fn update_post(
        &self,
        id: Uuid,
        requester_id: Uuid,
        requester_role: Role,
        patch: UpdatePostRequest,
    ) -> Result<PostResponse, DomainError> {
        let mut post = self
            .posts
            .find_by_id(id)
            .await?
            .ok_or(DomainError::not_found("post"))?;

        authorize_author(&post, requester_id, requester_role)?;

        let old_slug = post.slug.clone();
        let old_category = post.category_id;

        if let Some(category_id) = patch.category_id {
            let category = self
                .categories
                .find_by_id(category_id)
                .await?
                .ok_or_else(|| DomainError::Validation("category not found".into()))?;
            if !category.is_active {
                return Err(DomainError::Validation("category is not active".into()));
            }
            post.category_id = category.id;
        }

        if let Some(title) = patch.title {
            let title = title.trim().to_string();
            validate_title(&title)?;
            if title != post.title {
                post.title = title;
                post.slug = self.next_post_slug(&post.title, Some(post.id)).await?;
            }
        }

        if let Some(excerpt) = patch.excerpt {
            prepare::validate_excerpt(&excerpt)?;
            post.excerpt = excerpt;
        }
        if let Some(content) = patch.content {
            let rendered = self.renderer.render(&content);
            prepare::apply_content(&mut post, &rendered);
        }
        if let Some(tags) = patch.tags {
            post.tags = prepare::normalize_tags(&tags)?;
        }
        if let Some(image) = patch.featured_image {
            post.featured_image = image;
        }
        if let Some(featured) = patch.is_featured {
            post.is_featured = featured;
        }
        if let Some(meta_title) = patch.meta_title {
            post.meta_title = meta_title;
        }
        if let Some(meta_description) = patch.meta_description {
            post.meta_description = meta_description;
        }
        if let Some(keywords) = patch.keywords {
            post.keywords = keywords;
        }
        if let Some(raw) = patch.status.as_deref() {
            prepare::apply_status(&mut post, parse_status(raw)?);
        }
        prepare::apply_meta_defaults(&mut post);
        post.updated_at = Utc::now();

        let post = self.posts.update(post).await?;

        self.snapshots.remove(&post_key(post.id)).await;
        self.snapshots.remove(&post_slug_key(&old_slug)).await;
        if post.slug != old_slug {
            self.snapshots.remove(&post_slug_key(&post.slug)).await;
        }
        self.snapshots.remove_prefix(LISTINGS_PREFIX).await;
        self.snapshots
            .remove_prefix(&author_listings_prefix(post.author_id))
            .await;
        self.snapshots
            .remove_prefix(&category_listings_prefix(old_category))
            .await;
        if post.category_id != old_category {
            self.snapshots
                .remove_prefix(&category_listings_prefix(post.category_id))
                .await;
        }

        tracing::info!(post_id = %post.id, requester = %requester_id, "post updated");
        self.shape_post(&post).await
    }

    pub async fn delete_post(
        &self,
        id: Uuid,
        requester_id: Uuid,
        requester_role: Role,
    ) -> Result<(), DomainError> {
        let post = self
            .posts
            .find_by_id(id)
            .await?
            .ok_or(DomainError::not_found("post"))?;

        authorize_author(&post, requester_id, requester_role)?;

        self.posts.delete(id).await?;

        self.snapshots.remove(&post_key(post.id)).await;
        self.snapshots.remove(&post_slug_key(&post.slug)).await;
        self.invalidate_listings(&post).await;

        tracing::info!(post_id = %id, requester = %requester_id, "post deleted");
        Ok(())
    }

    /// Public like endpoint. At-least-once increment, published posts
    /// only. Author/category listings are deliberately left cached: a
    /// like count going momentarily stale there is an accepted trade-off.
    pub async fn like_post(&self, id: Uuid) -> Result<PostResponse, DomainError> {
        let mut post = self
            .posts
            .find_by_id(id)
            .await?
            .ok_or(DomainError::not_found("post"))?;

        if !post.is_published() {
            return Err(DomainError::Validation(
                "cannot like an unpublished post".into(),
            ));
        }

        post.likes = self.posts.increment_likes(id).await?;

        self.snapshots.remove(&post_key(post.id)).await;
        self.snapshots.remove(&post_slug_key(&post.slug)).await;
        self.snapshots.remove_prefix(LISTINGS_PREFIX).await;

        self.shape_post(&post).await
    }

    // -- read path ----------------------------------------------------------

    /// Public read by id. Only published posts are visible here; drafts
    /// and archived posts answer NotFound no matter who asks.
    pub async fn get_post_by_id(
        &self,
        id: Uuid,
        increment_views: bool,
    ) -> Result<PostResponse, DomainError> {
        let key = post_key(id);
        if !increment_views
            && let Some(cached) = self.snapshots.get::<PostResponse>(&key).await
        {
            return Ok(cached);
        }

        let mut post = self
            .posts
            .find_by_id(id)
            .await?
            .ok_or(DomainError::not_found("post"))?;
        if !post.is_published() {
            return Err(DomainError::not_found("post"));
        }

        if increment_views {
            post.views = self.posts.increment_views(id).await?;
            self.snapshots.remove(&key).await;
        }

        let response = self.shape_post(&post).await?;
        if !increment_views {
            self.snapshots.put(&key, &response, None).await;
        }
        Ok(response)
    }

    /// Public read by slug; same visibility rule as the id path.
    pub async fn get_post_by_slug(
        &self,
        slug: &str,
        increment_views: bool,
    ) -> Result<PostResponse, DomainError> {
        let key = post_slug_key(slug);
        if !increment_views
            && let Some(cached) = self.snapshots.get::<PostResponse>(&key).await
        {
            return Ok(cached);
        }

        let mut post = self
            .posts
            .find_by_slug(slug)
            .await?
            .ok_or(DomainError::not_found("post"))?;
        if !post.is_published() {
            return Err(DomainError::not_found("post"));
        }

        if increment_views {
            post.views = self.posts.increment_views(post.id).await?;
            self.snapshots.remove(&key).await;
        }

        let response = self.shape_post(&post).await?;
        if !increment_views {
            self.snapshots.put(&key, &response, None).await;
        }
        Ok(response)
    }

    /// Paged listing. Without an author filter only published posts are
    /// returned; an explicit author filter is the owner-visibility path.
    pub async fn list_posts(
        &self,
        query: &PostQuery,
    ) -> Result<PaginatedResponse<PostResponse>, DomainError> {
        let key = format!("posts:list:{}", query.cache_token());
        if let Some(cached) = self
            .snapshots
            .get::<PaginatedResponse<PostResponse>>(&key)
            .await
        {
            return Ok(cached);
        }

        let result = self.fetch_page(query).await?;
        self.snapshots.put(&key, &result, None).await;
        Ok(result)
    }

    /// The "my posts" path: the caller's own posts in any status.
    pub async fn user_posts(
        &self,
        user_id: Uuid,
        query: &PostQuery,
    ) -> Result<PaginatedResponse<PostResponse>, DomainError> {
        let mut query = query.clone();
        query.author = Some(user_id);

        let key = format!(
            "{}{}",
            author_listings_prefix(user_id),
            query.cache_token()
        );
        if let Some(cached) = self
            .snapshots
            .get::<PaginatedResponse<PostResponse>>(&key)
            .await
        {
            return Ok(cached);
        }

        let result = self.fetch_page(&query).await?;
        self.snapshots.put(&key, &result, None).await;
        Ok(result)
    }

    /// Published posts sharing the category, newest first, self excluded.
    pub async fn related_posts(
        &self,
        id: Uuid,
        limit: Option<u64>,
    ) -> Result<Vec<PostResponse>, DomainError> {
        let post = self
            .posts
            .find_by_id(id)
            .await?
            .ok_or(DomainError::not_found("post"))?;

        let limit = limit.unwrap_or(DEFAULT_RELATED_LIMIT).clamp(1, MAX_PAGE_SIZE);
        let key = format!(
            "{}related:{id}:{limit}",
            category_listings_prefix(post.category_id)
        );
        if let Some(cached) = self.snapshots.get::<Vec<PostResponse>>(&key).await {
            return Ok(cached);
        }

        let filter = PostFilter {
            category_id: Some(post.category_id),
            status: Some(PostStatus::Published),
            exclude_id: Some(id),
            ..Default::default()
        };
        let sort = [PostSort::desc(PostSortField::CreatedAt)];
        let related = self.posts.find(&filter, &sort, 0, limit).await?;

        let result = self.shape_posts(related).await?;
        self.snapshots.put(&key, &result, Some(SHORT_TTL)).await;
        Ok(result)
    }

    pub async fn featured_posts(
        &self,
        limit: Option<u64>,
    ) -> Result<Vec<PostResponse>, DomainError> {
        let limit = limit.unwrap_or(DEFAULT_FEED_LIMIT).clamp(1, MAX_PAGE_SIZE);
        let key = format!("posts:featured:{limit}");
        if let Some(cached) = self.snapshots.get::<Vec<PostResponse>>(&key).await {
            return Ok(cached);
        }

        let filter = PostFilter {
            featured: Some(true),
            status: Some(PostStatus::Published),
            ..Default::default()
        };
        let sort = [PostSort::desc(PostSortField::PublishedAt)];
        let posts = self.posts.find(&filter, &sort, 0, limit).await?;

        let result = self.shape_posts(posts).await?;
        self.snapshots.put(&key, &result, Some(FEATURED_TTL)).await;
        Ok(result)
    }

    pub async fn trending_posts(
        &self,
        limit: Option<u64>,
    ) -> Result<Vec<PostResponse>, DomainError> {
        let limit = limit.unwrap_or(DEFAULT_FEED_LIMIT).clamp(1, MAX_PAGE_SIZE);
        let key = format!("posts:trending:{limit}");
        if let Some(cached) = self.snapshots.get::<Vec<PostResponse>>(&key).await {
            return Ok(cached);
        }

        let filter = PostFilter {
            status: Some(PostStatus::Published),
            ..Default::default()
        };
        let sort = [
            PostSort::desc(PostSortField::Views),
            PostSort::desc(PostSortField::Likes),
        ];
        let posts = self.posts.find(&filter, &sort, 0, limit).await?;

        let result = self.shape_posts(posts).await?;
        self.snapshots.put(&key, &result, Some(SHORT_TTL)).await;
        Ok(result)
    }

    // -- internals ----------------------------------------------------------

    async fn fetch_page(
        &self,
        query: &PostQuery,
    ) -> Result<PaginatedResponse<PostResponse>, DomainError> {
        let filter = build_filter(query)?;
        let sort = [build_sort(query)?];

        let page = query.page.unwrap_or(1).max(1);
        let limit = query
            .limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);
        // saturate on absurd page numbers; the skip lands past the
        // collection and the page comes back empty
        let skip = page.saturating_sub(1).saturating_mul(limit);

        let posts = self.posts.find(&filter, &sort, skip, limit).await?;
        let total = self.posts.count(&filter).await?;

        let data = self.shape_posts(posts).await?;
        Ok(PaginatedResponse::new(data, total, page, limit))
    }

    /// Resolve the target category for a create: an explicit id must
    /// reference an existing active category; a bare name reuses the
    /// active case-insensitive match or creates the category on the fly.
    async fn resolve_category(
        &self,
        author_id: Uuid,
        category_id: Option<Uuid>,
        category_name: Option<&str>,
    ) -> Result<Category, DomainError> {
        if category_id.is_none()
            && let Some(name) = category_name
        {
            let name = name.trim();
            if let Some(existing) = self.categories.find_by_name(name, None).await?
                && existing.is_active
            {
                return Ok(existing);
            }

            let mut category = Category::new(author_id, name.to_string(), String::new());
            category.slug = self.next_category_slug(name, None).await?;
            // an inactive category of the same name still owns the unique
            // name index, surfacing as a conflict here
            let category = self.categories.insert(category).await?;
            self.snapshots.remove_prefix("categories:").await;
            tracing::info!(category_id = %category.id, name = %category.name, "category auto-created");
            return Ok(category);
        }

        let category_id =
            category_id.ok_or_else(|| DomainError::Validation("category is required".into()))?;
        let category = self
            .categories
            .find_by_id(category_id)
            .await?
            .ok_or_else(|| DomainError::Validation("category not found".into()))?;
        if !category.is_active {
            return Err(DomainError::Validation("category is not active".into()));
        }
        Ok(category)
    }

    async fn next_post_slug(
        &self,
        title: &str,
        exclude_id: Option<Uuid>,
    ) -> Result<String, DomainError> {
        let posts = Arc::clone(&self.posts);
        let slug = unique_slug(title, exclude_id, move |candidate| {
            let posts = Arc::clone(&posts);
            async move {
                posts
                    .find_by_slug(&candidate)
                    .await
                    .map(|found| found.map(|p| p.id))
            }
        })
        .await?;
        Ok(slug)
    }

    async fn next_category_slug(
        &self,
        name: &str,
        exclude_id: Option<Uuid>,
    ) -> Result<String, DomainError> {
        let categories = Arc::clone(&self.categories);
        let slug = unique_slug(name, exclude_id, move |candidate| {
            let categories = Arc::clone(&categories);
            async move {
                categories
                    .find_by_slug(&candidate)
                    .await
                    .map(|found| found.map(|c| c.id))
            }
        })
        .await?;
        Ok(slug)
    }

    async fn invalidate_listings(&self, post: &Post) {
        self.snapshots.remove_prefix(LISTINGS_PREFIX).await;
        self.snapshots
            .remove_prefix(&author_listings_prefix(post.author_id))
            .await;
        self.snapshots
            .remove_prefix(&category_listings_prefix(post.category_id))
            .await;
    }

    async fn shape_post(&self, post: &Post) -> Result<PostResponse, DomainError> {
        let (author, category) = self.resolve_relations(post).await?;
        Ok(shape::post_response(post, &author, &category))
    }

    /// Shape a batch, memoizing relation lookups across the page.
    async fn shape_posts(&self, posts: Vec<Post>) -> Result<Vec<PostResponse>, DomainError> {
        let mut authors: HashMap<Uuid, User> = HashMap::new();
        let mut categories: HashMap<Uuid, Category> = HashMap::new();
        let mut shaped = Vec::with_capacity(posts.len());

        for post in &posts {
            if !authors.contains_key(&post.author_id) {
                let author = self.users.find_by_id(post.author_id).await?.ok_or_else(|| {
                    dangling(post.id, "author", post.author_id)
                })?;
                authors.insert(post.author_id, author);
            }
            if !categories.contains_key(&post.category_id) {
                let category = self
                    .categories
                    .find_by_id(post.category_id)
                    .await?
                    .ok_or_else(|| dangling(post.id, "category", post.category_id))?;
                categories.insert(post.category_id, category);
            }
            shaped.push(shape::post_response(
                post,
                &authors[&post.author_id],
                &categories[&post.category_id],
            ));
        }
        Ok(shaped)
    }

    async fn resolve_relations(&self, post: &Post) -> Result<(User, Category), DomainError> {
        let author = self
            .users
            .find_by_id(post.author_id)
            .await?
            .ok_or_else(|| dangling(post.id, "author", post.author_id))?;
        let category = self
            .categories
            .find_by_id(post.category_id)
            .await?
            .ok_or_else(|| dangling(post.id, "category", post.category_id))?;
        Ok((author, category))
    }
}

/// A stored post pointing at a missing relation is corrupted state, not a
/// miss - fail loudly instead of emitting a null nested object.
fn dangling(post_id: Uuid, relation: &str, target: Uuid) -> DomainError {
    DomainError::Integrity(format!(
        "post {post_id} references missing {relation} {target}"
    ))
}

fn authorize_author(post: &Post, requester_id: Uuid, role: Role) -> Result<(), DomainError> {
    if role.is_admin() || post.author_id == requester_id {
        Ok(())
    } else {
        Err(DomainError::Forbidden(
            "only the author or an admin may modify this post",
        ))
    }
}

fn validate_title(title: &str) -> Result<(), DomainError> {
    let len = title.chars().count();
    if !(TITLE_MIN_LEN..=TITLE_MAX_LEN).contains(&len) {
        return Err(DomainError::Validation(format!(
            "title must be {TITLE_MIN_LEN}-{TITLE_MAX_LEN} characters"
        )));
    }
    Ok(())
}

fn parse_status(raw: &str) -> Result<PostStatus, DomainError> {
    PostStatus::parse(raw)
        .ok_or_else(|| DomainError::Validation(format!("unknown status `{raw}`")))
}

/// Build the store filter from a listing query. Public queries (no author
/// filter) see published posts only.
fn build_filter(query: &PostQuery) -> Result<PostFilter, DomainError> {
    let status = match query.status.as_deref() {
        Some(raw) => Some(parse_status(raw)?),
        None if query.author.is_none() => Some(PostStatus::Published),
        None => None,
    };

    Ok(PostFilter {
        search: query.search.clone(),
        category_id: query.category,
        tag: query.tag.as_deref().map(|t| t.trim().to_lowercase()),
        status,
        author_id: query.author,
        featured: query.featured,
        exclude_id: None,
    })
}

fn build_sort(query: &PostQuery) -> Result<PostSort, DomainError> {
    let field = match query.sort_by.as_deref() {
        None => PostSortField::CreatedAt,
        Some(raw) => PostSortField::parse(raw)
            .ok_or_else(|| DomainError::Validation(format!("cannot sort by `{raw}`")))?,
    };
    let order = match query.sort_order.as_deref() {
        None | Some("desc") => SortOrder::Desc,
        Some("asc") => SortOrder::Asc,
        Some(other) => {
            return Err(DomainError::Validation(format!(
                "unknown sort order `{other}`"
            )));
        }
    };
    Ok(PostSort { field, order })
}
