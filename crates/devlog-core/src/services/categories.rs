//! Category service - lifecycle of categories plus the delete guard
//! protecting referenced categories.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use devlog_shared::dto::{
    CategoryQuery, CategoryResponse, CreateCategoryRequest, UpdateCategoryRequest,
};
use devlog_shared::response::PaginatedResponse;

use crate::domain::{Category, PostStatus, Role, User};
use crate::error::DomainError;
use crate::ports::{Cache, CategoryFilter, CategoryStore, PostFilter, PostStore, SortOrder, UserStore};
use crate::services::Snapshots;
use crate::shape;
use crate::slug::unique_slug;

const DEFAULT_PAGE_SIZE: u64 = 10;
const MAX_PAGE_SIZE: u64 = 100;
const NAME_MIN_LEN: usize = 2;
const NAME_MAX_LEN: usize = 50;
const DESCRIPTION_MAX_LEN: usize = 200;

const LISTINGS_PREFIX: &str = "categories:";

fn category_key(id: Uuid) -> String {
    format!("category:{id}")
}

fn category_slug_key(slug: &str) -> String {
    format!("category:slug:{slug}")
}

pub struct CategoryService {
    categories: Arc<dyn CategoryStore>,
    posts: Arc<dyn PostStore>,
    users: Arc<dyn UserStore>,
    snapshots: Snapshots,
}

impl CategoryService {
    pub fn new(
        categories: Arc<dyn CategoryStore>,
        posts: Arc<dyn PostStore>,
        users: Arc<dyn UserStore>,
        cache: Arc<dyn Cache>,
    ) -> Self {
        Self {
            categories,
            posts,
            users,
            snapshots: Snapshots::new(cache),
        }
    }

    pub async fn create_category(
        &self,
        user_id: Uuid,
        data: CreateCategoryRequest,
    ) -> Result<CategoryResponse, DomainError> {
        let name = data.name.trim().to_string();
        validate_name(&name)?;
        let description = data.description.unwrap_or_default().trim().to_string();
        validate_description(&description)?;

        if self.categories.find_by_name(&name, None).await?.is_some() {
            return Err(DomainError::Conflict(
                "category with this name already exists".into(),
            ));
        }

        let mut category = Category::new(user_id, name, description);
        category.slug = self.next_slug(&category.name, None).await?;

        // unique name index backstops the racy existence check above
        let category = self.categories.insert(category).await?;

        self.snapshots.remove_prefix(LISTINGS_PREFIX).await;

        tracing::info!(category_id = %category.id, name = %category.name, creator = %user_id, "category created");
        self.shape_category(&category).await
    }

    pub async fn get_category_by_id(&self, id: Uuid) -> Result<CategoryResponse, DomainError> {
        let key = category_key(id);
        if let Some(cached) = self.snapshots.get::<CategoryResponse>(&key).await {
            return Ok(cached);
        }

        let category = self
            .categories
            .find_by_id(id)
            .await?
            .ok_or(DomainError::not_found("category"))?;

        let response = self.shape_category(&category).await?;
        self.snapshots.put(&key, &response, None).await;
        Ok(response)
    }

    pub async fn get_category_by_slug(&self, slug: &str) -> Result<CategoryResponse, DomainError> {
        let key = category_slug_key(slug);
        if let Some(cached) = self.snapshots.get::<CategoryResponse>(&key).await {
            return Ok(cached);
        }

        let category = self
            .categories
            .find_by_slug(slug)
            .await?
            .ok_or(DomainError::not_found("category"))?;

        let response = self.shape_category(&category).await?;
        self.snapshots.put(&key, &response, None).await;
        Ok(response)
    }

    /// Paged listing; inactive categories remain listable.
    pub async fn list_categories(
        &self,
        query: &CategoryQuery,
    ) -> Result<PaginatedResponse<CategoryResponse>, DomainError> {
        let key = format!("{LISTINGS_PREFIX}{}", query.cache_token());
        if let Some(cached) = self
            .snapshots
            .get::<PaginatedResponse<CategoryResponse>>(&key)
            .await
        {
            return Ok(cached);
        }

        let filter = CategoryFilter {
            search: query.search.clone(),
            is_active: query.is_active,
        };
        let order = match query.sort_order.as_deref() {
            None | Some("asc") => SortOrder::Asc,
            Some("desc") => SortOrder::Desc,
            Some(other) => {
                return Err(DomainError::Validation(format!(
                    "unknown sort order `{other}`"
                )));
            }
        };

        let page = query.page.unwrap_or(1).max(1);
        let limit = query
            .limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);
        let skip = page.saturating_sub(1).saturating_mul(limit);

        let categories = self.categories.find(&filter, order, skip, limit).await?;
        let total = self.categories.count(&filter).await?;

        let mut data = Vec::with_capacity(categories.len());
        for category in &categories {
            data.push(self.shape_category(category).await?);
        }

        let result = PaginatedResponse::new(data, total, page, limit);
        self.snapshots.put(&key, &result, None).await;
        Ok(result)
    }

    pub async fn update_category(
        &self,
        id: Uuid,
        requester_id: Uuid,
        requester_role: Role,
        patch: UpdateCategoryRequest,
    ) -> Result<CategoryResponse, DomainError> {
        let mut category = self
            .categories
            .find_by_id(id)
            .await?
            .ok_or(DomainError::not_found("category"))?;

        authorize_creator(&category, requester_id, requester_role)?;

        let old_slug = category.slug.clone();

        if let Some(name) = patch.name {
            let name = name.trim().to_string();
            validate_name(&name)?;
            if name != category.name {
                if self
                    .categories
                    .find_by_name(&name, Some(id))
                    .await?
                    .is_some()
                {
                    return Err(DomainError::Conflict(
                        "category with this name already exists".into(),
                    ));
                }
                category.slug = self.next_slug(&name, Some(id)).await?;
                category.name = name;
            }
        }
        if let Some(description) = patch.description {
            let description = description.trim().to_string();
            validate_description(&description)?;
            category.description = description;
        }
        category.updated_at = Utc::now();

        let category = self.categories.update(category).await?;

        self.invalidate(&category, &old_slug).await;

        tracing::info!(category_id = %id, requester = %requester_id, "category updated");
        self.shape_category(&category).await
    }

    /// Admin-only. Refused while any post, in any status, still
    /// references the category.
    pub async fn delete_category(
        &self,
        id: Uuid,
        requester_id: Uuid,
        requester_role: Role,
    ) -> Result<(), DomainError> {
        let category = self
            .categories
            .find_by_id(id)
            .await?
            .ok_or(DomainError::not_found("category"))?;

        if !requester_role.is_admin() {
            return Err(DomainError::Forbidden("only admins may delete categories"));
        }

        let referencing = self
            .posts
            .count(&PostFilter {
                category_id: Some(id),
                ..Default::default()
            })
            .await?;
        if referencing > 0 {
            return Err(DomainError::Conflict(
                "cannot delete a category with existing posts".into(),
            ));
        }

        self.categories.delete(id).await?;

        self.invalidate(&category, &category.slug).await;

        tracing::info!(category_id = %id, requester = %requester_id, "category deleted");
        Ok(())
    }

    /// Flip `is_active`. Referencing posts are left untouched; an
    /// inactive category only refuses new assignments.
    pub async fn toggle_active(
        &self,
        id: Uuid,
        requester_id: Uuid,
        requester_role: Role,
    ) -> Result<CategoryResponse, DomainError> {
        let mut category = self
            .categories
            .find_by_id(id)
            .await?
            .ok_or(DomainError::not_found("category"))?;

        authorize_creator(&category, requester_id, requester_role)?;

        category.is_active = !category.is_active;
        category.updated_at = Utc::now();
        let category = self.categories.update(category).await?;

        self.invalidate(&category, &category.slug).await;

        tracing::info!(category_id = %id, active = category.is_active, "category toggled");
        self.shape_category(&category).await
    }

    // -- internals ----------------------------------------------------------

    async fn next_slug(
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

    async fn invalidate(&self, category: &Category, old_slug: &str) {
        self.snapshots.remove(&category_key(category.id)).await;
        self.snapshots.remove(&category_slug_key(old_slug)).await;
        if category.slug != old_slug {
            self.snapshots
                .remove(&category_slug_key(&category.slug))
                .await;
        }
        self.snapshots.remove_prefix(LISTINGS_PREFIX).await;
    }

    async fn shape_category(&self, category: &Category) -> Result<CategoryResponse, DomainError> {
        let creator: User = self
            .users
            .find_by_id(category.created_by)
            .await?
            .ok_or_else(|| {
                DomainError::Integrity(format!(
                    "category {} references missing creator {}",
                    category.id, category.created_by
                ))
            })?;

        let blog_count = self
            .posts
            .count(&PostFilter {
                category_id: Some(category.id),
                status: Some(PostStatus::Published),
                ..Default::default()
            })
            .await?;

        Ok(shape::category_response(category, &creator, blog_count))
    }
}

fn authorize_creator(
    category: &Category,
    requester_id: Uuid,
    role: Role,
) -> Result<(), DomainError> {
    if role.is_admin() || category.created_by == requester_id {
        Ok(())
    } else {
        Err(DomainError::Forbidden(
            "only the creator or an admin may modify this category",
        ))
    }
}

fn validate_name(name: &str) -> Result<(), DomainError> {
    let len = name.chars().count();
    if !(NAME_MIN_LEN..=NAME_MAX_LEN).contains(&len) {
        return Err(DomainError::Validation(format!(
            "category name must be {NAME_MIN_LEN}-{NAME_MAX_LEN} characters"
        )));
    }
    Ok(())
}

fn validate_description(description: &str) -> Result<(), DomainError> {
    if description.chars().count() > DESCRIPTION_MAX_LEN {
        return Err(DomainError::Validation(format!(
            "description cannot exceed {DESCRIPTION_MAX_LEN} characters"
        )));
    }
    Ok(())
}
