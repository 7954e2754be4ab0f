//! Category handlers.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use devlog_shared::dto::{CategoryQuery, CreateCategoryRequest, UpdateCategoryRequest};
use devlog_shared::response::ApiResponse;

use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/categories
pub async fn list(
    state: web::Data<AppState>,
    query: web::Query<CategoryQuery>,
) -> AppResult<HttpResponse> {
    let page = state.categories.list_categories(&query).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(page)))
}

/// POST /api/categories - Protected route
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreateCategoryRequest>,
) -> AppResult<HttpResponse> {
    let category = state
        .categories
        .create_category(identity.user_id, body.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::ok(category)))
}

/// GET /api/categories/{id}
pub async fn get_by_id(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let category = state.categories.get_category_by_id(*path).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(category)))
}

/// GET /api/categories/slug/{slug}
pub async fn get_by_slug(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let category = state.categories.get_category_by_slug(&path).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(category)))
}

/// PUT /api/categories/{id} - Protected route
pub async fn update(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<UpdateCategoryRequest>,
) -> AppResult<HttpResponse> {
    let category = state
        .categories
        .update_category(*path, identity.user_id, identity.role, body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(category)))
}

/// DELETE /api/categories/{id} - Protected route, admin only.
pub async fn delete(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    state
        .categories
        .delete_category(*path, identity.user_id, identity.role)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message((), "category deleted")))
}

/// PATCH /api/categories/{id}/toggle - Protected route
pub async fn toggle(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let category = state
        .categories
        .toggle_active(*path, identity.user_id, identity.role)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(category)))
}
