//! Blog post handlers.

use actix_web::{HttpResponse, web};
use serde::Deserialize;
use uuid::Uuid;

use devlog_shared::dto::{CreatePostRequest, PostQuery, UpdatePostRequest};
use devlog_shared::response::ApiResponse;

use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::AppResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    pub limit: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailQuery {
    pub increment_views: Option<bool>,
}

/// GET /api/blogs - public listing. Only an authenticated caller asking
/// for their own posts (or an admin) may see beyond published; everyone
/// else gets the published view regardless of the status filter.
pub async fn list(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    query: web::Query<PostQuery>,
) -> AppResult<HttpResponse> {
    let mut query = query.into_inner();
    let owner_view = identity
        .0
        .as_ref()
        .is_some_and(|id| id.role.is_admin() || query.author == Some(id.user_id));
    if !owner_view {
        query.status = Some("published".into());
    }
    let page = state.posts.list_posts(&query).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(page)))
}

/// POST /api/blogs - Protected route
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let post = state
        .posts
        .create_post(identity.user_id, identity.role, body.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::ok(post)))
}

/// GET /api/blogs/{id}?incrementViews= - detail read; leaves the view
/// counter alone unless the client opts in.
pub async fn get_by_id(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    query: web::Query<DetailQuery>,
) -> AppResult<HttpResponse> {
    let increment = query.increment_views.unwrap_or(false);
    let post = state.posts.get_post_by_id(*path, increment).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(post)))
}

/// GET /api/blogs/slug/{slug}?incrementViews= - the reader-facing detail
/// read; counts a view unless the client opts out.
pub async fn get_by_slug(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<DetailQuery>,
) -> AppResult<HttpResponse> {
    let increment = query.increment_views.unwrap_or(true);
    let post = state.posts.get_post_by_slug(&path, increment).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(post)))
}

/// PUT /api/blogs/{id} - Protected route
pub async fn update(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<UpdatePostRequest>,
) -> AppResult<HttpResponse> {
    let post = state
        .posts
        .update_post(*path, identity.user_id, identity.role, body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(post)))
}

/// DELETE /api/blogs/{id} - Protected route
pub async fn delete(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    state
        .posts
        .delete_post(*path, identity.user_id, identity.role)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message((), "post deleted")))
}

/// POST /api/blogs/{id}/like - public; published posts only.
pub async fn like(state: web::Data<AppState>, path: web::Path<Uuid>) -> AppResult<HttpResponse> {
    let post = state.posts.like_post(*path).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(post)))
}

/// GET /api/blogs/{id}/related
pub async fn related(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    query: web::Query<FeedQuery>,
) -> AppResult<HttpResponse> {
    let posts = state.posts.related_posts(*path, query.limit).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(posts)))
}

/// GET /api/blogs/featured
pub async fn featured(
    state: web::Data<AppState>,
    query: web::Query<FeedQuery>,
) -> AppResult<HttpResponse> {
    let posts = state.posts.featured_posts(query.limit).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(posts)))
}

/// GET /api/blogs/trending
pub async fn trending(
    state: web::Data<AppState>,
    query: web::Query<FeedQuery>,
) -> AppResult<HttpResponse> {
    let posts = state.posts.trending_posts(query.limit).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(posts)))
}

/// GET /api/user/blogs - Protected route; the caller's posts in any status.
pub async fn my_posts(
    state: web::Data<AppState>,
    identity: Identity,
    query: web::Query<PostQuery>,
) -> AppResult<HttpResponse> {
    let page = state.posts.user_posts(identity.user_id, &query).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(page)))
}
