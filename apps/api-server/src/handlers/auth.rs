//! Authentication handlers.

use actix_web::{HttpResponse, web};

use devlog_shared::dto::{LoginRequest, RefreshRequest, RegisterRequest};
use devlog_shared::response::ApiResponse;

use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// POST /api/auth/register
pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> AppResult<HttpResponse> {
    let session = state.auth.register(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(ApiResponse::ok(session)))
}

/// POST /api/auth/login
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let session = state.auth.login(body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(session)))
}

/// POST /api/auth/refresh-token
pub async fn refresh(
    state: web::Data<AppState>,
    body: web::Json<RefreshRequest>,
) -> AppResult<HttpResponse> {
    let tokens = state.auth.refresh(&body.refresh_token).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(tokens)))
}

/// POST /api/auth/logout - Protected route
pub async fn logout(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    state.auth.logout(identity.user_id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message((), "logged out")))
}

/// GET /api/auth/me - Protected route
pub async fn me(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    tracing::debug!(user = %identity.email, "profile lookup");
    let user = state.auth.current_user(identity.user_id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(user)))
}
