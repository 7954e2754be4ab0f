//! Application state - shared across all handlers.

use std::sync::Arc;

use devlog_core::ports::{
    Cache, CategoryStore, ContentRenderer, PasswordService, PostStore, TokenService, UserStore,
};
use devlog_core::services::{AuthService, CategoryService, PostService};
use devlog_infra::auth::{Argon2PasswordService, JwtTokenService};
use devlog_infra::cache::InMemoryCache;
use devlog_infra::render::MarkdownRenderer;
use devlog_infra::store::{MemoryCategoryStore, MemoryPostStore, MemoryUserStore};

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub posts: Arc<PostService>,
    pub categories: Arc<CategoryService>,
    pub token_service: Arc<dyn TokenService>,
}

impl AppState {
    /// Wire the services to their adapters.
    pub fn new(config: &AppConfig) -> Self {
        let post_store: Arc<dyn PostStore> = Arc::new(MemoryPostStore::new());
        let category_store: Arc<dyn CategoryStore> = Arc::new(MemoryCategoryStore::new());
        let user_store: Arc<dyn UserStore> = Arc::new(MemoryUserStore::new());

        let cache: Arc<dyn Cache> = Arc::new(InMemoryCache::with_default_ttl(config.cache_ttl));
        let renderer: Arc<dyn ContentRenderer> = Arc::new(MarkdownRenderer::new());
        let token_service: Arc<dyn TokenService> = Arc::new(JwtTokenService::from_env());
        let password_service: Arc<dyn PasswordService> = Arc::new(Argon2PasswordService::new());

        let auth = Arc::new(AuthService::new(
            user_store.clone(),
            password_service,
            token_service.clone(),
            cache.clone(),
        ));
        let posts = Arc::new(PostService::new(
            post_store.clone(),
            category_store.clone(),
            user_store.clone(),
            renderer,
            cache.clone(),
        ));
        let categories = Arc::new(CategoryService::new(
            category_store,
            post_store,
            user_store,
            cache,
        ));

        tracing::info!("Application state initialized");

        Self {
            auth,
            posts,
            categories,
            token_service,
        }
    }
}
