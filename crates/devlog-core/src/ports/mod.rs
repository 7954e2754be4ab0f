//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod auth;
mod cache;
mod render;
mod store;

pub use auth::{AccessClaims, AuthError, PasswordService, TokenService};
pub use cache::{Cache, CacheError};
pub use render::{ContentRenderer, RenderedContent};
pub use store::{
    CategoryFilter, CategoryStore, PostFilter, PostSort, PostSortField, PostStore, SortOrder,
    UserStore,
};
