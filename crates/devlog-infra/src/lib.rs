//! # Devlog Infra
//!
//! Infrastructure adapters implementing the devlog-core ports: the
//! in-memory document store, the TTL cache, JWT tokens, Argon2 password
//! hashing and the markdown content renderer.

pub mod auth;
pub mod cache;
pub mod render;
pub mod store;

#[cfg(test)]
mod tests;
