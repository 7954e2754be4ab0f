//! # Devlog Core
//!
//! The domain layer of the Devlog publishing backend.
//! This crate contains pure business logic with zero infrastructure
//! dependencies: entities, ports, slug generation, the prepare-for-persist
//! derivation step, response shaping, and the post/category/auth services.

pub mod domain;
pub mod error;
pub mod ports;
pub mod services;
pub mod shape;
pub mod slug;

pub use error::{DomainError, StoreError};
