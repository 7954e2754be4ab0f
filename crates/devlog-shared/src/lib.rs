//! # Devlog Shared
//!
//! Types shared between the API server and its clients: request DTOs,
//! client-facing response shapes, and the standard response envelopes.

pub mod dto;
pub mod response;

pub use response::{ApiResponse, ErrorResponse, PaginatedResponse};
