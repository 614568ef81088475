//! # twoem-api
//!
//! HTTP API layer for the TWOEM portal built on Axum.
//!
//! Provides the REST endpoints under `/api`, the bearer-token extractor,
//! request DTOs with validation, middleware (CORS, request logging,
//! tracing) and the mapping from [`AppError`](twoem_core::AppError) to
//! HTTP responses.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::build_app;
pub use error::ApiError;
pub use state::AppState;
