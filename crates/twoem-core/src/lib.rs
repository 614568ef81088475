//! # twoem-core
//!
//! Core crate for the TWOEM student portal. Contains configuration schemas,
//! the partial-update `Patch` type, the blob store and clock traits,
//! and the unified error system.
//!
//! This crate has **no** internal dependencies on other TWOEM crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::{AppError, ErrorCode, ErrorKind};
pub use result::AppResult;
