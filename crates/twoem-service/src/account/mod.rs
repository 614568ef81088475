//! Login, whoami and password change.

pub mod service;

pub use service::AccountService;
