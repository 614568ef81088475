//! # twoem-service
//!
//! Business logic service layer for the TWOEM portal. Each service
//! orchestrates the stores, the blob store and the auth primitives to
//! implement one group of use cases.
//!
//! Services follow constructor injection: all dependencies are provided at
//! construction time via `Arc` references. Role checks happen here, against
//! the [`RequestContext`] built from a validated token.

pub mod account;
pub mod bootstrap;
pub mod content;
pub mod context;
pub mod eligibility;
pub mod reset;
pub mod student;

pub use account::AccountService;
pub use bootstrap::ensure_admin;
pub use content::{ContentExpiryManager, ContentService, Viewer};
pub use context::RequestContext;
pub use eligibility::{Eligibility, EligibilityEngine};
pub use reset::PasswordResetWorkflow;
pub use student::{AdminStudentService, StudentService, StudentView};
