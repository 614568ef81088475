//! Admin-approved password reset.

pub mod workflow;

pub use workflow::{ApprovedReset, PasswordResetWorkflow};
