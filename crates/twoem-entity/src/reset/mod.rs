//! Password reset request entities.

pub mod model;
pub mod status;

pub use model::PasswordResetRequest;
pub use status::ResetStatus;
