//! Core traits defined in `twoem-core` and implemented by other crates.

pub mod blob;
pub mod clock;

pub use blob::BlobStore;
pub use clock::{Clock, ManualClock, SystemClock};
