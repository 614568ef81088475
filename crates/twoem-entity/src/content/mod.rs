//! Time-limited public content: eulogies and downloadable items.

pub mod model;

pub use model::{Audience, ContentItem, ContentKind, CreateContentItem};
