//! Certificate eligibility derived from the academic and finance records.

pub mod engine;

pub use engine::{Blocker, Eligibility, EligibilityEngine, PASS_MARK, meets_pass_mark};
