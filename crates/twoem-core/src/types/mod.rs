//! Core type definitions used across the TWOEM workspace.

pub mod patch;

pub use patch::Patch;
