//! # twoem-entity
//!
//! Domain entity models for the TWOEM portal. Every struct in this crate
//! represents a database table row or a domain value object. Database
//! entities additionally derive `sqlx::FromRow`.
//!
//! The pure parts of the core rules live here next to the data they
//! govern: the finance ledger recomputation, the academic average, and the
//! reset request state machine.

pub mod account;
pub mod content;
pub mod reset;
pub mod student;
