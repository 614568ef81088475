//! HTTP-level integration tests against an in-memory portal.

mod helpers;

mod auth_test;
mod content_test;
mod reset_test;
mod student_test;
