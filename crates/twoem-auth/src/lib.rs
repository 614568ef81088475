//! # twoem-auth
//!
//! Authentication for the TWOEM portal: Argon2id credential hashing
//! ([`CredentialStore`]), HS256 session tokens ([`SessionIssuer`]) and the
//! password policy.

pub mod credential;
pub mod jwt;
pub mod password;
pub mod session;

pub use credential::CredentialStore;
pub use session::{Identity, IssuedToken, SessionIssuer};
