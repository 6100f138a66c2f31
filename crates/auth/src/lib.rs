//! Token lifecycle management.
//!
//! A session credential is an opaque provider token with a fixed validity
//! window (one hour in the reference deployment). The manager owns the
//! credential exclusively: it is acquired once at login, consulted only when
//! establishing the transport connection, and swapped in place on refresh so
//! in-flight channel operations are never interrupted.

pub mod issuer;
pub mod manager;
pub mod types;

pub use {
    issuer::{HttpTokenIssuer, StaticTokenIssuer, TokenIssuer},
    manager::TokenManager,
    types::{AuthError, Credential, DEFAULT_TOKEN_TTL_SECS},
};
