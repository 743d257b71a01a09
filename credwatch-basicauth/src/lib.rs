//! HTTP basic authentication with rotating credentials.
//!
//! [`BasicAuthClient`] produces `Authorization` header values from a username
//! and password that are each configured inline or read from a watched file.

mod client;
mod config;
mod error;

pub use client::{AUTHORIZATION_METADATA_KEY, BasicAuthClient};
pub use config::ClientAuthSettings;
pub use error::{BasicAuthError, Result};
