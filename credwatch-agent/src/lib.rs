//! Credential watcher agent.
//!
//! Loads a set of named credential sources from a JSON5 file, keeps each one
//! current as its file rotates and logs every reload (name and length only,
//! never the value).
//!
//! # Configuration
//!
//! ```text
//! {
//!     logging: { level: "info" },
//!     sources: [
//!         { name: "api-token", file: "/var/run/secrets/api/token" },
//!     ],
//! }
//! ```

pub mod args;
pub mod config;
pub mod runner;

pub use args::AgentArgs;
pub use config::{AgentConfig, SourceConfig};
pub use runner::AgentRunner;
