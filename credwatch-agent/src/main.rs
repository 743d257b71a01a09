//! Credential watcher agent.
//!
//! Starts a resolver for every configured credential source and keeps
//! them current until Ctrl+C.

use anyhow::Result;
use credwatch_agent::{AgentArgs, AgentConfig, AgentRunner};
use credwatch_common::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = AgentArgs::parse_with_default("credwatch.json5");

    // Load configuration
    let config = AgentConfig::load_from_file(&args.config)?;

    // Initialize logging with optional CLI override
    let logging = config.logging.with_level_override(args.log_level.as_deref());
    init_tracing(&logging)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %args.config.display(),
        "Starting credwatch agent"
    );

    let runner = AgentRunner::new(&config)?;
    runner.start().await?;

    // Run until Ctrl+C (handles shutdown gracefully)
    runner.run().await
}
