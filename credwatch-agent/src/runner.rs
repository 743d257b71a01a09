//! Agent runner for lifecycle management.

use anyhow::Context;
use credwatch::{CancellationToken, Resolver, ResolverOptions, ValueResolver};
use tokio::signal;

use crate::config::AgentConfig;

/// Runs one resolver per configured credential source.
///
/// Handles:
/// - Resolver construction with reload reporting
/// - Startup (the first failing source aborts startup)
/// - Graceful shutdown on Ctrl+C or cancellation
///
/// # Example
///
/// ```ignore
/// let config = AgentConfig::load_from_file("credwatch.json5")?;
/// let runner = AgentRunner::new(&config)?;
/// runner.start().await?;
/// runner.run().await
/// ```
pub struct AgentRunner {
    /// Named resolvers, in configuration order.
    sources: Vec<(String, Resolver)>,
    /// Cancels every watch loop.
    cancel_token: CancellationToken,
}

impl AgentRunner {
    /// Build resolvers for every source. Nothing is read yet.
    pub fn new(config: &AgentConfig) -> anyhow::Result<Self> {
        let sources = config
            .sources
            .iter()
            .map(|entry| -> anyhow::Result<(String, Resolver)> {
                let name = entry.name.clone();
                let options = ResolverOptions::new().on_change(move |value| {
                    // Never log the secret itself.
                    tracing::info!(source = %name, len = value.len(), "Credential loaded");
                });
                let resolver = entry
                    .source
                    .resolver(options)
                    .with_context(|| format!("Invalid credential source '{}'", entry.name))?;
                Ok((entry.name.clone(), resolver))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        Ok(Self {
            sources,
            cancel_token: CancellationToken::new(),
        })
    }

    /// Returns a handle to the cancellation token.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    /// Names of the configured sources.
    pub fn source_names(&self) -> impl Iterator<Item = &str> {
        self.sources.iter().map(|(name, _)| name.as_str())
    }

    /// Current value of a source.
    pub fn value(&self, name: &str) -> Option<String> {
        self.sources
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, resolver)| resolver.value())
    }

    /// Load every source and start watching files.
    ///
    /// If a source fails, the ones already started are shut down again.
    pub async fn start(&self) -> anyhow::Result<()> {
        for (idx, (name, resolver)) in self.sources.iter().enumerate() {
            if let Err(e) = resolver.start(self.cancel_token.clone()).await {
                for (started_name, started) in &self.sources[..idx] {
                    if let Err(e) = started.shutdown().await {
                        tracing::warn!(source = %started_name, error = %e, "Failed to stop source");
                    }
                }
                return Err(e).with_context(|| format!("Failed to start source '{}'", name));
            }

            tracing::info!(source = %name, from_file = resolver.is_file(), "Source started");
        }

        Ok(())
    }

    /// Run until Ctrl+C is received or the token is cancelled, then shut down.
    pub async fn run(self) -> anyhow::Result<()> {
        tracing::info!(
            sources = self.sources.len(),
            "Agent running. Press Ctrl+C to stop."
        );

        tokio::select! {
            result = signal::ctrl_c() => {
                if let Err(e) = result {
                    tracing::error!(error = %e, "Failed to listen for Ctrl+C");
                }
                tracing::info!("Received shutdown signal");
            }
            _ = self.cancel_token.cancelled() => {
                tracing::info!("Cancellation requested");
            }
        }

        self.shutdown().await;

        tracing::info!("Goodbye!");

        Ok(())
    }

    /// Stop every resolver. Failures are logged.
    pub async fn shutdown(&self) {
        self.cancel_token.cancel();

        for (name, resolver) in &self.sources {
            if let Err(e) = resolver.shutdown().await {
                tracing::warn!(source = %name, error = %e, "Error stopping source");
            }
        }
    }
}
