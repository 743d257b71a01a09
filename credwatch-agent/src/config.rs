//! Agent configuration.

use std::collections::HashSet;
use std::path::Path;

use credwatch::CredentialSource;
use serde::{Deserialize, Serialize};

// Re-export LoggingConfig for compatibility
pub use credwatch_common::LoggingConfig;

/// Complete agent configuration.
///
/// ```ignore
/// {
///     logging: { level: "info", format: "json" },
///     sources: [
///         { name: "api-token", file: "/var/run/secrets/api/token" },
///         { name: "static-key", value: "not-so-secret" },
///     ],
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Credentials to resolve.
    #[serde(default)]
    pub sources: Vec<SourceConfig>,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// A named credential source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Name used in logs.
    pub name: String,

    /// Inline value and/or file.
    #[serde(flatten)]
    pub source: CredentialSource,
}

impl AgentConfig {
    /// Load configuration from a JSON5 file.
    pub fn load_from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let config: Self = credwatch_common::load_config(path)?;
        config.validate_config()?;
        Ok(config)
    }

    /// Parse configuration from a JSON5 string.
    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let config: Self = credwatch_common::parse_config(content)?;
        config.validate_config()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate_config(&self) -> anyhow::Result<()> {
        if self.sources.is_empty() {
            anyhow::bail!("At least one credential source must be configured");
        }

        let mut names = HashSet::new();
        for source in &self.sources {
            if source.name.is_empty() {
                anyhow::bail!("Credential source names must not be empty");
            }
            if !names.insert(source.name.as_str()) {
                anyhow::bail!("Duplicate credential source name: {}", source.name);
            }
            if source.source.validate().is_err() {
                anyhow::bail!(
                    "Credential source '{}' needs a value or a file",
                    source.name
                );
            }
        }

        Ok(())
    }
}
