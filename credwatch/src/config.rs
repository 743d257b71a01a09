//! Configuration for credential sources.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{CredentialError, Result};
use crate::resolver::{Resolver, ResolverOptions, new_value_resolver};

/// Where a credential comes from: an inline value, a file, or both (the
/// file wins).
///
/// # Example
///
/// ```ignore
/// // JSON5
/// { file: "/var/run/secrets/token" }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialSource {
    /// Inline value.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub value: String,

    /// Path of a file holding the value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl CredentialSource {
    /// Source backed by an inline value.
    pub fn inline(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            file: None,
        }
    }

    /// Source backed by a file.
    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self {
            value: String::new(),
            file: Some(path.into()),
        }
    }

    /// Whether neither a value nor a file is set.
    pub fn is_empty(&self) -> bool {
        self.value.is_empty() && self.file_path().is_none()
    }

    fn file_path(&self) -> Option<&PathBuf> {
        self.file.as_ref().filter(|p| !p.as_os_str().is_empty())
    }

    /// Check that the source can produce a value.
    pub fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(CredentialError::NoValueProvided);
        }
        Ok(())
    }

    /// Build the resolver for this source.
    pub fn resolver(&self, options: ResolverOptions) -> Result<Resolver> {
        let file = self.file_path().cloned().unwrap_or_default();
        new_value_resolver(&self.value, file, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use credwatch_common::parse_config;

    #[test]
    fn test_parse_file_source() {
        let source: CredentialSource = parse_config(r#"{ file: "/run/secrets/token" }"#).unwrap();
        assert_eq!(source, CredentialSource::from_file("/run/secrets/token"));
        assert!(source.resolver(ResolverOptions::new()).unwrap().is_file());
    }

    #[test]
    fn test_parse_inline_source() {
        let source: CredentialSource = parse_config(r#"{ value: "s3cr3t" }"#).unwrap();
        assert_eq!(source, CredentialSource::inline("s3cr3t"));

        let resolver = source.resolver(ResolverOptions::new()).unwrap();
        assert!(!resolver.is_file());
    }

    #[test]
    fn test_file_preferred_over_inline() {
        let source: CredentialSource =
            parse_config(r#"{ value: "inline", file: "/run/secrets/token" }"#).unwrap();
        assert!(source.resolver(ResolverOptions::new()).unwrap().is_file());
    }

    #[test]
    fn test_empty_source_rejected() {
        let source: CredentialSource = parse_config("{}").unwrap();
        assert!(source.is_empty());
        assert!(matches!(
            source.validate(),
            Err(CredentialError::NoValueProvided)
        ));
        assert!(matches!(
            source.resolver(ResolverOptions::new()),
            Err(CredentialError::NoValueProvided)
        ));
    }

    #[test]
    fn test_empty_file_path_is_unset() {
        let source: CredentialSource = parse_config(r#"{ value: "v", file: "" }"#).unwrap();
        assert!(!source.resolver(ResolverOptions::new()).unwrap().is_file());
    }
}
