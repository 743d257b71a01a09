//! Basic authentication for outgoing requests.

use std::collections::HashMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use credwatch::{CancellationToken, Resolver, ResolverOptions, StaticValue, ValueResolver};

use crate::config::ClientAuthSettings;
use crate::error::{BasicAuthError, Result};

/// Metadata key used for per-RPC credentials.
pub const AUTHORIZATION_METADATA_KEY: &str = "authorization";

/// Builds `Authorization: Basic ...` values from the current username and
/// password.
///
/// The header is computed on every call, so credentials rotated on disk are
/// used by the next request without a restart.
#[derive(Debug)]
pub struct BasicAuthClient {
    username: Resolver,
    password: Resolver,
}

impl BasicAuthClient {
    /// Create a client from validated settings.
    pub fn new(settings: &ClientAuthSettings) -> Result<Self> {
        Self::with_options(settings, ResolverOptions::new())
    }

    /// Create a client whose file-backed credentials use `options`.
    pub fn with_options(settings: &ClientAuthSettings, options: ResolverOptions) -> Result<Self> {
        settings.validate()?;

        let username = settings
            .username_source()
            .resolver(options.clone())
            .map_err(|e| BasicAuthError::credential("username", e))?;

        let password_source = settings.password_source();
        let password = if password_source.is_empty() {
            Resolver::Static(StaticValue::new(""))
        } else {
            password_source
                .resolver(options)
                .map_err(|e| BasicAuthError::credential("password", e))?
        };

        Ok(Self { username, password })
    }

    /// Load both credentials and start watching any files.
    ///
    /// On failure nothing is left running.
    pub async fn start(&self, cancel: CancellationToken) -> Result<()> {
        self.username
            .start(cancel.clone())
            .await
            .map_err(|e| BasicAuthError::credential("username", e))?;

        if let Err(e) = self.password.start(cancel).await {
            if let Err(shutdown_err) = self.username.shutdown().await {
                tracing::warn!(error = %shutdown_err, "Failed to stop username watcher");
            }
            return Err(BasicAuthError::credential("password", e));
        }

        tracing::info!(
            username_from_file = self.username.is_file(),
            password_from_file = self.password.is_file(),
            "Basic auth client started"
        );

        Ok(())
    }

    /// Stop watching credential files.
    pub async fn shutdown(&self) -> Result<()> {
        let username = self.username.shutdown().await;
        let password = self.password.shutdown().await;
        username.map_err(|e| BasicAuthError::credential("username", e))?;
        password.map_err(|e| BasicAuthError::credential("password", e))?;
        Ok(())
    }

    /// Current `Authorization` header value.
    pub fn authorization_header(&self) -> String {
        let credentials = format!("{}:{}", self.username.value(), self.password.value());
        format!("Basic {}", STANDARD.encode(credentials))
    }

    /// Per-RPC metadata carrying the authorization header.
    pub fn request_metadata(&self) -> HashMap<String, String> {
        HashMap::from([(
            AUTHORIZATION_METADATA_KEY.to_string(),
            self.authorization_header(),
        )])
    }
}
