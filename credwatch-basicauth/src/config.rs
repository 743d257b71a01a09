//! Client authentication settings.

use std::path::PathBuf;

use credwatch::CredentialSource;
use serde::{Deserialize, Serialize};

use crate::error::{BasicAuthError, Result};

/// Credentials attached to outgoing requests.
///
/// Each of the username and password may be given inline or as a file. When
/// both are set for the same field, the file is used.
///
/// ```ignore
/// // JSON5
/// {
///     username: "collector",
///     password_file: "/var/run/secrets/basicauth/password",
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientAuthSettings {
    /// Inline username.
    pub username: String,
    /// File holding the username.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username_file: Option<PathBuf>,
    /// Inline password.
    #[serde(skip_serializing)]
    pub password: String,
    /// File holding the password.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_file: Option<PathBuf>,
}

impl ClientAuthSettings {
    pub(crate) fn username_source(&self) -> CredentialSource {
        CredentialSource {
            value: self.username.clone(),
            file: self.username_file.clone(),
        }
    }

    pub(crate) fn password_source(&self) -> CredentialSource {
        CredentialSource {
            value: self.password.clone(),
            file: self.password_file.clone(),
        }
    }

    /// A username is required; an absent password means an empty one.
    pub fn validate(&self) -> Result<()> {
        if self.username_source().is_empty() {
            return Err(BasicAuthError::validation(
                "client auth requires a username or username_file",
            ));
        }
        Ok(())
    }
}
