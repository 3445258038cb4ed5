//! Tenant API credentials.

use std::fmt;

use crate::error::{PlatformError, Result};

/// A voice platform API key.
///
/// The raw key is only readable by the client itself; everything else sees
/// the masked form. `Debug` prints the mask, so a credential caught in a
/// log line never leaks the secret.
#[derive(Clone)]
pub struct ApiCredential {
    key: String,
}

impl ApiCredential {
    /// Wrap a raw key.
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    /// Resolve the effective credential for a tenant: the organization's
    /// own key when set, otherwise the process-wide fallback.
    pub fn resolve(org_key: Option<&str>, fallback: Option<&str>) -> Result<Self> {
        org_key
            .filter(|k| !k.is_empty())
            .or(fallback.filter(|k| !k.is_empty()))
            .map(Self::new)
            .ok_or(PlatformError::CredentialMissing)
    }

    /// The raw key, for the Authorization header.
    pub(crate) fn secret(&self) -> &str {
        &self.key
    }

    /// First four and last four characters, for operator display.
    pub fn masked(&self) -> String {
        let chars: Vec<char> = self.key.chars().collect();
        if chars.len() < 8 {
            return "****".to_string();
        }
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}...{tail}")
    }
}

impl fmt::Debug for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiCredential")
            .field("key", &self.masked())
            .finish()
    }
}
