//! Tenant credential resolution.
//!
//! Every platform call runs under the tenant's own API key when the
//! organization has one, else the process-wide fallback. Clients are
//! constructed per request; there is no shared platform client.

use sqlx::SqlitePool;

use database::organization;
use platform_client::{ApiCredential, PlatformClient};

use crate::config::Config;
use crate::error::Result;

/// Build a platform client for an organization.
///
/// Fails with the credential-missing configuration prompt when neither
/// the organization nor the environment carries a key.
pub async fn platform_client_for(
    pool: &SqlitePool,
    config: &Config,
    organization_id: &str,
) -> Result<PlatformClient> {
    let org = organization::get_organization(pool, organization_id).await?;
    let credential =
        ApiCredential::resolve(org.api_key.as_deref(), config.platform_api_key.as_deref())?;

    Ok(PlatformClient::new(&config.platform_api_url, credential)?)
}

/// Build a platform client from the fallback key alone, for call recovery
/// on tool invocations that arrive before any tenant is known. `None`
/// when no fallback key is configured.
pub fn recovery_client(config: &Config) -> Option<PlatformClient> {
    let credential = ApiCredential::resolve(None, config.platform_api_key.as_deref()).ok()?;
    PlatformClient::new(&config.platform_api_url, credential).ok()
}

/// Resolve the webhook signing secret for a delivery.
///
/// The organization's override wins when the event names a tenant we
/// know; otherwise the process-wide secret applies. `None` means the
/// server is misconfigured for webhooks entirely.
pub async fn webhook_secret_for(
    pool: &SqlitePool,
    config: &Config,
    organization_id: Option<&str>,
) -> Option<String> {
    if let Some(org_id) = organization_id {
        if let Ok(org) = organization::get_organization(pool, org_id).await {
            if let Some(secret) = org.webhook_secret.filter(|s| !s.is_empty()) {
                return Some(secret);
            }
        }
    }

    config.webhook_secret.clone()
}
