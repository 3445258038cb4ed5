//! Phone number reconciliation: mirror platform numbers into local rows.

use std::collections::HashMap;

use serde_json::Value;
use sqlx::SqlitePool;
use tracing::{info, warn};
use uuid::Uuid;

use database::models::PhoneNumber;
use database::{bot, phone_number};
use platform_client::types::RemotePhoneNumber;
use platform_client::PlatformClient;

use crate::error::{Result, SyncError};
use crate::{Reconciled, SyncSummary};

/// Mirror every remote phone number into the organization's rows.
///
/// Remote agent bindings resolve to local bots through a map built once up
/// front; a binding to an agent this organization does not know becomes a
/// NULL binding, never a row failure. A number found under another
/// organization is claimed: the platform listing is authoritative for
/// ownership.
pub async fn sync_phone_numbers(
    pool: &SqlitePool,
    client: &PlatformClient,
    organization_id: &str,
) -> Result<SyncSummary> {
    let remote_numbers = client.list_phone_numbers().await?;
    info!("Found {} phone numbers on the platform", remote_numbers.len());

    let bots_by_agent: HashMap<String, String> = bot::list_bots(pool, organization_id)
        .await?
        .into_iter()
        .map(|b| (b.remote_agent_id, b.id))
        .collect();

    let mut summary = SyncSummary::default();
    for item in &remote_numbers {
        match reconcile_number(pool, organization_id, &bots_by_agent, item).await {
            Ok(Reconciled::Created) => summary.created += 1,
            Ok(Reconciled::Updated) => summary.updated += 1,
            Err(e) => {
                let label = item
                    .get("phone_number")
                    .and_then(Value::as_str)
                    .unwrap_or("<unknown number>");
                warn!("Skipping number {}: {}", label, e);
                summary.errors.push(format!("{}: {}", label, e));
                summary.skipped += 1;
            }
        }
    }

    info!("Phone number sync completed: {}", summary);
    Ok(summary)
}

async fn reconcile_number(
    pool: &SqlitePool,
    organization_id: &str,
    bots_by_agent: &HashMap<String, String>,
    item: &Value,
) -> Result<Reconciled> {
    let remote: RemotePhoneNumber = serde_json::from_value(item.clone())?;
    let number = remote
        .phone_number
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or(SyncError::MissingRemoteId)?;

    let resolve = |agent_id: &Option<String>| {
        agent_id
            .as_deref()
            .and_then(|id| bots_by_agent.get(id))
            .cloned()
    };
    let inbound_bot_id = resolve(&remote.inbound_agent_id);
    let outbound_bot_id = resolve(&remote.outbound_agent_id);
    let remote_id = remote
        .phone_number_id
        .clone()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| number.to_string());

    match phone_number::find_by_number(pool, number).await? {
        Some(existing) => {
            let claimed = existing.organization_id != organization_id;
            let updated = PhoneNumber {
                organization_id: organization_id.to_string(),
                remote_phone_number_id: Some(remote_id),
                nickname: existing
                    .nickname
                    .clone()
                    .or_else(|| remote.nickname.clone().filter(|s| !s.is_empty())),
                inbound_bot_id,
                outbound_bot_id,
                // A claimed number cannot keep a customer of its old tenant.
                assigned_user_id: if claimed {
                    None
                } else {
                    existing.assigned_user_id.clone()
                },
                ..existing
            };
            phone_number::update_phone_number(pool, &updated).await?;
            if claimed {
                info!("Claimed number {} for organization {}", number, organization_id);
            }
            Ok(Reconciled::Updated)
        }
        None => {
            let created = PhoneNumber {
                id: Uuid::new_v4().to_string(),
                organization_id: organization_id.to_string(),
                number: number.to_string(),
                remote_phone_number_id: Some(remote_id),
                nickname: remote.nickname.filter(|s| !s.is_empty()),
                inbound_bot_id,
                outbound_bot_id,
                assigned_user_id: None,
                is_active: true,
                created_at: String::new(),
            };
            phone_number::create_phone_number(pool, &created).await?;
            info!("Created number {} from the platform", number);
            Ok(Reconciled::Created)
        }
    }
}
