//! Mid-call tool dispatch.
//!
//! The voice platform invokes one shared endpoint for every tool the agent
//! calls. The dispatcher resolves the call, routes to the bot's custom
//! webhook tools or the built-in registry, and always answers the agent
//! with a text result it can speak, even when the tool itself failed.

use std::collections::HashMap;

use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tracing::{info, warn};
use uuid::Uuid;

use database::models::Call;
use database::{bot, call, user};
use platform_client::PlatformClient;

use crate::error::ToolError;
use crate::registry::ToolRegistry;
use crate::tool::CallContext;

/// Tool invocation as the voice platform sends it.
///
/// Every field is optional; the platform has shipped payloads with missing
/// ids and with `arguments` as a JSON string instead of an object.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolCallRequest {
    /// Remote call id the tool runs within.
    pub call_id: Option<String>,
    /// Platform-side invocation id, echoed back in the response.
    pub tool_call_id: Option<String>,
    /// Name of the tool to run.
    pub tool_name: Option<String>,
    /// Tool arguments, object or stringified object.
    #[serde(default)]
    pub arguments: Value,
}

/// What the dispatcher produced for a tool invocation.
#[derive(Debug)]
pub enum DispatchOutcome {
    /// A result string to relay to the agent.
    Completed {
        result: String,
        tool_call_id: Option<String>,
    },
    /// The call is unknown locally and could not be recovered.
    CallNotFound,
}

/// Routes tool invocations to custom webhook tools or built-ins.
pub struct Dispatcher {
    registry: ToolRegistry,
    http: Client,
}

impl Dispatcher {
    /// Create a dispatcher with the built-in tools registered.
    pub fn new() -> Self {
        Self {
            registry: crate::default_registry(),
            http: Client::new(),
        }
    }

    /// Dispatch one tool invocation.
    ///
    /// The call is looked up by remote id across all organizations. When it
    /// is unknown, `recovery_client` (the globally configured platform
    /// credential, when any) is asked for the call so a local row can be
    /// created; tool requests can outrun the `call_started` webhook.
    ///
    /// Tool-level failures become result strings so the agent can react in
    /// conversation. Errors are reserved for infrastructure faults.
    pub async fn dispatch(
        &self,
        pool: &SqlitePool,
        recovery_client: Option<&PlatformClient>,
        request: &ToolCallRequest,
    ) -> Result<DispatchOutcome, ToolError> {
        let remote_call_id = match request.call_id.as_deref().filter(|s| !s.is_empty()) {
            Some(id) => id,
            None => return Ok(DispatchOutcome::CallNotFound),
        };
        let tool_name = request.tool_name.as_deref().unwrap_or_default();

        let the_call = match call::find_by_remote_id_any_org(pool, remote_call_id).await? {
            Some(found) => found,
            None => match self.recover_call(pool, recovery_client, remote_call_id).await? {
                Some(recovered) => recovered,
                None => return Ok(DispatchOutcome::CallNotFound),
            },
        };

        // Custom webhook tools on the bot shadow built-ins of the same name.
        let handling_bot = bot::get_bot(pool, &the_call.organization_id, &the_call.bot_id).await?;
        if let Some(url) = custom_tool_url(&handling_bot.custom_tools, tool_name) {
            let result = self
                .forward_custom(&url, &the_call, tool_name, request)
                .await;
            return Ok(DispatchOutcome::Completed {
                result,
                tool_call_id: request.tool_call_id.clone(),
            });
        }

        let context = CallContext {
            call_id: the_call.id.clone(),
            organization_id: the_call.organization_id.clone(),
            customer_id: the_call.initiated_by.clone(),
            pool: pool.clone(),
        };
        let params = params_from_arguments(&request.arguments);

        let result = match self.registry.execute(tool_name, params, context).await {
            Ok(output) => output.content,
            Err(ToolError::NotFound(name)) => format!("Error: tool '{}' not found", name),
            Err(e @ (ToolError::MissingParameter(_) | ToolError::InvalidParameter { .. })) => {
                format!("Error: {}", e)
            }
            Err(e) => return Err(e),
        };

        Ok(DispatchOutcome::Completed {
            result,
            tool_call_id: request.tool_call_id.clone(),
        })
    }

    /// Rebuild a local call row from the platform's view of the call.
    ///
    /// Any gap (no client, unknown call, unknown agent, empty organization)
    /// makes recovery fail without error; the invocation is then answered
    /// as call-not-found.
    async fn recover_call(
        &self,
        pool: &SqlitePool,
        recovery_client: Option<&PlatformClient>,
        remote_call_id: &str,
    ) -> Result<Option<Call>, ToolError> {
        let client = match recovery_client {
            Some(client) => client,
            None => return Ok(None),
        };

        let remote = match client.get_call(remote_call_id).await {
            Ok(remote) => remote,
            Err(e) => {
                warn!("Call recovery fetch failed for {}: {}", remote_call_id, e);
                return Ok(None);
            }
        };

        let agent_id = match remote.agent_id.as_deref().filter(|s| !s.is_empty()) {
            Some(id) => id,
            None => return Ok(None),
        };

        // Prefer the tenant the call was created under; fall back to the
        // agent id alone for calls placed outside this backend.
        let metadata_org = remote
            .metadata
            .as_ref()
            .and_then(|m| m.get("organizationId"))
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string());
        let owning_bot = match &metadata_org {
            Some(org_id) => bot::find_by_remote_agent_id(pool, org_id, agent_id).await?,
            None => bot::find_by_remote_agent_id_any_org(pool, agent_id).await?,
        };
        let owning_bot = match owning_bot {
            Some(found) => found,
            None => return Ok(None),
        };

        let attributed_to =
            match user::first_user_for_organization(pool, &owning_bot.organization_id).await? {
                Some(found) => found,
                None => return Ok(None),
            };

        let recovered = Call {
            id: Uuid::new_v4().to_string(),
            organization_id: owning_bot.organization_id.clone(),
            bot_id: owning_bot.id.clone(),
            initiated_by: attributed_to.id.clone(),
            remote_call_id: remote_call_id.to_string(),
            from_number: remote.from_number.clone(),
            to_number: remote.to_number.clone(),
            direction: remote
                .direction
                .as_deref()
                .map(str::to_uppercase)
                .unwrap_or_else(|| "INBOUND".to_string()),
            status: "IN_PROGRESS".to_string(),
            started_at_ms: remote.start_timestamp,
            ended_at_ms: None,
            duration_ms: None,
            transcript: None,
            recording_url: None,
            public_log_url: None,
            disconnection_reason: None,
            llm_token_usage: None,
            call_cost_cents: None,
            created_at: String::new(),
        };
        call::create_call(pool, &recovered).await?;
        info!(
            "Recovered call {} from platform as {}",
            remote_call_id, recovered.id
        );

        Ok(Some(recovered))
    }

    /// POST the invocation to the tool's own endpoint and relay its answer.
    /// Endpoint failures become an error message the agent can read out.
    async fn forward_custom(
        &self,
        url: &str,
        the_call: &Call,
        tool_name: &str,
        request: &ToolCallRequest,
    ) -> String {
        let body = json!({
            "call_id": request.call_id,
            "tool_call_id": request.tool_call_id,
            "tool_name": tool_name,
            "arguments": request.arguments,
            "organization_id": the_call.organization_id,
        });

        match self.post_json(url, &body).await {
            Ok(Value::String(s)) => s,
            Ok(other) => other.to_string(),
            Err(reason) => {
                warn!("Custom tool '{}' failed: {}", tool_name, reason);
                json!({
                    "error": true,
                    "message": format!("Tool execution failed: {}", reason),
                })
                .to_string()
            }
        }
    }

    async fn post_json(&self, url: &str, body: &Value) -> Result<Value, String> {
        let response = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("endpoint returned {}", status));
        }
        response.json().await.map_err(|e| e.to_string())
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// URL of the matching custom tool definition, if the bot has one.
///
/// Definitions follow the platform's shape: an array of objects with a
/// `function` block carrying `name` and `url`. A stored blob that does not
/// parse is treated as having no custom tools.
fn custom_tool_url(raw: &Option<String>, tool_name: &str) -> Option<String> {
    let raw = raw.as_deref()?;
    let definitions: Vec<Value> = serde_json::from_str(raw).unwrap_or_default();

    definitions
        .iter()
        .find(|def| {
            def.pointer("/function/name").and_then(Value::as_str) == Some(tool_name)
        })
        .and_then(|def| def.pointer("/function/url").and_then(Value::as_str))
        .filter(|url| !url.is_empty())
        .map(|url| url.to_string())
}

/// Decode `arguments` into tool parameters, tolerating the stringified
/// form the platform sometimes sends.
fn params_from_arguments(arguments: &Value) -> HashMap<String, Value> {
    let object = match arguments {
        Value::Object(map) => Some(map.clone()),
        Value::String(s) => serde_json::from_str::<Value>(s)
            .ok()
            .and_then(|v| v.as_object().cloned()),
        _ => None,
    };

    object
        .map(|map| map.into_iter().collect())
        .unwrap_or_default()
}
