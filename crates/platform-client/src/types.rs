//! Platform API request and response types.
//!
//! Response types are tolerant on purpose: the platform adds and drops
//! fields without notice, so everything is optional and unknown fields are
//! ignored. Callers decide which absences they can live with.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A voice agent as the platform reports it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RemoteAgent {
    /// Platform agent id
    pub agent_id: Option<String>,
    /// Display name
    pub agent_name: Option<String>,
    /// Voice identifier
    pub voice_id: Option<String>,
    /// BCP 47 language tag
    pub language: Option<String>,
    /// Webhook URL registered for call events
    pub webhook_url: Option<String>,
    /// Engine pairing, carries the LLM config id
    pub response_engine: Option<ResponseEngine>,
    /// Last modification, epoch milliseconds
    pub last_modification_timestamp: Option<i64>,
}

/// The engine half of an agent: which managed LLM config drives it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResponseEngine {
    /// Engine type, `managed-llm` for platform-hosted configs
    #[serde(rename = "type")]
    pub engine_type: Option<String>,
    /// LLM config id
    pub llm_id: Option<String>,
}

impl ResponseEngine {
    /// Reference a platform-hosted LLM config.
    pub fn managed_llm(llm_id: impl Into<String>) -> Self {
        Self {
            engine_type: Some("managed-llm".to_string()),
            llm_id: Some(llm_id.into()),
        }
    }
}

/// An LLM config as the platform reports it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RemoteLlm {
    /// Platform LLM config id
    pub llm_id: Option<String>,
    /// Model name
    pub model: Option<String>,
    /// System prompt
    pub general_prompt: Option<String>,
    /// Opening line
    pub begin_message: Option<String>,
    /// Tool definitions attached to the config
    pub general_tools: Option<Value>,
    /// Knowledge base attachments
    pub knowledge_base_ids: Option<Value>,
}

/// A phone number as the platform reports it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RemotePhoneNumber {
    /// Platform number id
    pub phone_number_id: Option<String>,
    /// E.164 number
    pub phone_number: Option<String>,
    /// Display nickname
    pub nickname: Option<String>,
    /// Agent answering inbound calls
    pub inbound_agent_id: Option<String>,
    /// Agent placing outbound calls
    pub outbound_agent_id: Option<String>,
}

/// A knowledge base as the platform reports it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RemoteKnowledgeBase {
    /// Platform knowledge base id
    pub knowledge_base_id: Option<String>,
    /// Display name
    pub knowledge_base_name: Option<String>,
    /// Ingestion status
    pub status: Option<String>,
    /// Whether the platform refreshes sources automatically
    pub enable_auto_refresh: Option<bool>,
}

/// A call as the platform reports it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RemoteCall {
    /// Platform call id
    pub call_id: Option<String>,
    /// Agent that handled the call
    pub agent_id: Option<String>,
    /// Platform-side status
    pub call_status: Option<String>,
    /// Caller number
    pub from_number: Option<String>,
    /// Callee number
    pub to_number: Option<String>,
    /// `inbound` or `outbound`
    pub direction: Option<String>,
    /// Start instant, epoch milliseconds
    pub start_timestamp: Option<i64>,
    /// End instant, epoch milliseconds
    pub end_timestamp: Option<i64>,
    /// Free-form metadata attached at call creation
    pub metadata: Option<Value>,
}

/// Request to create an agent.
#[derive(Debug, Clone, Serialize)]
pub struct CreateAgentParams {
    /// Display name
    pub agent_name: String,
    /// Voice identifier
    pub voice_id: String,
    /// BCP 47 language tag
    pub language: String,
    /// Engine pairing
    pub response_engine: ResponseEngine,
    /// Webhook URL for call events
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
}

/// Request to create an LLM config.
#[derive(Debug, Clone, Serialize)]
pub struct CreateLlmParams {
    /// Model name
    pub model: String,
    /// System prompt
    pub general_prompt: String,
    /// Opening line
    #[serde(skip_serializing_if = "Option::is_none")]
    pub begin_message: Option<String>,
    /// Tool definitions for the config
    #[serde(skip_serializing_if = "Option::is_none")]
    pub general_tools: Option<Value>,
}

/// Request to purchase a fresh number from the platform's inventory.
#[derive(Debug, Clone, Serialize)]
pub struct CreatePhoneNumberParams {
    /// Preferred area code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area_code: Option<String>,
    /// Display nickname
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    /// Agent answering inbound calls
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inbound_agent_id: Option<String>,
    /// Agent placing outbound calls
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outbound_agent_id: Option<String>,
}

/// Request to import a number the tenant already owns elsewhere.
#[derive(Debug, Clone, Serialize)]
pub struct ImportPhoneNumberParams {
    /// E.164 number to import
    pub phone_number: String,
    /// SIP termination URI at the current carrier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub termination_uri: Option<String>,
    /// Display nickname
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    /// Agent answering inbound calls
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inbound_agent_id: Option<String>,
    /// Agent placing outbound calls
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outbound_agent_id: Option<String>,
}

/// One source text of a knowledge base.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeBaseText {
    /// Source title
    pub title: String,
    /// Source body
    pub text: String,
}

/// Request to create a knowledge base.
#[derive(Debug, Clone, Serialize)]
pub struct CreateKnowledgeBaseParams {
    /// Display name
    pub knowledge_base_name: String,
    /// Source texts
    pub knowledge_base_texts: Vec<KnowledgeBaseText>,
    /// Whether the platform should refresh sources automatically
    pub enable_auto_refresh: bool,
}

/// One entry of an LLM config's knowledge base list, as pushed on every
/// assignment change.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KnowledgeBaseRef {
    /// Platform knowledge base id
    pub knowledge_base_id: String,
    /// Passages retrieved per query
    pub top_k: i64,
    /// Minimum similarity score
    pub filter_score: f64,
}
