//! Webhook event payloads.
//!
//! Decoding is deliberately tolerant: every field is optional and unknown
//! fields are ignored, so a platform-side schema change never turns into a
//! parse failure. Handlers decide what missing data means.

use serde::Deserialize;
use serde_json::Value;

/// One webhook delivery: an event name and the call it concerns.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookEvent {
    /// `call_started`, `call_ended`, or `call_analyzed`. Anything else is
    /// logged and acknowledged without touching call state.
    #[serde(default)]
    pub event: String,
    /// Snapshot of the remote call at the time of the event.
    #[serde(default)]
    pub call: CallPayload,
}

/// The remote call object, as delivered.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallPayload {
    /// Call id on the remote platform.
    pub call_id: Option<String>,
    /// Metadata attached when the call was registered.
    pub metadata: Option<CallMetadata>,
    /// Caller number.
    pub from_number: Option<String>,
    /// Start instant, epoch milliseconds.
    pub start_timestamp: Option<i64>,
    /// End instant, epoch milliseconds.
    pub end_timestamp: Option<i64>,
    /// Transcript, either plain text or a structured turn list.
    pub transcript: Option<Value>,
    pub recording_url: Option<String>,
    pub public_log_url: Option<String>,
    pub disconnection_reason: Option<String>,
    /// LLM tokens consumed over the whole call.
    pub llm_token_count: Option<i64>,
    pub call_cost: Option<CallCost>,
    /// Post-call analysis, present on `call_analyzed`.
    pub call_analysis: Option<CallAnalysis>,
    /// Latency percentiles, present on `call_analyzed`.
    pub latency: Option<LatencyMetrics>,
}

/// Metadata we attach when registering a call. The organization id is how
/// a delivery is routed back to its tenant.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallMetadata {
    #[serde(rename = "organizationId")]
    pub organization_id: Option<String>,
}

/// Cost breakdown reported by the platform.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct CallCost {
    /// Total across all products, cents.
    pub combined_cost: Option<f64>,
}

/// Post-call analysis block.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallAnalysis {
    pub call_summary: Option<String>,
    pub sentiment: Option<String>,
    pub call_successful: Option<bool>,
    /// Output of the tenant's extraction prompts, arbitrary JSON. Order
    /// and reservation derivation reads from here.
    pub custom_analysis_data: Option<Value>,
}

/// Latency percentile groups, milliseconds.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct LatencyMetrics {
    pub e2e_latency: Option<LatencyGroup>,
    pub llm_latency: Option<LatencyGroup>,
    pub asr_latency: Option<LatencyGroup>,
    pub tts_latency: Option<LatencyGroup>,
    pub knowledge_base_latency: Option<LatencyGroup>,
    pub llm_websocket_network_rtt_latency: Option<LatencyGroup>,
}

/// One percentile group.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct LatencyGroup {
    pub p50: Option<f64>,
    pub p90: Option<f64>,
    pub p95: Option<f64>,
    pub p99: Option<f64>,
}

impl CallPayload {
    /// Organization id from the metadata, when present and non-empty.
    pub fn organization_id(&self) -> Option<&str> {
        self.metadata
            .as_ref()
            .and_then(|m| m.organization_id.as_deref())
            .filter(|id| !id.is_empty())
    }

    /// Transcript as text. String transcripts pass through; structured
    /// ones are stored as their JSON serialization.
    pub fn transcript_text(&self) -> Option<String> {
        match &self.transcript {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Null) | None => None,
            Some(other) => Some(other.to_string()),
        }
    }

    /// Combined platform cost in whole cents.
    pub fn cost_cents(&self) -> Option<i64> {
        self.call_cost
            .and_then(|c| c.combined_cost)
            .map(|c| c.round() as i64)
    }
}
