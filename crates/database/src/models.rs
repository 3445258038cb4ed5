//! Database models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A tenant organization. Calls, bots, and numbers all hang off one of these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Organization {
    /// UUID.
    pub id: String,
    /// Display name.
    pub name: String,
    /// URL-safe unique slug.
    pub slug: String,
    /// Tenant-specific voice platform API key. Falls back to the
    /// process-wide key when absent.
    pub api_key: Option<String>,
    /// Tenant-specific webhook signing secret override.
    pub webhook_secret: Option<String>,
    /// Monotonic usage counter, incremented when calls end.
    pub monthly_call_minutes: i64,
    /// Creation timestamp.
    pub created_at: String,
}

/// A user within an organization. Identity itself lives in the fronting
/// auth layer; this row carries the profile and role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    /// UUID.
    pub id: String,
    /// Owning organization.
    pub organization_id: String,
    /// Unique email address.
    pub email: String,
    /// Display name.
    pub name: String,
    /// `ADMIN` or `CUSTOMER`.
    pub role: String,
    /// `RESTAURANT` or `HOTEL` for customers, NULL otherwise. Drives which
    /// business record a call analysis can produce.
    pub customer_type: Option<String>,
    /// Creation timestamp.
    pub created_at: String,
}

/// A voice agent, mirrored from the remote platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Bot {
    /// UUID.
    pub id: String,
    /// Owning organization.
    pub organization_id: String,
    /// User who created (or imported) the bot.
    pub created_by: String,
    /// Display name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Agent id on the remote platform. Unique per organization.
    pub remote_agent_id: String,
    /// LLM config id on the remote platform, when known.
    pub remote_llm_id: Option<String>,
    /// Voice identifier.
    pub voice_id: String,
    /// LLM model name.
    pub model: String,
    /// System prompt.
    pub general_prompt: String,
    /// Opening line spoken by the agent.
    pub begin_message: Option<String>,
    /// Webhook URL registered with the remote agent.
    pub webhook_url: Option<String>,
    /// BCP 47 language tag.
    pub language: String,
    /// JSON array of custom tool definitions, if any.
    pub custom_tools: Option<String>,
    /// Whether the bot is live.
    pub is_active: bool,
    /// Creation timestamp.
    pub created_at: String,
    /// Last update timestamp.
    pub updated_at: String,
}

/// A phone number owned by an organization, optionally bound to bots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct PhoneNumber {
    /// UUID.
    pub id: String,
    /// Owning organization.
    pub organization_id: String,
    /// E.164 number, globally unique.
    pub number: String,
    /// Number id on the remote platform, when provisioned there.
    pub remote_phone_number_id: Option<String>,
    /// Optional display nickname.
    pub nickname: Option<String>,
    /// Bot answering inbound calls.
    pub inbound_bot_id: Option<String>,
    /// Bot placing outbound calls.
    pub outbound_bot_id: Option<String>,
    /// Customer the number is assigned to.
    pub assigned_user_id: Option<String>,
    /// Whether the number is in service.
    pub is_active: bool,
    /// Creation timestamp.
    pub created_at: String,
}

/// One voice call. Status advances PENDING -> IN_PROGRESS -> ENDED ->
/// ANALYZED as webhook events arrive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Call {
    /// UUID.
    pub id: String,
    /// Owning organization.
    pub organization_id: String,
    /// Bot that handled the call.
    pub bot_id: String,
    /// User on whose behalf the call ran.
    pub initiated_by: String,
    /// Call id on the remote platform, globally unique.
    pub remote_call_id: String,
    /// Caller number.
    pub from_number: Option<String>,
    /// Callee number.
    pub to_number: Option<String>,
    /// `INBOUND` or `OUTBOUND`.
    pub direction: String,
    /// `PENDING`, `IN_PROGRESS`, `ENDED`, or `ANALYZED`.
    pub status: String,
    /// Start instant, epoch milliseconds.
    pub started_at_ms: Option<i64>,
    /// End instant, epoch milliseconds.
    pub ended_at_ms: Option<i64>,
    /// Duration in milliseconds, when both instants are known.
    pub duration_ms: Option<i64>,
    /// Full transcript text.
    pub transcript: Option<String>,
    /// Recording URL reported by the platform.
    pub recording_url: Option<String>,
    /// Public debug log URL reported by the platform.
    pub public_log_url: Option<String>,
    /// Why the call ended.
    pub disconnection_reason: Option<String>,
    /// LLM tokens consumed.
    pub llm_token_usage: Option<i64>,
    /// Combined platform cost in cents.
    pub call_cost_cents: Option<i64>,
    /// Creation timestamp.
    pub created_at: String,
}

/// Audit record for one received webhook delivery. Append-only; written
/// even when processing fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct WebhookLog {
    /// UUID.
    pub id: String,
    /// Matched call, when one was found.
    pub call_id: Option<String>,
    /// Organization from the event metadata, when present.
    pub organization_id: Option<String>,
    /// Event name as delivered.
    pub event_type: String,
    /// Raw event payload, JSON text.
    pub payload: String,
    /// Whether the event was applied.
    pub processed: bool,
    /// Failure reason when it was not.
    pub error: Option<String>,
    /// Receipt timestamp.
    pub created_at: String,
}

/// Post-call analysis, one row per call, overwritten on redelivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct CallAnalytics {
    /// Call this analysis belongs to.
    pub call_id: String,
    /// Generated call summary.
    pub summary: Option<String>,
    /// Detected user sentiment.
    pub sentiment: Option<String>,
    /// Whether the call achieved its goal, as reported.
    pub success_evaluation: Option<String>,
    /// Extractor output, JSON text.
    pub custom_analysis: Option<String>,
    pub e2e_p50: Option<f64>,
    pub e2e_p90: Option<f64>,
    pub e2e_p95: Option<f64>,
    pub e2e_p99: Option<f64>,
    pub llm_p50: Option<f64>,
    pub llm_p90: Option<f64>,
    pub llm_p95: Option<f64>,
    pub llm_p99: Option<f64>,
    pub asr_p50: Option<f64>,
    pub asr_p90: Option<f64>,
    pub asr_p95: Option<f64>,
    pub asr_p99: Option<f64>,
    pub tts_p50: Option<f64>,
    pub tts_p90: Option<f64>,
    pub tts_p95: Option<f64>,
    pub tts_p99: Option<f64>,
    pub kb_p50: Option<f64>,
    pub kb_p90: Option<f64>,
    pub kb_p95: Option<f64>,
    pub kb_p99: Option<f64>,
    pub network_rtt_p50: Option<f64>,
    pub network_rtt_p90: Option<f64>,
    pub network_rtt_p95: Option<f64>,
    pub network_rtt_p99: Option<f64>,
    /// Creation timestamp.
    pub created_at: String,
    /// Last overwrite timestamp.
    pub updated_at: String,
}

/// A restaurant order, placed mid-call by a tool or derived from analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Order {
    /// UUID.
    pub id: String,
    /// Customer (restaurant) the order belongs to.
    pub customer_id: String,
    /// Call that produced the order, at most one order per call.
    pub call_id: Option<String>,
    /// Name given by the caller.
    pub customer_name: String,
    /// Callback number.
    pub customer_phone: Option<String>,
    /// Ordered items, free text.
    pub items: String,
    /// Total in the restaurant's currency.
    pub total_amount: Option<f64>,
    /// Delivery address, when delivering.
    pub delivery_address: Option<String>,
    /// Extra notes.
    pub notes: Option<String>,
    /// `PENDING`, `CONFIRMED`, `PREPARING`, `DELIVERED`, or `CANCELLED`.
    pub status: String,
    /// Creation timestamp.
    pub created_at: String,
}

/// A hotel reservation, placed mid-call by a tool or derived from analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Reservation {
    /// UUID.
    pub id: String,
    /// Customer (hotel) the reservation belongs to.
    pub customer_id: String,
    /// Call that produced the reservation, at most one per call.
    pub call_id: Option<String>,
    /// Reserved room type, when resolved.
    pub room_type_id: Option<String>,
    /// Guest name.
    pub guest_name: String,
    /// Guest phone.
    pub guest_phone: Option<String>,
    /// Guest email.
    pub guest_email: Option<String>,
    /// Check-in date, `YYYY-MM-DD`.
    pub check_in: String,
    /// Check-out date, `YYYY-MM-DD`. Occupancy is half-open: the checkout
    /// day is free for a new check-in.
    pub check_out: String,
    /// Guest count.
    pub number_of_guests: i64,
    /// Special requests, free text.
    pub special_requests: Option<String>,
    /// `PENDING`, `CONFIRMED`, `CHECKED_IN`, `CHECKED_OUT`, or `CANCELLED`.
    pub status: String,
    /// Creation timestamp.
    pub created_at: String,
}

/// A bookable room category belonging to a hotel customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct RoomType {
    /// UUID.
    pub id: String,
    /// Owning hotel customer.
    pub customer_id: String,
    /// Category name, e.g. "Deluxe King".
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Rooms of this type in inventory.
    pub total_rooms: i64,
    /// Maximum guests per room.
    pub max_guests: i64,
    /// Nightly rate.
    pub price_per_night: f64,
    /// Whether the type is bookable.
    pub is_active: bool,
    /// Creation timestamp.
    pub created_at: String,
}

/// A stop-sell date for a room type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct RoomBlock {
    /// UUID.
    pub id: String,
    /// Blocked room type.
    pub room_type_id: String,
    /// Blocked date, `YYYY-MM-DD`.
    pub date: String,
    /// Why the date is blocked.
    pub reason: Option<String>,
}

/// A knowledge base mirrored from the remote platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct KnowledgeBase {
    /// UUID.
    pub id: String,
    /// Owning organization.
    pub organization_id: String,
    /// Knowledge base id on the remote platform.
    pub remote_knowledge_base_id: String,
    /// Display name.
    pub name: String,
    /// Source texts, JSON array.
    pub texts: Option<String>,
    /// Whether the platform refreshes sources automatically.
    pub enable_auto_refresh: bool,
    /// Creation timestamp.
    pub created_at: String,
}

/// Attachment of a knowledge base to a bot, with retrieval settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct BotKnowledgeBase {
    /// UUID.
    pub id: String,
    /// Bot side of the link.
    pub bot_id: String,
    /// Knowledge base side of the link.
    pub knowledge_base_id: String,
    /// Passages retrieved per query.
    pub top_k: i64,
    /// Minimum similarity score.
    pub filter_score: f64,
    /// Creation timestamp.
    pub created_at: String,
}
