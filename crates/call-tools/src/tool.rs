//! Tool trait definition and types.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::SqlitePool;

use crate::error::ToolError;

/// Call-scoped context injected into every tool execution.
///
/// Tools run on behalf of the customer whose bot handled the call, so all
/// of their reads and writes are keyed by `customer_id`.
#[derive(Clone)]
pub struct CallContext {
    /// Local call id.
    pub call_id: String,
    /// Organization the call belongs to.
    pub organization_id: String,
    /// Customer on whose behalf the call runs.
    pub customer_id: String,
    /// Database handle.
    pub pool: SqlitePool,
}

/// Arguments passed to a tool for execution.
#[derive(Clone)]
pub struct ToolArgs {
    /// Parameters as key-value pairs, as sent by the voice agent.
    pub params: HashMap<String, Value>,
    /// Context of the call the tool runs in.
    pub context: CallContext,
}

impl ToolArgs {
    /// Create new tool arguments with the given parameters and context.
    pub fn new(params: HashMap<String, Value>, context: CallContext) -> Self {
        Self { params, context }
    }

    /// Get a string parameter, returning an error if missing or not a string.
    pub fn get_string(&self, key: &str) -> Result<String, ToolError> {
        self.params
            .get(key)
            .ok_or_else(|| ToolError::MissingParameter(key.to_string()))?
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| ToolError::InvalidParameter {
                name: key.to_string(),
                reason: "expected string".to_string(),
            })
    }

    /// Get an optional string parameter.
    pub fn get_string_opt(&self, key: &str) -> Option<String> {
        self.params.get(key)?.as_str().map(|s| s.to_string())
    }

    /// Get an integer parameter with a default value. Voice agents send
    /// numbers inconsistently, so numeric strings are accepted too.
    pub fn get_i64_or(&self, key: &str, default: i64) -> i64 {
        match self.params.get(key) {
            Some(Value::Number(n)) => n.as_i64().unwrap_or(default),
            Some(Value::String(s)) => s.trim().parse().unwrap_or(default),
            _ => default,
        }
    }

    /// Get an optional f64 parameter, accepting numeric strings.
    pub fn get_number_opt(&self, key: &str) -> Option<f64> {
        match self.params.get(key) {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Get a `YYYY-MM-DD` date parameter, validated as a real calendar date.
    pub fn get_date(&self, key: &str) -> Result<NaiveDate, ToolError> {
        let raw = self.get_string(key)?;
        NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|_| ToolError::InvalidParameter {
            name: key.to_string(),
            reason: format!("expected a YYYY-MM-DD date, got '{}'", raw),
        })
    }
}

/// Output from a tool execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolOutput {
    /// The result content (text or JSON), relayed to the voice agent.
    pub content: String,
    /// Whether the execution was successful.
    pub success: bool,
}

impl ToolOutput {
    /// Create a successful output.
    pub fn success(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            success: true,
        }
    }

    /// Create a failed output.
    pub fn failure(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            success: false,
        }
    }
}

/// Trait for tools a voice agent can invoke mid-call.
///
/// Tools receive the caller's arguments plus the call context and answer
/// with text the agent speaks or reasons over. Business failures (no
/// availability, unknown order) are failure *outputs*, not errors; errors
/// are reserved for broken requests and infrastructure faults.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The tool's unique name (used for dispatch).
    fn name(&self) -> &str;

    /// Human-readable description of what the tool does.
    fn description(&self) -> &str;

    /// Execute the tool with the given arguments.
    async fn execute(&self, args: ToolArgs) -> Result<ToolOutput, ToolError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(params: Value) -> ToolArgs {
        let params = match params {
            Value::Object(map) => map.into_iter().collect(),
            _ => HashMap::new(),
        };
        let context = CallContext {
            call_id: "call-1".to_string(),
            organization_id: "org-1".to_string(),
            customer_id: "user-1".to_string(),
            pool: SqlitePool::connect_lazy("sqlite::memory:").unwrap(),
        };
        ToolArgs::new(params, context)
    }

    #[tokio::test]
    async fn get_i64_or_accepts_numbers_and_numeric_strings() {
        let a = args(json!({"guests": 3, "rooms": "2", "bad": "x"}));

        assert_eq!(a.get_i64_or("guests", 1), 3);
        assert_eq!(a.get_i64_or("rooms", 1), 2);
        assert_eq!(a.get_i64_or("bad", 1), 1);
        assert_eq!(a.get_i64_or("absent", 7), 7);
    }

    #[tokio::test]
    async fn get_number_opt_accepts_numeric_strings() {
        let a = args(json!({"total": "31.50", "exact": 12.0}));

        assert_eq!(a.get_number_opt("total"), Some(31.5));
        assert_eq!(a.get_number_opt("exact"), Some(12.0));
        assert_eq!(a.get_number_opt("absent"), None);
    }

    #[tokio::test]
    async fn get_date_validates_calendar_dates() {
        let a = args(json!({"ok": "2026-09-12", "bad": "2026-13-40", "text": "tomorrow"}));

        assert_eq!(
            a.get_date("ok").unwrap(),
            NaiveDate::from_ymd_opt(2026, 9, 12).unwrap()
        );
        assert!(matches!(
            a.get_date("bad"),
            Err(ToolError::InvalidParameter { .. })
        ));
        assert!(matches!(
            a.get_date("text"),
            Err(ToolError::InvalidParameter { .. })
        ));
        assert!(matches!(
            a.get_date("absent"),
            Err(ToolError::MissingParameter(_))
        ));
    }
}
