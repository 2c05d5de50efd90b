use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    Success,
    Failure,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        match id.to_lowercase().as_str() {
            "success" | "ok" => Some(Self::Success),
            "failure" | "fail" | "error" => Some(Self::Failure),
            _ => None,
        }
    }
}

impl std::fmt::Display for EventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

/// Normalized usage record for one completed request.
///
/// Serializes to the exact body POSTed to the ingestion endpoint. Optional
/// identifiers are written as `null` rather than omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageRecord {
    /// Call id assigned by the routing proxy
    pub id: Option<String>,
    pub model: String,
    pub usage: TokenUsage,
    /// Cost in dollars as reported by the proxy
    pub response_cost: f64,
    /// Caller metadata, passed through untouched
    pub metadata: serde_json::Value,
    /// Request id assigned by the upstream provider
    pub request_id: Option<String>,
    pub status: EventStatus,
}
