use serde::Serialize;

/// What happened to a single usage event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DeliveryOutcome {
    /// No endpoint configured
    Disabled,
    /// The event could not be normalized into a payload
    Dropped { reason: String },
    /// Endpoint answered with a non-error status
    Delivered { status: u16 },
    /// Endpoint answered with HTTP 4xx/5xx
    Rejected { status: u16, body: String },
    /// Request never got a response (timeout, DNS, connection reset)
    Failed { reason: String },
}

impl DeliveryOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered { .. })
    }
}

impl std::fmt::Display for DeliveryOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disabled => write!(f, "Forwarding disabled (no endpoint URL)"),
            Self::Dropped { reason } => write!(f, "Dropped: {}", reason),
            Self::Delivered { status } => write!(f, "Delivered (HTTP {})", status),
            Self::Rejected { status, .. } => write!(f, "Rejected (HTTP {})", status),
            Self::Failed { reason } => write!(f, "Failed: {}", reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_serializes_with_tag() {
        let value = serde_json::to_value(DeliveryOutcome::Delivered { status: 201 }).unwrap();
        assert_eq!(value["outcome"], "delivered");
        assert_eq!(value["status"], 201);

        let value = serde_json::to_value(DeliveryOutcome::Disabled).unwrap();
        assert_eq!(value["outcome"], "disabled");
    }

    #[test]
    fn only_delivered_counts_as_delivered() {
        assert!(DeliveryOutcome::Delivered { status: 200 }.is_delivered());
        assert!(!DeliveryOutcome::Rejected {
            status: 500,
            body: String::new()
        }
        .is_delivered());
        assert!(!DeliveryOutcome::Disabled.is_delivered());
    }

    #[test]
    fn display_mentions_http_status() {
        let text = DeliveryOutcome::Rejected {
            status: 503,
            body: "unavailable".into(),
        }
        .to_string();
        assert!(text.contains("503"));
    }
}
