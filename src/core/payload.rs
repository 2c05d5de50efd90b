use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use crate::core::event::{is_truthy, json_type_name, EventData, ResponseObject};
use crate::core::models::usage::{EventStatus, TokenUsage, UsageRecord};

const UNKNOWN_MODEL: &str = "unknown";

#[derive(Error, Debug)]
pub enum PayloadError {
    #[error("Field '{field}' must be {expected}, got {found}")]
    UnexpectedType {
        field: &'static str,
        expected: &'static str,
        found: &'static str,
    },
    #[error("Token counter '{field}' is not a non-negative integer: {value}")]
    InvalidCounter { field: &'static str, value: Value },
    #[error("response_cost is not a finite number: {0:?}")]
    InvalidCost(String),
}

fn unexpected(field: &'static str, expected: &'static str, found: &Value) -> PayloadError {
    PayloadError::UnexpectedType {
        field,
        expected,
        found: json_type_name(found),
    }
}

/// Normalize one event into the record sent to the ingestion endpoint.
///
/// Missing fields fall back to defaults. A field with a shape that cannot be
/// normalized aborts the whole record; the provider request id is the one
/// exception and degrades to `None` instead.
pub fn build_payload(
    status: EventStatus,
    event: &EventData,
    response: &ResponseObject,
) -> Result<UsageRecord, PayloadError> {
    Ok(UsageRecord {
        id: resolve_call_id(event)?,
        model: resolve_model(event)?,
        usage: resolve_usage(event, response)?,
        response_cost: resolve_cost(event)?,
        metadata: resolve_metadata(event)?,
        request_id: resolve_request_id(response),
        status,
    })
}

fn truthy<'a>(value: Option<&'a Value>) -> Option<&'a Value> {
    value.filter(|v| is_truthy(v))
}

/// `litellm_params` is only consulted when a top-level field is missing.
fn litellm_params(event: &EventData) -> Result<Option<&Map<String, Value>>, PayloadError> {
    match event.get("litellm_params") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(params)) => Ok(Some(params)),
        Some(other) => Err(unexpected("litellm_params", "an object", other)),
    }
}

fn resolve_call_id(event: &EventData) -> Result<Option<String>, PayloadError> {
    match event.get("litellm_call_id") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(id)) => Ok(Some(id.clone())),
        Some(other) => Err(unexpected("litellm_call_id", "a string", other)),
    }
}

fn resolve_model(event: &EventData) -> Result<String, PayloadError> {
    let candidate = match truthy(event.get("model")).or_else(|| truthy(event.get("complete_model"))) {
        Some(value) => Some(value),
        None => truthy(litellm_params(event)?.and_then(|p| p.get("model"))),
    };
    match candidate {
        None => Ok(UNKNOWN_MODEL.to_string()),
        Some(Value::String(model)) => Ok(model.clone()),
        Some(other) => Err(unexpected("model", "a string", other)),
    }
}

fn resolve_metadata(event: &EventData) -> Result<Value, PayloadError> {
    if let Some(metadata) = truthy(event.get("metadata")) {
        return Ok(metadata.clone());
    }
    let nested = truthy(litellm_params(event)?.and_then(|p| p.get("metadata")));
    Ok(nested.cloned().unwrap_or_else(|| Value::Object(Map::new())))
}

fn resolve_usage(event: &EventData, response: &ResponseObject) -> Result<TokenUsage, PayloadError> {
    let raw = match truthy(event.get("usage")) {
        Some(usage) => Some(usage.clone()),
        None => usage_from_response(response),
    };

    match raw {
        None => Ok(TokenUsage::default()),
        Some(Value::Object(counters)) => Ok(TokenUsage {
            prompt_tokens: counter(&counters, "prompt_tokens")?,
            completion_tokens: counter(&counters, "completion_tokens")?,
            total_tokens: counter(&counters, "total_tokens")?,
        }),
        Some(other) => Err(unexpected("usage", "an object", &other)),
    }
}

fn usage_from_response(response: &ResponseObject) -> Option<Value> {
    match response.field("usage") {
        Ok(usage) => usage.filter(is_truthy),
        Err(e) => {
            debug!(error = %e, "Could not read usage from response object");
            None
        }
    }
}

fn counter(counters: &Map<String, Value>, field: &'static str) -> Result<u64, PayloadError> {
    let value = match counters.get(field) {
        None | Some(Value::Null) => return Ok(0),
        Some(value) => value,
    };
    let parsed = match value {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| *f >= 0.0 && f.fract() == 0.0 && *f <= u64::MAX as f64)
                .map(|f| f as u64)
        }),
        _ => None,
    };
    parsed.ok_or_else(|| PayloadError::InvalidCounter {
        field,
        value: value.clone(),
    })
}

fn resolve_cost(event: &EventData) -> Result<f64, PayloadError> {
    let value = match truthy(event.get("response_cost")) {
        None => return Ok(0.0),
        Some(value) => value,
    };
    let cost = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::Bool(_) => 1.0,
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| PayloadError::InvalidCost(s.clone()))?,
        other => return Err(unexpected("response_cost", "a number", other)),
    };
    if !cost.is_finite() {
        return Err(PayloadError::InvalidCost(value.to_string()));
    }
    Ok(cost)
}

fn resolve_request_id(response: &ResponseObject) -> Option<String> {
    match response.field("id") {
        Ok(Some(Value::String(id))) => Some(id),
        Ok(Some(Value::Number(id))) => Some(id.to_string()),
        Ok(_) => None,
        Err(e) => {
            debug!(error = %e, "Could not read provider request id");
            None
        }
    }
}
