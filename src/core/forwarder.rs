use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::core::config::EndpointConfig;
use crate::core::event::{EventData, ResponseObject};
use crate::core::models::outcome::DeliveryOutcome;
use crate::core::models::usage::{EventStatus, UsageRecord};
use crate::core::payload::build_payload;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);
/// Longest rejection body kept for logs and outcomes.
const MAX_BODY_BYTES: usize = 512;

#[derive(Error, Debug)]
pub enum ForwarderError {
    #[error("Credential contains characters not allowed in an HTTP header")]
    InvalidCredential(#[from] reqwest::header::InvalidHeaderValue),
    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

#[derive(Error, Debug)]
enum DeliveryError {
    #[error("Endpoint returned HTTP {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("Failed to send usage event: {0}")]
    Transport(#[from] reqwest::Error),
}

#[derive(Debug)]
struct Inner {
    config: EndpointConfig,
    client: reqwest::Client,
}

/// Logging callback that forwards usage events to an HTTP endpoint.
///
/// None of the entry points return errors or panic on bad input: every
/// failure is logged and the event is dropped, so the request that triggered
/// the callback is never affected. Cloning is cheap.
#[derive(Debug, Clone)]
pub struct UsageEventForwarder {
    inner: Arc<Inner>,
}

fn auth_headers(credential: Option<&str>) -> Result<HeaderMap, ForwarderError> {
    let mut headers = HeaderMap::new();
    if let Some(key) = credential {
        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", key))?;
        bearer.set_sensitive(true);
        let mut apikey = HeaderValue::from_str(key)?;
        apikey.set_sensitive(true);
        headers.insert(AUTHORIZATION, bearer);
        headers.insert("apikey", apikey);
    }
    Ok(headers)
}

/// Cut `body` to at most [`MAX_BODY_BYTES`] on a char boundary.
fn truncate_body(mut body: String) -> String {
    if body.len() > MAX_BODY_BYTES {
        let mut end = MAX_BODY_BYTES;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        body.truncate(end);
        body.push_str("...");
    }
    body
}

impl UsageEventForwarder {
    pub fn new(config: &EndpointConfig) -> Result<Self, ForwarderError> {
        Self::with_timeout(config, REQUEST_TIMEOUT)
    }

    pub(crate) fn with_timeout(
        config: &EndpointConfig,
        timeout: Duration,
    ) -> Result<Self, ForwarderError> {
        // No idle pooling: the sync path drives each request on its own
        // short-lived runtime, and a pooled connection would outlive it.
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(0)
            .redirect(reqwest::redirect::Policy::none())
            .default_headers(auth_headers(config.credential())?)
            .build()?;
        Ok(Self {
            inner: Arc::new(Inner {
                config: config.clone(),
                client,
            }),
        })
    }

    pub fn config(&self) -> &EndpointConfig {
        &self.inner.config
    }

    pub async fn log_success_event(&self, event: &EventData, response: &ResponseObject) {
        self.send_event(EventStatus::Success, event, response).await;
    }

    pub async fn log_failure_event(&self, event: &EventData, response: &ResponseObject) {
        self.send_event(EventStatus::Failure, event, response).await;
    }

    /// Synchronous success callback. See [`Self::dispatch`].
    pub fn on_success(&self, event: &EventData, response: &ResponseObject) {
        self.dispatch(EventStatus::Success, event, response);
    }

    /// Synchronous failure callback. See [`Self::dispatch`].
    pub fn on_failure(&self, event: &EventData, response: &ResponseObject) {
        self.dispatch(EventStatus::Failure, event, response);
    }

    /// Build the payload and deliver it, reporting what happened.
    pub async fn send_event(
        &self,
        status: EventStatus,
        event: &EventData,
        response: &ResponseObject,
    ) -> DeliveryOutcome {
        match self.prepare(status, event, response) {
            Ok(record) => self.deliver(&record).await,
            Err(outcome) => outcome,
        }
    }

    /// Bridge a synchronous call site to the async delivery.
    ///
    /// Inside a tokio runtime the delivery is spawned as a detached task and
    /// this returns immediately; blocking on the caller's own runtime would
    /// deadlock. Outside a runtime the delivery runs to completion on a
    /// temporary current-thread runtime.
    pub fn dispatch(&self, status: EventStatus, event: &EventData, response: &ResponseObject) {
        let record = match self.prepare(status, event, response) {
            Ok(record) => record,
            Err(_) => return,
        };

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let forwarder = self.clone();
                handle.spawn(async move {
                    forwarder.deliver(&record).await;
                });
            }
            Err(_) => match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(runtime) => {
                    runtime.block_on(self.deliver(&record));
                }
                Err(e) => {
                    warn!(error = %e, "Failed to start runtime for usage event, dropping");
                }
            },
        }
    }

    fn prepare(
        &self,
        status: EventStatus,
        event: &EventData,
        response: &ResponseObject,
    ) -> Result<UsageRecord, DeliveryOutcome> {
        debug!(%status, call_id = ?event.call_id(), "Received usage event");

        if !self.inner.config.is_enabled() {
            debug!("No usage endpoint URL configured, skipping event");
            return Err(DeliveryOutcome::Disabled);
        }

        match build_payload(status, event, response) {
            Ok(record) => {
                debug!(
                    %status,
                    call_id = ?record.id,
                    model = %record.model,
                    total_tokens = record.usage.total_tokens,
                    "Built usage payload"
                );
                Ok(record)
            }
            Err(e) => {
                warn!(%status, error = %e, "Failed to build usage payload, dropping event");
                Err(DeliveryOutcome::Dropped {
                    reason: e.to_string(),
                })
            }
        }
    }

    /// POST one record. Never retried.
    pub async fn deliver(&self, record: &UsageRecord) -> DeliveryOutcome {
        let Some(url) = self.inner.config.url() else {
            return DeliveryOutcome::Disabled;
        };

        debug!(url, call_id = ?record.id, "Sending usage event");
        match self.post(url, record).await {
            Ok(status) => {
                info!(http_status = status, call_id = ?record.id, "Usage event delivered");
                DeliveryOutcome::Delivered { status }
            }
            Err(DeliveryError::Rejected { status, body }) => {
                warn!(http_status = status, body = %body, "Usage endpoint rejected event");
                DeliveryOutcome::Rejected { status, body }
            }
            Err(e) => {
                warn!(error = %e, call_id = ?record.id, "Failed to send usage event");
                DeliveryOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    async fn post(&self, url: &str, record: &UsageRecord) -> Result<u16, DeliveryError> {
        let response = self.inner.client.post(url).json(record).send().await?;

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            let body = truncate_body(response.text().await.unwrap_or_default());
            return Err(DeliveryError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        Ok(status.as_u16())
    }
}
