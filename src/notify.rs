//! Notification sinks for flushed candidates.
//!
//! The flush controller hands the winning candidate's text to one of these.
//! Delivery is fire-and-forget from the pipeline's point of view: failures
//! are logged by the caller and never touch tracker or queue state. Retry
//! policy, if any, belongs to the receiving service, not here.

use crate::defaults;
use crate::error::{Result, TextsiftError};
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Mutex;
use std::time::Duration;

/// Outbound payload shape: a JSON object with one field holding the text.
#[derive(Debug, Serialize)]
struct RawTextPayload<'a> {
    #[serde(rename = "rawText")]
    raw_text: &'a str,
}

/// Delivers one flushed string out-of-process.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Deliver `text`. Errors are for the caller to log, nothing more.
    async fn deliver(&self, text: &str) -> Result<()>;

    /// Name for logging/debugging.
    fn name(&self) -> &'static str {
        "notify"
    }
}

/// POSTs `{"rawText": ...}` to a configured HTTP endpoint.
pub struct HttpNotificationSink {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpNotificationSink {
    pub fn new(endpoint: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TextsiftError::NotifyFailed {
                message: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self { client, endpoint })
    }

    pub fn with_default_timeout(endpoint: String) -> Result<Self> {
        Self::new(endpoint, Duration::from_secs(defaults::SINK_TIMEOUT_SECS))
    }
}

#[async_trait]
impl NotificationSink for HttpNotificationSink {
    async fn deliver(&self, text: &str) -> Result<()> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&RawTextPayload { raw_text: text })
            .send()
            .await
            .map_err(|e| TextsiftError::NotifyFailed {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TextsiftError::NotifyRejected {
                status: status.to_string(),
            });
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

/// Fallback sink when no endpoint is configured — prints to stdout.
pub struct LogNotificationSink;

#[async_trait]
impl NotificationSink for LogNotificationSink {
    async fn deliver(&self, text: &str) -> Result<()> {
        println!("posting: {}", text);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}

/// Collects delivered texts for tests and library use.
#[derive(Default)]
pub struct CollectorNotificationSink {
    delivered: Mutex<Vec<String>>,
}

impl CollectorNotificationSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delivered(&self) -> Vec<String> {
        self.delivered
            .lock()
            .map(|d| d.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl NotificationSink for CollectorNotificationSink {
    async fn deliver(&self, text: &str) -> Result<()> {
        if let Ok(mut delivered) = self.delivered.lock() {
            delivered.push(text.to_string());
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "collector"
    }
}
