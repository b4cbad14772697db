//! Analytics export for metrics snapshots
//!
//! Packages a snapshot with timestamp, client identity and page URL, then
//! POSTs it as JSON to the configured endpoint. Transmission failures are
//! logged and swallowed: metrics delivery must never disturb the page.

use crate::metrics::record::MetricsRecord;
use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};

/// Wire payload for one metrics report
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsPayload {
    #[serde(flatten)]
    pub metrics: MetricsRecord,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
    pub user_agent: String,
    pub url: String,
}

/// Sends metrics snapshots to an optional analytics endpoint.
///
/// Without an endpoint, `send` only surfaces the payload (logged and
/// returned) so development setups can inspect it.
pub struct AnalyticsExporter {
    endpoint: Option<String>,
    user_agent: String,
    page_url: String,
    client: reqwest::Client,
}

impl AnalyticsExporter {
    pub fn new(
        endpoint: Option<String>,
        user_agent: impl Into<String>,
        page_url: impl Into<String>,
    ) -> Self {
        Self {
            endpoint,
            user_agent: user_agent.into(),
            page_url: page_url.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Build the wire payload for a snapshot
    pub fn payload(&self, snapshot: MetricsRecord) -> AnalyticsPayload {
        AnalyticsPayload {
            metrics: snapshot,
            timestamp: Utc::now().timestamp_millis(),
            user_agent: self.user_agent.clone(),
            url: self.page_url.clone(),
        }
    }

    /// Deliver a snapshot, best effort.
    ///
    /// Returns the payload either way so callers can inspect what was (or
    /// would have been) reported.
    pub async fn send(&self, snapshot: MetricsRecord) -> AnalyticsPayload {
        let payload = self.payload(snapshot);

        match &self.endpoint {
            Some(endpoint) => {
                match self.client.post(endpoint).json(&payload).send().await {
                    Ok(response) => {
                        // Response body intentionally ignored
                        debug!(status = response.status().as_u16(), "Metrics sent");
                    }
                    Err(e) => {
                        warn!("Failed to send metrics: {}", e);
                    }
                }
            }
            None => {
                info!(payload = ?payload, "Analytics data (no endpoint configured)");
            }
        }

        payload
    }
}
