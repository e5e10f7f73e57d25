// Monitoring endpoints
//
// Read-only views of live sessions, daemon logs and metrics.

use reqwest::Method;
use serde_json::Value;
use tracing::debug;

use crate::client::RestreamerClient;
use crate::endpoint::PathBuilder;
use crate::error::Error;
use crate::models::{ActiveSessions, SessionList};

impl RestreamerClient {
    /// List live client sessions.
    ///
    /// `GET /api/v3/sessions` -> `{"sessions": [...]}`
    pub async fn get_sessions(&mut self) -> Result<SessionList, Error> {
        let resp = self
            .call(Method::GET, &PathBuilder::api().lit("sessions").build(), None)
            .await?;
        self.decode_list(&resp, Some("sessions"))
    }

    /// Summary of all active sessions.
    ///
    /// `GET /api/v3/session/active`
    pub async fn get_active_sessions(&mut self) -> Result<ActiveSessions, Error> {
        self.get(&PathBuilder::api().lit("session").lit("active").build())
            .await
    }

    /// Daemon log as text.
    ///
    /// `GET /api/v3/log`
    ///
    /// A JSON string body is returned as-is; any other JSON is
    /// pretty-printed.
    pub async fn get_logs(&mut self) -> Result<String, Error> {
        let logs: Value = self.get(&PathBuilder::api().lit("log").build()).await?;
        match logs {
            Value::String(text) => Ok(text),
            other => {
                let pretty = serde_json::to_string_pretty(&other).map_err(|e| {
                    Error::UnexpectedResponse(format!("failed to format logs: {e}"))
                });
                self.record(pretty)
            }
        }
    }

    /// Describe the metrics the daemon collects.
    ///
    /// `GET /api/v3/metrics`
    pub async fn get_metrics_list(&mut self) -> Result<Value, Error> {
        self.get(&PathBuilder::api().lit("metrics").build()).await
    }

    /// Run a metrics query.
    ///
    /// `PUT /api/v3/metrics` with the query JSON
    pub async fn query_metrics(&mut self, query: &Value) -> Result<Value, Error> {
        if !query.is_object() {
            return self.invalid("metrics query must be a JSON object");
        }
        debug!("querying metrics");
        let resp = self
            .send_json(Method::PUT, &PathBuilder::api().lit("metrics").build(), query)
            .await?;
        self.decode(&resp)
    }

    /// Metrics in the Prometheus text exposition format.
    ///
    /// `GET /metrics` (no token)
    pub async fn get_prometheus_metrics(&mut self) -> Result<String, Error> {
        let resp = self
            .call_public(Method::GET, &PathBuilder::root("/metrics").build())
            .await?;
        Ok(resp.text())
    }
}
