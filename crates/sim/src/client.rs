//! Heartbeat client.

use std::time::Duration;

use chrono::Utc;
use serde::Serialize;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server rejected heartbeat ({status}): {body}")]
    Rejected {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeartbeatPayload {
    pub process_exists: bool,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub declared_level: Option<i64>,
}

impl HeartbeatPayload {
    /// Payload stamped with the current UTC time.
    pub fn now(process_exists: bool, declared_level: Option<i64>) -> Self {
        Self {
            process_exists,
            timestamp: Utc::now().to_rfc3339(),
            declared_level,
        }
    }
}

pub struct HeartbeatClient {
    client: reqwest::Client,
    api_base: String,
    component_id: String,
}

impl HeartbeatClient {
    /// `api_base` is the versioned API root, e.g. `http://localhost:8000/api/v1`.
    pub fn new(api_base: &str, component_id: &str) -> Result<Self, SimError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            component_id: component_id.to_string(),
        })
    }

    pub fn url(&self) -> String {
        format!("{}/heartbeat/{}", self.api_base, self.component_id)
    }

    pub async fn send(&self, payload: &HeartbeatPayload) -> Result<(), SimError> {
        let response = self.client.post(self.url()).json(payload).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(SimError::Rejected { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_without_double_slash() {
        let client = HeartbeatClient::new("http://localhost:8000/api/v1/", "feeder").unwrap();
        assert_eq!(client.url(), "http://localhost:8000/api/v1/heartbeat/feeder");
    }

    #[test]
    fn payload_omits_missing_level() {
        let payload = HeartbeatPayload::now(true, None);
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["process_exists"], true);
        assert!(json.get("declared_level").is_none());
        assert!(chrono::DateTime::parse_from_rfc3339(json["timestamp"].as_str().unwrap()).is_ok());
    }
}
