use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

/// Actor recorded when a request carries no `userId`.
pub const UNKNOWN_ACTOR: &str = "unknown";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CrudType {
    Create,
    Read,
    Update,
    Delete,
}

/// Payload accepted by the external audit logging service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AuditEvent {
    pub crud_type: CrudType,
    pub user_id: String,
    pub subject_id: String,
    pub attribute_name: Option<String>,
    pub before_value: Option<String>,
    pub after_value: Option<String>,
    pub remarks: String,
    pub date_time: DateTime<Utc>,
}

impl AuditEvent {
    pub fn new(crud_type: CrudType, actor: &str, subject_id: &str, remarks: &str) -> Self {
        Self {
            crud_type,
            user_id: actor.to_string(),
            subject_id: subject_id.to_string(),
            attribute_name: None,
            before_value: None,
            after_value: None,
            remarks: remarks.to_string(),
            date_time: Utc::now(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("invalid audit url: {0}")]
    Url(#[from] url::ParseError),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("audit service responded with {0}")]
    Status(reqwest::StatusCode),
}

/// Fire-and-forget sink for audit events. Delivery failures never reach the caller.
pub trait AuditSink: Send + Sync {
    fn submit(&self, event: AuditEvent);

    fn is_enabled(&self) -> bool {
        true
    }

    fn send_create_log(&self, actor: &str, subject_id: &str, remarks: &str) {
        self.submit(AuditEvent::new(CrudType::Create, actor, subject_id, remarks));
    }

    fn send_delete_log(&self, actor: &str, subject_id: &str, remarks: &str) {
        self.submit(AuditEvent::new(CrudType::Delete, actor, subject_id, remarks));
    }

    fn send_read_log(&self, actor: &str, subject_id: &str, remarks: &str) {
        self.submit(AuditEvent::new(CrudType::Read, actor, subject_id, remarks));
    }

    fn send_update_log(
        &self,
        actor: &str,
        subject_id: &str,
        attribute_name: &str,
        before_value: &str,
        after_value: &str,
        remarks: &str,
    ) {
        let mut event = AuditEvent::new(CrudType::Update, actor, subject_id, remarks);
        event.attribute_name = Some(attribute_name.to_string());
        event.before_value = Some(before_value.to_string());
        event.after_value = Some(after_value.to_string());
        self.submit(event);
    }
}

/// Used when no audit service is configured.
#[derive(Debug, Clone, Default)]
pub struct NoopAuditSink;

impl AuditSink for NoopAuditSink {
    fn submit(&self, event: AuditEvent) {
        debug!("Audit disabled, dropping {:?} event for {}", event.crud_type, event.subject_id);
    }

    fn is_enabled(&self) -> bool {
        false
    }
}

/// Posts events to `{base}/api/logs` on a background task.
#[derive(Clone)]
pub struct HttpAuditSink {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpAuditSink {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, AuditError> {
        let endpoint = Url::parse(base_url)?.join("api/logs")?;
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn deliver(client: reqwest::Client, endpoint: Url, event: &AuditEvent) -> Result<(), AuditError> {
        let response = client.post(endpoint).json(event).send().await?;
        if !response.status().is_success() {
            return Err(AuditError::Status(response.status()));
        }
        Ok(())
    }
}

impl AuditSink for HttpAuditSink {
    fn submit(&self, event: AuditEvent) {
        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                warn!("No async runtime, audit event for {} dropped", event.subject_id);
                return;
            }
        };
        let client = self.client.clone();
        let endpoint = self.endpoint.clone();
        handle.spawn(async move {
            if let Err(e) = Self::deliver(client, endpoint, &event).await {
                warn!(
                    "Failed to send {:?} audit event for {}: {}",
                    event.crud_type, event.subject_id, e
                );
            }
        });
    }
}

/// Keeps submitted events in memory; handy for tests and local runs.
#[derive(Clone, Default)]
pub struct RecordingAuditSink {
    events: Arc<Mutex<Vec<AuditEvent>>>,
}

impl RecordingAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().clone()
    }
}

impl AuditSink for RecordingAuditSink {
    fn submit(&self, event: AuditEvent) {
        self.events.lock().push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serializes_in_camel_case() {
        let sink = RecordingAuditSink::new();
        sink.send_update_log("agent-7", "client-1", "Currency", "USD", "EUR", "changed");

        let events = sink.events();
        assert_eq!(events.len(), 1);
        let json = serde_json::to_value(&events[0]).unwrap();
        assert_eq!(json["crudType"], "UPDATE");
        assert_eq!(json["userId"], "agent-7");
        assert_eq!(json["subjectId"], "client-1");
        assert_eq!(json["attributeName"], "Currency");
        assert_eq!(json["beforeValue"], "USD");
        assert_eq!(json["afterValue"], "EUR");
        assert!(json["dateTime"].is_string());
    }

    #[test]
    fn test_plain_events_have_no_attribute() {
        let sink = RecordingAuditSink::new();
        sink.send_create_log("agent", "client", "created");
        sink.send_read_log("agent", "client", "read");
        sink.send_delete_log("agent", "client", "deleted");

        let kinds: Vec<CrudType> = sink.events().iter().map(|e| e.crud_type).collect();
        assert_eq!(kinds, vec![CrudType::Create, CrudType::Read, CrudType::Delete]);
        assert!(sink.events().iter().all(|e| e.attribute_name.is_none()));
    }

    #[test]
    fn test_http_sink_targets_logs_endpoint() {
        let sink = HttpAuditSink::new("http://audit.local:8081/", Duration::from_secs(1)).unwrap();
        assert_eq!(sink.endpoint().as_str(), "http://audit.local:8081/api/logs");
        assert!(HttpAuditSink::new("not a url", Duration::from_secs(1)).is_err());
    }

    #[test]
    fn test_http_sink_without_runtime_does_not_panic() {
        let sink = HttpAuditSink::new("http://audit.local:8081/", Duration::from_secs(1)).unwrap();
        sink.send_read_log("agent", "client", "read");
    }

    #[test]
    fn test_noop_sink_reports_disabled() {
        let sink = NoopAuditSink;
        assert!(!sink.is_enabled());
        sink.send_create_log("agent", "client", "created");
    }
}
