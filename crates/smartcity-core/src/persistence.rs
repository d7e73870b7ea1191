//! Write-only persistence sinks for submitted events.
//!
//! The in-memory `EventStore` stays authoritative. A sink only mirrors new
//! events somewhere durable and may hand back its own id. Nothing is loaded
//! back into the app at startup.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::{Map, Value, json};
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::config::{Backend, PersistenceConfig};
use crate::event::{Event, EventId};
use crate::store::PersistOutcome;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("failed to write event file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode event: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("response carried no document name")]
    MissingName,
    #[error("persistence backend misconfigured: {0}")]
    NotConfigured(&'static str),
}

/// Configured persistence collaborator.
#[derive(Debug, Clone)]
pub enum EventSink {
    /// Memory only; keeps the local id.
    Local,
    Jsonl(JsonlSink),
    Firestore(FirestoreSink),
}

impl EventSink {
    /// Builds the sink selected by `[persistence] backend`.
    ///
    /// # Errors
    /// `NotConfigured` when the firestore backend has no project id.
    pub fn from_config(config: &PersistenceConfig) -> Result<Self, PersistError> {
        let sink = match config.backend {
            Backend::Local => EventSink::Local,
            Backend::Jsonl => EventSink::Jsonl(JsonlSink::new(config.effective_jsonl_path())),
            Backend::Firestore => {
                let project = config
                    .firestore
                    .project_id
                    .as_deref()
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .ok_or(PersistError::NotConfigured(
                        "persistence.firestore.project_id is required",
                    ))?;
                EventSink::Firestore(FirestoreSink::new(
                    &config.firestore.base_url,
                    project,
                    config.firestore.api_key.clone(),
                ))
            }
        };
        Ok(sink)
    }

    pub fn is_remote(&self) -> bool {
        !matches!(self, EventSink::Local)
    }

    pub fn name(&self) -> &'static str {
        match self {
            EventSink::Local => "local",
            EventSink::Jsonl(_) => "jsonl",
            EventSink::Firestore(_) => "firestore",
        }
    }

    /// Writes one document and returns the id it was stored under.
    ///
    /// # Errors
    /// Any I/O, encoding, transport or status failure of the backend.
    pub async fn add_document(&self, collection: &str, event: &Event) -> Result<EventId, PersistError> {
        match self {
            EventSink::Local => Ok(event.id.clone()),
            EventSink::Jsonl(sink) => sink.add_document(collection, event).await,
            EventSink::Firestore(sink) => sink.add_document(collection, event).await,
        }
    }

    /// Like `add_document`, folded into a `PersistOutcome`.
    pub async fn persist(&self, collection: &str, event: &Event) -> PersistOutcome {
        match self.add_document(collection, event).await {
            Ok(id) => {
                info!(backend = self.name(), %id, "Event persisted");
                PersistOutcome::Stored { id }
            }
            Err(err) => {
                warn!(backend = self.name(), error = %err, "Event persistence failed");
                PersistOutcome::Failed {
                    reason: err.to_string(),
                }
            }
        }
    }
}

// ============================================================================
// JSON lines
// ============================================================================

/// Appends one JSON object per line. Ids are fresh UUIDs.
#[derive(Debug, Clone)]
pub struct JsonlSink {
    path: PathBuf,
}

#[derive(Debug, Deserialize)]
struct JsonlRecord {
    #[serde(default)]
    collection: Option<String>,
    #[serde(flatten)]
    event: Event,
}

impl JsonlSink {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    async fn add_document(&self, collection: &str, event: &Event) -> Result<EventId, PersistError> {
        let id = EventId(uuid::Uuid::new_v4().to_string());
        let stored = event.clone().with_id(id.clone());

        let mut record = serde_json::to_value(&stored)?;
        if let Value::Object(map) = &mut record {
            map.insert("collection".to_string(), Value::String(collection.to_string()));
        }
        let mut line = serde_json::to_string(&record)?;
        line.push('\n');

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        debug!(path = %self.path.display(), %id, "Appended event line");
        Ok(id)
    }
}

/// Reads events written by the JSON-lines sink, in file order.
///
/// A missing file is an empty list. Lines that do not parse are skipped.
/// When `collection` is given, only records of that collection are returned;
/// records written without one are always included.
///
/// # Errors
/// Fails only when the file exists but cannot be read.
pub fn read_jsonl(path: &Path, collection: Option<&str>) -> Result<Vec<Event>, PersistError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let contents = fs::read_to_string(path)?;
    let mut events = Vec::new();
    for (index, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<JsonlRecord>(line) {
            Ok(record) => {
                let wanted = match (collection, record.collection.as_deref()) {
                    (Some(want), Some(have)) => want == have,
                    _ => true,
                };
                if wanted {
                    events.push(record.event);
                }
            }
            Err(err) => {
                warn!(line = index + 1, error = %err, "Skipping unreadable event line");
            }
        }
    }
    Ok(events)
}

// ============================================================================
// Firestore REST
// ============================================================================

/// Creates documents through the Firestore REST API.
#[derive(Debug, Clone)]
pub struct FirestoreSink {
    http: reqwest::Client,
    base_url: String,
    project_id: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreatedDocument {
    name: Option<String>,
}

impl FirestoreSink {
    pub fn new(base_url: &str, project_id: &str, api_key: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            project_id: project_id.to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        }
    }

    fn collection_url(&self, collection: &str) -> String {
        format!(
            "{}/v1/projects/{}/databases/(default)/documents/{}",
            self.base_url, self.project_id, collection
        )
    }

    async fn add_document(&self, collection: &str, event: &Event) -> Result<EventId, PersistError> {
        let mut request = self
            .http
            .post(self.collection_url(collection))
            .json(&firestore_document(event));
        if let Some(key) = &self.api_key {
            request = request.query(&[("key", key.as_str())]);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PersistError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let created: CreatedDocument = response.json().await?;
        created
            .name
            .as_deref()
            .and_then(|name| name.rsplit('/').next())
            .filter(|id| !id.is_empty())
            .map(EventId::from)
            .ok_or(PersistError::MissingName)
    }
}

/// Encodes an event as a Firestore document body with typed values.
fn firestore_document(event: &Event) -> Value {
    let mut fields = Map::new();
    fields.insert("id".into(), json!({ "stringValue": event.id.as_str() }));
    fields.insert("type".into(), json!({ "stringValue": event.category.as_str() }));
    fields.insert(
        "description".into(),
        json!({ "stringValue": event.description }),
    );
    fields.insert(
        "latitude".into(),
        json!({ "doubleValue": event.position.latitude }),
    );
    fields.insert(
        "longitude".into(),
        json!({ "doubleValue": event.position.longitude }),
    );
    // Firestore encodes int64 as a decimal string.
    fields.insert(
        "radius".into(),
        json!({ "integerValue": event.radius.to_string() }),
    );
    fields.insert(
        "isEmergency".into(),
        json!({ "booleanValue": event.emergency }),
    );
    json!({ "fields": fields })
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::event::{Category, GeoPoint};

    fn sample_event() -> Event {
        Event {
            id: EventId::from("1700000000000"),
            category: Category::Flood,
            description: "Street under water".to_string(),
            position: GeoPoint::new(41.01, 28.97),
            radius: 100,
            emergency: false,
        }
    }

    #[tokio::test]
    async fn test_local_sink_keeps_id() {
        let outcome = EventSink::Local.persist("events", &sample_event()).await;
        assert_eq!(
            outcome,
            PersistOutcome::Stored {
                id: EventId::from("1700000000000")
            }
        );
    }

    #[tokio::test]
    async fn test_jsonl_sink_appends_and_reads_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data").join("events.jsonl");
        let sink = EventSink::Jsonl(JsonlSink::new(path.clone()));

        let first = sink.add_document("events", &sample_event()).await.unwrap();
        let mut second_event = sample_event();
        second_event.category = Category::Roadwork;
        let second = sink.add_document("events", &second_event).await.unwrap();

        assert_ne!(first, second);
        assert_ne!(first.as_str(), "1700000000000");

        let events = read_jsonl(&path, Some("events")).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].id, first);
        assert_eq!(events[1].category, Category::Roadwork);
        assert!(read_jsonl(&path, Some("other")).unwrap().is_empty());
    }

    #[test]
    fn test_read_jsonl_skips_bad_lines_and_missing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("events.jsonl");
        assert!(read_jsonl(&path, None).unwrap().is_empty());

        fs::write(
            &path,
            "not json\n\n{\"id\":\"a\",\"type\":\"flood\",\"latitude\":41.0,\"longitude\":29.0,\"radius\":100}\n",
        )
        .unwrap();
        let events = read_jsonl(&path, None).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id.as_str(), "a");
    }

    #[tokio::test]
    async fn test_firestore_sink_adopts_document_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/projects/demo/databases/(default)/documents/events"))
            .and(query_param("key", "secret"))
            .and(body_partial_json(json!({
                "fields": {
                    "type": { "stringValue": "flood" },
                    "radius": { "integerValue": "100" },
                    "isEmergency": { "booleanValue": false }
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "projects/demo/databases/(default)/documents/events/abc123",
                "fields": {}
            })))
            .mount(&server)
            .await;

        let sink = EventSink::Firestore(FirestoreSink::new(
            &server.uri(),
            "demo",
            Some("secret".to_string()),
        ));
        let outcome = sink.persist("events", &sample_event()).await;
        assert_eq!(
            outcome,
            PersistOutcome::Stored {
                id: EventId::from("abc123")
            }
        );
    }

    #[tokio::test]
    async fn test_firestore_failure_is_an_outcome() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
            .mount(&server)
            .await;

        let sink = EventSink::Firestore(FirestoreSink::new(&server.uri(), "demo", None));
        let outcome = sink.persist("events", &sample_event()).await;
        match outcome {
            PersistOutcome::Failed { reason } => assert!(reason.contains("503"), "{reason}"),
            PersistOutcome::Stored { .. } => panic!("expected failure"),
        }
    }

    #[test]
    fn test_firestore_backend_requires_project() {
        let mut config = PersistenceConfig {
            backend: Backend::Firestore,
            ..PersistenceConfig::default()
        };
        assert!(matches!(
            EventSink::from_config(&config),
            Err(PersistError::NotConfigured(_))
        ));

        config.firestore.project_id = Some("demo".to_string());
        let sink = EventSink::from_config(&config).unwrap();
        assert_eq!(sink.name(), "firestore");
        assert!(sink.is_remote());
    }
}
