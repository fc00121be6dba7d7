use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use common::FetchError;
use models::Record;

/// A place the raw catalog can be read from.
#[async_trait]
pub trait RemoteSource: Send + Sync {
    /// Label used in logs and errors.
    fn name(&self) -> &str;
    async fn fetch_entries(&self) -> Result<Vec<Record>, FetchError>;
}

/// `{ "entries": [...] }` envelope shared by the endpoint and the static file.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    entries: Value,
}

/// Entries of the envelope; anything other than an array counts as empty.
/// Entries are decoded leniently; only non-objects are skipped, with a warning.
fn entries_of(body: &[u8]) -> Result<Vec<Record>, FetchError> {
    let env: Envelope = serde_json::from_slice(body)?;
    let Value::Array(items) = env.entries else {
        return Ok(Vec::new());
    };
    let total = items.len();
    let entries: Vec<Record> = items
        .into_iter()
        .filter_map(|item| Record::from_json_lenient(item).ok())
        .collect();
    if entries.len() < total {
        warn!(skipped = total - entries.len(), "catalog entries skipped: not JSON objects");
    }
    Ok(entries)
}

/// Read-only HTTP endpoint.
pub struct HttpSource {
    client: reqwest::Client,
    url: String,
}

impl HttpSource {
    /// Without a timeout the request waits as long as the transport does.
    pub fn new(url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, FetchError> {
        let mut builder = reqwest::Client::builder();
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        let client = builder.build().map_err(|e| FetchError::Network(e.to_string()))?;
        Ok(Self { client, url: url.into() })
    }
}

#[async_trait]
impl RemoteSource for HttpSource {
    fn name(&self) -> &str { &self.url }

    async fn fetch_entries(&self) -> Result<Vec<Record>, FetchError> {
        let resp = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status { source_name: self.url.clone(), status: status.as_u16() });
        }
        let body = resp.bytes().await.map_err(|e| FetchError::Network(e.to_string()))?;
        let entries = entries_of(&body)?;
        debug!(source = %self.url, count = entries.len(), "remote entries fetched");
        Ok(entries)
    }
}

/// Static JSON file with the same envelope as the endpoint.
pub struct FileSource {
    path: PathBuf,
    label: String,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let label = path.display().to_string();
        Self { path, label }
    }
}

#[async_trait]
impl RemoteSource for FileSource {
    fn name(&self) -> &str { &self.label }

    async fn fetch_entries(&self) -> Result<Vec<Record>, FetchError> {
        let body = tokio::fs::read(&self.path).await.map_err(|e| FetchError::Io(e.to_string()))?;
        let entries = entries_of(&body)?;
        debug!(source = %self.label, count = entries.len(), "static entries loaded");
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn http_source_reads_entries() -> Result<(), anyhow::Error> {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/entries"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "count": 2,
                "entries": [
                    {"API": "Cats", "Link": "https://cats.test", "HTTPS": true},
                    {"API": "Dogs", "Link": "https://dogs.test", "HTTPS": false}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let src = HttpSource::new(format!("{}/entries", server.uri()), None)?;
        let entries = src.fetch_entries().await?;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].api.as_deref(), Some("Dogs"));
        Ok(())
    }

    #[tokio::test]
    async fn http_source_rejects_error_status() -> Result<(), anyhow::Error> {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let src = HttpSource::new(format!("{}/entries", server.uri()), None)?;
        let err = src.fetch_entries().await.expect_err("503 must fail");
        assert!(matches!(err, FetchError::Status { status: 503, .. }));
        Ok(())
    }

    #[tokio::test]
    async fn http_source_missing_entries_is_empty() -> Result<(), anyhow::Error> {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"count": 0})))
            .mount(&server)
            .await;

        let src = HttpSource::new(server.uri(), None)?;
        assert!(src.fetch_entries().await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn mistyped_entries_are_kept() -> Result<(), anyhow::Error> {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "entries": [{"API": "A", "HTTPS": "yes"}, {"API": "B"}, 7]
            })))
            .mount(&server)
            .await;

        let src = HttpSource::new(server.uri(), None)?;
        let entries = src.fetch_entries().await?;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].api.as_deref(), Some("A"));
        assert_eq!(entries[0].https, None);
        assert_eq!(entries[0].extra.get("HTTPS"), Some(&json!("yes")));
        assert_eq!(entries[1].api.as_deref(), Some("B"));
        Ok(())
    }

    #[tokio::test]
    async fn file_source_reads_and_tolerates_non_array() -> Result<(), anyhow::Error> {
        let dir = tempfile::tempdir()?;
        let good = dir.path().join("resources.json");
        tokio::fs::write(&good, br#"{"entries":[{"API":"Local","Category":"Dev"}]}"#).await?;
        let odd = dir.path().join("odd.json");
        tokio::fs::write(&odd, br#"{"entries":{"API":"not a list"}}"#).await?;

        let entries = FileSource::new(&good).fetch_entries().await?;
        assert_eq!(entries[0].category.as_deref(), Some("Dev"));
        assert!(FileSource::new(&odd).fetch_entries().await?.is_empty());

        let missing = FileSource::new(dir.path().join("missing.json"));
        assert!(matches!(missing.fetch_entries().await, Err(FetchError::Io(_))));
        Ok(())
    }
}
