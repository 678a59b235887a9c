//! HTTP object storage
//!
//! Objects live at `<base_url>/<bucket>/<path>`. Reads are `GET`, writes are
//! `PUT`, existence checks are `HEAD`. An optional bearer token is attached to
//! every request.
//!
//! Downloads are spooled chunk by chunk into an anonymous temporary file, so
//! an extract of any size is read through a file handle instead of memory.

use crate::adapters::storage::ObjectStore;
use crate::config::{SecretString, StorageConfig};
use crate::core::reader::ByteStream;
use crate::domain::{Location, Result, TallyError};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, RequestBuilder, StatusCode};
use secrecy::ExposeSecret;
use std::io::{Seek, SeekFrom};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use url::Url;

/// Object store reached over HTTP
#[derive(Debug, Clone)]
pub struct HttpObjectStore {
    base_url: Url,
    client: Client,
    token: Option<SecretString>,
}

impl HttpObjectStore {
    /// Create a store below `base_url`
    ///
    /// # Errors
    ///
    /// Returns [`TallyError::Configuration`] for an unusable base URL or if the
    /// HTTP client cannot be built.
    pub fn new(base_url: &str, token: Option<SecretString>, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| {
            TallyError::Configuration(format!("Invalid storage base URL '{base_url}': {e}"))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(TallyError::Configuration(format!(
                "Storage base URL cannot carry object paths: {base_url}"
            )));
        }

        let client = ClientBuilder::new()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| TallyError::Configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url,
            client,
            token,
        })
    }

    /// Create a store from the `[storage]` section
    pub fn from_config(config: &StorageConfig) -> Result<Self> {
        let base_url = config.base_url.as_deref().ok_or_else(|| {
            TallyError::Configuration("storage.base_url is required for the http backend".into())
        })?;
        Self::new(
            base_url,
            config.token.clone(),
            Duration::from_secs(config.timeout_seconds),
        )
    }

    /// URL of an object, with each path segment percent-encoded
    pub fn object_url(&self, location: &Location) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                TallyError::Configuration(format!(
                    "Storage base URL cannot carry object paths: {}",
                    self.base_url
                ))
            })?;
            segments
                .pop_if_empty()
                .push(location.bucket())
                .extend(location.path().split('/'));
        }
        Ok(url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token.expose_secret().as_str()),
            None => request,
        }
    }
}

async fn failure(method: &str, url: &Url, response: reqwest::Response) -> TallyError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    TallyError::Storage(format!("{method} {url} failed with status {status}: {body}"))
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    fn backend_name(&self) -> &'static str {
        "http"
    }

    async fn open(&self, location: &Location) -> Result<ByteStream> {
        let url = self.object_url(location)?;
        let mut response = self
            .authorize(self.client.get(url.clone()))
            .send()
            .await
            .map_err(|e| TallyError::Storage(format!("GET {url} failed: {e}")))?;

        if !response.status().is_success() {
            return Err(failure("GET", &url, response).await);
        }

        let spool = tempfile::tempfile()
            .map_err(|e| TallyError::Storage(format!("Failed to create spool file: {e}")))?;
        let mut spool = tokio::fs::File::from_std(spool);
        let spool_err = |e: std::io::Error| TallyError::Storage(format!("Failed to spool {url}: {e}"));

        let mut bytes: u64 = 0;
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| TallyError::Storage(format!("Failed to download {url}: {e}")))?
        {
            spool.write_all(&chunk).await.map_err(spool_err)?;
            bytes += chunk.len() as u64;
        }
        spool.flush().await.map_err(spool_err)?;

        let mut file = spool.into_std().await;
        file.seek(SeekFrom::Start(0)).map_err(spool_err)?;

        tracing::debug!(location = %location, bytes, "Downloaded object");
        Ok(Box::new(file))
    }

    async fn write(&self, location: &Location, contents: Vec<u8>) -> Result<()> {
        let url = self.object_url(location)?;
        let content_type = if location.path().ends_with(".csv") {
            "text/csv"
        } else {
            "application/octet-stream"
        };
        let size = contents.len();

        let response = self
            .authorize(self.client.put(url.clone()))
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(contents)
            .send()
            .await
            .map_err(|e| TallyError::Storage(format!("PUT {url} failed: {e}")))?;

        if !response.status().is_success() {
            return Err(failure("PUT", &url, response).await);
        }

        tracing::debug!(location = %location, bytes = size, "Uploaded object");
        Ok(())
    }

    async fn exists(&self, location: &Location) -> Result<bool> {
        let url = self.object_url(location)?;
        let response = self
            .authorize(self.client.head(url.clone()))
            .send()
            .await
            .map_err(|e| TallyError::Storage(format!("HEAD {url} failed: {e}")))?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(false),
            status if status.is_success() => Ok(true),
            _ => Err(failure("HEAD", &url, response).await),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;
    use std::io::Read;

    fn store(server: &mockito::Server, token: Option<&str>) -> HttpObjectStore {
        HttpObjectStore::new(
            &server.url(),
            token.map(|t| secret_string(t.to_string())),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn test_object_url_encodes_segments() {
        let store = HttpObjectStore::new(
            "https://objects.example.com/v1/",
            None,
            Duration::from_secs(5),
        )
        .unwrap();
        let location = Location::new("landing", "org 1/source.txt").unwrap();

        assert_eq!(
            store.object_url(&location).unwrap().as_str(),
            "https://objects.example.com/v1/landing/org%201/source.txt"
        );
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        let result = HttpObjectStore::new("not a url", None, Duration::from_secs(5));
        assert!(matches!(result, Err(TallyError::Configuration(_))));

        let result = HttpObjectStore::new("mailto:ops@example.com", None, Duration::from_secs(5));
        assert!(matches!(result, Err(TallyError::Configuration(_))));
    }

    #[tokio::test]
    async fn test_open_streams_body_with_bearer_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/landing/extracts/target.json")
            .match_header("authorization", "Bearer t0ken")
            .with_status(200)
            .with_body("{\"id\":1}\n{\"id\":2}\n")
            .create_async()
            .await;

        let store = store(&server, Some("t0ken"));
        let location = Location::new("landing", "extracts/target.json").unwrap();
        let mut stream = store.open(&location).await.unwrap();

        let mut body = String::new();
        stream.read_to_string(&mut body).unwrap();
        assert_eq!(body, "{\"id\":1}\n{\"id\":2}\n");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_open_missing_object_is_storage_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/landing/missing.txt")
            .with_status(404)
            .with_body("no such object")
            .create_async()
            .await;

        let store = store(&server, None);
        let location = Location::new("landing", "missing.txt").unwrap();
        match store.open(&location).await {
            Err(TallyError::Storage(message)) => {
                assert!(message.contains("404"));
                assert!(message.contains("no such object"));
            }
            other => panic!("expected storage error, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_write_puts_contents() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PUT", "/reports/data_quality_summary.csv")
            .match_header("content-type", "text/csv")
            .match_body("a,b\n1,2\n")
            .with_status(201)
            .create_async()
            .await;

        let store = store(&server, None);
        let location = Location::new("reports", "data_quality_summary.csv").unwrap();
        store.write(&location, b"a,b\n1,2\n".to_vec()).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_write_failure_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("PUT", "/reports/summary.csv")
            .with_status(403)
            .create_async()
            .await;

        let store = store(&server, None);
        let location = Location::new("reports", "summary.csv").unwrap();
        let result = store.write(&location, b"x".to_vec()).await;
        assert!(matches!(result, Err(TallyError::Storage(_))));
    }

    #[tokio::test]
    async fn test_exists() {
        let mut server = mockito::Server::new_async().await;
        let _present = server
            .mock("HEAD", "/reports/present.csv")
            .with_status(200)
            .create_async()
            .await;
        let _absent = server
            .mock("HEAD", "/reports/absent.csv")
            .with_status(404)
            .create_async()
            .await;

        let store = store(&server, None);
        let present = Location::new("reports", "present.csv").unwrap();
        let absent = Location::new("reports", "absent.csv").unwrap();
        assert!(store.exists(&present).await.unwrap());
        assert!(!store.exists(&absent).await.unwrap());
    }
}
