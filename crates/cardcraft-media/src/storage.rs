//! Blob storage port and Azure Blob Storage adapter.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tokio::sync::Mutex;

use cardcraft_core::settings::StorageSettings;
use cardcraft_core::{Error, Result, short_suffix};

type HmacSha256 = Hmac<Sha256>;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Storage service API version sent with every request.
const STORAGE_API_VERSION: &str = "2021-08-06";

/// Compose a type-namespaced blob name with a random suffix:
/// `<category>/<basename>_<8-hex-chars>.<extension>`.
///
/// The suffix makes collisions practically unreachable; uploads overwrite
/// if one ever happens.
pub fn blob_name_for(basename: &str, category: &str, extension: &str) -> String {
    format!("{category}/{basename}_{}.{extension}", short_suffix())
}

/// Abstraction over blob storage backends.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Upload `data` under `blob_name` and return the publicly resolvable
    /// URL of the resulting object.
    async fn upload(&self, data: &[u8], blob_name: &str) -> Result<String>;
}

/// Blob uploads against the Azure Blob Storage REST surface.
///
/// Requests are signed with the account key (Shared Key Lite).
#[derive(Debug)]
pub struct AzureBlobStore {
    http: reqwest::Client,
    account: String,
    key: Vec<u8>,
    endpoint: String,
    container: String,
}

impl AzureBlobStore {
    /// Create a store from storage settings.
    ///
    /// The connection string must carry `AccountName` and `AccountKey`;
    /// `EndpointSuffix` defaults to `core.windows.net` and `BlobEndpoint`
    /// overrides the composed endpoint when present.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] when a required field is missing or the account
    /// key is not valid base64.
    pub fn from_settings(settings: &StorageSettings) -> Result<Self> {
        let fields: HashMap<&str, &str> = settings
            .connection_string
            .split(';')
            .filter_map(|pair| pair.split_once('='))
            .collect();

        let account = fields
            .get("AccountName")
            .ok_or_else(|| Error::config("connection string is missing AccountName"))?
            .to_string();
        let key = fields
            .get("AccountKey")
            .ok_or_else(|| Error::config("connection string is missing AccountKey"))
            .and_then(|raw| {
                BASE64
                    .decode(raw)
                    .map_err(|e| Error::config(format!("AccountKey is not valid base64: {e}")))
            })?;

        let endpoint = match fields.get("BlobEndpoint") {
            Some(endpoint) => endpoint.trim_end_matches('/').to_string(),
            None => {
                let protocol = fields.get("DefaultEndpointsProtocol").unwrap_or(&"https");
                let suffix = fields.get("EndpointSuffix").unwrap_or(&"core.windows.net");
                format!("{protocol}://{account}.blob.{suffix}")
            }
        };

        Ok(Self {
            http: reqwest::Client::new(),
            account,
            key,
            endpoint,
            container: settings.container.clone(),
        })
    }

    /// Override the service endpoint (tests point this at a local server).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn sign(&self, string_to_sign: &str) -> Result<String> {
        let mut mac = HmacSha256::new_from_slice(&self.key)
            .map_err(|e| Error::config(format!("unusable account key: {e}")))?;
        mac.update(string_to_sign.as_bytes());
        Ok(BASE64.encode(mac.finalize().into_bytes()))
    }
}

#[async_trait]
impl BlobStore for AzureBlobStore {
    async fn upload(&self, data: &[u8], blob_name: &str) -> Result<String> {
        let url = format!("{}/{}/{}", self.endpoint, self.container, blob_name);
        let date = Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string();
        let content_type = "application/octet-stream";

        // Shared Key Lite: VERB, Content-MD5, Content-Type, Date,
        // canonicalized x-ms headers, canonicalized resource.
        let string_to_sign = format!(
            "PUT\n\n{content_type}\n\n\
             x-ms-blob-type:BlockBlob\nx-ms-date:{date}\nx-ms-version:{STORAGE_API_VERSION}\n\
             /{}/{}/{}",
            self.account, self.container, blob_name
        );
        let authorization = format!("SharedKeyLite {}:{}", self.account, self.sign(&string_to_sign)?);

        tracing::debug!(%blob_name, bytes = data.len(), "uploading blob");

        let response = self
            .http
            .put(&url)
            .header("x-ms-blob-type", "BlockBlob")
            .header("x-ms-date", &date)
            .header("x-ms-version", STORAGE_API_VERSION)
            .header("content-type", content_type)
            .header("authorization", authorization)
            .body(data.to_vec())
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| Error::upstream("storage upload", e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(Error::upstream(
                "storage upload",
                format!("HTTP {status}: {text}"),
            ));
        }

        Ok(url)
    }
}

/// Blob store that defers connection-string parsing to first use.
///
/// An unconfigured server (placeholder connection string) must still start
/// and answer diagnostic tools; only the first upload attempt surfaces the
/// configuration problem.
pub struct LazyBlobStore {
    settings: StorageSettings,
}

impl LazyBlobStore {
    /// Create a store that validates its settings on first upload.
    pub fn new(settings: StorageSettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl BlobStore for LazyBlobStore {
    async fn upload(&self, data: &[u8], blob_name: &str) -> Result<String> {
        AzureBlobStore::from_settings(&self.settings)?
            .upload(data, blob_name)
            .await
    }
}

/// In-memory blob store for tests: records uploads and returns
/// deterministic URLs.
#[derive(Clone, Default)]
pub struct MemoryBlobStore {
    uploads: Arc<Mutex<Vec<(String, Vec<u8>)>>>,
}

impl MemoryBlobStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `(blob_name, data)` pair uploaded so far.
    pub async fn uploads(&self) -> Vec<(String, Vec<u8>)> {
        self.uploads.lock().await.clone()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn upload(&self, data: &[u8], blob_name: &str) -> Result<String> {
        self.uploads
            .lock()
            .await
            .push((blob_name.to_string(), data.to_vec()));
        Ok(format!("https://blobs.invalid/media/{blob_name}"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings(connection_string: &str) -> StorageSettings {
        StorageSettings {
            connection_string: connection_string.to_string(),
            container: "media".to_string(),
        }
    }

    // A syntactically valid base64 key for tests.
    const TEST_KEY: &str = "c2VjcmV0LXN0b3JhZ2Uta2V5";

    fn test_connection_string() -> String {
        format!(
            "DefaultEndpointsProtocol=https;AccountName=acct;AccountKey={TEST_KEY};EndpointSuffix=core.windows.net"
        )
    }

    #[test]
    fn test_blob_name_for_shape() {
        let name = blob_name_for("intro_audio", "audio", "mp3");
        let (category, rest) = name.split_once('/').unwrap();
        assert_eq!(category, "audio");
        assert!(rest.starts_with("intro_audio_"));
        let suffix = rest
            .strip_prefix("intro_audio_")
            .and_then(|s| s.strip_suffix(".mp3"))
            .unwrap();
        assert_eq!(suffix.len(), 8);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_from_settings_composes_endpoint() {
        let store = AzureBlobStore::from_settings(&settings(&test_connection_string())).unwrap();
        assert_eq!(store.endpoint, "https://acct.blob.core.windows.net");
        assert_eq!(store.account, "acct");
    }

    #[test]
    fn test_from_settings_honors_blob_endpoint_override() {
        let conn = format!(
            "AccountName=acct;AccountKey={TEST_KEY};BlobEndpoint=http://127.0.0.1:10000/acct/"
        );
        let store = AzureBlobStore::from_settings(&settings(&conn)).unwrap();
        assert_eq!(store.endpoint, "http://127.0.0.1:10000/acct");
    }

    #[test]
    fn test_from_settings_rejects_missing_account_key() {
        let err = AzureBlobStore::from_settings(&settings("AccountName=acct")).unwrap_err();
        assert!(err.to_string().contains("AccountKey"));
    }

    #[test]
    fn test_from_settings_rejects_placeholder_connection_string() {
        // The unconfigured placeholder has no k=v pairs at all.
        let err =
            AzureBlobStore::from_settings(&settings("your-azure-connection-string")).unwrap_err();
        assert!(err.to_string().contains("AccountName"));
    }

    #[test]
    fn test_signing_is_deterministic() {
        let store = AzureBlobStore::from_settings(&settings(&test_connection_string())).unwrap();
        let a = store.sign("PUT\n\napplication/octet-stream\n\n").unwrap();
        let b = store.sign("PUT\n\napplication/octet-stream\n\n").unwrap();
        assert_eq!(a, b);
        assert!(!a.is_empty());
    }

    #[tokio::test]
    async fn test_upload_puts_block_blob_and_returns_url() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/media/audio/intro_abc12345.mp3"))
            .and(header("x-ms-blob-type", "BlockBlob"))
            .and(header_exists("x-ms-date"))
            .and(header_exists("authorization"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let store = AzureBlobStore::from_settings(&settings(&test_connection_string()))
            .unwrap()
            .with_endpoint(server.uri());
        let url = store
            .upload(b"mp3data", "audio/intro_abc12345.mp3")
            .await
            .unwrap();
        assert_eq!(
            url,
            format!("{}/media/audio/intro_abc12345.mp3", server.uri())
        );
    }

    #[tokio::test]
    async fn test_upload_wraps_service_failure() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(403).set_body_string("auth failed"))
            .mount(&server)
            .await;

        let store = AzureBlobStore::from_settings(&settings(&test_connection_string()))
            .unwrap()
            .with_endpoint(server.uri());
        let err = store.upload(b"x", "images/a.webp").await.unwrap_err();
        assert!(err.is_upstream());
        assert!(err.to_string().starts_with("storage upload failed"));
    }

    #[tokio::test]
    async fn test_memory_store_records_uploads() {
        let store = MemoryBlobStore::new();
        let url = store.upload(b"data", "images/pic_0000.webp").await.unwrap();
        assert!(url.ends_with("images/pic_0000.webp"));
        let uploads = store.uploads().await;
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].0, "images/pic_0000.webp");
        assert_eq!(uploads[0].1, b"data");
    }
}
