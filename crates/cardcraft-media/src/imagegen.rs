//! Text-to-image port and Azure OpenAI adapter.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde_json::{Value, json};
use tokio::sync::Mutex;

use cardcraft_core::settings::ImageGenSettings;
use cardcraft_core::{Error, Result};

/// Image generation takes noticeably longer than CRUD; bounded at 60 s.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Check both request parameters before any network call.
///
/// `size` must look like `<width>x<height>` and `output_format` must be
/// `png` or `jpg`.
///
/// # Errors
///
/// [`Error::Validation`] describing the offending parameter.
pub fn validate_request(size: &str, output_format: &str) -> Result<()> {
    let well_formed = size.split_once('x').is_some_and(|(w, h)| {
        !w.is_empty()
            && !h.is_empty()
            && w.chars().all(|c| c.is_ascii_digit())
            && h.chars().all(|c| c.is_ascii_digit())
    });
    if !well_formed {
        return Err(Error::validation(format!(
            "Invalid size format: {size}. Must be in format 'WIDTHxHEIGHT'"
        )));
    }
    if output_format != "png" && output_format != "jpg" {
        return Err(Error::validation(format!(
            "Invalid output format: {output_format}. Must be 'png' or 'jpg'"
        )));
    }
    Ok(())
}

/// Abstraction over text-to-image providers.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Generate one image for the prompt at the given pixel size and
    /// source format, returning the raw image bytes.
    async fn generate(&self, prompt: &str, size: &str, output_format: &str) -> Result<Vec<u8>>;
}

/// Image generation through an Azure OpenAI deployment.
///
/// Requests exactly one image at "medium" quality with full output
/// compression and decodes the base64 payload of the first result.
pub struct AzureImageGenerator {
    http: reqwest::Client,
    api_key: String,
    endpoint: String,
    deployment: String,
    api_version: String,
}

impl AzureImageGenerator {
    /// Create a generator from image-generation settings.
    pub fn new(settings: ImageGenSettings) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: settings.api_key,
            endpoint: settings.endpoint,
            deployment: settings.deployment,
            api_version: settings.api_version,
        }
    }

    /// Override the resource endpoint (tests point this at a local server).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl ImageProvider for AzureImageGenerator {
    async fn generate(&self, prompt: &str, size: &str, output_format: &str) -> Result<Vec<u8>> {
        validate_request(size, output_format)?;

        let url = format!(
            "{}/openai/deployments/{}/images/generations?api-version={}",
            self.endpoint, self.deployment, self.api_version
        );
        let body = json!({
            "prompt": prompt,
            "size": size,
            "quality": "medium",
            "output_compression": 100,
            "output_format": output_format,
            "n": 1,
        });

        tracing::debug!(%size, %output_format, "generating image");

        let response = self
            .http
            .post(&url)
            .header("api-key", &self.api_key)
            .json(&body)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| Error::upstream("image generation", e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(Error::upstream(
                "image generation",
                format!("HTTP {status}: {text}"),
            ));
        }

        let result: Value = response
            .json()
            .await
            .map_err(|e| Error::upstream("image generation", format!("invalid JSON body: {e}")))?;

        let b64 = result["data"][0]["b64_json"]
            .as_str()
            .ok_or_else(|| Error::upstream("image generation", "no image data returned"))?;

        BASE64
            .decode(b64)
            .map_err(|e| Error::upstream("image generation", format!("invalid base64 payload: {e}")))
    }
}

/// One recorded generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRequest {
    /// Prompt text.
    pub prompt: String,
    /// Requested pixel size.
    pub size: String,
    /// Requested source format.
    pub output_format: String,
}

/// Mock image provider that returns canned bytes (or a canned failure)
/// and records every request it receives.
#[derive(Clone)]
pub struct MockImageProvider {
    image: Option<Vec<u8>>,
    requests: Arc<Mutex<Vec<ImageRequest>>>,
}

impl MockImageProvider {
    /// Create a mock that answers every request with the given bytes.
    pub fn with_image(image: Vec<u8>) -> Self {
        Self {
            image: Some(image),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a mock whose generation always fails.
    pub fn failing() -> Self {
        Self {
            image: None,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Requests received so far.
    pub async fn requests(&self) -> Vec<ImageRequest> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl ImageProvider for MockImageProvider {
    async fn generate(&self, prompt: &str, size: &str, output_format: &str) -> Result<Vec<u8>> {
        validate_request(size, output_format)?;
        self.requests.lock().await.push(ImageRequest {
            prompt: prompt.to_string(),
            size: size.to_string(),
            output_format: output_format.to_string(),
        });
        match &self.image {
            Some(image) => Ok(image.clone()),
            None => Err(Error::upstream("image generation", "mock failure")),
        }
    }
}
