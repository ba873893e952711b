//! Text-to-speech port and ElevenLabs adapter.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::Mutex;

use cardcraft_core::settings::SpeechSettings;
use cardcraft_core::{Error, Result};

const DEFAULT_BASE_URL: &str = "https://api.elevenlabs.io";

/// Synthesis model used for every request.
const MODEL_ID: &str = "eleven_v3";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Abstraction over voice-synthesis providers.
///
/// Allows swapping the synthesis backend (and substituting a mock in
/// tests) without changing pipeline code.
#[async_trait]
pub trait SpeechProvider: Send + Sync {
    /// Convert text to speech, returning the complete audio as one buffer.
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>>;
}

/// Voice synthesis through the ElevenLabs API.
///
/// Uses a fixed voice identity and fixed voice-quality settings
/// (stability 0.5, similarity boost 0.5, style 0.0, speaker boost on).
pub struct ElevenLabsSpeech {
    http: reqwest::Client,
    api_key: String,
    voice_id: String,
    base_url: String,
}

impl ElevenLabsSpeech {
    /// Create a provider from speech settings.
    pub fn new(settings: SpeechSettings) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: settings.api_key,
            voice_id: settings.voice_id,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Override the API base URL (tests point this at a local server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl SpeechProvider for ElevenLabsSpeech {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        let url = format!("{}/v1/text-to-speech/{}", self.base_url, self.voice_id);
        let body = json!({
            "text": text,
            "model_id": MODEL_ID,
            "voice_settings": {
                "stability": 0.5,
                "similarity_boost": 0.5,
                "style": 0.0,
                "use_speaker_boost": true,
            },
        });

        tracing::debug!(chars = text.len(), "synthesizing speech");

        let response = self
            .http
            .post(&url)
            .header("xi-api-key", &self.api_key)
            .json(&body)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| Error::upstream("audio generation", e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(Error::upstream(
                "audio generation",
                format!("HTTP {status}: {text}"),
            ));
        }

        // The provider streams chunked audio; collect it into one buffer.
        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::upstream("audio generation", e))?;
        Ok(bytes.to_vec())
    }
}

/// Mock speech provider that returns canned audio (or a canned failure).
///
/// Useful for testing pipelines without making actual API calls.
#[derive(Clone)]
pub struct MockSpeechProvider {
    audio: Option<Vec<u8>>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl MockSpeechProvider {
    /// Create a mock that answers every request with the given bytes.
    pub fn with_audio(audio: Vec<u8>) -> Self {
        Self {
            audio: Some(audio),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a mock whose synthesis always fails.
    pub fn failing() -> Self {
        Self {
            audio: None,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Texts synthesized so far.
    pub async fn requests(&self) -> Vec<String> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl SpeechProvider for MockSpeechProvider {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        self.requests.lock().await.push(text.to_string());
        match &self.audio {
            Some(audio) => Ok(audio.clone()),
            None => Err(Error::upstream("audio generation", "mock failure")),
        }
    }
}
