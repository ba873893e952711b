//! Environment-sourced server settings.
//!
//! Provides the [`Settings`] struct that snapshots every recognized
//! environment variable once, at startup, in `main`. Components receive
//! their section by value at construction time; nothing reads the process
//! environment after startup.
//!
//! Settings are built through [`Settings::from_lookup`], so tests substitute
//! a map-backed lookup instead of mutating the process environment.
//!
//! # Lazy failure
//!
//! Every field falls back to a placeholder when its variable is unset.
//! [`Settings::from_env`] therefore never fails: the server always starts,
//! diagnostic tools work unconfigured, and credentialed tools fail on first
//! use with an upstream error from the remote service.

use serde::{Deserialize, Serialize};

/// Complete server settings, one section per external collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Content API connection.
    pub api: ApiSettings,
    /// Voice-synthesis provider.
    pub speech: SpeechSettings,
    /// Image-generation provider.
    pub imagegen: ImageGenSettings,
    /// Blob storage.
    pub storage: StorageSettings,
}

/// Content API connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    /// Base URL of the content API.
    pub base_url: String,
    /// Bearer token sent with every request.
    pub token: String,
    /// Company identifier stamped into created courses.
    pub company_id: String,
}

/// Voice-synthesis provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechSettings {
    /// Provider API key.
    pub api_key: String,
    /// Voice identity used for all synthesis.
    pub voice_id: String,
}

/// Image-generation provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageGenSettings {
    /// Provider API key.
    pub api_key: String,
    /// Resource endpoint, e.g. `https://my-resource.cognitiveservices.azure.com`.
    pub endpoint: String,
    /// Deployment name of the image model.
    pub deployment: String,
    /// API version query parameter.
    pub api_version: String,
}

/// Blob storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Storage account connection string.
    pub connection_string: String,
    /// Container uploads land in.
    pub container: String,
}

impl Settings {
    /// Snapshot settings from the process environment.
    ///
    /// Recognized variables (each with its placeholder default):
    ///
    /// | Variable | Default |
    /// |---|---|
    /// | `API_BASE_URL` | `https://your-api-domain.com` |
    /// | `API_TOKEN` | `your-bearer-token-here` |
    /// | `COMPANY_ID` | `your-company-id-here` |
    /// | `ELEVENLABS_API_KEY` | `your-elevenlabs-api-key` |
    /// | `ELEVENLABS_VOICE_ID` | `21m00Tcm4TlvDq8ikWAM` |
    /// | `AZURE_OPENAI_API_KEY` | `your-azure-openai-api-key` |
    /// | `AZURE_OPENAI_ENDPOINT` | `https://your-resource.cognitiveservices.azure.com` |
    /// | `AZURE_OPENAI_DEPLOYMENT` | `gpt-image-1` |
    /// | `AZURE_OPENAI_API_VERSION` | `2025-04-01-preview` |
    /// | `AZURE_STORAGE_CONNECTION_STRING` | `your-azure-connection-string` |
    /// | `AZURE_CONTAINER_NAME` | `audio-files` |
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary variable lookup.
    ///
    /// `main` passes the process environment; tests pass a map.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Self {
            api: ApiSettings {
                base_url: var("API_BASE_URL", "https://your-api-domain.com"),
                token: var("API_TOKEN", "your-bearer-token-here"),
                company_id: var("COMPANY_ID", "your-company-id-here"),
            },
            speech: SpeechSettings {
                api_key: var("ELEVENLABS_API_KEY", "your-elevenlabs-api-key"),
                voice_id: var("ELEVENLABS_VOICE_ID", "21m00Tcm4TlvDq8ikWAM"),
            },
            imagegen: ImageGenSettings {
                api_key: var("AZURE_OPENAI_API_KEY", "your-azure-openai-api-key"),
                endpoint: var(
                    "AZURE_OPENAI_ENDPOINT",
                    "https://your-resource.cognitiveservices.azure.com",
                ),
                deployment: var("AZURE_OPENAI_DEPLOYMENT", "gpt-image-1"),
                api_version: var("AZURE_OPENAI_API_VERSION", "2025-04-01-preview"),
            },
            storage: StorageSettings {
                connection_string: var(
                    "AZURE_STORAGE_CONNECTION_STRING",
                    "your-azure-connection-string",
                ),
                container: var("AZURE_CONTAINER_NAME", "audio-files"),
            },
        }
    }
}
