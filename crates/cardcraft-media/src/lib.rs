//! Cardcraft Media — generative media ports, transcoding, and storage.
//!
//! External collaborators are modeled as ports with one concrete adapter
//! and one mock each:
//!
//! - [`speech`]: text-to-speech ([`SpeechProvider`] / ElevenLabs)
//! - [`imagegen`]: text-to-image ([`ImageProvider`] / Azure OpenAI)
//! - [`storage`]: blob uploads ([`BlobStore`] / Azure Blob Storage)
//!
//! [`transcode`] re-encodes generated rasters to lossy WebP, and
//! [`pipeline`] composes the ports into the two generate-and-upload flows.

pub mod imagegen;
pub mod pipeline;
pub mod speech;
pub mod storage;
pub mod transcode;

pub use imagegen::{AzureImageGenerator, ImageProvider, MockImageProvider};
pub use pipeline::MediaPipeline;
pub use speech::{ElevenLabsSpeech, MockSpeechProvider, SpeechProvider};
pub use storage::{AzureBlobStore, BlobStore, LazyBlobStore, MemoryBlobStore};
