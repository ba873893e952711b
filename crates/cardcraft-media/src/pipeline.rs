//! Generate-and-upload pipelines composing the media ports.

use std::sync::Arc;

use cardcraft_core::Result;
use cardcraft_core::file_basename;

use crate::imagegen::ImageProvider;
use crate::speech::SpeechProvider;
use crate::storage::{BlobStore, blob_name_for};
use crate::transcode::{DEFAULT_QUALITY, to_webp};

/// Pixel size used when audio-card backgrounds force portrait.
pub const PORTRAIT_SIZE: &str = "1024x1536";

/// Map a named aspect ratio to a pixel size.
///
/// Unrecognized ratios quietly fall back to square.
pub fn aspect_ratio_size(aspect_ratio: &str) -> &'static str {
    match aspect_ratio.to_lowercase().as_str() {
        "portrait" => "1024x1536",
        "landscape" => "1536x1024",
        _ => "1024x1024",
    }
}

/// The two generation flows behind the media tools.
///
/// Each flow is all-or-nothing: a failed stage aborts the call and nothing
/// is uploaded.
#[derive(Clone)]
pub struct MediaPipeline {
    speech: Arc<dyn SpeechProvider>,
    images: Arc<dyn ImageProvider>,
    store: Arc<dyn BlobStore>,
}

impl MediaPipeline {
    /// Compose a pipeline from the three ports.
    pub fn new(
        speech: Arc<dyn SpeechProvider>,
        images: Arc<dyn ImageProvider>,
        store: Arc<dyn BlobStore>,
    ) -> Self {
        Self {
            speech,
            images,
            store,
        }
    }

    /// Synthesize `text` and upload the audio, returning its public URL.
    ///
    /// Blobs land under `audio/` with an `.mp3` extension; `title` is
    /// normalized to a filename-safe base first.
    pub async fn generate_and_upload_audio(&self, text: &str, title: &str) -> Result<String> {
        let audio = self.speech.synthesize(text).await?;
        let blob_name = blob_name_for(&file_basename(title), "audio", "mp3");
        self.store.upload(&audio, &blob_name).await
    }

    /// Generate an image for `prompt`, re-encode it as WebP, and upload
    /// it, returning its public URL.
    ///
    /// Blobs land under `images/` with a `.webp` extension regardless of
    /// the provider's source format.
    pub async fn generate_and_upload_image(
        &self,
        prompt: &str,
        title: &str,
        size: &str,
        output_format: &str,
    ) -> Result<String> {
        let image = self.images.generate(prompt, size, output_format).await?;
        let webp = to_webp(&image, DEFAULT_QUALITY)?;
        let blob_name = blob_name_for(&file_basename(title), "images", "webp");
        self.store.upload(&webp, &blob_name).await
    }
}
