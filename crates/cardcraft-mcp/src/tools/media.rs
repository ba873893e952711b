//! Media tools: generate-and-upload for audio and images.
//!
//! Generation and card attachment are separate tool calls by design: each
//! media tool returns the asset URL plus the provenance parameters the
//! caller should pass to the card tools. An asset whose follow-up card
//! never gets created stays in storage; that tradeoff is accepted.

use serde::Deserialize;
use serde_json::{Value, json};

use cardcraft_core::ist_timestamp;
use cardcraft_media::MediaPipeline;
use cardcraft_media::imagegen::validate_request;
use cardcraft_media::pipeline::{PORTRAIT_SIZE, aspect_ratio_size};

use crate::registry::{ToolRegistry, ToolResult, make_tool};
use crate::tools::{error_text, invalid_args, text_result};
use rmcp::model::Tool;

/// Arguments for the generate_audio_from_text tool.
#[derive(Debug, Deserialize)]
pub struct GenerateAudioArgs {
    /// Text to convert to speech.
    pub text: String,
    /// Title for the audio file.
    pub title: String,
}

/// Arguments for the generate_image_from_text tool.
#[derive(Debug, Deserialize)]
pub struct GenerateImageArgs {
    /// Prompt for image generation.
    pub prompt: String,
    /// Title for the image file.
    pub title: String,
    /// "square", "portrait", or "landscape"; defaults to "square".
    #[serde(default)]
    pub aspect_ratio: Option<String>,
    /// Source format requested from the provider; defaults to "png".
    #[serde(default)]
    pub output_format: Option<String>,
}

/// Arguments for the generate_background_image_for_audio tool.
#[derive(Debug, Deserialize)]
pub struct BackgroundImageArgs {
    /// Prompt for background image generation.
    pub prompt: String,
    /// Title for the image file.
    pub title: String,
}

/// MCP tools for media generation.
pub struct MediaTools {
    pipeline: MediaPipeline,
}

impl MediaTools {
    /// Create media tools over a generation pipeline.
    pub fn new(pipeline: MediaPipeline) -> Self {
        Self { pipeline }
    }
}

impl ToolRegistry for MediaTools {
    fn tools(&self) -> Vec<Tool> {
        vec![
            make_tool(
                "generate_audio_from_text",
                "Generate audio from text with the configured voice and upload \
                 it to storage, returning the public URL",
                json!({
                    "type": "object",
                    "properties": {
                        "text": {
                            "type": "string",
                            "description": "Text to convert to speech"
                        },
                        "title": {
                            "type": "string",
                            "description": "Title for the audio file"
                        }
                    },
                    "required": ["text", "title"]
                }),
            ),
            make_tool(
                "generate_image_from_text",
                "Generate an image from a text prompt and upload it to storage. \
                 Use this for content card images (any aspect ratio); for audio \
                 card backgrounds use generate_background_image_for_audio.",
                json!({
                    "type": "object",
                    "properties": {
                        "prompt": {
                            "type": "string",
                            "description": "Detailed prompt for image generation"
                        },
                        "title": {
                            "type": "string",
                            "description": "Title for the image file"
                        },
                        "aspect_ratio": {
                            "type": "string",
                            "enum": ["square", "portrait", "landscape"],
                            "description": "Image aspect ratio (default: square)"
                        },
                        "output_format": {
                            "type": "string",
                            "enum": ["png", "jpg"],
                            "description": "Source format from the provider (default: png)"
                        }
                    },
                    "required": ["prompt", "title"]
                }),
            ),
            make_tool(
                "generate_background_image_for_audio",
                "Generate a background image for audio cards. Always produces \
                 portrait (1024x1536) images for optimal display.",
                json!({
                    "type": "object",
                    "properties": {
                        "prompt": {
                            "type": "string",
                            "description": "Detailed prompt for background image generation"
                        },
                        "title": {
                            "type": "string",
                            "description": "Title for the image file"
                        }
                    },
                    "required": ["prompt", "title"]
                }),
            ),
        ]
    }

    fn call(&self, name: &str, args: Value) -> Option<ToolResult> {
        let pipeline = self.pipeline.clone();

        match name {
            "generate_audio_from_text" => Some(Box::pin(async move {
                let args: GenerateAudioArgs = serde_json::from_value(args).map_err(invalid_args)?;
                let generated_at = ist_timestamp();
                match pipeline
                    .generate_and_upload_audio(&args.text, &args.title)
                    .await
                {
                    Ok(url) => Ok(text_result(format!(
                        "Audio generated and uploaded successfully!\n\n\
                         Audio URL: {url}\n\n\
                         IMPORTANT: When creating the audio card, include these \
                         parameters to track the generated audio:\n\
                         - audio_script: \"{}\"\n\
                         - audio_generated: true\n\
                         - audio_generated_at: \"{generated_at}\"\n\n\
                         For a background image, generate_background_image_for_audio \
                         produces portrait images sized for audio cards.",
                        args.text
                    ))),
                    Err(err) => Ok(error_text(&err)),
                }
            })),

            "generate_image_from_text" => Some(Box::pin(async move {
                let args: GenerateImageArgs = serde_json::from_value(args).map_err(invalid_args)?;
                let generated_at = ist_timestamp();
                let aspect_ratio = args.aspect_ratio.as_deref().unwrap_or("square");
                let output_format = args.output_format.as_deref().unwrap_or("png");
                let size = aspect_ratio_size(aspect_ratio);

                if let Err(err) = validate_request(size, output_format) {
                    return Ok(error_text(&err));
                }

                match pipeline
                    .generate_and_upload_image(&args.prompt, &args.title, size, output_format)
                    .await
                {
                    Ok(url) => Ok(text_result(format!(
                        "Image generated and uploaded successfully!\n\n\
                         Image URL: {url}\n\n\
                         IMPORTANT: When attaching this image to a card, include \
                         these parameters to track the generated image:\n\
                         - image_prompt: \"{}\"\n\
                         - image_generated: true\n\
                         - image_generated_at: \"{generated_at}\"\n\n\
                         For content cards use create_content_card with image_url; \
                         for audio card backgrounds use create_audio_card with \
                         background_image_url. The server stamps imageGeneratedBy \
                         automatically when image_generated is true.",
                        args.prompt
                    ))),
                    Err(err) => Ok(error_text(&err)),
                }
            })),

            "generate_background_image_for_audio" => Some(Box::pin(async move {
                let args: BackgroundImageArgs =
                    serde_json::from_value(args).map_err(invalid_args)?;
                let generated_at = ist_timestamp();

                // Audio card backgrounds are always portrait, whatever the
                // caller might prefer.
                match pipeline
                    .generate_and_upload_image(&args.prompt, &args.title, PORTRAIT_SIZE, "png")
                    .await
                {
                    Ok(url) => Ok(text_result(format!(
                        "Background image generated and uploaded successfully!\n\n\
                         Image URL: {url}\n\
                         Image Format: Portrait (1024x1536) - optimized for audio cards\n\n\
                         IMPORTANT: When creating the audio card with this background \
                         image, include these parameters:\n\
                         - background_image_url: \"{url}\"\n\
                         - image_prompt: \"{}\"\n\
                         - image_generated: true\n\
                         - image_generated_at: \"{generated_at}\"\n\n\
                         The server stamps imageGeneratedBy automatically when \
                         image_generated is true.",
                        args.prompt
                    ))),
                    Err(err) => Ok(error_text(&err)),
                }
            })),

            _ => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::tools::text_of;
    use cardcraft_media::imagegen::MockImageProvider;
    use cardcraft_media::speech::MockSpeechProvider;
    use cardcraft_media::storage::MemoryBlobStore;
    use std::io::Cursor;
    use std::sync::Arc;

    fn tiny_png() -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(4, 4, image::Rgba([1, 2, 3, 200]));
        let mut buf = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut buf, image::ImageFormat::Png)
            .unwrap();
        buf.into_inner()
    }

    struct Fixture {
        tools: MediaTools,
        speech: MockSpeechProvider,
        images: MockImageProvider,
        store: MemoryBlobStore,
    }

    fn fixture() -> Fixture {
        let speech = MockSpeechProvider::with_audio(b"mp3".to_vec());
        let images = MockImageProvider::with_image(tiny_png());
        let store = MemoryBlobStore::new();
        let pipeline = MediaPipeline::new(
            Arc::new(speech.clone()),
            Arc::new(images.clone()),
            Arc::new(store.clone()),
        );
        Fixture {
            tools: MediaTools::new(pipeline),
            speech,
            images,
            store,
        }
    }

    #[tokio::test]
    async fn test_generate_audio_reports_url_and_provenance_parameters() {
        let fx = fixture();
        let result = fx
            .tools
            .call(
                "generate_audio_from_text",
                json!({"text": "Welcome", "title": "Intro Audio"}),
            )
            .unwrap()
            .await
            .unwrap();

        let text = text_of(&result);
        assert!(text.contains("Audio URL: "));
        assert!(text.contains("audio_generated: true"));
        assert!(text.contains("audio_generated_at: \""));
        assert!(text.contains("+05:30"), "timestamp should be IST: {text}");
        assert_eq!(fx.speech.requests().await, vec!["Welcome"]);
    }

    #[tokio::test]
    async fn test_generate_image_portrait_requests_portrait_pixels() {
        let fx = fixture();
        fx.tools
            .call(
                "generate_image_from_text",
                json!({"prompt": "sunset", "title": "Sky", "aspect_ratio": "portrait"}),
            )
            .unwrap()
            .await
            .unwrap();

        let requests = fx.images.requests().await;
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].size, "1024x1536");
    }

    #[tokio::test]
    async fn test_generate_image_bogus_ratio_falls_back_to_square() {
        let fx = fixture();
        fx.tools
            .call(
                "generate_image_from_text",
                json!({"prompt": "sunset", "title": "Sky", "aspect_ratio": "bogus"}),
            )
            .unwrap()
            .await
            .unwrap();

        assert_eq!(fx.images.requests().await[0].size, "1024x1024");
    }

    #[tokio::test]
    async fn test_generate_image_rejects_bad_format_before_generation() {
        let fx = fixture();
        let result = fx
            .tools
            .call(
                "generate_image_from_text",
                json!({"prompt": "sunset", "title": "Sky", "output_format": "gif"}),
            )
            .unwrap()
            .await
            .unwrap();

        let text = text_of(&result);
        assert!(text.starts_with("Error: Invalid output format 'gif'"), "{text}");
        assert!(fx.images.requests().await.is_empty());
        assert!(fx.store.uploads().await.is_empty());
    }

    #[tokio::test]
    async fn test_background_image_always_forces_portrait() {
        let fx = fixture();
        let result = fx
            .tools
            .call(
                "generate_background_image_for_audio",
                json!({"prompt": "calm ocean", "title": "Ocean"}),
            )
            .unwrap()
            .await
            .unwrap();

        assert_eq!(fx.images.requests().await[0].size, "1024x1536");
        let text = text_of(&result);
        assert!(text.contains("Portrait (1024x1536)"));
        assert!(text.contains("background_image_url: \""));
    }

    #[tokio::test]
    async fn test_generation_failure_surfaces_as_error_line() {
        let speech = MockSpeechProvider::failing();
        let pipeline = MediaPipeline::new(
            Arc::new(speech),
            Arc::new(MockImageProvider::failing()),
            Arc::new(MemoryBlobStore::new()),
        );
        let tools = MediaTools::new(pipeline);

        let result = tools
            .call(
                "generate_audio_from_text",
                json!({"text": "x", "title": "y"}),
            )
            .unwrap()
            .await
            .unwrap();

        let text = text_of(&result);
        assert!(text.starts_with("Error: audio generation failed"), "{text}");
    }
}
