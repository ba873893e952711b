//! Card tools: retrieval, the seven creation variants, and update.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{Value, json};

use cardcraft_api::ApiClient;
use cardcraft_api::cards::{
    AudioCard, CardUpdate, ContentCard, FormCard, LinkCard, PollCard, QuizCard, VideoCard,
    update_card,
};

use crate::registry::{ToolRegistry, ToolResult, make_tool};
use crate::tools::{api_result, invalid_args};
use rmcp::model::Tool;

/// Arguments for the get_card tool.
#[derive(Debug, Deserialize)]
pub struct GetCardArgs {
    /// Card identifier.
    pub card_id: String,
}

/// Arguments for the update_card tool.
#[derive(Debug, Deserialize)]
pub struct UpdateCardArgs {
    /// Card identifier.
    pub card_id: String,
    /// The partial update itself.
    #[serde(flatten)]
    pub update: CardUpdate,
}

/// MCP tools for card operations.
pub struct CardTools {
    client: Arc<ApiClient>,
}

impl CardTools {
    /// Create card tools bound to an API client.
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }
}

fn sort_order_property() -> Value {
    json!({
        "type": "integer",
        "description": "Position in course (auto-incremented if not provided)"
    })
}

impl ToolRegistry for CardTools {
    fn tools(&self) -> Vec<Tool> {
        vec![
            make_tool(
                "get_card",
                "Get details of a specific card",
                json!({
                    "type": "object",
                    "properties": {
                        "card_id": {
                            "type": "string",
                            "description": "The ID of the card to retrieve"
                        }
                    },
                    "required": ["card_id"]
                }),
            ),
            make_tool(
                "create_audio_card",
                "Create an audio card with an existing audio URL",
                json!({
                    "type": "object",
                    "properties": {
                        "course_id": {
                            "type": "string",
                            "description": "The course to add this card to"
                        },
                        "audio_url": {
                            "type": "string",
                            "description": "URL of the audio file (MP3, WAV, OGG)"
                        },
                        "title": {
                            "type": "string",
                            "description": "Title text for the audio card"
                        },
                        "background_image_url": {
                            "type": "string",
                            "description": "Optional background image URL"
                        },
                        "audio_script": {
                            "type": "string",
                            "description": "Script text the audio was generated from"
                        },
                        "audio_generated": {
                            "type": "boolean",
                            "description": "Whether the audio was AI-generated rather than uploaded"
                        },
                        "audio_generated_at": {
                            "type": "string",
                            "description": "When the audio was generated (ISO string, IST)"
                        },
                        "image_prompt": {
                            "type": "string",
                            "description": "Original generation prompt for the background image"
                        },
                        "image_generated": {
                            "type": "boolean",
                            "description": "Whether the background image was AI-generated"
                        },
                        "image_generated_at": {
                            "type": "string",
                            "description": "When the background image was generated (ISO string, IST)"
                        },
                        "sort_order": sort_order_property(),
                        "is_mandatory": {
                            "type": "boolean",
                            "description": "Whether the learner must listen to proceed (default: false)"
                        }
                    },
                    "required": ["course_id", "audio_url", "title"]
                }),
            ),
            make_tool(
                "create_content_card",
                "Create a content card with text and an optional image",
                json!({
                    "type": "object",
                    "properties": {
                        "course_id": {
                            "type": "string",
                            "description": "The course to add this card to"
                        },
                        "header1_text": {
                            "type": "string",
                            "description": "Main heading text (supports <b>/<i> inline markup)"
                        },
                        "header2_text": {
                            "type": "string",
                            "description": "Secondary text or description"
                        },
                        "image_url": {
                            "type": "string",
                            "description": "Optional image URL"
                        },
                        "image_prompt": {
                            "type": "string",
                            "description": "Original image generation prompt"
                        },
                        "image_generated": {
                            "type": "boolean",
                            "description": "Whether the image was AI-generated"
                        },
                        "image_generated_at": {
                            "type": "string",
                            "description": "When the image was generated (ISO string, IST)"
                        },
                        "align": {
                            "type": "string",
                            "description": "Content alignment: \"center center\", \"top\", \"bottom\", or \"bg\""
                        },
                        "sort_order": sort_order_property(),
                        "is_mandatory": {
                            "type": "boolean",
                            "description": "Whether the card is mandatory to view (default: false)"
                        }
                    },
                    "required": ["course_id", "header1_text"]
                }),
            ),
            make_tool(
                "create_quiz_card",
                "Create a quiz card with a multiple choice question",
                json!({
                    "type": "object",
                    "properties": {
                        "course_id": {
                            "type": "string",
                            "description": "The course to add this card to"
                        },
                        "question": {
                            "type": "string",
                            "description": "The quiz question"
                        },
                        "options": {
                            "type": "array",
                            "items": {"type": "string"},
                            "description": "List of 2-4 answer options"
                        },
                        "correct_answer": {
                            "type": "string",
                            "description": "The correct answer (must match one of the options exactly)"
                        },
                        "comment": {
                            "type": "string",
                            "description": "Optional explanation for the answer"
                        },
                        "sort_order": sort_order_property(),
                        "is_mandatory": {
                            "type": "boolean",
                            "description": "Whether the learner must answer to proceed (default: true)"
                        }
                    },
                    "required": ["course_id", "question", "options", "correct_answer"]
                }),
            ),
            make_tool(
                "create_poll_card",
                "Create a poll card for collecting learner opinions",
                json!({
                    "type": "object",
                    "properties": {
                        "course_id": {
                            "type": "string",
                            "description": "The course to add this card to"
                        },
                        "question": {
                            "type": "string",
                            "description": "The poll question"
                        },
                        "options": {
                            "type": "array",
                            "items": {"type": "string"},
                            "description": "List of 2-4 poll options"
                        },
                        "sort_order": sort_order_property(),
                        "is_mandatory": {
                            "type": "boolean",
                            "description": "Whether the learner must respond to proceed (default: false)"
                        }
                    },
                    "required": ["course_id", "question", "options"]
                }),
            ),
            make_tool(
                "create_form_card",
                "Create a form card for collecting learner input",
                json!({
                    "type": "object",
                    "properties": {
                        "course_id": {
                            "type": "string",
                            "description": "The course to add this card to"
                        },
                        "question": {
                            "type": "string",
                            "description": "The form question/prompt"
                        },
                        "sort_order": sort_order_property(),
                        "is_mandatory": {
                            "type": "boolean",
                            "description": "Whether the learner must respond to proceed (default: false)"
                        }
                    },
                    "required": ["course_id", "question"]
                }),
            ),
            make_tool(
                "create_video_card",
                "Create a video card for video content",
                json!({
                    "type": "object",
                    "properties": {
                        "course_id": {
                            "type": "string",
                            "description": "The course to add this card to"
                        },
                        "video_url": {
                            "type": "string",
                            "description": "URL of the video file (MP4, WebM)"
                        },
                        "sort_order": sort_order_property(),
                        "is_mandatory": {
                            "type": "boolean",
                            "description": "Whether the learner must watch to proceed (default: false)"
                        }
                    },
                    "required": ["course_id", "video_url"]
                }),
            ),
            make_tool(
                "create_link_card",
                "Create a link card for external resources",
                json!({
                    "type": "object",
                    "properties": {
                        "course_id": {
                            "type": "string",
                            "description": "The course to add this card to"
                        },
                        "title": {
                            "type": "string",
                            "description": "Title text for the link card"
                        },
                        "link_url": {
                            "type": "string",
                            "description": "URL of the external resource"
                        },
                        "link_caption": {
                            "type": "string",
                            "description": "Text for the link button (default: \"Visit Link\")"
                        },
                        "sort_order": sort_order_property()
                    },
                    "required": ["course_id", "title", "link_url"]
                }),
            ),
            make_tool(
                "update_card",
                "Update an existing card. Contents updates are merged over the \
                 current card so existing AI-generated metadata survives.",
                json!({
                    "type": "object",
                    "properties": {
                        "card_id": {
                            "type": "string",
                            "description": "The ID of the card to update"
                        },
                        "contents": {
                            "type": "object",
                            "description": "Partial contents updates to merge with existing contents"
                        },
                        "is_mandatory": {
                            "type": "boolean",
                            "description": "Whether the card is mandatory"
                        },
                        "sort_order": {
                            "type": "integer",
                            "description": "Position in course"
                        },
                        "is_active": {
                            "type": "boolean",
                            "description": "Whether the card is active"
                        },
                        "card_type": {
                            "type": "string",
                            "description": "Change card type (WARNING: triggers remote validation and may remove fields)"
                        }
                    },
                    "required": ["card_id"]
                }),
            ),
        ]
    }

    fn call(&self, name: &str, args: Value) -> Option<ToolResult> {
        let client = Arc::clone(&self.client);

        match name {
            "get_card" => Some(Box::pin(async move {
                let args: GetCardArgs = serde_json::from_value(args).map_err(invalid_args)?;
                api_result(client.get_card(&args.card_id).await)
            })),

            "create_audio_card" => Some(Box::pin(async move {
                let card: AudioCard = serde_json::from_value(args).map_err(invalid_args)?;
                api_result(client.create_card(&card.payload()).await)
            })),

            "create_content_card" => Some(Box::pin(async move {
                let card: ContentCard = serde_json::from_value(args).map_err(invalid_args)?;
                api_result(client.create_card(&card.payload()).await)
            })),

            "create_quiz_card" => Some(Box::pin(async move {
                let card: QuizCard = serde_json::from_value(args).map_err(invalid_args)?;
                let outcome = match card.payload() {
                    Ok(payload) => client.create_card(&payload).await,
                    Err(err) => Err(err),
                };
                api_result(outcome)
            })),

            "create_poll_card" => Some(Box::pin(async move {
                let card: PollCard = serde_json::from_value(args).map_err(invalid_args)?;
                let outcome = match card.payload() {
                    Ok(payload) => client.create_card(&payload).await,
                    Err(err) => Err(err),
                };
                api_result(outcome)
            })),

            "create_form_card" => Some(Box::pin(async move {
                let card: FormCard = serde_json::from_value(args).map_err(invalid_args)?;
                api_result(client.create_card(&card.payload()).await)
            })),

            "create_video_card" => Some(Box::pin(async move {
                let card: VideoCard = serde_json::from_value(args).map_err(invalid_args)?;
                api_result(client.create_card(&card.payload()).await)
            })),

            "create_link_card" => Some(Box::pin(async move {
                let card: LinkCard = serde_json::from_value(args).map_err(invalid_args)?;
                api_result(client.create_card(&card.payload()).await)
            })),

            "update_card" => Some(Box::pin(async move {
                let args: UpdateCardArgs = serde_json::from_value(args).map_err(invalid_args)?;
                api_result(update_card(&client, &args.card_id, args.update).await)
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
    use cardcraft_core::settings::ApiSettings;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn tools_for(server: &MockServer) -> CardTools {
        CardTools::new(Arc::new(ApiClient::new(ApiSettings {
            base_url: server.uri(),
            token: "t".to_string(),
            company_id: "acme".to_string(),
        })))
    }

    #[test]
    fn test_card_tools_cover_all_nine_operations() {
        let server_names = [
            "get_card",
            "create_audio_card",
            "create_content_card",
            "create_quiz_card",
            "create_poll_card",
            "create_form_card",
            "create_video_card",
            "create_link_card",
            "update_card",
        ];
        let tools = CardTools::new(Arc::new(ApiClient::new(ApiSettings {
            base_url: "http://unused".to_string(),
            token: String::new(),
            company_id: String::new(),
        })));
        assert_eq!(tools.tool_count(), server_names.len());
        for name in server_names {
            assert!(tools.has_tool(name), "missing {name}");
        }
    }

    #[tokio::test]
    async fn test_create_quiz_card_round_trip() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/createCard"))
            .and(body_partial_json(json!({
                "cardType": "quiz",
                "contents": {
                    "options": ["3", "4", "5"],
                    "correct": ["4"],
                },
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "card-1"})))
            .expect(1)
            .mount(&server)
            .await;

        let tools = tools_for(&server);
        let result = tools
            .call(
                "create_quiz_card",
                json!({
                    "course_id": "c1",
                    "question": "2+2?",
                    "options": ["3", "4", "5"],
                    "correct_answer": "4",
                }),
            )
            .unwrap()
            .await
            .unwrap();
        assert!(text_of(&result).contains("card-1"));
    }

    #[tokio::test]
    async fn test_create_quiz_card_rejects_bad_options_without_network() {
        let server = MockServer::start().await;
        let tools = tools_for(&server);
        let result = tools
            .call(
                "create_quiz_card",
                json!({
                    "course_id": "c1",
                    "question": "Q",
                    "options": ["a"],
                    "correct_answer": "a",
                }),
            )
            .unwrap()
            .await
            .unwrap();

        let parsed: Value = serde_json::from_str(&text_of(&result)).unwrap();
        assert_eq!(parsed, json!({"error": "Quiz must have 2-4 options"}));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_poll_card_rejects_bad_options_without_network() {
        let server = MockServer::start().await;
        let tools = tools_for(&server);
        let result = tools
            .call(
                "create_poll_card",
                json!({
                    "course_id": "c1",
                    "question": "Q",
                    "options": ["a", "b", "c", "d", "e"],
                }),
            )
            .unwrap()
            .await
            .unwrap();

        let parsed: Value = serde_json::from_str(&text_of(&result)).unwrap();
        assert_eq!(parsed, json!({"error": "Poll must have 2-4 options"}));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_card_merges_contents_through_the_api() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/card/k1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "contents": {"a": 1, "b": 2},
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/api/card/k1"))
            .and(body_partial_json(json!({
                "contents": {"a": 1, "b": 3, "c": 4},
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let tools = tools_for(&server);
        let result = tools
            .call(
                "update_card",
                json!({"card_id": "k1", "contents": {"b": 3, "c": 4}}),
            )
            .unwrap()
            .await
            .unwrap();
        assert!(text_of(&result).contains("ok"));
    }

    #[tokio::test]
    async fn test_update_card_with_no_fields_reports_error_value() {
        let server = MockServer::start().await;
        let tools = tools_for(&server);
        let result = tools
            .call("update_card", json!({"card_id": "k1"}))
            .unwrap()
            .await
            .unwrap();

        let parsed: Value = serde_json::from_str(&text_of(&result)).unwrap();
        assert_eq!(parsed, json!({"error": "No update data provided"}));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_audio_card_forwards_provenance() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/createCard"))
            .and(body_partial_json(json!({
                "cardType": "audio",
                "contents": {
                    "audioGenerated": true,
                    "audioGeneratedBy": "CARDCRAFT_MCP_SERVER",
                },
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "a1"})))
            .expect(1)
            .mount(&server)
            .await;

        let tools = tools_for(&server);
        tools
            .call(
                "create_audio_card",
                json!({
                    "course_id": "c1",
                    "audio_url": "https://cdn.example/a.mp3",
                    "title": "Intro",
                    "audio_generated": true,
                }),
            )
            .unwrap()
            .await
            .unwrap();
    }
}
