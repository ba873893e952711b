//! Card payload builders and the read-merge-write update path.
//!
//! Each card type has a parameter struct that deserializes straight from
//! tool arguments and builds the API's JSON body. Validation happens here,
//! before any network call: a rejected payload never leaves the process.
//!
//! # Provenance fields
//!
//! AI-produced media is tracked inside card `contents` by field pairs
//! (`audioGenerated`/`audioGeneratedAt`, `imageGenerated`/`imageGeneratedAt`,
//! plus `imagePrompt`/`audioScript`). Whenever a `*_generated` flag is true,
//! the matching `*GeneratedBy` value is forced to [`GENERATED_BY`]; callers
//! cannot override the producer stamp.

use serde::Deserialize;
use serde_json::{Map, Value, json};

use cardcraft_core::{Error, Result};

use crate::client::ApiClient;

/// Producer identity stamped into `*GeneratedBy` provenance fields.
pub const GENERATED_BY: &str = "CARDCRAFT_MCP_SERVER";

fn default_true() -> bool {
    true
}

fn default_align() -> String {
    "center center".to_string()
}

fn default_link_caption() -> String {
    "Visit Link".to_string()
}

/// Display-metadata object for a rich-text header.
///
/// Stored alongside the plain-text field because two downstream renderers
/// consume the same contents: one wants visibility/size attributes, the
/// other wants bare text.
fn header_object(text: &str) -> Value {
    json!({
        "text": text,
        "visibility": true,
        "size": "medium",
    })
}

/// Strip the limited inline markup set (`<b>`, `</b>`, `<i>`, `</i>`)
/// for the plain-text twin of a rich header.
fn strip_inline_tags(text: &str) -> String {
    text.replace("<b>", "")
        .replace("</b>", "")
        .replace("<i>", "")
        .replace("</i>", "")
}

/// Attach generation-provenance fields for `field` ("audio" or "image").
fn stamp_provenance(
    contents: &mut Value,
    field: &str,
    generated: Option<bool>,
    generated_at: Option<&str>,
) {
    if let Some(generated) = generated {
        contents[format!("{field}Generated")] = json!(generated);
    }
    if let Some(at) = generated_at {
        contents[format!("{field}GeneratedAt")] = json!(at);
    }
    if generated == Some(true) {
        contents[format!("{field}GeneratedBy")] = json!(GENERATED_BY);
    }
}

/// Common card envelope around type-specific contents.
fn card_payload(
    course_id: &str,
    card_type: &str,
    contents: Value,
    is_mandatory: Option<bool>,
    sort_order: Option<i64>,
) -> Value {
    let mut card = json!({
        "courseId": course_id,
        "cardType": card_type,
        "contents": contents,
    });
    if let Some(mandatory) = is_mandatory {
        card["isMandatory"] = json!(mandatory);
    }
    if let Some(sort_order) = sort_order {
        card["sortOrder"] = json!(sort_order);
    }
    card
}

// ---------------------------------------------------------------------------
// Card parameter structs
// ---------------------------------------------------------------------------

/// Parameters for an audio card referencing an already-uploaded audio URL.
#[derive(Debug, Clone, Deserialize)]
pub struct AudioCard {
    /// Course the card belongs to.
    pub course_id: String,
    /// URL of the audio file (MP3, WAV, OGG).
    pub audio_url: String,
    /// Title shown on the card.
    pub title: String,
    /// Optional background image URL.
    #[serde(default)]
    pub background_image_url: Option<String>,
    /// Script the audio was generated from.
    #[serde(default)]
    pub audio_script: Option<String>,
    /// Whether the audio was AI-generated rather than uploaded.
    #[serde(default)]
    pub audio_generated: Option<bool>,
    /// When the audio was generated (ISO string, IST).
    #[serde(default)]
    pub audio_generated_at: Option<String>,
    /// Prompt the background image was generated from.
    #[serde(default)]
    pub image_prompt: Option<String>,
    /// Whether the background image was AI-generated.
    #[serde(default)]
    pub image_generated: Option<bool>,
    /// When the background image was generated (ISO string, IST).
    #[serde(default)]
    pub image_generated_at: Option<String>,
    /// Position in the course; the API auto-increments when absent.
    #[serde(default)]
    pub sort_order: Option<i64>,
    /// Whether the learner must listen to proceed.
    #[serde(default)]
    pub is_mandatory: bool,
}

impl AudioCard {
    /// Build the creation payload.
    pub fn payload(&self) -> Value {
        let mut contents = json!({
            "_header1": header_object(&self.title),
            "header1": self.title,
            "audio": self.audio_url,
        });

        if let Some(image) = &self.background_image_url {
            contents["image"] = json!(image);
        }
        if let Some(script) = &self.audio_script {
            contents["audioScript"] = json!(script);
        }
        stamp_provenance(
            &mut contents,
            "audio",
            self.audio_generated,
            self.audio_generated_at.as_deref(),
        );
        if let Some(prompt) = &self.image_prompt {
            contents["imagePrompt"] = json!(prompt);
        }
        stamp_provenance(
            &mut contents,
            "image",
            self.image_generated,
            self.image_generated_at.as_deref(),
        );

        card_payload(
            &self.course_id,
            "audio",
            contents,
            Some(self.is_mandatory),
            self.sort_order,
        )
    }
}

/// Parameters for a content card (headline, optional body text and image).
#[derive(Debug, Clone, Deserialize)]
pub struct ContentCard {
    /// Course the card belongs to.
    pub course_id: String,
    /// Main heading; may carry `<b>`/`<i>` inline markup.
    pub header1_text: String,
    /// Secondary text or description.
    #[serde(default)]
    pub header2_text: Option<String>,
    /// Optional image URL.
    #[serde(default)]
    pub image_url: Option<String>,
    /// Prompt the image was generated from.
    #[serde(default)]
    pub image_prompt: Option<String>,
    /// Whether the image was AI-generated.
    #[serde(default)]
    pub image_generated: Option<bool>,
    /// When the image was generated (ISO string, IST).
    #[serde(default)]
    pub image_generated_at: Option<String>,
    /// Content alignment: "center center", "top", "bottom", or "bg".
    #[serde(default = "default_align")]
    pub align: String,
    /// Position in the course; the API auto-increments when absent.
    #[serde(default)]
    pub sort_order: Option<i64>,
    /// Whether the card is mandatory to view.
    #[serde(default)]
    pub is_mandatory: bool,
}

impl ContentCard {
    /// Build the creation payload.
    pub fn payload(&self) -> Value {
        let mut contents = json!({
            "_header1": header_object(&self.header1_text),
            "header1": strip_inline_tags(&self.header1_text),
        });

        if let Some(header2) = &self.header2_text {
            contents["_header2"] = header_object(header2);
            contents["header2"] = json!(strip_inline_tags(header2));
        }
        if let Some(image) = &self.image_url {
            contents["image"] = json!(image);
            contents["align"] = json!(self.align);
        }
        if let Some(prompt) = &self.image_prompt {
            contents["imagePrompt"] = json!(prompt);
        }
        stamp_provenance(
            &mut contents,
            "image",
            self.image_generated,
            self.image_generated_at.as_deref(),
        );

        let mut card = card_payload(
            &self.course_id,
            "content",
            contents,
            Some(self.is_mandatory),
            self.sort_order,
        );
        card["align"] = json!(self.align);
        card
    }
}

/// Parameters for a multiple-choice quiz card.
#[derive(Debug, Clone, Deserialize)]
pub struct QuizCard {
    /// Course the card belongs to.
    pub course_id: String,
    /// The quiz question.
    pub question: String,
    /// 2–4 answer options.
    pub options: Vec<String>,
    /// Must match one of `options` exactly (case-sensitive).
    pub correct_answer: String,
    /// Optional explanation for the answer.
    #[serde(default)]
    pub comment: Option<String>,
    /// Position in the course; the API auto-increments when absent.
    #[serde(default)]
    pub sort_order: Option<i64>,
    /// Whether the learner must answer to proceed.
    #[serde(default = "default_true")]
    pub is_mandatory: bool,
}

impl QuizCard {
    /// Build the creation payload, validating options locally.
    ///
    /// # Errors
    ///
    /// [`Error::Validation`] when the option count is outside 2–4 or the
    /// correct answer is not one of the options. No network call is made
    /// for a rejected quiz.
    pub fn payload(&self) -> Result<Value> {
        if self.options.len() < 2 || self.options.len() > 4 {
            return Err(Error::validation("Quiz must have 2-4 options"));
        }
        if !self.options.contains(&self.correct_answer) {
            return Err(Error::validation(format!(
                "Correct answer '{}' must be one of the provided options",
                self.correct_answer
            )));
        }

        let mut contents = json!({
            "_header1": header_object(&self.question),
            "header1": self.question,
            "options": self.options,
            "correct": [self.correct_answer],
        });
        if let Some(comment) = &self.comment {
            contents["comment"] = json!(comment);
        }

        Ok(card_payload(
            &self.course_id,
            "quiz",
            contents,
            Some(self.is_mandatory),
            self.sort_order,
        ))
    }
}

/// Parameters for a poll card.
#[derive(Debug, Clone, Deserialize)]
pub struct PollCard {
    /// Course the card belongs to.
    pub course_id: String,
    /// The poll question.
    pub question: String,
    /// 2–4 poll options.
    pub options: Vec<String>,
    /// Position in the course; the API auto-increments when absent.
    #[serde(default)]
    pub sort_order: Option<i64>,
    /// Whether the learner must respond to proceed.
    #[serde(default)]
    pub is_mandatory: bool,
}

impl PollCard {
    /// Build the creation payload, validating options locally.
    ///
    /// # Errors
    ///
    /// [`Error::Validation`] when the option count is outside 2–4.
    pub fn payload(&self) -> Result<Value> {
        if self.options.len() < 2 || self.options.len() > 4 {
            return Err(Error::validation("Poll must have 2-4 options"));
        }

        let contents = json!({
            "_header1": header_object(&self.question),
            "options": self.options,
        });

        Ok(card_payload(
            &self.course_id,
            "poll",
            contents,
            Some(self.is_mandatory),
            self.sort_order,
        ))
    }
}

/// Parameters for a free-text form card.
#[derive(Debug, Clone, Deserialize)]
pub struct FormCard {
    /// Course the card belongs to.
    pub course_id: String,
    /// The form question or prompt.
    pub question: String,
    /// Position in the course; the API auto-increments when absent.
    #[serde(default)]
    pub sort_order: Option<i64>,
    /// Whether the learner must respond to proceed.
    #[serde(default)]
    pub is_mandatory: bool,
}

impl FormCard {
    /// Build the creation payload.
    pub fn payload(&self) -> Value {
        let contents = json!({
            "_header1": header_object(&self.question),
        });
        card_payload(
            &self.course_id,
            "form",
            contents,
            Some(self.is_mandatory),
            self.sort_order,
        )
    }
}

/// Parameters for a video card.
#[derive(Debug, Clone, Deserialize)]
pub struct VideoCard {
    /// Course the card belongs to.
    pub course_id: String,
    /// URL of the video file (MP4, WebM).
    pub video_url: String,
    /// Position in the course; the API auto-increments when absent.
    #[serde(default)]
    pub sort_order: Option<i64>,
    /// Whether the learner must watch to proceed.
    #[serde(default)]
    pub is_mandatory: bool,
}

impl VideoCard {
    /// Build the creation payload.
    pub fn payload(&self) -> Value {
        let contents = json!({ "video": self.video_url });
        card_payload(
            &self.course_id,
            "video",
            contents,
            Some(self.is_mandatory),
            self.sort_order,
        )
    }
}

/// Parameters for an external-link card.
///
/// Link cards carry no mandatory flag; the remote API treats them as
/// always optional.
#[derive(Debug, Clone, Deserialize)]
pub struct LinkCard {
    /// Course the card belongs to.
    pub course_id: String,
    /// Title shown on the card.
    pub title: String,
    /// URL of the external resource.
    pub link_url: String,
    /// Text for the link button.
    #[serde(default = "default_link_caption")]
    pub link_caption: String,
    /// Position in the course; the API auto-increments when absent.
    #[serde(default)]
    pub sort_order: Option<i64>,
}

impl LinkCard {
    /// Build the creation payload.
    pub fn payload(&self) -> Value {
        let contents = json!({
            "_header1": header_object(&self.title),
            "header1": self.title,
            "link": self.link_url,
            "linkcaption": self.link_caption,
        });
        card_payload(&self.course_id, "link", contents, None, self.sort_order)
    }
}

// ---------------------------------------------------------------------------
// Update path
// ---------------------------------------------------------------------------

/// Partial update for an existing card.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CardUpdate {
    /// Partial contents; merged shallowly over the card's current contents.
    #[serde(default)]
    pub contents: Option<Map<String, Value>>,
    /// Whether the card is mandatory.
    #[serde(default)]
    pub is_mandatory: Option<bool>,
    /// Position in the course.
    #[serde(default)]
    pub sort_order: Option<i64>,
    /// Whether the card is active.
    #[serde(default)]
    pub is_active: Option<bool>,
    /// New card type. The remote API re-validates on type change and may
    /// drop contents fields incompatible with the new type.
    #[serde(default)]
    pub card_type: Option<String>,
}

impl CardUpdate {
    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        self.contents.is_none()
            && self.is_mandatory.is_none()
            && self.sort_order.is_none()
            && self.is_active.is_none()
            && self.card_type.is_none()
    }
}

/// Shallow-merge `updates` over `current`: caller-supplied keys win,
/// server-only keys are preserved, nested objects are replaced wholesale.
pub fn merge_contents(current: &Map<String, Value>, updates: &Map<String, Value>) -> Map<String, Value> {
    let mut merged = current.clone();
    for (key, value) in updates {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

/// Apply a partial update to a card.
///
/// Scalar-only updates go straight to a PUT. A contents update first reads
/// the current card so existing fields (AI provenance in particular)
/// survive the write; if that read fails the update aborts with the read
/// error and nothing is written.
///
/// # Errors
///
/// [`Error::Validation`] for an empty update (no network call); otherwise
/// whatever the read or write returns.
pub async fn update_card(client: &ApiClient, card_id: &str, update: CardUpdate) -> Result<Value> {
    if update.is_empty() {
        return Err(Error::validation("No update data provided"));
    }

    let mut body = Map::new();

    if let Some(partial) = &update.contents {
        let current = client.get_card(card_id).await?;
        let current_contents = current
            .get("contents")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();
        body.insert(
            "contents".to_string(),
            Value::Object(merge_contents(&current_contents, partial)),
        );
    }

    if let Some(mandatory) = update.is_mandatory {
        body.insert("isMandatory".to_string(), json!(mandatory));
    }
    if let Some(sort_order) = update.sort_order {
        body.insert("sortOrder".to_string(), json!(sort_order));
    }
    if let Some(active) = update.is_active {
        body.insert("isActive".to_string(), json!(active));
    }
    if let Some(card_type) = &update.card_type {
        body.insert("cardType".to_string(), json!(card_type));
    }

    client.update_card(card_id, &Value::Object(body)).await
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use cardcraft_core::settings::ApiSettings;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn quiz(options: &[&str], correct: &str) -> QuizCard {
        serde_json::from_value(json!({
            "course_id": "c1",
            "question": "2+2?",
            "options": options,
            "correct_answer": correct,
        }))
        .unwrap()
    }

    // -- quiz ---------------------------------------------------------------

    #[test]
    fn test_quiz_payload_shape() {
        let payload = quiz(&["3", "4", "5"], "4").payload().unwrap();
        assert_eq!(payload["cardType"], "quiz");
        assert_eq!(payload["contents"]["options"], json!(["3", "4", "5"]));
        assert_eq!(payload["contents"]["correct"], json!(["4"]));
        assert_eq!(payload["contents"]["header1"], "2+2?");
        assert_eq!(payload["contents"]["_header1"]["text"], "2+2?");
        // quizzes are mandatory by default
        assert_eq!(payload["isMandatory"], true);
    }

    #[test]
    fn test_quiz_rejects_single_option() {
        let err = quiz(&["4"], "4").payload().unwrap_err();
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "Quiz must have 2-4 options");
    }

    #[test]
    fn test_quiz_rejects_five_options() {
        let err = quiz(&["1", "2", "3", "4", "5"], "4").payload().unwrap_err();
        assert_eq!(err.to_string(), "Quiz must have 2-4 options");
    }

    #[test]
    fn test_quiz_correct_answer_match_is_case_sensitive() {
        let err = quiz(&["paris", "london"], "Paris").payload().unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("'Paris'"));
    }

    #[test]
    fn test_quiz_carries_comment() {
        let mut card = quiz(&["3", "4"], "4");
        card.comment = Some("Basic arithmetic".to_string());
        let payload = card.payload().unwrap();
        assert_eq!(payload["contents"]["comment"], "Basic arithmetic");
    }

    #[test]
    fn test_quiz_payload_is_idempotent() {
        let card = quiz(&["3", "4"], "4");
        assert_eq!(card.payload().unwrap(), card.payload().unwrap());
    }

    // -- poll ---------------------------------------------------------------

    #[test]
    fn test_poll_payload_shape() {
        let card: PollCard = serde_json::from_value(json!({
            "course_id": "c1",
            "question": "Coffee or tea?",
            "options": ["Coffee", "Tea"],
        }))
        .unwrap();
        let payload = card.payload().unwrap();
        assert_eq!(payload["cardType"], "poll");
        assert_eq!(payload["contents"]["options"], json!(["Coffee", "Tea"]));
        // polls have no plain header1 twin
        assert!(payload["contents"].get("header1").is_none());
        assert_eq!(payload["isMandatory"], false);
    }

    #[test]
    fn test_poll_rejects_bad_option_counts() {
        for options in [vec!["a"], vec!["a", "b", "c", "d", "e"]] {
            let card: PollCard = serde_json::from_value(json!({
                "course_id": "c1",
                "question": "Q",
                "options": options,
            }))
            .unwrap();
            let err = card.payload().unwrap_err();
            assert_eq!(err.to_string(), "Poll must have 2-4 options");
        }
    }

    // -- audio --------------------------------------------------------------

    fn audio_card(extra: Value) -> AudioCard {
        let mut base = json!({
            "course_id": "c1",
            "audio_url": "https://cdn.example/a.mp3",
            "title": "Intro",
        });
        for (k, v) in extra.as_object().unwrap() {
            base[k.as_str()] = v.clone();
        }
        serde_json::from_value(base).unwrap()
    }

    #[test]
    fn test_audio_payload_minimal() {
        let payload = audio_card(json!({})).payload();
        assert_eq!(payload["cardType"], "audio");
        assert_eq!(payload["contents"]["audio"], "https://cdn.example/a.mp3");
        assert_eq!(payload["contents"]["header1"], "Intro");
        assert_eq!(payload["isMandatory"], false);
        assert!(payload["contents"].get("audioGeneratedBy").is_none());
        assert!(payload.get("sortOrder").is_none());
    }

    #[test]
    fn test_audio_generated_stamps_producer() {
        let payload = audio_card(json!({
            "audio_script": "Welcome aboard",
            "audio_generated": true,
            "audio_generated_at": "2025-03-01T10:00:00+05:30",
        }))
        .payload();
        let contents = &payload["contents"];
        assert_eq!(contents["audioScript"], "Welcome aboard");
        assert_eq!(contents["audioGenerated"], true);
        assert_eq!(contents["audioGeneratedAt"], "2025-03-01T10:00:00+05:30");
        assert_eq!(contents["audioGeneratedBy"], GENERATED_BY);
    }

    #[test]
    fn test_audio_background_image_provenance() {
        let payload = audio_card(json!({
            "background_image_url": "https://cdn.example/bg.webp",
            "image_prompt": "calm ocean",
            "image_generated": true,
            "image_generated_at": "2025-03-01T10:05:00+05:30",
        }))
        .payload();
        let contents = &payload["contents"];
        assert_eq!(contents["image"], "https://cdn.example/bg.webp");
        assert_eq!(contents["imagePrompt"], "calm ocean");
        assert_eq!(contents["imageGeneratedBy"], GENERATED_BY);
    }

    #[test]
    fn test_audio_generated_false_keeps_flag_without_producer() {
        let payload = audio_card(json!({"audio_generated": false})).payload();
        assert_eq!(payload["contents"]["audioGenerated"], false);
        assert!(payload["contents"].get("audioGeneratedBy").is_none());
    }

    // -- content ------------------------------------------------------------

    #[test]
    fn test_content_card_strips_inline_markup_in_plain_header() {
        let card: ContentCard = serde_json::from_value(json!({
            "course_id": "c1",
            "header1_text": "<b>Safety</b> <i>first</i>",
        }))
        .unwrap();
        let payload = card.payload();
        assert_eq!(payload["contents"]["header1"], "Safety first");
        assert_eq!(
            payload["contents"]["_header1"]["text"],
            "<b>Safety</b> <i>first</i>"
        );
        assert_eq!(payload["align"], "center center");
        // no image, so contents carry no align
        assert!(payload["contents"].get("align").is_none());
    }

    #[test]
    fn test_content_card_with_image_and_provenance() {
        let card: ContentCard = serde_json::from_value(json!({
            "course_id": "c1",
            "header1_text": "Fire exits",
            "header2_text": "Know where they are",
            "image_url": "https://cdn.example/map.webp",
            "image_prompt": "floor plan",
            "image_generated": true,
            "image_generated_at": "2025-03-01T11:00:00+05:30",
            "align": "bg",
        }))
        .unwrap();
        let payload = card.payload();
        let contents = &payload["contents"];
        assert_eq!(contents["image"], "https://cdn.example/map.webp");
        assert_eq!(contents["align"], "bg");
        assert_eq!(contents["header2"], "Know where they are");
        assert_eq!(contents["imageGeneratedBy"], GENERATED_BY);
        assert_eq!(payload["align"], "bg");
    }

    // -- form / video / link ------------------------------------------------

    #[test]
    fn test_form_card_payload() {
        let card: FormCard = serde_json::from_value(json!({
            "course_id": "c1",
            "question": "Any feedback?",
        }))
        .unwrap();
        let payload = card.payload();
        assert_eq!(payload["cardType"], "form");
        assert_eq!(payload["contents"]["_header1"]["text"], "Any feedback?");
        assert!(payload["contents"].get("header1").is_none());
    }

    #[test]
    fn test_video_card_payload() {
        let card: VideoCard = serde_json::from_value(json!({
            "course_id": "c1",
            "video_url": "https://cdn.example/v.mp4",
        }))
        .unwrap();
        let payload = card.payload();
        assert_eq!(payload["cardType"], "video");
        assert_eq!(payload["contents"], json!({"video": "https://cdn.example/v.mp4"}));
    }

    #[test]
    fn test_link_card_has_no_mandatory_flag() {
        let card: LinkCard = serde_json::from_value(json!({
            "course_id": "c1",
            "title": "Handbook",
            "link_url": "https://example.com/handbook",
        }))
        .unwrap();
        let payload = card.payload();
        assert_eq!(payload["cardType"], "link");
        assert_eq!(payload["contents"]["linkcaption"], "Visit Link");
        assert!(payload.get("isMandatory").is_none());
    }

    #[test]
    fn test_sort_order_zero_is_sent() {
        let card: VideoCard = serde_json::from_value(json!({
            "course_id": "c1",
            "video_url": "https://cdn.example/v.mp4",
            "sort_order": 0,
        }))
        .unwrap();
        assert_eq!(card.payload()["sortOrder"], 0);
    }

    // -- merge --------------------------------------------------------------

    fn as_map(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_merge_contents_caller_wins_server_keys_survive() {
        let current = as_map(json!({"a": 1, "b": 2}));
        let updates = as_map(json!({"b": 3, "c": 4}));
        let merged = merge_contents(&current, &updates);
        assert_eq!(Value::Object(merged), json!({"a": 1, "b": 3, "c": 4}));
    }

    #[test]
    fn test_merge_contents_replaces_nested_objects_wholesale() {
        let current = as_map(json!({"_header1": {"text": "old", "visibility": true}}));
        let updates = as_map(json!({"_header1": {"text": "new"}}));
        let merged = merge_contents(&current, &updates);
        assert_eq!(merged["_header1"], json!({"text": "new"}));
    }

    // -- update path --------------------------------------------------------

    fn client_for(server: &MockServer) -> ApiClient {
        ApiClient::new(ApiSettings {
            base_url: server.uri(),
            token: "t".to_string(),
            company_id: "co".to_string(),
        })
    }

    fn contents_update(partial: Value) -> CardUpdate {
        CardUpdate {
            contents: Some(as_map(partial)),
            ..CardUpdate::default()
        }
    }

    #[tokio::test]
    async fn test_update_card_merges_then_puts() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/card/k1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "k1",
                "contents": {"a": 1, "b": 2},
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/api/card/k1"))
            .and(body_json(json!({"contents": {"a": 1, "b": 3, "c": 4}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let result = update_card(&client, "k1", contents_update(json!({"b": 3, "c": 4})))
            .await
            .unwrap();
        assert_eq!(result["ok"], true);
    }

    #[tokio::test]
    async fn test_update_card_aborts_when_read_fails() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/card/k1"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = update_card(&client, "k1", contents_update(json!({"b": 3})))
            .await
            .unwrap_err();
        assert!(err.is_upstream());
        // the failed read is the only request; no write was attempted
        assert_eq!(server.received_requests().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_card_scalar_fields_skip_the_read() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/card/k1"))
            .and(body_json(json!({"isMandatory": true, "sortOrder": 7})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let update = CardUpdate {
            is_mandatory: Some(true),
            sort_order: Some(7),
            ..CardUpdate::default()
        };
        update_card(&client, "k1", update).await.unwrap();
        assert_eq!(server.received_requests().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_card_rejects_empty_update_without_network() {
        let server = MockServer::start().await;
        let client = client_for(&server);
        let err = update_card(&client, "k1", CardUpdate::default())
            .await
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "No update data provided");
        assert!(server.received_requests().await.unwrap().is_empty());
    }
}
