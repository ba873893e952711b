//! Course creation payloads.

use serde::Deserialize;
use serde_json::{Value, json};

use cardcraft_core::new_id;

/// Parameters for creating a course.
///
/// Deserializes directly from tool arguments; optional fields are omitted
/// from the payload when absent. Every course minted through this server is
/// stamped `createdByAgent: true`.
#[derive(Debug, Clone, Deserialize)]
pub struct NewCourse {
    /// Course title (max 255 characters on the remote side).
    pub title: String,
    /// Duration in minutes.
    #[serde(default)]
    pub duration: i64,
    /// Course description (max 1000 characters on the remote side).
    #[serde(default)]
    pub description: Option<String>,
    /// Folder to organize the course under.
    #[serde(default)]
    pub folder_id: Option<String>,
    /// Markdown course plan; stores the original prompt and structure.
    #[serde(default)]
    pub finalized_course_plan: Option<String>,
    /// Whether the course is visible to learners.
    #[serde(default)]
    pub is_published: bool,
    /// Auto-advance cards.
    #[serde(default)]
    pub is_autoplay: bool,
    /// Track quiz scores.
    #[serde(default)]
    pub is_scorable: bool,
    /// Hex color for the gradient start, e.g. `#FF0000`.
    #[serde(default)]
    pub gradient_from_color: Option<String>,
    /// Hex color for the gradient end.
    #[serde(default)]
    pub gradient_to_color: Option<String>,
    /// Custom theme id.
    #[serde(default)]
    pub theme_id: Option<String>,
}

impl NewCourse {
    /// Build the creation payload, minting a fresh course id.
    pub fn payload(&self, company_id: &str) -> Value {
        let mut course = json!({
            "id": new_id(),
            "title": self.title,
            "companyId": company_id,
            "duration": self.duration,
            "isPublished": self.is_published,
            "isAutoplay": self.is_autoplay,
            "isScorable": self.is_scorable,
            "createdByAgent": true,
        });

        if let Some(description) = &self.description {
            course["description"] = json!(description);
        }
        if let Some(folder_id) = &self.folder_id {
            course["folderId"] = json!(folder_id);
        }
        if let Some(plan) = &self.finalized_course_plan {
            course["finalizedCoursePlan"] = json!(plan);
        }
        if let Some(from) = &self.gradient_from_color {
            course["gradientFromColor"] = json!(from);
        }
        if let Some(to) = &self.gradient_to_color {
            course["gradientToColor"] = json!(to);
        }
        if let Some(theme_id) = &self.theme_id {
            course["themeId"] = json!(theme_id);
        }

        course
    }
}
