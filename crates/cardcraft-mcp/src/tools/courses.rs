//! Course tools: creation and retrieval.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{Value, json};

use cardcraft_api::ApiClient;
use cardcraft_api::courses::NewCourse;

use crate::registry::{ToolRegistry, ToolResult, make_tool};
use crate::tools::{api_result, invalid_args};
use rmcp::model::Tool;

/// Arguments for the get_course tool.
#[derive(Debug, Deserialize)]
pub struct GetCourseArgs {
    /// Course identifier.
    pub course_id: String,
}

/// Arguments for the get_course_cards tool.
#[derive(Debug, Deserialize)]
pub struct GetCourseCardsArgs {
    /// Course identifier.
    pub course_id: String,
}

/// MCP tools for course operations.
pub struct CourseTools {
    client: Arc<ApiClient>,
    company_id: String,
}

impl CourseTools {
    /// Create course tools bound to an API client and company identity.
    pub fn new(client: Arc<ApiClient>, company_id: impl Into<String>) -> Self {
        Self {
            client,
            company_id: company_id.into(),
        }
    }
}

impl ToolRegistry for CourseTools {
    fn tools(&self) -> Vec<Tool> {
        vec![
            make_tool(
                "get_course",
                "Get details of a specific course",
                json!({
                    "type": "object",
                    "properties": {
                        "course_id": {
                            "type": "string",
                            "description": "The ID of the course to retrieve"
                        }
                    },
                    "required": ["course_id"]
                }),
            ),
            make_tool(
                "create_course",
                "Create a new course. Courses created through this server are \
                 automatically marked as AI-generated.",
                json!({
                    "type": "object",
                    "properties": {
                        "title": {
                            "type": "string",
                            "description": "Course title (max 255 characters)"
                        },
                        "duration": {
                            "type": "integer",
                            "description": "Course duration in minutes (default: 0)"
                        },
                        "description": {
                            "type": "string",
                            "description": "Course description (max 1000 characters)"
                        },
                        "folder_id": {
                            "type": "string",
                            "description": "ID of the folder to organize the course"
                        },
                        "finalized_course_plan": {
                            "type": "string",
                            "description": "Course plan in Markdown; stores the original prompt and structure"
                        },
                        "is_published": {
                            "type": "boolean",
                            "description": "Whether the course is visible to learners (default: false)"
                        },
                        "is_autoplay": {
                            "type": "boolean",
                            "description": "Auto-advance cards (default: false)"
                        },
                        "is_scorable": {
                            "type": "boolean",
                            "description": "Track quiz scores (default: false)"
                        },
                        "gradient_from_color": {
                            "type": "string",
                            "description": "Hex color for gradient start, e.g. \"#FF0000\""
                        },
                        "gradient_to_color": {
                            "type": "string",
                            "description": "Hex color for gradient end"
                        },
                        "theme_id": {
                            "type": "string",
                            "description": "Custom theme ID"
                        }
                    },
                    "required": ["title"]
                }),
            ),
            make_tool(
                "get_course_cards",
                "Get all cards for a specific course",
                json!({
                    "type": "object",
                    "properties": {
                        "course_id": {
                            "type": "string",
                            "description": "The ID of the course to get cards for"
                        }
                    },
                    "required": ["course_id"]
                }),
            ),
        ]
    }

    fn call(&self, name: &str, args: Value) -> Option<ToolResult> {
        let client = Arc::clone(&self.client);

        match name {
            "get_course" => Some(Box::pin(async move {
                let args: GetCourseArgs = serde_json::from_value(args).map_err(invalid_args)?;
                api_result(client.get_course(&args.course_id).await)
            })),

            "create_course" => {
                let company_id = self.company_id.clone();
                Some(Box::pin(async move {
                    let course: NewCourse = serde_json::from_value(args).map_err(invalid_args)?;
                    let payload = course.payload(&company_id);
                    api_result(client.create_course(&payload).await)
                }))
            }

            "get_course_cards" => Some(Box::pin(async move {
                let args: GetCourseCardsArgs =
                    serde_json::from_value(args).map_err(invalid_args)?;
                api_result(client.course_cards(&args.course_id).await)
            })),

            _ => None,
        }
    }
}
