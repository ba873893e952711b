//! Authenticated HTTP adapter for the content API.
//!
//! [`ApiClient`] issues GET/POST/PUT requests with a bearer token and a
//! bounded timeout, returning decoded JSON or a tagged error. There are no
//! retries: a transient failure surfaces to the caller as the terminal
//! result of that call.

use std::time::Duration;

use reqwest::{Method, header};
use serde_json::Value;

use cardcraft_core::settings::ApiSettings;
use cardcraft_core::{Error, Result};

/// Per-request timeout for CRUD calls against the content API.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Authenticated JSON client for the content API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl ApiClient {
    /// Create a client from API settings.
    pub fn new(settings: ApiSettings) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: settings.base_url,
            token: settings.token,
        }
    }

    /// Issue a request against the content API.
    ///
    /// Only GET, POST, and PUT are supported; any other method is rejected
    /// with a validation error before a connection is opened.
    ///
    /// # Errors
    ///
    /// - [`Error::Validation`] for an unsupported method
    /// - [`Error::Upstream`] for a non-2xx response (carries status and body)
    ///   or an undecodable body
    /// - [`Error::Transport`] for timeouts and connection failures
    pub async fn request(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Value> {
        if method != Method::GET && method != Method::POST && method != Method::PUT {
            return Err(Error::validation(format!(
                "Unsupported HTTP method: {method}"
            )));
        }

        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%method, %path, "content API request");

        let mut request = self
            .http
            .request(method, &url)
            .bearer_auth(&self.token)
            .header(header::CONTENT_TYPE, "application/json")
            .timeout(REQUEST_TIMEOUT);

        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(Error::transport)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(Error::upstream(
                "content API request",
                format!("HTTP {status}: {text}"),
            ));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| Error::upstream("content API request", format!("invalid JSON body: {e}")))
    }

    /// Fetch a course by id.
    pub async fn get_course(&self, course_id: &str) -> Result<Value> {
        self.request(Method::GET, &format!("/api/course?id={course_id}"), None)
            .await
    }

    /// Create a course from a prebuilt payload.
    pub async fn create_course(&self, payload: &Value) -> Result<Value> {
        self.request(Method::POST, "/api/createCourse", Some(payload))
            .await
    }

    /// Fetch a card by id.
    pub async fn get_card(&self, card_id: &str) -> Result<Value> {
        self.request(Method::GET, &format!("/api/card/{card_id}"), None)
            .await
    }

    /// Fetch all cards belonging to a course.
    pub async fn course_cards(&self, course_id: &str) -> Result<Value> {
        self.request(Method::GET, &format!("/api/courses/{course_id}/cards"), None)
            .await
    }

    /// Create a card from a prebuilt payload.
    pub async fn create_card(&self, payload: &Value) -> Result<Value> {
        self.request(Method::POST, "/api/createCard", Some(payload))
            .await
    }

    /// Overwrite card fields with a prebuilt update body.
    pub async fn update_card(&self, card_id: &str, payload: &Value) -> Result<Value> {
        self.request(Method::PUT, &format!("/api/card/{card_id}"), Some(payload))
            .await
    }
}
