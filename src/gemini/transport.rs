use crate::{
    config::GeminiConfig,
    error::{Result, StyleError},
    models::{GenerateContentRequest, GenerateContentResponse},
};
use reqwest::Client;
use serde_json::Value;
use uuid::Uuid;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Shared HTTP plumbing for both Gemini calls.
#[derive(Clone)]
pub struct GeminiTransport {
    http: Client,
    api_key: String,
    base_url: String,
}

impl GeminiTransport {
    pub fn new(config: &GeminiConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                StyleError::ConfigError("GEMINI_API_KEY or API_KEY is required".into())
            })?;

        Ok(Self {
            http: Client::new(),
            api_key,
            base_url: config.base_url(),
        })
    }

    pub fn endpoint_for_model(&self, model: &str) -> String {
        let trimmed = model.trim();
        let model_path = if trimmed.starts_with("models/") {
            trimmed.to_string()
        } else {
            format!("models/{}", trimmed)
        };
        format!("{}/{}:generateContent", self.base_url, model_path)
    }

    /// One `generateContent` round trip. No retries.
    pub async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        let endpoint = self.endpoint_for_model(model);
        let request_id = Uuid::new_v4().to_string();

        log::info!("Invoking model: {} [req:{}]", model, request_id);

        let response = self
            .http
            .post(&endpoint)
            .header(API_KEY_HEADER, &self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                let e = e.without_url();
                log::error!("Gemini request failed [req:{}]: {}", request_id, e);
                StyleError::RequestError(format!("Gemini request failed: {}", e))
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| StyleError::ResponseError(e.without_url().to_string()))?;

        if !status.is_success() {
            let message = error_message_from_body(&body);
            log::error!(
                "Gemini returned {} [req:{}]: {}",
                status.as_u16(),
                request_id,
                message
            );
            return Err(StyleError::ResponseError(format!(
                "Gemini service error: {} - {}",
                status.as_u16(),
                message
            )));
        }

        log::debug!("Response body length: {} [req:{}]", body.len(), request_id);

        serde_json::from_str(&body).map_err(|e| StyleError::SerializationError(e.to_string()))
    }
}

/// Pulls `error.message` out of a Gemini error body, falling back to the raw text.
fn error_message_from_body(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("error")
                .and_then(|error| error.get("message"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                "no message".to_string()
            } else {
                body.trim().to_string()
            }
        })
}
