use crate::{
    error::{Result, StyleError},
    gemini::transport::GeminiTransport,
    logger,
    models::{EncodedImage, GenerateContentRequest, GenerateContentResponse},
};

pub const NO_IMAGE_GENERATED: &str = "No image generated.";
pub const NO_IMAGE_IN_OUTPUT: &str = "AI responded but no image was found in the output.";

#[derive(Clone)]
pub struct ApplicationClient {
    transport: GeminiTransport,
    model: String,
}

impl ApplicationClient {
    pub fn new(transport: GeminiTransport, model: impl Into<String>) -> Self {
        Self {
            transport,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn apply(&self, image: &EncodedImage, style_prompt: &str) -> Result<EncodedImage> {
        let _timer = logger::timer("Style application");
        log::info!(
            "Applying style to source image ({}, prompt {} chars)",
            image.media_type(),
            style_prompt.len()
        );

        let request = GenerateContentRequest::image_with_text(image, instructions(style_prompt));

        let response = self
            .transport
            .generate_content(&self.model, &request)
            .await
            .map_err(|e| {
                log::error!("Style application call failed: {}", e);
                StyleError::Generation(e.to_string())
            })?;

        extract_generated_image(&response)
    }
}

pub fn instructions(style_prompt: &str) -> String {
    format!(
        "Modify this person's photo to match the following style description exactly. \
         Maintain the person's facial features and identity, but change their outfit, pose, \
         background, and camera angle to match this: {}",
        style_prompt
    )
}

/// First inline image among the first candidate's parts.
pub fn extract_generated_image(response: &GenerateContentResponse) -> Result<EncodedImage> {
    let parts = response.parts();
    if parts.is_empty() {
        log::error!("Generation response carried no parts");
        return Err(StyleError::Generation(NO_IMAGE_GENERATED.into()));
    }

    parts
        .iter()
        .find_map(|part| part.inline_data.as_ref())
        .map(|inline| EncodedImage::from_base64(inline.data.clone(), inline.mime_type.clone()))
        .ok_or_else(|| {
            log::warn!(
                "Generation response had {} parts but no inline image",
                parts.len()
            );
            StyleError::Generation(NO_IMAGE_IN_OUTPUT.into())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(parts: serde_json::Value) -> GenerateContentResponse {
        serde_json::from_value(json!({
            "candidates": [{ "content": { "parts": parts } }]
        }))
        .unwrap()
    }

    #[test]
    fn test_instructions_embed_prompt() {
        let text = instructions("neon cyberpunk jacket");
        assert!(text.starts_with("Modify this person's photo"));
        assert!(text.contains("facial features and identity"));
        assert!(text.ends_with("to match this: neon cyberpunk jacket"));
    }

    #[test]
    fn test_returns_first_inline_image_as_data_url() {
        let response = response(json!([
            { "text": "Here you go" },
            { "inlineData": { "mimeType": "image/png", "data": "AAAA" } },
            { "inlineData": { "mimeType": "image/jpeg", "data": "BBBB" } }
        ]));
        let image = extract_generated_image(&response).unwrap();
        assert_eq!(image.payload(), "data:image/png;base64,AAAA");
        assert_eq!(image.media_type(), "image/png");
    }

    #[test]
    fn test_no_parts_is_distinct_failure() {
        let err = extract_generated_image(&GenerateContentResponse::default()).unwrap_err();
        assert!(matches!(err, StyleError::Generation(ref msg) if msg == NO_IMAGE_GENERATED));
    }

    #[test]
    fn test_text_only_parts_is_distinct_failure() {
        let err = extract_generated_image(&response(json!([{ "text": "I can't do that" }])))
            .unwrap_err();
        assert!(matches!(err, StyleError::Generation(ref msg) if msg == NO_IMAGE_IN_OUTPUT));
    }
}
