use crate::{
    error::{Result, StyleError},
    gemini::transport::GeminiTransport,
    logger,
    models::{
        EncodedImage, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
        StyleDescription,
    },
};
use serde_json::{json, Map, Value};

const ANALYSIS_INSTRUCTIONS: &str = "Analyze this fashion/style image and provide a detailed breakdown for replication.
Include specific details about:
- Outfit (garments, colors, materials, patterns)
- Accessories (jewelry, hats, bags, footwear)
- Pose (body position, limb placement, expression)
- Camera Angle (eye-level, low, bird's eye, etc.)
- Lighting (natural, cinematic, soft, harsh)
- Aesthetic (vintage, futuristic, streetwear, high-fashion)

Then, create a \"cohesivePrompt\" that is a single, dense descriptive paragraph that can be used to re-apply this entire style (clothing, pose, lighting, angle) to a DIFFERENT PERSON while keeping their facial identity if possible.";

pub const ANALYSIS_FAILED: &str = "Failed to analyze image style.";

#[derive(Clone)]
pub struct AnalysisClient {
    transport: GeminiTransport,
    model: String,
}

impl AnalysisClient {
    pub fn new(transport: GeminiTransport, model: impl Into<String>) -> Self {
        Self {
            transport,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn analyze(&self, image: &EncodedImage) -> Result<StyleDescription> {
        let _timer = logger::timer("Style analysis");
        log::info!(
            "Analyzing reference image ({}, {} base64 chars)",
            image.media_type(),
            image.base64_data().len()
        );

        let request = GenerateContentRequest::image_with_text(image, ANALYSIS_INSTRUCTIONS)
            .with_generation_config(GenerationConfig {
                response_mime_type: Some("application/json".to_string()),
                response_schema: Some(Self::response_schema()),
            });

        let response = self
            .transport
            .generate_content(&self.model, &request)
            .await
            .map_err(|e| {
                log::error!("Style analysis call failed: {}", e);
                StyleError::Analysis(e.to_string())
            })?;

        parse_style_description(&response)
    }

    /// OBJECT schema with the seven style fields, all STRING and all required.
    pub fn response_schema() -> Value {
        let properties: Map<String, Value> = StyleDescription::FIELDS
            .iter()
            .map(|field| (field.to_string(), json!({ "type": "STRING" })))
            .collect();

        json!({
            "type": "OBJECT",
            "properties": properties,
            "required": StyleDescription::FIELDS,
        })
    }
}

/// Reads the first candidate's text as a `StyleDescription`. Empty text,
/// invalid JSON, missing fields and a blank prompt are all failures.
pub fn parse_style_description(response: &GenerateContentResponse) -> Result<StyleDescription> {
    let text = response
        .text()
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| {
            log::error!(
                "Analysis response carried no text (finish reason: {})",
                response.finish_reason().unwrap_or("none")
            );
            StyleError::Analysis(ANALYSIS_FAILED.into())
        })?;

    let description: StyleDescription = serde_json::from_str(text.trim()).map_err(|e| {
        log::error!("Failed to parse analysis result: {}", e);
        StyleError::Analysis(ANALYSIS_FAILED.into())
    })?;

    if description.cohesive_prompt.trim().is_empty() {
        log::error!("Analysis result has an empty cohesivePrompt");
        return Err(StyleError::Analysis(ANALYSIS_FAILED.into()));
    }

    Ok(description)
}
