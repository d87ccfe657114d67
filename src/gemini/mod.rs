pub mod analysis_client;
pub mod application_client;
pub mod transport;

use crate::{
    config::GeminiConfig,
    error::Result,
    models::{EncodedImage, StyleDescription},
    workflow::StyleService,
};
use async_trait::async_trait;

pub use analysis_client::AnalysisClient;
pub use application_client::ApplicationClient;
pub use transport::GeminiTransport;

/// The Gemini-backed style service: one analysis client, one application
/// client, sharing a transport.
#[derive(Clone)]
pub struct GeminiClient {
    analysis_client: AnalysisClient,
    application_client: ApplicationClient,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let transport = GeminiTransport::new(&config)?;

        log::info!(
            "Gemini client ready (analysis: {}, generation: {})",
            config.analysis_model(),
            config.generation_model()
        );

        Ok(Self {
            analysis_client: AnalysisClient::new(transport.clone(), config.analysis_model()),
            application_client: ApplicationClient::new(transport, config.generation_model()),
        })
    }

    pub fn analysis(&self) -> &AnalysisClient {
        &self.analysis_client
    }

    pub fn application(&self) -> &ApplicationClient {
        &self.application_client
    }
}

#[async_trait]
impl StyleService for GeminiClient {
    async fn analyze(&self, image: &EncodedImage) -> Result<StyleDescription> {
        self.analysis_client.analyze(image).await
    }

    async fn apply(&self, image: &EncodedImage, style_prompt: &str) -> Result<EncodedImage> {
        self.application_client.apply(image, style_prompt).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_uses_configured_models() {
        let config = GeminiConfig::new()
            .with_api_key("key")
            .with_models("analysis-x", "image-y");
        let client = GeminiClient::new(config).unwrap();
        assert_eq!(client.analysis().model(), "analysis-x");
        assert_eq!(client.application().model(), "image-y");
    }

    #[test]
    fn test_client_requires_api_key() {
        assert!(GeminiClient::new(GeminiConfig::new()).is_err());
    }

    #[tokio::test]
    async fn test_failed_calls_keep_the_api_key_out_of_the_message() {
        let config = GeminiConfig::new()
            .with_api_key("SUPERSECRET123")
            .with_base_url("http://127.0.0.1:9");
        let client = GeminiClient::new(config).unwrap();
        let image = EncodedImage::from_bytes(b"img", "image/png");

        let analysis = client.analyze(&image).await.unwrap_err().to_string();
        let generation = client.apply(&image, "prompt").await.unwrap_err().to_string();

        assert!(!analysis.contains("SUPERSECRET123"));
        assert!(!generation.contains("SUPERSECRET123"));
    }
}
