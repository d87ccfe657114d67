use crate::{
    error::Result,
    models::{EncodedImage, StyleDescription},
};
use async_trait::async_trait;

/// The two backend calls the workflow depends on. `GeminiClient` is the
/// production implementation; tests inject deterministic stand-ins.
#[async_trait]
pub trait StyleService: Send + Sync {
    /// Extracts a structured style description from a reference image.
    async fn analyze(&self, image: &EncodedImage) -> Result<StyleDescription>;

    /// Restyles `image` according to `style_prompt`.
    async fn apply(&self, image: &EncodedImage, style_prompt: &str) -> Result<EncodedImage>;
}
