use std::env;
use std::path::PathBuf;

use crate::logger::LogLevel;

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_ANALYSIS_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_GENERATION_MODEL: &str = "gemini-2.5-flash-image";

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub analysis_model: Option<String>,
    pub generation_model: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub gemini: GeminiConfig,
    pub output_dir: PathBuf,
    pub log_level: LogLevel,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        GeminiConfig {
            api_key: None,
            base_url: None,
            analysis_model: None,
            generation_model: None,
        }
    }
}

impl GeminiConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let api_key = non_empty_env("GEMINI_API_KEY").or_else(|| non_empty_env("API_KEY"));
        let base_url = non_empty_env("GEMINI_API_BASE");
        let analysis_model = non_empty_env("STYLE_ANALYSIS_MODEL");
        let generation_model = non_empty_env("STYLE_GENERATION_MODEL");

        GeminiConfig {
            api_key,
            base_url,
            analysis_model,
            generation_model,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_models(
        mut self,
        analysis_model: impl Into<String>,
        generation_model: impl Into<String>,
    ) -> Self {
        self.analysis_model = Some(analysis_model.into());
        self.generation_model = Some(generation_model.into());
        self
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> String {
        self.base_url
            .as_deref()
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
    }

    pub fn analysis_model(&self) -> &str {
        self.analysis_model
            .as_deref()
            .unwrap_or(DEFAULT_ANALYSIS_MODEL)
    }

    pub fn generation_model(&self) -> &str {
        self.generation_model
            .as_deref()
            .unwrap_or(DEFAULT_GENERATION_MODEL)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            gemini: GeminiConfig::default(),
            output_dir: PathBuf::from("."),
            log_level: LogLevel::Info,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let output_dir = non_empty_env("STYLE_OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        let log_level = non_empty_env("LOG_LEVEL")
            .and_then(|level| LogLevel::parse(&level))
            .unwrap_or(LogLevel::Info);

        Config {
            gemini: GeminiConfig::from_env(),
            output_dir,
            log_level,
        }
    }

    pub fn with_gemini(mut self, config: GeminiConfig) -> Self {
        self.gemini = config;
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
