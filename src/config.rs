//! Process-wide configuration, resolved once at startup.

use crate::error::{Result, WeaverError};

/// Environment variable holding the API credential.
pub const API_KEY_ENV: &str = "API_KEY";

/// Model used for every generation.
pub const DEFAULT_MODEL: &str = "imagen-4.0-generate-001";

/// Generative Language API root.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Resolved configuration passed explicitly to the provider.
#[derive(Clone)]
pub struct Config {
    api_key: String,
    model: String,
    base_url: String,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl Config {
    /// Creates a new `ConfigBuilder`.
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Reads the credential from `API_KEY`. Missing or blank is fatal.
    pub fn from_env() -> Result<Self> {
        Self::builder().build()
    }

    /// The API credential.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// The model identifier.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// The API root, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Builder for [`Config`].
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    api_key: Option<String>,
    model: Option<String>,
    base_url: Option<String>,
}

impl ConfigBuilder {
    /// Sets the API key. Falls back to the `API_KEY` env var.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Overrides the model identifier.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Overrides the API root (used to point at a local stand-in).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Builds the configuration, resolving the API key.
    pub fn build(self) -> Result<Config> {
        let api_key = self
            .api_key
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                WeaverError::Config(format!("{API_KEY_ENV} environment variable is not set."))
            })?;

        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Config {
            api_key,
            model: self.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url,
        })
    }
}
