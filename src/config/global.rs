//! File-level configuration.
//!
//! Loaded from shopmate.yml or ~/.config/shopmate/shopmate.yml. Secrets never
//! live here; the file only names the environment variables that hold them.

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Top-level configuration for Shopmate.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// HTTP listener settings.
    pub server: ServerConfig,

    /// Model service settings.
    pub llm: LlmConfig,

    /// Catalog lookup settings.
    pub catalog: CatalogConfig,

    /// System instruction source.
    pub prompt: PromptConfig,
}

impl Config {
    /// Load configuration with fallback chain.
    ///
    /// Search order:
    /// 1. Explicit path if provided
    /// 2. shopmate.yml in current directory
    /// 3. ~/.config/shopmate/shopmate.yml
    /// 4. Defaults
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        let project_config = PathBuf::from(super::PROJECT_CONFIG_FILE);
        if project_config.exists() {
            match Self::load_from_file(&project_config) {
                Ok(config) => {
                    log::info!("Loaded config from {}", project_config.display());
                    return Ok(config);
                }
                Err(e) => {
                    log::warn!("Failed to load {}: {}", project_config.display(), e);
                }
            }
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("shopmate").join(super::PROJECT_CONFIG_FILE);
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => {
                        log::info!("Loaded config from {}", user_config.display());
                        return Ok(config);
                    }
                    Err(e) => {
                        log::warn!("Failed to load {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;
        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.server.path.is_empty() || !self.server.path.starts_with('/') {
            eyre::bail!("server.path must start with '/'");
        }
        if self.llm.model.trim().is_empty() {
            eyre::bail!("llm.model must not be empty");
        }
        if self.llm.timeout_ms == 0 {
            eyre::bail!("llm.timeout-ms must be > 0");
        }
        if self.catalog.timeout_ms == 0 {
            eyre::bail!("catalog.timeout-ms must be > 0");
        }
        if self.catalog.page_size == 0 || self.catalog.page_size > super::MAX_PAGE_SIZE {
            eyre::bail!("catalog.page-size must be between 1 and {}", super::MAX_PAGE_SIZE);
        }
        Ok(())
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to bind.
    pub bind: String,

    /// Route of the chat endpoint.
    pub path: String,

    /// Value of Access-Control-Allow-Origin.
    #[serde(rename = "allowed-origin")]
    pub allowed_origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:3000".to_string(),
            path: "/api/chat".to_string(),
            allowed_origin: "*".to_string(),
        }
    }
}

/// Model service settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Gemini model name.
    pub model: String,

    /// Base URL for the generateContent API.
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Environment variable holding the API key.
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// Timeout per model call in milliseconds.
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,

    #[serde(rename = "max-output-tokens", skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: super::DEFAULT_MODEL.to_string(),
            base_url: super::DEFAULT_GEMINI_BASE_URL.to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            timeout_ms: 60_000,
            max_output_tokens: None,
            temperature: None,
        }
    }
}

/// Which catalog backend answers product lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogSourceKind {
    /// Authenticated Admin GraphQL API.
    #[default]
    Admin,
    /// Public products.json listing, filtered locally.
    Storefront,
}

/// Catalog lookup settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub source: CatalogSourceKind,

    /// Store domain; falls back to `store-domain-env` when unset.
    #[serde(rename = "store-domain", skip_serializing_if = "Option::is_none")]
    pub store_domain: Option<String>,

    #[serde(rename = "store-domain-env")]
    pub store_domain_env: String,

    #[serde(rename = "access-token-env")]
    pub access_token_env: String,

    /// Admin API version segment.
    #[serde(rename = "api-version")]
    pub api_version: String,

    /// Override for the API origin (defaults to https://<store-domain>).
    #[serde(rename = "base-url", skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Re-query unfiltered when a keyword matches nothing.
    #[serde(rename = "allow-fallback")]
    pub allow_fallback: bool,

    /// Cap on returned records; 0 disables the cap.
    #[serde(rename = "max-results")]
    pub max_results: usize,

    /// Page size for the public listing.
    #[serde(rename = "page-size")]
    pub page_size: usize,

    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            source: CatalogSourceKind::default(),
            store_domain: None,
            store_domain_env: "SHOPIFY_STORE_URL".to_string(),
            access_token_env: "SHOPIFY_ACCESS_TOKEN".to_string(),
            api_version: super::DEFAULT_ADMIN_API_VERSION.to_string(),
            base_url: None,
            allow_fallback: true,
            max_results: 5,
            page_size: super::MAX_PAGE_SIZE,
            timeout_ms: 15_000,
        }
    }
}

/// System instruction source.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct PromptConfig {
    /// Inline system instruction; wins over the file.
    #[serde(rename = "system-instruction", skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<String>,

    #[serde(rename = "system-instruction-file", skip_serializing_if = "Option::is_none")]
    pub system_instruction_file: Option<PathBuf>,
}
