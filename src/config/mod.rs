//! Configuration system for Shopmate.
//!
//! Two layers, both resolved once at process start:
//! 1. File config (shopmate.yml or ~/.config/shopmate/shopmate.yml)
//! 2. Credentials from the environment variables the file config names

pub use self::credentials::Credentials;
pub use self::global::{CatalogConfig, CatalogSourceKind, Config, LlmConfig, PromptConfig, ServerConfig};

mod credentials;
mod global;

/// File name looked up in the working directory and the user config dir.
pub const PROJECT_CONFIG_FILE: &str = "shopmate.yml";

/// Default Gemini model.
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Default Gemini API root.
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default Shopify Admin API version.
pub const DEFAULT_ADMIN_API_VERSION: &str = "2024-01";

/// Largest page the public products.json listing will serve.
pub const MAX_PAGE_SIZE: usize = 250;
