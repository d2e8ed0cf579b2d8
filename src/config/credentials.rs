//! Secrets resolved from the process environment.
//!
//! Read exactly once at startup; request handling only ever sees the
//! resolved values passed into client constructors.

use crate::config::{CatalogSourceKind, Config};
use crate::error::{Result, ShopmateError};

/// Credentials and store identity required by the external clients.
#[derive(Clone)]
pub struct Credentials {
    pub gemini_api_key: String,
    pub store_domain: String,
    /// Only required by the Admin API source.
    pub catalog_access_token: Option<String>,
}

impl Credentials {
    /// Resolve from the real process environment.
    pub fn from_env(config: &Config) -> Result<Self> {
        Self::resolve(config, |name| std::env::var(name).ok())
    }

    /// Resolve using an arbitrary variable lookup.
    pub fn resolve<F>(config: &Config, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| -> Result<String> {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| ShopmateError::Config(format!("environment variable {} not set", name)))
        };

        let gemini_api_key = required(&config.llm.api_key_env)?;

        let store_domain = match &config.catalog.store_domain {
            Some(domain) if !domain.trim().is_empty() => domain.trim().to_string(),
            _ => required(&config.catalog.store_domain_env)?,
        };

        let catalog_access_token = match config.catalog.source {
            CatalogSourceKind::Admin => Some(required(&config.catalog.access_token_env)?),
            CatalogSourceKind::Storefront => lookup(&config.catalog.access_token_env),
        };

        Ok(Self {
            gemini_api_key,
            store_domain,
            catalog_access_token,
        })
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("store_domain", &self.store_domain)
            .field("gemini_api_key", &"<redacted>")
            .field("catalog_access_token", &self.catalog_access_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
