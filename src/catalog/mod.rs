//! Catalog client - product lookups against the store
//!
//! A `CatalogSource` talks to one backend (Admin GraphQL or the public
//! products.json listing) and yields raw entries. `CatalogClient` turns them
//! into `ProductRecord`s, applies the fallback and cap policy, and swallows
//! upstream failures so a broken catalog never breaks the conversation.

mod admin;
mod storefront;

pub use admin::AdminApiSource;
pub use storefront::StorefrontSource;

use async_trait::async_trait;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::config::{CatalogConfig, CatalogSourceKind, Credentials};
use crate::error::{Result, ShopmateError};

/// Product as handed to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<u64>,
    pub link: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub product_type: Option<String>,
}

/// Backend-neutral product entry before link construction
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogEntry {
    pub title: String,
    pub handle: String,
    pub stock: Option<i64>,
    pub price: Option<String>,
    pub image: Option<String>,
    pub product_type: Option<String>,
}

/// A catalog backend
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch entries matching `keyword`, or unfiltered entries when `None`.
    ///
    /// `limit` is a hint; 0 means no preference.
    async fn fetch(&self, keyword: Option<&str>, limit: usize) -> Result<Vec<CatalogEntry>>;

    fn name(&self) -> &'static str;
}

/// Result of a search including whether the fallback path was taken
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchOutcome {
    pub products: Vec<ProductRecord>,
    /// True when the keyword matched nothing and these are unfiltered alternatives
    pub used_fallback: bool,
}

/// Product search with fallback and result cap
pub struct CatalogClient {
    source: Box<dyn CatalogSource>,
    store_domain: String,
    allow_fallback: bool,
    max_results: usize,
}

impl CatalogClient {
    /// Build the client for the configured backend
    pub fn new(config: &CatalogConfig, credentials: &Credentials) -> Result<Self> {
        let store_domain = normalize_domain(&credentials.store_domain);
        if store_domain.is_empty() {
            return Err(ShopmateError::Config("store domain is empty".to_string()));
        }
        let base_url = config
            .base_url
            .as_deref()
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| format!("https://{}", store_domain));

        let source: Box<dyn CatalogSource> = match config.source {
            CatalogSourceKind::Admin => {
                let token = credentials.catalog_access_token.clone().ok_or_else(|| {
                    ShopmateError::Config(format!("environment variable {} not set", config.access_token_env))
                })?;
                Box::new(AdminApiSource::new(&base_url, &config.api_version, token, config.timeout_ms)?)
            }
            CatalogSourceKind::Storefront => {
                Box::new(StorefrontSource::new(&base_url, config.page_size, config.timeout_ms)?)
            }
        };

        Ok(Self::with_source(source, &store_domain)
            .with_fallback(config.allow_fallback)
            .with_max_results(config.max_results))
    }

    /// Wrap an arbitrary source; fallback on, no cap
    pub fn with_source(source: Box<dyn CatalogSource>, store_domain: &str) -> Self {
        Self {
            source,
            store_domain: normalize_domain(store_domain),
            allow_fallback: true,
            max_results: 0,
        }
    }

    pub fn with_fallback(mut self, allow_fallback: bool) -> Self {
        self.allow_fallback = allow_fallback;
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    /// Search the catalog; never fails, an unreachable catalog yields no products
    pub async fn search(&self, keyword: Option<&str>) -> Vec<ProductRecord> {
        self.search_detailed(keyword).await.products
    }

    pub async fn search_detailed(&self, keyword: Option<&str>) -> SearchOutcome {
        let keyword = keyword.map(str::trim).filter(|k| !k.is_empty());

        let entries = match self.source.fetch(keyword, self.max_results).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Catalog lookup via {} failed: {}", self.source.name(), e);
                return SearchOutcome::default();
            }
        };

        let mut outcome = SearchOutcome {
            products: self.to_records(entries),
            used_fallback: false,
        };

        if outcome.products.is_empty() && keyword.is_some() && self.allow_fallback {
            debug!("No products for {:?}, retrying unfiltered", keyword);
            match self.source.fetch(None, self.max_results).await {
                Ok(entries) => {
                    outcome.products = self.to_records(entries);
                    outcome.used_fallback = true;
                }
                Err(e) => warn!("Catalog fallback via {} failed: {}", self.source.name(), e),
            }
        }

        if self.max_results > 0 {
            outcome.products.truncate(self.max_results);
        }

        debug!(
            "Catalog search {:?} -> {} products (fallback: {})",
            keyword,
            outcome.products.len(),
            outcome.used_fallback
        );
        outcome
    }

    fn to_records(&self, entries: Vec<CatalogEntry>) -> Vec<ProductRecord> {
        entries.into_iter().filter_map(|e| self.to_record(e)).collect()
    }

    /// Entries without a handle cannot be linked and are dropped
    fn to_record(&self, entry: CatalogEntry) -> Option<ProductRecord> {
        let handle = entry.handle.trim().trim_matches('/');
        if handle.is_empty() {
            return None;
        }
        Some(ProductRecord {
            name: entry.title,
            stock: entry.stock.map(|s| s.max(0) as u64),
            link: product_link(&self.store_domain, handle),
            price: entry.price.filter(|p| !p.is_empty()),
            image: entry.image.filter(|i| !i.is_empty()),
            product_type: entry.product_type.filter(|t| !t.is_empty()),
        })
    }
}

impl std::fmt::Debug for CatalogClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogClient")
            .field("source", &self.source.name())
            .field("store_domain", &self.store_domain)
            .field("allow_fallback", &self.allow_fallback)
            .field("max_results", &self.max_results)
            .finish()
    }
}

/// Strip scheme and trailing slashes: `https://shop.com/` -> `shop.com`
pub fn normalize_domain(domain: &str) -> String {
    let domain = domain.trim();
    let domain = domain
        .strip_prefix("https://")
        .or_else(|| domain.strip_prefix("http://"))
        .unwrap_or(domain);
    domain.trim_end_matches('/').to_string()
}

pub fn product_link(domain: &str, handle: &str) -> String {
    format!("https://{}/products/{}", domain, handle)
}

/// Lowercased words of a keyword, used for client-side matching
pub(crate) fn keyword_terms(keyword: &str) -> Vec<String> {
    keyword.split_whitespace().map(|w| w.to_lowercase()).collect()
}
