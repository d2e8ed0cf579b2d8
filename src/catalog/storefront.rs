//! Public products.json listing, filtered locally

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{CatalogEntry, CatalogSource, keyword_terms};
use crate::config::MAX_PAGE_SIZE;
use crate::error::{Result, ShopmateError};

/// Unauthenticated full listing; one page, matched by title and product type
pub struct StorefrontSource {
    client: Client,
    endpoint: String,
    page_size: usize,
}

impl StorefrontSource {
    pub fn new(base_url: &str, page_size: usize, timeout_ms: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(|e| ShopmateError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: format!("{}/products.json", base_url.trim_end_matches('/')),
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        })
    }
}

#[derive(Deserialize)]
struct Listing {
    #[serde(default)]
    products: Vec<ListedProduct>,
}

#[derive(Deserialize)]
struct ListedProduct {
    title: String,
    #[serde(default)]
    handle: String,
    product_type: Option<String>,
    #[serde(default)]
    images: Vec<ListedImage>,
    #[serde(default)]
    variants: Vec<ListedVariant>,
}

#[derive(Deserialize)]
struct ListedImage {
    src: String,
}

#[derive(Deserialize)]
struct ListedVariant {
    price: Option<String>,
    inventory_quantity: Option<i64>,
}

impl ListedProduct {
    /// Every keyword word must occur in the title or product type
    fn matches(&self, terms: &[String]) -> bool {
        let haystack = format!(
            "{} {}",
            self.title.to_lowercase(),
            self.product_type.as_deref().unwrap_or("").to_lowercase()
        );
        terms.iter().all(|t| haystack.contains(t.as_str()))
    }
}

impl From<ListedProduct> for CatalogEntry {
    fn from(product: ListedProduct) -> Self {
        let quantities: Vec<i64> = product.variants.iter().filter_map(|v| v.inventory_quantity).collect();
        let stock = if quantities.is_empty() {
            None
        } else {
            Some(quantities.iter().sum())
        };

        Self {
            price: product.variants.first().and_then(|v| v.price.clone()),
            image: product.images.into_iter().next().map(|i| i.src),
            title: product.title,
            handle: product.handle,
            stock,
            product_type: product.product_type,
        }
    }
}

#[async_trait]
impl CatalogSource for StorefrontSource {
    async fn fetch(&self, keyword: Option<&str>, limit: usize) -> Result<Vec<CatalogEntry>> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("limit", self.page_size)])
            .send()
            .await
            .map_err(|e| ShopmateError::Upstream(format!("Catalog listing request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ShopmateError::Upstream(format!("Catalog listing error {}", status)));
        }

        let listing: Listing = response
            .json()
            .await
            .map_err(|e| ShopmateError::Upstream(format!("Failed to parse catalog listing: {}", e)))?;

        let terms = keyword.map(keyword_terms).unwrap_or_default();
        let matched = listing.products.into_iter().filter(|p| p.matches(&terms));

        Ok(if limit == 0 {
            matched.map(CatalogEntry::from).collect()
        } else {
            matched.take(limit).map(CatalogEntry::from).collect()
        })
    }

    fn name(&self) -> &'static str {
        "storefront-listing"
    }
}
