//! Shopify Admin GraphQL backend

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use super::{CatalogEntry, CatalogSource, keyword_terms};
use crate::error::{Result, ShopmateError};

const PRODUCTS_QUERY: &str = r#"query Products($first: Int!, $query: String) {
  products(first: $first, query: $query) {
    edges {
      node {
        title
        handle
        productType
        totalInventory
        featuredImage { url }
        priceRange { minVariantPrice { amount currencyCode } }
      }
    }
  }
}"#;

/// Used when the caller does not cap results
const DEFAULT_PAGE: usize = 50;

/// Structured product search with server-side filtering
pub struct AdminApiSource {
    client: Client,
    endpoint: String,
    access_token: String,
}

impl AdminApiSource {
    pub fn new(base_url: &str, api_version: &str, access_token: String, timeout_ms: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(|e| ShopmateError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: format!("{}/admin/api/{}/graphql.json", base_url.trim_end_matches('/'), api_version),
            access_token,
        })
    }
}

/// Shopify search syntax: every word must prefix-match the title or the product type.
///
/// Only trailing wildcards are supported by the search syntax.
pub(crate) fn search_query(keyword: Option<&str>) -> String {
    let clauses: Vec<String> = keyword
        .map(keyword_terms)
        .unwrap_or_default()
        .into_iter()
        .map(|w| w.chars().filter(|c| c.is_alphanumeric() || *c == '-').collect::<String>())
        .filter(|w| !w.is_empty())
        .map(|w| format!("(title:{w}* OR product_type:{w}*)"))
        .collect();

    if clauses.is_empty() {
        "status:active".to_string()
    } else {
        format!("status:active AND {}", clauses.join(" AND "))
    }
}

#[derive(Deserialize)]
struct GraphqlResponse {
    data: Option<ProductsData>,
    #[serde(default)]
    errors: Vec<GraphqlError>,
}

#[derive(Deserialize)]
struct GraphqlError {
    message: String,
}

#[derive(Deserialize)]
struct ProductsData {
    products: Connection,
}

#[derive(Deserialize)]
struct Connection {
    #[serde(default)]
    edges: Vec<Edge>,
}

#[derive(Deserialize)]
struct Edge {
    node: ProductNode,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductNode {
    title: String,
    #[serde(default)]
    handle: String,
    product_type: Option<String>,
    total_inventory: Option<i64>,
    featured_image: Option<Image>,
    price_range: Option<PriceRange>,
}

#[derive(Deserialize)]
struct Image {
    url: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PriceRange {
    min_variant_price: Money,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Money {
    amount: String,
    currency_code: String,
}

impl From<ProductNode> for CatalogEntry {
    fn from(node: ProductNode) -> Self {
        Self {
            title: node.title,
            handle: node.handle,
            stock: node.total_inventory,
            price: node
                .price_range
                .map(|p| format!("{} {}", p.min_variant_price.amount, p.min_variant_price.currency_code)),
            image: node.featured_image.map(|i| i.url),
            product_type: node.product_type,
        }
    }
}

#[async_trait]
impl CatalogSource for AdminApiSource {
    async fn fetch(&self, keyword: Option<&str>, limit: usize) -> Result<Vec<CatalogEntry>> {
        let first = if limit == 0 { DEFAULT_PAGE } else { limit };
        let body = json!({
            "query": PRODUCTS_QUERY,
            "variables": { "first": first, "query": search_query(keyword) }
        });

        let response = self
            .client
            .post(&self.endpoint)
            .header("X-Shopify-Access-Token", &self.access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| ShopmateError::Upstream(format!("Shopify request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ShopmateError::Upstream(format!("Shopify API error {}", status)));
        }

        let parsed: GraphqlResponse = response
            .json()
            .await
            .map_err(|e| ShopmateError::Upstream(format!("Failed to parse Shopify response: {}", e)))?;

        if let Some(err) = parsed.errors.first() {
            return Err(ShopmateError::Upstream(format!("Shopify GraphQL error: {}", err.message)));
        }

        let data = parsed
            .data
            .ok_or_else(|| ShopmateError::Upstream("Shopify response has no data".to_string()))?;

        Ok(data.products.edges.into_iter().map(|e| e.node.into()).collect())
    }

    fn name(&self) -> &'static str {
        "admin-graphql"
    }
}
