//! search_products tool - catalog lookup by optional keyword

use std::sync::Arc;

use async_trait::async_trait;
use log::debug;
use serde_json::{Map, Value, json};

use super::{ParameterKind, Tool, ToolParameter};
use crate::catalog::CatalogClient;
use crate::error::Result;

/// Look up products in the store catalog
pub struct ProductSearchTool {
    catalog: Arc<CatalogClient>,
}

impl ProductSearchTool {
    pub const NAME: &'static str = "search_products";

    pub fn new(catalog: Arc<CatalogClient>) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl Tool for ProductSearchTool {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn description(&self) -> &'static str {
        "Cerca prodotti nel catalogo del negozio con nome, prezzo, disponibilità e link. \
         Usalo quando l'utente chiede un prodotto, un consiglio su cosa comprare o i best seller. \
         Senza keyword restituisce i prodotti più popolari."
    }

    fn parameters(&self) -> Vec<ToolParameter> {
        vec![ToolParameter::optional(
            "keyword",
            ParameterKind::String,
            "Parola chiave al singolare per filtrare i prodotti (es. 'accendino'). Ometti per i best seller.",
        )]
    }

    async fn execute(&self, args: &Map<String, Value>) -> Result<Value> {
        let keyword = args
            .get("keyword")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|k| !k.is_empty());
        debug!("search_products keyword={:?}", keyword);

        let outcome = self.catalog.search_detailed(keyword).await;
        Ok(json!({
            "products": outcome.products,
            "exact_match": !outcome.used_fallback,
        }))
    }
}
