//! Chat endpoint integration tests
//!
//! Serves the real router on a local socket with a scripted model client and,
//! where the catalog matters, a mocked products.json listing.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};
use shopmate::catalog::{CatalogClient, CatalogEntry, CatalogSource};
use shopmate::chat::ChatOrchestrator;
use shopmate::config::{CatalogConfig, CatalogSourceKind, Credentials, LlmConfig, ServerConfig};
use shopmate::error::Result;
use shopmate::llm::{CompletionResponse, GeminiClient, LlmClient, MockLlmClient, Part, Role, ToolInvocation};
use shopmate::server::{AppState, INTERNAL_ERROR_MESSAGE, create_router};
use shopmate::tools::ToolRegistry;
use tokio::net::TcpListener;

struct EmptyCatalog;

#[async_trait]
impl CatalogSource for EmptyCatalog {
    async fn fetch(&self, _keyword: Option<&str>, _limit: usize) -> Result<Vec<CatalogEntry>> {
        Ok(Vec::new())
    }

    fn name(&self) -> &'static str {
        "empty"
    }
}

/// Serve the router on an ephemeral port and return its chat URL
async fn spawn_app(llm: Arc<dyn LlmClient>, catalog: CatalogClient) -> String {
    let config = ServerConfig::default();
    let tools = ToolRegistry::standard(Arc::new(catalog));
    let state = AppState::new(ChatOrchestrator::new(llm, tools, "Sei un personal shopper"));
    let router = create_router(&config, state).unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    format!("http://{}{}", addr, config.path)
}

fn empty_catalog() -> CatalogClient {
    CatalogClient::with_source(Box::new(EmptyCatalog), "shop.example.it")
}

fn assert_cors(response: &reqwest::Response) {
    let headers = response.headers();
    assert_eq!(headers["access-control-allow-origin"], "*");
    assert_eq!(headers["access-control-allow-credentials"], "true");
    assert_eq!(headers["access-control-allow-methods"], "GET,OPTIONS,PATCH,DELETE,POST,PUT");
    assert!(
        headers["access-control-allow-headers"]
            .to_str()
            .unwrap()
            .contains("X-CSRF-Token")
    );
}

#[tokio::test]
async fn test_preflight_returns_empty_ok_with_cors() {
    let llm = Arc::new(MockLlmClient::new(vec![]));
    let url = spawn_app(llm.clone(), empty_catalog()).await;

    let response = reqwest::Client::new()
        .request(reqwest::Method::OPTIONS, &url)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_cors(&response);
    assert!(response.text().await.unwrap().is_empty());
    assert_eq!(llm.call_count(), 0);
}

#[tokio::test]
async fn test_missing_message_is_400_without_model_call() {
    let llm = Arc::new(MockLlmClient::new(vec![]));
    let url = spawn_app(llm.clone(), empty_catalog()).await;

    let response = reqwest::Client::new()
        .post(&url)
        .json(&json!({"history": []}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    assert_cors(&response);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].is_string());
    assert_eq!(llm.call_count(), 0);
}

#[tokio::test]
async fn test_greeting_needs_no_tool() {
    let llm = Arc::new(MockLlmClient::new(vec![CompletionResponse::text(
        "Ciao! Come posso aiutarti oggi?",
    )]));
    let url = spawn_app(llm.clone(), empty_catalog()).await;

    let response = reqwest::Client::new()
        .post(&url)
        .json(&json!({"message": "ciao"}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_cors(&response);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({"text": "Ciao! Come posso aiutarti oggi?"}));
    assert_eq!(llm.call_count(), 1);
}

#[tokio::test]
async fn test_model_failure_is_generic_500() {
    let llm = Arc::new(MockLlmClient::new(vec![]));
    let url = spawn_app(llm, empty_catalog()).await;

    let response = reqwest::Client::new()
        .post(&url)
        .json(&json!({"message": "ciao"}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 500);
    assert_cors(&response);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({"error": INTERNAL_ERROR_MESSAGE}));
}

#[tokio::test]
async fn test_unknown_tool_without_text_is_empty_200() {
    let llm = Arc::new(MockLlmClient::new(vec![CompletionResponse::tool_calls(vec![
        ToolInvocation::new("getWeather", json!({})),
    ])]));
    let url = spawn_app(llm.clone(), empty_catalog()).await;

    let response = reqwest::Client::new()
        .post(&url)
        .json(&json!({"message": "che tempo fa a Milano?"}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({"text": ""}));
    assert_eq!(llm.call_count(), 1);
}

#[tokio::test]
async fn test_blocked_gemini_answer_is_generic_500() {
    for reason in ["SAFETY", "MALFORMED_FUNCTION_CALL"] {
        let mut gemini = mockito::Server::new_async().await;
        let generate = gemini
            .mock("POST", mockito::Matcher::Regex(r":generateContent$".to_string()))
            .match_header("x-goog-api-key", "test-key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({"candidates": [{"finishReason": reason}]}).to_string())
            .create_async()
            .await;

        let config = LlmConfig {
            base_url: gemini.url(),
            ..Default::default()
        };
        let llm = Arc::new(GeminiClient::new(&config, "test-key").unwrap());
        let url = spawn_app(llm, empty_catalog()).await;

        let response = reqwest::Client::new()
            .post(&url)
            .json(&json!({"message": "ciao"}))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), 500, "finish reason {}", reason);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body, json!({"error": INTERNAL_ERROR_MESSAGE}));
        generate.assert_async().await;
    }
}

#[tokio::test]
async fn test_health() {
    let llm = Arc::new(MockLlmClient::new(vec![]));
    let url = spawn_app(llm, empty_catalog()).await;
    let health = url.replace("/api/chat", "/health");

    let body: Value = reqwest::get(&health).await.unwrap().json().await.unwrap();
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn test_product_question_runs_catalog_lookup() {
    let mut shop = mockito::Server::new_async().await;
    let listing = shop
        .mock("GET", mockito::Matcher::Regex(r"^/products\.json".to_string()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({"products": [
                {
                    "title": "Accendino Clipper",
                    "handle": "clipper",
                    "product_type": "Accendini",
                    "images": [{"src": "https://cdn.example.it/clipper.jpg"}],
                    "variants": [{"price": "2.50", "inventory_quantity": 3}]
                },
                {
                    "title": "Cartine Smoking",
                    "handle": "cartine-smoking",
                    "product_type": "Cartine",
                    "images": [],
                    "variants": [{"price": "1.00"}]
                }
            ]})
            .to_string(),
        )
        .create_async()
        .await;

    let catalog_config = CatalogConfig {
        source: CatalogSourceKind::Storefront,
        base_url: Some(shop.url()),
        ..Default::default()
    };
    let credentials = Credentials {
        gemini_api_key: "test-key".to_string(),
        store_domain: "https://shop.example.it/".to_string(),
        catalog_access_token: None,
    };
    let catalog = CatalogClient::new(&catalog_config, &credentials).unwrap();

    let llm = Arc::new(MockLlmClient::new(vec![
        CompletionResponse::tool_calls(vec![ToolInvocation::new(
            "search_products",
            json!({"keyword": "accendino"}),
        )]),
        CompletionResponse::text("Ti consiglio l'Accendino Clipper: https://shop.example.it/products/clipper"),
    ]));
    let url = spawn_app(llm.clone(), catalog).await;

    let response = reqwest::Client::new()
        .post(&url)
        .json(&json!({"message": "avete accendini?", "history": []}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body["text"],
        "Ti consiglio l'Accendino Clipper: https://shop.example.it/products/clipper"
    );
    listing.assert_async().await;

    let requests = llm.requests();
    assert_eq!(requests.len(), 2);
    let tool_turn = requests[1].contents.last().unwrap();
    assert_eq!(tool_turn.role, Role::Tool);
    let payload = match &tool_turn.parts[0] {
        Part::FunctionResponse { function_response } => function_response.payload.clone(),
        other => panic!("expected function response, got {:?}", other),
    };
    assert_eq!(payload["exact_match"], true);
    let products = payload["products"].as_array().unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0]["name"], "Accendino Clipper");
    assert_eq!(products[0]["link"], "https://shop.example.it/products/clipper");
    assert_eq!(products[0]["stock"], 3);
    assert_eq!(products[0]["image"], "https://cdn.example.it/clipper.jpg");
}
