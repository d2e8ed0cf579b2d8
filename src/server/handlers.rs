use axum::{
    Json,
    body::Bytes,
    extract::{Request, State},
    http::{HeaderValue, Method, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use log::{debug, error};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::AppState;
use crate::llm::ChatTurn;

/// Body returned for every failure that is not the caller's fault
pub const INTERNAL_ERROR_MESSAGE: &str = "Errore interno del server";

const ALLOW_METHODS: &str = "GET,OPTIONS,PATCH,DELETE,POST,PUT";
const ALLOW_HEADERS: &str = "X-CSRF-Token, X-Requested-With, Accept, Accept-Version, Content-Length, Content-MD5, Content-Type, Date, X-Api-Version";

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub history: Vec<ChatTurn>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub text: String,
}

/// Header values attached to every response
#[derive(Debug, Clone)]
pub struct CorsPolicy {
    pub allow_origin: HeaderValue,
}

pub async fn apply_cors(State(cors): State<CorsPolicy>, req: Request, next: Next) -> Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();
    headers.insert(header::ACCESS_CONTROL_ALLOW_CREDENTIALS, HeaderValue::from_static("true"));
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, cors.allow_origin);
    headers.insert(header::ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static(ALLOW_METHODS));
    headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static(ALLOW_HEADERS));
    response
}

pub async fn health_check() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn handle_chat(State(state): State<AppState>, method: Method, body: Bytes) -> Response {
    // Preflight
    if method == Method::OPTIONS {
        return StatusCode::OK.into_response();
    }

    let request: ChatRequest = match serde_json::from_slice(&body) {
        Ok(r) => r,
        Err(e) => {
            debug!("Rejecting chat body: {}", e);
            return error_response(StatusCode::BAD_REQUEST, "Invalid JSON body");
        }
    };

    match state.orchestrator.reply(request.message.as_deref(), request.history).await {
        Ok(reply) => (StatusCode::OK, Json(ChatResponse { text: reply.text })).into_response(),
        Err(e) if e.is_client_error() => error_response(StatusCode::BAD_REQUEST, &e.to_string()),
        Err(e) => {
            error!("Chat request failed: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE)
        }
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}
