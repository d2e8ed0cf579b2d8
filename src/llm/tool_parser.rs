//! Parsing of Gemini generateContent responses and tool call validation

use serde_json::Value;

use crate::error::{Result, ShopmateError};
use crate::llm::types::{ChatTurn, CompletionResponse, FinishReason, Part, Role, ToolDeclaration, ToolInvocation, Usage};

/// Parse a raw generateContent response into a CompletionResponse
///
/// Only the first candidate is read. Text and functionCall parts are kept in
/// order; other part kinds are skipped.
pub fn parse_response(response: &Value) -> Result<CompletionResponse> {
    let Some(candidate) = response.pointer("/candidates/0") else {
        let reason = response
            .pointer("/promptFeedback/blockReason")
            .and_then(Value::as_str)
            .unwrap_or("no candidates");
        return Err(ShopmateError::Upstream(format!("model returned no answer: {}", reason)));
    };

    let mut parts = Vec::new();
    if let Some(raw_parts) = candidate.pointer("/content/parts").and_then(Value::as_array) {
        for raw in raw_parts {
            if let Some(part) = parse_part(raw) {
                parts.push(part);
            }
        }
    }

    let raw_reason = candidate.get("finishReason").and_then(Value::as_str);
    let finish_reason = raw_reason.map(parse_finish_reason).unwrap_or_default();

    // A blocked or malformed candidate carries nothing to show the user
    if parts.is_empty() && finish_reason.is_abnormal() {
        return Err(ShopmateError::Upstream(format!(
            "model stopped without an answer: {}",
            raw_reason.unwrap_or("unknown")
        )));
    }

    let usage = response.get("usageMetadata").map(parse_usage).unwrap_or_default();

    Ok(CompletionResponse {
        turn: ChatTurn {
            role: Role::Model,
            parts,
        },
        finish_reason,
        usage,
    })
}

fn parse_part(raw: &Value) -> Option<Part> {
    if let Some(call) = raw.get("functionCall") {
        let name = call.get("name").and_then(Value::as_str)?.to_string();
        let args = call.get("args").cloned().unwrap_or(Value::Null);
        let thought_signature = raw.get("thoughtSignature").and_then(Value::as_str).map(String::from);
        return Some(Part::FunctionCall {
            function_call: ToolInvocation::new(name, args),
            thought_signature,
        });
    }

    // Thinking models emit their reasoning as text parts flagged `thought`
    if raw.get("thought").and_then(Value::as_bool).unwrap_or(false) {
        return None;
    }

    raw.get("text").and_then(Value::as_str).map(Part::text)
}

fn parse_finish_reason(reason: &str) -> FinishReason {
    match reason {
        "STOP" => FinishReason::Stop,
        "MAX_TOKENS" => FinishReason::MaxTokens,
        "SAFETY" | "RECITATION" | "BLOCKLIST" | "PROHIBITED_CONTENT" => FinishReason::Safety,
        other => FinishReason::Other(other.to_string()),
    }
}

fn parse_usage(usage: &Value) -> Usage {
    Usage {
        input_tokens: usage.get("promptTokenCount").and_then(Value::as_u64).unwrap_or(0),
        output_tokens: usage.get("candidatesTokenCount").and_then(Value::as_u64).unwrap_or(0),
    }
}

/// Validate a tool call's arguments against its declaration
///
/// Checks that all required parameters are present.
pub fn validate_tool_input(call: &ToolInvocation, declaration: &ToolDeclaration) -> Result<()> {
    let Some(schema) = &declaration.parameters else {
        return Ok(());
    };

    if let Some(required) = schema.get("required").and_then(Value::as_array) {
        for field in required.iter().filter_map(Value::as_str) {
            if !call.args.contains_key(field) {
                return Err(ShopmateError::Tool(format!(
                    "Tool '{}' missing required argument: {}",
                    call.name, field
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_text_response() {
        let raw = json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "Ciao! Come posso aiutarti?"}]},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 42, "candidatesTokenCount": 8, "totalTokenCount": 50}
        });

        let resp = parse_response(&raw).unwrap();
        assert_eq!(resp.content(), "Ciao! Come posso aiutarti?");
        assert!(!resp.has_tool_calls());
        assert_eq!(resp.finish_reason, FinishReason::Stop);
        assert_eq!(resp.usage, Usage::new(42, 8));
    }

    #[test]
    fn test_parse_function_call_response() {
        let raw = json!({
            "candidates": [{
                "content": {"role": "model", "parts": [
                    {"functionCall": {"name": "search_products", "args": {"keyword": "accendino"}}, "thoughtSignature": "abc"},
                    {"functionCall": {"name": "search_products", "args": {"keyword": "cartine"}}}
                ]},
                "finishReason": "STOP"
            }]
        });

        let resp = parse_response(&raw).unwrap();
        let calls = resp.invocations();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].str_arg("keyword"), Some("accendino"));
        assert_eq!(calls[1].str_arg("keyword"), Some("cartine"));
        match &resp.turn.parts[0] {
            Part::FunctionCall { thought_signature, .. } => assert_eq!(thought_signature.as_deref(), Some("abc")),
            other => panic!("unexpected part: {:?}", other),
        }
    }

    #[test]
    fn test_parse_skips_thought_parts() {
        let raw = json!({
            "candidates": [{
                "content": {"parts": [
                    {"text": "thinking about lighters", "thought": true},
                    {"text": "Ecco i nostri accendini."}
                ]}
            }]
        });
        let resp = parse_response(&raw).unwrap();
        assert_eq!(resp.content(), "Ecco i nostri accendini.");
    }

    #[test]
    fn test_parse_blocked_prompt() {
        let raw = json!({"promptFeedback": {"blockReason": "SAFETY"}});
        let err = parse_response(&raw).unwrap_err();
        assert!(matches!(err, ShopmateError::Upstream(_)));
        assert!(err.to_string().contains("SAFETY"));
    }

    #[test]
    fn test_empty_candidate_with_abnormal_stop_is_upstream() {
        for reason in ["SAFETY", "RECITATION", "PROHIBITED_CONTENT", "MALFORMED_FUNCTION_CALL"] {
            let raw = json!({"candidates": [{"finishReason": reason}]});
            let err = parse_response(&raw).unwrap_err();
            assert!(matches!(err, ShopmateError::Upstream(_)), "{} should fail", reason);
            assert!(err.to_string().contains(reason));
        }
    }

    #[test]
    fn test_partial_text_with_safety_stop_is_kept() {
        let raw = json!({
            "candidates": [{
                "content": {"parts": [{"text": "Ecco alcuni accendini"}]},
                "finishReason": "SAFETY"
            }]
        });
        let resp = parse_response(&raw).unwrap();
        assert_eq!(resp.content(), "Ecco alcuni accendini");
        assert_eq!(resp.finish_reason, FinishReason::Safety);
    }

    #[test]
    fn test_empty_candidate_at_token_limit_is_ok() {
        let raw = json!({"candidates": [{"finishReason": "MAX_TOKENS"}]});
        let resp = parse_response(&raw).unwrap();
        assert!(resp.content().is_empty());
        assert_eq!(resp.finish_reason, FinishReason::MaxTokens);
    }

    #[test]
    fn test_parse_finish_reasons() {
        assert_eq!(parse_finish_reason("MAX_TOKENS"), FinishReason::MaxTokens);
        assert_eq!(parse_finish_reason("RECITATION"), FinishReason::Safety);
        assert_eq!(
            parse_finish_reason("MALFORMED_FUNCTION_CALL"),
            FinishReason::Other("MALFORMED_FUNCTION_CALL".to_string())
        );
    }

    #[test]
    fn test_validate_tool_input() {
        let decl = ToolDeclaration::new(
            "lookup",
            "Look up an order",
            Some(json!({
                "type": "object",
                "properties": {"order_id": {"type": "string"}},
                "required": ["order_id"]
            })),
        );

        let ok = ToolInvocation::new("lookup", json!({"order_id": "1001"}));
        assert!(validate_tool_input(&ok, &decl).is_ok());

        let missing = ToolInvocation::new("lookup", json!({}));
        let err = validate_tool_input(&missing, &decl).unwrap_err();
        assert!(err.to_string().contains("order_id"));
    }
}
