//! Model client layer - Gemini API integration with tool call parsing
//!
//! This module provides:
//! - Conversation types (turns, parts, tool declarations and results)
//! - LlmClient trait for API abstraction
//! - GeminiClient implementation
//! - Response parsing and tool call validation

pub mod client;
pub mod gemini;
pub mod tool_parser;
pub mod types;

pub use client::{LlmClient, MockLlmClient};
pub use gemini::GeminiClient;
pub use tool_parser::{parse_response, validate_tool_input};
pub use types::{
    ChatTurn, CompletionRequest, CompletionResponse, FinishReason, Part, Role, ToolDeclaration, ToolInvocation,
    ToolResult, Usage,
};
