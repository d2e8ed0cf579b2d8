//! Conversation orchestrator - one model round trip with at most one tool call
//!
//! Flow per request:
//! Start -> AwaitingModelResponse -> Done
//!                                -> ToolRequested -> AwaitingToolResult -> AwaitingFinalResponse -> Done

use std::sync::Arc;

use log::{debug, warn};
use serde_json::json;

use crate::error::{Result, ShopmateError};
use crate::llm::{ChatTurn, CompletionRequest, CompletionResponse, LlmClient, Part, ToolInvocation, ToolResult, Usage};
use crate::tools::ToolRegistry;

/// Index of the function call that gets executed when a reply holds several.
/// Any other calls in the same reply are dropped.
pub const HONORED_INVOCATION: usize = 0;

/// Final answer for the caller
#[derive(Debug, Clone, PartialEq)]
pub struct ChatReply {
    pub text: String,
    /// Tool that ran during this request, if any
    pub tool_used: Option<String>,
    /// Tokens consumed across both model calls
    pub usage: Usage,
}

#[derive(Debug)]
enum ChatState {
    Start,
    AwaitingModelResponse,
    ToolRequested {
        reply: CompletionResponse,
        call: ToolInvocation,
    },
    AwaitingToolResult {
        reply: CompletionResponse,
        call: ToolInvocation,
    },
    AwaitingFinalResponse {
        reply: CompletionResponse,
        call: ToolInvocation,
        result: ToolResult,
    },
    Done(String),
}

/// Drives a single request through the model and the tool registry
pub struct ChatOrchestrator {
    llm: Arc<dyn LlmClient>,
    tools: ToolRegistry,
    system_instruction: String,
}

impl ChatOrchestrator {
    pub fn new(llm: Arc<dyn LlmClient>, tools: ToolRegistry, system_instruction: impl Into<String>) -> Self {
        Self {
            llm,
            tools,
            system_instruction: system_instruction.into(),
        }
    }

    /// Answer `message` given caller-held `history`.
    ///
    /// Fails with `InvalidInput` before any upstream call when the message is
    /// missing or blank.
    pub async fn reply(&self, message: Option<&str>, history: Vec<ChatTurn>) -> Result<ChatReply> {
        let mut request = CompletionRequest::new(self.system_instruction.clone())
            .with_history(history)
            .with_tools(self.tools.declarations());
        let mut usage = Usage::default();
        let mut tool_used = None;
        let mut state = ChatState::Start;

        loop {
            state = match state {
                ChatState::Start => {
                    let message = message
                        .map(str::trim)
                        .filter(|m| !m.is_empty())
                        .ok_or_else(|| ShopmateError::InvalidInput("message is required".to_string()))?;
                    request = request.with_user_message(message);
                    ChatState::AwaitingModelResponse
                }

                ChatState::AwaitingModelResponse => {
                    let reply = self.llm.complete(&request).await?;
                    usage.add(&reply.usage);

                    let requested = reply.invocations().len();
                    if requested > 1 {
                        warn!(
                            "Model requested {} tool calls, only #{} is executed",
                            requested, HONORED_INVOCATION
                        );
                    }
                    let honored = reply.invocations().get(HONORED_INVOCATION).map(|c| (*c).clone());
                    match honored {
                        Some(call) => ChatState::ToolRequested { reply, call },
                        None => ChatState::Done(reply.content()),
                    }
                }

                ChatState::ToolRequested { reply, call } => {
                    if self.tools.has_tool(&call.name) {
                        ChatState::AwaitingToolResult { reply, call }
                    } else {
                        let text = reply.content();
                        if text.trim().is_empty() {
                            warn!("Model requested undeclared tool '{}' and gave no text", call.name);
                        } else {
                            warn!("Model requested undeclared tool '{}', returning its text", call.name);
                        }
                        ChatState::Done(text)
                    }
                }

                ChatState::AwaitingToolResult { reply, call } => {
                    debug!("Executing tool {} with {:?}", call.name, call.args);
                    let result = match self.tools.execute(&call).await {
                        Ok(result) => result,
                        Err(e) => {
                            warn!("Tool {} failed: {}", call.name, e);
                            ToolResult::new(call.name.clone(), json!({ "error": e.to_string() }))
                        }
                    };
                    tool_used = Some(call.name.clone());
                    ChatState::AwaitingFinalResponse { reply, call, result }
                }

                ChatState::AwaitingFinalResponse { reply, call, result } => {
                    request = request
                        .with_turn(honored_call_turn(reply.turn, &call))
                        .with_turn(ChatTurn::tool_result(result));

                    let last = self.llm.complete(&request).await?;
                    usage.add(&last.usage);
                    if last.has_tool_calls() {
                        warn!("Ignoring tool calls in the final model reply");
                    }
                    ChatState::Done(last.content())
                }

                ChatState::Done(text) => {
                    tracing::info!(
                        tool = ?tool_used,
                        input_tokens = usage.input_tokens,
                        output_tokens = usage.output_tokens,
                        "Chat reply ready"
                    );
                    return Ok(ChatReply { text, tool_used, usage });
                }
            };
        }
    }
}

/// The model turn as it goes back into the conversation: text parts plus only
/// the call that was executed, so every call has a matching response.
fn honored_call_turn(turn: ChatTurn, honored: &ToolInvocation) -> ChatTurn {
    let mut kept_call = false;
    let parts = turn
        .parts
        .into_iter()
        .filter(|part| match part {
            Part::FunctionCall { function_call, .. } => {
                let keep = !kept_call && function_call == honored;
                kept_call |= keep;
                keep
            }
            _ => true,
        })
        .collect();
    ChatTurn { role: turn.role, parts }
}

impl std::fmt::Debug for ChatOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatOrchestrator")
            .field("model", &self.llm.model())
            .field("tools", &self.tools)
            .finish()
    }
}
