//! Conversation and tool types exchanged with the model service
//!
//! Wire shapes follow Gemini's `Content`/`Part` layout so caller-supplied
//! history can be forwarded without translation.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Role of a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    #[serde(alias = "assistant")]
    Model,
    #[serde(alias = "function")]
    Tool,
}

/// One piece of a turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Part {
    Text {
        text: String,
    },
    FunctionCall {
        #[serde(rename = "functionCall")]
        function_call: ToolInvocation,
        /// Opaque token some models attach to calls; must be echoed back as-is.
        #[serde(rename = "thoughtSignature", default, skip_serializing_if = "Option::is_none")]
        thought_signature: Option<String>,
    },
    FunctionResponse {
        #[serde(rename = "functionResponse")]
        function_response: ToolResult,
    },
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text { text: text.into() }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Part::Text { text } => Some(text),
            _ => None,
        }
    }
}

/// A turn in the conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawChatTurn")]
pub struct ChatTurn {
    pub role: Role,
    pub parts: Vec<Part>,
}

/// Accepts both `{role, parts}` and the short `{role, content: "..."}` form.
#[derive(Deserialize)]
struct RawChatTurn {
    role: Role,
    #[serde(default)]
    parts: Vec<Part>,
    #[serde(default)]
    content: Option<String>,
}

impl From<RawChatTurn> for ChatTurn {
    fn from(raw: RawChatTurn) -> Self {
        let mut parts = raw.parts;
        if let Some(content) = raw.content {
            parts.insert(0, Part::text(content));
        }
        Self { role: raw.role, parts }
    }
}

impl ChatTurn {
    /// Create a user turn
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            parts: vec![Part::text(text)],
        }
    }

    /// Create a model turn
    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            parts: vec![Part::text(text)],
        }
    }

    /// Create the synthetic turn carrying a tool's output back to the model
    pub fn tool_result(result: ToolResult) -> Self {
        Self {
            role: Role::Tool,
            parts: vec![Part::FunctionResponse {
                function_response: result,
            }],
        }
    }

    /// Concatenated text of all text parts
    pub fn text(&self) -> String {
        self.parts.iter().filter_map(Part::as_text).collect::<Vec<_>>().join("")
    }
}

/// Tool declaration handed to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDeclaration {
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Value>,
}

impl ToolDeclaration {
    pub fn new(name: impl Into<String>, description: impl Into<String>, parameters: Option<Value>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }

    /// Convert to a Gemini `functionDeclarations` entry
    pub fn to_gemini_schema(&self) -> Value {
        let mut schema = serde_json::json!({
            "name": self.name,
            "description": self.description,
        });
        if let Some(parameters) = &self.parameters {
            schema["parameters"] = parameters.clone();
        }
        schema
    }
}

/// A tool call requested by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocation {
    pub name: String,
    #[serde(default)]
    pub args: Map<String, Value>,
}

impl ToolInvocation {
    pub fn new(name: impl Into<String>, args: Value) -> Self {
        let args = match args {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self { name: name.into(), args }
    }

    /// String argument, trimmed; blank counts as absent
    pub fn str_arg(&self, key: &str) -> Option<&str> {
        self.args
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Output of a tool, fed back to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    pub name: String,
    #[serde(rename = "response")]
    pub payload: Value,
}

impl ToolResult {
    pub fn new(name: impl Into<String>, payload: Value) -> Self {
        Self {
            name: name.into(),
            payload,
        }
    }
}

/// Request to the model for one completion
#[derive(Debug, Clone, Default)]
pub struct CompletionRequest {
    pub system_instruction: String,
    pub contents: Vec<ChatTurn>,
    pub tools: Vec<ToolDeclaration>,
}

impl CompletionRequest {
    /// Create a new completion request with a system instruction
    pub fn new(system_instruction: impl Into<String>) -> Self {
        Self {
            system_instruction: system_instruction.into(),
            ..Default::default()
        }
    }

    /// Append prior turns
    pub fn with_history(mut self, history: impl IntoIterator<Item = ChatTurn>) -> Self {
        self.contents.extend(history);
        self
    }

    pub fn with_turn(mut self, turn: ChatTurn) -> Self {
        self.contents.push(turn);
        self
    }

    pub fn with_user_message(self, text: impl Into<String>) -> Self {
        self.with_turn(ChatTurn::user(text))
    }

    pub fn with_tools(mut self, tools: Vec<ToolDeclaration>) -> Self {
        self.tools = tools;
        self
    }
}

/// Why the model stopped generating
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FinishReason {
    #[default]
    Stop,
    MaxTokens,
    Safety,
    Other(String),
}

impl FinishReason {
    /// Stopped for a reason other than a natural end or the token limit
    pub fn is_abnormal(&self) -> bool {
        matches!(self, FinishReason::Safety | FinishReason::Other(_))
    }
}

/// Token usage statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl Usage {
    pub fn new(input_tokens: u64, output_tokens: u64) -> Self {
        Self {
            input_tokens,
            output_tokens,
        }
    }

    /// Accumulate usage from another instance
    pub fn add(&mut self, other: &Usage) {
        self.input_tokens += other.input_tokens;
        self.output_tokens += other.output_tokens;
    }
}

/// Response from the model
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    /// The model turn exactly as returned, for appending to the conversation
    pub turn: ChatTurn,
    pub finish_reason: FinishReason,
    pub usage: Usage,
}

impl Default for CompletionResponse {
    fn default() -> Self {
        Self {
            turn: ChatTurn {
                role: Role::Model,
                parts: Vec::new(),
            },
            finish_reason: FinishReason::default(),
            usage: Usage::default(),
        }
    }
}

impl CompletionResponse {
    /// A plain text reply
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            turn: ChatTurn::model(text),
            ..Default::default()
        }
    }

    /// A reply consisting of function calls
    pub fn tool_calls(calls: Vec<ToolInvocation>) -> Self {
        let parts = calls
            .into_iter()
            .map(|function_call| Part::FunctionCall {
                function_call,
                thought_signature: None,
            })
            .collect();
        Self {
            turn: ChatTurn {
                role: Role::Model,
                parts,
            },
            ..Default::default()
        }
    }

    /// Text content of the reply
    pub fn content(&self) -> String {
        self.turn.text()
    }

    /// Function calls in the order the model produced them
    pub fn invocations(&self) -> Vec<&ToolInvocation> {
        self.turn
            .parts
            .iter()
            .filter_map(|p| match p {
                Part::FunctionCall { function_call, .. } => Some(function_call),
                _ => None,
            })
            .collect()
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.invocations().is_empty()
    }
}
