//! Tool system for model function calls
//!
//! Each tool declares itself (name, description, parameters) and executes
//! against JSON arguments produced by the model. The registry maps names to
//! tools so new tools never touch the orchestrator's control flow.

mod product_search;
mod registry;

pub use product_search::ProductSearchTool;
pub use registry::ToolRegistry;

use async_trait::async_trait;
use serde_json::{Map, Value, json};

use crate::error::Result;
use crate::llm::ToolDeclaration;

/// A tool that can be called by the model
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name (matches the model's functionCall name)
    fn name(&self) -> &'static str;

    /// Description the model uses to decide when to call it
    fn description(&self) -> &'static str;

    /// Declared parameters; may be empty
    fn parameters(&self) -> Vec<ToolParameter> {
        Vec::new()
    }

    /// Declaration handed to the model
    fn declaration(&self) -> ToolDeclaration {
        let params = self.parameters();
        let schema = if params.is_empty() {
            None
        } else {
            Some(parameters_schema(&params))
        };
        ToolDeclaration::new(self.name(), self.description(), schema)
    }

    /// Execute the tool; the returned value becomes the function response payload
    async fn execute(&self, args: &Map<String, Value>) -> Result<Value>;
}

/// JSON type of a tool parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterKind {
    String,
    Integer,
    Number,
    Boolean,
}

impl ParameterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterKind::String => "string",
            ParameterKind::Integer => "integer",
            ParameterKind::Number => "number",
            ParameterKind::Boolean => "boolean",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ToolParameter {
    pub name: &'static str,
    pub kind: ParameterKind,
    pub description: &'static str,
    pub required: bool,
}

impl ToolParameter {
    pub fn optional(name: &'static str, kind: ParameterKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            description,
            required: false,
        }
    }

    pub fn required(name: &'static str, kind: ParameterKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            description,
            required: true,
        }
    }
}

/// Object schema for a parameter list
pub fn parameters_schema(params: &[ToolParameter]) -> Value {
    let mut properties = Map::new();
    for p in params {
        properties.insert(
            p.name.to_string(),
            json!({ "type": p.kind.as_str(), "description": p.description }),
        );
    }

    let mut schema = json!({ "type": "object", "properties": properties });
    let required: Vec<&str> = params.iter().filter(|p| p.required).map(|p| p.name).collect();
    if !required.is_empty() {
        schema["required"] = json!(required);
    }
    schema
}
