//! Tool registry - maps tool names to executable tools

use std::collections::BTreeMap;
use std::sync::Arc;

use super::{ProductSearchTool, Tool};
use crate::catalog::CatalogClient;
use crate::error::{Result, ShopmateError};
use crate::llm::{ToolDeclaration, ToolInvocation, ToolResult, validate_tool_input};

/// Tools the model may call, keyed by name
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Registry with the catalog search tool
    pub fn standard(catalog: Arc<CatalogClient>) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(ProductSearchTool::new(catalog)));
        registry
    }

    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            tools: BTreeMap::new(),
        }
    }

    /// Add a tool; a tool with the same name is replaced
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    pub fn has_tool(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Declarations for every registered tool, ordered by name
    pub fn declarations(&self) -> Vec<ToolDeclaration> {
        self.tools.values().map(|t| t.declaration()).collect()
    }

    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.keys().map(|s| s.as_str()).collect()
    }

    /// Execute a tool call and wrap its output for the model
    pub async fn execute(&self, call: &ToolInvocation) -> Result<ToolResult> {
        let tool = self
            .tools
            .get(&call.name)
            .ok_or_else(|| ShopmateError::UnknownTool(call.name.clone()))?;

        validate_tool_input(call, &tool.declaration())?;

        let payload = tool.execute(&call.args).await?;
        Ok(ToolResult::new(call.name.clone(), payload))
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry").field("tools", &self.tool_names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{ParameterKind, ToolParameter};
    use async_trait::async_trait;
    use serde_json::{Map, Value, json};

    struct Echo;

    #[async_trait]
    impl Tool for Echo {
        fn name(&self) -> &'static str {
            "echo"
        }

        fn description(&self) -> &'static str {
            "Echo the text argument"
        }

        fn parameters(&self) -> Vec<ToolParameter> {
            vec![ToolParameter::required("text", ParameterKind::String, "Text to echo")]
        }

        async fn execute(&self, args: &Map<String, Value>) -> Result<Value> {
            Ok(json!({ "echo": args["text"] }))
        }
    }

    #[test]
    fn test_empty_registry() {
        let registry = ToolRegistry::new();
        assert!(registry.tool_names().is_empty());
        assert!(registry.declarations().is_empty());
    }

    #[test]
    fn test_register_and_declare() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(Echo));

        assert!(registry.has_tool("echo"));
        assert!(!registry.has_tool("search_products"));
        let decls = registry.declarations();
        assert_eq!(decls.len(), 1);
        assert_eq!(decls[0].parameters.as_ref().unwrap()["required"], json!(["text"]));
    }

    #[tokio::test]
    async fn test_execute_wraps_result() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(Echo));

        let result = registry
            .execute(&ToolInvocation::new("echo", json!({"text": "ciao"})))
            .await
            .unwrap();

        assert_eq!(result.name, "echo");
        assert_eq!(result.payload, json!({"echo": "ciao"}));
    }

    #[tokio::test]
    async fn test_execute_unknown_tool() {
        let registry = ToolRegistry::new();
        let err = registry
            .execute(&ToolInvocation::new("getWeather", json!({})))
            .await
            .unwrap_err();
        assert!(matches!(err, ShopmateError::UnknownTool(name) if name == "getWeather"));
    }

    #[tokio::test]
    async fn test_execute_missing_required_argument() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(Echo));

        let err = registry
            .execute(&ToolInvocation::new("echo", json!({})))
            .await
            .unwrap_err();
        assert!(matches!(err, ShopmateError::Tool(_)));
    }
}
