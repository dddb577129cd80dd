use crate::agent::RunContext;
use crate::error::Result;
use async_trait::async_trait;
use schemars::JsonSchema;
use serde_json::Value;

/// Descriptor for a tool, in the shape chat-completion APIs expect
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ToolDescriptor {
    pub r#type: String,
    pub function: FunctionDescriptor,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FunctionDescriptor {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

impl ToolDescriptor {
    /// Describe a function tool whose arguments deserialize into `T`
    pub fn function<T: JsonSchema>(
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            r#type: "function".to_string(),
            function: FunctionDescriptor {
                name: name.into(),
                description: description.into(),
                parameters: parameters_schema::<T>(),
            },
        }
    }
}

/// JSON schema for a tool's argument struct, without the draft and title keys
pub fn parameters_schema<T: JsonSchema>() -> Value {
    let mut schema = serde_json::to_value(schemars::schema_for!(T))
        .unwrap_or_else(|_| serde_json::json!({ "type": "object" }));

    if let Some(object) = schema.as_object_mut() {
        object.remove("$schema");
        object.remove("title");
    }
    schema
}

/// Trait for tools an agent may call during a run
///
/// `D` is the dependency type of the agent; tools reach it through the
/// [`RunContext`] they are invoked with.
#[async_trait]
pub trait AgentTool<D>: Send + Sync {
    /// Get tool descriptor for LLM
    fn descriptor(&self) -> ToolDescriptor;

    /// Execute the tool with the parsed JSON arguments
    async fn call(&self, ctx: &RunContext<D>, args: Value) -> Result<Value>;

    /// Check if this tool matches the given name
    fn matches(&self, name: &str) -> bool {
        self.descriptor().function.name == name
    }
}

/// Render a tool's return value as the text sent back to the model.
///
/// Plain strings pass through unquoted; anything else is serialized as JSON.
pub fn tool_output_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
