use crate::agent::RunContext;
use crate::error::Result;
use crate::tools::{AgentTool, ToolDescriptor};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CalculateSumArgs {
    pub a: f64,
    pub b: f64,
}

/// Adds two numbers
pub struct CalculateSumTool;

#[async_trait]
impl<D: Send + Sync> AgentTool<D> for CalculateSumTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::function::<CalculateSumArgs>(
            "calculate_sum",
            "Calculate the sum of two numbers.",
        )
    }

    async fn call(&self, _ctx: &RunContext<D>, args: Value) -> Result<Value> {
        let args: CalculateSumArgs = serde_json::from_value(args)?;
        Ok(json!(args.a + args.b))
    }
}

/// Static knowledge table; unknown queries get a "No results found" sentence
pub fn lookup_database(query: &str) -> String {
    let answer = match query.to_lowercase().as_str() {
        "python" => "Python is a high-level programming language.",
        "ai" => "AI stands for Artificial Intelligence.",
        "pydantic" => "Pydantic is a data validation library using Python type annotations.",
        _ => return format!("No results found for '{}'", query),
    };
    answer.to_string()
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SearchDatabaseArgs {
    /// Topic to search for
    pub query: String,
}

pub struct SearchDatabaseTool;

#[async_trait]
impl<D: Send + Sync> AgentTool<D> for SearchDatabaseTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::function::<SearchDatabaseArgs>(
            "search_database",
            "Search a database for information.",
        )
    }

    async fn call(&self, _ctx: &RunContext<D>, args: Value) -> Result<Value> {
        let args: SearchDatabaseArgs = serde_json::from_value(args)?;
        Ok(json!(lookup_database(&args.query)))
    }
}
