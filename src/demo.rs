//! The two demo agents and the glue that streams one of them to a console.

use crate::agent::Agent;
use crate::config::{Demo, DemoConfig};
use crate::consumer::{Console, ConsumerOptions, OutputLog, StreamConsumer};
use crate::error::Result;
use crate::llm::gateway::LlmGateway;
use crate::tools::{
    CalculateSumTool, GetWeatherTool, SearchDatabaseTool, WeatherForecastTool, WeatherService,
};
use std::sync::Arc;
use tracing::info;

pub const WEATHER_SYSTEM_PROMPT: &str =
    "Providing a weather forecast at the locations the user provides.";

pub const WEATHER_PROMPT: &str =
    "What will the weather be like in Paris on Tuesday? Notify user before calling the tool.";

pub const ASSISTANT_SYSTEM_PROMPT: &str = "You are a helpful assistant. When answering questions, \
     provide some explanation or context before using tools. Stream your thoughts and reasoning \
     as you work through the problem.";

pub const ASSISTANT_PROMPT: &str =
    "What's the weather like in Tokyo right now, and what do you know about Pydantic?";

/// Forecast agent whose single tool reads from a [`WeatherService`]
pub fn weather_agent(
    model: impl Into<String>,
    gateway: Arc<dyn LlmGateway>,
) -> Agent<WeatherService> {
    Agent::new(model, gateway)
        .with_system_prompt(WEATHER_SYSTEM_PROMPT)
        .with_tool(WeatherForecastTool)
}

pub fn assistant_agent(model: impl Into<String>, gateway: Arc<dyn LlmGateway>) -> Agent<()> {
    Agent::new(model, gateway)
        .with_system_prompt(ASSISTANT_SYSTEM_PROMPT)
        .with_tool(GetWeatherTool)
        .with_tool(CalculateSumTool)
        .with_tool(SearchDatabaseTool)
}

/// Run the configured demo, appending to `log` and echoing to `console`.
///
/// Whatever was logged before a failure stays in `log`.
pub async fn run_demo<C: Console + ?Sized>(
    config: &DemoConfig,
    gateway: Arc<dyn LlmGateway>,
    log: &mut OutputLog,
    console: &mut C,
) -> Result<()> {
    let options = ConsumerOptions {
        report_final_output: config.report_final_output,
    };
    info!(demo = ?config.demo, model = config.model(), "Starting demo run");

    let mut consumer = StreamConsumer::new(log, console).with_options(options);
    match config.demo {
        Demo::Weather => {
            let agent = weather_agent(config.model(), gateway);
            let mut run = agent.iter(WEATHER_PROMPT, WeatherService);
            consumer.consume(&mut run).await
        }
        Demo::Assistant => {
            let agent = assistant_agent(config.model(), gateway);
            let mut run = agent.iter(ASSISTANT_PROMPT, ());
            consumer.consume(&mut run).await
        }
    }
}
