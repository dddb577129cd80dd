use agent_stream::config::DemoConfig;
use agent_stream::consumer::{OutputLog, StdoutConsole};
use agent_stream::demo::run_demo;
use agent_stream::llm::gateways::OpenAIGateway;
use agent_stream::logging::init_tracing;
use std::sync::Arc;
use tracing::debug;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = DemoConfig::from_env()?;
    init_tracing();

    let gateway = Arc::new(OpenAIGateway::with_config(config.openai_config())?);
    let mut log = OutputLog::new();
    let mut console = StdoutConsole;

    let outcome = run_demo(&config, gateway, &mut log, &mut console).await;

    debug!(entries = log.len(), "Output log");
    for entry in log.entries() {
        debug!("{}", entry);
    }

    outcome?;
    Ok(())
}
