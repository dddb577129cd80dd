use crate::agent::model_run::ModelRun;
use crate::agent::run::{drain_run, AgentRunResult};
use crate::error::{AgentStreamError, Result};
use crate::llm::gateway::{CompletionConfig, LlmGateway};
use crate::tools::{AgentTool, ToolDescriptor};
use std::sync::Arc;

pub const DEFAULT_REQUEST_LIMIT: usize = 50;

/// A model, its instructions and the tools it may call, parameterised by the
/// dependency type `D` its tools receive.
///
/// # Examples
///
/// ```ignore
/// let agent = Agent::<WeatherService>::new("gpt-5", gateway)
///     .with_system_prompt("Providing a weather forecast at the locations the user provides.")
///     .with_tool(WeatherForecastTool);
///
/// let mut run = agent.iter("What will the weather be like in Paris on Tuesday?", WeatherService);
/// while let Some(node) = run.next_node().await? {
///     println!("{}", node.kind());
/// }
/// ```
pub struct Agent<D> {
    model: String,
    gateway: Arc<dyn LlmGateway>,
    system_prompt: Option<String>,
    tools: Vec<Arc<dyn AgentTool<D>>>,
    config: CompletionConfig,
    request_limit: usize,
}

impl<D: Send + Sync + 'static> Agent<D> {
    pub fn new(model: impl Into<String>, gateway: Arc<dyn LlmGateway>) -> Self {
        Self {
            model: model.into(),
            gateway,
            system_prompt: None,
            tools: Vec::new(),
            config: CompletionConfig::default(),
            request_limit: DEFAULT_REQUEST_LIMIT,
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_tool(mut self, tool: impl AgentTool<D> + 'static) -> Self {
        self.tools.push(Arc::new(tool));
        self
    }

    pub fn with_config(mut self, config: CompletionConfig) -> Self {
        self.config = config;
        self
    }

    /// Cap on model requests per run
    pub fn with_request_limit(mut self, limit: usize) -> Self {
        self.request_limit = limit;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn system_prompt(&self) -> Option<&str> {
        self.system_prompt.as_deref()
    }

    pub fn request_limit(&self) -> usize {
        self.request_limit
    }

    pub(crate) fn gateway(&self) -> &dyn LlmGateway {
        self.gateway.as_ref()
    }

    pub(crate) fn config(&self) -> &CompletionConfig {
        &self.config
    }

    pub fn tool_descriptors(&self) -> Vec<ToolDescriptor> {
        self.tools.iter().map(|tool| tool.descriptor()).collect()
    }

    pub(crate) fn find_tool(&self, name: &str) -> Option<&Arc<dyn AgentTool<D>>> {
        self.tools.iter().find(|tool| tool.matches(name))
    }

    /// Start a run that is advanced node by node
    pub fn iter(&self, prompt: impl Into<String>, deps: D) -> ModelRun<'_, D> {
        ModelRun::new(self, prompt.into(), Arc::new(deps))
    }

    /// Execute a whole run and return its result
    pub async fn run(&self, prompt: impl Into<String>, deps: D) -> Result<AgentRunResult> {
        let mut run = self.iter(prompt, deps);
        drain_run(&mut run)
            .await?
            .ok_or_else(|| AgentStreamError::RunError("run ended without a result".to_string()))
    }
}
