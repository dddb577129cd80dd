//! Environment configuration for the demo binary.

use crate::error::{AgentStreamError, Result};
use crate::llm::gateways::openai::{DEFAULT_API_KEY, DEFAULT_BASE_URL};
use crate::llm::gateways::OpenAIConfig;
use std::str::FromStr;

pub const DEFAULT_WEATHER_MODEL: &str = "gpt-5";
pub const DEFAULT_ASSISTANT_MODEL: &str = "gpt-4.1";

/// Which demo agent the binary drives
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Demo {
    #[default]
    Weather,
    Assistant,
}

impl FromStr for Demo {
    type Err = AgentStreamError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "weather" => Ok(Demo::Weather),
            "assistant" => Ok(Demo::Assistant),
            other => Err(AgentStreamError::ConfigError(format!(
                "AGENT_STREAM_DEMO must be 'weather' or 'assistant', got '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoConfig {
    pub base_url: String,
    pub api_key: String,
    pub weather_model: String,
    pub assistant_model: String,
    pub demo: Demo,
    pub report_final_output: bool,
}

impl DemoConfig {
    /// Read the configuration from the process environment, after loading an
    /// optional `.env` file.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let or_default = |key: &str, default: &str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let demo = match lookup("AGENT_STREAM_DEMO") {
            Some(value) if !value.trim().is_empty() => value.parse()?,
            _ => Demo::default(),
        };

        let report_final_output = lookup("AGENT_STREAM_REPORT_FINAL")
            .map(|value| matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Self {
            base_url: or_default("OPENAI_BASE_URL", DEFAULT_BASE_URL),
            api_key: or_default("OPENAI_API_KEY", DEFAULT_API_KEY),
            weather_model: or_default("AGENT_STREAM_MODEL", DEFAULT_WEATHER_MODEL),
            assistant_model: or_default("AGENT_STREAM_ASSISTANT_MODEL", DEFAULT_ASSISTANT_MODEL),
            demo,
            report_final_output,
        })
    }

    pub fn openai_config(&self) -> OpenAIConfig {
        OpenAIConfig {
            api_key: self.api_key.clone(),
            base_url: self.base_url.clone(),
            timeout: None,
        }
    }

    /// Model for the selected demo
    pub fn model(&self) -> &str {
        match self.demo {
            Demo::Weather => &self.weather_model,
            Demo::Assistant => &self.assistant_model,
        }
    }
}
