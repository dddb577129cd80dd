//! OpenAI-compatible gateway for streamed chat completions.
//!
//! Talks to any server exposing `POST {base_url}/chat/completions` with
//! server-sent events, such as a LiteLLM proxy sitting in front of the real
//! provider.

use crate::error::{AgentStreamError, Result};
use crate::llm::gateway::{ChunkStream, CompletionConfig, LlmGateway, StreamChunk};
use crate::llm::gateways::openai_messages_adapter::adapt_messages_to_openai;
use crate::llm::models::LlmMessage;
use crate::tools::ToolDescriptor;
use futures::stream::StreamExt;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info, warn};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:23009";
pub const DEFAULT_API_KEY: &str = "sk-1234";

/// Configuration for connecting to an OpenAI-compatible endpoint.
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Option<std::time::Duration>,
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            api_key: std::env::var("OPENAI_API_KEY")
                .unwrap_or_else(|_| DEFAULT_API_KEY.to_string()),
            base_url: std::env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            timeout: None,
        }
    }
}

/// Gateway for OpenAI-compatible chat completions.
pub struct OpenAIGateway {
    client: Client,
    config: OpenAIConfig,
}

impl OpenAIGateway {
    /// Create a new gateway configured from the environment.
    pub fn new() -> Result<Self> {
        Self::with_config(OpenAIConfig::default())
    }

    /// Create a new gateway with custom configuration.
    pub fn with_config(config: OpenAIConfig) -> Result<Self> {
        let mut client_builder = Client::builder();

        if let Some(timeout) = config.timeout {
            client_builder = client_builder.timeout(timeout);
        }

        let client = client_builder.build()?;

        Ok(Self { client, config })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    fn request_body(
        model: &str,
        messages: &[LlmMessage],
        tools: &[ToolDescriptor],
        config: &CompletionConfig,
    ) -> Result<Value> {
        let mut body = serde_json::json!({
            "model": model,
            "messages": adapt_messages_to_openai(messages),
            "stream": true
        });

        if let Some(temperature) = config.temperature {
            body["temperature"] = serde_json::json!(temperature);
        }
        if let Some(max_tokens) = config.max_tokens {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }
        if !tools.is_empty() {
            body["tools"] = serde_json::to_value(tools)?;
        }

        Ok(body)
    }
}

impl LlmGateway for OpenAIGateway {
    fn complete_stream<'a>(
        &'a self,
        model: &'a str,
        messages: &'a [LlmMessage],
        tools: &'a [ToolDescriptor],
        config: &'a CompletionConfig,
    ) -> ChunkStream<'a> {
        Box::pin(async_stream::try_stream! {
            info!("Starting OpenAI streaming completion");
            debug!(
                "Model: {}, Message count: {}, Tool count: {}",
                model,
                messages.len(),
                tools.len()
            );

            let body = Self::request_body(model, messages, tools, config)?;

            let response = self
                .client
                .post(self.completions_url())
                .bearer_auth(&self.config.api_key)
                .json(&body)
                .send()
                .await?;
            let response = ensure_success(response).await?;

            let mut bytes = response.bytes_stream();
            let mut decoder = SseDecoder::default();

            'outer: while let Some(next) = bytes.next().await {
                for data in decoder.push(&next?) {
                    if data == "[DONE]" {
                        break 'outer;
                    }
                    match serde_json::from_str::<Value>(&data) {
                        Ok(json) => {
                            ensure_no_error_frame(&json)?;
                            for chunk in chunks_from_delta(&json) {
                                yield chunk;
                            }
                        }
                        Err(e) => {
                            warn!("Failed to parse streaming chunk: {}", e);
                        }
                    }
                }
            }
        })
    }
}

/// Turn a non-2xx response into a gateway error carrying status and body.
async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let error_text = response.text().await.unwrap_or_default();
    Err(AgentStreamError::GatewayError(format!(
        "OpenAI API error: {} - {}",
        status, error_text
    )))
}

/// Fail on an in-stream error object, as proxies send when the upstream
/// provider fails after the response has started.
fn ensure_no_error_frame(json: &Value) -> Result<()> {
    let Some(error) = json.get("error").filter(|e| !e.is_null()) else {
        return Ok(());
    };

    let message = error["message"]
        .as_str()
        .map(String::from)
        .unwrap_or_else(|| error.to_string());
    warn!("Error frame in completion stream: {}", message);
    Err(AgentStreamError::GatewayError(format!(
        "OpenAI stream error: {}",
        message
    )))
}

/// Splits a byte stream into the payloads of complete SSE `data:` lines.
///
/// Bytes are buffered until a newline so multi-byte characters split across
/// network chunks decode correctly.
#[derive(Debug, Default)]
struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(bytes);

        let mut payloads = Vec::new();
        while let Some(line_end) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=line_end).collect();
            let line = String::from_utf8_lossy(&line);
            let line = line.trim();

            if let Some(data) = line.strip_prefix("data:") {
                payloads.push(data.trim_start().to_string());
            }
        }
        payloads
    }
}

/// Map one streamed completion object to the chunks it carries.
fn chunks_from_delta(json: &Value) -> Vec<StreamChunk> {
    let mut chunks = Vec::new();
    let delta = &json["choices"][0]["delta"];

    if let Some(reasoning) = delta["reasoning_content"].as_str() {
        if !reasoning.is_empty() {
            chunks.push(StreamChunk::Thinking(reasoning.to_string()));
        }
    }

    if let Some(content) = delta["content"].as_str() {
        if !content.is_empty() {
            chunks.push(StreamChunk::Content(content.to_string()));
        }
    }

    if let Some(tool_calls) = delta["tool_calls"].as_array() {
        for (position, tc) in tool_calls.iter().enumerate() {
            let index = tc["index"].as_u64().map(|i| i as usize).unwrap_or(position);
            chunks.push(StreamChunk::ToolCallFragment {
                index,
                id: tc["id"].as_str().map(String::from),
                name: tc["function"]["name"].as_str().map(String::from),
                arguments: tc["function"]["arguments"].as_str().unwrap_or_default().to_string(),
            });
        }
    }

    chunks
}
