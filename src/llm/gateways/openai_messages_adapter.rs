//! Adapter for converting LLM messages to the OpenAI chat-completions format.

use crate::llm::models::{LlmMessage, MessageRole};
use serde_json::{json, Value};

/// Adapt LLM messages to OpenAI format.
pub fn adapt_messages_to_openai(messages: &[LlmMessage]) -> Vec<Value> {
    messages.iter().map(adapt_message).collect()
}

fn adapt_message(msg: &LlmMessage) -> Value {
    match msg.role {
        MessageRole::System => json!({
            "role": "system",
            "content": msg.content.as_deref().unwrap_or("")
        }),
        MessageRole::User => json!({
            "role": "user",
            "content": msg.content.as_deref().unwrap_or("")
        }),
        MessageRole::Assistant => {
            let mut assistant_msg = json!({ "role": "assistant" });

            if let Some(ref content) = msg.content {
                assistant_msg["content"] = json!(content);
            }

            if let Some(ref tool_calls) = msg.tool_calls {
                let formatted_calls: Vec<Value> = tool_calls
                    .iter()
                    .map(|tc| {
                        json!({
                            "id": tc.id,
                            "type": "function",
                            "function": {
                                "name": tc.name,
                                "arguments": tc.arguments
                            }
                        })
                    })
                    .collect();
                assistant_msg["tool_calls"] = json!(formatted_calls);
            }

            assistant_msg
        }
        MessageRole::Tool => json!({
            "role": "tool",
            "content": msg.content.as_deref().unwrap_or(""),
            "tool_call_id": msg.tool_call_id.as_deref().unwrap_or("")
        }),
    }
}
