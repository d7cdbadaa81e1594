//! Structured generation on top of a chat-completion client.

use super::{ChatMessage, CompletionOptions, ModelProviderClient};
use crate::error::ApiError;
use crate::schema::OutputSchema;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// The generative text backend as seen by the pipeline: a prompt and an output
/// schema in, a JSON object that passed the schema's structural check out.
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    async fn invoke(&self, prompt: &str, schema: &OutputSchema) -> Result<Value, ApiError>;
}

const SYSTEM_PROMPT: &str = "\
You are a marketing copywriter that answers only with data. Reply with exactly \
one JSON object that conforms to the JSON Schema below. Do not wrap it in \
prose. Omit optional fields you have nothing to say about.";

/// Adapts any [`ModelProviderClient`] into a [`GenerativeBackend`].
pub struct ProviderBackend {
    client: Arc<dyn ModelProviderClient>,
    options: CompletionOptions,
}

impl ProviderBackend {
    pub fn new(client: Arc<dyn ModelProviderClient>, options: CompletionOptions) -> Self {
        Self { client, options }
    }

    fn system_prompt(schema: &OutputSchema) -> String {
        format!(
            "{}\n\nSchema `{}`:\n{}",
            SYSTEM_PROMPT,
            schema.name,
            schema.to_prompt_string()
        )
    }
}

#[async_trait]
impl GenerativeBackend for ProviderBackend {
    async fn invoke(&self, prompt: &str, schema: &OutputSchema) -> Result<Value, ApiError> {
        let messages = vec![
            ChatMessage::system(Self::system_prompt(schema)),
            ChatMessage::user(prompt),
        ];
        let response = self.client.complete(messages, self.options.clone()).await?;
        debug!(
            provider = self.client.provider_name(),
            model = %response.model,
            schema = %schema.name,
            completion_tokens = response.usage.completion_tokens,
            "Received completion"
        );

        let value = parse_json_reply(&response.content)?;
        schema.check(&value)?;
        Ok(value)
    }
}

/// Parse a model reply as JSON, tolerating markdown code fences and prose
/// around the object.
pub fn parse_json_reply(content: &str) -> Result<Value, ApiError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(ApiError::BackendStructure("empty reply".to_string()));
    }
    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return Ok(value);
    }

    let candidate = extract_json(strip_code_fence(trimmed));
    serde_json::from_str::<Value>(candidate).map_err(|e| {
        ApiError::BackendStructure(format!("reply is not valid JSON: {}", e))
    })
}

fn strip_code_fence(content: &str) -> &str {
    let Some(start) = content.find("```") else {
        return content;
    };
    let after = &content[start + 3..];
    // Skip the language tag line.
    let body = match after.find('\n') {
        Some(newline) => &after[newline + 1..],
        None => after,
    };
    match body.find("```") {
        Some(end) => &body[..end],
        None => body,
    }
}

fn extract_json(content: &str) -> &str {
    if let (Some(start), Some(end)) = (content.find('{'), content.rfind('}')) {
        if start < end {
            return &content[start..=end];
        }
    }
    content.trim()
}
