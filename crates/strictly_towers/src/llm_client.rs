//! Tool-calling LLM client for OpenAI and Anthropic.
//!
//! Requests are plain JSON over `reqwest`. The client knows nothing about the
//! puzzle: it turns a system prompt, a list of [`ChatTurn`]s and one tool
//! definition into a provider request, and the provider response back into an
//! [`LlmReply`].

use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, error, info, instrument};

const OPENAI_BASE_URL: &str = "https://api.openai.com";
const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// LLM provider selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    /// OpenAI (GPT models).
    OpenAI,
    /// Anthropic (Claude models).
    Anthropic,
}

/// Configuration for LLM client.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    provider: LlmProvider,
    api_key: String,
    model: String,
    max_tokens: u32,
    base_url: Option<String>,
    timeout: Duration,
}

impl LlmConfig {
    /// Creates a new LLM configuration.
    #[instrument(skip(api_key), fields(provider = ?provider, model = %model))]
    pub fn new(
        provider: LlmProvider,
        api_key: String,
        model: String,
        max_tokens: u32,
        base_url: Option<String>,
        timeout: Duration,
    ) -> Self {
        debug!("Creating LLM config");
        Self {
            provider,
            api_key,
            model,
            max_tokens,
            base_url,
            timeout,
        }
    }

    /// Gets the provider.
    pub fn provider(&self) -> LlmProvider {
        self.provider
    }

    /// Gets the model name.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Gets the max tokens.
    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    /// Gets the request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn base_url(&self) -> &str {
        match (&self.base_url, self.provider) {
            (Some(url), _) => url.trim_end_matches('/'),
            (None, LlmProvider::OpenAI) => OPENAI_BASE_URL,
            (None, LlmProvider::Anthropic) => ANTHROPIC_BASE_URL,
        }
    }
}

/// A function the model may call.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolSpec {
    /// Tool name.
    pub name: String,
    /// What the tool does, shown to the model.
    pub description: String,
    /// JSON schema of the arguments object.
    pub parameters: Value,
}

/// A tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    /// Provider-assigned call id.
    pub id: String,
    /// Name of the tool.
    pub name: String,
    /// Arguments object.
    pub arguments: Value,
}

/// One turn of a transcript, after the system prompt.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatTurn {
    /// A user message.
    User(String),
    /// Free text the assistant sent earlier.
    AssistantText(String),
    /// A tool call previously made by the assistant.
    AssistantToolCall(ToolCall),
    /// The result handed back for a tool call.
    ToolResult {
        /// Id of the call being answered.
        call_id: String,
        /// Result text.
        content: String,
    },
}

/// What the model sent back.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LlmReply {
    /// Free text, if any.
    pub text: Option<String>,
    /// Tool calls, in the order given.
    pub tool_calls: Vec<ToolCall>,
}

/// LLM client that abstracts over multiple providers.
#[derive(Debug, Clone)]
pub struct LlmClient {
    config: LlmConfig,
    http: reqwest::Client,
}

impl LlmClient {
    /// Creates a new LLM client.
    #[instrument(skip(config), fields(provider = ?config.provider()))]
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        info!("Creating LLM client");
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::new(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { config, http })
    }

    /// Returns the client configuration.
    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    /// Sends the transcript and returns the model's reply.
    #[instrument(
        skip(self, system_prompt, turns, tool),
        fields(provider = ?self.config.provider, model = %self.config.model, turns = turns.len())
    )]
    pub async fn complete(
        &self,
        system_prompt: &str,
        turns: &[ChatTurn],
        tool: &ToolSpec,
    ) -> Result<LlmReply, LlmError> {
        debug!("Requesting completion");
        let (url, body) = match self.config.provider {
            LlmProvider::OpenAI => (
                format!("{}/v1/chat/completions", self.config.base_url()),
                openai_request(&self.config, system_prompt, turns, tool),
            ),
            LlmProvider::Anthropic => (
                format!("{}/v1/messages", self.config.base_url()),
                anthropic_request(&self.config, system_prompt, turns, tool),
            ),
        };

        let request = self.http.post(&url).json(&body);
        let request = match self.config.provider {
            LlmProvider::OpenAI => request.bearer_auth(&self.config.api_key),
            LlmProvider::Anthropic => request
                .header("x-api-key", &self.config.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION),
        };

        let response = request.send().await.map_err(|e| {
            error!(error = ?e, "LLM API request failed");
            LlmError::new(format!("API request failed: {}", e))
        })?;

        let status = response.status();
        let response_text = response.text().await.map_err(|e| {
            error!(error = ?e, "Failed to read LLM response");
            LlmError::new(format!("Failed to read response: {}", e))
        })?;

        if !status.is_success() {
            error!(status = %status, response = %response_text, "LLM API error");
            return Err(LlmError::new(format!(
                "API error {}: {}",
                status, response_text
            )));
        }

        debug!(response_length = response_text.len(), "Parsing LLM response");
        let reply = match self.config.provider {
            LlmProvider::OpenAI => parse_openai_response(&response_text)?,
            LlmProvider::Anthropic => parse_anthropic_response(&response_text)?,
        };

        info!(
            tool_calls = reply.tool_calls.len(),
            has_text = reply.text.is_some(),
            "Received completion"
        );
        Ok(reply)
    }
}

fn openai_request(config: &LlmConfig, system_prompt: &str, turns: &[ChatTurn], tool: &ToolSpec) -> Value {
    let mut messages = vec![json!({ "role": "system", "content": system_prompt })];
    for turn in turns {
        messages.push(match turn {
            ChatTurn::User(text) => json!({ "role": "user", "content": text }),
            ChatTurn::AssistantText(text) => json!({ "role": "assistant", "content": text }),
            ChatTurn::AssistantToolCall(call) => json!({
                "role": "assistant",
                "content": null,
                "tool_calls": [{
                    "id": call.id,
                    "type": "function",
                    "function": {
                        "name": call.name,
                        "arguments": call.arguments.to_string(),
                    }
                }]
            }),
            ChatTurn::ToolResult { call_id, content } => json!({
                "role": "tool",
                "tool_call_id": call_id,
                "content": content,
            }),
        });
    }

    json!({
        "model": config.model,
        "max_completion_tokens": config.max_tokens,
        "messages": messages,
        "tools": [{
            "type": "function",
            "function": {
                "name": tool.name,
                "description": tool.description,
                "parameters": tool.parameters,
            }
        }],
        "tool_choice": "auto",
    })
}

fn anthropic_request(
    config: &LlmConfig,
    system_prompt: &str,
    turns: &[ChatTurn],
    tool: &ToolSpec,
) -> Value {
    let messages: Vec<Value> = turns
        .iter()
        .map(|turn| match turn {
            ChatTurn::User(text) => json!({ "role": "user", "content": text }),
            ChatTurn::AssistantText(text) => json!({ "role": "assistant", "content": text }),
            ChatTurn::AssistantToolCall(call) => json!({
                "role": "assistant",
                "content": [{
                    "type": "tool_use",
                    "id": call.id,
                    "name": call.name,
                    "input": call.arguments,
                }]
            }),
            ChatTurn::ToolResult { call_id, content } => json!({
                "role": "user",
                "content": [{
                    "type": "tool_result",
                    "tool_use_id": call_id,
                    "content": content,
                }]
            }),
        })
        .collect();

    json!({
        "model": config.model,
        "max_tokens": config.max_tokens,
        "system": system_prompt,
        "messages": messages,
        "tools": [{
            "name": tool.name,
            "description": tool.description,
            "input_schema": tool.parameters,
        }],
    })
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAiMessage {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<OpenAiToolCall>,
}

#[derive(Debug, Deserialize)]
struct OpenAiToolCall {
    id: String,
    function: OpenAiFunction,
}

#[derive(Debug, Deserialize)]
struct OpenAiFunction {
    name: String,
    arguments: String,
}

fn parse_openai_response(body: &str) -> Result<LlmReply, LlmError> {
    let response: OpenAiResponse = serde_json::from_str(body).map_err(|e| {
        error!(error = ?e, response = %body, "Failed to parse OpenAI response");
        LlmError::new(format!("Failed to parse response: {}", e))
    })?;

    let message = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| LlmError::new("No choices in OpenAI response".to_string()))?
        .message;

    // Arguments arrive as a JSON string; keep unparsable ones as raw strings so
    // the caller can report them.
    let tool_calls = message
        .tool_calls
        .into_iter()
        .map(|call| ToolCall {
            id: call.id,
            name: call.function.name,
            arguments: serde_json::from_str(&call.function.arguments)
                .unwrap_or(Value::String(call.function.arguments)),
        })
        .collect();

    Ok(LlmReply {
        text: message.content.filter(|t| !t.trim().is_empty()),
        tool_calls,
    })
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum AnthropicBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: Value,
    },
    #[serde(other)]
    Other,
}

fn parse_anthropic_response(body: &str) -> Result<LlmReply, LlmError> {
    let response: AnthropicResponse = serde_json::from_str(body).map_err(|e| {
        error!(error = ?e, response = %body, "Failed to parse Anthropic response");
        LlmError::new(format!("Failed to parse response: {}", e))
    })?;

    let mut reply = LlmReply::default();
    let mut texts = Vec::new();
    for block in response.content {
        match block {
            AnthropicBlock::Text { text } => texts.push(text),
            AnthropicBlock::ToolUse { id, name, input } => reply.tool_calls.push(ToolCall {
                id,
                name,
                arguments: input,
            }),
            AnthropicBlock::Other => {}
        }
    }
    let text = texts.join("\n");
    if !text.trim().is_empty() {
        reply.text = Some(text);
    }
    Ok(reply)
}

/// LLM client error.
#[derive(Debug, Clone, Display, Error)]
#[display("LLM error: {} at {}:{}", message, file, line)]
pub struct LlmError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl LlmError {
    /// Creates a new LLM error.
    #[track_caller]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        error!(error_message = %message, "LLM error created");
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
