use crate::{
    error::{ConfigurationError, UpstreamError},
    message::{Message, Role},
};
use async_openai::{
    Client,
    config::OpenAIConfig,
    error::OpenAIError,
    types::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs, CreateChatCompletionResponse,
    },
};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

pub const DEFAULT_API_BASE: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_MODEL: &str = "openai/gpt-3.5-turbo-0613";

/// Per-call sampling settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSettings {
    pub model: String,
    pub temperature: f32,
}

/// A generic client for interacting with an LLM.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Sends an ordered list of role-tagged messages and returns the model's reply
    /// as a single `Ai` message.
    async fn complete(
        &self,
        settings: &ModelSettings,
        messages: &[Message],
    ) -> Result<Message, UpstreamError>;
}

/// The model reference held by an agent: which client to call and how to sample.
#[derive(Clone)]
pub struct ModelHandle {
    client: Arc<dyn LLMClient>,
    settings: ModelSettings,
}

impl ModelHandle {
    pub fn new(client: Arc<dyn LLMClient>, model: impl Into<String>, temperature: f32) -> Self {
        Self {
            client,
            settings: ModelSettings {
                model: model.into(),
                temperature,
            },
        }
    }

    /// Same client and model, different sampling temperature.
    pub fn with_temperature(&self, temperature: f32) -> Self {
        Self {
            client: self.client.clone(),
            settings: ModelSettings {
                model: self.settings.model.clone(),
                temperature,
            },
        }
    }

    pub fn settings(&self) -> &ModelSettings {
        &self.settings
    }

    pub async fn complete(&self, messages: &[Message]) -> Result<Message, UpstreamError> {
        self.client.complete(&self.settings, messages).await
    }
}

/// Connection settings for an OpenAI-compatible chat endpoint.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub api_base: String,
    pub model: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

/// An implementation of `LLMClient` for any OpenAI-compatible API.
pub struct OpenAICompatibleClient {
    client: Client<OpenAIConfig>,
}

impl OpenAICompatibleClient {
    /// Creates a new client, refusing to start without a credential.
    pub fn from_config(config: &LlmConfig) -> Result<Self, ConfigurationError> {
        let api_key = config
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                ConfigurationError::MissingCredential("OPENROUTER_API_KEY".to_string())
            })?;

        let openai_config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(&config.api_base);

        Ok(Self {
            client: Client::with_config(openai_config),
        })
    }
}

fn to_request_message(message: &Message) -> Result<ChatCompletionRequestMessage, OpenAIError> {
    let request = match message.role() {
        Role::System => ChatCompletionRequestSystemMessageArgs::default()
            .content(message.content())
            .build()?
            .into(),
        Role::Human => ChatCompletionRequestUserMessageArgs::default()
            .content(message.content())
            .build()?
            .into(),
        Role::Ai => ChatCompletionRequestAssistantMessageArgs::default()
            .content(message.content())
            .build()?
            .into(),
    };
    Ok(request)
}

/// Takes the text of the first choice; a reply without one is `EmptyResponse`.
fn reply_from_response(response: CreateChatCompletionResponse) -> Result<Message, UpstreamError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(Message::ai)
        .ok_or(UpstreamError::EmptyResponse)
}

#[async_trait]
impl LLMClient for OpenAICompatibleClient {
    async fn complete(
        &self,
        settings: &ModelSettings,
        messages: &[Message],
    ) -> Result<Message, UpstreamError> {
        let request_messages = messages
            .iter()
            .map(to_request_message)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| UpstreamError::Llm(e.to_string()))?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&settings.model)
            .messages(request_messages)
            .temperature(settings.temperature)
            .build()
            .map_err(|e| UpstreamError::Llm(e.to_string()))?;

        debug!(
            model = %settings.model,
            temperature = settings.temperature,
            messages = messages.len(),
            "Sending chat completion request"
        );

        let response: CreateChatCompletionResponse = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| UpstreamError::Llm(e.to_string()))?;

        reply_from_response(response)
    }
}
