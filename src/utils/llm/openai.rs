//! Chat completion endpoint over the OpenAI API (and OpenAI-compatible gateways via
//! `OPENAI_API_BASE`).
//!
//! [ChatModel] is deliberately thin: one awaited request per [ChatModel::invoke], no retry, no
//! timeout, no error classification. Whatever the SDK raises propagates unmodified.

use anyhow::{anyhow, Result};
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use async_trait::async_trait;

use crate::chain::Chain;
use crate::message::{Message, Role};

/// Sampling configuration of a [ChatModel]. Unset fields are left to the endpoint's defaults.
#[derive(Clone, Debug)]
pub struct ChatModelConfig {
    pub model: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl ChatModelConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// A chat model reached through the OpenAI SDK. Consumes an ordered message sequence, produces one
/// [Role::Ai] reply.
#[derive(Clone)]
pub struct ChatModel {
    pub client: Client<OpenAIConfig>,
    pub config: ChatModelConfig,
}

impl ChatModel {
    /// Create a chat model with credentials from the environment (`OPENAI_API_KEY`, and optionally
    /// `OPENAI_API_BASE` for compatible gateways).
    pub fn new(config: ChatModelConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Create a chat model with an explicit client.
    pub fn with_client(client: Client<OpenAIConfig>, config: ChatModelConfig) -> Self {
        Self { client, config }
    }

    /// Send the message sequence to the endpoint and return the model's reply.
    /// Returns an error if the endpoint fails or replies with no choices.
    pub async fn invoke(&self, messages: &[Message]) -> Result<Message> {
        let request_messages = messages.iter()
            .map(to_request_message)
            .collect::<Result<Vec<_>>>()?;
        let mut request_builder = CreateChatCompletionRequestArgs::default();
        request_builder
            .model(self.config.model.as_str())
            .messages(request_messages);
        if let Some(temperature) = self.config.temperature {
            request_builder.temperature(temperature);
        }
        if let Some(max_tokens) = self.config.max_tokens {
            request_builder.max_completion_tokens(max_tokens);
        }
        let request = request_builder.build()?;
        let mut response = self.client.chat().create(request).await?;
        if response.choices.is_empty() {
            return Err(anyhow!("chat completion from model {} returned no choices", self.config.model));
        }
        let choice = response.choices.swap_remove(0);
        Ok(Message::ai(choice.message.content.unwrap_or_default()))
    }
}

/// A [ChatModel] is a stage from a message sequence to the model's reply.
#[async_trait]
impl Chain for ChatModel {
    type Input = Vec<Message>;
    type Output = Message;

    async fn run(&self, input: Vec<Message>) -> Result<Message> {
        self.invoke(&input).await
    }
}

fn to_request_message(msg: &Message) -> Result<ChatCompletionRequestMessage> {
    let request_message = match msg.role {
        Role::System => ChatCompletionRequestSystemMessageArgs::default()
            .content(msg.content.as_str())
            .build()?
            .into(),
        Role::Human => ChatCompletionRequestUserMessageArgs::default()
            .content(msg.content.as_str())
            .build()?
            .into(),
        Role::Ai => ChatCompletionRequestAssistantMessageArgs::default()
            .content(msg.content.as_str())
            .build()?
            .into(),
    };
    Ok(request_message)
}

#[cfg(test)]
mod test_openai {
    use crate::message::Message;
    use super::{to_request_message, ChatCompletionRequestMessage, ChatModelConfig};

    #[test]
    fn test_role_mapping() {
        let system = to_request_message(&Message::system("steer")).unwrap();
        assert!(matches!(system, ChatCompletionRequestMessage::System(_)));
        let human = to_request_message(&Message::human("ask")).unwrap();
        assert!(matches!(human, ChatCompletionRequestMessage::User(_)));
        let ai = to_request_message(&Message::ai("answer")).unwrap();
        assert!(matches!(ai, ChatCompletionRequestMessage::Assistant(_)));
    }

    #[test]
    fn test_config_builder() {
        let config = ChatModelConfig::new("gpt-4o-mini")
            .with_temperature(0.7)
            .with_max_tokens(256);
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.temperature, Some(0.7));
        assert_eq!(config.max_tokens, Some(256));
    }
}
