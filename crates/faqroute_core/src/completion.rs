use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{FaqError, Result};

/// Opaque text-completion service: one prompt in, one completion out.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Short label used in logs and traces.
    fn name(&self) -> &str;

    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// Role description sent as the system message of an agent-style provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Persona {
    pub role: String,
    pub goal: String,
    pub backstory: String,
}

impl Persona {
    pub fn new(role: &str, goal: &str, backstory: &str) -> Self {
        Self {
            role: role.to_string(),
            goal: goal.to_string(),
            backstory: backstory.to_string(),
        }
    }

    pub fn system_prompt(&self) -> String {
        format!(
            "You are {}. {}\nYour personal goal is: {}",
            self.role, self.backstory, self.goal
        )
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI-compatible `chat/completions` client.
#[derive(Clone)]
pub struct ChatCompletionsProvider {
    client: Client,
    name: String,
    endpoint: String,
    api_key: String,
    model: String,
    persona: Option<Persona>,
}

impl ChatCompletionsProvider {
    pub fn new(client: Client, base_url: &str, api_key: &str, model: &str) -> Self {
        Self {
            client,
            name: model.to_string(),
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            api_key: api_key.to_string(),
            model: model.to_string(),
            persona: None,
        }
    }

    pub fn with_persona(mut self, persona: Persona) -> Self {
        self.name = format!("{} ({})", persona.role, self.model);
        self.persona = Some(persona);
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn messages(&self, prompt: &str) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(2);
        if let Some(persona) = &self.persona {
            messages.push(ChatMessage {
                role: "system".to_string(),
                content: persona.system_prompt(),
            });
        }
        messages.push(ChatMessage {
            role: "user".to_string(),
            content: prompt.to_string(),
        });
        messages
    }
}

#[async_trait]
impl CompletionProvider for ChatCompletionsProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: self.messages(prompt),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json::<ChatCompletionResponse>()
            .await?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| FaqError::EmptyCompletion(self.name.clone()))
    }
}

/// Providers tried in order until one returns non-blank text.
#[derive(Clone, Default)]
pub struct ProviderChain {
    providers: Vec<Arc<dyn CompletionProvider>>,
}

impl ProviderChain {
    pub fn new(providers: Vec<Arc<dyn CompletionProvider>>) -> Self {
        Self { providers }
    }

    pub fn then(mut self, provider: Arc<dyn CompletionProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Returns the first non-blank completion, trimmed. Failures are logged and
    /// dropped; only exhaustion of the whole chain is reported.
    pub async fn complete(&self, prompt: &str) -> Result<String> {
        for provider in &self.providers {
            match provider.complete(prompt).await {
                Ok(text) if !text.trim().is_empty() => {
                    debug!(provider = provider.name(), "completion succeeded");
                    return Ok(text.trim().to_string());
                }
                Ok(_) => {
                    warn!(provider = provider.name(), "empty completion, trying next provider");
                }
                Err(err) => {
                    warn!(provider = provider.name(), error = %err, "completion failed, trying next provider");
                }
            }
        }
        Err(FaqError::ProvidersExhausted(self.providers.len()))
    }
}
