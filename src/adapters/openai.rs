use crate::core::{ChatMessage, ChatModel, ConfigProvider, Embedder};
use crate::utils::error::{AssistantError, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};

/// OpenAI 相容 API 的客戶端（chat completions 與 embeddings）
#[derive(Clone)]
pub struct OpenAiClient {
    base_url: String,
    api_key: String,
    chat_model: String,
    embedding_model: String,
    temperature: Option<f32>,
    client: Client,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: Option<ChoiceMessage>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

impl OpenAiClient {
    pub fn new(base_url: &str, api_key: impl Into<String>) -> Result<Self> {
        Ok(Self::with_client(base_url, api_key, Client::builder().build()?))
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        let api_key = config
            .api_key()
            .ok_or_else(|| AssistantError::MissingConfigError {
                field: "llm.api_key".to_string(),
            })?;
        let client = Client::builder().timeout(config.request_timeout()).build()?;

        let mut this = Self::with_client(config.llm_endpoint(), api_key, client);
        this.chat_model = config.chat_model().to_string();
        this.embedding_model = config.embedding_model().to_string();
        this.temperature = config.temperature();
        Ok(this)
    }

    fn with_client(base_url: &str, api_key: impl Into<String>, client: Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            chat_model: "gpt-3.5-turbo".to_string(),
            embedding_model: "text-embedding-ada-002".to_string(),
            temperature: None,
            client,
        }
    }

    pub fn with_models(mut self, chat_model: &str, embedding_model: &str) -> Self {
        self.chat_model = chat_model.to_string();
        self.embedding_model = embedding_model.to_string();
        self
    }

    pub fn chat_model(&self) -> &str {
        &self.chat_model
    }

    async fn post<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<Response> {
        let url = format!("{}/{}", self.base_url, path);
        tracing::debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&text)
                .map(|e| e.error.message)
                .unwrap_or(text);
            return Err(AssistantError::LlmError {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl ChatModel for OpenAiClient {
    async fn complete(&self, messages: Vec<ChatMessage>) -> Result<String> {
        let request = ChatCompletionRequest {
            model: &self.chat_model,
            messages: &messages,
            temperature: self.temperature,
        };

        let response = self.post("chat/completions", &request).await?;
        let payload: ChatCompletionResponse = serde_json::from_slice(&response.bytes().await?)?;

        Ok(payload
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .unwrap_or_default())
    }
}

#[async_trait]
impl Embedder for OpenAiClient {
    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }

        let request = EmbeddingRequest {
            model: &self.embedding_model,
            input: inputs,
        };

        let response = self.post("embeddings", &request).await?;
        let mut payload: EmbeddingResponse = serde_json::from_slice(&response.bytes().await?)?;
        payload.data.sort_by_key(|d| d.index);

        Ok(payload.data.into_iter().map(|d| d.embedding).collect())
    }
}
