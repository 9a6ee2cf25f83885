/// OpenAI-compatible chat completion and embedding client
///
/// `POST {api_url}/chat/completions` and `POST {api_url}/embeddings`, both with a
/// bearer key. The same client serves every strategy; models come from config.
use crate::{
    error::{AppError, AppResult},
    services::providers::{CompletionService, EmbeddingService},
};
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};

#[derive(Clone)]
pub struct OpenAiClient {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    chat_model: String,
    embedding_model: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
}

#[derive(Debug, Serialize, PartialEq)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

impl OpenAiClient {
    pub fn new(
        http_client: HttpClient,
        api_key: String,
        api_url: String,
        chat_model: String,
        embedding_model: String,
    ) -> Self {
        Self {
            http_client,
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            chat_model,
            embedding_model,
        }
    }

    fn build_messages<'a>(
        system_messages: &'a [String],
        user_message: &'a str,
    ) -> Vec<ChatMessage<'a>> {
        system_messages
            .iter()
            .map(|content| ChatMessage {
                role: "system",
                content: content.as_str(),
            })
            .chain(std::iter::once(ChatMessage {
                role: "user",
                content: user_message,
            }))
            .collect()
    }

    async fn post<B: Serialize + ?Sized, R: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> AppResult<R> {
        let url = format!("{}/{}", self.api_url, path);

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                path = %path,
                status = %status,
                body = %body,
                "OpenAI request failed"
            );
            return Err(AppError::ExternalApi(format!(
                "OpenAI API returned status {}: {}",
                status, body
            )));
        }

        Ok(response.json().await?)
    }
}

#[async_trait::async_trait]
impl CompletionService for OpenAiClient {
    async fn complete(
        &self,
        system_messages: &[String],
        user_message: &str,
        max_tokens: u32,
    ) -> AppResult<String> {
        let request = ChatRequest {
            model: &self.chat_model,
            messages: Self::build_messages(system_messages, user_message),
            max_tokens,
        };

        let response: ChatResponse = self.post("chat/completions", &request).await?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .ok_or_else(|| AppError::ExternalApi("Completion returned no content".to_string()))
    }
}

#[async_trait::async_trait]
impl EmbeddingService for OpenAiClient {
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        let request = EmbeddingRequest {
            model: &self.embedding_model,
            input: text,
        };

        let response: EmbeddingResponse = self.post("embeddings", &request).await?;

        response
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| AppError::ExternalApi("Embedding response was empty".to_string()))
    }
}
