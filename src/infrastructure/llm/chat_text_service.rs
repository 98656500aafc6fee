use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::application::ports::{TextRequest, TextService, TextServiceError, TextTask};
use crate::infrastructure::observability::sanitize_prompt;
use crate::presentation::config::{LlmProviderSetting, LlmSettings};

/// Text service over an OpenAI-compatible chat completions endpoint.
pub struct ChatTextService {
    client: Client,
    provider: LlmProviderSetting,
    base_url: String,
    api_key: String,
    cleaning_model: String,
    summary_model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    request_timeout: Duration,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatTextService {
    pub fn new(settings: &LlmSettings, request_timeout: Duration) -> Result<Self, TextServiceError> {
        let client = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| TextServiceError::Rejected(format!("http client: {}", e)))?;

        Ok(Self {
            client,
            provider: settings.provider,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            cleaning_model: settings.cleaning_model.clone(),
            summary_model: settings.summary_model.clone(),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
            request_timeout,
        })
    }

    fn model_for(&self, task: TextTask) -> &str {
        match task {
            TextTask::CleanTranscript | TextTask::CleanSpeakerTranscript => &self.cleaning_model,
            TextTask::Summarize | TextTask::CombineSummaries => &self.summary_model,
        }
    }

    fn apply_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.provider {
            LlmProviderSetting::Azure => request.header("api-key", &self.api_key),
            LlmProviderSetting::OpenAi => request.bearer_auth(&self.api_key),
        }
    }

    fn classify_status(&self, status: StatusCode, body: String) -> TextServiceError {
        match status {
            StatusCode::TOO_MANY_REQUESTS => TextServiceError::RateLimited,
            StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
                TextServiceError::Timeout(self.request_timeout)
            }
            s if s.is_server_error() => {
                TextServiceError::ApiRequestFailed(format!("HTTP {}: {}", s, body))
            }
            s => TextServiceError::Rejected(format!("HTTP {}: {}", s, body)),
        }
    }
}

#[async_trait]
impl TextService for ChatTextService {
    #[tracing::instrument(skip_all, fields(task = request.task.as_str(), chars = request.content.len()))]
    async fn invoke(&self, request: TextRequest<'_>) -> Result<String, TextServiceError> {
        tracing::debug!(content = %sanitize_prompt(request.content), "Sending text request");

        let body = ChatCompletionRequest {
            model: self.model_for(request.task),
            messages: [
                ChatMessage {
                    role: "system",
                    content: request.prompt,
                },
                ChatMessage {
                    role: "user",
                    content: request.content,
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            response_format: request.task.expects_json().then_some(ResponseFormat {
                kind: "json_object",
            }),
        };

        let http_request = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .json(&body);
        let response = self.apply_auth(http_request).send().await.map_err(|e| {
            if e.is_timeout() {
                TextServiceError::Timeout(self.request_timeout)
            } else {
                TextServiceError::ApiRequestFailed(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(self.classify_status(status, body));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| TextServiceError::MalformedResponse(e.to_string()))?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| TextServiceError::MalformedResponse("empty choices".to_string()))?;

        tracing::debug!(response = %sanitize_prompt(&content), "Text request answered");
        Ok(content)
    }
}
