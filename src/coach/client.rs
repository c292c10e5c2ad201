//! OpenRouter chat client.
//!
//! Models are tried in the configured order. A 429, a transport error or an
//! empty completion moves on to the next model; any other non-success status
//! is returned immediately.

use std::time::Duration;

use axum::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument, warn};

const REQUEST_TIMEOUT_SECS: u64 = 60;
const ERROR_BODY_MAX: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatReply {
    pub content: String,
    pub model: String,
}

#[derive(Debug, Error)]
pub enum CoachError {
    #[error("model {model} answered {status}: {body}")]
    Upstream {
        model: String,
        status: u16,
        body: String,
    },
    #[error("all models failed ({tried} tried)")]
    AllModelsFailed { tried: usize },
    #[error("unreadable reply: {0}")]
    InvalidReply(String),
}

#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<ChatReply, CoachError>;
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

pub struct OpenRouterClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    models: Vec<String>,
}

impl OpenRouterClient {
    pub fn new(base_url: &str, api_key: &str, models: Vec<String>) -> anyhow::Result<Self> {
        anyhow::ensure!(!models.is_empty(), "at least one model is required");
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            models,
        })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl ChatClient for OpenRouterClient {
    #[instrument(skip(self, messages), fields(messages = messages.len()))]
    async fn complete(&self, messages: &[ChatMessage]) -> Result<ChatReply, CoachError> {
        for model in &self.models {
            let request = CompletionRequest {
                model: model.as_str(),
                messages,
                temperature: 0.7,
            };
            let response = match self
                .http
                .post(self.completions_url())
                .bearer_auth(&self.api_key)
                .json(&request)
                .send()
                .await
            {
                Ok(response) => response,
                Err(e) => {
                    warn!(%model, error = %e, "model unreachable, trying next");
                    continue;
                }
            };

            let status = response.status();
            if status == StatusCode::TOO_MANY_REQUESTS {
                warn!(%model, "model rate limited, trying next");
                continue;
            }
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    warn!(%model, error = %e, "reading reply failed, trying next");
                    continue;
                }
            };
            if !status.is_success() {
                return Err(CoachError::Upstream {
                    model: model.clone(),
                    status: status.as_u16(),
                    body: body.chars().take(ERROR_BODY_MAX).collect(),
                });
            }

            let parsed: CompletionResponse = serde_json::from_str(&body)
                .map_err(|e| CoachError::InvalidReply(e.to_string()))?;
            let content = parsed
                .choices
                .into_iter()
                .next()
                .and_then(|choice| choice.message.content)
                .map(|content| content.trim().to_string())
                .unwrap_or_default();
            if content.is_empty() {
                warn!(%model, "empty completion, trying next");
                continue;
            }

            debug!(%model, chars = content.len(), "completion received");
            return Ok(ChatReply {
                content,
                model: parsed.model.unwrap_or_else(|| model.clone()),
            });
        }
        Err(CoachError::AllModelsFailed {
            tried: self.models.len(),
        })
    }
}

/// Replays canned replies in order; used by handler tests.
#[cfg(test)]
pub struct ScriptedChat {
    replies: std::sync::Mutex<std::collections::VecDeque<Result<String, u16>>>,
    pub seen: std::sync::Mutex<Vec<Vec<ChatMessage>>>,
}

#[cfg(test)]
impl ScriptedChat {
    pub fn new(replies: impl IntoIterator<Item = Result<String, u16>>) -> Self {
        Self {
            replies: std::sync::Mutex::new(replies.into_iter().collect()),
            seen: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[cfg(test)]
#[async_trait]
impl ChatClient for ScriptedChat {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<ChatReply, CoachError> {
        self.seen.lock().unwrap().push(messages.to_vec());
        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(content)) => Ok(ChatReply {
                content,
                model: "scripted".into(),
            }),
            Some(Err(status)) => Err(CoachError::Upstream {
                model: "scripted".into(),
                status,
                body: String::new(),
            }),
            None => Err(CoachError::AllModelsFailed { tried: 1 }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode as AxumStatus, routing::post, Json, Router};
    use serde_json::{json, Value};

    /// Serves `/chat/completions`; the requested model name decides the outcome.
    async fn mock_server() -> String {
        async fn completions(Json(body): Json<Value>) -> (AxumStatus, Json<Value>) {
            let model = body["model"].as_str().unwrap_or_default().to_string();
            match model.as_str() {
                "busy" => (AxumStatus::TOO_MANY_REQUESTS, Json(json!({"error": "slow down"}))),
                "broken" => (
                    AxumStatus::INTERNAL_SERVER_ERROR,
                    Json(json!({"error": "boom"})),
                ),
                "silent" => (
                    AxumStatus::OK,
                    Json(json!({"model": model, "choices": [{"message": {"content": "  "}}]})),
                ),
                _ => (
                    AxumStatus::OK,
                    Json(json!({
                        "model": model,
                        "choices": [{"message": {"role": "assistant", "content": format!("hello from {model}")}}]
                    })),
                ),
            }
        }

        let app = Router::new().route("/chat/completions", post(completions));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn client(base: &str, models: &[&str]) -> OpenRouterClient {
        OpenRouterClient::new(
            base,
            "test-key",
            models.iter().map(|m| m.to_string()).collect(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn falls_back_on_rate_limit_and_empty_reply() {
        let base = mock_server().await;
        let reply = client(&base, &["busy", "silent", "good"])
            .complete(&[ChatMessage::user("hi")])
            .await
            .unwrap();
        assert_eq!(reply.model, "good");
        assert_eq!(reply.content, "hello from good");
    }

    #[tokio::test]
    async fn other_errors_stop_the_chain() {
        let base = mock_server().await;
        let err = client(&base, &["broken", "good"])
            .complete(&[ChatMessage::user("hi")])
            .await
            .unwrap_err();
        match err {
            CoachError::Upstream { model, status, .. } => {
                assert_eq!(model, "broken");
                assert_eq!(status, 500);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn exhausting_the_list_fails() {
        let base = mock_server().await;
        let err = client(&base, &["busy", "busy"])
            .complete(&[ChatMessage::user("hi")])
            .await
            .unwrap_err();
        assert!(matches!(err, CoachError::AllModelsFailed { tried: 2 }));
    }

    #[tokio::test]
    async fn unreachable_host_counts_as_failed_model() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let err = client(&format!("http://{addr}"), &["good"])
            .complete(&[ChatMessage::user("hi")])
            .await
            .unwrap_err();
        assert!(matches!(err, CoachError::AllModelsFailed { tried: 1 }));
    }

    #[test]
    fn empty_model_list_is_rejected() {
        assert!(OpenRouterClient::new("http://localhost", "k", Vec::new()).is_err());
    }
}
