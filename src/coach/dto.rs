use serde::{Deserialize, Serialize};

use super::client::ChatMessage;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub email: String,
    pub message: String,
    #[serde(default)]
    pub history: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
    pub model: String,
}
