use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;
use crate::error::{ChatError, Result};

/// Anything that can turn a user message into a reply.
///
/// The widget only ever talks to this trait, so tests can hand it a
/// scripted implementation instead of a live server.
#[async_trait]
pub trait ReplyService: Send + Sync {
    async fn reply(&self, message: &str) -> Result<String>;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    reply: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
}

/// `POST /chat` against the coaching backend
#[derive(Clone)]
pub struct HttpReplyService {
    client: Client,
    endpoint: String,
}

impl HttpReplyService {
    /// `endpoint` is the full chat URL, e.g. `http://127.0.0.1:5000/chat`
    pub fn new(endpoint: &str) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.to_string(),
        }
    }
}

#[async_trait]
impl ReplyService for HttpReplyService {
    async fn reply(&self, message: &str) -> Result<String> {
        debug!(endpoint = %self.endpoint, chars = message.chars().count(), "posting chat message");

        // .json() sets Content-Type: application/json
        let response = self
            .client
            .post(&self.endpoint)
            .json(&ChatRequest { message })
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let detail = serde_json::from_slice::<ErrorResponse>(&body)
                .ok()
                .map(|e| e.error);
            return Err(ChatError::Status {
                status: status.as_u16(),
                detail,
            });
        }

        let chat_response: ChatResponse = serde_json::from_slice(&body)
            .map_err(|e| ChatError::Decode(e.to_string()))?;
        Ok(chat_response.reply)
    }
}
