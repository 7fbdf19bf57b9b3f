//! Shared test doubles for the widget and client tests

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use arogya_core::{ChatError, ReplyService};
use async_trait::async_trait;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const ERROR_TEXT: &str =
    "Sorry, I'm having trouble connecting. Please check the console and try again.";

/// What the scripted service should do on its next call
pub enum Step {
    Reply(&'static str),
    Status(u16),
    Undecodable,
}

/// Replays a fixed script and records every message it was asked about
#[derive(Default)]
pub struct ScriptedService {
    script: Mutex<VecDeque<Step>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedService {
    pub fn new(steps: impl IntoIterator<Item = Step>) -> Self {
        Self {
            script: Mutex::new(steps.into_iter().collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ReplyService for ScriptedService {
    async fn reply(&self, message: &str) -> arogya_core::error::Result<String> {
        self.calls.lock().unwrap().push(message.to_string());
        match self.script.lock().unwrap().pop_front() {
            Some(Step::Reply(text)) => Ok(text.to_string()),
            Some(Step::Status(status)) => Err(ChatError::Status { status, detail: None }),
            Some(Step::Undecodable) | None => Err(ChatError::Decode("script exhausted".into())),
        }
    }
}

/// Mock backend answering every POST /chat with `status` and `body`
pub async fn chat_server(status: u16, body: serde_json::Value) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(&server)
        .await;
    server
}
