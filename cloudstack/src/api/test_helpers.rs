//! Test helpers for the CloudStack API

use super::client::Dispatch;
use super::common::ParamBag;
use super::error::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;

pub const TEST_API_KEY: &str = "test-api-key";
pub const TEST_SECRET: &str = "test-secret-key";

/// Synchronous client for the mock server rooted at `url`.
pub fn create_test_client(url: &str) -> super::Client {
    super::Client::new(&api_url(url), TEST_API_KEY, TEST_SECRET, true).unwrap()
}

/// Asynchronous client for the mock server rooted at `url`.
pub fn create_async_test_client(url: &str) -> super::Client {
    super::Client::new_async(&api_url(url), TEST_API_KEY, TEST_SECRET, true).unwrap()
}

fn api_url(url: &str) -> String {
    format!("{}/client/api", url.trim_end_matches('/'))
}

/// Dispatcher that replays canned payloads and records each call.
pub struct ScriptedDispatcher {
    responses: Mutex<VecDeque<Result<Value>>>,
    repeat: Option<Value>,
    calls: Mutex<Vec<(String, ParamBag, bool)>>,
}

impl ScriptedDispatcher {
    pub fn new(responses: Vec<Result<Value>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            repeat: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Answers every call with `payload`.
    pub fn repeating(payload: Value) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            repeat: Some(payload),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<(String, ParamBag, bool)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Dispatch for ScriptedDispatcher {
    async fn dispatch(&self, command: &str, params: ParamBag, post: bool) -> Result<Value> {
        self.calls
            .lock()
            .unwrap()
            .push((command.to_string(), params, post));

        if let Some(next) = self.responses.lock().unwrap().pop_front() {
            return next;
        }
        match &self.repeat {
            Some(payload) => Ok(payload.clone()),
            None => panic!("no scripted response left for {}", command),
        }
    }
}
