use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use scenario_types::{Method, ScenarioError};

use crate::client::RpcClient;

/// A test double for [`RpcClient`]: programmed with a queue of responses
/// per method name, and records every call it receives for assertions.
#[derive(Clone, Default)]
pub struct MockRpcClient {
    responses: Arc<Mutex<HashMap<&'static str, VecDeque<Result<Value, ScenarioError>>>>>,
    calls: Arc<Mutex<Vec<(&'static str, Value)>>>,
}

impl MockRpcClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful response for the next call to `method`.
    pub async fn push_ok<T: serde::Serialize>(&self, method: &'static str, response: T) {
        let value = serde_json::to_value(response).expect("mock response must serialize");
        self.responses.lock().await.entry(method).or_default().push_back(Ok(value));
    }

    /// Queue a failing response for the next call to `method`.
    pub async fn push_err(&self, method: &'static str, err: ScenarioError) {
        self.responses.lock().await.entry(method).or_default().push_back(Err(err));
    }

    /// Every call made so far, in order, as `(method name, encoded request)`.
    pub async fn calls(&self) -> Vec<(&'static str, Value)> {
        self.calls.lock().await.clone()
    }
}

#[async_trait]
impl RpcClient for MockRpcClient {
    async fn execute<Req: Method>(&self, req: Req) -> Result<Req::Response, ScenarioError> {
        let name = req.name();
        let encoded = serde_json::to_value(&req).unwrap_or(Value::Null);
        self.calls.lock().await.push((name, encoded));

        let queued = self.responses.lock().await.get_mut(name).and_then(|q| q.pop_front());
        match queued {
            Some(Ok(value)) => serde_json::from_value(value)
                .map_err(|source| ScenarioError::Decode { method: name, source }),
            Some(Err(e)) => Err(e),
            None => Err(ScenarioError::Method {
                method: name,
                code: None,
                description: "no mock response queued".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scenario_methods::{GetUpdates, SendMessage};

    #[tokio::test]
    async fn records_and_replays_queued_response() {
        let client = MockRpcClient::new();
        client
            .push_ok(
                "sendMessage",
                scenario_types::TelegramMessage {
                    message_id: 1,
                    chat: scenario_types::Chat { id: 1, kind: scenario_types::ChatKind::Private },
                    from: None,
                    text: Some("hi".into()),
                },
            )
            .await;

        let reply = client.execute(SendMessage::new(1, "hi")).await.unwrap();
        assert_eq!(reply.text.as_deref(), Some("hi"));
        assert_eq!(client.calls().await.len(), 1);
    }

    #[tokio::test]
    async fn missing_response_is_a_method_error() {
        let client = MockRpcClient::new();
        let err = client.execute(GetUpdates { offset: 0, limit: 100, timeout: 0 }).await;
        assert!(err.is_err());
    }
}
