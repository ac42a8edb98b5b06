use async_trait::async_trait;
use forward::{ForwardError, Upstream};
use serde_json::{Map, Value};
use std::sync::Mutex;

/// Stands in for the registration service: records every query and answers with a fixed
/// `data` object, or fails every call.
pub struct StubUpstream {
    answer: Result<Value, String>,
    calls: Mutex<Vec<(String, Map<String, Value>)>>,
}

impl StubUpstream {
    pub fn answering(data: Value) -> Self {
        Self {
            answer: Ok(data),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            answer: Err(message.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(String, Map<String, Value>)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Upstream for StubUpstream {
    async fn execute(&self, query: &str, variables: Map<String, Value>) -> Result<Value, ForwardError> {
        self.calls
            .lock()
            .unwrap()
            .push((query.to_string(), variables));
        self.answer.clone().map_err(ForwardError::Upstream)
    }
}
