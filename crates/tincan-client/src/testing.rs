//! In-memory transport for exercising stores without a network.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::LrsError;
use crate::transport::{HttpRequest, HttpResponse, HttpTransport};

/// Records every request and answers from a script. With the script
/// exhausted it answers `200` with an empty body.
#[derive(Clone, Debug, Default)]
pub struct MockTransport {
    inner: Arc<Mutex<MockTransportState>>,
}

#[derive(Debug, Default)]
struct MockTransportState {
    requests: Vec<HttpRequest>,
    replies: VecDeque<MockReply>,
}

#[derive(Debug)]
enum MockReply {
    Response(HttpResponse),
    Failure(String),
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_response(&self, response: HttpResponse) {
        self.push(MockReply::Response(response));
    }

    pub fn push_failure(&self, message: impl Into<String>) {
        self.push(MockReply::Failure(message.into()));
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.inner
            .lock()
            .map(|state| state.requests.clone())
            .unwrap_or_default()
    }

    pub fn last_request(&self) -> Option<HttpRequest> {
        self.requests().pop()
    }

    fn push(&self, reply: MockReply) {
        if let Ok(mut state) = self.inner.lock() {
            state.replies.push_back(reply);
        }
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, LrsError> {
        let mut state = self
            .inner
            .lock()
            .map_err(|_| LrsError::Transport("mock transport mutex poisoned".to_string()))?;
        state.requests.push(request);
        match state.replies.pop_front() {
            Some(MockReply::Response(response)) => Ok(response),
            Some(MockReply::Failure(message)) => Err(LrsError::Transport(message)),
            None => Ok(HttpResponse::new(200)),
        }
    }
}
