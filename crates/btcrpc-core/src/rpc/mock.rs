use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;

use super::{HttpRequest, HttpResponse, HttpTransport, TransportFailure};

enum Reply {
    Respond { status: StatusCode, body: String },
    Fail(String),
}

/// A scripted HTTP transport for testing. Replies are handed out in the
/// order they were queued; every request is recorded.
pub struct MockTransport {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    pub fn builder() -> MockTransportBuilder {
        MockTransportBuilder {
            replies: VecDeque::new(),
        }
    }

    /// Every request received so far.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().expect("mock lock poisoned").clone()
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().expect("mock lock poisoned").len()
    }
}

pub struct MockTransportBuilder {
    replies: VecDeque<Reply>,
}

impl MockTransportBuilder {
    pub fn respond(mut self, status: StatusCode, body: impl Into<String>) -> Self {
        self.replies.push_back(Reply::Respond {
            status,
            body: body.into(),
        });
        self
    }

    pub fn fail(mut self, message: impl Into<String>) -> Self {
        self.replies.push_back(Reply::Fail(message.into()));
        self
    }

    pub fn build(self) -> MockTransport {
        MockTransport {
            replies: Mutex::new(self.replies),
            requests: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn post(&self, request: HttpRequest) -> Result<HttpResponse, TransportFailure> {
        self.requests
            .lock()
            .expect("mock lock poisoned")
            .push(request);
        let reply = self
            .replies
            .lock()
            .expect("mock lock poisoned")
            .pop_front();
        match reply {
            Some(Reply::Respond { status, body }) => Ok(HttpResponse {
                status,
                body,
                headers: HeaderMap::new(),
            }),
            Some(Reply::Fail(message)) => Err(TransportFailure::new(message)),
            None => Err(TransportFailure::new("mock transport has no reply queued")),
        }
    }
}
