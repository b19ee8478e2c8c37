#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use btcrpc_core::rpc::{HttpRequest, HttpResponse, TransportFailure};
use btcrpc_core::{HttpTransport, RpcClient, RpcConfig};
use reqwest::header::HeaderMap;
use reqwest::StatusCode;

/// Replays canned HTTP replies and counts how often it was asked.
#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<Result<(StatusCode, String), String>>>,
    calls: Mutex<usize>,
}

impl ScriptedTransport {
    pub fn replying(status: StatusCode, body: &str) -> Arc<Self> {
        let transport = Self::default();
        transport
            .replies
            .lock()
            .expect("lock")
            .push_back(Ok((status, body.to_owned())));
        Arc::new(transport)
    }

    pub fn failing(message: &str) -> Arc<Self> {
        let transport = Self::default();
        transport
            .replies
            .lock()
            .expect("lock")
            .push_back(Err(message.to_owned()));
        Arc::new(transport)
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().expect("lock")
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn post(&self, _request: HttpRequest) -> Result<HttpResponse, TransportFailure> {
        *self.calls.lock().expect("lock") += 1;
        match self.replies.lock().expect("lock").pop_front() {
            Some(Ok((status, body))) => Ok(HttpResponse {
                status,
                body,
                headers: HeaderMap::new(),
            }),
            Some(Err(message)) => Err(TransportFailure::new(message)),
            None => Err(TransportFailure::new("no reply scripted")),
        }
    }
}

pub fn client_for(transport: Arc<ScriptedTransport>) -> RpcClient {
    RpcClient::with_transport(&RpcConfig::new("http://127.0.0.1:18443"), transport)
        .expect("client must construct")
}
