//! In-memory [`Transport`] for unit tests.

use crate::domain::ports::{ApiRequest, ApiResponse, Transport};
use crate::utils::error::{ClientError, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone, Default)]
pub(crate) struct MockTransport {
    responses: Arc<Mutex<VecDeque<Result<ApiResponse>>>>,
    requests: Arc<Mutex<Vec<ApiRequest>>>,
}

impl MockTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn respond(self, status: u16, body: impl Into<String>) -> Self {
        self.push(Ok(ApiResponse::new(status, body)))
    }

    pub(crate) fn respond_json(self, status: u16, body: serde_json::Value) -> Self {
        self.respond(status, body.to_string())
    }

    pub(crate) fn fail_with_io(self, message: &str) -> Self {
        self.push(Err(ClientError::Io(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            message.to_string(),
        ))))
    }

    fn push(self, outcome: Result<ApiResponse>) -> Self {
        self.responses
            .try_lock()
            .expect("mock transport is not shared yet")
            .push_back(outcome);
        self
    }

    pub(crate) async fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        self.requests.lock().await.push(request);
        self.responses
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Ok(ApiResponse::new(500, "no canned response")))
    }
}
