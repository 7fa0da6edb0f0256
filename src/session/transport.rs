// HTTP transport seam between the engine and the backend

use async_trait::async_trait;
use reqwest::{Client, Method};
use serde_json::Value;

use crate::common::EngineError;

/// One logical HTTP call, already resolved to a full URL.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    pub url: String,
    pub body: Option<Value>,
    pub bearer: Option<String>,
}

impl TransportRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            body: None,
            bearer: None,
        }
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }
}

/// Raw backend response. Status mapping to the typed taxonomy happens in
/// the session manager, after the 401 refresh protocol has run.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Value,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, EngineError> {
        serde_json::from_value(self.body.clone()).map_err(|e| EngineError::Api {
            status: self.status,
            message: format!("malformed response body: {}", e),
        })
    }

    /// Best-effort extraction of the backend's error text.
    pub fn error_message(&self) -> String {
        for key in ["error", "message", "detail", "details"] {
            if let Some(msg) = self.body.get(key).and_then(|v| v.as_str()) {
                return msg.to_string();
            }
        }
        self.body.to_string()
    }
}

/// Transport abstraction so the session manager and stores can be tested
/// against scripted responses instead of a live backend.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Issues the call and returns whatever the backend answered, including
    /// non-2xx statuses. `Err` is reserved for transport-level failures
    /// (connection refused, timeout), which are never retried automatically.
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, EngineError>;
}

/// Production transport backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, EngineError> {
        let mut builder = self.client.request(request.method, &request.url);
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.json::<Value>().await.unwrap_or(Value::Null);

        Ok(TransportResponse { status, body })
    }
}
