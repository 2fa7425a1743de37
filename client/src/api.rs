use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use std::fmt;

use crate::endpoints::Operation;
use crate::error::ApiError;
use crate::http_client::HttpExecutor;
use crate::mock::MockProvider;

/// Per-call request configuration. Every field is optional; the executor
/// falls back to the operation's default method and an empty body.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub method: Option<Method>,
    pub body: Option<Value>,
    pub headers: HeaderMap,
    /// Node id for operations routed per node.
    pub node: Option<String>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    pub fn node(mut self, node: impl Into<String>) -> Self {
        self.node = Some(node.into());
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self, ApiError> {
        self.body = Some(serde_json::to_value(body).map_err(ApiError::Encode)?);
        Ok(self)
    }
}

/// Anything that can answer a backend operation with a JSON payload.
#[async_trait]
pub trait MeshApi: Send + Sync {
    async fn call(&self, op: Operation, options: RequestOptions) -> Result<Value, ApiError>;
}

/// Backend selected at startup: the live orchestrator or canned data.
#[derive(Clone)]
pub enum Backend {
    Http(HttpExecutor),
    Mock(MockProvider),
}

impl Backend {
    pub fn is_mock(&self) -> bool {
        matches!(self, Backend::Mock(_))
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Http(http) => write!(f, "orchestrator at {}", http.endpoints().base_url()),
            Backend::Mock(_) => f.write_str("mock backend"),
        }
    }
}

#[async_trait]
impl MeshApi for Backend {
    async fn call(&self, op: Operation, options: RequestOptions) -> Result<Value, ApiError> {
        match self {
            Backend::Http(http) => http.call(op, options).await,
            Backend::Mock(mock) => mock.call(op, options).await,
        }
    }
}
