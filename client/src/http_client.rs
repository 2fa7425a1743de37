use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::api::{MeshApi, RequestOptions};
use crate::endpoints::{EndpointTable, Operation};
use crate::error::ApiError;

/// Error body the orchestrator sends alongside a non-2xx status.
#[derive(Debug, Clone, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// Executes operations against a live orchestrator.
///
/// One attempt per call: no retries, no timeout, no cancellation.
#[derive(Clone)]
pub struct HttpExecutor {
    endpoints: Arc<EndpointTable>,
    http: reqwest::Client,
    user_agent: String,
}

impl HttpExecutor {
    pub fn new(endpoints: EndpointTable) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder().build()?;

        Ok(Self {
            endpoints: Arc::new(endpoints),
            http,
            user_agent: format!("meshctl/{}", env!("CARGO_PKG_VERSION")),
        })
    }

    pub fn endpoints(&self) -> &EndpointTable {
        &self.endpoints
    }
}

#[async_trait]
impl MeshApi for HttpExecutor {
    async fn call(&self, op: Operation, options: RequestOptions) -> Result<Value, ApiError> {
        let url = self.endpoints.url(op, options.node.as_deref())?;
        let method = options.method.unwrap_or_else(|| op.default_method());

        let req_id = Uuid::new_v4().to_string();
        let mut req = self.http.request(method.clone(), url.clone());
        req = req.header("user-agent", &self.user_agent);
        req = req.header("x-request-id", &req_id);

        for (k, v) in options.headers.iter() {
            req = req.header(k, v);
        }

        if let Some(b) = &options.body {
            req = req.json(b);
        }

        debug!("HTTP {} {} ({}, request_id={})", method, url, op, req_id);
        let resp = req.send().await?;
        let status = resp.status();

        if !status.is_success() {
            // Keep the backend's error text when it sent an envelope.
            let bytes = resp.bytes().await.unwrap_or_default();
            let detail = serde_json::from_slice::<ErrorBody>(&bytes)
                .ok()
                .and_then(|e| e.error);
            debug!("HTTP {} {} failed: status={}", method, url, status.as_u16());
            return Err(ApiError::Request {
                status: status.as_u16(),
                detail,
            });
        }

        let bytes = resp.bytes().await?;
        serde_json::from_slice(&bytes).map_err(ApiError::Decode)
    }
}
