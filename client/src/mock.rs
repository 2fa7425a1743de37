use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::BTreeMap;

use crate::api::{MeshApi, RequestOptions};
use crate::endpoints::Operation;
use crate::error::ApiError;

/// Canned stand-in for the orchestrator, used while developing views.
///
/// Every answer is a full `{success, ...}` envelope so callers unwrap mock
/// and live payloads the same way. Request options are ignored.
#[derive(Debug, Clone, Default)]
pub struct MockProvider {
    overrides: BTreeMap<Operation, Value>,
    failing: bool,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// A provider that answers every operation with the canned error envelope.
    pub fn failing() -> Self {
        Self {
            overrides: BTreeMap::new(),
            failing: true,
        }
    }

    /// Replace the canned answer for one operation.
    pub fn with_response(mut self, op: Operation, response: Value) -> Self {
        self.overrides.insert(op, response);
        self
    }

    pub fn respond(&self, op: Operation) -> Value {
        if let Some(v) = self.overrides.get(&op) {
            return v.clone();
        }
        if self.failing {
            return error_response();
        }
        canned_response(op)
    }
}

#[async_trait]
impl MeshApi for MockProvider {
    async fn call(&self, op: Operation, _options: RequestOptions) -> Result<Value, ApiError> {
        Ok(self.respond(op))
    }
}

pub fn error_response() -> Value {
    json!({
        "success": false,
        "error": "This is an error message. Ohh no..",
    })
}

fn canned_response(op: Operation) -> Value {
    match op {
        Operation::GetNodes => json!({
            "success": true,
            "data": [
                {
                    "mac": "AA:BB:CC:DD:EE:FF",
                    "name": "Node 1",
                    "online": true,
                    "lastSeen": 1693400000,
                },
                {
                    "mac": "11:22:33:44:55:66",
                    "name": "Node 2",
                    "online": false,
                    "lastSeen": 1693399000,
                },
                {
                    "mac": "AA:BB:CC:44:55:66",
                    "name": "Node 3",
                    "online": true,
                    "lastSeen": 1693400000,
                },
                {
                    "mac": "DD:EE:FF:11:22:33",
                    "name": "Node 4",
                    "online": false,
                    "lastSeen": 1693399000,
                },
            ],
        }),
        Operation::GetNode => json!({
            "success": true,
            "data": {
                "mac": "AA:BB:CC:DD:EE:FF",
                "name": "Node 1",
                "online": true,
                "lastSeen": 1693400000,
                "adapterType": 1,
            },
        }),
        Operation::ConfigureNode => json!({
            "success": true,
            "message": "Node AA:BB:CC:DD:EE:FF configured to adapter type WiFi",
        }),
        Operation::ConfigureAllNodes => json!({
            "success": true,
            "message": "All nodes configured to adapter type Bluetooth",
        }),
        Operation::RequestHealth => json!({
            "success": true,
            "message": "Health reports requested",
        }),
        Operation::GetStatus => json!({
            "success": true,
            "data": {
                "running": true,
                "totalNodes": 5,
                "onlineNodes": 3,
                "timestamp": 1693400100,
            },
        }),
        Operation::BroadcastData => json!({
            "success": true,
            "message": "Data broadcasted to all nodes (type: WiFi, length: 128)",
        }),
        Operation::StartServer => json!({
            "success": true,
            "message": "Mesh server started",
        }),
        Operation::StopServer => json!({
            "success": true,
            "message": "Mesh server stopped",
        }),
    }
}
