//! View loaders: one backend call each, unwrapped into domain values.
//!
//! An envelope with `success: false` becomes a 500, a successful envelope
//! without `data` becomes a 404, and executor failures keep their HTTP
//! status when they have one.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::info;

use crate::api::{MeshApi, RequestOptions};
use crate::endpoints::Operation;
use crate::error::ViewError;
use crate::types::{AdapterType, ApiResponse, BroadcastRequest, ConfigureRequest, Node, ServerStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerAction {
    Start,
    Stop,
}

impl ServerAction {
    pub fn operation(self) -> Operation {
        match self {
            ServerAction::Start => Operation::StartServer,
            ServerAction::Stop => Operation::StopServer,
        }
    }
}

/// Node list view.
pub async fn load_nodes(api: &dyn MeshApi) -> Result<Vec<Node>, ViewError> {
    fetch_data(api, Operation::GetNodes, RequestOptions::new()).await
}

/// Single node view, including the node's adapter type.
pub async fn load_node(api: &dyn MeshApi, mac: &str) -> Result<Node, ViewError> {
    fetch_data(api, Operation::GetNode, RequestOptions::new().node(mac)).await
}

/// Server status view.
pub async fn load_status(api: &dyn MeshApi) -> Result<ServerStatus, ViewError> {
    fetch_data(api, Operation::GetStatus, RequestOptions::new()).await
}

/// Start or stop the mesh server, then reload its status.
///
/// Submissions from separate clients are not ordered against each other;
/// the returned status is whatever the backend reports afterwards.
pub async fn server_action(
    api: &dyn MeshApi,
    action: ServerAction,
) -> Result<ServerStatus, ViewError> {
    let message = perform(api, action.operation(), RequestOptions::new()).await?;
    info!("{}", message);
    load_status(api).await
}

pub async fn configure_node(
    api: &dyn MeshApi,
    mac: &str,
    adapter: AdapterType,
) -> Result<String, ViewError> {
    let options = RequestOptions::new().node(mac).json(&ConfigureRequest {
        adapter_type: adapter.into(),
    })?;
    perform(api, Operation::ConfigureNode, options).await
}

pub async fn configure_all(api: &dyn MeshApi, adapter: AdapterType) -> Result<String, ViewError> {
    let options = RequestOptions::new().json(&ConfigureRequest {
        adapter_type: adapter.into(),
    })?;
    perform(api, Operation::ConfigureAllNodes, options).await
}

pub async fn request_health(api: &dyn MeshApi) -> Result<String, ViewError> {
    perform(api, Operation::RequestHealth, RequestOptions::new()).await
}

pub async fn broadcast(api: &dyn MeshApi, data_type: i32, data: Vec<u8>) -> Result<String, ViewError> {
    let options = RequestOptions::new().json(&BroadcastRequest { data_type, data })?;
    perform(api, Operation::BroadcastData, options).await
}

async fn fetch_data<T: DeserializeOwned>(
    api: &dyn MeshApi,
    op: Operation,
    options: RequestOptions,
) -> Result<T, ViewError> {
    let value = api.call(op, options).await?;
    unwrap_data(op, value)
}

async fn perform(api: &dyn MeshApi, op: Operation, options: RequestOptions) -> Result<String, ViewError> {
    let value = api.call(op, options).await?;
    unwrap_message(op, value)
}

/// Unwrap the `data` of a response envelope.
pub fn unwrap_data<T: DeserializeOwned>(op: Operation, value: Value) -> Result<T, ViewError> {
    let envelope = ApiResponse::<T>::from_value(value)?;
    if !envelope.success {
        return Err(ViewError::internal(
            envelope.error.unwrap_or_else(|| format!("{} failed", op)),
        ));
    }
    envelope
        .data
        .ok_or_else(|| ViewError::not_found(format!("{} returned no data", op)))
}

/// Unwrap the acknowledgement of an action envelope.
pub fn unwrap_message(op: Operation, value: Value) -> Result<String, ViewError> {
    let envelope = ApiResponse::<Value>::from_value(value)?;
    if !envelope.success {
        return Err(ViewError::internal(
            envelope.error.unwrap_or_else(|| format!("{} failed", op)),
        ));
    }
    Ok(envelope.message.unwrap_or_else(|| format!("{} succeeded", op)))
}
