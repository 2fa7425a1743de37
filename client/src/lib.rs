//! Typed client for the mesh orchestrator's HTTP API.
//!
//! Operations resolve through an [`EndpointTable`] and run on a
//! [`MeshApi`] backend, either [`HttpExecutor`] against a live orchestrator
//! or [`MockProvider`] with canned data. The [`loaders`] turn envelopes into
//! domain values or status-tagged [`ViewError`]s.

pub mod api;
pub mod endpoints;
pub mod error;
pub mod format;
pub mod http_client;
pub mod loaders;
pub mod mock;
pub mod types;

pub use api::{Backend, MeshApi, RequestOptions};
pub use endpoints::{Endpoint, EndpointTable, Operation, DEFAULT_BASE_URL};
pub use error::{ApiError, ViewError};
pub use http_client::HttpExecutor;
pub use loaders::ServerAction;
pub use mock::MockProvider;
pub use types::{AdapterType, ApiResponse, Node, ServerStatus, Timestamp};
