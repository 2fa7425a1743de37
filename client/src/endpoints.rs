use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use reqwest::{Method, Url};
use std::fmt;
use std::str::FromStr;

use crate::error::ApiError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/";

/// Characters escaped in a node id before it is spliced into a path.
/// Colons stay literal so MAC addresses read naturally in the URL.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// A named backend capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Operation {
    GetNodes,
    GetNode,
    ConfigureNode,
    ConfigureAllNodes,
    RequestHealth,
    GetStatus,
    BroadcastData,
    StartServer,
    StopServer,
}

impl Operation {
    pub const ALL: [Operation; 9] = [
        Operation::GetNodes,
        Operation::GetNode,
        Operation::ConfigureNode,
        Operation::ConfigureAllNodes,
        Operation::RequestHealth,
        Operation::GetStatus,
        Operation::BroadcastData,
        Operation::StartServer,
        Operation::StopServer,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Operation::GetNodes => "getNodes",
            Operation::GetNode => "getNode",
            Operation::ConfigureNode => "configureNode",
            Operation::ConfigureAllNodes => "configureAllNodes",
            Operation::RequestHealth => "requestHealth",
            Operation::GetStatus => "getStatus",
            Operation::BroadcastData => "broadcastData",
            Operation::StartServer => "startServer",
            Operation::StopServer => "stopServer",
        }
    }

    /// The route registered for this operation.
    pub fn endpoint(self) -> Endpoint {
        match self {
            // node management
            Operation::GetNodes => Endpoint::Static("/nodes"),
            Operation::GetNode => Endpoint::PerNode(node_path),
            Operation::ConfigureNode => Endpoint::PerNode(configure_node_path),
            Operation::ConfigureAllNodes => Endpoint::Static("/nodes/configure-all"),
            // health and monitoring
            Operation::RequestHealth => Endpoint::Static("/health/request"),
            Operation::GetStatus => Endpoint::Static("/status"),
            // data broadcasting
            Operation::BroadcastData => Endpoint::Static("/broadcast"),
            // server control
            Operation::StartServer => Endpoint::Static("/server/start"),
            Operation::StopServer => Endpoint::Static("/server/stop"),
        }
    }

    /// Method the orchestrator routes this operation under.
    pub fn default_method(self) -> Method {
        match self {
            Operation::GetNodes | Operation::GetNode | Operation::GetStatus => Method::GET,
            _ => Method::POST,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Operation {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operation::ALL
            .into_iter()
            .find(|op| op.name() == s)
            .ok_or_else(|| ApiError::UnknownOperation(s.to_string()))
    }
}

/// Path template for one operation.
#[derive(Clone, Copy)]
pub enum Endpoint {
    Static(&'static str),
    PerNode(fn(&str) -> String),
}

impl Endpoint {
    pub fn is_parameterized(&self) -> bool {
        matches!(self, Endpoint::PerNode(_))
    }

    /// Resolve to a concrete path. Returns `None` when a node id is needed
    /// but was not supplied.
    pub fn resolve(&self, node: Option<&str>) -> Option<String> {
        match self {
            Endpoint::Static(path) => Some((*path).to_string()),
            Endpoint::PerNode(build) => node.map(*build),
        }
    }
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Static(path) => f.debug_tuple("Static").field(path).finish(),
            Endpoint::PerNode(_) => f.write_str("PerNode(..)"),
        }
    }
}

/// Ids that would collapse into a neighbouring route once the URL is
/// normalized: empty, `.` and `..`, including their percent-encoded forms.
fn is_dot_segment(node: &str) -> bool {
    let decoded = percent_decode_str(node).decode_utf8_lossy();
    matches!(decoded.as_ref(), "" | "." | "..")
}

fn encode_node(mac: &str) -> String {
    utf8_percent_encode(mac, PATH_SEGMENT).to_string()
}

fn node_path(mac: &str) -> String {
    format!("/nodes/{}", encode_node(mac))
}

fn configure_node_path(mac: &str) -> String {
    format!("/nodes/{}/configure", encode_node(mac))
}

/// Immutable mapping from operations to URLs on one backend host.
///
/// Built once at startup and handed to whatever issues requests.
#[derive(Debug, Clone)]
pub struct EndpointTable {
    base_url: Url,
    routes: [Endpoint; 9],
}

impl EndpointTable {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let mut url = Url::parse(base_url).map_err(|e| ApiError::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl {
                url: base_url.to_string(),
                reason: "URL cannot be used as a base".to_string(),
            });
        }
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }

        Ok(Self {
            base_url: url,
            routes: Operation::ALL.map(Operation::endpoint),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn endpoint(&self, op: Operation) -> Endpoint {
        self.routes[op.index()]
    }

    pub fn path(&self, op: Operation, node: Option<&str>) -> Result<String, ApiError> {
        let endpoint = self.endpoint(op);
        if let Some(id) = node.filter(|_| endpoint.is_parameterized()) {
            if is_dot_segment(id) {
                return Err(ApiError::InvalidNode(op, id.to_string()));
            }
        }
        endpoint.resolve(node).ok_or(ApiError::MissingNode(op))
    }

    pub fn url(&self, op: Operation, node: Option<&str>) -> Result<Url, ApiError> {
        let path = self.path(op, node)?;
        // Relative join keeps any path prefix on the base URL.
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ApiError::InvalidUrl {
                url: format!("{}{}", self.base_url, path),
                reason: e.to_string(),
            })
    }
}

impl Default for EndpointTable {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
            routes: Operation::ALL.map(Operation::endpoint),
        }
    }
}
