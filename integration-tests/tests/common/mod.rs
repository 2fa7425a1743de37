use axum::{
    extract::{Path, Request, State},
    http::{HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use mesh_dashboard_client::{AdapterType, EndpointTable, HttpExecutor};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;

/// How the stub answers every route, on top of its normal behavior.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Behavior {
    #[default]
    Normal,
    /// 200 with `success: false`
    Unsuccessful,
    /// 200 with `success: true` and no payload
    EmptyData,
    /// 200 with a body that is not JSON
    NotJson,
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub headers: HeaderMap,
}

#[derive(Debug, Default)]
pub struct StubState {
    pub running: bool,
    pub nodes: Vec<Value>,
    pub behavior: Behavior,
    pub requests: Vec<RecordedRequest>,
    pub last_body: Option<Value>,
}

type Shared = Arc<Mutex<StubState>>;

/// In-process orchestrator speaking the mesh HTTP API on an ephemeral port.
pub struct StubOrchestrator {
    pub addr: SocketAddr,
    state: Shared,
    handle: JoinHandle<()>,
}

impl StubOrchestrator {
    pub async fn start() -> Self {
        let state: Shared = Arc::new(Mutex::new(StubState {
            running: true,
            nodes: default_nodes(),
            ..Default::default()
        }));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind stub orchestrator");
        let addr = listener.local_addr().unwrap();
        let app = router(state.clone());

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            state,
            handle,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    pub fn executor(&self) -> HttpExecutor {
        let endpoints = EndpointTable::new(&self.base_url()).unwrap();
        HttpExecutor::new(endpoints).unwrap()
    }

    pub fn set_behavior(&self, behavior: Behavior) {
        self.state.lock().unwrap().behavior = behavior;
    }

    pub fn set_running(&self, running: bool) {
        self.state.lock().unwrap().running = running;
    }

    pub fn is_running(&self) -> bool {
        self.state.lock().unwrap().running
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn last_body(&self) -> Option<Value> {
        self.state.lock().unwrap().last_body.clone()
    }
}

impl Drop for StubOrchestrator {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Nodes in the dashboard's `Node` record shape. `lastSeen` is RFC 3339 text,
/// the way Go encodes `time.Time`; the rest of the record is not the
/// orchestrator's own `NodeInfo` layout.
fn default_nodes() -> Vec<Value> {
    vec![
        json!({
            "mac": "AA:BB:CC:DD:EE:FF",
            "name": "kitchen",
            "online": true,
            "lastSeen": "2023-08-30T12:53:20Z",
            "adapterType": 0,
        }),
        json!({
            "mac": "11:22:33:44:55:66",
            "name": "garage",
            "online": false,
            "lastSeen": "2023-08-30T12:36:40.5Z",
            "adapterType": 3,
        }),
    ]
}

fn router(state: Shared) -> Router {
    Router::new()
        // Node management
        .route("/nodes", get(get_nodes))
        .route("/nodes/configure-all", post(configure_all))
        .route("/nodes/:mac", get(get_node))
        .route("/nodes/:mac/configure", post(configure_node))
        // Health and monitoring
        .route("/health/request", post(request_health))
        .route("/status", get(get_status))
        // Data broadcasting
        .route("/broadcast", post(broadcast))
        // Server control
        .route("/server/start", post(start_server))
        .route("/server/stop", post(stop_server))
        .layer(middleware::from_fn_with_state(state.clone(), record))
        .with_state(state)
}

async fn record(State(state): State<Shared>, req: Request, next: Next) -> Response {
    state.lock().unwrap().requests.push(RecordedRequest {
        method: req.method().to_string(),
        path: req.uri().path().to_string(),
        headers: req.headers().clone(),
    });
    next.run(req).await
}

fn respond(state: &Shared, build: impl FnOnce(&mut StubState) -> (StatusCode, Value)) -> Response {
    let mut st = state.lock().unwrap();
    match st.behavior {
        Behavior::Normal => {
            let (status, body) = build(&mut *st);
            (status, Json(body)).into_response()
        }
        Behavior::Unsuccessful => (
            StatusCode::OK,
            Json(json!({"success": false, "error": "registry unavailable"})),
        )
            .into_response(),
        Behavior::EmptyData => (StatusCode::OK, Json(json!({"success": true}))).into_response(),
        Behavior::NotJson => (StatusCode::OK, "<html>maintenance</html>").into_response(),
    }
}

fn ok_data(data: Value) -> (StatusCode, Value) {
    (StatusCode::OK, json!({"success": true, "data": data}))
}

fn ok_message(message: String) -> (StatusCode, Value) {
    (StatusCode::OK, json!({"success": true, "message": message}))
}

fn error(status: StatusCode, message: &str) -> (StatusCode, Value) {
    (status, json!({"success": false, "error": message}))
}

fn adapter_name(body: &Value) -> String {
    let code = body["adapterType"]
        .as_i64()
        .and_then(|c| i32::try_from(c).ok())
        .unwrap_or(-1);
    AdapterType::from(code).to_string()
}

/// GET /nodes
async fn get_nodes(State(state): State<Shared>) -> Response {
    respond(&state, |st| ok_data(Value::Array(st.nodes.clone())))
}

/// GET /nodes/:mac
async fn get_node(State(state): State<Shared>, Path(mac): Path<String>) -> Response {
    respond(&state, |st| {
        match st.nodes.iter().find(|n| n["mac"] == json!(mac)) {
            Some(node) => ok_data(node.clone()),
            None => error(StatusCode::NOT_FOUND, "Node not found"),
        }
    })
}

/// POST /nodes/:mac/configure
async fn configure_node(
    State(state): State<Shared>,
    Path(mac): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    respond(&state, |st| {
        let msg = format!(
            "Node {} configured to adapter type {}",
            mac,
            adapter_name(&body)
        );
        st.last_body = Some(body);
        ok_message(msg)
    })
}

/// POST /nodes/configure-all
async fn configure_all(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    respond(&state, |st| {
        let msg = format!("All nodes configured to adapter type {}", adapter_name(&body));
        st.last_body = Some(body);
        ok_message(msg)
    })
}

/// POST /health/request
async fn request_health(State(state): State<Shared>) -> Response {
    respond(&state, |_| ok_message("Health reports requested".to_string()))
}

/// GET /status
async fn get_status(State(state): State<Shared>) -> Response {
    respond(&state, |st| {
        let online = st.nodes.iter().filter(|n| n["online"] == json!(true)).count();
        ok_data(json!({
            "running": st.running,
            "totalNodes": st.nodes.len(),
            "onlineNodes": online,
            "timestamp": time::OffsetDateTime::now_utc().unix_timestamp(),
        }))
    })
}

/// POST /broadcast
async fn broadcast(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    respond(&state, |st| {
        let len = body["data"].as_str().map(|s| s.len()).unwrap_or(0);
        st.last_body = Some(body.clone());
        ok_message(format!(
            "Data broadcasted to all nodes (encoded length: {})",
            len
        ))
    })
}

/// POST /server/start
async fn start_server(State(state): State<Shared>) -> Response {
    respond(&state, |st| {
        if st.running {
            return error(StatusCode::CONFLICT, "Server is already running");
        }
        st.running = true;
        ok_message("Mesh server started".to_string())
    })
}

/// POST /server/stop
async fn stop_server(State(state): State<Shared>) -> Response {
    respond(&state, |st| {
        if !st.running {
            return error(StatusCode::CONFLICT, "Server is not running");
        }
        st.running = false;
        ok_message("Mesh server stopped".to_string())
    })
}
