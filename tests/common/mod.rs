use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tokio::runtime::Runtime;

pub const PREVIEW_PATH: &str = "/api/invoices/preview-generation";
pub const GENERATE_PATH: &str = "/api/invoices/bulk-generate";

/// A request as seen by the mock backend
#[derive(Debug, Clone)]
pub struct Recorded {
    pub path: &'static str,
    pub authorization: Option<String>,
    pub body: Value,
}

#[derive(Clone)]
struct Shared {
    recorded: Arc<Mutex<Vec<Recorded>>>,
    preview: (StatusCode, Value),
    generate: (StatusCode, Value),
}

/// In-process billing backend answering both generation endpoints with
/// canned responses
pub struct MockBackend {
    _runtime: Runtime,
    pub url: String,
    recorded: Arc<Mutex<Vec<Recorded>>>,
}

impl MockBackend {
    pub fn start(preview: (u16, Value), generate: (u16, Value)) -> Self {
        let runtime = Runtime::new().unwrap();
        let recorded = Arc::new(Mutex::new(Vec::new()));

        let state = Shared {
            recorded: recorded.clone(),
            preview: (StatusCode::from_u16(preview.0).unwrap(), preview.1),
            generate: (StatusCode::from_u16(generate.0).unwrap(), generate.1),
        };

        let app = Router::new()
            .route(PREVIEW_PATH, post(preview_handler))
            .route(GENERATE_PATH, post(generate_handler))
            .with_state(state);

        let listener = runtime
            .block_on(tokio::net::TcpListener::bind("127.0.0.1:0"))
            .unwrap();
        let addr = listener.local_addr().unwrap();
        runtime.spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            _runtime: runtime,
            url: format!("http://{addr}"),
            recorded,
        }
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.recorded.lock().unwrap().clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| r.path == path)
            .collect()
    }
}

fn record(state: &Shared, path: &'static str, headers: &HeaderMap, body: Value) {
    let authorization = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    state.recorded.lock().unwrap().push(Recorded {
        path,
        authorization,
        body,
    });
}

async fn preview_handler(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    record(&state, PREVIEW_PATH, &headers, body);
    (state.preview.0, Json(state.preview.1.clone()))
}

async fn generate_handler(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    record(&state, GENERATE_PATH, &headers, body);
    (state.generate.0, Json(state.generate.1.clone()))
}
