#![allow(dead_code)]

use axum::{
    Json, Router,
    body::Body,
    extract::State,
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::post,
};
use futures::stream;
use serde_json::Value;
use std::convert::Infallible;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

/// Canned server that answers every generation request with the same body,
/// sent one frame per chunk, and records what it was asked.
pub struct Stub {
    status: StatusCode,
    chunks: Vec<String>,
    requests: Mutex<Vec<(String, Value)>>,
}

impl Stub {
    pub fn new(chunks: &[&str]) -> Arc<Self> {
        Self::with_status(StatusCode::OK, chunks)
    }

    pub fn with_status(status: StatusCode, chunks: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            status,
            chunks: chunks.iter().map(|chunk| chunk.to_string()).collect(),
            requests: Mutex::new(vec![]),
        })
    }

    pub fn requests(&self) -> Vec<(String, Value)> {
        self.requests.lock().unwrap().clone()
    }

    pub fn router(self: &Arc<Self>) -> Router {
        Router::new()
            .route("/chat/completions", post(respond))
            .route("/completion", post(respond))
            .with_state(self.clone())
    }
}

async fn respond(State(stub): State<Arc<Stub>>, uri: Uri, Json(body): Json<Value>) -> Response {
    stub.requests
        .lock()
        .unwrap()
        .push((uri.path().to_string(), body));
    let chunks = stub.chunks.clone().into_iter().map(Ok::<_, Infallible>);
    (stub.status, Body::from_stream(stream::iter(chunks))).into_response()
}

/// Serves the router on an ephemeral port and returns its base URL.
pub async fn serve(router: Router) -> Result<String, Box<dyn std::error::Error>> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move { axum::serve(listener, router).await });
    Ok(format!("http://{addr}"))
}
