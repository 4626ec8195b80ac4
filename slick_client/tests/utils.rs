#![allow(dead_code)]

use axum::Router;
use tokio::net::TcpListener;

/// Chat completion stream for `content`, one chunk per word, the way
/// llama.cpp sends it.
pub fn chat_chunks(content: &str) -> Vec<String> {
    let mut chunks =
        vec!["data: {\"choices\":[{\"index\":0,\"delta\":{\"role\":\"assistant\"}}]}\n\n".to_string()];
    for (i, word) in content.split(' ').enumerate() {
        let piece = if i == 0 {
            word.to_string()
        } else {
            format!(" {word}")
        };
        let delta = serde_json::json!({"choices": [{"index": 0, "delta": {"content": piece}}]});
        chunks.push(format!("data: {delta}\n\n"));
    }
    chunks.push("data: [DONE]\n\n".to_string());
    chunks
}

/// Serves the router on an ephemeral port and returns its base URL.
pub async fn serve(router: Router) -> Result<String, Box<dyn std::error::Error>> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move { axum::serve(listener, router).await });
    Ok(format!("http://{addr}"))
}
