use super::*;
use std::{io::Write as _, path::PathBuf, time::Duration};

use axum::{extract::Query, http::StatusCode, routing::post, Json, Router};
use description::{FALLBACK_DESCRIPTION, MISSING_KEY_DESCRIPTION};
use serde_json::{json, Value};
use shared::domain::Priority;
use tokio::{
    net::TcpListener,
    sync::{oneshot, Mutex},
};
use url::Url;

fn request() -> DescriptionRequest {
    DescriptionRequest {
        title: "Infiltração na laje".into(),
        location: "Bloco B, cobertura".into(),
        priority: Priority::High,
    }
}

async fn spawn_generate_server(
    status: StatusCode,
    reply: Value,
) -> (Url, oneshot::Receiver<(String, Value)>) {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let (tx, rx) = oneshot::channel();
    let tx = Arc::new(Mutex::new(Some(tx)));
    let app = Router::new().route(
        "/v1beta/models/*rest",
        post(
            move |Query(query): Query<std::collections::HashMap<String, String>>,
                  Json(body): Json<Value>| {
                let tx = tx.clone();
                let reply = reply.clone();
                async move {
                    if let Some(tx) = tx.lock().await.take() {
                        let _ = tx.send((query.get("key").cloned().unwrap_or_default(), body));
                    }
                    (status, Json(reply))
                }
            },
        ),
    );
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (
        Url::parse(&format!("http://{addr}")).expect("url"),
        rx,
    )
}

#[tokio::test]
async fn generates_description_from_candidate_text() {
    let (endpoint, seen) = spawn_generate_server(
        StatusCode::OK,
        json!({
            "candidates": [
                { "content": { "parts": [ { "text": " Laje com infiltração. " }, { "text": "Refazer impermeabilização." } ] } }
            ]
        }),
    )
    .await;
    let service = GeminiDescriptionService::new(endpoint, "test-model", Some("secret".into()));

    let text = service.generate(&request()).await;
    assert_eq!(text, "Laje com infiltração. Refazer impermeabilização.");

    let (key, body) = seen.await.expect("request captured");
    assert_eq!(key, "secret");
    let prompt = body["contents"][0]["parts"][0]["text"]
        .as_str()
        .expect("prompt");
    assert!(prompt.contains("Infiltração na laje"));
    assert!(prompt.contains("Bloco B, cobertura"));
    assert!(prompt.contains("Alta"));
}

#[tokio::test]
async fn service_errors_become_fallback_text() {
    let (endpoint, _seen) =
        spawn_generate_server(StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": "boom" })).await;
    let service = GeminiDescriptionService::new(endpoint, "test-model", Some("secret".into()));
    assert_eq!(service.generate(&request()).await, FALLBACK_DESCRIPTION);
}

#[tokio::test]
async fn empty_candidates_become_fallback_text() {
    let (endpoint, _seen) = spawn_generate_server(StatusCode::OK, json!({ "candidates": [] })).await;
    let service = GeminiDescriptionService::new(endpoint, "test-model", Some("secret".into()));
    assert_eq!(service.generate(&request()).await, FALLBACK_DESCRIPTION);
}

#[tokio::test]
async fn missing_key_skips_the_request() {
    let endpoint = Url::parse("http://127.0.0.1:9").expect("url");
    let service = GeminiDescriptionService::new(endpoint, "test-model", Some("  ".into()));
    assert_eq!(service.generate(&request()).await, MISSING_KEY_DESCRIPTION);
}

#[tokio::test]
async fn fixed_description_echoes_its_text() {
    let fixed = FixedDescription("texto".into());
    assert_eq!(fixed.generate(&request()).await, "texto");
}

fn write_temp(suffix: &str, bytes: &[u8]) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .expect("tempfile");
    file.write_all(bytes).expect("write");
    file
}

#[tokio::test]
async fn encodes_images_as_data_urls() {
    let file = write_temp(".png", b"\x89PNG");
    let encoded = DataUrlEncoder::default()
        .encode(file.path())
        .await
        .expect("encode");
    assert_eq!(encoded, "data:image/png;base64,iVBORw==");
}

#[tokio::test]
async fn rejects_non_images_and_oversized_files() {
    let text = write_temp(".txt", b"hello");
    assert!(DataUrlEncoder::default().encode(text.path()).await.is_err());

    let big = write_temp(".jpg", &[0u8; 32]);
    assert!(DataUrlEncoder::with_limit(16).encode(big.path()).await.is_err());
}

#[tokio::test]
async fn encode_all_skips_failures() {
    let good = write_temp(".jpg", b"jpeg");
    let paths = vec![
        good.path().to_path_buf(),
        PathBuf::from("/definitely/missing/photo.jpg"),
    ];
    let encoded = encode_all(&DataUrlEncoder::default(), &paths).await;
    assert_eq!(encoded.len(), 1);
    assert!(encoded[0].starts_with("data:image/jpeg;base64,"));
}

#[tokio::test]
async fn connectivity_probe_reports_reachability() {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, Router::new()).await;
    });

    let online = ConnectivityProbe::new(
        Url::parse(&format!("http://{addr}/")).expect("url"),
        Duration::from_secs(2),
    )
    .expect("probe");
    assert!(online.is_online().await, "a 404 still means reachable");

    let closed = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let closed_addr = closed.local_addr().expect("addr");
    drop(closed);
    let offline = ConnectivityProbe::new(
        Url::parse(&format!("http://{closed_addr}/")).expect("url"),
        Duration::from_millis(500),
    )
    .expect("probe");
    assert!(!offline.is_online().await);
}
