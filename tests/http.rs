use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use regression_playground::config::PlaygroundConfig;
use regression_playground::server::{serve, ConnectionLimits, SharedPlayground};
use regression_playground::Playground;
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

async fn start_server() -> (SocketAddr, SharedPlayground) {
    start_server_with(ConnectionLimits::default()).await
}

async fn start_server_with(limits: ConnectionLimits) -> (SocketAddr, SharedPlayground) {
    let config = PlaygroundConfig {
        initial_points: 40,
        ..Default::default()
    };
    let playground = Arc::new(Mutex::new(Playground::new(config, StdRng::seed_from_u64(3))));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(serve(listener, Arc::clone(&playground), limits));
    (addr, playground)
}

/// Sends one request and returns `(status, headers, body)`.
async fn call(addr: SocketAddr, method: &str, path: &str, body: &str) -> (u16, String, String) {
    let raw = format!(
        "{method} {path} HTTP/1.1\r\nHost: localhost\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{body}",
        body.len()
    );
    send_raw(addr, &raw).await
}

/// Writes `raw` as-is and reads the response until the server closes.
async fn send_raw(addr: SocketAddr, raw: &str) -> (u16, String, String) {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(raw.as_bytes()).await.unwrap();

    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();
    let (head, body) = response.split_once("\r\n\r\n").unwrap();
    let status = head.split_whitespace().nth(1).unwrap().parse().unwrap();
    (status, head.to_string(), body.to_string())
}

#[tokio::test]
async fn point_crud_over_http() {
    let (addr, playground) = start_server().await;

    let (status, head, body) = call(addr, "POST", "/add_point", r#"{"x": 2.5, "y": -1}"#).await;
    assert_eq!(status, 200);
    assert!(head.contains("Access-Control-Allow-Origin: *"));
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["message"], "Point added");
    assert_eq!(json["point"]["id"], 41);

    let (status, _, _) = call(addr, "DELETE", "/delete_point/41", "").await;
    assert_eq!(status, 200);
    let (status, _, body) = call(addr, "DELETE", "/delete_point/41", "").await;
    assert_eq!(status, 404);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["error"], "not_found");

    let (status, _, _) = call(addr, "DELETE", "/delete_last_point", "").await;
    assert_eq!(status, 200);
    assert_eq!(playground.lock().store().len(), 39);

    let (_, _, body) = call(addr, "GET", "/points", "").await;
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["points"].as_array().unwrap().len(), 39);
}

#[tokio::test]
async fn reset_noise_and_train_over_http() {
    let (addr, _) = start_server().await;

    let (status, _, body) = call(
        addr,
        "POST",
        "/reset_points",
        r#"{"noiseLevel": 0, "numPoints": 20, "degree": 2}"#,
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(serde_json::from_str::<Value>(&body).unwrap()["message"], "Points reset");

    let (status, _, body) = call(addr, "POST", "/update_noise", r#"{"noiseLevel": 0.2}"#).await;
    assert_eq!(status, 200);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["points"].as_array().unwrap().len(), 20);

    let (status, _, body) = call(
        addr,
        "POST",
        "/train_model",
        r#"{"degree": 2, "trainRatio": 50, "loss_function": "MSE",
            "regularizationType": "L2", "iterations": 50, "learningRate": 0.05}"#,
    )
    .await;
    assert_eq!(status, 200);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["train_data"].as_array().unwrap().len(), 10);
    assert_eq!(json["test_data"].as_array().unwrap().len(), 10);
    assert_eq!(json["training_history"].as_array().unwrap().len(), 50);
    assert_eq!(json["loss_function"], "MSE");
    assert_eq!(json["final_model"]["step"], 49);
    assert_eq!(json["final_model"]["weights"].as_array().unwrap().len(), 3);
    assert!(json["equation"].as_str().unwrap().starts_with("y = "));
    assert!(json["reference"].is_null());
}

#[tokio::test]
async fn bad_requests_map_to_statuses() {
    let (addr, _) = start_server().await;

    let (status, _, body) = call(addr, "POST", "/train_model", r#"{"degree": 25}"#).await;
    assert_eq!(status, 400);
    assert_eq!(
        serde_json::from_str::<Value>(&body).unwrap()["error"],
        "configuration_error"
    );

    let (status, _, _) = call(addr, "POST", "/train_model", r#"{"trainRatio": 0}"#).await;
    assert_eq!(status, 422);

    let (status, _, body) = call(addr, "POST", "/update_noise", "[1, 2").await;
    assert_eq!(status, 400);
    assert_eq!(serde_json::from_str::<Value>(&body).unwrap()["error"], "invalid_body");

    let (status, _, _) = call(addr, "GET", "/unknown", "").await;
    assert_eq!(status, 404);

    let (status, head, body) = call(addr, "OPTIONS", "/train_model", "").await;
    assert_eq!(status, 204);
    assert!(head.contains("Access-Control-Allow-Methods"));
    assert!(body.is_empty());
}

#[tokio::test]
async fn chunked_bodies_are_refused_not_ignored() {
    let (addr, playground) = start_server().await;
    let body = r#"{"iterations": 0}"#;
    let raw = format!(
        "POST /train_model HTTP/1.1\r\nHost: localhost\r\nTransfer-Encoding: chunked\r\n\r\n{:x}\r\n{body}\r\n0\r\n\r\n",
        body.len()
    );
    let (status, _, body) = send_raw(addr, &raw).await;
    assert_eq!(status, 400);
    assert_eq!(
        serde_json::from_str::<Value>(&body).unwrap()["error"],
        "configuration_error"
    );
    assert!(playground.lock().splitter().cached().is_none());
}

#[tokio::test]
async fn stalled_request_times_out() {
    let (addr, _) = start_server_with(ConnectionLimits {
        max_body: 1 << 20,
        read_timeout: Duration::from_millis(200),
    })
    .await;

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"POST /add_point HTTP/1.1\r\nContent-Length: 50\r\n\r\n{\"x\"")
        .await
        .unwrap();

    let mut response = String::new();
    tokio::time::timeout(Duration::from_secs(5), stream.read_to_string(&mut response))
        .await
        .expect("server kept the stalled connection open")
        .unwrap();
    assert!(response.starts_with("HTTP/1.1 408 Request Timeout\r\n"), "{response}");
    assert!(response.contains("request_timeout"));
}
