//! End-to-end tests over a served router: raw HTTP against an ephemeral
//! listener, the way a field device or consumer would see the service.

use std::net::SocketAddr;
use std::sync::Arc;

use chrono::Duration;
use fleet_track::http::{AppState, router};
use fleet_track::provider::BearerGate;
use pretty_assertions::assert_eq;
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracking::clock::{SharedClock, SystemClock};
use tracking::fleet::FleetDirectory;
use tracking::ingest::IngestGateway;
use tracking::query::QueryService;
use tracking::store::PositionStore;

const TOKEN: &str = "it-test-token";

async fn serve() -> SocketAddr {
    let clock: SharedClock = Arc::new(SystemClock);
    let store = Arc::new(PositionStore::new(Arc::clone(&clock), Duration::seconds(60)));
    let fleet = FleetDirectory::from_assignments([(
        "BUS01".to_string(),
        "Route A - Main Campus".to_string(),
    )]);
    let gateway = IngestGateway::new(Arc::clone(&store), fleet);
    let queries = QueryService::new(Arc::clone(&store), clock, Duration::seconds(30));
    let gate = Arc::new(BearerGate::with_tokens([TOKEN]));

    let app = router(AppState::new(gateway, queries, store, gate));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move { axum::serve(listener, app).await.expect("serve app") });
    addr
}

async fn send_raw(
    addr: SocketAddr, method: &str, path: &str, headers: &[(&str, &str)], body: Option<&str>,
) -> (u16, Value) {
    let mut stream = tokio::net::TcpStream::connect(addr).await.expect("connect server");
    let mut req = format!("{method} {path} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n");
    for (name, value) in headers {
        req.push_str(&format!("{name}: {value}\r\n"));
    }
    if let Some(body) = body {
        req.push_str("Content-Type: application/json\r\n");
        req.push_str(&format!("Content-Length: {}\r\n", body.len()));
    }
    req.push_str("\r\n");
    if let Some(body) = body {
        req.push_str(body);
    }
    stream.write_all(req.as_bytes()).await.expect("write request");
    let mut response = String::new();
    stream.read_to_string(&mut response).await.expect("read response");

    let (head, payload) =
        response.split_once("\r\n\r\n").expect("http response must have separator");
    let status = head
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|s| s.parse::<u16>().ok())
        .expect("http status");
    let json = if payload.is_empty() {
        Value::Null
    } else {
        serde_json::from_str(payload).expect("json body")
    };
    (status, json)
}

async fn get(addr: SocketAddr, path: &str, token: Option<&str>) -> (u16, Value) {
    let auth = token.map(|t| format!("Bearer {t}"));
    let headers: Vec<(&str, &str)> =
        auth.as_deref().map(|value| ("Authorization", value)).into_iter().collect();
    send_raw(addr, "GET", path, &headers, None).await
}

async fn ingest(addr: SocketAddr, body: &str) -> (u16, Value) {
    send_raw(addr, "POST", "/api/ingest", &[], Some(body)).await
}

#[tokio::test]
async fn ingest_then_read_round_trip() {
    let addr = serve().await;

    let (status, receipt) = ingest(
        addr,
        r#"{"id": "V1", "latitude": 12.97, "longitude": 77.59, "speed": 35}"#,
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(receipt["id"], "V1");
    assert!(receipt["receivedAt"].is_string());

    let (status, record) = get(addr, "/api/positions/V1", Some(TOKEN)).await;
    assert_eq!(status, 200);
    assert_eq!(record["id"], "V1");
    assert_eq!(record["latitude"], 12.97);
    assert_eq!(record["longitude"], 77.59);
    assert_eq!(record["speed"], 35.0);
    assert_eq!(record["heading"], 0.0);
    assert_eq!(record["status"], "Active");
    assert!(record.get("route").is_none());
}

#[tokio::test]
async fn invalid_reports_are_rejected_without_side_effects() {
    let addr = serve().await;

    let (status, body) =
        ingest(addr, r#"{"id": "V2", "latitude": 91, "longitude": 77.59}"#).await;
    assert_eq!(status, 400);
    assert_eq!(body["code"], "out_of_range");

    let (status, body) = ingest(addr, r#"{"id": "V2", "latitude": 12.97}"#).await;
    assert_eq!(status, 400);
    assert_eq!(body["code"], "missing_field");

    let (status, body) = ingest(addr, r#"{"id": "V2", "latitude": "#).await;
    assert_eq!(status, 400);
    assert_eq!(body["code"], "invalid_request");

    // nothing was written
    let (status, _) = get(addr, "/api/positions/V2", Some(TOKEN)).await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn capability_outcomes_are_distinct() {
    let addr = serve().await;

    let (status, body) = get(addr, "/api/positions", None).await;
    assert_eq!(status, 401);
    assert_eq!(body["code"], "missing_token");

    let (status, body) = get(addr, "/api/positions", Some("wrong")).await;
    assert_eq!(status, 403);
    assert_eq!(body["code"], "invalid_token");

    let (status, body) = get(addr, "/api/positions", Some(TOKEN)).await;
    assert_eq!(status, 200);
    assert!(body["items"].is_array());
}

#[tokio::test]
async fn search_matches_id_and_route_case_insensitively() {
    let addr = serve().await;
    ingest(addr, r#"{"id": "BUS01", "latitude": 12.97, "longitude": 77.59}"#).await;
    ingest(addr, r#"{"id": "V9", "latitude": 1.0, "longitude": 2.0}"#).await;

    let (status, body) = get(addr, "/api/search", Some(TOKEN)).await;
    assert_eq!(status, 400);
    assert_eq!(body["code"], "invalid_request");

    let (status, body) = get(addr, "/api/search?q=bus01", Some(TOKEN)).await;
    assert_eq!(status, 200);
    assert_eq!(body["items"].as_array().expect("items").len(), 1);
    assert_eq!(body["items"][0]["id"], "BUS01");
    assert_eq!(body["items"][0]["route"]["name"], "Route A - Main Campus");

    let (status, body) = get(addr, "/api/search?q=main%20campus", Some(TOKEN)).await;
    assert_eq!(status, 200);
    assert_eq!(body["items"].as_array().expect("items").len(), 1);
}

#[tokio::test]
async fn status_reports_liveness() {
    let addr = serve().await;
    ingest(addr, r#"{"id": "V1", "latitude": 12.97, "longitude": 77.59}"#).await;

    let (status, body) = get(addr, "/api/status/V1", Some(TOKEN)).await;
    assert_eq!(status, 200);
    assert_eq!(body["online"], true);
    assert!(body["secondsSinceUpdate"].as_i64().expect("elapsed") < 5);
    assert!(body["lastUpdate"].is_string());

    let (status, body) = get(addr, "/api/status/V404", Some(TOKEN)).await;
    assert_eq!(status, 404);
    assert_eq!(body["code"], "not_found");
}

#[tokio::test]
async fn health_needs_no_token() {
    let addr = serve().await;
    ingest(addr, r#"{"id": "V1", "latitude": 1.0, "longitude": 2.0}"#).await;

    let (status, body) = get(addr, "/api/health", None).await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "OK");
    assert_eq!(body["activeVehicles"], 1);
}
