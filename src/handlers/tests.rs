//! Router tests: full HTTP round trip against a stub classifier.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
};
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::logic::model::ModelState;
use crate::logic::scoring::tests::StubClassifier;
use crate::{create_router, AppState, Config};

fn app(model: ModelState, debug_mode: bool) -> axum::Router {
    let config = Config {
        debug_mode,
        ..Config::default()
    };
    create_router(AppState::new(config, model))
}

fn stub(p_attack: f64) -> ModelState {
    ModelState::Loaded(Arc::new(StubClassifier::new(p_attack)))
}

async fn post_predict(app: axum::Router, body: impl Into<Body>) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/predict")
                .header("content-type", "application/json")
                .body(body.into())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn get_json(app: axum::Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn flow() -> String {
    json!([
        {"timestamp": "2024-03-01T12:00:00", "src_ip": "192.168.1.10", "dst_ip": "10.0.0.1", "src_port": 51000, "dst_port": 80},
        {"timestamp": "2024-03-01T12:00:00.000400", "src_ip": "10.0.0.1", "dst_ip": "192.168.1.10", "src_port": 80, "dst_port": 51000},
        {"timestamp": "2024-03-01T12:00:00.001000", "src_ip": "192.168.1.10", "dst_ip": "10.0.0.1", "src_port": 51000, "dst_port": 80},
    ])
    .to_string()
}

#[tokio::test]
async fn test_predict_attack() {
    let (status, body) = post_predict(app(stub(0.06), false), flow()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"prediction": 1, "is_attack": true}));
}

#[tokio::test]
async fn test_predict_benign() {
    let (status, body) = post_predict(app(stub(0.01), false), flow()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"prediction": 0, "is_attack": false}));
}

#[tokio::test]
async fn test_predict_debug_details() {
    let (status, body) = post_predict(app(stub(0.2), true), flow()).await;

    assert_eq!(status, StatusCode::OK);
    let details = &body["details"];
    assert_eq!(details["threshold"], json!(0.05));
    assert_eq!(details["probabilities"][1], json!(0.2));
    assert_eq!(details["dropped_packets"], json!(0));

    let features = details["features"].as_object().unwrap();
    assert_eq!(features.len(), 12);
    assert_eq!(features["Flow Duration"], json!(1000.0));
    assert_eq!(features["Fwd IAT Total"], json!(1000.0));
}

#[tokio::test]
async fn test_predict_empty() {
    let (status, body) = post_predict(app(stub(0.5), false), "[]").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Empty packet data"}));
}

#[tokio::test]
async fn test_predict_missing_fields() {
    let payload = json!([
        {"timestamp": "2024-03-01T12:00:00", "src_ip": "a", "dst_ip": "b", "src_port": 1}
    ])
    .to_string();

    let (status, body) = post_predict(app(stub(0.5), false), payload).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Missing required fields in packet: dst_port"}));
}

#[tokio::test]
async fn test_predict_malformed_json() {
    let (status, body) = post_predict(app(stub(0.5), false), "[{\"timestamp\": ").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = body["error"].as_str().unwrap();
    assert!(message.starts_with("Invalid data format: "), "{}", message);
}

#[tokio::test]
async fn test_predict_model_unavailable() {
    let model = ModelState::Unavailable { reason: "model not found".into() };
    let (status, body) = post_predict(app(model, false), flow()).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body, json!({"error": "Model not loaded. Check server logs."}));
}

#[tokio::test]
async fn test_model_unavailable_before_body_checks() {
    for body in ["", "[]", "[{\"timestamp\": ", "{\"not\": \"packets\"}"] {
        let model = ModelState::Unavailable { reason: "model not found".into() };
        let (status, response) = post_predict(app(model, false), body).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE, "body {:?}", body);
        assert_eq!(response, json!({"error": "Model not loaded. Check server logs."}));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_predictions() {
    let state = AppState::new(Config::default(), stub(0.9));
    let router = create_router(state.clone());

    let handles: Vec<_> = (0..8)
        .map(|_| tokio::spawn(post_predict(router.clone(), flow())))
        .collect();

    for handle in handles {
        let (status, body) = handle.await.unwrap();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"prediction": 1, "is_attack": true}));
    }
    assert_eq!(state.scoring.engine_status().inference_count, 8);
}

#[tokio::test]
async fn test_health() {
    let (status, body) = get_json(app(stub(0.5), false), "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["model_loaded"], true);
}

#[tokio::test]
async fn test_model_status() {
    let model = ModelState::Unavailable { reason: "model not found: x.onnx".into() };
    let (status, body) = get_json(app(model, false), "/model/status").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["model_loaded"], false);
    assert_eq!(body["unavailable_reason"], "model not found: x.onnx");
    assert_eq!(body["threshold"], json!(0.05));
    assert_eq!(body["idle_threshold_us"], json!(500000.0));
    assert_eq!(body["layout"]["feature_count"], 12);
    assert_eq!(body["layout"]["feature_names"][0], "Fwd IAT Std");
}
