//! Advisor tests against a mock chat-completions endpoint.

use axum::http::HeaderMap;
use axum::routing::post;
use axum::{Json, Router};
use chrono::NaiveDate;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

use babymonitor::advisor::{Advisor, OpenAiCompatProvider, UNAVAILABLE_REPLY};
use babymonitor::monitor::{HistorySnapshot, LiveSnapshot, SensorReading};

#[derive(Default)]
struct Captured {
    body: Option<Value>,
    authorization: Option<String>,
}

async fn spawn_completions(reply: Value, captured: Arc<Mutex<Captured>>) -> String {
    let app = Router::new().route(
        "/v1/chat/completions",
        post(move |headers: HeaderMap, Json(body): Json<Value>| {
            let captured = captured.clone();
            let reply = reply.clone();
            async move {
                let mut slot = captured.lock().unwrap();
                slot.body = Some(body);
                slot.authorization = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string);
                Json(reply)
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{addr}/v1/chat/completions")
}

fn reading(hour: u32, value: f64) -> SensorReading {
    SensorReading::new(
        NaiveDate::from_ymd_opt(2025, 3, 19)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap(),
        value,
    )
}

fn live() -> LiveSnapshot {
    LiveSnapshot {
        temperature: reading(11, 23.0),
        humidity: reading(11, 64.0),
        gas: reading(11, 1.92),
    }
}

fn history() -> HistorySnapshot {
    HistorySnapshot {
        temperature: vec![reading(9, 22.0), reading(10, 22.5), reading(11, 23.0)],
        humidity: vec![reading(10, 60.0), reading(11, 64.0)],
        gas: vec![reading(10, 2.0), reading(11, 1.92)],
    }
}

#[tokio::test]
async fn test_recommendation_round_trip_over_http() {
    let captured = Arc::new(Mutex::new(Captured::default()));
    let reply = json!({
        "choices": [{"message": {"role": "assistant", "content": "  Ventilate in the morning.  "}}]
    });
    let url = spawn_completions(reply, captured.clone()).await;

    let provider = Arc::new(OpenAiCompatProvider::new(url, Some("test-key".to_string())));
    let advisor = Advisor::new(provider, "llama-3.1-8b-instant".to_string(), "Ethan".to_string());

    let text = advisor.recommendation(&live(), &history()).await;
    assert_eq!(text, "Ventilate in the morning.");

    let captured = captured.lock().unwrap();
    assert_eq!(captured.authorization.as_deref(), Some("Bearer test-key"));

    let body = captured.body.as_ref().unwrap();
    assert_eq!(body["model"], "llama-3.1-8b-instant");
    assert_eq!(body["temperature"], 0.7);
    assert_eq!(body["max_completion_tokens"], 300);
    assert_eq!(body["top_p"], 1.0);
    assert_eq!(body["messages"][0]["role"], "user");

    let prompt = body["messages"][0]["content"].as_str().unwrap();
    assert!(prompt.contains("Ethan"));
    assert!(prompt.contains("Temperature: 23.0°C"));
    assert!(prompt.contains("Humidity: 64.0%"));
    assert!(prompt.contains("Gas level: 1.92 ppa"));
    assert!(prompt.contains("Temperature: rising (22.5 → 23.0)"));
    assert!(prompt.contains("Humidity: rising (60.0 → 64.0)"));
    assert!(prompt.contains("Gas level: falling (2.0 → 1.9)"));
}

#[tokio::test]
async fn test_missing_choices_shape_yields_error_reply() {
    let captured = Arc::new(Mutex::new(Captured::default()));
    let url = spawn_completions(json!({"choices": []}), captured).await;

    let provider = Arc::new(OpenAiCompatProvider::new(url, None));
    let advisor = Advisor::new(provider, "llama-3.1-8b-instant".to_string(), "Ethan".to_string());

    let text = advisor.quick_observation(&live()).await;
    assert_eq!(text, UNAVAILABLE_REPLY);
}

#[tokio::test]
async fn test_transport_failure_yields_error_reply() {
    // Nothing listens on the discard port; the request is refused.
    let provider = Arc::new(OpenAiCompatProvider::new(
        "http://127.0.0.1:9/v1/chat/completions".to_string(),
        None,
    ));
    let advisor = Advisor::new(provider, "llama-3.1-8b-instant".to_string(), "Ethan".to_string());

    let text = advisor.recommendation(&live(), &history()).await;
    assert_eq!(text, UNAVAILABLE_REPLY);
}
