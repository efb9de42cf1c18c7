use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use faqroute_core::{
    ChatCompletionsProvider, CompletionProvider, FaqError, Persona, ProviderChain,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

#[derive(Clone, Default)]
struct Seen {
    requests: Arc<Mutex<Vec<(Option<String>, Value)>>>,
}

async fn completions(
    State(seen): State<Seen>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    seen.requests.lock().unwrap().push((auth, body.clone()));

    if body["model"] == "quota-exceeded" {
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({"error": {"message": "quota"}})),
        );
    }
    if body["model"] == "no-choices" {
        return (StatusCode::OK, Json(json!({"choices": []})));
    }

    let prompt = body["messages"]
        .as_array()
        .and_then(|m| m.last())
        .and_then(|m| m["content"].as_str())
        .unwrap_or_default()
        .to_string();
    (
        StatusCode::OK,
        Json(json!({
            "choices": [{"message": {"role": "assistant", "content": format!("echo: {prompt}")}}]
        })),
    )
}

async fn spawn_server() -> (String, Seen) {
    let seen = Seen::default();
    let app = Router::new()
        .route("/v1/chat/completions", post(completions))
        .with_state(seen.clone());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}/v1/"), seen)
}

#[tokio::test]
async fn sends_bearer_auth_and_persona() {
    let (base_url, seen) = spawn_server().await;
    let provider = ChatCompletionsProvider::new(reqwest::Client::new(), &base_url, "sk-test", "m")
        .with_persona(Persona::new("Router Agent", "Route.", "You route."));

    let text = provider.complete("Classify this").await.unwrap();

    assert_eq!(text, "echo: Classify this");
    let requests = seen.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    let (auth, body) = &requests[0];
    assert_eq!(auth.as_deref(), Some("Bearer sk-test"));
    assert_eq!(body["model"], "m");
    assert_eq!(body["messages"][0]["role"], "system");
    assert_eq!(body["messages"][1]["role"], "user");
}

#[tokio::test]
async fn error_status_and_empty_choices_are_errors() {
    let (base_url, _seen) = spawn_server().await;
    let client = reqwest::Client::new();

    let quota = ChatCompletionsProvider::new(client.clone(), &base_url, "k", "quota-exceeded");
    assert!(matches!(
        quota.complete("p").await.unwrap_err(),
        FaqError::Http(_)
    ));

    let empty = ChatCompletionsProvider::new(client, &base_url, "k", "no-choices");
    assert!(matches!(
        empty.complete("p").await.unwrap_err(),
        FaqError::EmptyCompletion(_)
    ));
}

#[tokio::test]
async fn chain_falls_back_to_secondary_model() {
    let (base_url, seen) = spawn_server().await;
    let client = reqwest::Client::new();
    let chain = ProviderChain::default()
        .then(Arc::new(ChatCompletionsProvider::new(
            client.clone(),
            &base_url,
            "k",
            "quota-exceeded",
        )))
        .then(Arc::new(ChatCompletionsProvider::new(
            client, &base_url, "k", "backup",
        )));

    let text = chain.complete("hello").await.unwrap();

    assert_eq!(text, "echo: hello");
    let models: Vec<Value> = seen
        .requests
        .lock()
        .unwrap()
        .iter()
        .map(|(_, body)| body["model"].clone())
        .collect();
    assert_eq!(models, vec![json!("quota-exceeded"), json!("backup")]);
}

#[tokio::test]
async fn unreachable_endpoint_is_an_http_error() {
    let provider = ChatCompletionsProvider::new(
        reqwest::Client::new(),
        "http://127.0.0.1:9/v1",
        "k",
        "m",
    );
    assert!(matches!(
        provider.complete("p").await.unwrap_err(),
        FaqError::Http(_)
    ));
}
