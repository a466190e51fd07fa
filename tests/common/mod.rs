//! In-process stand-in for a CoreNLP server. It answers with recorded
//! responses for the sample text and records every request it receives.

#![allow(dead_code)]

use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::Router;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub const SAMPLE_TEXT: &str =
    "Chris Manning is a nice person. Chris wrote a simple sentence. He also gives oranges to people.";

const ANNOTATION: &str = include_str!("../fixtures/annotation.json");
const TOKENSREGEX: &str = include_str!("../fixtures/tokensregex.json");
const SEMGREX: &str = include_str!("../fixtures/semgrex.json");
const TREGEX: &str = include_str!("../fixtures/tregex.json");

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub query: HashMap<String, String>,
    pub content_type: Option<String>,
    pub authorization: Option<String>,
    pub body: String,
}

impl RecordedRequest {
    pub fn properties(&self) -> Value {
        serde_json::from_str(self.query.get("properties").expect("properties parameter")).unwrap()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Recorder {
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl Recorder {
    fn record(&self, path: &str, query: HashMap<String, String>, headers: &HeaderMap, body: String) {
        let header_value = |name: header::HeaderName| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        self.requests.lock().unwrap().push(RecordedRequest {
            path: path.to_string(),
            query,
            content_type: header_value(header::CONTENT_TYPE),
            authorization: header_value(header::AUTHORIZATION),
            body,
        });
    }

    pub fn last(&self) -> RecordedRequest {
        self.requests.lock().unwrap().last().cloned().expect("a recorded request")
    }
}

async fn annotate_handler(
    State(recorder): State<Recorder>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, String) {
    recorder.record("/", query.clone(), &headers, body.clone());

    if body == "FAIL" {
        return (StatusCode::INTERNAL_SERVER_ERROR, "annotator exploded".to_string());
    }

    let props: Value = query
        .get("properties")
        .and_then(|p| serde_json::from_str(p).ok())
        .unwrap_or(Value::Null);
    match props["outputFormat"].as_str() {
        Some("json") => (StatusCode::OK, ANNOTATION.to_string()),
        Some("text") => (StatusCode::OK, "Sentence #1 (7 tokens):\nChris Manning is a nice person.".to_string()),
        other => (StatusCode::BAD_REQUEST, format!("unexpected output format {:?}", other)),
    }
}

fn regex_route(path: &'static str, response: &'static str) -> axum::routing::MethodRouter<Recorder> {
    post(
        move |State(recorder): State<Recorder>,
              Query(query): Query<HashMap<String, String>>,
              headers: HeaderMap,
              body: String| async move {
            recorder.record(path, query, &headers, body);
            (StatusCode::OK, response.to_string())
        },
    )
}

pub async fn spawn_fake_server() -> (String, Recorder) {
    let recorder = Recorder::default();
    let app = Router::new()
        .route("/ping", get(|| async { "pong" }))
        .route("/", post(annotate_handler))
        .route("/tokensregex", regex_route("/tokensregex", TOKENSREGEX))
        .route("/semgrex", regex_route("/semgrex", SEMGREX))
        .route("/tregex", regex_route("/tregex", TREGEX))
        .with_state(recorder.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), recorder)
}
