//! End-to-end tests against a local fake handwriting service

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use studio_core::{
    ApiClient, ApiConfig, CaptureState, ClipboardError, ClipboardSink, EncodedImage, ErrorKind,
    LetterSession, Point, RenderDisplay, SandboxedDisplay, StatusLevel, StrokeSurface, Studio,
    SymbolSequence,
};

type Captured = Arc<Mutex<Vec<Value>>>;

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

async fn record(State(captured): State<Captured>, Json(body): Json<Value>) -> Json<Value> {
    captured.lock().unwrap().push(body);
    Json(json!({ "success": true, "message": "Letter saved" }))
}

#[derive(Clone, Default)]
struct MemoryClipboard(Arc<Mutex<Option<String>>>);

impl ClipboardSink for MemoryClipboard {
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        *self.0.lock().unwrap() = Some(text.to_string());
        Ok(())
    }
}

fn studio(base_url: &str, symbols: &str) -> (Studio, MemoryClipboard) {
    let clipboard = MemoryClipboard::default();
    let display = RenderDisplay::new(Box::new(SandboxedDisplay::new()), Box::new(clipboard.clone()));
    let client = ApiClient::new(ApiConfig::new(base_url).with_timeout_ms(2_000)).unwrap();
    let session = LetterSession::new(SymbolSequence::parse(symbols).unwrap());
    (Studio::new(client, StrokeSurface::default(), session, display), clipboard)
}

#[tokio::test]
async fn test_server_error_message_is_surfaced() {
    let app = Router::new().route(
        "/api/render",
        post(|| async {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "boom" })),
            )
        }),
    );
    let base = serve(app).await;
    let (mut studio, _) = studio(&base, "A");
    studio.set_text_input("hello");

    let err = studio.render_text().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Server);
    let status = studio.status().unwrap();
    assert_eq!(status.level, StatusLevel::Error);
    assert_eq!(status.text, "boom");
    assert!(!studio.display().has_content());
    assert!(!studio.is_busy());
}

#[tokio::test]
async fn test_unparseable_error_mentions_status() {
    let app = Router::new().route(
        "/api/render",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "<h1>Internal error</h1>") }),
    );
    let base = serve(app).await;
    let client = ApiClient::new(ApiConfig::new(&base)).unwrap();

    let err = client.render_text("hello").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Protocol);
    assert!(err.to_string().contains("500"), "{err}");
}

#[tokio::test]
async fn test_timeout_is_distinct_from_network_error() {
    let app = Router::new().route(
        "/health",
        get(|| async {
            tokio::time::sleep(Duration::from_millis(1_000)).await;
            "late"
        }),
    );
    let base = serve(app).await;
    let client = ApiClient::new(ApiConfig::new(&base).with_timeout_ms(100)).unwrap();
    let err = client.health_check().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Timeout);

    // A port that was just released refuses connections.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let client = ApiClient::new(ApiConfig::new(format!("http://{addr}"))).unwrap();
    let err = client.health_check().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Network);
}

#[tokio::test]
async fn test_plain_text_success_is_empty_result() {
    let app = Router::new().route("/health", get(|| async { "OK" }));
    let base = serve(app).await;
    let client = ApiClient::new(ApiConfig::new(&base)).unwrap();

    let result = client.health_check().await.unwrap();

    assert!(result.success);
    assert_eq!(result.status, 200);
    assert_eq!(result.payload, None);
}

#[tokio::test]
async fn test_save_letter_body() {
    let captured = Captured::default();
    let app = Router::new()
        .route("/api/save-letter", post(record))
        .with_state(captured.clone());
    let base = serve(app).await;
    let client = ApiClient::new(ApiConfig::new(&base)).unwrap();

    let result = client
        .save_letter('A', EncodedImage::from_data_url("data:image/png;base64,AAAA"))
        .await
        .unwrap();

    assert_eq!(result.message.as_deref(), Some("Letter saved"));
    assert_eq!(
        *captured.lock().unwrap(),
        vec![json!({ "letter": "A", "imageData": "data:image/png;base64,AAAA" })]
    );
}

#[tokio::test]
async fn test_drawing_flow_advances_session() {
    let captured = Captured::default();
    let app = Router::new()
        .route("/api/save-letter", post(record))
        .with_state(captured.clone());
    let base = serve(app).await;
    let (mut studio, _) = studio(&base, "AB");

    studio.begin_stroke(Point::new(20.0, 20.0)).unwrap();
    studio.extend_stroke(Point::new(120.0, 200.0)).unwrap();
    studio.end_stroke();
    assert!(!studio.surface().is_blank());

    studio.save_drawing().await.unwrap();

    assert_eq!(studio.session().state(), CaptureState::Capturing(1));
    assert_eq!(studio.session().current_symbol(), Some('B'));
    assert!(studio.surface().is_blank());

    let bodies = captured.lock().unwrap();
    assert_eq!(bodies.len(), 1);
    assert_eq!(bodies[0]["letter"], "A");
    assert!(bodies[0]["imageData"]
        .as_str()
        .unwrap()
        .starts_with("data:image/png;base64,"));
}

#[tokio::test]
async fn test_save_to_unreachable_service_keeps_drawing() {
    // Bind then release a port so nothing is listening on it
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let (mut studio, _) = studio(&format!("http://{addr}"), "AB");
    studio.begin_stroke(Point::new(20.0, 20.0)).unwrap();
    studio.extend_stroke(Point::new(120.0, 200.0)).unwrap();
    studio.end_stroke();

    let err = studio.save_drawing().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Network);
    assert_eq!(studio.session().state(), CaptureState::Capturing(0));
    assert!(!studio.surface().is_blank());
    assert_eq!(studio.status().unwrap().level, StatusLevel::Error);
    assert!(!studio.is_busy());
}

#[tokio::test]
async fn test_render_and_copy() {
    let app = Router::new().route(
        "/api/render",
        post(|Json(body): Json<Value>| async move {
            assert_eq!(body, json!({ "text": "Hi" }));
            Json(json!({
                "success": true,
                "html_content": "<div class=\"lines\"><img src=\"/images/letters/set1/blue/72.png\"/><img src=\"/images/letters/set1/blue/105.png\"/></div>"
            }))
        }),
    );
    let base = serve(app).await;
    let (mut studio, clipboard) = studio(&base, "A");

    let err = studio.copy_rendered_output().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Clipboard);
    assert_eq!(err.to_string(), "Nothing has been rendered yet");
    assert_eq!(*clipboard.0.lock().unwrap(), None);

    studio.set_text_input("Hi");
    studio.render_text().await.unwrap();
    studio.copy_rendered_output().unwrap();

    assert_eq!(clipboard.0.lock().unwrap().as_deref(), Some("Hi"));
}

#[tokio::test]
async fn test_blank_text_makes_no_request() {
    let captured = Captured::default();
    let app = Router::new()
        .route("/api/render", post(record))
        .with_state(captured.clone());
    let base = serve(app).await;
    let (mut studio, _) = studio(&base, "A");
    studio.set_text_input("  ");

    let err = studio.render_text().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(captured.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_dataset_sends_letter_list() {
    let captured = Captured::default();
    let app = Router::new()
        .route("/api/generate-test-dataset", post(record))
        .with_state(captured.clone());
    let base = serve(app).await;
    let (mut studio, _) = studio(&base, "xyz");

    studio.generate_dataset().await.unwrap();

    assert_eq!(*captured.lock().unwrap(), vec![json!({ "letterlist": "xyz" })]);
    assert_eq!(
        studio.status().unwrap().text,
        "Letter saved. Try rendering some text!"
    );
}
