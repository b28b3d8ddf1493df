use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use mindcare_portal::{
    ApiClient, AppConfig, AppState, RequestOptions, SessionStore,
    api::{HttpTransport, RecordingNotifier},
    create_router,
    models::{ApiResponse, FileAssociation, FileStatus, LoginRequest, UploadFile},
};
use serde_json::{Value, json};
use std::{sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower::util::ServiceExt;

fn app() -> Router {
    create_router(AppState::from_config(AppConfig::default()))
}

async fn read_envelope(response: axum::response::Response) -> ApiResponse<Value> {
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body_bytes).unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Serves the router on an ephemeral port and returns a client pointed at its API root.
async fn spawn_app() -> (ApiClient, Arc<RecordingNotifier>) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let address = listener.local_addr().unwrap();
    let router = app();

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    let transport = HttpTransport::new(format!("http://{}/api", address), Duration::from_secs(5))
        .expect("Failed to build HTTP transport");
    let notifier = Arc::new(RecordingNotifier::new());
    let client = ApiClient::new(Arc::new(transport), notifier.clone(), SessionStore::new());
    (client, notifier)
}

// --- Router (oneshot) ---

#[tokio::test]
async fn test_health_check() {
    let response = app()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&body[..], b"ok");
}

#[tokio::test]
async fn test_unregistered_route_is_http_404_with_envelope() {
    let response = app()
        .oneshot(
            Request::builder()
                .uri("/api/data-analytics/overview")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let envelope = read_envelope(response).await;
    assert_eq!(envelope.code, "404");
    assert!(envelope.data.is_none());
}

#[tokio::test]
async fn test_business_failure_keeps_http_200() {
    let response = app()
        .oneshot(json_request(
            "POST",
            "/api/user/login",
            json!({ "username": "admin", "password": "wrong" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let envelope = read_envelope(response).await;
    assert_eq!(envelope.code, "400");
}

#[tokio::test]
async fn test_login_token_authorizes_later_calls() {
    let app = app();

    let login = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/user/login",
            json!({ "username": "user001", "password": "123456" }),
        ))
        .await
        .unwrap();
    let envelope = read_envelope(login).await;
    assert_eq!(envelope.code, "200");
    let token = envelope.data.unwrap()["token"]
        .as_str()
        .unwrap()
        .to_string();

    let current = app
        .oneshot(
            Request::builder()
                .uri("/api/user/current")
                .header("Authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let envelope = read_envelope(current).await;
    assert_eq!(envelope.code, "200");
    assert_eq!(envelope.data.unwrap()["username"], "user001");
}

#[tokio::test]
async fn test_invalid_json_body_is_rejected() {
    let response = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/user/login")
                .header("Content-Type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(read_envelope(response).await.code, "400");
}

// --- Client over HTTP ---

#[tokio::test]
async fn test_client_login_over_http() {
    let (client, notifier) = spawn_app().await;

    let user = client
        .user()
        .login(
            &LoginRequest {
                username: "admin".to_string(),
                password: "123456".to_string(),
            },
            RequestOptions::default(),
        )
        .await
        .unwrap();

    assert_eq!(user.username, "admin");
    assert!(client.session().is_logged_in());
    assert_eq!(notifier.events().len(), 1);

    let current = client.user().current(RequestOptions::default()).await.unwrap();
    assert_eq!(current.id, user.id);
}

#[tokio::test]
async fn test_client_multipart_upload_over_http() {
    let (client, _) = spawn_app().await;
    let files = client.file();

    let temp = files
        .upload_temp(
            UploadFile::new("cover.png", "image/png", vec![0x89, 0x50, 0x4e, 0x47]),
            RequestOptions::new().silent(),
        )
        .await
        .unwrap();
    assert_eq!(temp.status, FileStatus::Temp);
    assert_eq!(temp.file_size, 4);

    let confirmed = files
        .confirm_temp(
            temp.id,
            &FileAssociation {
                business_type: "article".to_string(),
                business_id: "a-1".to_string(),
                business_field: "cover".to_string(),
            },
            RequestOptions::new().silent(),
        )
        .await
        .unwrap();
    assert_eq!(confirmed.status, FileStatus::Confirmed);
}

#[tokio::test]
async fn test_client_sees_unregistered_route_as_transport_error() {
    let (client, notifier) = spawn_app().await;

    let error = client
        .data_analytics()
        .overview(&Default::default(), RequestOptions::default())
        .await
        .unwrap_err();

    assert!(error.is_transport());
    assert!(matches!(
        error,
        mindcare_portal::ApiError::Transport {
            status: Some(404),
            ..
        }
    ));
    assert_eq!(notifier.events().len(), 1);
}
