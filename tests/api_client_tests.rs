use async_trait::async_trait;
use mindcare_portal::{
    ApiClient, ApiError, MockRegistry, RequestOptions, Role, SessionStore,
    api::{
        HttpMethod, MockTransport, Notification, RecordingNotifier, RequestBody, RequestEnvelope,
        Transport,
    },
    error::ApiResult,
    models::{
        ApiResponse, ArticleQuery, BusinessInfo, CreateCategoryRequest, EmotionDiaryRequest,
        FileAssociation, LoginRequest, UploadFile, UserInfo,
    },
};
use serde_json::{Value, json};
use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex},
    time::Duration,
};

const SECRET: &str = "client-test-secret";

// --- Test Doubles ---

/// Records every envelope and answers each with an empty success.
#[derive(Default)]
struct RecordingTransport {
    sent: Mutex<Vec<(RequestEnvelope, Option<String>)>>,
}

impl RecordingTransport {
    fn last(&self) -> (RequestEnvelope, Option<String>) {
        self.sent.lock().unwrap().last().cloned().expect("no request sent")
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(
        &self,
        request: RequestEnvelope,
        bearer: Option<String>,
    ) -> ApiResult<ApiResponse<Value>> {
        self.sent.lock().unwrap().push((request, bearer));
        Ok(ApiResponse::empty("ok"))
    }
}

struct TestClient {
    client: ApiClient,
    notifier: Arc<RecordingNotifier>,
}

fn mock_client(registry: MockRegistry) -> TestClient {
    let notifier = Arc::new(RecordingNotifier::new());
    let client = ApiClient::new(
        Arc::new(MockTransport::new(Arc::new(registry))),
        notifier.clone(),
        SessionStore::new(),
    );
    TestClient { client, notifier }
}

fn fixture_client() -> TestClient {
    mock_client(MockRegistry::with_fixtures(SECRET))
}

fn recording_client() -> (ApiClient, Arc<RecordingTransport>) {
    let transport = Arc::new(RecordingTransport::default());
    let client = ApiClient::new(
        transport.clone(),
        Arc::new(RecordingNotifier::new()),
        SessionStore::new(),
    );
    (client, transport)
}

fn credentials(username: &str, password: &str) -> LoginRequest {
    LoginRequest {
        username: username.to_string(),
        password: password.to_string(),
    }
}

// --- Session & Notifications ---

#[tokio::test]
async fn test_admin_login_establishes_session() {
    let test = fixture_client();

    let user = test
        .client
        .user()
        .login(&credentials("admin", "123456"), RequestOptions::default())
        .await
        .unwrap();

    assert_eq!(user.role_code.as_deref(), Some("ADMIN"));
    let session = test.client.session().snapshot();
    assert!(session.logged_in);
    assert_eq!(session.role, Some(Role::Admin));
    assert_eq!(test.client.session().token(), user.token);
    assert_eq!(
        test.notifier.events(),
        vec![Notification::Success("Login successful".to_string())]
    );
}

#[tokio::test]
async fn test_wrong_password_is_application_error() {
    let test = fixture_client();

    let error = test
        .client
        .user()
        .login(&credentials("admin", "wrong"), RequestOptions::default())
        .await
        .unwrap_err();

    assert!(error.is_application());
    assert_eq!(error.code().as_deref(), Some("400"));
    assert!(!test.client.session().is_logged_in());
    assert!(matches!(test.notifier.events().as_slice(), [Notification::Error(_)]));
}

#[tokio::test]
async fn test_silent_suppresses_all_notifications() {
    let test = fixture_client();
    let user_api = test.client.user();

    user_api
        .login(&credentials("admin", "123456"), RequestOptions::new().silent())
        .await
        .unwrap();
    let _ = user_api
        .login(&credentials("admin", "nope"), RequestOptions::new().silent())
        .await;

    assert!(test.notifier.events().is_empty());
}

#[tokio::test]
async fn test_success_message_override_and_hidden_errors() {
    let test = fixture_client();
    let categories = test.client.knowledge_category();
    let named = |name: &str| CreateCategoryRequest {
        category_name: name.to_string(),
        ..Default::default()
    };

    categories
        .create(&named("Mindfulness"), RequestOptions::new().success_msg("Saved!"))
        .await
        .unwrap();
    categories
        .create(&named("Sleep Hygiene"), RequestOptions::default())
        .await
        .unwrap();
    let _ = categories.get(999, RequestOptions::new().hide_error()).await;

    assert_eq!(
        test.notifier.events(),
        vec![
            Notification::Success("Saved!".to_string()),
            Notification::Success("Category created".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_reads_have_no_default_toast() {
    let test = fixture_client();

    let tree = test
        .client
        .knowledge_category()
        .tree(RequestOptions::default())
        .await
        .unwrap();

    assert!(!tree.is_empty());
    assert!(test.notifier.events().is_empty());
}

#[tokio::test]
async fn test_logout_clears_session_even_when_call_fails() {
    let test = mock_client(MockRegistry::new());
    test.client.session().login(
        "stale-token",
        UserInfo {
            id: 2,
            username: "user001".to_string(),
            role_code: Some("USER".to_string()),
            ..Default::default()
        },
    );

    let result = test.client.user().logout(RequestOptions::default()).await;

    assert!(result.unwrap_err().is_transport());
    assert!(!test.client.session().is_logged_in());
    assert_eq!(test.client.session().token(), None);
}

// --- Error Taxonomy ---

#[tokio::test]
async fn test_unregistered_endpoint_is_transport_error() {
    let test = fixture_client();

    let error = test
        .client
        .data_analytics()
        .overview(&Default::default(), RequestOptions::default())
        .await
        .unwrap_err();

    match error {
        ApiError::Transport { status, .. } => assert_eq!(status, Some(404)),
        other => panic!("expected a transport error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_mismatched_payload_is_decode_error() {
    let mut registry = MockRegistry::new();
    registry.register(HttpMethod::Get, "/user/current", |_| {
        ApiResponse::success(json!("not a user"), "ok")
    });
    let test = mock_client(registry);

    let error = test
        .client
        .user()
        .current(RequestOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(error, ApiError::Decode(_)));
}

#[tokio::test]
async fn test_login_without_token_keeps_session_anonymous() {
    let mut registry = MockRegistry::new();
    registry.register(HttpMethod::Post, "/user/login", |_| {
        ApiResponse::success(json!({ "id": 2, "username": "user001" }), "ok")
    });
    let test = mock_client(registry);

    let error = test
        .client
        .user()
        .login(&credentials("user001", "123456"), RequestOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(error, ApiError::Decode(_)));
    assert!(!test.client.session().is_logged_in());
    assert_eq!(test.client.session().token(), None);
    assert!(matches!(test.notifier.events().as_slice(), [Notification::Error(_)]));
}

#[tokio::test]
async fn test_login_success_message_override_fires_once() {
    let test = fixture_client();

    test.client
        .user()
        .login(
            &credentials("user001", "123456"),
            RequestOptions::new().success_msg("Welcome back"),
        )
        .await
        .unwrap();

    assert_eq!(
        test.notifier.events(),
        vec![Notification::Success("Welcome back".to_string())]
    );
}

#[tokio::test]
async fn test_unserializable_body_is_reported_and_not_sent() {
    let transport = Arc::new(RecordingTransport::default());
    let notifier = Arc::new(RecordingNotifier::new());
    let client = ApiClient::new(transport.clone(), notifier.clone(), SessionStore::new());

    // JSON object keys must be strings.
    let body: BTreeMap<(i32, i32), i32> = BTreeMap::from([((1, 2), 3)]);
    let envelope = RequestEnvelope::post("/psychological-test/submit").with_json(&body);
    assert!(envelope.build_error.is_some());

    let error = client
        .execute::<Value>(envelope, &RequestOptions::default(), Some("Submitted"))
        .await
        .unwrap_err();

    assert!(matches!(error, ApiError::Decode(_)));
    assert!(transport.sent.lock().unwrap().is_empty());
    assert!(matches!(notifier.events().as_slice(), [Notification::Error(_)]));
}

// --- Two-phase Upload ---

#[tokio::test]
async fn test_temp_upload_then_confirm() {
    let test = fixture_client();
    let files = test.client.file();

    let temp = files
        .upload_temp(
            UploadFile::new("diary.txt", "text/plain", b"dear diary".to_vec()),
            RequestOptions::default(),
        )
        .await
        .unwrap();

    let association = FileAssociation {
        business_type: "diary".to_string(),
        business_id: "7".to_string(),
        business_field: "attachment".to_string(),
    };
    let confirmed = files
        .confirm_temp(temp.id, &association, RequestOptions::default())
        .await
        .unwrap();
    assert_eq!(confirmed.business_id.as_deref(), Some("7"));

    let listed = files
        .by_business_field("diary", "7", "attachment", RequestOptions::default())
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].original_name, "diary.txt");

    assert_eq!(
        test.notifier.events(),
        vec![
            Notification::Success("File pre-uploaded".to_string()),
            Notification::Success("File confirmed".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_confirm_unknown_temp_id_is_application_not_found() {
    let test = fixture_client();
    let association = FileAssociation {
        business_type: "diary".to_string(),
        business_id: "7".to_string(),
        business_field: "attachment".to_string(),
    };

    let error = test
        .client
        .file()
        .confirm_temp(4040, &association, RequestOptions::default())
        .await
        .unwrap_err();

    assert!(error.is_application());
    assert_eq!(error.code().as_deref(), Some("404"));
}

#[tokio::test]
async fn test_temp_business_upload_keeps_business_slot() {
    let test = fixture_client();
    let business = BusinessInfo {
        business_type: "user".to_string(),
        business_id: None,
        business_field: "avatar".to_string(),
    };

    let temp = test
        .client
        .file()
        .upload_temp_business(
            UploadFile::new("me.png", "image/png", vec![1, 2, 3]),
            &business,
            RequestOptions::default(),
        )
        .await
        .unwrap();

    assert_eq!(temp.business_type.as_deref(), Some("user"));
    assert_eq!(temp.business_field.as_deref(), Some("avatar"));
    assert_eq!(temp.business_id, None);
}

// --- Authenticated Flows ---

#[tokio::test]
async fn test_bearer_token_reaches_fixtures() {
    let test = fixture_client();
    test.client
        .user()
        .login(&credentials("user001", "123456"), RequestOptions::default())
        .await
        .unwrap();

    let count = test
        .client
        .user_favorite()
        .count(RequestOptions::default())
        .await
        .unwrap();
    assert_eq!(count, 2);

    let today = chrono::Local::now().date_naive().format("%Y-%m-%d").to_string();
    let diary = test
        .client
        .emotion_diary()
        .save(
            &EmotionDiaryRequest {
                diary_date: today.clone(),
                mood_score: 8,
                ..Default::default()
            },
            RequestOptions::default(),
        )
        .await
        .unwrap();
    assert_eq!(diary.diary_date, today);

    let found = test
        .client
        .emotion_diary()
        .today(RequestOptions::default())
        .await
        .unwrap();
    assert_eq!(found.map(|d| d.id), Some(diary.id));
}

#[tokio::test]
async fn test_batch_retry_returns_fail_reasons() {
    let test = fixture_client();

    let result = test
        .client
        .ai_analysis_task()
        .batch_retry(&[2, 3], RequestOptions::default())
        .await
        .unwrap();

    assert_eq!(result.success_count, 1);
    assert_eq!(result.fail_count, 1);
    assert_eq!(result.fail_reasons.len(), 1);
    assert!(result.fail_reasons[0].starts_with("Task 3:"));
}

// --- Wrapper Envelopes ---

#[tokio::test]
async fn test_delete_by_business_sends_field_as_query() {
    let (client, transport) = recording_client();

    client
        .file()
        .delete_by_business("article", "a-1", Some("cover"), RequestOptions::default())
        .await
        .unwrap();

    let (request, _) = transport.last();
    assert_eq!(request.method, HttpMethod::Delete);
    assert_eq!(request.path, "/file/business/article/a-1");
    assert_eq!(request.query_value("businessField"), Some("cover"));
}

#[tokio::test]
async fn test_batch_delete_sends_ids_in_body() {
    let (client, transport) = recording_client();

    let _ = client
        .knowledge_article()
        .batch_delete(vec!["a".to_string(), "b".to_string()], RequestOptions::default())
        .await;

    let (request, _) = transport.last();
    assert_eq!(request.path, "/knowledge/article/batch");
    match request.body {
        RequestBody::Json(body) => assert_eq!(body, json!({ "ids": ["a", "b"] })),
        other => panic!("expected a JSON body, got {:?}", other),
    }
}

#[tokio::test]
async fn test_edit_mode_flag_and_report_score_are_query_params() {
    let (client, transport) = recording_client();

    let _ = client
        .emotion_diary()
        .save_in_edit_mode(&EmotionDiaryRequest::default(), RequestOptions::default())
        .await;
    assert_eq!(transport.last().0.query_value("isEditMode"), Some("true"));

    client
        .psychological_test()
        .report(12, 35, RequestOptions::default())
        .await
        .unwrap();
    let (request, _) = transport.last();
    assert_eq!(request.path, "/psychological-test/report/12");
    assert_eq!(request.query_value("score"), Some("35"));
}

#[tokio::test]
async fn test_page_query_skips_unset_filters() {
    let (client, transport) = recording_client();
    let query = ArticleQuery {
        keyword: Some("sleep".to_string()),
        current_page: Some(2),
        ..Default::default()
    };

    let _ = client
        .knowledge_article()
        .page(&query, RequestOptions::default())
        .await;

    let (request, _) = transport.last();
    assert_eq!(request.path, "/knowledge/article/page");
    assert_eq!(
        request.query,
        vec![
            ("currentPage".to_string(), "2".to_string()),
            ("keyword".to_string(), "sleep".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_options_forward_headers_timeout_and_token() {
    let (client, transport) = recording_client();
    client.session().login(
        "abc",
        UserInfo {
            id: 1,
            username: "admin".to_string(),
            ..Default::default()
        },
    );

    client
        .user_favorite()
        .remove(
            "a-1",
            RequestOptions::new()
                .header("X-Trace", "t-1")
                .timeout(Duration::from_secs(3)),
        )
        .await
        .unwrap();

    let (request, bearer) = transport.last();
    assert_eq!(request.path, "/knowledge/favorite/a-1");
    assert_eq!(request.header_value("x-trace"), Some("t-1"));
    assert_eq!(request.timeout, Some(Duration::from_secs(3)));
    assert_eq!(bearer.as_deref(), Some("abc"));
}
