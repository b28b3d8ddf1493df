use mindcare_portal::{
    api::HttpMethod,
    mock::{MockRegistry, MockRequest, UploadedFile},
    models::ApiResponse,
};
use serde_json::{Value, json};

const SECRET: &str = "registry-test-secret";

fn fixtures() -> MockRegistry {
    MockRegistry::with_fixtures(SECRET)
}

fn call(registry: &MockRegistry, request: MockRequest) -> ApiResponse<Value> {
    registry
        .dispatch(request)
        .expect("fixture endpoint should be registered")
}

fn login(registry: &MockRegistry, username: &str) -> String {
    let response = call(
        registry,
        MockRequest::new(HttpMethod::Post, "/user/login")
            .with_json_body(json!({ "username": username, "password": "123456" })),
    );
    assert!(response.is_success(), "login failed: {}", response.msg);
    response.data.unwrap()["token"].as_str().unwrap().to_string()
}

// --- Registry mechanics ---

#[test]
fn test_register_and_exact_lookup() {
    let mut registry = MockRegistry::new();
    registry.register(HttpMethod::Get, "/ping", |_| ApiResponse::success(json!("pong"), "ok"));

    let found = registry.lookup(HttpMethod::Get, "/ping").unwrap();
    assert_eq!(found.key, "GET_/ping");
    assert!(found.path_params.is_empty());
    assert!(registry.lookup(HttpMethod::Post, "/ping").is_none());
}

#[test]
fn test_reregistering_replaces_handler() {
    let mut registry = MockRegistry::new();
    registry.register(HttpMethod::Get, "/ping", |_| ApiResponse::success(json!(1), "first"));
    registry.register(HttpMethod::Get, "/ping", |_| ApiResponse::success(json!(2), "second"));

    assert_eq!(registry.len(), 1);
    let response = registry
        .dispatch(MockRequest::new(HttpMethod::Get, "/ping"))
        .unwrap();
    assert_eq!(response.msg, "second");
}

#[test]
fn test_pattern_captures_path_params() {
    let mut registry = MockRegistry::new();
    registry.register(HttpMethod::Get, "/file/business/:type/:id", |req| {
        ApiResponse::success(
            json!({ "type": req.path_param("type"), "id": req.path_param("id") }),
            "ok",
        )
    });

    let response = registry
        .dispatch(MockRequest::new(HttpMethod::Get, "/file/business/user/42"))
        .unwrap();
    assert_eq!(response.data, Some(json!({ "type": "user", "id": "42" })));
    assert!(registry.lookup(HttpMethod::Get, "/file/business/user").is_none());
}

#[test]
fn test_literal_pattern_beats_parameter() {
    let mut registry = MockRegistry::new();
    registry.register(HttpMethod::Get, "/article/:id", |_| ApiResponse::empty("by id"));
    registry.register(HttpMethod::Get, "/article/page", |_| ApiResponse::empty("page"));
    registry.register(HttpMethod::Get, "/article/:id/:action", |_| ApiResponse::empty("action"));
    registry.register(HttpMethod::Get, "/article/:id/status", |_| ApiResponse::empty("status"));

    let msg = |path: &str| {
        registry
            .dispatch(MockRequest::new(HttpMethod::Get, path))
            .unwrap()
            .msg
    };
    assert_eq!(msg("/article/page"), "page");
    assert_eq!(msg("/article/7"), "by id");
    assert_eq!(msg("/article/7/status"), "status");
    assert_eq!(msg("/article/7/history"), "action");
}

#[test]
fn test_unregistered_route_dispatches_to_none() {
    let registry = fixtures();
    assert!(
        registry
            .dispatch(MockRequest::new(HttpMethod::Get, "/does/not/exist"))
            .is_none()
    );
}

#[test]
fn test_registries_are_isolated() {
    let first = fixtures();
    let second = fixtures();
    let token = login(&first, "user001");

    call(
        &first,
        MockRequest::new(HttpMethod::Delete, "/user/3").with_bearer(Some(token)),
    );

    let in_first = call(&first, MockRequest::new(HttpMethod::Get, "/user/3"));
    let in_second = call(&second, MockRequest::new(HttpMethod::Get, "/user/3"));
    assert_eq!(in_first.code, "404");
    assert!(in_second.is_success());
}

#[test]
fn test_fixture_keys_cover_catalogue() {
    let keys = fixtures().keys();
    for key in [
        "POST_/user/login",
        "GET_/knowledge/article/:id",
        "PUT_/file/confirm/:id",
        "POST_/emotion-diary",
        "POST_/psychological-chat/session/start",
        "POST_/ai-analysis-task/batch-retry",
    ] {
        assert!(keys.iter().any(|k| k == key), "missing {}", key);
    }
}

// --- User fixtures ---

#[test]
fn test_login_failures() {
    let registry = fixtures();
    let attempt = |body: Value| {
        call(
            &registry,
            MockRequest::new(HttpMethod::Post, "/user/login").with_json_body(body),
        )
    };

    let empty = attempt(json!({ "username": "", "password": "" }));
    assert_eq!(empty.code, "400");

    let unknown = attempt(json!({ "username": "nobody", "password": "123456" }));
    assert_eq!(unknown.code, "400");
    assert!(unknown.msg.contains("user001"));

    let wrong = attempt(json!({ "username": "admin", "password": "654321" }));
    assert_eq!(wrong.code, "400");
    assert!(wrong.data.is_none());

    let disabled = attempt(json!({ "username": "user003", "password": "123456" }));
    assert_eq!(disabled.code, "403");
}

#[test]
fn test_current_user_follows_token() {
    let registry = fixtures();

    let anonymous = call(&registry, MockRequest::new(HttpMethod::Get, "/user/current"));
    assert_eq!(anonymous.code, "401");

    let token = login(&registry, "user001");
    let current = call(
        &registry,
        MockRequest::new(HttpMethod::Get, "/user/current").with_bearer(Some(token)),
    );
    assert_eq!(current.data.unwrap()["username"], "user001");
}

#[test]
fn test_admin_cannot_be_disabled_or_deleted() {
    let registry = fixtures();

    let disable = call(
        &registry,
        MockRequest::new(HttpMethod::Put, "/user/1/status").with_json_body(json!({ "status": 0 })),
    );
    assert_eq!(disable.code, "400");

    let delete = call(&registry, MockRequest::new(HttpMethod::Delete, "/user/1"));
    assert_eq!(delete.code, "400");
}

#[test]
fn test_register_rejects_duplicates() {
    let registry = fixtures();
    let register = |username: &str, email: &str| {
        call(
            &registry,
            MockRequest::new(HttpMethod::Post, "/user/add").with_json_body(json!({
                "username": username,
                "password": "secret1",
                "confirmPassword": "secret1 ",
                "email": email,
            })),
        )
    };

    assert!(register("newbie", "newbie@example.com").is_success());
    assert_eq!(register("newbie", "other@example.com").code, "400");
    assert_eq!(register("another", "newbie@example.com").code, "400");
}

// --- Knowledge fixtures ---

#[test]
fn test_article_view_increments_read_count() {
    let registry = fixtures();
    let path = "/knowledge/article/550e8400-e29b-41d4-a716-446655440001";

    let first = call(&registry, MockRequest::new(HttpMethod::Get, path));
    let second = call(&registry, MockRequest::new(HttpMethod::Get, path));

    let count = |r: &ApiResponse<Value>| r.data.as_ref().unwrap()["readCount"].as_i64().unwrap();
    assert_eq!(count(&second), count(&first) + 1);
}

#[test]
fn test_favorites_require_login_and_reject_duplicates() {
    let registry = fixtures();
    let article = "/knowledge/favorite/550e8400-e29b-41d4-a716-446655440004";

    let anonymous = call(&registry, MockRequest::new(HttpMethod::Post, article));
    assert_eq!(anonymous.code, "401");

    let token = login(&registry, "user001");
    let add = || {
        call(
            &registry,
            MockRequest::new(HttpMethod::Post, article).with_bearer(Some(token.clone())),
        )
    };
    assert!(add().is_success());
    assert_eq!(add().code, "400");

    let status = call(
        &registry,
        MockRequest::new(HttpMethod::Get, &format!("{}/status", article))
            .with_bearer(Some(token.clone())),
    );
    assert_eq!(status.data, Some(json!(true)));
}

#[test]
fn test_batch_delete_uses_string_ids() {
    let registry = fixtures();
    let response = call(
        &registry,
        MockRequest::new(HttpMethod::Delete, "/knowledge/article/batch").with_json_body(json!({
            "ids": [
                "550e8400-e29b-41d4-a716-446655440005",
                "550e8400-e29b-41d4-a716-446655440006",
                "missing"
            ]
        })),
    );

    assert_eq!(response.data, Some(json!({ "deletedCount": 2 })));
}

// --- File fixtures ---

#[test]
fn test_temp_upload_then_confirm() {
    let registry = fixtures();
    let upload = call(
        &registry,
        MockRequest::new(HttpMethod::Post, "/file/upload/temp").with_file(UploadedFile {
            field_name: "file".to_string(),
            file_name: "cover.png".to_string(),
            content_type: "image/png".to_string(),
            bytes: vec![0x89, 0x50, 0x4e, 0x47],
        }),
    );
    let temp = upload.data.unwrap();
    assert_eq!(temp["status"], "TEMP");
    assert_eq!(temp["fileSize"], 4);

    let confirm_path = format!("/file/confirm/{}", temp["id"]);
    let association = json!({
        "businessType": "article",
        "businessId": "a-1",
        "businessField": "cover",
    });
    let confirmed = call(
        &registry,
        MockRequest::new(HttpMethod::Put, &confirm_path).with_json_body(association.clone()),
    );
    assert_eq!(confirmed.data.unwrap()["status"], "CONFIRMED");

    let again = call(
        &registry,
        MockRequest::new(HttpMethod::Put, &confirm_path).with_json_body(association),
    );
    assert_eq!(again.code, "400");

    let listed = call(
        &registry,
        MockRequest::new(HttpMethod::Get, "/file/business/article/a-1/cover"),
    );
    assert_eq!(listed.data.unwrap().as_array().unwrap().len(), 1);
}

#[test]
fn test_confirm_unknown_temp_file_is_not_found() {
    let response = call(
        &fixtures(),
        MockRequest::new(HttpMethod::Put, "/file/confirm/999").with_json_body(json!({
            "businessType": "article",
            "businessId": "a-1",
            "businessField": "cover",
        })),
    );

    assert_eq!(response.code, "404");
}

// --- Wellbeing fixtures ---

#[test]
fn test_diary_save_merges_same_day() {
    let registry = fixtures();
    let token = login(&registry, "user002");
    let save = |mood: i32| {
        call(
            &registry,
            MockRequest::new(HttpMethod::Post, "/emotion-diary")
                .with_bearer(Some(token.clone()))
                .with_json_body(json!({ "diaryDate": "2024-09-01", "moodScore": mood })),
        )
    };

    let first = save(5).data.unwrap();
    let second = save(8).data.unwrap();
    assert_eq!(first["id"], second["id"]);
    assert_eq!(second["moodScore"], 8);

    let invalid = save(11);
    assert_eq!(invalid.code, "400");
}

#[test]
fn test_diary_statistics_for_seeded_week() {
    let registry = fixtures();
    let token = login(&registry, "user001");

    let response = call(
        &registry,
        MockRequest::new(HttpMethod::Get, "/emotion-diary/statistics").with_bearer(Some(token)),
    );
    let stats = response.data.unwrap();

    assert_eq!(stats["totalDays"], 7);
    assert_eq!(stats["recordedDays"], 3);
    assert_eq!(stats["positiveDays"], 1);
    assert_eq!(stats["negativeDays"], 1);
    assert_eq!(stats["neutralDays"], 1);
    assert_eq!(stats["averageMoodScore"], 5.7);
    assert_eq!(stats["suggestions"].as_array().unwrap().len(), 1);
}

#[test]
fn test_diary_statistics_without_entries() {
    let registry = fixtures();
    let token = login(&registry, "admin");

    let stats = call(
        &registry,
        MockRequest::new(HttpMethod::Get, "/emotion-diary/statistics")
            .with_param("days", "30")
            .with_bearer(Some(token)),
    )
    .data
    .unwrap();

    assert_eq!(stats["totalDays"], 30);
    assert_eq!(stats["recordedDays"], 0);
    assert_eq!(stats["suggestions"].as_array().unwrap().len(), 1);
}

#[test]
fn test_diary_statistics_rejects_unbounded_window() {
    let registry = fixtures();
    let token = login(&registry, "user001");

    let response = call(
        &registry,
        MockRequest::new(HttpMethod::Get, "/emotion-diary/statistics")
            .with_param("days", "100000000000")
            .with_bearer(Some(token)),
    );

    assert_eq!(response.code, "400");
    assert!(response.data.is_none());
}

#[test]
fn test_page_past_the_end_is_empty() {
    let registry = fixtures();
    let page = |current: &str, size: &str| {
        call(
            &registry,
            MockRequest::new(HttpMethod::Get, "/knowledge/article/page")
                .with_param("currentPage", current)
                .with_param("size", size),
        )
    };

    let far = page("9223372036854775807", "12");
    assert_eq!(far.code, "200");
    let far = far.data.unwrap();
    assert!(far["records"].as_array().unwrap().is_empty());
    assert!(far["total"].as_u64().unwrap() > 0);

    let huge_size = page("2", "9223372036854775807").data.unwrap();
    assert!(huge_size["records"].as_array().unwrap().is_empty());
}

#[test]
fn test_retry_rules() {
    let registry = fixtures();
    let retry = |id: i64| {
        call(
            &registry,
            MockRequest::new(HttpMethod::Post, &format!("/ai-analysis-task/{}/retry", id)),
        )
    };

    assert!(retry(2).is_success());
    assert_eq!(retry(2).code, "400", "task 2 is PENDING after the first retry");
    assert_eq!(retry(3).code, "400");
    assert_eq!(retry(1).code, "400");
    assert_eq!(retry(99).code, "404");
}

#[test]
fn test_batch_retry_reports_each_failure() {
    let registry = fixtures();
    let response = call(
        &registry,
        MockRequest::new(HttpMethod::Post, "/ai-analysis-task/batch-retry")
            .with_json_body(json!([2, 3, 42])),
    );
    let result = response.data.unwrap();

    assert_eq!(result["totalCount"], 3);
    assert_eq!(result["successCount"], 1);
    assert_eq!(result["failCount"], 2);
    let reasons = result["failReasons"].as_array().unwrap();
    assert!(reasons[0].as_str().unwrap().starts_with("Task 3:"));
    assert!(reasons[1].as_str().unwrap().contains("Task not found"));
}

#[test]
fn test_chat_session_start() {
    let registry = fixtures();
    let token = login(&registry, "user001");

    let session = call(
        &registry,
        MockRequest::new(HttpMethod::Post, "/psychological-chat/session/start")
            .with_bearer(Some(token))
            .with_json_body(json!({ "initialMessage": "I have trouble sleeping" })),
    )
    .data
    .unwrap();

    assert_eq!(session["status"], "ACTIVE");
    let start = session["startTime"].as_i64().unwrap();
    let expiry = session["expiryTime"].as_i64().unwrap();
    assert_eq!(expiry - start, 30 * 60 * 1000);
}
