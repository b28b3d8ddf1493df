use serde::{Deserialize, Serialize};
use serde_json::Value;

// --- Response Envelope ---

/// Success sentinel carried in `ApiResponse::code`.
pub const SUCCESS_CODE: &str = "200";

/// ApiResponse
///
/// The uniform envelope every backend endpoint answers with.
/// Invariant: `code == SUCCESS_CODE` iff the call succeeded; `data` is `None` on failure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiResponse<T> {
    pub code: String,
    #[serde(default = "Option::default")]
    pub data: Option<T>,
    #[serde(default)]
    pub msg: String,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T, msg: impl Into<String>) -> Self {
        Self {
            code: SUCCESS_CODE.to_string(),
            data: Some(data),
            msg: msg.into(),
        }
    }

    /// Success with `data: null` (deletes, logouts, password changes).
    pub fn empty(msg: impl Into<String>) -> Self {
        Self {
            code: SUCCESS_CODE.to_string(),
            data: None,
            msg: msg.into(),
        }
    }

    pub fn error(msg: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            data: None,
            msg: msg.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == SUCCESS_CODE
    }
}

/// Page
///
/// Paged listing returned by every `/page` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub records: Vec<T>,
    pub total: u64,
    pub current: u64,
    pub size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pages: Option<u64>,
}

/// Result of the batch endpoints (batch retry, batch AI analysis).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct BatchOperationResult {
    pub total_count: u64,
    pub success_count: u64,
    pub fail_count: u64,
    #[serde(default)]
    pub fail_reasons: Vec<String>,
}

// --- User & Auth ---

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub id: i64,
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub icon: Option<String>,
}

/// UserInfo
///
/// Account record as returned by login, `/user/current`, `/user/{id}` and the user page.
/// Login additionally fills `role_code` and `token`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: i64,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birthday: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    // "ADMIN" | "USER" (other staff roles are possible).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_code: Option<String>,
    // 1 = ordinary user, 2 = administrator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_type: Option<i32>,
    // 1 = active, 0 = disabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub menu_list: Option<Vec<MenuItem>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirm_password: Option<String>,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birthday: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_type: Option<i32>,
}

/// Partial profile update (PUT /user/{id}); only provided fields are sent.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birthday: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ForgetPasswordQuery {
    pub email: String,
    pub new_password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UserQuery {
    pub username: Option<String>,
    pub email: Option<String>,
    pub nickname: Option<String>,
    pub phone: Option<String>,
    pub user_type: Option<i32>,
    pub status: Option<i32>,
    pub current_page: Option<u64>,
    pub size: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UserStatistics {
    pub total_users: u64,
    pub active_users: u64,
    pub new_users: u64,
    pub risk_users: u64,
    pub total_growth: f64,
    pub active_growth: f64,
    pub new_growth: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub status: i32,
}

// --- Knowledge Library ---

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i64,
    #[serde(default)]
    pub parent_id: Option<i64>,
    pub category_name: String,
    #[serde(default)]
    pub category_code: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub sort_order: Option<i32>,
    #[serde(default)]
    pub status: Option<i32>,
    #[serde(default)]
    pub article_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<Category>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i64>,
    pub category_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CategoryQuery {
    pub parent_id: Option<i64>,
    pub category_name: Option<String>,
    pub category_code: Option<String>,
    pub status: Option<i32>,
    pub current_page: Option<u64>,
    pub size: Option<u64>,
}

/// Article
///
/// Knowledge article. Ids are opaque strings (UUIDs in the fixture data).
/// Status: 0 = draft, 1 = published, 2 = offline.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: String,
    #[serde(default)]
    pub category_id: Option<i64>,
    #[serde(default)]
    pub category_name: Option<String>,
    pub title: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub tags: Option<String>,
    #[serde(default)]
    pub author_id: Option<i64>,
    #[serde(default)]
    pub author_name: Option<String>,
    #[serde(default)]
    pub read_count: i64,
    #[serde(default)]
    pub favorite_count: i64,
    #[serde(default)]
    pub status: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_favorited: Option<bool>,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreateArticleRequest {
    pub category_id: i64,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateArticleRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ArticleQuery {
    pub keyword: Option<String>,
    pub category_id: Option<i64>,
    pub title: Option<String>,
    pub tags: Option<String>,
    pub author_id: Option<i64>,
    pub status: Option<i32>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub sort_field: Option<String>,
    pub sort_direction: Option<String>,
    pub current_page: Option<u64>,
    pub size: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BatchDeleteRequest {
    pub ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct BatchDeleteResult {
    pub deleted_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ArticleStatistics {
    pub total_articles: u64,
    pub published_articles: u64,
    pub draft_articles: u64,
    pub offline_articles: u64,
    pub total_views: i64,
    pub total_favorites: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteQuery {
    pub title: Option<String>,
    pub category_id: Option<i64>,
    pub sort_field: Option<String>,
    pub sort_direction: Option<String>,
    pub current_page: Option<u64>,
    pub size: Option<u64>,
}

// --- Files ---

/// UploadFile
///
/// A file picked by the user, held in memory until the transport sends it as multipart.
#[derive(Debug, Clone, Default)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }
}

/// Business slot a file belongs to when uploaded directly or as a temp business file.
/// `business_id` is absent for temp business uploads.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct BusinessInfo {
    pub business_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_id: Option<String>,
    pub business_field: String,
}

/// Second phase of the temp upload protocol: binds a temp file to a business entity field.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FileAssociation {
    pub business_type: String,
    pub business_id: String,
    pub business_field: String,
}

/// Lifecycle of a stored file.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FileStatus {
    #[default]
    Temp,
    Confirmed,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FileInfo {
    pub id: i64,
    pub original_name: String,
    pub stored_name: String,
    pub file_url: String,
    pub file_size: u64,
    pub content_type: String,
    #[serde(default)]
    pub business_type: Option<String>,
    #[serde(default)]
    pub business_id: Option<String>,
    #[serde(default)]
    pub business_field: Option<String>,
    pub status: FileStatus,
    #[serde(default)]
    pub created_at: Option<String>,
}

// --- Emotion Diary ---

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EmotionDiary {
    pub id: i64,
    pub user_id: i64,
    pub diary_date: String,
    pub mood_score: i32,
    #[serde(default)]
    pub mood_score_desc: Option<String>,
    #[serde(default)]
    pub dominant_emotion: Option<String>,
    #[serde(default)]
    pub emotion_triggers: Option<String>,
    #[serde(default)]
    pub diary_content: Option<String>,
    #[serde(default)]
    pub sleep_quality: Option<i32>,
    #[serde(default)]
    pub stress_level: Option<i32>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct EmotionDiaryRequest {
    pub diary_date: String,
    pub mood_score: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dominant_emotion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emotion_triggers: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diary_content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sleep_quality: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stress_level: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEmotionDiaryRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mood_score: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dominant_emotion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emotion_triggers: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diary_content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sleep_quality: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stress_level: Option<i32>,
}

/// Filters shared by the user and admin diary listings (admin adds `user_id`/`username`).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DiaryQuery {
    pub current: Option<u64>,
    pub size: Option<u64>,
    pub user_id: Option<i64>,
    pub username: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub min_mood_score: Option<i32>,
    pub max_mood_score: Option<i32>,
    pub dominant_emotion: Option<String>,
    pub sleep_quality: Option<i32>,
    pub stress_level: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsQuery {
    pub days: Option<u32>,
    pub user_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct EmotionDiaryStatistics {
    pub total_days: u32,
    pub recorded_days: u32,
    pub completion_rate: f64,
    pub average_mood_score: f64,
    #[serde(default)]
    pub max_mood_score: Option<i32>,
    #[serde(default)]
    pub min_mood_score: Option<i32>,
    pub positive_days: u32,
    pub negative_days: u32,
    pub neutral_days: u32,
    #[serde(default)]
    pub mood_trend: Vec<Value>,
    #[serde(default)]
    pub emotion_distribution: serde_json::Map<String, Value>,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

// --- Consultation ---

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct StartSessionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_title: Option<String>,
    pub initial_message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatSession {
    pub session_id: String,
    #[serde(default)]
    pub user_hash: Option<i64>,
    pub initial_message: String,
    pub start_time: i64,
    pub expiry_time: i64,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SessionEmotion {
    pub primary_emotion: String,
    pub emotion_score: f64,
    pub is_negative: bool,
    pub risk_level: i32,
    #[serde(default)]
    pub suggestion: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub positive: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SessionQuery {
    pub current_page: Option<u64>,
    pub size: Option<u64>,
    pub user_id: Option<i64>,
    pub emotion_tag: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub keyword: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SessionDetail {
    pub id: i64,
    pub user_id: i64,
    #[serde(default)]
    pub user_nickname: Option<String>,
    #[serde(default)]
    pub user_avatar: Option<String>,
    #[serde(default)]
    pub session_title: Option<String>,
    #[serde(default)]
    pub started_at: Option<String>,
    #[serde(default)]
    pub duration_minutes: Option<i64>,
    #[serde(default)]
    pub message_count: Option<i64>,
    #[serde(default)]
    pub last_message_content: Option<String>,
    #[serde(default)]
    pub last_message_time: Option<String>,
    #[serde(default)]
    pub emotion_tags: Vec<String>,
    #[serde(default)]
    pub primary_emotion: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: i64,
    pub session_id: i64,
    // 1 = user, 2 = AI assistant.
    pub sender_type: i32,
    #[serde(default)]
    pub sender_type_desc: Option<String>,
    #[serde(default)]
    pub message_type: Option<i32>,
    pub content: String,
    #[serde(default)]
    pub emotion_tag: Option<String>,
    #[serde(default)]
    pub ai_model: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSessionTitleRequest {
    pub session_title: String,
}

// --- AI Analysis Queue ---

/// Task status values used by the queue: PENDING, PROCESSING, COMPLETED, FAILED.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AiAnalysisTask {
    pub id: i64,
    #[serde(default)]
    pub diary_id: Option<i64>,
    pub user_id: i64,
    #[serde(default)]
    pub username: Option<String>,
    pub status: String,
    // AUTO | MANUAL | ADMIN | BATCH
    pub task_type: String,
    pub priority: i32,
    pub retry_count: i32,
    pub max_retry_count: i32,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub can_retry: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl AiAnalysisTask {
    pub fn retryable(&self) -> bool {
        self.status == "FAILED" && self.retry_count < self.max_retry_count
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AiTaskQuery {
    pub current: Option<u64>,
    pub size: Option<u64>,
    pub status: Option<String>,
    pub task_type: Option<String>,
    pub user_id: Option<i64>,
    pub username: Option<String>,
    pub priority: Option<i32>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub failed_only: Option<bool>,
    pub retryable_only: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AiTaskStatistics {
    pub total_tasks: u64,
    pub pending_tasks: u64,
    pub processing_tasks: u64,
    pub completed_tasks: u64,
    pub failed_tasks: u64,
    pub retryable_tasks: u64,
    #[serde(default)]
    pub task_type_stats: std::collections::BTreeMap<String, u64>,
}

// --- Analytics ---

/// Window for the analytics dashboards, in days.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DaysQuery {
    pub days: Option<u32>,
}

// --- Psychological Tests ---

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationAnswer {
    pub question_id: i64,
    pub selected_options: Vec<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationSubmission {
    pub evaluation_id: i64,
    pub answers: Vec<EvaluationAnswer>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ScoreQuery {
    pub score: i32,
}
