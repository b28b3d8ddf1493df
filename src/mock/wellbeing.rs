use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde_json::{Map, Value, json};
use uuid::Uuid;

use super::{
    MockDb, MockRegistry, MockRequest, bind, fail, lenient_i64, ok, paginate,
    store::{mood_description, now_iso, now_millis, today},
};
use crate::{
    api::HttpMethod,
    models::{ApiResponse, BatchOperationResult, ChatSession, EmotionDiary},
};

/// Chat sessions expire half an hour after they start.
const SESSION_TTL_MILLIS: i64 = 30 * 60 * 1000;

const DEFAULT_STATISTICS_DAYS: i64 = 7;

pub fn register(registry: &mut MockRegistry, db: &MockDb) {
    // --- Emotion diary ---
    bind(registry, db, HttpMethod::Post, "/emotion-diary", save_diary);
    bind(registry, db, HttpMethod::Get, "/emotion-diary/page", diary_page);
    bind(registry, db, HttpMethod::Get, "/emotion-diary/statistics", diary_statistics);
    bind(registry, db, HttpMethod::Get, "/emotion-diary/today", today_diary);
    bind(registry, db, HttpMethod::Get, "/emotion-diary/date/:date", diary_by_date);
    bind(registry, db, HttpMethod::Get, "/emotion-diary/:id", get_diary);
    bind(registry, db, HttpMethod::Delete, "/emotion-diary/:id", delete_diary);

    // --- Consultation ---
    bind(registry, db, HttpMethod::Post, "/psychological-chat/session/start", start_session);

    // --- AI analysis queue ---
    bind(registry, db, HttpMethod::Get, "/ai-analysis-task/page", task_page);
    bind(registry, db, HttpMethod::Get, "/ai-analysis-task/statistics", task_statistics);
    bind(registry, db, HttpMethod::Post, "/ai-analysis-task/batch-retry", batch_retry);
    bind(registry, db, HttpMethod::Post, "/ai-analysis-task/:id/retry", retry_task);
}

// --- Emotion diary ---

fn optional_i32(req: &MockRequest, key: &str) -> Option<i32> {
    req.param_i64(key).map(|v| v as i32)
}

/// save_diary
///
/// One diary per user and day: posting for a date that already has an entry updates it.
/// `isEditMode` is accepted but does not change this.
fn save_diary(db: &MockDb, req: &MockRequest) -> ApiResponse<Value> {
    let Some(user_id) = db.current_user_id(req) else {
        return fail("Not logged in", "401");
    };
    let Some(date) = req
        .param_str("diaryDate")
        .and_then(|raw| NaiveDate::parse_from_str(&raw, "%Y-%m-%d").ok())
    else {
        return fail("diaryDate must be a YYYY-MM-DD date", "400");
    };
    let Some(mood_score) = optional_i32(req, "moodScore").filter(|s| (1..=10).contains(s)) else {
        return fail("moodScore must be between 1 and 10", "400");
    };
    if date > today() {
        return fail("Cannot write a diary for a future date", "400");
    }

    let diary_date = date.format("%Y-%m-%d").to_string();
    let now = now_iso();
    let mut data = db.lock();

    if let Some(existing) = data
        .diaries
        .iter_mut()
        .find(|d| d.user_id == user_id && d.diary_date == diary_date)
    {
        existing.mood_score = mood_score;
        existing.mood_score_desc = Some(mood_description(mood_score).to_string());
        existing.dominant_emotion = req.param_str("dominantEmotion");
        existing.emotion_triggers = req.param_str("emotionTriggers");
        existing.diary_content = req.param_str("diaryContent");
        existing.sleep_quality = optional_i32(req, "sleepQuality");
        existing.stress_level = optional_i32(req, "stressLevel");
        existing.updated_at = Some(now);
        return ok(existing.clone(), "Emotion diary saved");
    }

    let id = data.next_diary_id;
    data.next_diary_id += 1;
    let diary = EmotionDiary {
        id,
        user_id,
        diary_date,
        mood_score,
        mood_score_desc: Some(mood_description(mood_score).to_string()),
        dominant_emotion: req.param_str("dominantEmotion"),
        emotion_triggers: req.param_str("emotionTriggers"),
        diary_content: req.param_str("diaryContent"),
        sleep_quality: optional_i32(req, "sleepQuality"),
        stress_level: optional_i32(req, "stressLevel"),
        created_at: Some(now.clone()),
        updated_at: Some(now),
    };
    data.diaries.push(diary.clone());
    ok(diary, "Emotion diary saved")
}

fn diary_page(db: &MockDb, req: &MockRequest) -> ApiResponse<Value> {
    let Some(user_id) = db.current_user_id(req) else {
        return fail("Not logged in", "401");
    };

    let data = db.lock();
    let mut diaries: Vec<EmotionDiary> = data
        .diaries
        .iter()
        .filter(|d| d.user_id == user_id)
        .cloned()
        .collect();

    if let Some(start) = req.param_str("startDate") {
        diaries.retain(|d| d.diary_date >= start);
    }
    if let Some(end) = req.param_str("endDate") {
        diaries.retain(|d| d.diary_date <= end);
    }
    if let Some(min) = req.param_i64("minMoodScore") {
        diaries.retain(|d| i64::from(d.mood_score) >= min);
    }
    if let Some(max) = req.param_i64("maxMoodScore") {
        diaries.retain(|d| i64::from(d.mood_score) <= max);
    }
    if let Some(emotion) = req.param_str("dominantEmotion") {
        diaries.retain(|d| d.dominant_emotion.as_deref() == Some(emotion.as_str()));
    }
    diaries.sort_by(|a, b| b.diary_date.cmp(&a.diary_date));

    let current = req.param_i64("current").unwrap_or(1).max(1) as u64;
    let size = req.param_i64("size").unwrap_or(10).max(1) as u64;
    ok(paginate(&diaries, current, size), "Query successful")
}

fn average(values: &[i32]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mean = values.iter().map(|v| f64::from(*v)).sum::<f64>() / values.len() as f64;
    Some((mean * 10.0).round() / 10.0)
}

/// diary_statistics
///
/// Aggregates the caller's diaries over the last `days` days (default 7), ending today.
fn diary_statistics(db: &MockDb, req: &MockRequest) -> ApiResponse<Value> {
    let Some(user_id) = db.current_user_id(req) else {
        return fail("Not logged in", "401");
    };
    let days = req
        .param_i64("days")
        .filter(|d| *d > 0)
        .unwrap_or(DEFAULT_STATISTICS_DAYS);

    let end = today();
    let Some(start) = chrono::TimeDelta::try_days(days - 1)
        .and_then(|window| end.checked_sub_signed(window))
    else {
        return fail("days is out of range", "400");
    };
    let (start, end) = (
        start.format("%Y-%m-%d").to_string(),
        end.format("%Y-%m-%d").to_string(),
    );

    let mut diaries: Vec<EmotionDiary> = db
        .lock()
        .diaries
        .iter()
        .filter(|d| d.user_id == user_id && d.diary_date >= start && d.diary_date <= end)
        .cloned()
        .collect();
    diaries.sort_by(|a, b| a.diary_date.cmp(&b.diary_date));

    if diaries.is_empty() {
        return ok(
            json!({
                "totalDays": days,
                "recordedDays": 0,
                "completionRate": 0.0,
                "averageMoodScore": 0.0,
                "positiveDays": 0,
                "negativeDays": 0,
                "neutralDays": 0,
                "moodTrend": [],
                "emotionDistribution": {},
                "suggestions": ["Start keeping an emotion diary to build emotional awareness"],
            }),
            "Fetched statistics",
        );
    }

    let scores: Vec<i32> = diaries.iter().map(|d| d.mood_score).collect();
    let positive = scores.iter().filter(|s| **s >= 7).count();
    let negative = scores.iter().filter(|s| **s <= 4).count();
    let average_mood = average(&scores).unwrap_or_default();
    let sleep: Vec<i32> = diaries.iter().filter_map(|d| d.sleep_quality).collect();
    let stress: Vec<i32> = diaries.iter().filter_map(|d| d.stress_level).collect();
    let average_sleep = average(&sleep);
    let average_stress = average(&stress);

    let mut distribution: BTreeMap<String, u64> = BTreeMap::new();
    for emotion in diaries.iter().filter_map(|d| d.dominant_emotion.clone()) {
        *distribution.entry(emotion).or_default() += 1;
    }
    let emotion_distribution: Map<String, Value> = distribution
        .into_iter()
        .map(|(emotion, count)| (emotion, json!(count)))
        .collect();

    let mood_trend: Vec<Value> = diaries
        .iter()
        .map(|d| {
            json!({
                "date": d.diary_date.get(5..).unwrap_or(d.diary_date.as_str()).replace('-', "/"),
                "moodScore": d.mood_score,
                "dominantEmotion": d.dominant_emotion,
            })
        })
        .collect();

    let mut suggestions = Vec::new();
    if average_mood >= 7.0 {
        suggestions.push("Your mood is good overall; keep up your current routine");
    } else if average_mood <= 4.0 {
        suggestions.push("Your mood has been low; consider talking to a professional counsellor");
        suggestions.push("Moderate exercise and relaxation training may help");
    } else {
        suggestions.push("Your mood is average; plan more enjoyable and social activities");
    }
    if average_sleep.is_some_and(|s| s < 3.0) {
        suggestions.push("Sleep quality could improve; keep a regular schedule");
    }
    if average_stress.is_some_and(|s| s > 3.0) {
        suggestions.push("Stress is high; try meditation or deep breathing");
    }

    let completion_rate = ((diaries.len() as f64 / days as f64) * 100.0).round();
    ok(
        json!({
            "totalDays": days,
            "recordedDays": diaries.len(),
            "completionRate": completion_rate,
            "averageMoodScore": average_mood,
            "maxMoodScore": scores.iter().max(),
            "minMoodScore": scores.iter().min(),
            "positiveDays": positive,
            "negativeDays": negative,
            "neutralDays": diaries.len() - positive - negative,
            "averageSleepQuality": average_sleep,
            "averageStressLevel": average_stress,
            "moodTrend": mood_trend,
            "emotionDistribution": emotion_distribution,
            "suggestions": suggestions,
        }),
        "Fetched statistics",
    )
}

fn find_diary(db: &MockDb, req: &MockRequest, date: &str) -> ApiResponse<Value> {
    let Some(user_id) = db.current_user_id(req) else {
        return fail("Not logged in", "401");
    };
    let diary = db
        .lock()
        .diaries
        .iter()
        .find(|d| d.user_id == user_id && d.diary_date == date)
        .cloned();
    // No entry for the day is not an error: data is null.
    ok(diary, "Query successful")
}

fn today_diary(db: &MockDb, req: &MockRequest) -> ApiResponse<Value> {
    find_diary(db, req, &today().format("%Y-%m-%d").to_string())
}

fn diary_by_date(db: &MockDb, req: &MockRequest) -> ApiResponse<Value> {
    let date = req.path_param("date").unwrap_or_default().to_string();
    find_diary(db, req, &date)
}

fn get_diary(db: &MockDb, req: &MockRequest) -> ApiResponse<Value> {
    let Some(user_id) = db.current_user_id(req) else {
        return fail("Not logged in", "401");
    };
    let id = req.path_i64("id");
    let data = db.lock();
    match data.diaries.iter().find(|d| Some(d.id) == id) {
        Some(diary) if diary.user_id == user_id => ok(diary, "Query successful"),
        Some(_) => fail("No permission to view this diary", "403"),
        None => fail("Diary not found", "404"),
    }
}

fn delete_diary(db: &MockDb, req: &MockRequest) -> ApiResponse<Value> {
    let Some(user_id) = db.current_user_id(req) else {
        return fail("Not logged in", "401");
    };
    let id = req.path_i64("id");
    let mut data = db.lock();
    let Some(index) = data.diaries.iter().position(|d| Some(d.id) == id) else {
        return fail("Diary not found", "404");
    };
    if data.diaries[index].user_id != user_id {
        return fail("No permission to delete this diary", "403");
    }
    data.diaries.remove(index);
    ok(Value::Null, "Emotion diary deleted")
}

// --- Consultation ---

fn start_session(db: &MockDb, req: &MockRequest) -> ApiResponse<Value> {
    let Some(user_id) = db.current_user_id(req) else {
        return fail("Not logged in", "401");
    };
    let Some(initial_message) = req.param_str("initialMessage") else {
        return fail("initialMessage is required", "400");
    };

    let start_time = now_millis();
    let session = ChatSession {
        session_id: Uuid::new_v4().to_string(),
        user_hash: Some(user_id),
        initial_message,
        start_time,
        expiry_time: start_time + SESSION_TTL_MILLIS,
        status: "ACTIVE".to_string(),
    };
    db.lock().chat_sessions.push(session.clone());
    ok(session, "Session created")
}

// --- AI analysis queue ---

fn task_page(db: &MockDb, req: &MockRequest) -> ApiResponse<Value> {
    let data = db.lock();
    let mut tasks = data.ai_tasks.clone();

    if let Some(status) = req.param_str("status") {
        tasks.retain(|t| t.status == status);
    }
    if let Some(task_type) = req.param_str("taskType") {
        tasks.retain(|t| t.task_type == task_type);
    }
    if let Some(user_id) = req.param_i64("userId") {
        tasks.retain(|t| t.user_id == user_id);
    }
    if let Some(username) = req.param_str("username") {
        tasks.retain(|t| t.username.as_deref().is_some_and(|u| u.contains(&username)));
    }
    if let Some(priority) = req.param_i64("priority") {
        tasks.retain(|t| i64::from(t.priority) == priority);
    }
    if req.param_bool("failedOnly") == Some(true) {
        tasks.retain(|t| t.status == "FAILED");
    }
    if req.param_bool("retryableOnly") == Some(true) {
        tasks.retain(|t| t.retryable());
    }
    tasks.sort_by(|a, b| b.id.cmp(&a.id));

    let current = req.param_i64("current").unwrap_or(1).max(1) as u64;
    let size = req.param_i64("size").unwrap_or(10).max(1) as u64;
    ok(paginate(&tasks, current, size), "Query successful")
}

fn task_statistics(db: &MockDb, _req: &MockRequest) -> ApiResponse<Value> {
    let data = db.lock();
    let count = |status: &str| data.ai_tasks.iter().filter(|t| t.status == status).count();

    let mut by_type: BTreeMap<String, u64> = BTreeMap::new();
    for task in &data.ai_tasks {
        *by_type.entry(task.task_type.clone()).or_default() += 1;
    }

    ok(
        json!({
            "totalTasks": data.ai_tasks.len(),
            "pendingTasks": count("PENDING"),
            "processingTasks": count("PROCESSING"),
            "completedTasks": count("COMPLETED"),
            "failedTasks": count("FAILED"),
            "retryableTasks": data.ai_tasks.iter().filter(|t| t.retryable()).count(),
            "taskTypeStats": by_type,
        }),
        "Fetched statistics",
    )
}

/// Resets a FAILED task with retries left back to PENDING. The error carries the envelope
/// code and the reason the task cannot be retried.
fn reset_for_retry(db: &MockDb, task_id: i64) -> Result<(), (&'static str, String)> {
    let mut data = db.lock();
    let Some(task) = data.ai_tasks.iter_mut().find(|t| t.id == task_id) else {
        return Err(("404", "Task not found".to_string()));
    };
    if !task.retryable() {
        let reason = if task.retry_count >= task.max_retry_count {
            "Task cannot be retried: maximum retries reached"
        } else {
            "Task cannot be retried: status does not allow it"
        };
        return Err(("400", reason.to_string()));
    }

    task.status = "PENDING".to_string();
    task.error_message = None;
    task.can_retry = false;
    task.updated_at = Some(now_iso());
    Ok(())
}

fn retry_task(db: &MockDb, req: &MockRequest) -> ApiResponse<Value> {
    let Some(task_id) = req.path_i64("id") else {
        return fail("Task not found", "404");
    };
    match reset_for_retry(db, task_id) {
        Ok(()) => ok(Value::Null, "Task retry triggered"),
        Err((code, reason)) => fail(&reason, code),
    }
}

/// batch_retry
///
/// Body is a bare JSON array of task ids. Each id is retried independently; failures are
/// collected into `failReasons` rather than failing the batch.
fn batch_retry(db: &MockDb, req: &MockRequest) -> ApiResponse<Value> {
    let Some(Value::Array(raw_ids)) = &req.body else {
        return fail("Provide the list of task ids to retry", "400");
    };

    let mut result = BatchOperationResult {
        total_count: raw_ids.len() as u64,
        ..Default::default()
    };
    for raw in raw_ids {
        let outcome = match lenient_i64(raw) {
            Some(task_id) => {
                reset_for_retry(db, task_id).map_err(|(_, reason)| (task_id.to_string(), reason))
            }
            None => Err((raw.to_string(), "Invalid task id".to_string())),
        };
        match outcome {
            Ok(()) => result.success_count += 1,
            Err((id, reason)) => {
                tracing::warn!("Batch retry failed for task {}: {}", id, reason);
                result.fail_count += 1;
                result.fail_reasons.push(format!("Task {}: {}", id, reason));
            }
        }
    }
    ok(result, "Batch retry submitted")
}
