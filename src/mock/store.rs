use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

use chrono::{Local, Utc};

use super::MockRequest;
use crate::{
    auth::{Claims, TokenCodec},
    models::{
        AiAnalysisTask, Article, Category, ChatSession, EmotionDiary, FileInfo, MenuItem, UserInfo,
    },
};

/// Password every seeded account starts with.
pub const FIXTURE_PASSWORD: &str = "123456";

/// The seeded administrator. Cannot be disabled or deleted.
pub const ADMIN_USER_ID: i64 = 1;

/// MockData
///
/// All mutable fixture state. Only reachable through `MockDb::lock`.
#[derive(Debug, Default)]
pub struct MockData {
    pub users: Vec<UserInfo>,
    pub passwords: HashMap<i64, String>,
    pub next_user_id: i64,
    pub categories: Vec<Category>,
    pub next_category_id: i64,
    pub articles: Vec<Article>,
    // (user id, article id)
    pub favorites: Vec<(i64, String)>,
    pub files: Vec<FileInfo>,
    pub next_file_id: i64,
    pub diaries: Vec<EmotionDiary>,
    pub next_diary_id: i64,
    pub chat_sessions: Vec<ChatSession>,
    pub ai_tasks: Vec<AiAnalysisTask>,
}

impl MockData {
    pub fn user(&self, id: i64) -> Option<&UserInfo> {
        self.users.iter().find(|user| user.id == id)
    }

    pub fn user_mut(&mut self, id: i64) -> Option<&mut UserInfo> {
        self.users.iter_mut().find(|user| user.id == id)
    }

    pub fn article(&self, id: &str) -> Option<&Article> {
        self.articles.iter().find(|article| article.id == id)
    }

    pub fn article_mut(&mut self, id: &str) -> Option<&mut Article> {
        self.articles.iter_mut().find(|article| article.id == id)
    }

    pub fn is_favorite(&self, user_id: i64, article_id: &str) -> bool {
        self.favorites
            .iter()
            .any(|(user, article)| *user == user_id && article == article_id)
    }

    pub fn category_name(&self, id: i64) -> Option<String> {
        self.categories
            .iter()
            .find(|category| category.id == id)
            .map(|category| category.category_name.clone())
    }
}

/// MockDb
///
/// Cloneable handle to the fixture state plus the codec for session tokens.
/// Every handler closure owns a clone.
#[derive(Clone, Debug)]
pub struct MockDb {
    data: Arc<Mutex<MockData>>,
    tokens: TokenCodec,
}

impl MockDb {
    pub fn new(data: MockData, token_secret: &str) -> Self {
        Self {
            data: Arc::new(Mutex::new(data)),
            tokens: TokenCodec::new(token_secret),
        }
    }

    pub fn seeded(token_secret: &str) -> Self {
        Self::new(seed(), token_secret)
    }

    /// Fixture state survives a panicking handler; poisoning is ignored.
    pub fn lock(&self) -> MutexGuard<'_, MockData> {
        self.data.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn tokens(&self) -> &TokenCodec {
        &self.tokens
    }

    /// Claims of the request's bearer token, when present and valid.
    pub fn claims(&self, request: &MockRequest) -> Option<Claims> {
        self.tokens.verify(request.bearer.as_deref()?)
    }

    /// Id of the user the request's token was issued to.
    pub fn current_user_id(&self, request: &MockRequest) -> Option<i64> {
        self.claims(request).map(|claims| claims.sub)
    }
}

pub fn now_iso() -> String {
    Local::now().naive_local().format("%Y-%m-%dT%H:%M:%S").to_string()
}

pub fn today() -> chrono::NaiveDate {
    Local::now().date_naive()
}

pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

// --- Seed Data ---

fn seed() -> MockData {
    let users = seed_users();
    let passwords = users
        .iter()
        .map(|user| (user.id, FIXTURE_PASSWORD.to_string()))
        .collect();
    let articles = seed_articles();

    // Favorites reference the seeded article ids.
    let favorites = vec![
        (1, articles[0].id.clone()),
        (1, articles[1].id.clone()),
        (2, articles[0].id.clone()),
        (2, articles[2].id.clone()),
    ];

    MockData {
        next_user_id: users.len() as i64 + 1,
        users,
        passwords,
        next_category_id: 7,
        categories: seed_categories(),
        articles,
        favorites,
        files: Vec::new(),
        next_file_id: 1,
        diaries: seed_diaries(),
        next_diary_id: 4,
        chat_sessions: Vec::new(),
        ai_tasks: seed_ai_tasks(),
    }
}

#[allow(clippy::too_many_arguments)]
fn user(
    id: i64,
    username: &str,
    nickname: &str,
    gender: i32,
    birthday: &str,
    user_type: i32,
    status: i32,
    created_at: &str,
) -> UserInfo {
    UserInfo {
        id,
        username: username.to_string(),
        name: Some(nickname.to_string()),
        nickname: Some(nickname.to_string()),
        email: Some(format!("{}@example.com", username)),
        phone: Some(format!("1380013800{}", id - 1)),
        gender: Some(gender),
        birthday: Some(birthday.to_string()),
        avatar: Some(format!("/img/avatar/{}.jpg", username)),
        role_code: Some(if user_type == 2 { "ADMIN" } else { "USER" }.to_string()),
        user_type: Some(user_type),
        status: Some(status),
        token: None,
        menu_list: None,
        created_at: Some(created_at.to_string()),
        updated_at: Some("2024-08-30T10:00:00".to_string()),
    }
}

fn seed_users() -> Vec<UserInfo> {
    let mut admin = user(
        ADMIN_USER_ID,
        "admin",
        "System Administrator",
        1,
        "1985-01-01",
        2,
        1,
        "2024-01-01T00:00:00",
    );
    admin.menu_list = Some(vec![
        MenuItem {
            id: 1,
            name: "User Management".to_string(),
            path: "/back/user".to_string(),
            icon: Some("user".to_string()),
        },
        MenuItem {
            id: 2,
            name: "System Settings".to_string(),
            path: "/back/system".to_string(),
            icon: Some("setting".to_string()),
        },
    ]);

    vec![
        admin,
        user(2, "user001", "Ming", 1, "1990-05-15", 1, 1, "2024-02-01T00:00:00"),
        user(3, "user002", "Hong", 0, "1992-08-20", 1, 1, "2024-03-01T00:00:00"),
        user(4, "user003", "Yang", 1, "1988-12-10", 1, 0, "2024-04-01T00:00:00"),
    ]
}

fn category(id: i64, name: &str, code: &str, description: &str, icon: &str, articles: i64) -> Category {
    Category {
        id,
        parent_id: None,
        category_name: name.to_string(),
        category_code: Some(code.to_string()),
        description: Some(description.to_string()),
        icon: Some(icon.to_string()),
        sort_order: Some(id as i32),
        status: Some(1),
        article_count: Some(articles),
        children: None,
    }
}

fn seed_categories() -> Vec<Category> {
    vec![
        category(1, "Emotion Management", "emotion", "Recognising, regulating and managing emotions", "fas fa-heart", 15),
        category(2, "Anxiety & Depression", "anxiety", "Understanding and coping with anxiety and depression", "fas fa-brain", 12),
        category(3, "Work Stress", "work_stress", "Workplace stress and work-life balance", "fas fa-briefcase", 8),
        category(4, "Relationships", "relationships", "Communication and maintaining relationships", "fas fa-users", 10),
        category(5, "Sleep Health", "sleep", "Improving sleep quality and coping with sleep disorders", "fas fa-bed", 6),
        category(6, "Relaxation", "relaxation", "Meditation, breathing and other relaxation training", "fas fa-leaf", 9),
    ]
}

#[allow(clippy::too_many_arguments)]
fn article(
    suffix: u32,
    category_id: i64,
    category_name: &str,
    title: &str,
    summary: &str,
    content: &str,
    tags: &str,
    author: (i64, &str),
    counts: (i64, i64),
    published_at: &str,
) -> Article {
    Article {
        id: format!("550e8400-e29b-41d4-a716-44665544000{}", suffix),
        category_id: Some(category_id),
        category_name: Some(category_name.to_string()),
        title: title.to_string(),
        summary: Some(summary.to_string()),
        content: Some(content.to_string()),
        cover_image: Some(format!("/img/cover/article-{}.jpg", suffix)),
        tags: Some(tags.to_string()),
        author_id: Some(author.0),
        author_name: Some(author.1.to_string()),
        read_count: counts.0,
        favorite_count: counts.1,
        status: 1,
        is_favorited: None,
        published_at: Some(published_at.to_string()),
        created_at: Some(published_at.to_string()),
        updated_at: Some(published_at.to_string()),
    }
}

fn seed_articles() -> Vec<Article> {
    vec![
        article(
            1,
            1,
            "Emotion Management",
            "Managing Negative Emotions: Evidence-Based Methods and Practical Tips",
            "Negative emotions are a normal part of experience. Learning to recognise and regulate them protects mental health.",
            "<h2>What are negative emotions?</h2><p>Anger, fear, anxiety and sadness are normal reactions.</p><h2>Methods</h2><ul><li>Cognitive reframing</li><li>Mindfulness</li><li>Behavioural activation</li></ul>",
            "emotion management,mental health,coping",
            (1, "Dr. Zhang"),
            (2580, 128),
            "2024-01-15T10:00:00",
        ),
        article(
            2,
            6,
            "Relaxation",
            "A Beginner's Guide to Mindfulness Meditation",
            "Mindfulness meditation reduces stress and improves focus and emotional regulation.",
            "<h2>What is mindfulness?</h2><p>Attending to the present moment without judgement.</p><h2>Practices</h2><ul><li>Breath awareness</li><li>Body scan</li><li>Walking meditation</li></ul>",
            "mindfulness,meditation,relaxation,stress",
            (2, "Mentor Li"),
            (3210, 205),
            "2024-01-12T14:30:00",
        ),
        article(
            3,
            5,
            "Sleep Health",
            "Ten Evidence-Based Ways to Sleep Better",
            "Good sleep is essential to mental health. Ten proven methods to improve sleep quality.",
            "<h2>Sleep and mental health</h2><p>Sleep loss affects mood and attention.</p><h2>Methods</h2><ul><li>Keep a regular schedule</li><li>Limit blue light</li><li>Avoid late caffeine</li></ul>",
            "sleep,insomnia,sleep hygiene",
            (3, "Dr. Wang"),
            (1820, 95),
            "2024-01-10T09:00:00",
        ),
        article(
            4,
            3,
            "Work Stress",
            "Managing Workplace Stress and Work-Life Balance",
            "Workplace stress is a major factor in mental health. Healthy boundaries improve quality of life.",
            "<h2>Sources of stress</h2><p>Workload, relationships and unclear career paths.</p><h2>Strategies</h2><ul><li>Time management</li><li>Boundaries</li><li>Communication</li></ul>",
            "work stress,workplace health,balance",
            (4, "Counsellor Liu"),
            (4120, 312),
            "2024-01-08T16:45:00",
        ),
        article(
            5,
            2,
            "Anxiety & Depression",
            "Recognising and Coping with Anxiety Symptoms",
            "Moderate anxiety helps us meet challenges, but excessive anxiety disrupts daily life.",
            "<h2>Recognising anxiety</h2><p>Racing heart, tension, worry.</p><h2>Coping</h2><ul><li>4-7-8 breathing</li><li>Progressive muscle relaxation</li><li>Graded exposure</li></ul>",
            "anxiety,mental health,emotion regulation",
            (1, "Dr. Zhang"),
            (2890, 187),
            "2024-01-06T11:20:00",
        ),
        article(
            6,
            4,
            "Relationships",
            "The Psychology of Healthy Relationships",
            "Good relationships are a pillar of mental health. Principles and skills for building them.",
            "<h2>Why relationships matter</h2><p>They provide support and belonging.</p><h2>Principles</h2><ul><li>Honesty</li><li>Listening</li><li>Respect</li><li>Boundaries</li></ul>",
            "relationships,communication,social psychology",
            (5, "Expert Chen"),
            (1654, 98),
            "2024-01-04T13:15:00",
        ),
    ]
}

fn seed_diaries() -> Vec<EmotionDiary> {
    let today = today();
    let entry = |id: i64, days_ago: i64, mood: i32, emotion: &str, sleep: i32, stress: i32| {
        let date = today - chrono::Duration::days(days_ago);
        EmotionDiary {
            id,
            user_id: 2,
            diary_date: date.format("%Y-%m-%d").to_string(),
            mood_score: mood,
            mood_score_desc: Some(mood_description(mood).to_string()),
            dominant_emotion: Some(emotion.to_string()),
            emotion_triggers: None,
            diary_content: Some(format!("Felt mostly {} today.", emotion.to_lowercase())),
            sleep_quality: Some(sleep),
            stress_level: Some(stress),
            created_at: Some(format!("{}T21:00:00", date.format("%Y-%m-%d"))),
            updated_at: None,
        }
    };

    vec![
        entry(1, 3, 7, "Happy", 4, 2),
        entry(2, 2, 4, "Anxious", 2, 4),
        entry(3, 1, 6, "Calm", 3, 3),
    ]
}

fn seed_ai_tasks() -> Vec<AiAnalysisTask> {
    let make = |id: i64, status: &str, task_type: &str, retry_count: i32, error: Option<&str>| {
        let mut task = AiAnalysisTask {
            id,
            diary_id: Some(id),
            user_id: 2,
            username: Some("user001".to_string()),
            status: status.to_string(),
            task_type: task_type.to_string(),
            priority: 1,
            retry_count,
            max_retry_count: 3,
            error_message: error.map(str::to_string),
            can_retry: false,
            created_at: Some("2024-08-30T09:00:00".to_string()),
            updated_at: Some("2024-08-30T09:05:00".to_string()),
        };
        task.can_retry = task.retryable();
        task
    };

    vec![
        make(1, "COMPLETED", "AUTO", 0, None),
        make(2, "FAILED", "AUTO", 1, Some("Model timed out")),
        make(3, "FAILED", "MANUAL", 3, Some("Model timed out")),
        make(4, "PENDING", "ADMIN", 0, None),
        make(5, "PROCESSING", "BATCH", 0, None),
    ]
}

/// Label for a 1-10 mood score.
pub fn mood_description(score: i32) -> &'static str {
    match score {
        1 => "Terrible",
        2 => "Very bad",
        3 => "Bad",
        4 => "Slightly low",
        5 => "Average",
        6 => "Okay",
        7 => "Good",
        8 => "Very good",
        9 => "Great",
        10 => "Excellent",
        _ => "Invalid score",
    }
}
