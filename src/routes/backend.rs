use super::{RouteDescriptor, Section};

/// Landing page of the management console.
pub const DASHBOARD_PATH: &str = "/back/dashboard";

/// Backend Route Module
///
/// The management console under `/back`. Descriptors here do not set `requires_auth`;
/// section membership alone makes the guard demand a non-USER login.
pub fn routes() -> Vec<RouteDescriptor> {
    vec![
        RouteDescriptor::redirect("/back", DASHBOARD_PATH, Section::Backend),
        RouteDescriptor::page(DASHBOARD_PATH, "Dashboard", "Data Analytics", Section::Backend),
        RouteDescriptor::page(
            "/back/user",
            "UserManagement",
            "User Management",
            Section::Backend,
        ),
        RouteDescriptor::page(
            "/back/knowledge",
            "KnowledgeManagement",
            "Knowledge Articles",
            Section::Backend,
        ),
        RouteDescriptor::page(
            "/back/knowledge-category",
            "KnowledgeCategoryManagement",
            "Category Management",
            Section::Backend,
        ),
        RouteDescriptor::page(
            "/back/consultations",
            "ConsultationManagement",
            "Consultation Records",
            Section::Backend,
        ),
        RouteDescriptor::page(
            "/back/emotion-diary",
            "EmotionDiaryManagement",
            "Emotion Diary",
            Section::Backend,
        ),
        RouteDescriptor::page(
            "/back/ai-analysis-queue",
            "AiAnalysisQueue",
            "AI Analysis Queue",
            Section::Backend,
        ),
        RouteDescriptor::page(
            "/back/knowledge-test",
            "KnowledgeArticleTest",
            "Article Test",
            Section::Backend,
        ),
        RouteDescriptor::page("/back/profile", "BackendProfile", "Profile", Section::Backend),
    ]
}
