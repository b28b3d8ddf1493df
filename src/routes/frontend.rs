use super::{RouteDescriptor, Section};

/// Frontend Route Module
///
/// Pages served to visitors and ordinary users. Pages holding personal data
/// (profile, consultation, diaries, favorites) require a login; browsing the knowledge
/// library does not.
pub fn routes() -> Vec<RouteDescriptor> {
    vec![
        RouteDescriptor::page("/", "Home", "Home", Section::Frontend),
        RouteDescriptor::page("/profile", "Profile", "Profile Center", Section::Frontend)
            .requiring_auth(),
        RouteDescriptor::page("/knowledge", "Knowledge", "Knowledge Base", Section::Frontend),
        RouteDescriptor::page(
            "/knowledge/article/:id",
            "ArticleDetail",
            "Article Detail",
            Section::Frontend,
        ),
        RouteDescriptor::page(
            "/consultation",
            "Consultation",
            "AI Consultation",
            Section::Frontend,
        )
        .requiring_auth(),
        RouteDescriptor::page(
            "/emotion-diary",
            "EmotionDiary",
            "Emotion Diary",
            Section::Frontend,
        )
        .requiring_auth(),
        RouteDescriptor::page(
            "/emotion-diary/:id",
            "EmotionDiaryDetail",
            "Emotion Diary Detail",
            Section::Frontend,
        )
        .requiring_auth(),
        RouteDescriptor::page("/favorites", "MyFavorites", "My Favorites", Section::Frontend)
            .requiring_auth(),
        // --- Auth pages ---
        RouteDescriptor::page("/auth/login", "Login", "Login", Section::Auth),
        RouteDescriptor::page("/auth/register", "Register", "Register", Section::Auth),
        RouteDescriptor::redirect("/login", "/auth/login", Section::Auth),
        RouteDescriptor::redirect("/register", "/auth/register", Section::Auth),
        // --- Development test pages ---
        RouteDescriptor::page("/mock-test", "MockTest", "Mock Test", Section::Frontend),
        RouteDescriptor::page(
            "/knowledge-test",
            "KnowledgeTest",
            "Knowledge Module Test",
            Section::Frontend,
        ),
        RouteDescriptor::page(
            "/rich-text-editor-test",
            "RichTextEditorTest",
            "Rich Text Editor Test",
            Section::Frontend,
        ),
        RouteDescriptor::page(
            "/simple-font-test",
            "SimpleFontTest",
            "Simple Font Test",
            Section::Frontend,
        ),
    ]
}
