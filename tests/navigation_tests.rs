use mindcare_portal::{
    NavigationError, Navigator,
    guard::{GuardDecision, RouteGuard, is_backend_path},
    navigation::MAX_REDIRECTS,
    routes::{Location, RouteDescriptor, RouteTable, Section},
    session::{Role, Session},
};

fn admin() -> Session {
    Session::logged_in(Role::Admin)
}

fn user() -> Session {
    Session::logged_in(Role::User)
}

fn resolve(path: &str) -> mindcare_portal::routes::ResolvedRoute {
    RouteTable::standard()
        .resolve(&Location::parse(path))
        .expect("standard table has a catch-all")
}

// --- Guard ---

#[test]
fn test_guard_sends_anonymous_to_login_with_redirect() {
    let decision = RouteGuard::new().evaluate(&resolve("/profile?tab=info"), &Session::anonymous());

    let GuardDecision::Redirect(location) = decision else {
        panic!("expected a redirect, got {:?}", decision);
    };
    assert_eq!(location.path, "/login");
    assert_eq!(location.query_value("redirect"), Some("/profile?tab=info"));
}

#[test]
fn test_guard_keeps_staff_in_backend() {
    let guard = RouteGuard::new();

    assert_eq!(
        guard.evaluate(&resolve("/back/user"), &admin()),
        GuardDecision::Allow
    );
    assert_eq!(
        guard.evaluate(&resolve("/knowledge"), &admin()),
        GuardDecision::Redirect(Location::new("/back/dashboard"))
    );
}

#[test]
fn test_guard_treats_unknown_roles_as_staff() {
    let counselor = Session::logged_in(Role::from_code("COUNSELOR"));

    assert_eq!(
        RouteGuard::new().evaluate(&resolve("/back/consultations"), &counselor),
        GuardDecision::Allow
    );
}

#[test]
fn test_guard_page_title() {
    let title = RouteGuard::new().page_title(&resolve("/knowledge"));
    assert_eq!(title.as_deref(), Some("Knowledge Base - Mental Health Assistant"));
}

#[test]
fn test_backend_prefix_is_segment_aware() {
    assert!(is_backend_path("/back"));
    assert!(is_backend_path("/back/user"));
    assert!(!is_backend_path("/backup"));
    assert!(!is_backend_path("/"));
}

// --- Navigation ---

#[test]
fn test_anonymous_protected_page_lands_on_login() {
    let outcome = Navigator::default()
        .navigate("/profile", &Session::anonymous())
        .unwrap();

    assert_eq!(outcome.path(), "/auth/login");
    assert_eq!(outcome.location.query_value("redirect"), Some("/profile"));
    assert_eq!(outcome.route_name.as_deref(), Some("Login"));
    assert!(outcome.was_redirected());
    assert_eq!(outcome.redirected_from, Some(Location::new("/profile")));
}

#[test]
fn test_anonymous_public_pages_are_allowed() {
    let navigator = Navigator::default();

    for path in ["/", "/knowledge", "/auth/login", "/auth/register", "/mock-test"] {
        let outcome = navigator.navigate(path, &Session::anonymous()).unwrap();
        assert_eq!(outcome.path(), path);
        assert!(!outcome.was_redirected());
    }
}

#[test]
fn test_anonymous_backend_goes_to_login_without_redirect_param() {
    let outcome = Navigator::default()
        .navigate("/back/user", &Session::anonymous())
        .unwrap();

    assert_eq!(outcome.path(), "/auth/login");
    assert_eq!(outcome.location.query_value("redirect"), None);
}

#[test]
fn test_anonymous_backend_root_follows_static_redirect_then_guard() {
    let outcome = Navigator::default()
        .navigate("/back", &Session::anonymous())
        .unwrap();

    assert_eq!(outcome.path(), "/auth/login");
}

#[test]
fn test_user_is_kept_out_of_backend() {
    let outcome = Navigator::default().navigate("/back/user", &user()).unwrap();

    assert_eq!(outcome.path(), "/");
    assert_eq!(outcome.route_name.as_deref(), Some("Home"));
}

#[test]
fn test_user_reaches_protected_frontend_pages() {
    let navigator = Navigator::default();

    for path in ["/profile", "/favorites", "/emotion-diary", "/emotion-diary/3"] {
        let outcome = navigator.navigate(path, &user()).unwrap();
        assert_eq!(outcome.path(), path);
    }
}

#[test]
fn test_admin_frontend_visit_lands_on_dashboard() {
    let outcome = Navigator::default().navigate("/", &admin()).unwrap();

    assert_eq!(outcome.path(), "/back/dashboard");
    assert_eq!(
        outcome.title.as_deref(),
        Some("Data Analytics - Mental Health Assistant")
    );
}

#[test]
fn test_logged_in_login_page_goes_home() {
    let navigator = Navigator::default();

    assert_eq!(navigator.navigate("/login", &admin()).unwrap().path(), "/back/dashboard");
    assert_eq!(navigator.navigate("/auth/login", &admin()).unwrap().path(), "/back/dashboard");
    assert_eq!(navigator.navigate("/login", &user()).unwrap().path(), "/");
    assert_eq!(navigator.navigate("/auth/login", &user()).unwrap().path(), "/");
}

#[test]
fn test_static_redirect_keeps_query() {
    let outcome = Navigator::default()
        .navigate("/login?redirect=%2Ffavorites", &Session::anonymous())
        .unwrap();

    assert_eq!(outcome.path(), "/auth/login");
    assert_eq!(outcome.location.query_value("redirect"), Some("/favorites"));
}

#[test]
fn test_unknown_path_lands_on_not_found() {
    let outcome = Navigator::default()
        .navigate("/no/such/page", &Session::anonymous())
        .unwrap();

    assert_eq!(outcome.path(), "/404");
    assert_eq!(outcome.route_name.as_deref(), Some("404"));
}

#[test]
fn test_article_detail_captures_id() {
    let resolved = resolve("/knowledge/article/550e8400-e29b-41d4-a716-446655440001");

    assert_eq!(resolved.descriptor.name.as_deref(), Some("ArticleDetail"));
    assert_eq!(
        resolved.params.get("id").map(String::as_str),
        Some("550e8400-e29b-41d4-a716-446655440001")
    );
}

#[test]
fn test_navigation_is_deterministic() {
    let navigator = Navigator::default();
    let first = navigator.navigate("/favorites", &Session::anonymous()).unwrap();
    let second = navigator.navigate("/favorites", &Session::anonymous()).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_redirect_cycle_is_reported() {
    let table = RouteTable::new(vec![
        RouteDescriptor::redirect("/a", "/b", Section::Frontend),
        RouteDescriptor::redirect("/b", "/a", Section::Frontend),
    ]);

    let error = Navigator::new(table)
        .navigate("/a", &Session::anonymous())
        .unwrap_err();

    assert_eq!(
        error,
        NavigationError::RedirectLoop {
            target: "/a".to_string(),
            hops: MAX_REDIRECTS,
        }
    );
}

#[test]
fn test_table_without_catch_all_reports_no_route() {
    let table = RouteTable::new(vec![RouteDescriptor::page(
        "/",
        "Home",
        "Home",
        Section::Frontend,
    )]);

    let error = Navigator::new(table)
        .navigate("/missing", &Session::anonymous())
        .unwrap_err();

    assert_eq!(
        error,
        NavigationError::NoRoute {
            path: "/missing".to_string()
        }
    );
}
