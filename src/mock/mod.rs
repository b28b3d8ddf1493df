//! Mock Dispatch Table
//!
//! In-process stand-in for the backend, used when `MOCK_ENABLED` is on and by the
//! development mock server. The registry is built once at startup, then shared read-only.

use std::{collections::HashMap, fmt, sync::Arc};

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::{api::HttpMethod, models::ApiResponse};

/// Fixture state shared by every handler.
pub mod store;

/// `/user/*`
pub mod user;

/// `/knowledge/category/*`, `/knowledge/article/*`, `/knowledge/favorite/*`
pub mod knowledge;

/// `/file/*`
pub mod file;

/// Emotion diary, consultation sessions and the AI analysis queue.
pub mod wellbeing;

pub use store::MockDb;

/// MockHandler
///
/// A fixture endpoint. Handlers are synchronous and always answer with an envelope;
/// business failures are error envelopes, never panics.
pub type MockHandler = Arc<dyn Fn(&MockRequest) -> ApiResponse<Value> + Send + Sync>;

/// A file received in a multipart request.
#[derive(Debug, Clone, Default)]
pub struct UploadedFile {
    pub field_name: String,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// MockRequest
///
/// What a handler sees of a request: query and body fields are merged into `params`
/// (body wins), the raw JSON body is kept for endpoints that take a bare array.
#[derive(Debug, Clone)]
pub struct MockRequest {
    pub method: HttpMethod,
    pub path: String,
    pub params: Map<String, Value>,
    pub body: Option<Value>,
    pub path_params: HashMap<String, String>,
    pub files: Vec<UploadedFile>,
    pub bearer: Option<String>,
}

impl MockRequest {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            params: Map::new(),
            body: None,
            path_params: HashMap::new(),
            files: Vec::new(),
            bearer: None,
        }
    }

    pub fn with_param(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.params.insert(key.to_string(), value.into());
        self
    }

    pub fn with_query_pairs<'a>(
        mut self,
        pairs: impl IntoIterator<Item = (&'a String, &'a String)>,
    ) -> Self {
        for (key, value) in pairs {
            self.params
                .insert(key.clone(), Value::String(value.clone()));
        }
        self
    }

    /// Object bodies are merged into `params`; any body is kept verbatim in `body`.
    pub fn with_json_body(mut self, body: Value) -> Self {
        if let Value::Object(fields) = &body {
            for (key, value) in fields {
                self.params.insert(key.clone(), value.clone());
            }
        }
        self.body = Some(body);
        self
    }

    pub fn with_file(mut self, file: UploadedFile) -> Self {
        self.files.push(file);
        self
    }

    pub fn with_bearer(mut self, token: Option<String>) -> Self {
        self.bearer = token;
        self
    }

    /// String view of a param. Numbers and booleans are stringified; empty strings are absent.
    pub fn param_str(&self, key: &str) -> Option<String> {
        match self.params.get(key)? {
            Value::String(s) if s.trim().is_empty() => None,
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Integer param, accepting either a JSON number or a numeric string.
    pub fn param_i64(&self, key: &str) -> Option<i64> {
        lenient_i64(self.params.get(key)?)
    }

    pub fn param_bool(&self, key: &str) -> Option<bool> {
        match self.params.get(key)? {
            Value::Bool(b) => Some(*b),
            Value::String(s) => match s.as_str() {
                "true" | "1" => Some(true),
                "false" | "0" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn path_param(&self, key: &str) -> Option<&str> {
        self.path_params.get(key).map(String::as_str)
    }

    pub fn path_i64(&self, key: &str) -> Option<i64> {
        self.path_param(key)?.parse().ok()
    }

    /// Deserializes the merged params into a typed payload.
    pub fn params_as<T: DeserializeOwned>(&self) -> Option<T> {
        serde_json::from_value(Value::Object(self.params.clone())).ok()
    }
}

/// Accepts `3`, `3.0` and `"3"`.
pub fn lenient_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[derive(Clone)]
struct MockRoute {
    method: HttpMethod,
    pattern: String,
    handler: MockHandler,
}

impl MockRoute {
    fn literal_segments(&self) -> usize {
        self.pattern
            .split('/')
            .filter(|segment| !segment.is_empty() && !segment.starts_with(':'))
            .count()
    }

    fn is_pattern(&self) -> bool {
        self.pattern.split('/').any(|segment| segment.starts_with(':'))
    }

    fn capture(&self, path: &str) -> Option<HashMap<String, String>> {
        let expected: Vec<&str> = self.pattern.split('/').filter(|s| !s.is_empty()).collect();
        let actual: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        if expected.len() != actual.len() {
            return None;
        }

        let mut params = HashMap::new();
        for (pattern, given) in expected.iter().zip(actual.iter()) {
            if let Some(name) = pattern.strip_prefix(':') {
                params.insert(name.to_string(), given.to_string());
            } else if pattern != given {
                return None;
            }
        }
        Some(params)
    }
}

/// A successful lookup: the handler plus the path params its pattern captured.
#[derive(Clone)]
pub struct MockMatch {
    pub key: String,
    pub handler: MockHandler,
    pub path_params: HashMap<String, String>,
}

impl fmt::Debug for MockMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockMatch")
            .field("key", &self.key)
            .field("path_params", &self.path_params)
            .finish_non_exhaustive()
    }
}

/// MockRegistry
///
/// `METHOD_path -> handler` table. Constructed explicitly and passed around by reference
/// (or behind an `Arc`), so every test can own an isolated registry.
#[derive(Clone, Default)]
pub struct MockRegistry {
    routes: Vec<MockRoute>,
    index: HashMap<String, usize>,
}

impl fmt::Debug for MockRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockRegistry")
            .field("keys", &self.keys())
            .finish()
    }
}

impl MockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every fixture endpoint registered against a fresh fixture database.
    pub fn with_fixtures(token_secret: &str) -> Self {
        let db = MockDb::seeded(token_secret);
        let mut registry = Self::new();
        user::register(&mut registry, &db);
        knowledge::register(&mut registry, &db);
        file::register(&mut registry, &db);
        wellbeing::register(&mut registry, &db);
        tracing::info!("Mock registry ready with {} endpoints", registry.len());
        registry
    }

    pub fn key(method: HttpMethod, pattern: &str) -> String {
        format!("{}_{}", method.as_str(), pattern)
    }

    /// register
    ///
    /// Registering an existing key replaces its handler in place.
    pub fn register<F>(&mut self, method: HttpMethod, pattern: &str, handler: F)
    where
        F: Fn(&MockRequest) -> ApiResponse<Value> + Send + Sync + 'static,
    {
        self.register_handler(method, pattern, Arc::new(handler));
    }

    pub fn register_handler(&mut self, method: HttpMethod, pattern: &str, handler: MockHandler) {
        let key = Self::key(method, pattern);
        tracing::debug!("Registering mock endpoint {}", key);

        match self.index.get(&key) {
            Some(&slot) => self.routes[slot].handler = handler,
            None => {
                self.index.insert(key, self.routes.len());
                self.routes.push(MockRoute {
                    method,
                    pattern: pattern.to_string(),
                    handler,
                });
            }
        }
    }

    /// lookup
    ///
    /// An exact `METHOD_path` key wins. Otherwise the `:param` pattern of the same method
    /// with the most literal segments matches; ties go to the earliest registration.
    pub fn lookup(&self, method: HttpMethod, path: &str) -> Option<MockMatch> {
        let key = Self::key(method, path);
        if let Some(&slot) = self.index.get(&key) {
            return Some(MockMatch {
                key,
                handler: self.routes[slot].handler.clone(),
                path_params: HashMap::new(),
            });
        }

        let mut best: Option<(&MockRoute, HashMap<String, String>, usize)> = None;
        for route in self
            .routes
            .iter()
            .filter(|route| route.method == method && route.is_pattern())
        {
            let Some(params) = route.capture(path) else {
                continue;
            };
            let score = route.literal_segments();
            if best.as_ref().is_none_or(|(_, _, best_score)| score > *best_score) {
                best = Some((route, params, score));
            }
        }

        let found = best.map(|(route, path_params, _)| MockMatch {
            key: Self::key(route.method, &route.pattern),
            handler: route.handler.clone(),
            path_params,
        });

        match &found {
            Some(found) => tracing::debug!("Mock lookup {} matched {}", key, found.key),
            None => tracing::debug!("Mock lookup {} found no handler", key),
        }
        found
    }

    /// dispatch
    ///
    /// Looks up the handler for the request and runs it with the captured path params.
    /// `None` when nothing is registered for the method and path.
    pub fn dispatch(&self, mut request: MockRequest) -> Option<ApiResponse<Value>> {
        let found = self.lookup(request.method, &request.path)?;
        request.path_params = found.path_params;
        Some((found.handler)(&request))
    }

    /// Registered keys in registration order.
    pub fn keys(&self) -> Vec<String> {
        self.routes
            .iter()
            .map(|route| Self::key(route.method, &route.pattern))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// Fixture handler bound to the shared fixture database.
pub type FixtureFn = fn(&MockDb, &MockRequest) -> ApiResponse<Value>;

/// Registers `handler` with its own clone of the fixture database.
pub fn bind(
    registry: &mut MockRegistry,
    db: &MockDb,
    method: HttpMethod,
    pattern: &str,
    handler: FixtureFn,
) {
    let db = db.clone();
    registry.register(method, pattern, move |request| handler(&db, request));
}

/// Slices one page out of `items`. `current` is 1-based; zero is treated as the first page
/// and a page past the end is empty.
pub fn paginate<T: Clone>(items: &[T], current: u64, size: u64) -> crate::models::Page<T> {
    let current = current.max(1);
    let size = size.max(1);
    let total = items.len() as u64;
    let start = (current - 1).saturating_mul(size).min(total);
    let end = start.saturating_add(size).min(total);

    crate::models::Page {
        records: items[start as usize..end as usize].to_vec(),
        total,
        current,
        size,
        pages: Some(total.div_ceil(size)),
    }
}

/// Serializes a fixture payload into a success envelope.
pub fn ok<T: serde::Serialize>(data: T, msg: &str) -> ApiResponse<Value> {
    match serde_json::to_value(data) {
        Ok(Value::Null) => ApiResponse::empty(msg),
        Ok(value) => ApiResponse::success(value, msg),
        Err(e) => ApiResponse::error(format!("Failed to encode fixture: {}", e), "500"),
    }
}

pub fn fail(msg: &str, code: &str) -> ApiResponse<Value> {
    ApiResponse::error(msg, code)
}
