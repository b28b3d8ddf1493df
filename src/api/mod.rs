//! API Gateway Client
//!
//! Typed wrappers over the backend REST API. Every call goes through `ApiClient::execute`,
//! which attaches the session token, unwraps the `{code, data, msg}` envelope and raises
//! the success/error notifications the caller asked for.

use std::{sync::Arc, time::Duration};

use serde::de::{DeserializeOwned, Error as _};
use serde_json::Value;

use crate::{
    config::AppConfig,
    error::{ApiError, ApiResult},
    mock::MockRegistry,
    session::SessionStore,
};

pub mod notify;
pub mod request;
pub mod transport;

// --- Endpoint Wrappers ---
pub mod ai_analysis_task;
pub mod consultation;
pub mod data_analytics;
pub mod emotion_diary;
pub mod file;
pub mod knowledge_article;
pub mod knowledge_category;
pub mod psychological_test;
pub mod user;
pub mod user_favorite;

pub use notify::{Notification, Notifier, NotifierState, RecordingNotifier, TracingNotifier};
pub use request::{FormPart, HttpMethod, RequestBody, RequestEnvelope};
pub use transport::{HttpTransport, MockTransport, Transport, TransportState};

/// RequestOptions
///
/// Per-call overrides. `success_msg` replaces the wrapper's default toast, `silent`
/// suppresses every toast, `show_error` controls error toasts alone. `headers` and
/// `timeout` go to the transport untouched.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub success_msg: Option<String>,
    pub silent: bool,
    pub show_error: bool,
    pub headers: Vec<(String, String)>,
    pub timeout: Option<Duration>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            success_msg: None,
            silent: false,
            show_error: true,
            headers: Vec::new(),
            timeout: None,
        }
    }
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn success_msg(mut self, message: impl Into<String>) -> Self {
        self.success_msg = Some(message.into());
        self
    }

    pub fn silent(mut self) -> Self {
        self.silent = true;
        self
    }

    pub fn hide_error(mut self) -> Self {
        self.show_error = false;
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// ApiClient
///
/// Cheap to clone; clones share the transport, the notifier and the session.
#[derive(Clone)]
pub struct ApiClient {
    transport: TransportState,
    notifier: NotifierState,
    session: SessionStore,
}

impl ApiClient {
    pub fn new(transport: TransportState, notifier: NotifierState, session: SessionStore) -> Self {
        Self {
            transport,
            notifier,
            session,
        }
    }

    /// from_config
    ///
    /// Mock transport when `mock_enabled` is set (over `registry`, or a freshly seeded one),
    /// otherwise HTTP against `api_root()`. Notifications go to the log.
    pub fn from_config(config: &AppConfig, registry: Option<Arc<MockRegistry>>) -> ApiResult<Self> {
        let transport: TransportState = if config.mock_enabled {
            let registry = registry.unwrap_or_else(|| {
                Arc::new(MockRegistry::with_fixtures(&config.mock_token_secret))
            });
            tracing::info!("API client answering from the mock registry");
            Arc::new(MockTransport::new(registry))
        } else {
            tracing::info!("API client talking to {}", config.api_root());
            Arc::new(HttpTransport::from_config(config)?)
        };

        Ok(Self::new(
            transport,
            Arc::new(TracingNotifier),
            SessionStore::new(),
        ))
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// execute
    ///
    /// Sends `request` and decodes the envelope's `data` into `T` (`null` data decodes into
    /// `()` or `Option`). A non-`"200"` code becomes `ApiError::Application` carrying the
    /// server's `msg`. An envelope whose query or body failed to serialize is never sent and
    /// fails as `ApiError::Decode`. Nothing is retried.
    pub async fn execute<T: DeserializeOwned>(
        &self,
        mut request: RequestEnvelope,
        opts: &RequestOptions,
        default_msg: Option<&str>,
    ) -> ApiResult<T> {
        if let Some(message) = request.build_error.take() {
            tracing::debug!("API {} {} not sent: {}", request.method, request.path, message);
            return Err(self.report(ApiError::Decode(serde_json::Error::custom(message)), opts));
        }

        request.headers.extend(opts.headers.iter().cloned());
        if opts.timeout.is_some() {
            request.timeout = opts.timeout;
        }

        let method = request.method;
        let path = request.path.clone();
        tracing::debug!("API {} {}", method, path);

        let response = match self.transport.send(request, self.session.token()).await {
            Ok(response) => response,
            Err(e) => return Err(self.report(e, opts)),
        };

        if !response.is_success() {
            tracing::debug!(
                "API {} {} rejected with code {}: {}",
                method,
                path,
                response.code,
                response.msg
            );
            return Err(self.report(ApiError::application(response.code, response.msg), opts));
        }

        let data: T = serde_json::from_value(response.data.unwrap_or(Value::Null))
            .map_err(|e| self.report(ApiError::from(e), opts))?;

        self.announce(opts, default_msg);
        Ok(data)
    }

    fn announce(&self, opts: &RequestOptions, default_msg: Option<&str>) {
        if opts.silent {
            return;
        }
        if let Some(message) = opts.success_msg.as_deref().or(default_msg) {
            self.notifier.success(message);
        }
    }

    fn report(&self, error: ApiError, opts: &RequestOptions) -> ApiError {
        if error.is_transport() {
            tracing::warn!("API transport failure: {}", error);
        }
        if opts.show_error && !opts.silent {
            self.notifier.error(&error.user_message());
        }
        error
    }

    // --- Endpoint groups ---

    pub fn user(&self) -> user::UserApi<'_> {
        user::UserApi::new(self)
    }

    pub fn file(&self) -> file::FileApi<'_> {
        file::FileApi::new(self)
    }

    pub fn knowledge_category(&self) -> knowledge_category::KnowledgeCategoryApi<'_> {
        knowledge_category::KnowledgeCategoryApi::new(self)
    }

    pub fn knowledge_article(&self) -> knowledge_article::KnowledgeArticleApi<'_> {
        knowledge_article::KnowledgeArticleApi::new(self)
    }

    pub fn user_favorite(&self) -> user_favorite::UserFavoriteApi<'_> {
        user_favorite::UserFavoriteApi::new(self)
    }

    pub fn emotion_diary(&self) -> emotion_diary::EmotionDiaryApi<'_> {
        emotion_diary::EmotionDiaryApi::new(self)
    }

    pub fn consultation(&self) -> consultation::ConsultationApi<'_> {
        consultation::ConsultationApi::new(self)
    }

    pub fn ai_analysis_task(&self) -> ai_analysis_task::AiAnalysisTaskApi<'_> {
        ai_analysis_task::AiAnalysisTaskApi::new(self)
    }

    pub fn data_analytics(&self) -> data_analytics::DataAnalyticsApi<'_> {
        data_analytics::DataAnalyticsApi::new(self)
    }

    pub fn psychological_test(&self) -> psychological_test::PsychologicalTestApi<'_> {
        psychological_test::PsychologicalTestApi::new(self)
    }
}
