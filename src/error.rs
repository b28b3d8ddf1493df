use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

/// ApiError
///
/// Everything an API wrapper can reject with. Transport and application failures reach the
/// caller through the same `Result`; the variant tells them apart.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The exchange itself failed: network unreachable, timeout, or a non-2xx HTTP status.
    #[error("transport failure: {message}")]
    Transport {
        status: Option<u16>,
        message: String,
    },

    /// The server answered, but the envelope carried a non-success code.
    #[error("request rejected ({code}): {msg}")]
    Application { code: String, msg: String },

    /// A payload did not (de)serialize: the request's query or body, or a successful
    /// envelope's `data` that does not match the expected shape.
    #[error("payload serialization failed: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    pub fn transport(status: Option<u16>, message: impl Into<String>) -> Self {
        ApiError::Transport {
            status,
            message: message.into(),
        }
    }

    pub fn application(code: impl Into<String>, msg: impl Into<String>) -> Self {
        ApiError::Application {
            code: code.into(),
            msg: msg.into(),
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport { .. })
    }

    pub fn is_application(&self) -> bool {
        matches!(self, ApiError::Application { .. })
    }

    /// Envelope code for application failures, HTTP status for transport failures.
    pub fn code(&self) -> Option<String> {
        match self {
            ApiError::Application { code, .. } => Some(code.clone()),
            ApiError::Transport {
                status: Some(status),
                ..
            } => Some(status.to_string()),
            _ => None,
        }
    }

    /// Human-readable message, suitable for a toast.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Application { msg, .. } => msg.clone(),
            ApiError::Transport { message, .. } => message.clone(),
            ApiError::Decode(e) => e.to_string(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        ApiError::Transport {
            status: e.status().map(|status| status.as_u16()),
            message: e.to_string(),
        }
    }
}

/// NavigationError
///
/// Policy denials are redirects, not errors. Both variants indicate a misconfigured
/// route table.
#[derive(Debug, Error, PartialEq)]
pub enum NavigationError {
    #[error("navigation to {target} did not settle after {hops} redirects")]
    RedirectLoop { target: String, hops: usize },

    /// No route matched and the table has no catch-all.
    #[error("no route matches {path}")]
    NoRoute { path: String },
}
