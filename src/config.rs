use std::env;
use std::time::Duration;

/// AppConfig
///
/// Holds the client's entire configuration state. Loaded once at startup and treated as
/// immutable afterwards; the transport, the mock backend and the mock server all read from it.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Controls whether the mock layer may be enabled.
    pub env: Env,
    // Path prefix every API call is issued under (the build-time `/api` base).
    pub api_base_path: String,
    // Origin the base path is proxied to (scheme + host + port, no trailing slash).
    pub backend_origin: String,
    // When true, requests are answered by the in-process mock registry.
    pub mock_enabled: bool,
    // Bind address of the development mock server binary.
    pub mock_server_addr: String,
    // Secret used to sign and verify the mock backend's session tokens.
    pub mock_token_secret: String,
    // Default per-request timeout handed to the HTTP transport.
    pub request_timeout: Duration,
}

/// Env
///
/// Runtime context. Local enables the mock layer and development fallbacks; Production
/// demands a real backend origin.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

const DEFAULT_BASE_PATH: &str = "/api";
const DEFAULT_BACKEND_ORIGIN: &str = "http://localhost:1235";
const DEFAULT_MOCK_ADDR: &str = "0.0.0.0:1235";
const DEFAULT_TOKEN_SECRET: &str = "mindcare-local-mock-token-secret";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

impl Default for AppConfig {
    /// Test-safe configuration that needs no environment variables.
    fn default() -> Self {
        Self {
            env: Env::Local,
            api_base_path: DEFAULT_BASE_PATH.to_string(),
            backend_origin: DEFAULT_BACKEND_ORIGIN.to_string(),
            mock_enabled: true,
            mock_server_addr: "127.0.0.1:0".to_string(),
            mock_token_secret: DEFAULT_TOKEN_SECRET.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads every parameter from the environment (call `dotenv` first).
    ///
    /// # Panics
    /// Panics when `BACKEND_ORIGIN` is missing in production, so a production build can never
    /// silently talk to the development origin.
    pub fn load() -> Self {
        let env_str = env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());
        let env = match env_str.as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        let api_base_path = normalize_base_path(
            &env::var("API_BASE_PATH").unwrap_or_else(|_| DEFAULT_BASE_PATH.to_string()),
        );

        let request_timeout = env::var("REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|raw| raw.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));

        let mock_server_addr =
            env::var("MOCK_SERVER_ADDR").unwrap_or_else(|_| DEFAULT_MOCK_ADDR.to_string());

        match env {
            Env::Local => Self {
                env: Env::Local,
                api_base_path,
                backend_origin: env::var("BACKEND_ORIGIN")
                    .map(|origin| origin.trim_end_matches('/').to_string())
                    .unwrap_or_else(|_| DEFAULT_BACKEND_ORIGIN.to_string()),
                mock_enabled: env::var("MOCK_ENABLED")
                    .map(|flag| parse_flag(&flag))
                    .unwrap_or(true),
                mock_server_addr,
                mock_token_secret: env::var("MOCK_TOKEN_SECRET")
                    .unwrap_or_else(|_| DEFAULT_TOKEN_SECRET.to_string()),
                request_timeout,
            },
            Env::Production => Self {
                env: Env::Production,
                api_base_path,
                backend_origin: env::var("BACKEND_ORIGIN")
                    .expect("FATAL: BACKEND_ORIGIN required in prod")
                    .trim_end_matches('/')
                    .to_string(),
                // The mock layer never answers production traffic.
                mock_enabled: false,
                mock_server_addr,
                mock_token_secret: env::var("MOCK_TOKEN_SECRET")
                    .unwrap_or_else(|_| DEFAULT_TOKEN_SECRET.to_string()),
                request_timeout,
            },
        }
    }

    /// Full URL prefix of the API (`origin` + `base path`).
    pub fn api_root(&self) -> String {
        format!("{}{}", self.backend_origin, self.api_base_path)
    }
}

fn normalize_base_path(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
