use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde_json::Value;

use super::request::{FormPart, HttpMethod, RequestBody, RequestEnvelope};
use crate::{
    config::AppConfig,
    error::{ApiError, ApiResult},
    mock::{MockRegistry, MockRequest, UploadedFile},
    models::ApiResponse,
};

// 1. Transport Contract
/// Transport
///
/// Carries one `RequestEnvelope` to the backend and hands back the raw envelope.
/// Implementations only fail for transport-level problems; a non-success `code` is still
/// `Ok` here and is judged by the client.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(
        &self,
        request: RequestEnvelope,
        bearer: Option<String>,
    ) -> ApiResult<ApiResponse<Value>>;
}

/// TransportState
///
/// Shared handle the API client holds.
pub type TransportState = Arc<dyn Transport>;

// 2. The Real Implementation (reqwest)
/// HttpTransport
///
/// Talks to the real backend (or the mock server binary) at `{origin}{base path}`.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
    api_root: String,
}

impl HttpTransport {
    pub fn new(api_root: impl Into<String>, timeout: Duration) -> ApiResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_root: api_root.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &AppConfig) -> ApiResult<Self> {
        Self::new(config.api_root(), config.request_timeout)
    }

    pub fn api_root(&self) -> &str {
        &self.api_root
    }
}

fn reqwest_method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Delete => reqwest::Method::DELETE,
    }
}

fn multipart_form(parts: Vec<FormPart>) -> ApiResult<Form> {
    let mut form = Form::new();
    for part in parts {
        form = match part {
            FormPart::Text { name, value } => form.text(name, value),
            FormPart::File { name, file } => {
                let body = Part::bytes(file.bytes)
                    .file_name(file.file_name)
                    .mime_str(&file.content_type)?;
                form.part(name, body)
            }
        };
    }
    Ok(form)
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        request: RequestEnvelope,
        bearer: Option<String>,
    ) -> ApiResult<ApiResponse<Value>> {
        let url = format!("{}{}", self.api_root, request.path);
        let mut builder = self
            .client
            .request(reqwest_method(request.method), &url)
            .query(&request.query);

        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(token) = bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        builder = match request.body {
            RequestBody::None => builder,
            RequestBody::Json(body) => builder.json(&body),
            RequestBody::Multipart(parts) => builder.multipart(multipart_form(parts)?),
        };

        let response = builder.send().await.map_err(|e| {
            tracing::warn!("{} {} failed: {}", request.method, url, e);
            ApiError::from(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("{} {} answered HTTP {}", request.method, url, status);
            return Err(ApiError::transport(
                Some(status.as_u16()),
                format!("HTTP {} from {}", status, request.path),
            ));
        }

        Ok(response.json::<ApiResponse<Value>>().await?)
    }
}

// 3. The Mock Implementation (in-process registry)
/// MockTransport
///
/// Answers from a `MockRegistry` without touching the network. A request with no registered
/// handler fails the way an unknown route on the real server does: a transport error with
/// status 404.
#[derive(Clone, Debug)]
pub struct MockTransport {
    registry: Arc<MockRegistry>,
}

impl MockTransport {
    pub fn new(registry: Arc<MockRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &MockRegistry {
        &self.registry
    }
}

fn mock_request(request: RequestEnvelope, bearer: Option<String>) -> MockRequest {
    let mut mock = MockRequest::new(request.method, request.path)
        .with_query_pairs(request.query.iter().map(|(k, v)| (k, v)))
        .with_bearer(bearer);

    match request.body {
        RequestBody::None => {}
        RequestBody::Json(body) => mock = mock.with_json_body(body),
        RequestBody::Multipart(parts) => {
            for part in parts {
                mock = match part {
                    FormPart::Text { name, value } => mock.with_param(&name, value),
                    FormPart::File { name, file } => mock.with_file(UploadedFile {
                        field_name: name,
                        file_name: file.file_name,
                        content_type: file.content_type,
                        bytes: file.bytes,
                    }),
                };
            }
        }
    }
    mock
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(
        &self,
        request: RequestEnvelope,
        bearer: Option<String>,
    ) -> ApiResult<ApiResponse<Value>> {
        let method = request.method;
        let path = request.path.clone();

        match self.registry.dispatch(mock_request(request, bearer)) {
            Some(response) => Ok(response),
            None => {
                tracing::warn!("No mock handler for {} {}", method, path);
                Err(ApiError::transport(
                    Some(404),
                    format!("No mock handler for {} {}", method, path),
                ))
            }
        }
    }
}
