use crate::{
    RegistryState,
    api::HttpMethod,
    auth::BearerToken,
    mock::{MockRequest, UploadedFile},
    models::ApiResponse,
};
use axum::{
    Json,
    body::to_bytes,
    extract::{FromRequest, Multipart, Path, Query, Request, State},
    http::{Method, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::Value;

/// Largest JSON body the mock server reads.
const MAX_JSON_BODY: usize = 2 * 1024 * 1024;

// --- Handlers ---

/// health
///
/// Liveness probe for the mock server.
pub async fn health() -> &'static str {
    "ok"
}

/// dispatch
///
/// Catch-all under the API base path. Rebuilds a `MockRequest` from the HTTP request
/// (query pairs, JSON or multipart body, bearer token) and runs the registered handler.
///
/// Registered routes always answer HTTP 200 with the handler's envelope, business failures
/// included. Unregistered routes answer HTTP 404 with a `"404"` envelope.
pub async fn dispatch(
    State(registry): State<RegistryState>,
    method: Method,
    Path(path): Path<String>,
    BearerToken(bearer): BearerToken,
    Query(query): Query<Vec<(String, String)>>,
    request: Request,
) -> Response {
    let Some(method) = HttpMethod::parse(method.as_str()) else {
        return envelope_response(
            StatusCode::METHOD_NOT_ALLOWED,
            ApiResponse::error(format!("Method {} is not supported", method), "405"),
        );
    };

    let path = format!("/{}", path.trim_start_matches('/'));
    let mock = MockRequest::new(method, path.clone())
        .with_query_pairs(query.iter().map(|(k, v)| (k, v)))
        .with_bearer(bearer);

    let mock = match read_body(mock, request).await {
        Ok(mock) => mock,
        Err(message) => {
            tracing::warn!("Rejected body for {} {}: {}", method, path, message);
            return envelope_response(StatusCode::BAD_REQUEST, ApiResponse::error(message, "400"));
        }
    };

    match registry.dispatch(mock) {
        Some(response) => {
            tracing::debug!("{} {} -> code {}", method, path, response.code);
            envelope_response(StatusCode::OK, response)
        }
        None => {
            tracing::warn!("No mock handler for {} {}", method, path);
            envelope_response(
                StatusCode::NOT_FOUND,
                ApiResponse::error(format!("No mock handler for {} {}", method, path), "404"),
            )
        }
    }
}

fn envelope_response(status: StatusCode, body: ApiResponse<Value>) -> Response {
    (status, Json(body)).into_response()
}

fn is_multipart(request: &Request) -> bool {
    request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("multipart/form-data"))
}

/// Merges the request body into `mock`: multipart text fields become params and file
/// fields become uploads; any other non-empty body must be JSON.
async fn read_body(mut mock: MockRequest, request: Request) -> Result<MockRequest, String> {
    if is_multipart(&request) {
        let mut multipart = Multipart::from_request(request, &())
            .await
            .map_err(|e| e.body_text())?;

        while let Some(field) = multipart.next_field().await.map_err(|e| e.body_text())? {
            let name = field.name().unwrap_or_default().to_string();
            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let content_type = field
                        .content_type()
                        .unwrap_or("application/octet-stream")
                        .to_string();
                    let bytes = field.bytes().await.map_err(|e| e.body_text())?;
                    mock = mock.with_file(UploadedFile {
                        field_name: name,
                        file_name,
                        content_type,
                        bytes: bytes.to_vec(),
                    });
                }
                None => {
                    let value = field.text().await.map_err(|e| e.body_text())?;
                    mock = mock.with_param(&name, value);
                }
            }
        }
        return Ok(mock);
    }

    let bytes = to_bytes(request.into_body(), MAX_JSON_BODY)
        .await
        .map_err(|e| e.to_string())?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(mock);
    }

    let body: Value =
        serde_json::from_slice(&bytes).map_err(|e| format!("Invalid JSON body: {}", e))?;
    Ok(mock.with_json_body(body))
}
