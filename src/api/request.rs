use std::{fmt, time::Duration};

use serde::Serialize;
use serde_json::Value;

use crate::models::UploadFile;

/// HTTP verbs used by the backend API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// Case-insensitive; anything other than the four supported verbs is `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_uppercase().as_str() {
            "GET" => Some(HttpMethod::Get),
            "POST" => Some(HttpMethod::Post),
            "PUT" => Some(HttpMethod::Put),
            "DELETE" => Some(HttpMethod::Delete),
            _ => None,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One field of a multipart form.
#[derive(Debug, Clone)]
pub enum FormPart {
    Text { name: String, value: String },
    File { name: String, file: UploadFile },
}

impl FormPart {
    pub fn text(name: &str, value: impl Into<String>) -> Self {
        FormPart::Text {
            name: name.to_string(),
            value: value.into(),
        }
    }

    pub fn file(name: &str, file: UploadFile) -> Self {
        FormPart::File {
            name: name.to_string(),
            file,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    #[default]
    None,
    Json(Value),
    Multipart(Vec<FormPart>),
}

/// RequestEnvelope
///
/// Transport-neutral description of one API call. `path` is relative to the API base path.
///
/// Builder steps never fail on their own: a query or body that cannot be serialized is kept
/// as `build_error` and surfaces when the envelope is executed.
#[derive(Debug, Clone)]
pub struct RequestEnvelope {
    pub method: HttpMethod,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: RequestBody,
    pub headers: Vec<(String, String)>,
    pub timeout: Option<Duration>,
    pub build_error: Option<String>,
}

impl RequestEnvelope {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: RequestBody::None,
            headers: Vec::new(),
            timeout: None,
            build_error: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    /// Appends the non-null fields of `query` as query pairs.
    pub fn with_query<T: Serialize>(mut self, query: &T) -> Self {
        match query_pairs(query) {
            Ok(pairs) => self.query.extend(pairs),
            Err(e) => self.fail_build(e),
        }
        self
    }

    pub fn with_query_pair(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn with_json<T: Serialize>(mut self, body: &T) -> Self {
        match serde_json::to_value(body) {
            Ok(value) => self.body = RequestBody::Json(value),
            Err(e) => self.fail_build(e),
        }
        self
    }

    /// Keeps the first serialization failure.
    fn fail_build(&mut self, error: serde_json::Error) {
        self.build_error.get_or_insert_with(|| error.to_string());
    }

    pub fn with_multipart(mut self, parts: Vec<FormPart>) -> Self {
        self.body = RequestBody::Multipart(parts);
        self
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// query_pairs
///
/// Flattens a serializable filter struct into query pairs. Nulls are skipped, arrays become
/// repeated keys, nested objects are sent as JSON text.
pub fn query_pairs<T: Serialize>(value: &T) -> Result<Vec<(String, String)>, serde_json::Error> {
    let mut pairs = Vec::new();
    let Value::Object(fields) = serde_json::to_value(value)? else {
        return Ok(pairs);
    };

    for (key, value) in fields {
        match value {
            Value::Null => {}
            Value::Array(items) => {
                for item in items {
                    pairs.push((key.clone(), scalar_to_string(item)));
                }
            }
            other => pairs.push((key, scalar_to_string(other))),
        }
    }
    Ok(pairs)
}

fn scalar_to_string(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}
