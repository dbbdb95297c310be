//! Request builder.
//!
//! Collects path segments, query, form and header parameters and turns them
//! into an `HttpRequest` for a given `Endpoint`. Nothing here performs I/O.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::Value;

use crate::api::Endpoint;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest};
use crate::types::Params;

#[derive(Debug, Clone)]
pub struct RequestBuilder {
    base_url: String,
    path: Vec<String>,
    query: Params,
    form: Params,
    headers: Vec<(String, String)>,
}

impl RequestBuilder {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            path: Vec::new(),
            query: Params::new(),
            form: Params::new(),
            headers: Vec::new(),
        }
    }

    /// Append path segments; they fill the endpoint's placeholders in order.
    pub fn set_path<I, S>(mut self, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.path.extend(segments.into_iter().map(Into::into));
        self
    }

    pub fn set_query(mut self, query: Params) -> Self {
        self.query.extend(query);
        self
    }

    /// Form parameters, sent as a JSON body.
    pub fn set_form_params(mut self, form: Params) -> Self {
        self.form.extend(form);
        self
    }

    /// Add headers. An `Authorization` value is treated as a raw credential
    /// and wrapped with `authorization_value`.
    pub fn set_header_params<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (name, value) in headers {
            let name = name.as_ref().to_ascii_lowercase();
            let value = if name == "authorization" {
                authorization_value(value.as_ref())
            } else {
                value.as_ref().to_string()
            };
            self.headers.retain(|(existing, _)| *existing != name);
            self.headers.push((name, value));
        }
        self
    }

    pub fn authorization(self, credential: &str) -> Self {
        self.set_header_params([("authorization", credential)])
    }

    pub fn get(self, endpoint: Endpoint) -> Result<HttpRequest, ApiError> {
        self.build(HttpMethod::Get, endpoint)
    }

    pub fn post(self, endpoint: Endpoint) -> Result<HttpRequest, ApiError> {
        self.build(HttpMethod::Post, endpoint)
    }

    pub fn put(self, endpoint: Endpoint) -> Result<HttpRequest, ApiError> {
        self.build(HttpMethod::Put, endpoint)
    }

    pub fn delete(self, endpoint: Endpoint) -> Result<HttpRequest, ApiError> {
        self.build(HttpMethod::Delete, endpoint)
    }

    fn build(mut self, method: HttpMethod, endpoint: Endpoint) -> Result<HttpRequest, ApiError> {
        let path = endpoint.render(&self.path).ok_or_else(|| {
            ApiError::Request(format!(
                "{} expects its placeholders filled, got {} path segment(s)",
                endpoint.template(),
                self.path.len()
            ))
        })?;

        let mut url = format!("{}{}", self.base_url, path);
        let query = encode_query(&self.query);
        if !query.is_empty() {
            url.push('?');
            url.push_str(&query);
        }

        let body = if self.form.is_empty() {
            None
        } else {
            let body = serde_json::to_string(&self.form)
                .map_err(|e| ApiError::SerializationError(e.to_string()))?;
            self.headers
                .push(("content-type".to_string(), "application/json".to_string()));
            Some(body)
        };

        Ok(HttpRequest {
            method,
            url,
            headers: self.headers,
            body,
        })
    }
}

/// `Basic base64("<credential>:")`, the scheme used for both access tokens
/// and the application client secret.
pub fn authorization_value(credential: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{credential}:")))
}

/// Encode query parameters. Arrays repeat their key, nulls are dropped and
/// nested objects are sent as JSON text.
pub fn encode_query(query: &Params) -> String {
    let mut pairs = Vec::new();
    for (key, value) in query {
        match value {
            Value::Null => {}
            Value::Array(items) => {
                for item in items {
                    if let Some(text) = scalar_text(item) {
                        pairs.push(pair(key, &text));
                    }
                }
            }
            other => {
                if let Some(text) = scalar_text(other) {
                    pairs.push(pair(key, &text));
                }
            }
        }
    }
    pairs.join("&")
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

fn pair(key: &str, value: &str) -> String {
    format!("{}={}", urlencoding::encode(key), urlencoding::encode(value))
}
