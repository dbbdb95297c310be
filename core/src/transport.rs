//! Executors for `HttpRequest` values.
//!
//! `SyncTransport` runs one request at a time on the calling thread through a
//! `ureq::Agent`. `AsyncTransport` wraps a `reqwest::Client`, whose connection
//! pool serves the concurrent batches issued by `pool`. Neither retries:
//! a transport failure is reported as-is for the request that hit it.

use std::time::Duration;

use futures::future::join_all;
use tracing::debug;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

#[derive(Clone)]
pub struct SyncTransport {
    agent: ureq::Agent,
}

impl SyncTransport {
    pub fn new(timeout: Duration) -> Self {
        // Status codes are data here; the client decides what a 4xx means.
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .build()
            .new_agent();
        Self { agent }
    }

    pub fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        debug!(method = %request.method, url = %request.url, "dispatching request");

        let result = match request.method {
            HttpMethod::Get => with_headers(self.agent.get(request.url.as_str()), &request.headers).call(),
            HttpMethod::Delete => {
                with_headers(self.agent.delete(request.url.as_str()), &request.headers).call()
            }
            HttpMethod::Post => send_body(
                with_headers(self.agent.post(request.url.as_str()), &request.headers),
                request.body.as_deref(),
            ),
            HttpMethod::Put => send_body(
                with_headers(self.agent.put(request.url.as_str()), &request.headers),
                request.body.as_deref(),
            ),
        };
        let mut response = result.map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        // No cap, as on the pooled path: raw messages carry their attachments.
        let body = response
            .body_mut()
            .with_config()
            .limit(u64::MAX)
            .read_to_vec()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        debug!(status, bytes = body.len(), "received response");
        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn with_headers<B>(mut builder: ureq::RequestBuilder<B>, headers: &[(String, String)]) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

fn send_body(
    builder: ureq::RequestBuilder<ureq::typestate::WithBody>,
    body: Option<&str>,
) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
    match body {
        Some(body) => builder.send(body.as_bytes()),
        None => builder.send_empty(),
    }
}

#[derive(Debug, Clone)]
pub struct AsyncTransport {
    client: reqwest::Client,
}

impl AsyncTransport {
    pub fn new(timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    pub async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        debug!(method = %request.method, url = %request.url, "dispatching pooled request");

        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        };
        let mut builder = self.client.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        let headers = collect_headers(response.headers());
        let body = response
            .bytes()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?
            .to_vec();

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }

    /// Run every request concurrently. Results are in input order.
    pub async fn pool(&self, requests: Vec<HttpRequest>) -> Vec<Result<HttpResponse, ApiError>> {
        debug!(count = requests.len(), "dispatching pool");
        join_all(requests.into_iter().map(|request| self.execute(request))).await
    }
}

fn collect_headers(headers: &reqwest::header::HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_string(), value.to_string()))
        })
        .collect()
}
