//! Client entry point and response handling.
//!
//! # Design
//! `NylasClient` owns the configuration and both transports. Resource handles
//! (`events()`, `messages()`, ...) borrow the client and split every
//! operation into a `build_*` method that validates parameters and produces
//! an `HttpRequest`, and an executing method that sends it. The sync path
//! goes through `send`; batches keyed by ids go through `pool`.

use serde_json::{Map, Value};
use tracing::warn;

use crate::config::Options;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::request::RequestBuilder;
use crate::resources::{Calendars, Contacts, Events, Hosted, Management, Messages};
use crate::transport::{AsyncTransport, SyncTransport};
use crate::types::PoolOutcome;
use crate::validation::Rule;

#[derive(Clone)]
pub struct NylasClient {
    options: Options,
    sync: SyncTransport,
    pooled: AsyncTransport,
}

impl NylasClient {
    pub fn new(options: Options) -> Result<Self, ApiError> {
        let sync = SyncTransport::new(options.get_timeout());
        let pooled = AsyncTransport::new(options.get_timeout())?;
        Ok(Self {
            options,
            sync,
            pooled,
        })
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// A request builder rooted at the configured base URL.
    pub fn request(&self) -> RequestBuilder {
        RequestBuilder::new(&self.options.base_url())
    }

    /// The account access token, which must be a non-empty string.
    pub fn access_token(&self) -> Result<&str, ApiError> {
        let token = self
            .options
            .get_access_token()
            .ok_or(ApiError::MissingAccessToken)?;
        Rule::non_empty_string()
            .validate_named("access_token", &Value::String(token.to_string()))
            .map_err(|_| ApiError::MissingAccessToken)?;
        Ok(token)
    }

    pub fn hosted(&self) -> Hosted<'_> {
        Hosted::new(self)
    }

    pub fn management(&self) -> Management<'_> {
        Management::new(self)
    }

    pub fn events(&self) -> Events<'_> {
        Events::new(self)
    }

    pub fn messages(&self) -> Messages<'_> {
        Messages::new(self)
    }

    pub fn calendars(&self) -> Calendars<'_> {
        Calendars::new(self)
    }

    pub fn contacts(&self) -> Contacts<'_> {
        Contacts::new(self)
    }

    /// Dispatch synchronously and decode the JSON body.
    pub fn send(&self, request: HttpRequest) -> Result<Value, ApiError> {
        parse_json(self.send_raw(request)?)
    }

    /// Dispatch synchronously and return the response once its status is
    /// known to be 2xx.
    pub fn send_raw(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let response = self.sync.execute(&request)?;
        check_status(&response)?;
        Ok(response)
    }

    /// Dispatch every request concurrently and pair each result with the id
    /// at the same position. `ids` and `requests` must be the same length.
    pub async fn pool(
        &self,
        ids: Vec<String>,
        requests: Vec<HttpRequest>,
    ) -> Result<Vec<PoolOutcome>, ApiError> {
        if ids.len() != requests.len() {
            return Err(ApiError::Request(format!(
                "pool got {} ids for {} requests",
                ids.len(),
                requests.len()
            )));
        }
        let responses = self.pooled.pool(requests).await;
        Ok(ids
            .into_iter()
            .zip(responses)
            .map(|(id, response)| PoolOutcome {
                id,
                result: response.and_then(parse_json),
            })
            .collect())
    }
}

/// Decode a response body as JSON after checking its status.
///
/// An empty 2xx body (typical for DELETE) decodes to `{}`.
pub fn parse_json(response: HttpResponse) -> Result<Value, ApiError> {
    check_status(&response)?;
    if response.body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()));
    }
    serde_json::from_slice(&response.body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    warn!(status = response.status, "request failed");
    if response.status == 404 {
        return Err(ApiError::NotFound);
    }
    Err(ApiError::HttpError {
        status: response.status,
        body: error_message(response),
    })
}

/// The `message` field of a Nylas error body, or the body text itself.
fn error_message(response: &HttpResponse) -> String {
    serde_json::from_slice::<Value>(&response.body)
        .ok()
        .and_then(|body| body.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| response.text().into_owned())
}
