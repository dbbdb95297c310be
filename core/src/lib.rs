//! Typed client for the Nylas email, calendar and contacts REST API.
//!
//! # Overview
//! Caller parameters are validated against per-endpoint schemas, turned into
//! `HttpRequest` values, authorized and dispatched either synchronously or
//! as a concurrent pool. Responses come back as decoded JSON, or as a parsed
//! `RawMessage` for raw message retrieval.
//!
//! # Design
//! - Every operation has a `build_*` method that does no I/O, so URLs,
//!   headers and bodies are checked without a server.
//! - Validation runs before anything is built; a rejected parameter never
//!   reaches the network.
//! - Transport is `ureq` for single calls and `reqwest` for pools. MIME
//!   parsing is `mail-parser`.
//!
//! ```no_run
//! use nylas_core::{params, NylasClient, Options};
//! use serde_json::json;
//!
//! let client = NylasClient::new(Options::from_env()?)?;
//! let unread = client.messages().list(&params(json!({"unread": true, "limit": 10})))?;
//! println!("{unread}");
//! # Ok::<(), nylas_core::ApiError>(())
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod mime;
pub mod request;
pub mod resources;
pub mod transport;
pub mod types;
pub mod validation;

pub use api::Endpoint;
pub use client::{parse_json, NylasClient};
pub use config::{Options, Region};
pub use error::{ApiError, Result};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use mime::RawMessage;
pub use request::RequestBuilder;
pub use types::{params, Params, PoolOutcome};
pub use validation::{Rule, ValidationError};
