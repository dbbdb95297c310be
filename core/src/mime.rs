//! Raw RFC-822 messages.
//!
//! Parsing is delegated to `mail-parser`; this module only lifts the commonly
//! used fields into an owned struct so callers do not deal with the parser's
//! borrowed message type.

use mail_parser::{Address, MessageParser};

use crate::error::ApiError;

/// A raw message and the fields extracted from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMessage {
    pub subject: Option<String>,
    pub message_id: Option<String>,
    pub from: Vec<String>,
    pub to: Vec<String>,
    pub text_body: Option<String>,
    pub html_body: Option<String>,
    pub attachment_count: usize,
    pub raw: Vec<u8>,
}

impl RawMessage {
    pub fn parse(raw: Vec<u8>) -> Result<Self, ApiError> {
        if raw.is_empty() {
            return Err(ApiError::Mime("empty message body".to_string()));
        }
        let parsed = {
            let message = MessageParser::default()
                .parse(&raw[..])
                .ok_or_else(|| ApiError::Mime("message has no parsable headers".to_string()))?;
            RawMessage {
                subject: message.subject().map(str::to_string),
                message_id: message.message_id().map(str::to_string),
                from: addresses(message.from()),
                to: addresses(message.to()),
                text_body: message.body_text(0).map(|body| body.into_owned()),
                html_body: message.body_html(0).map(|body| body.into_owned()),
                attachment_count: message.attachment_count(),
                raw: Vec::new(),
            }
        };
        Ok(RawMessage { raw, ..parsed })
    }
}

fn addresses(address: Option<&Address<'_>>) -> Vec<String> {
    address
        .map(|address| {
            address
                .iter()
                .filter_map(|addr| addr.address())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
