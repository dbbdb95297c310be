//! Messages: listing, flag updates, pooled reads and raw MIME retrieval.

use serde_json::Value;

use crate::api::Endpoint;
use crate::client::NylasClient;
use crate::error::ApiError;
use crate::http::HttpRequest;
use crate::mime::RawMessage;
use crate::resources::{check_ids, paging_rules};
use crate::types::{Params, PoolOutcome};
use crate::validation::{key_optional, Rule};

pub const DEFAULT_LIMIT: i64 = 100;

pub struct Messages<'a> {
    client: &'a NylasClient,
}

impl<'a> Messages<'a> {
    pub(crate) fn new(client: &'a NylasClient) -> Self {
        Self { client }
    }

    /// List messages. `limit` defaults to 100 and `offset` to 0.
    pub fn build_list(&self, params: &Params) -> Result<HttpRequest, ApiError> {
        list_rules().validate_params(params)?;
        let token = self.client.access_token()?;

        let mut query = params.clone();
        query
            .entry("limit")
            .or_insert_with(|| Value::from(DEFAULT_LIMIT));
        query.entry("offset").or_insert_with(|| Value::from(0));

        self.client
            .request()
            .set_query(query)
            .authorization(token)
            .get(Endpoint::Messages)
    }

    pub fn list(&self, params: &Params) -> Result<Value, ApiError> {
        self.client.send(self.build_list(params)?)
    }

    pub fn build_raw(&self, message_id: &str) -> Result<HttpRequest, ApiError> {
        Rule::non_empty_string().validate_named("message_id", &Value::from(message_id))?;
        let token = self.client.access_token()?;
        self.client
            .request()
            .set_path([message_id])
            .set_header_params([("accept", "message/rfc822")])
            .authorization(token)
            .get(Endpoint::OneMessage)
    }

    /// Fetch the RFC-822 source of a message and parse it.
    pub fn raw(&self, message_id: &str) -> Result<RawMessage, ApiError> {
        let response = self.client.send_raw(self.build_raw(message_id)?)?;
        RawMessage::parse(response.body)
    }

    pub fn build_update(&self, message_id: &str, params: &Params) -> Result<HttpRequest, ApiError> {
        Rule::non_empty_string().validate_named("message_id", &Value::from(message_id))?;
        Rule::key_set(vec![
            key_optional("unread", Rule::boolean()),
            key_optional("starred", Rule::boolean()),
            key_optional("folder_id", Rule::non_empty_string()),
            key_optional("label_ids", Rule::array_of(Rule::string())),
        ])
        .validate_params(params)?;

        let token = self.client.access_token()?;
        self.client
            .request()
            .set_path([message_id])
            .set_form_params(params.clone())
            .authorization(token)
            .put(Endpoint::OneMessage)
    }

    /// Change read/starred state, folder or labels.
    pub fn update(&self, message_id: &str, params: &Params) -> Result<Value, ApiError> {
        self.client.send(self.build_update(message_id, params)?)
    }

    pub fn build_get(&self, ids: &[&str], expanded: bool) -> Result<Vec<HttpRequest>, ApiError> {
        check_ids(ids)?;
        let token = self.client.access_token()?;

        let mut query = Params::new();
        if expanded {
            query.insert("view".to_string(), Value::from("expanded"));
        }
        ids.iter()
            .map(|id| {
                self.client
                    .request()
                    .set_path([*id])
                    .set_query(query.clone())
                    .authorization(token)
                    .get(Endpoint::OneMessage)
            })
            .collect()
    }

    pub async fn get(&self, ids: &[&str], expanded: bool) -> Result<Vec<PoolOutcome>, ApiError> {
        let requests = self.build_get(ids, expanded)?;
        let ids = ids.iter().map(|id| id.to_string()).collect();
        self.client.pool(ids, requests).await
    }
}

fn list_rules() -> Rule {
    let mut rules = vec![
        key_optional("in", Rule::non_empty_string()),
        key_optional("to", Rule::email()),
        key_optional("cc", Rule::email()),
        key_optional("bcc", Rule::email()),
        key_optional("from", Rule::email()),
        key_optional("subject", Rule::non_empty_string()),
        key_optional("any_email", Rule::non_empty_string()),
        key_optional("thread_id", Rule::non_empty_string()),
        key_optional("received_after", Rule::timestamp()),
        key_optional("received_before", Rule::timestamp()),
        key_optional("has_attachment", Rule::equals(true)),
        key_optional("view", Rule::one_of_values(&["ids", "count", "expanded"])),
        key_optional("unread", Rule::boolean()),
        key_optional("starred", Rule::boolean()),
        key_optional("filename", Rule::non_empty_string()),
    ];
    rules.extend(paging_rules());
    Rule::key_set(rules)
}
