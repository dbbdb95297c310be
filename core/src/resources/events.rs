//! Calendar events.
//!
//! `notify_participants` is accepted alongside event fields but travels in
//! the query string, never in the body. Single-event reads and deletes take
//! a batch and run as one concurrent pool.

use serde_json::Value;

use crate::api::Endpoint;
use crate::client::NylasClient;
use crate::error::ApiError;
use crate::http::HttpRequest;
use crate::types::{split_off, Params, PoolOutcome};
use crate::validation::{key, key_optional, KeyRule, Rule};

const NOTIFY: &str = "notify_participants";

pub struct Events<'a> {
    client: &'a NylasClient,
}

impl<'a> Events<'a> {
    pub(crate) fn new(client: &'a NylasClient) -> Self {
        Self { client }
    }

    pub fn build_list(&self, params: &Params) -> Result<HttpRequest, ApiError> {
        let mut rules = filter_rules();
        rules.push(key_optional("view", Rule::one_of_values(&["ids", "count"])));
        Rule::key_set(rules).validate_params(params)?;

        let token = self.client.access_token()?;
        self.client
            .request()
            .set_query(params.clone())
            .authorization(token)
            .get(Endpoint::Events)
    }

    pub fn list(&self, params: &Params) -> Result<Value, ApiError> {
        self.client.send(self.build_list(params)?)
    }

    pub fn build_add(&self, params: &Params) -> Result<HttpRequest, ApiError> {
        let mut rules = vec![key("when", when_rule())];
        rules.extend(event_rules());
        Rule::key_set(rules).validate_params(params)?;

        let token = self.client.access_token()?;
        let mut form = params.clone();
        let query = split_off(&mut form, NOTIFY);
        self.client
            .request()
            .set_query(query)
            .set_form_params(form)
            .authorization(token)
            .post(Endpoint::Events)
    }

    pub fn add(&self, params: &Params) -> Result<Value, ApiError> {
        self.client.send(self.build_add(params)?)
    }

    /// `params` carries the event `id` alongside the fields to change.
    pub fn build_update(&self, params: &Params) -> Result<HttpRequest, ApiError> {
        let mut rules = vec![
            key("id", Rule::non_empty_string()),
            key_optional("when", when_rule()),
        ];
        rules.extend(event_rules());
        Rule::key_set(rules).validate_params(params)?;

        let token = self.client.access_token()?;
        let mut form = params.clone();
        let query = split_off(&mut form, NOTIFY);
        let id = take_id(&mut form)?;
        self.client
            .request()
            .set_path([id])
            .set_query(query)
            .set_form_params(form)
            .authorization(token)
            .put(Endpoint::OneEvent)
    }

    pub fn update(&self, params: &Params) -> Result<Value, ApiError> {
        self.client.send(self.build_update(params)?)
    }

    /// Reply to an invitation. `account_id` defaults to the configured one.
    pub fn build_rsvp(&self, params: &Params) -> Result<HttpRequest, ApiError> {
        let mut params = params.clone();
        if !params.contains_key("account_id") {
            if let Some(account_id) = self.client.options().get_account_id() {
                params.insert("account_id".to_string(), Value::from(account_id));
            }
        }
        Rule::key_set(vec![
            key("status", Rule::one_of_values(&["yes", "no", "maybe"])),
            key("event_id", Rule::non_empty_string()),
            key("account_id", Rule::non_empty_string()),
            key_optional(NOTIFY, Rule::boolean()),
        ])
        .validate_params(&params)?;

        let token = self.client.access_token()?;
        let query = split_off(&mut params, NOTIFY);
        self.client
            .request()
            .set_query(query)
            .set_form_params(params)
            .authorization(token)
            .post(Endpoint::SendRsvp)
    }

    pub fn rsvp(&self, params: &Params) -> Result<Value, ApiError> {
        self.client.send(self.build_rsvp(params)?)
    }

    /// One request per item; each item is `{id, ..filters}`.
    pub fn build_get(&self, items: &[Params]) -> Result<(Vec<String>, Vec<HttpRequest>), ApiError> {
        let mut rules = vec![key("id", Rule::non_empty_string())];
        rules.extend(filter_rules());
        validate_items(&Rule::key_set(rules), items)?;

        let token = self.client.access_token()?;
        let mut ids = Vec::with_capacity(items.len());
        let mut requests = Vec::with_capacity(items.len());
        for item in items {
            let mut query = item.clone();
            let id = take_id(&mut query)?;
            requests.push(
                self.client
                    .request()
                    .set_path([id.as_str()])
                    .set_query(query)
                    .authorization(token)
                    .get(Endpoint::OneEvent)?,
            );
            ids.push(id);
        }
        Ok((ids, requests))
    }

    pub async fn get(&self, items: &[Params]) -> Result<Vec<PoolOutcome>, ApiError> {
        let (ids, requests) = self.build_get(items)?;
        self.client.pool(ids, requests).await
    }

    /// One request per item; each item is `{id, notify_participants?}`.
    pub fn build_delete(&self, items: &[Params]) -> Result<(Vec<String>, Vec<HttpRequest>), ApiError> {
        let rule = Rule::key_set(vec![
            key("id", Rule::non_empty_string()),
            key_optional(NOTIFY, Rule::boolean()),
        ]);
        validate_items(&rule, items)?;

        let token = self.client.access_token()?;
        let mut ids = Vec::with_capacity(items.len());
        let mut requests = Vec::with_capacity(items.len());
        for item in items {
            let mut item = item.clone();
            let query = split_off(&mut item, NOTIFY);
            let id = take_id(&mut item)?;
            requests.push(
                self.client
                    .request()
                    .set_path([id.as_str()])
                    .set_query(query)
                    .authorization(token)
                    .delete(Endpoint::OneEvent)?,
            );
            ids.push(id);
        }
        Ok((ids, requests))
    }

    pub async fn delete(&self, items: &[Params]) -> Result<Vec<PoolOutcome>, ApiError> {
        let (ids, requests) = self.build_delete(items)?;
        self.client.pool(ids, requests).await
    }
}

fn validate_items(rule: &Rule, items: &[Params]) -> Result<(), ApiError> {
    let items = Value::Array(items.iter().cloned().map(Value::Object).collect());
    Rule::array_of(rule.clone()).validate_named("items", &items)?;
    Ok(())
}

fn take_id(params: &mut Params) -> Result<String, ApiError> {
    match params.remove("id") {
        Some(Value::String(id)) => Ok(id),
        _ => Err(ApiError::Request("event id is missing".to_string())),
    }
}

/// Filters accepted by event reads.
fn filter_rules() -> Vec<KeyRule> {
    let mut rules = super::paging_rules();
    rules.extend([
        key_optional("event_id", Rule::non_empty_string()),
        key_optional("calendar_id", Rule::non_empty_string()),
        key_optional("title", Rule::non_empty_string()),
        key_optional("location", Rule::non_empty_string()),
        key_optional("description", Rule::non_empty_string()),
        key_optional("show_cancelled", Rule::boolean()),
        key_optional("expand_recurring", Rule::boolean()),
        key_optional("ends_after", Rule::timestamp()),
        key_optional("ends_before", Rule::timestamp()),
        key_optional("starts_after", Rule::timestamp()),
        key_optional("starts_before", Rule::timestamp()),
    ]);
    rules
}

/// Fields of an event body shared by create and update.
fn event_rules() -> Vec<KeyRule> {
    let recurrence = Rule::key_set(vec![
        key("rrule", Rule::array()),
        key("timezone", Rule::string()),
    ]);
    let participants = Rule::array_of(Rule::key_set(vec![
        key("email", Rule::email()),
        key_optional("name", Rule::string()),
        key_optional("status", Rule::one_of_values(&["yes", "no", "maybe", "noreply"])),
        key_optional("comment", Rule::string()),
    ]));

    vec![
        key("calendar_id", Rule::non_empty_string()),
        key_optional("busy", Rule::boolean()),
        key_optional("read_only", Rule::boolean()),
        key_optional("title", Rule::non_empty_string()),
        key_optional("location", Rule::non_empty_string()),
        key_optional("recurrence", recurrence),
        key_optional("description", Rule::non_empty_string()),
        key_optional("participants", participants),
        key_optional("conferencing", conferencing_rule()),
        key_optional(NOTIFY, Rule::boolean()),
    ]
}

/// A point in time, a day, a time span or a day span.
fn when_rule() -> Rule {
    Rule::any_of(vec![
        Rule::key_set(vec![key("time", Rule::timestamp())]),
        Rule::key_set(vec![key("date", Rule::date())]),
        Rule::key_set(vec![
            key("end_time", Rule::timestamp()),
            key("start_time", Rule::timestamp()),
        ]),
        Rule::key_set(vec![
            key("end_date", Rule::date()),
            key("start_date", Rule::date()),
        ]),
    ])
}

fn conferencing_rule() -> Rule {
    let provider = |name: &'static str, details: Vec<KeyRule>| {
        Rule::key_set(vec![
            key("provider", Rule::equals(name)),
            key("details", Rule::key_set(details)),
        ])
    };

    Rule::exactly_one_of(vec![
        provider(
            "WebEx",
            vec![
                key("password", Rule::string()),
                key("pin", Rule::string()),
                key("url", Rule::string()),
            ],
        ),
        provider(
            "Zoom Meeting",
            vec![
                key("meeting_code", Rule::string()),
                key("password", Rule::string()),
                key("url", Rule::string()),
            ],
        ),
        provider(
            "GoToMeeting",
            vec![
                key("meeting_code", Rule::string()),
                key("phone", Rule::array()),
                key("url", Rule::string()),
            ],
        ),
        provider(
            "Google Meet",
            vec![
                key("phone", Rule::array()),
                key("pin", Rule::string()),
                key("url", Rule::string()),
            ],
        ),
    ])
}
