//! Calendars and free/busy lookups.

use serde_json::Value;

use crate::api::Endpoint;
use crate::client::NylasClient;
use crate::error::ApiError;
use crate::http::HttpRequest;
use crate::resources::{check_ids, paging_rules};
use crate::types::{Params, PoolOutcome};
use crate::validation::{key, key_optional, KeyRule, Rule};

pub struct Calendars<'a> {
    client: &'a NylasClient,
}

impl<'a> Calendars<'a> {
    pub(crate) fn new(client: &'a NylasClient) -> Self {
        Self { client }
    }

    pub fn build_list(&self, params: &Params) -> Result<HttpRequest, ApiError> {
        let mut rules = paging_rules();
        rules.push(key_optional("view", Rule::one_of_values(&["ids", "count"])));
        Rule::key_set(rules).validate_params(params)?;

        let token = self.client.access_token()?;
        self.client
            .request()
            .set_query(params.clone())
            .authorization(token)
            .get(Endpoint::Calendars)
    }

    pub fn list(&self, params: &Params) -> Result<Value, ApiError> {
        self.client.send(self.build_list(params)?)
    }

    pub fn build_add(&self, params: &Params) -> Result<HttpRequest, ApiError> {
        Rule::key_set(calendar_rules(true)).validate_params(params)?;
        let token = self.client.access_token()?;
        self.client
            .request()
            .set_form_params(params.clone())
            .authorization(token)
            .post(Endpoint::Calendars)
    }

    pub fn add(&self, params: &Params) -> Result<Value, ApiError> {
        self.client.send(self.build_add(params)?)
    }

    pub fn build_update(&self, calendar_id: &str, params: &Params) -> Result<HttpRequest, ApiError> {
        Rule::non_empty_string().validate_named("calendar_id", &Value::from(calendar_id))?;
        Rule::key_set(calendar_rules(false)).validate_params(params)?;
        let token = self.client.access_token()?;
        self.client
            .request()
            .set_path([calendar_id])
            .set_form_params(params.clone())
            .authorization(token)
            .put(Endpoint::OneCalendar)
    }

    pub fn update(&self, calendar_id: &str, params: &Params) -> Result<Value, ApiError> {
        self.client.send(self.build_update(calendar_id, params)?)
    }

    pub fn build_get(&self, ids: &[&str]) -> Result<Vec<HttpRequest>, ApiError> {
        check_ids(ids)?;
        let token = self.client.access_token()?;
        ids.iter()
            .map(|id| {
                self.client
                    .request()
                    .set_path([*id])
                    .authorization(token)
                    .get(Endpoint::OneCalendar)
            })
            .collect()
    }

    pub async fn get(&self, ids: &[&str]) -> Result<Vec<PoolOutcome>, ApiError> {
        let requests = self.build_get(ids)?;
        self.client.pool(owned(ids), requests).await
    }

    pub fn build_delete(&self, ids: &[&str]) -> Result<Vec<HttpRequest>, ApiError> {
        check_ids(ids)?;
        let token = self.client.access_token()?;
        ids.iter()
            .map(|id| {
                self.client
                    .request()
                    .set_path([*id])
                    .authorization(token)
                    .delete(Endpoint::OneCalendar)
            })
            .collect()
    }

    pub async fn delete(&self, ids: &[&str]) -> Result<Vec<PoolOutcome>, ApiError> {
        let requests = self.build_delete(ids)?;
        self.client.pool(owned(ids), requests).await
    }

    /// Busy slots for `emails` between `start_time` and `end_time`.
    pub fn build_free_busy(&self, params: &Params) -> Result<HttpRequest, ApiError> {
        Rule::key_set(vec![
            key("start_time", Rule::timestamp()),
            key("end_time", Rule::timestamp()),
            key("emails", Rule::array_of(Rule::email())),
        ])
        .validate_params(params)?;

        let token = self.client.access_token()?;
        self.client
            .request()
            .set_form_params(params.clone())
            .authorization(token)
            .post(Endpoint::FreeBusy)
    }

    pub fn free_busy(&self, params: &Params) -> Result<Value, ApiError> {
        self.client.send(self.build_free_busy(params)?)
    }
}

fn calendar_rules(creating: bool) -> Vec<KeyRule> {
    let name = if creating {
        key("name", Rule::non_empty_string())
    } else {
        key_optional("name", Rule::non_empty_string())
    };
    vec![
        name,
        key_optional("description", Rule::non_empty_string()),
        key_optional("location", Rule::non_empty_string()),
        key_optional("timezone", Rule::string()),
    ]
}

fn owned(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|id| id.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Options;
    use crate::http::HttpMethod;
    use crate::types::params;
    use serde_json::json;

    fn client() -> NylasClient {
        NylasClient::new(
            Options::new("cid", "secret")
                .access_token("tok")
                .api_url("http://localhost:3000"),
        )
        .unwrap()
    }

    #[test]
    fn add_requires_name() {
        let c = client();
        let err = c
            .calendars()
            .build_add(&params(json!({"description": "Team"})))
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(e) if e.path == "name"));

        let req = c
            .calendars()
            .build_add(&params(json!({"name": "Team", "timezone": "Europe/Dublin"})))
            .unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, "http://localhost:3000/calendars");
    }

    #[test]
    fn update_allows_partial_fields() {
        let req = client()
            .calendars()
            .build_update("cal-1", &params(json!({"description": "Renamed"})))
            .unwrap();
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.url, "http://localhost:3000/calendars/cal-1");
    }

    #[test]
    fn delete_builds_one_request_per_id() {
        let requests = client().calendars().build_delete(&["c1", "c2"]).unwrap();
        assert_eq!(requests.len(), 2);
        assert!(requests.iter().all(|r| r.method == HttpMethod::Delete));
        assert_eq!(requests[1].url, "http://localhost:3000/calendars/c2");
    }

    #[test]
    fn free_busy_checks_emails() {
        let c = client();
        let req = c
            .calendars()
            .build_free_busy(&params(json!({
                "start_time": 1_625_097_600,
                "end_time": 1_625_184_000,
                "emails": ["jane@example.com"],
            })))
            .unwrap();
        assert_eq!(req.url, "http://localhost:3000/calendars/free-busy");

        let err = c
            .calendars()
            .build_free_busy(&params(json!({
                "start_time": 1_625_097_600,
                "end_time": 1_625_184_000,
                "emails": ["jane"],
            })))
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(e) if e.path == "emails[0]"));
    }
}
