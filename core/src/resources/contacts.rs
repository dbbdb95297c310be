//! Address-book contacts.

use serde_json::Value;

use crate::api::Endpoint;
use crate::client::NylasClient;
use crate::error::ApiError;
use crate::http::HttpRequest;
use crate::resources::{check_ids, paging_rules};
use crate::types::{Params, PoolOutcome};
use crate::validation::{key, key_optional, KeyRule, Rule};

pub struct Contacts<'a> {
    client: &'a NylasClient,
}

impl<'a> Contacts<'a> {
    pub(crate) fn new(client: &'a NylasClient) -> Self {
        Self { client }
    }

    pub fn build_list(&self, params: &Params) -> Result<HttpRequest, ApiError> {
        let mut rules = paging_rules();
        rules.extend([
            key_optional("email", Rule::email()),
            key_optional("phone_number", Rule::non_empty_string()),
            key_optional("source", Rule::one_of_values(&["address_book", "inbox", "domain"])),
            key_optional("group", Rule::non_empty_string()),
            key_optional("recurse", Rule::boolean()),
            key_optional("view", Rule::one_of_values(&["ids", "count"])),
        ]);
        Rule::key_set(rules).validate_params(params)?;

        let token = self.client.access_token()?;
        self.client
            .request()
            .set_query(params.clone())
            .authorization(token)
            .get(Endpoint::Contacts)
    }

    pub fn list(&self, params: &Params) -> Result<Value, ApiError> {
        self.client.send(self.build_list(params)?)
    }

    pub fn build_add(&self, params: &Params) -> Result<HttpRequest, ApiError> {
        Rule::key_set(contact_rules()).validate_params(params)?;
        let token = self.client.access_token()?;
        self.client
            .request()
            .set_form_params(params.clone())
            .authorization(token)
            .post(Endpoint::Contacts)
    }

    pub fn add(&self, params: &Params) -> Result<Value, ApiError> {
        self.client.send(self.build_add(params)?)
    }

    pub fn build_update(&self, contact_id: &str, params: &Params) -> Result<HttpRequest, ApiError> {
        Rule::non_empty_string().validate_named("contact_id", &Value::from(contact_id))?;
        Rule::key_set(contact_rules()).validate_params(params)?;
        let token = self.client.access_token()?;
        self.client
            .request()
            .set_path([contact_id])
            .set_form_params(params.clone())
            .authorization(token)
            .put(Endpoint::OneContact)
    }

    pub fn update(&self, contact_id: &str, params: &Params) -> Result<Value, ApiError> {
        self.client.send(self.build_update(contact_id, params)?)
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
                    .get(Endpoint::OneContact)
            })
            .collect()
    }

    pub async fn get(&self, ids: &[&str]) -> Result<Vec<PoolOutcome>, ApiError> {
        let requests = self.build_get(ids)?;
        let keys = ids.iter().map(|id| id.to_string()).collect();
        self.client.pool(keys, requests).await
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
                    .delete(Endpoint::OneContact)
            })
            .collect()
    }

    pub async fn delete(&self, ids: &[&str]) -> Result<Vec<PoolOutcome>, ApiError> {
        let requests = self.build_delete(ids)?;
        let keys = ids.iter().map(|id| id.to_string()).collect();
        self.client.pool(keys, requests).await
    }
}

fn contact_rules() -> Vec<KeyRule> {
    let emails = Rule::array_of(Rule::key_set(vec![
        key("type", Rule::one_of_values(&["work", "personal"])),
        key("email", Rule::email()),
    ]));
    let phone_numbers = Rule::array_of(Rule::key_set(vec![
        key(
            "type",
            Rule::one_of_values(&[
                "business", "home", "mobile", "pager", "business_fax", "home_fax", "organization_main",
                "assistant", "radio", "other",
            ]),
        ),
        key("number", Rule::non_empty_string()),
    ]));

    vec![
        key_optional("given_name", Rule::string()),
        key_optional("middle_name", Rule::string()),
        key_optional("surname", Rule::string()),
        key_optional("nickname", Rule::string()),
        key_optional("company_name", Rule::string()),
        key_optional("job_title", Rule::string()),
        key_optional("notes", Rule::string()),
        key_optional("birthday", Rule::date()),
        key_optional("emails", emails),
        key_optional("phone_numbers", phone_numbers),
    ]
}
