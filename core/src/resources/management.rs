//! Account and application management.
//!
//! Everything under `/a/{client_id}` authorizes with the application's
//! client secret; `account_info` uses the account access token.

use serde_json::{json, Value};

use crate::api::Endpoint;
use crate::client::NylasClient;
use crate::error::ApiError;
use crate::http::HttpRequest;
use crate::request::RequestBuilder;
use crate::resources::paging_rules;
use crate::types::{params, Params};
use crate::validation::{key_optional, Rule};

pub struct Management<'a> {
    client: &'a NylasClient,
}

impl<'a> Management<'a> {
    pub(crate) fn new(client: &'a NylasClient) -> Self {
        Self { client }
    }

    /// Builder authorized with the client secret, with `client_id` as the
    /// first path segment.
    fn application(&self) -> Result<RequestBuilder, ApiError> {
        let options = self.client.options();
        Rule::non_empty_string().validate_named("client_secret", &Value::from(options.client_secret()))?;
        Ok(self
            .client
            .request()
            .authorization(options.client_secret())
            .set_path([options.client_id()]))
    }

    fn account(&self, account_id: &str) -> Result<RequestBuilder, ApiError> {
        Rule::non_empty_string().validate_named("account_id", &Value::from(account_id))?;
        Ok(self.application()?.set_path([account_id]))
    }

    pub fn build_account_info(&self) -> Result<HttpRequest, ApiError> {
        let token = self.client.access_token()?;
        self.client.request().authorization(token).get(Endpoint::Account)
    }

    /// Details of the account the access token belongs to.
    pub fn account_info(&self) -> Result<Value, ApiError> {
        self.client.send(self.build_account_info()?)
    }

    pub fn build_list_accounts(&self, params: &Params) -> Result<HttpRequest, ApiError> {
        Rule::key_set(paging_rules()).validate_params(params)?;
        self.application()?.set_query(params.clone()).get(Endpoint::Accounts)
    }

    pub fn list_accounts(&self, params: &Params) -> Result<Value, ApiError> {
        self.client.send(self.build_list_accounts(params)?)
    }

    pub fn build_get_account(&self, account_id: &str) -> Result<HttpRequest, ApiError> {
        self.account(account_id)?.get(Endpoint::OneAccount)
    }

    pub fn get_account(&self, account_id: &str) -> Result<Value, ApiError> {
        self.client.send(self.build_get_account(account_id)?)
    }

    pub fn build_cancel_account(&self, account_id: &str) -> Result<HttpRequest, ApiError> {
        self.account(account_id)?.post(Endpoint::DowngradeAccount)
    }

    pub fn cancel_account(&self, account_id: &str) -> Result<Value, ApiError> {
        self.client.send(self.build_cancel_account(account_id)?)
    }

    pub fn build_reactivate_account(&self, account_id: &str) -> Result<HttpRequest, ApiError> {
        self.account(account_id)?.post(Endpoint::UpgradeAccount)
    }

    pub fn reactivate_account(&self, account_id: &str) -> Result<Value, ApiError> {
        self.client.send(self.build_reactivate_account(account_id)?)
    }

    /// Revoke every token of an account, optionally sparing one.
    pub fn build_revoke_all_tokens(
        &self,
        account_id: &str,
        keep_access_token: Option<&str>,
    ) -> Result<HttpRequest, ApiError> {
        let mut builder = self.account(account_id)?;
        if let Some(keep) = keep_access_token {
            Rule::non_empty_string().validate_named("keep_access_token", &Value::from(keep))?;
            builder = builder.set_form_params(params(json!({ "keep_access_token": keep })));
        }
        builder.post(Endpoint::RevokeAllTokens)
    }

    pub fn revoke_all_tokens(&self, account_id: &str, keep_access_token: Option<&str>) -> Result<Value, ApiError> {
        self.client
            .send(self.build_revoke_all_tokens(account_id, keep_access_token)?)
    }

    pub fn build_application_details(&self) -> Result<HttpRequest, ApiError> {
        self.application()?.get(Endpoint::Application)
    }

    pub fn application_details(&self) -> Result<Value, ApiError> {
        self.client.send(self.build_application_details()?)
    }

    pub fn build_update_application(&self, params: &Params) -> Result<HttpRequest, ApiError> {
        Rule::key_set(vec![
            key_optional("application_name", Rule::non_empty_string()),
            key_optional("redirect_uris", Rule::array_of(Rule::url())),
        ])
        .validate_params(params)?;
        self.application()?
            .set_form_params(params.clone())
            .put(Endpoint::Application)
    }

    pub fn update_application(&self, params: &Params) -> Result<Value, ApiError> {
        self.client.send(self.build_update_application(params)?)
    }
}
