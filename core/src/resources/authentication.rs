//! Hosted OAuth: authorize URL, code exchange and token revocation.

use serde_json::{json, Value};

use crate::api::Endpoint;
use crate::client::NylasClient;
use crate::error::ApiError;
use crate::http::HttpRequest;
use crate::types::{params, Params};
use crate::validation::{key, key_optional, Rule};

pub struct Hosted<'a> {
    client: &'a NylasClient,
}

impl<'a> Hosted<'a> {
    pub(crate) fn new(client: &'a NylasClient) -> Self {
        Self { client }
    }

    /// URL the user is sent to in order to grant access. No request is made.
    pub fn authorize_url(&self, params: &Params) -> Result<String, ApiError> {
        authorize_rules().validate_params(params)?;

        let mut query = params.clone();
        query.insert("client_id".to_string(), Value::from(self.client.options().client_id()));

        let request = self.client.request().set_query(query).get(Endpoint::OAuthAuthorize)?;
        Ok(request.url)
    }

    pub fn build_exchange_code(&self, code: &str) -> Result<HttpRequest, ApiError> {
        Rule::non_empty_string().validate_named("code", &Value::from(code))?;

        let options = self.client.options();
        let form = params(json!({
            "client_id": options.client_id(),
            "client_secret": options.client_secret(),
            "grant_type": "authorization_code",
            "code": code,
        }));
        self.client.request().set_form_params(form).post(Endpoint::OAuthToken)
    }

    /// Exchange an authorization code for an account access token.
    pub fn exchange_code(&self, code: &str) -> Result<Value, ApiError> {
        self.client.send(self.build_exchange_code(code)?)
    }

    pub fn build_revoke(&self) -> Result<HttpRequest, ApiError> {
        let token = self.client.access_token()?;
        self.client.request().authorization(token).post(Endpoint::OAuthRevoke)
    }

    /// Revoke the configured access token.
    pub fn revoke(&self) -> Result<Value, ApiError> {
        self.client.send(self.build_revoke()?)
    }
}

fn authorize_rules() -> Rule {
    Rule::key_set(vec![
        key("redirect_uri", Rule::url()),
        key("response_type", Rule::one_of_values(&["code", "token"])),
        key("scopes", Rule::non_empty_string()),
        key_optional("state", Rule::string()),
        key_optional("login_hint", Rule::email()),
        key_optional("provider", Rule::non_empty_string()),
        key_optional("redirect_on_error", Rule::boolean()),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Options;
    use crate::http::HttpMethod;

    fn client() -> NylasClient {
        NylasClient::new(
            Options::new("cid", "secret")
                .access_token("tok")
                .api_url("http://localhost:3000"),
        )
        .unwrap()
    }

    #[test]
    fn authorize_url_carries_client_id_and_params() {
        let c = client();
        let url = c
            .hosted()
            .authorize_url(&params(json!({
                "state": "testing",
                "scopes": "email,contacts,calendar",
                "login_hint": "jane@example.com",
                "redirect_uri": "https://app.example.com/callback",
                "response_type": "code",
            })))
            .unwrap();
        assert!(url.starts_with("http://localhost:3000/oauth/authorize?"));
        assert!(url.contains("client_id=cid"));
        assert!(url.contains("scopes=email%2Ccontacts%2Ccalendar"));
        assert!(url.contains("redirect_uri=https%3A%2F%2Fapp.example.com%2Fcallback"));
        assert!(url.contains("state=testing"));
    }

    #[test]
    fn authorize_url_requires_redirect_uri() {
        let c = client();
        let err = c
            .hosted()
            .authorize_url(&params(json!({"scopes": "email", "response_type": "code"})))
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(e) if e.path == "redirect_uri"));
    }

    #[test]
    fn authorize_url_rejects_bad_response_type() {
        let c = client();
        let err = c
            .hosted()
            .authorize_url(&params(json!({
                "scopes": "email",
                "response_type": "id_token",
                "redirect_uri": "https://app.example.com/callback",
            })))
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(e) if e.path == "response_type"));
    }

    #[test]
    fn exchange_code_posts_credentials() {
        let c = client();
        let req = c.hosted().build_exchange_code("abc").unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, "http://localhost:3000/oauth/token");
        assert!(req.header("authorization").is_none());
        let body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(
            body,
            json!({
                "client_id": "cid",
                "client_secret": "secret",
                "grant_type": "authorization_code",
                "code": "abc",
            })
        );
    }

    #[test]
    fn exchange_code_rejects_empty_code() {
        let err = client().hosted().build_exchange_code("").unwrap_err();
        assert!(matches!(err, ApiError::Validation(e) if e.path == "code"));
    }

    #[test]
    fn revoke_uses_access_token() {
        let req = client().hosted().build_revoke().unwrap();
        assert_eq!(req.url, "http://localhost:3000/oauth/revoke");
        // base64("tok:")
        assert_eq!(req.header("authorization"), Some("Basic dG9rOg=="));
    }
}
