//! Client configuration.
//!
//! `Options` carries the application credentials, the optional account
//! credentials and where to send requests. It is built in code or read from
//! `NYLAS_*` environment variables.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ApiError;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(90);

/// Data-residency region of the Nylas application.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Region {
    #[default]
    Us,
    Canada,
    Ireland,
}

impl Region {
    pub fn base_url(&self) -> &'static str {
        match self {
            Region::Us => "https://api.nylas.com",
            Region::Canada => "https://canada.api.nylas.com",
            Region::Ireland => "https://ireland.api.nylas.com",
        }
    }
}

impl FromStr for Region {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "us" => Ok(Region::Us),
            "canada" => Ok(Region::Canada),
            "ireland" => Ok(Region::Ireland),
            other => Err(ApiError::Config(format!("unknown region `{other}`"))),
        }
    }
}

#[derive(Clone)]
pub struct Options {
    client_id: String,
    client_secret: String,
    access_token: Option<String>,
    account_id: Option<String>,
    region: Region,
    api_url: Option<String>,
    timeout: Duration,
}

impl Options {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            access_token: None,
            account_id: None,
            region: Region::default(),
            api_url: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Read options from the environment.
    ///
    /// `NYLAS_CLIENT_ID` and `NYLAS_CLIENT_SECRET` are required;
    /// `NYLAS_ACCESS_TOKEN`, `NYLAS_ACCOUNT_ID`, `NYLAS_REGION`,
    /// `NYLAS_API_URL` and `NYLAS_TIMEOUT_SECS` are optional.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ApiError> {
        let required = |name: &str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| ApiError::Config(format!("{name} is not set")))
        };
        let mut options = Options::new(required("NYLAS_CLIENT_ID")?, required("NYLAS_CLIENT_SECRET")?);
        if let Some(token) = lookup("NYLAS_ACCESS_TOKEN") {
            options = options.access_token(token);
        }
        if let Some(account_id) = lookup("NYLAS_ACCOUNT_ID") {
            options = options.account_id(account_id);
        }
        if let Some(region) = lookup("NYLAS_REGION") {
            options = options.region(region.parse()?);
        }
        if let Some(url) = lookup("NYLAS_API_URL") {
            options = options.api_url(url);
        }
        if let Some(secs) = lookup("NYLAS_TIMEOUT_SECS") {
            let secs: u64 = secs
                .trim()
                .parse()
                .map_err(|_| ApiError::Config(format!("NYLAS_TIMEOUT_SECS is not a number: {secs}")))?;
            options = options.timeout(Duration::from_secs(secs));
        }
        Ok(options)
    }

    pub fn access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn account_id(mut self, account_id: impl Into<String>) -> Self {
        self.account_id = Some(account_id.into());
        self
    }

    pub fn region(mut self, region: Region) -> Self {
        self.region = region;
        self
    }

    /// Override the region's base URL, e.g. to point at a local mock server.
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = Some(url.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }

    pub fn get_access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn get_account_id(&self) -> Option<&str> {
        self.account_id.as_deref()
    }

    pub fn get_region(&self) -> Region {
        self.region
    }

    pub fn get_timeout(&self) -> Duration {
        self.timeout
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> String {
        self.api_url
            .as_deref()
            .unwrap_or_else(|| self.region.base_url())
            .trim_end_matches('/')
            .to_string()
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("account_id", &self.account_id)
            .field("region", &self.region)
            .field("api_url", &self.api_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}
