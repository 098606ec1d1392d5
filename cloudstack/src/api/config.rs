//! Client construction and environment configuration

use std::sync::Arc;
use url::Url;

use super::client::{Client, ClientParts, Credentials};
use super::error::{ApiError, Result};
use super::options::OptionHook;
use super::pool::TransportConfig;

pub const ENV_API_URL: &str = "CLOUDSTACK_API_URL";
pub const ENV_API_KEY: &str = "CLOUDSTACK_API_KEY";
pub const ENV_SECRET_KEY: &str = "CLOUDSTACK_SECRET_KEY";
pub const ENV_VERIFY_SSL: &str = "CLOUDSTACK_VERIFY_SSL";
pub const ENV_ASYNC: &str = "CLOUDSTACK_ASYNC";
pub const ENV_ASYNC_TIMEOUT: &str = "CLOUDSTACK_ASYNC_TIMEOUT";

/// Seconds an async client waits for a job before giving up.
pub const DEFAULT_ASYNC_TIMEOUT: u64 = 300;

pub struct ClientBuilder {
    api_url: String,
    api_key: String,
    secret: String,
    verify_ssl: bool,
    async_mode: bool,
    async_timeout_secs: u64,
    http_get_only: bool,
    http_client: Option<reqwest::Client>,
    transport: TransportConfig,
    options: Vec<Arc<dyn OptionHook>>,
}

impl ClientBuilder {
    pub fn new(api_url: &str, api_key: &str, secret: &str) -> Self {
        Self {
            api_url: api_url.to_string(),
            api_key: api_key.to_string(),
            secret: secret.to_string(),
            verify_ssl: true,
            async_mode: false,
            async_timeout_secs: DEFAULT_ASYNC_TIMEOUT,
            http_get_only: false,
            http_client: None,
            transport: TransportConfig::default(),
            options: Vec::new(),
        }
    }

    /// Read the builder settings from `CLOUDSTACK_*` environment variables.
    pub fn from_env() -> Result<Self> {
        let api_url = required_env(ENV_API_URL)?;
        let api_key = required_env(ENV_API_KEY)?;
        let secret = required_env(ENV_SECRET_KEY)?;

        let mut builder = Self::new(&api_url, &api_key, &secret);
        if let Some(verify_ssl) = parsed_env::<bool>(ENV_VERIFY_SSL)? {
            builder = builder.verify_ssl(verify_ssl);
        }
        if let Some(async_mode) = parsed_env::<bool>(ENV_ASYNC)? {
            builder = builder.async_mode(async_mode);
        }
        if let Some(timeout) = parsed_env::<u64>(ENV_ASYNC_TIMEOUT)? {
            builder = builder.async_timeout(timeout);
        }
        Ok(builder)
    }

    pub fn verify_ssl(mut self, verify_ssl: bool) -> Self {
        self.verify_ssl = verify_ssl;
        self
    }

    pub fn async_mode(mut self, async_mode: bool) -> Self {
        self.async_mode = async_mode;
        self
    }

    pub fn async_timeout(mut self, timeout_secs: u64) -> Self {
        self.async_timeout_secs = timeout_secs;
        self
    }

    pub fn http_get_only(mut self, get_only: bool) -> Self {
        self.http_get_only = get_only;
        self
    }

    /// Use a caller-built HTTP client. `verify_ssl` and the transport
    /// settings are then ignored.
    pub fn http_client(mut self, http_client: reqwest::Client) -> Self {
        self.http_client = Some(http_client);
        self
    }

    pub fn transport(mut self, transport: TransportConfig) -> Self {
        self.transport = transport;
        self
    }

    pub fn option(mut self, hook: Arc<dyn OptionHook>) -> Self {
        self.options.push(hook);
        self
    }

    pub fn build(self) -> Result<Client> {
        let url = Url::parse(&self.api_url)
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", self.api_url, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ApiError::InvalidUrl(format!(
                "{}: unsupported scheme {}",
                self.api_url,
                url.scheme()
            )));
        }

        if self.api_key.is_empty() || self.secret.is_empty() {
            return Err(ApiError::Config(
                "API key and secret must not be empty".to_string(),
            ));
        }

        let http_client = match self.http_client {
            Some(client) => client,
            None => self.transport.build_client(self.verify_ssl)?,
        };

        tracing::debug!(
            api_url = %self.api_url,
            async_mode = self.async_mode,
            "Creating CloudStack client"
        );

        Ok(Client::from_parts(ClientParts {
            base_url: self.api_url,
            credentials: Credentials {
                api_key: self.api_key,
                secret: self.secret,
            },
            http_client,
            async_mode: self.async_mode,
            http_get_only: self.http_get_only,
            async_timeout_secs: self.async_timeout_secs,
            options: self.options,
        }))
    }
}

fn required_env(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(ApiError::Config(format!(
            "{} is required (set it in the environment)",
            name
        ))),
    }
}

fn parsed_env<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match std::env::var(name) {
        Ok(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ApiError::Config(format!("{} has an invalid value: {}", name, value))),
        Err(_) => Ok(None),
    }
}
