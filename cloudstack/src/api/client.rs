use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use super::common::{ApiParams, ParamBag, RESERVED_KEYS};
use super::config::ClientBuilder;
use super::encode::{encode_values, escape_value};
use super::error::{ApiError, Result};
use super::options::OptionHook;
use super::poller::AsyncPoller;
use super::response::{decode, decode_error, entity_payload, unwrap_envelope, unwrap_value};
use super::sign::sign;

/// Sends one signed command and returns the unwrapped payload.
#[async_trait]
pub trait Dispatch: Send + Sync {
    async fn dispatch(&self, command: &str, params: ParamBag, post: bool) -> Result<Value>;
}

/// API key and secret for one CloudStack account.
#[derive(Clone)]
pub struct Credentials {
    pub api_key: String,
    pub secret: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// CloudStack API client
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    base_url: String,
    credentials: Credentials,
    async_mode: bool,
    http_get_only: AtomicBool,
    async_timeout_secs: AtomicU64,
    state: RwLock<ClientState>,
}

/// Settings that can change after construction. Each request works on a
/// snapshot taken when it starts.
struct ClientState {
    http_client: reqwest::Client,
    request_timeout: Option<Duration>,
    options: Vec<Arc<dyn OptionHook>>,
}

pub(crate) struct ClientParts {
    pub base_url: String,
    pub credentials: Credentials,
    pub http_client: reqwest::Client,
    pub async_mode: bool,
    pub http_get_only: bool,
    pub async_timeout_secs: u64,
    pub options: Vec<Arc<dyn OptionHook>>,
}

impl Client {
    /// Create a synchronous client. Commands that start async jobs return
    /// as soon as the job ID is known.
    pub fn new(api_url: &str, api_key: &str, secret: &str, verify_ssl: bool) -> Result<Self> {
        ClientBuilder::new(api_url, api_key, secret)
            .verify_ssl(verify_ssl)
            .build()
    }

    /// Create an asynchronous client. Commands that start async jobs wait
    /// for the job to finish before returning.
    pub fn new_async(
        api_url: &str,
        api_key: &str,
        secret: &str,
        verify_ssl: bool,
    ) -> Result<Self> {
        ClientBuilder::new(api_url, api_key, secret)
            .verify_ssl(verify_ssl)
            .async_mode(true)
            .build()
    }

    pub fn builder(api_url: &str, api_key: &str, secret: &str) -> ClientBuilder {
        ClientBuilder::new(api_url, api_key, secret)
    }

    pub(crate) fn from_parts(parts: ClientParts) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                base_url: parts.base_url,
                credentials: parts.credentials,
                async_mode: parts.async_mode,
                http_get_only: AtomicBool::new(parts.http_get_only),
                async_timeout_secs: AtomicU64::new(parts.async_timeout_secs),
                state: RwLock::new(ClientState {
                    http_client: parts.http_client,
                    request_timeout: None,
                    options: parts.options,
                }),
            }),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    pub fn is_async(&self) -> bool {
        self.inner.async_mode
    }

    pub fn async_timeout(&self) -> u64 {
        self.inner.async_timeout_secs.load(Ordering::Relaxed)
    }

    /// Set how long async calls wait for their job, in seconds.
    pub fn set_async_timeout(&self, timeout_secs: u64) {
        self.inner
            .async_timeout_secs
            .store(timeout_secs, Ordering::Relaxed);
    }

    pub fn http_get_only(&self) -> bool {
        self.inner.http_get_only.load(Ordering::Relaxed)
    }

    /// Force GET even for commands that would be sent as POST.
    pub fn set_http_get_only(&self, get_only: bool) {
        self.inner.http_get_only.store(get_only, Ordering::Relaxed);
    }

    /// Per-request HTTP timeout, overriding the transport default.
    pub async fn set_request_timeout(&self, timeout: Duration) {
        self.inner.state.write().await.request_timeout = Some(timeout);
    }

    pub async fn set_http_client(&self, http_client: reqwest::Client) {
        self.inner.state.write().await.http_client = http_client;
    }

    /// Register hooks applied to the parameters of every call made
    /// through [`Client::execute`].
    pub async fn default_options<I>(&self, hooks: I)
    where
        I: IntoIterator<Item = Arc<dyn OptionHook>>,
    {
        self.inner.state.write().await.options.extend(hooks);
    }

    /// Async job API operations
    pub fn async_job(&self) -> super::asyncjob::AsyncJobApi<'_> {
        super::asyncjob::AsyncJobApi::new(self)
    }

    /// Host API operations
    pub fn host(&self) -> super::host::HostApi<'_> {
        super::host::HostApi::new(self)
    }

    /// Zone API operations
    pub fn zone(&self) -> super::zone::ZoneApi<'_> {
        super::zone::ZoneApi::new(self)
    }

    /// Domain API operations
    pub fn domain(&self) -> super::domain::DomainApi<'_> {
        super::domain::DomainApi::new(self)
    }

    /// Project API operations
    pub fn project(&self) -> super::project::ProjectApi<'_> {
        super::project::ProjectApi::new(self)
    }

    /// Apply the default hooks to `params`, then dispatch `command`.
    pub async fn execute<P: ApiParams>(
        &self,
        command: &str,
        params: &mut P,
        post: bool,
    ) -> Result<Value> {
        self.execute_with_options(command, params, post, &[]).await
    }

    /// Like [`Client::execute`], running `extra` after the default hooks.
    pub async fn execute_with_options<P: ApiParams>(
        &self,
        command: &str,
        params: &mut P,
        post: bool,
        extra: &[Arc<dyn OptionHook>],
    ) -> Result<Value> {
        self.apply_options(params, extra).await?;
        self.new_request(command, params.to_params(), post).await
    }

    /// Run the default hooks and then `extra`, in order, stopping at the
    /// first error.
    pub async fn apply_options(
        &self,
        params: &mut dyn ApiParams,
        extra: &[Arc<dyn OptionHook>],
    ) -> Result<()> {
        let hooks = self.inner.state.read().await.options.clone();
        for hook in hooks.iter().chain(extra) {
            hook.apply(self, params).await?;
        }
        Ok(())
    }

    /// Wait for `job_id` and return its raw `jobresult`.
    pub async fn get_async_job_result(&self, job_id: &str, timeout_secs: u64) -> Result<Value> {
        AsyncPoller::new(self)
            .await_job(job_id, Duration::from_secs(timeout_secs))
            .await
    }

    /// Like [`Client::get_async_job_result`], giving up early once `cancel`
    /// fires.
    pub async fn get_async_job_result_with_cancel(
        &self,
        job_id: &str,
        timeout_secs: u64,
        cancel: CancellationToken,
    ) -> Result<Value> {
        AsyncPoller::new(self)
            .with_cancellation(cancel)
            .await_job(job_id, Duration::from_secs(timeout_secs))
            .await
    }

    /// Decode the payload of a command that may have started an async job.
    ///
    /// In async mode the job is awaited and its result decoded instead,
    /// keeping the original `jobid`. With `unwrap_result` the job result is
    /// first reduced to its single entity (`{"host": {...}}` becomes the
    /// host).
    pub(crate) async fn complete_async<T: DeserializeOwned>(
        &self,
        payload: Value,
        unwrap_result: bool,
    ) -> Result<T> {
        let job_id = payload
            .get("jobid")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .map(str::to_string);
        let job_id = match job_id {
            Some(job_id) if self.is_async() => job_id,
            _ => return decode(payload),
        };

        let result = self
            .get_async_job_result(&job_id, self.async_timeout())
            .await?;
        let mut result = if unwrap_result {
            unwrap_value(result)?
        } else {
            result
        };

        if let Value::Object(map) = &mut result {
            map.entry("jobid")
                .or_insert_with(|| Value::String(job_id.clone()));
        }
        decode(result)
    }

    /// Decode a payload that may be a one-element `count` list.
    pub(crate) fn decode_entity<T: DeserializeOwned>(&self, payload: Value) -> Result<T> {
        decode(entity_payload(payload)?)
    }

    async fn new_request(&self, command: &str, mut params: ParamBag, post: bool) -> Result<Value> {
        for key in RESERVED_KEYS {
            params.remove(key);
        }
        params
            .set("apiKey", self.inner.credentials.api_key.as_str())
            .set("command", command)
            .set("response", "json");

        let wire = params.to_wire();
        let query = encode_values(&wire);
        let signature = sign(&query, &self.inner.credentials.secret)?;

        let (http_client, request_timeout) = {
            let state = self.inner.state.read().await;
            (state.http_client.clone(), state.request_timeout)
        };

        let use_post = post && !self.http_get_only();
        let mut request = if use_post {
            let mut form: Vec<(String, String)> = wire.into_iter().collect();
            form.push(("signature".to_string(), signature));
            http_client.post(&self.inner.base_url).form(&form)
        } else {
            let url = format!(
                "{}?{}&signature={}",
                self.inner.base_url,
                query,
                escape_value(&signature)
            );
            http_client.get(url)
        };

        if let Some(timeout) = request_timeout {
            request = request.timeout(timeout);
        }

        tracing::debug!(command, post = use_post, "CloudStack API request");

        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        tracing::debug!(command, status = status.as_u16(), "CloudStack API response");
        tracing::trace!("API response body: {}", String::from_utf8_lossy(&body));

        let payload = unwrap_envelope(&body)?;

        if status != StatusCode::OK {
            return Err(decode_error(status.as_u16(), payload));
        }

        Ok(payload)
    }
}

#[async_trait]
impl Dispatch for Client {
    async fn dispatch(&self, command: &str, params: ParamBag, post: bool) -> Result<Value> {
        self.new_request(command, params, post).await
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.inner.base_url)
            .field("credentials", &self.inner.credentials)
            .field("async_mode", &self.inner.async_mode)
            .field("http_get_only", &self.http_get_only())
            .field("async_timeout", &self.async_timeout())
            .finish()
    }
}
