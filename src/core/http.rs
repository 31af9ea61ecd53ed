//! HTTP client factory and request pipeline
//!
//! Every service builds its own [`ApiClient`] from a shared [`ApiContext`], so
//! all of them attach credentials and recover from 401 responses the same way.
//! The context replaces process-wide globals: it owns the configuration, the
//! token store, the navigator and the refresh gate for one running client.

use std::sync::Arc;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Method, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::Instrument;
use uuid::Uuid;

use crate::core::config::Config;
use crate::core::error::{ApiError, Result};
use crate::core::interceptor;
use crate::core::navigation::Navigator;
use crate::core::store::TokenStore;

/// At most one retry per logical request
pub const MAX_RETRIES: u32 = 1;

struct ContextInner {
    config: Config,
    http: reqwest::Client,
    tokens: TokenStore,
    navigator: Arc<dyn Navigator>,
    refresh_gate: futures::lock::Mutex<()>,
}

/// Session context shared by every service of one running client
#[derive(Clone)]
pub struct ApiContext {
    inner: Arc<ContextInner>,
}

impl std::fmt::Debug for ApiContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiContext")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl ApiContext {
    pub fn new(config: Config, tokens: TokenStore, navigator: Arc<dyn Navigator>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            inner: Arc::new(ContextInner {
                config,
                http,
                tokens,
                navigator,
                refresh_gate: futures::lock::Mutex::new(()),
            }),
        })
    }

    /// Context persisting the session to `config.session_file`
    #[cfg(not(target_arch = "wasm32"))]
    pub fn native(config: Config) -> Result<Self> {
        use crate::core::navigation::LogNavigator;
        use crate::core::store::FileStorage;

        let tokens = TokenStore::new(Arc::new(FileStorage::new(&config.session_file)));
        Self::new(config, tokens, Arc::new(LogNavigator))
    }

    /// Context backed by `localStorage` and `window.location`
    #[cfg(feature = "hydrate")]
    pub fn browser() -> Result<Self> {
        use crate::core::navigation::BrowserNavigator;
        use crate::core::store::LocalStorage;

        let tokens = TokenStore::new(Arc::new(LocalStorage));
        Self::new(Config::for_browser()?, tokens, Arc::new(BrowserNavigator))
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    pub fn tokens(&self) -> &TokenStore {
        &self.inner.tokens
    }

    pub fn navigator(&self) -> &dyn Navigator {
        self.inner.navigator.as_ref()
    }

    pub(crate) fn refresh_gate(&self) -> &futures::lock::Mutex<()> {
        &self.inner.refresh_gate
    }
}

/// Description of one logical API call
///
/// Descriptors are immutable; a retry is a new descriptor produced by
/// [`RequestDescriptor::retried`] that shares the original's id.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    id: Uuid,
    method: Method,
    segments: Vec<String>,
    query: Vec<(String, String)>,
    body: Option<serde_json::Value>,
    attempt: u32,
    recover_unauthorized: bool,
}

impl RequestDescriptor {
    /// `path` is a fixed route such as `"course/search/name"`; caller-supplied
    /// values go through [`segment`](Self::segment) so they get encoded.
    pub fn new(method: Method, path: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            method,
            segments: path
                .split('/')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            query: Vec::new(),
            body: None,
            attempt: 0,
            recover_unauthorized: true,
        }
    }

    pub fn get(path: &str) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: &str) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: &str) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: &str) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Append one path segment, percent-encoded as a whole
    pub fn segment(mut self, value: impl std::fmt::Display) -> Self {
        self.segments.push(value.to_string());
        self
    }

    pub fn query(mut self, key: &str, value: impl std::fmt::Display) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn json(mut self, body: &impl Serialize) -> Result<Self> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Let 401 responses reach the caller untouched
    pub fn without_recovery(mut self) -> Self {
        self.recover_unauthorized = false;
        self
    }

    /// The same request, one attempt later
    pub fn retried(&self) -> Self {
        Self {
            attempt: self.attempt + 1,
            ..self.clone()
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    pub fn body(&self) -> Option<&serde_json::Value> {
        self.body.as_ref()
    }

    pub fn can_retry(&self) -> bool {
        self.recover_unauthorized && self.attempt < MAX_RETRIES
    }

    /// Unencoded route, for logs
    pub fn path(&self) -> String {
        format!("/{}", self.segments.join("/"))
    }

    /// Absolute URL under the API base
    pub fn url(&self, base: &Url) -> Result<Url> {
        let mut url = base.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::Config(format!("API URL '{base}' cannot be a base")))?
            .pop_if_empty()
            .extend(&self.segments);
        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&self.query);
        }
        Ok(url)
    }
}

/// Request executor configured with the API base and interceptor pair
#[derive(Clone, Debug)]
pub struct ApiClient {
    ctx: ApiContext,
}

impl ApiClient {
    pub fn new(ctx: &ApiContext) -> Self {
        Self { ctx: ctx.clone() }
    }

    pub fn context(&self) -> &ApiContext {
        &self.ctx
    }

    /// Run a request through the full pipeline and decode the response body
    pub async fn send<T: DeserializeOwned>(&self, request: RequestDescriptor) -> Result<T> {
        let value = self.execute(request).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Request phase, dispatch, then the response phase for 401s
    pub(crate) async fn execute(&self, request: RequestDescriptor) -> Result<serde_json::Value> {
        let span = tracing::debug_span!(
            "api_request",
            id = %request.id,
            method = %request.method,
            path = %request.path()
        );

        async move {
            let token = self.ctx.tokens().access_token();
            match self.dispatch(&request, token.as_deref()).await {
                Err(err) if err.is_unauthorized() && request.can_retry() => {
                    interceptor::recover(self, &request, token, err).await
                }
                result => result,
            }
        }
        .instrument(span)
        .await
    }

    /// Send one attempt with the given bearer token; no 401 handling
    pub(crate) async fn dispatch(
        &self,
        request: &RequestDescriptor,
        token: Option<&str>,
    ) -> Result<serde_json::Value> {
        let url = request.url(&self.ctx.config().api_base_url)?;
        let mut builder = self.ctx.inner.http.request(request.method.clone(), url);
        builder = interceptor::authorize(builder, token);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        tracing::debug!(attempt = request.attempt, "Sending request");
        let response = builder.send().await?;
        decode_response(response).await
    }
}

async fn decode_response(response: reqwest::Response) -> Result<serde_json::Value> {
    let status = response.status();
    let bytes = response.bytes().await?;
    tracing::debug!(status = status.as_u16(), "Received response");

    if status.is_success() {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(serde_json::Value::Null);
        }
        return serde_json::from_slice(&bytes)
            .map_err(|e| ApiError::Decode(format!("response is not valid JSON: {e}")));
    }

    let body = serde_json::from_slice(&bytes).ok();
    Err(ApiError::from_status(status, body))
}
