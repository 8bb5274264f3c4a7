use std::time::Duration;

use anyhow::Context;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Serialize;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5000);

#[derive(Clone, Debug)]
pub struct HttpClientConfig {
    base: Option<Url>,
    headers: HeaderMap,
    timeout: Duration,
}

/// Factory for configured HTTP clients. Holds no connection state itself.
#[derive(Clone, Debug, Default)]
pub struct HttpService;

#[derive(Clone, Debug)]
pub struct ApiClient {
    base: Option<Url>,
    timeout: Duration,
    client: reqwest::Client,
}

impl HttpService {
    pub fn new() -> Self {
        Self
    }

    pub fn create(&self, config: Option<HttpClientConfig>) -> anyhow::Result<ApiClient> {
        let config = config.unwrap_or_default();
        let mut builder = reqwest::Client::builder().timeout(config.timeout);
        if !config.headers.is_empty() {
            builder = builder.default_headers(config.headers);
        }
        let client = builder.build().context("failed to build http client")?;
        tracing::trace!(timeout_ms = %config.timeout.as_millis(), "http client created");
        Ok(ApiClient {
            base: config.base,
            timeout: config.timeout,
            client,
        })
    }
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            base: None,
            headers: HeaderMap::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl HttpClientConfig {
    pub fn with_base_url(mut self, base_url: &str) -> anyhow::Result<Self> {
        self.base = Some(Url::parse(base_url).context("invalid base url")?);
        Ok(self)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_header(
        mut self,
        key: impl AsRef<str>,
        value: impl AsRef<str>,
    ) -> anyhow::Result<Self> {
        let header_name =
            HeaderName::from_bytes(key.as_ref().as_bytes()).context("invalid header name")?;
        let header_value = HeaderValue::from_str(value.as_ref()).context("invalid header value")?;
        self.headers.insert(header_name, header_value);
        Ok(self)
    }
}

impl ApiClient {
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn base_url(&self) -> Option<&Url> {
        self.base.as_ref()
    }

    pub fn inner(&self) -> &reqwest::Client {
        &self.client
    }

    /// Resolves `path` against the base url; absolute urls pass through.
    pub fn url(&self, path: &str) -> anyhow::Result<Url> {
        match &self.base {
            Some(base) => base.join(path).context("failed to join url"),
            None => Url::parse(path).context("relative path without base url"),
        }
    }

    pub async fn send(&self, request: reqwest::RequestBuilder) -> anyhow::Result<reqwest::Response> {
        Ok(request.send().await?)
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> anyhow::Result<T> {
        let res = self
            .client
            .get(self.url(path)?)
            .send()
            .await?
            .error_for_status()?;
        Ok(res.json().await?)
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> anyhow::Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let res = self
            .client
            .post(self.url(path)?)
            .json(body)
            .send()
            .await?
            .error_for_status()?;
        Ok(res.json().await?)
    }
}
