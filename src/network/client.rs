//! HTTP client for talking to the search backend

use crate::config::OutgoingSettings;
use crate::error::SearchError;
use reqwest::{Client, Response};
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;

/// HTTP client wrapper configured from outgoing settings
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    default_timeout: Duration,
    user_agent: String,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> anyhow::Result<Self> {
        Self::with_settings(&OutgoingSettings::default())
    }

    /// Create a new HTTP client with custom settings
    pub fn with_settings(settings: &OutgoingSettings) -> anyhow::Result<Self> {
        let mut builder = Client::builder()
            .timeout(Duration::from_secs_f64(settings.request_timeout))
            .pool_max_idle_per_host(settings.pool_maxsize)
            .gzip(true)
            .brotli(true);

        if !settings.verify_ssl {
            builder = builder.danger_accept_invalid_certs(true);
        }

        if let Some(ref proxy_url) = settings.proxies.all {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url)?);
        } else {
            if let Some(ref http) = settings.proxies.http {
                builder = builder.proxy(reqwest::Proxy::http(http)?);
            }
            if let Some(ref https) = settings.proxies.https {
                builder = builder.proxy(reqwest::Proxy::https(https)?);
            }
        }

        let client = builder.build()?;

        Ok(Self {
            client,
            default_timeout: Duration::from_secs_f64(settings.request_timeout),
            user_agent: user_agent(settings.useragent_suffix.as_deref()),
        })
    }

    /// POST a JSON body with extra headers
    pub async fn post_json<B: Serialize + ?Sized>(
        &self,
        url: &str,
        headers: &[(&str, String)],
        body: &B,
    ) -> Result<HttpResponse, SearchError> {
        let mut req_builder = self
            .client
            .post(url)
            .timeout(self.default_timeout)
            .header("User-Agent", &self.user_agent)
            .header("Accept", "application/json");

        for (key, value) in headers {
            req_builder = req_builder.header(*key, value);
        }

        let response = req_builder.json(body).send().await?;

        Self::parse_response(response).await
    }

    async fn parse_response(response: Response) -> Result<HttpResponse, SearchError> {
        let status = response.status().as_u16();

        let mut headers = HashMap::new();
        for (key, value) in response.headers() {
            if let Ok(v) = value.to_str() {
                headers.insert(key.to_string(), v.to_string());
            }
        }

        let text = response.text().await?;

        Ok(HttpResponse {
            status,
            headers,
            text,
        })
    }

    /// Get current user agent
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}

/// HTTP response from the backend
#[derive(Debug)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: HashMap<String, String>,
    /// Response body as text
    pub text: String,
}

impl HttpResponse {
    /// Parse response as JSON
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, SearchError> {
        Ok(serde_json::from_str(&self.text)?)
    }

    /// Check if response is successful (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Check if the status means the credential was rejected or the quota is spent
    pub fn is_auth_or_rate_limited(&self) -> bool {
        matches!(self.status, 401 | 403 | 429)
    }

    /// Header lookup, case-insensitive
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

fn user_agent(suffix: Option<&str>) -> String {
    let base = format!("github-user-search/{}", crate::VERSION);
    match suffix {
        Some(s) if !s.trim().is_empty() => format!("{} {}", base, s.trim()),
        _ => base,
    }
}
