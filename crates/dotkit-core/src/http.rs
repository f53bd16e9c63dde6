//! HTTP seam. Widgets and tools fetch through a [`Fetcher`] so tests can
//! serve canned bodies.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::{DotkitError, Result};

#[async_trait]
pub trait Fetcher: Send + Sync {
    /// GET `url` and return the body of a 2xx response.
    async fn get_text(&self, url: &str) -> Result<String>;

    /// POST `body` as JSON with an optional bearer token.
    async fn post_json(&self, url: &str, _bearer: Option<&str>, _body: &Value) -> Result<String> {
        Err(DotkitError::http(url, "POST not supported"))
    }
}

/// `reqwest`-backed fetcher with a fixed timeout and user agent.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| DotkitError::http("client", e))?;
        Ok(Self { client })
    }

    async fn body(url: &str, resp: reqwest::Response) -> Result<String> {
        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(DotkitError::http(url, format!("HTTP {status}: {}", text.trim())));
        }
        resp.text().await.map_err(|e| DotkitError::http(url, e))
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn get_text(&self, url: &str) -> Result<String> {
        debug!(url, "GET");
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DotkitError::http(url, e))?;
        Self::body(url, resp).await
    }

    async fn post_json(&self, url: &str, bearer: Option<&str>, body: &Value) -> Result<String> {
        debug!(url, "POST");
        let mut req = self.client.post(url).json(body);
        if let Some(token) = bearer {
            req = req.header("Authorization", format!("Bearer {token}"));
        }
        let resp = req.send().await.map_err(|e| DotkitError::http(url, e))?;
        Self::body(url, resp).await
    }
}
