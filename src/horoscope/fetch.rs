use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::redirect::Policy;
use reqwest::{Client, ClientBuilder, StatusCode};
use std::time::Duration;

use crate::error::{AppError, Result, SourceError};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const ACCEPT_VALUE: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";
const ACCEPT_LANGUAGE_VALUE: &str = "ru-RU,ru;q=0.8,en-US;q=0.5,en;q=0.3";

/// Network access used by the horoscope sources.
#[async_trait]
pub trait Fetch: Send + Sync {
    /// GET `url` and return the body. Anything but a 200 is an error.
    async fn get_text(&self, url: &str) -> std::result::Result<String, SourceError>;

    /// HEAD `url` and return the status code.
    async fn head_status(&self, url: &str) -> std::result::Result<u16, SourceError>;
}

/// reqwest-backed fetcher that looks like a desktop browser to the providers.
///
/// Accept-Encoding (gzip, deflate, br) is negotiated by reqwest itself so
/// that compressed bodies are decoded transparently.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
    /// HEAD-only client that reports redirects instead of following them.
    head_client: Client,
}

impl HttpFetcher {
    pub fn new(fetch_timeout: Duration, head_timeout: Duration) -> Result<Self> {
        let client = browser_client(fetch_timeout)
            .pool_max_idle_per_host(10)
            .build()
            .map_err(|e| AppError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        let head_client = browser_client(head_timeout)
            .redirect(Policy::none())
            .build()
            .map_err(|e| AppError::ConfigError(format!("Failed to build HEAD client: {}", e)))?;

        Ok(Self { client, head_client })
    }
}

fn browser_client(timeout: Duration) -> ClientBuilder {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_VALUE));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPT_LANGUAGE_VALUE));

    ClientBuilder::new()
        .user_agent(USER_AGENT)
        .default_headers(headers)
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(5)))
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn get_text(&self, url: &str) -> std::result::Result<String, SourceError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(SourceError::Status(status.as_u16()));
        }
        Ok(response.text().await?)
    }

    async fn head_status(&self, url: &str) -> std::result::Result<u16, SourceError> {
        let response = self.head_client.head(url).send().await?;
        Ok(response.status().as_u16())
    }
}
