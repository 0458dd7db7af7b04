//! Content fetching from URLs, files, and stdin.
//!
//! The harvester talks to the network through the [`PageFetcher`] trait so
//! that it can be driven by canned pages in tests. [`HttpFetcher`] is the
//! reqwest-backed implementation.

use std::fs;
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::Client;
use url::Url;

use crate::{BeanpressError, Result};

const ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// HTTP client configuration for fetching lesson pages.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Request timeout in seconds.
    pub timeout: u64,
    /// User-Agent header. The site serves bare pages to non-browser agents.
    pub user_agent: String,
    /// Referer header, if any.
    pub referer: Option<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: 30,
            user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.5.2 Safari/605.1.15".to_string(),
            referer: Some("https://mandarinbean.com/all-lessons/".to_string()),
        }
    }
}

/// Source of raw page markup.
pub trait PageFetcher: Send + Sync {
    /// Fetches the markup at `url`.
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String>> + Send;
}

/// Fetches pages over HTTP with a shared client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    config: FetchConfig,
}

impl HttpFetcher {
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = build_client(&config)?;
        Ok(Self { client, config })
    }
}

impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        get_text(&self.client, url, &self.config).await
    }
}

fn build_client(config: &FetchConfig) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(config.timeout))
        .build()
        .map_err(BeanpressError::HttpError)
}

/// Fetches HTML content from a URL.
///
/// Sends browser-like headers, follows redirects, and treats any non-2xx
/// status as an error.
pub async fn fetch_url(url: &str, config: &FetchConfig) -> Result<String> {
    let client = build_client(config)?;
    get_text(&client, url, config).await
}

async fn get_text(client: &Client, url: &str, config: &FetchConfig) -> Result<String> {
    let parsed_url = Url::parse(url).map_err(|e| BeanpressError::InvalidUrl(e.to_string()))?;

    if !matches!(parsed_url.scheme(), "http" | "https") {
        return Err(BeanpressError::InvalidUrl(format!(
            "unsupported scheme {:?} (expected http or https)",
            parsed_url.scheme()
        )));
    }

    let mut request = client
        .get(parsed_url)
        .header("User-Agent", &config.user_agent)
        .header("Accept", ACCEPT)
        .header("Accept-Language", "en-US,en;q=0.9");
    if let Some(referer) = &config.referer {
        request = request.header("Referer", referer);
    }

    let response = request.send().await.map_err(|e| {
        if e.is_timeout() { BeanpressError::Timeout { timeout: config.timeout } } else { BeanpressError::HttpError(e) }
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(BeanpressError::HttpStatus { url: url.to_string(), status: status.as_u16() });
    }

    Ok(response.text().await?)
}

/// Reads HTML content from a local file.
pub fn fetch_file(path: &str) -> Result<String> {
    let path_buf = PathBuf::from(path);

    if !path_buf.exists() {
        Err(BeanpressError::FileNotFound(path_buf))
    } else {
        fs::read_to_string(&path_buf).map_err(BeanpressError::from)
    }
}

/// Reads HTML content from standard input until EOF.
pub fn fetch_stdin() -> Result<String> {
    use std::io::{self, Read};

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer).map_err(BeanpressError::from)?;

    Ok(buffer)
}
