//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests made by the walker:
//! - Building the HTTP client with user agent and timeouts
//! - GET requests for comic pages (text)
//! - GET requests for strip images (bytes)
//! - Error classification
//!
//! Nothing here retries; a failed request is reported once and the caller
//! decides what to do with it.

use crate::config::{ScraperConfig, UserAgentConfig};
use crate::WalkerError;
use reqwest::Client;
use std::time::Duration;

/// Result of fetching a comic page
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched the page
    Success {
        /// Final URL after redirects
        final_url: String,
        /// HTTP status code
        status_code: u16,
        /// Page body content
        body: String,
    },

    /// The server answered with a non-success status
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// Network error (connection refused, timeout, unreadable body, etc.)
    NetworkError {
        /// Error description
        error: String,
    },
}

/// Formats the user agent string sent with every request
///
/// Format: `CrawlerName/Version (+ContactURL; ContactEmail)`
pub fn user_agent_string(config: &UserAgentConfig) -> String {
    format!(
        "{}/{} (+{}; {})",
        config.crawler_name, config.crawler_version, config.contact_url, config.contact_email
    )
}

/// Builds an HTTP client with proper configuration
///
/// Every request gets the configured whole-request and connect timeouts.
///
/// # Example
///
/// ```no_run
/// use comic_walker::config::{ScraperConfig, UserAgentConfig};
/// use comic_walker::crawler::build_http_client;
///
/// let user_agent = UserAgentConfig {
///     crawler_name: "ComicWalker".to_string(),
///     crawler_version: "0.1".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&user_agent, &ScraperConfig::default()).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    scraper: &ScraperConfig,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent_string(user_agent))
        .timeout(Duration::from_secs(scraper.request_timeout))
        .connect_timeout(Duration::from_secs(scraper.connect_timeout))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a comic page as text
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The absolute URL to fetch
///
/// # Returns
///
/// A FetchResult indicating success or the type of failure
pub async fn fetch_page(client: &Client, url: &str) -> FetchResult {
    match client.get(url).send().await {
        Ok(response) => {
            let status = response.status();
            let final_url = response.url().to_string();

            if !status.is_success() {
                return FetchResult::HttpError {
                    status_code: status.as_u16(),
                };
            }

            match response.text().await {
                Ok(body) => FetchResult::Success {
                    final_url,
                    status_code: status.as_u16(),
                    body,
                },
                Err(e) => FetchResult::NetworkError {
                    error: e.to_string(),
                },
            }
        }
        Err(e) => FetchResult::NetworkError {
            error: classify_error(&e),
        },
    }
}

/// Fetches an image and returns its raw bytes
///
/// Non-success statuses are turned into [`WalkerError::HttpStatus`] so the
/// download worker can collect them alongside transport errors.
pub async fn fetch_image(client: &Client, url: &str) -> Result<Vec<u8>, WalkerError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|source| WalkerError::Http {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(WalkerError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let bytes = response.bytes().await.map_err(|source| WalkerError::Http {
        url: url.to_string(),
        source,
    })?;

    Ok(bytes.to_vec())
}

/// Describes a transport error in one short phrase
fn classify_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        "Request timeout".to_string()
    } else if error.is_connect() {
        "Connection refused".to_string()
    } else {
        error.to_string()
    }
}
