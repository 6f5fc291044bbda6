//! HTTP fetch client
//!
//! This module handles all HTTP requests for a search session, including:
//! - Building a client with the shared browser header set
//! - Resolving the session base URL from the landing redirect chain
//! - Fetching individual result pages through the concurrency gate
//! - Classifying failures as fatal (initialization) or recoverable (pages)

use crate::search::session::SessionContext;
use crate::{HarvestError, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, LOCATION};
use reqwest::{redirect::Policy, Client, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use url::Url;

/// Landing URL of the storefront; the real base URL is whatever this
/// redirects to (region/locale resolution happens server side)
pub const LANDING_URL: &str = "https://www.noon.com/egypt-ar/";

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/135.0.0.0 Safari/537.36";

/// Redirect hops tolerated while resolving the landing URL
const MAX_REDIRECTS: usize = 10;

/// Outcome of fetching one result page
///
/// Absent markup means the page answered with a non-200 status or a
/// transport error; the orchestrator drops it before extraction.
#[derive(Debug)]
pub struct PageFetchResult {
    /// 1-based page number this fetch was for
    pub page_number: u32,

    /// Page body, or None for a non-success outcome
    pub markup: Option<String>,
}

/// Builds the shared header set sent with every request
///
/// The site serves a degraded page to clients that do not look like a
/// browser, so the full client-hint header set is carried.
fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8",
        ),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
    headers.insert(
        HeaderName::from_static("sec-ch-ua"),
        HeaderValue::from_static(r#""Brave";v="135", "Not-A.Brand";v="8", "Chromium";v="135""#),
    );
    headers.insert(
        HeaderName::from_static("sec-ch-ua-mobile"),
        HeaderValue::from_static("?0"),
    );
    headers.insert(
        HeaderName::from_static("sec-ch-ua-platform"),
        HeaderValue::from_static(r#""Windows""#),
    );
    headers
}

/// Builds an HTTP client with the shared headers and timeouts
///
/// Redirects are off at the client level; only session initialization
/// follows them, manually, so the final resolved URL can be captured.
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client() -> std::result::Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(USER_AGENT)
        .default_headers(browser_headers())
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::none())
        .gzip(true)
        .brotli(true)
        .build()
}

/// HTTP client for one search session
///
/// Wraps the reqwest client with the fetch concurrency gate. The gate is the
/// only mutable state shared across fetch tasks; every `fetch_page` call
/// holds exactly one permit for its full duration, released on every exit
/// path by the permit's drop.
#[derive(Clone)]
pub struct SearchClient {
    client: Client,
    gate: Arc<Semaphore>,
}

impl SearchClient {
    /// Creates a client with a fetch gate of `connection_limiter` slots
    ///
    /// The caller is responsible for `connection_limiter >= 1`; config
    /// loading clamps it. A zero-slot gate would block every fetch forever.
    pub fn new(connection_limiter: usize) -> std::result::Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client()?,
            gate: Arc::new(Semaphore::new(connection_limiter)),
        })
    }

    /// Resolves the session base URL from the landing request
    ///
    /// Issues one GET to the landing URL and follows redirects manually, up
    /// to [`MAX_REDIRECTS`] hops. The final URL of a 2xx response becomes
    /// the base URL for every later request and for path absolutization.
    ///
    /// Any transport failure, non-success terminal status, or redirect
    /// overflow here is fatal: no session is usable without a resolved base
    /// URL.
    ///
    /// # Arguments
    ///
    /// * `landing_url` - The storefront landing URL to resolve
    ///
    /// # Returns
    ///
    /// * `Ok(Url)` - The resolved base URL
    /// * `Err(HarvestError::Init)` - Initialization failed, abort the run
    pub async fn initialize(&self, landing_url: &str) -> Result<Url> {
        // The landing request counts against the gate like any other fetch
        let _permit = self.acquire_gate().await;

        let mut current = Url::parse(landing_url)?;

        for _ in 0..=MAX_REDIRECTS {
            let response = self
                .client
                .get(current.clone())
                .send()
                .await
                .map_err(|e| HarvestError::Init {
                    url: current.to_string(),
                    message: e.to_string(),
                })?;

            let status = response.status();

            if status.is_redirection() {
                let location = response
                    .headers()
                    .get(LOCATION)
                    .and_then(|v| v.to_str().ok())
                    .ok_or_else(|| HarvestError::Init {
                        url: current.to_string(),
                        message: format!("redirect ({}) without a Location header", status),
                    })?;

                current = current.join(location).map_err(|e| HarvestError::Init {
                    url: current.to_string(),
                    message: format!("unparseable redirect target '{}': {}", location, e),
                })?;
                continue;
            }

            if status.is_success() {
                tracing::debug!("Session base URL resolved to {}", current);
                return Ok(current);
            }

            return Err(HarvestError::Init {
                url: current.to_string(),
                message: format!("HTTP {}", status),
            });
        }

        Err(HarvestError::Init {
            url: landing_url.to_string(),
            message: format!("more than {} redirects", MAX_REDIRECTS),
        })
    }

    /// Fetches one result page for a query
    ///
    /// Sends GET `base_url + "search/"` with `q=<query>` and, for pages past
    /// the first, `page=<n>`. A non-200 status or transport error is
    /// recoverable: it is logged with the page identity and the result
    /// carries absent markup.
    ///
    /// # Arguments
    ///
    /// * `ctx` - The session context holding the resolved base URL
    /// * `query` - The search query
    /// * `page_number` - Page to fetch; `None` means the first page
    pub async fn fetch_page(
        &self,
        ctx: &SessionContext,
        query: &str,
        page_number: Option<u32>,
    ) -> PageFetchResult {
        let page = page_number.unwrap_or(1);
        let _permit = self.acquire_gate().await;

        let search_url = match ctx.base_url.join("search/") {
            Ok(u) => u,
            Err(e) => {
                tracing::error!("Failed to build search URL for page {}: {}", page, e);
                return PageFetchResult {
                    page_number: page,
                    markup: None,
                };
            }
        };

        let mut params = vec![("q", query.to_string())];
        if let Some(n) = page_number {
            params.push(("page", n.to_string()));
            tracing::debug!("Requesting page {}", n);
        }

        let response = match self.client.get(search_url).query(&params).send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::error!("Failed to fetch results for page {}: {}", page, e);
                return PageFetchResult {
                    page_number: page,
                    markup: None,
                };
            }
        };

        if response.status() != StatusCode::OK {
            tracing::error!(
                "Failed to fetch results for page {} (HTTP {})",
                page,
                response.status()
            );
            return PageFetchResult {
                page_number: page,
                markup: None,
            };
        }

        match response.text().await {
            Ok(body) => PageFetchResult {
                page_number: page,
                markup: Some(body),
            },
            Err(e) => {
                tracing::error!("Failed to read body for page {}: {}", page, e);
                PageFetchResult {
                    page_number: page,
                    markup: None,
                }
            }
        }
    }

    /// Acquires one slot of the fetch gate
    ///
    /// The semaphore is owned by this client and never closed, so
    /// acquisition can only pend, not fail.
    async fn acquire_gate(&self) -> tokio::sync::OwnedSemaphorePermit {
        match self.gate.clone().acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => unreachable!("fetch gate is never closed"),
        }
    }
}
