//! Search session orchestration
//!
//! This module drives the end-to-end flow for one query:
//! 1. Resolve the session base URL from the landing redirect chain
//! 2. Fetch the first page and detect the total page count
//! 3. Clamp against the configured maximum and fan out concurrent fetches
//!    for the remaining pages
//! 4. Parse all fetched pages on a blocking worker pool
//! 5. Concatenate records in page-number order and absolutize their paths
//!
//! Per-page fetch and parse failures are logged and excluded; only a failed
//! initialization or a run where no page at all came back is fatal.

use crate::search::client::{PageFetchResult, SearchClient, LANDING_URL};
use crate::search::extract::{extract_products, ProductRecord};
use crate::search::pagination::detect_page_count;
use crate::{Config, HarvestError, Result};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use url::Url;

/// Immutable per-session state
///
/// Established once when the session starts and read-only afterwards. The
/// orchestrator owns it and hands it to the fetch client by reference.
#[derive(Debug)]
pub struct SessionContext {
    /// Resolved landing URL; base for all search requests and for rewriting
    /// relative product paths to absolute ones
    pub base_url: Url,

    /// Size of the fetch concurrency gate
    pub concurrency_limit: usize,

    /// Cap on how many result pages are fetched
    pub max_pages: u32,

    /// Number of blocking workers for parallel page parsing
    pub parser_worker_count: usize,
}

/// One search session against the storefront
///
/// Holds the fetch client and the resolved session context. Sessions are
/// cheap to keep around; each `search` call runs independently.
pub struct SearchSession {
    client: SearchClient,
    ctx: Arc<SessionContext>,
}

impl SearchSession {
    /// Starts a session against the production landing URL
    ///
    /// # Errors
    ///
    /// `HarvestError::Init` if the landing request fails; nothing can run
    /// without a resolved base URL.
    pub async fn start(config: &Config) -> Result<Self> {
        Self::start_at(config, LANDING_URL).await
    }

    /// Starts a session against an explicit landing URL
    ///
    /// Used by tests to point the session at a mock server; behavior is
    /// otherwise identical to [`SearchSession::start`].
    pub async fn start_at(config: &Config, landing_url: &str) -> Result<Self> {
        let client = SearchClient::new(config.connection_limiter as usize)?;
        let base_url = client.initialize(landing_url).await?;

        let ctx = SessionContext {
            base_url,
            concurrency_limit: config.connection_limiter as usize,
            max_pages: config.max_pages.max(1),
            parser_worker_count: config.max_workers as usize,
        };

        Ok(Self {
            client,
            ctx: Arc::new(ctx),
        })
    }

    /// The resolved base URL of this session
    pub fn base_url(&self) -> &Url {
        &self.ctx.base_url
    }

    /// Runs one query end to end and returns the normalized records
    ///
    /// # Errors
    ///
    /// `HarvestError::NoResults` when every fetch, first page included, came
    /// back without markup. Partial failures do not error; the affected
    /// pages simply contribute no records.
    pub async fn search(&self, query: &str) -> Result<Vec<ProductRecord>> {
        // First page; its markup is the only source for the page count
        let first_page = self.client.fetch_page(&self.ctx, query, None).await;

        let detected = first_page
            .markup
            .as_deref()
            .map(detect_page_count)
            .unwrap_or(1);
        tracing::info!("Found {} page(s)", detected);

        let effective_count = detected.min(self.ctx.max_pages);

        let mut pages = if effective_count > 1 {
            tracing::info!(
                "Requesting all products from {} page(s) with limit {}",
                effective_count,
                self.ctx.concurrency_limit
            );
            let mut remaining = self.fetch_remaining(query, effective_count).await;
            // First page stays fixed at index 0
            remaining.insert(0, first_page);
            remaining
        } else {
            vec![first_page]
        };

        if pages.iter().all(|page| page.markup.is_none()) {
            return Err(HarvestError::NoResults {
                query: query.to_string(),
            });
        }

        tracing::info!("Start parsing {} page(s)", pages.len());

        // Drop the absent pages; only fetched markup reaches extraction
        let fetched: Vec<(u32, String)> = pages
            .drain(..)
            .filter_map(|page| page.markup.map(|markup| (page.page_number, markup)))
            .collect();

        let mut parsed = self.parse_pages(fetched).await;

        // Deterministic output: concatenate in page-number order rather than
        // task-completion order
        parsed.sort_by_key(|(page_number, _)| *page_number);

        let mut records: Vec<ProductRecord> = parsed
            .into_iter()
            .flat_map(|(_, page_records)| page_records)
            .collect();

        // Product paths are relative; join them with the resolved base URL.
        // Joining an already-absolute path is a no-op, so this is idempotent.
        for record in &mut records {
            match self.ctx.base_url.join(&record.path) {
                Ok(absolute) => record.path = absolute.to_string(),
                Err(e) => {
                    tracing::warn!("Leaving unjoinable path '{}' as-is: {}", record.path, e);
                }
            }
        }

        Ok(records)
    }

    /// Fans out concurrent fetches for pages 2 through `effective_count`
    ///
    /// All fetches are issued at once; the gate inside the client bounds how
    /// many run simultaneously. Results come back in completion order.
    async fn fetch_remaining(
        &self,
        query: &str,
        effective_count: u32,
    ) -> Vec<PageFetchResult> {
        let mut tasks = JoinSet::new();

        for page_number in 2..=effective_count {
            let client = self.client.clone();
            let ctx = Arc::clone(&self.ctx);
            let query = query.to_string();
            tasks.spawn(async move { client.fetch_page(&ctx, &query, Some(page_number)).await });
        }

        let mut results = Vec::with_capacity(tasks.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(page) => results.push(page),
                Err(e) => tracing::error!("Fetch task failed: {}", e),
            }
        }
        results
    }

    /// Extracts products from every fetched page
    ///
    /// A single page parses inline on the calling task; multiple pages go
    /// through `spawn_blocking` workers, at most `parser_worker_count` at a
    /// time. A worker failure loses only that page's records.
    async fn parse_pages(&self, fetched: Vec<(u32, String)>) -> Vec<(u32, Vec<ProductRecord>)> {
        if fetched.len() <= 1 {
            // No need for any sort of pooling when it is just one page
            return fetched
                .into_iter()
                .map(|(page_number, markup)| (page_number, extract_products(&markup)))
                .collect();
        }

        let pool = Arc::new(Semaphore::new(self.ctx.parser_worker_count));
        let mut tasks = JoinSet::new();

        for (page_number, markup) in fetched {
            let pool = Arc::clone(&pool);
            tasks.spawn(async move {
                // Pool slot held for the duration of the blocking parse;
                // the pool outlives every task, so acquire cannot fail
                let _slot = match pool.acquire_owned().await {
                    Ok(slot) => slot,
                    Err(_) => unreachable!("parse pool is never closed"),
                };
                let records =
                    tokio::task::spawn_blocking(move || extract_products(&markup)).await;
                (page_number, records)
            });
        }

        let mut parsed = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((page_number, Ok(records))) => parsed.push((page_number, records)),
                Ok((page_number, Err(e))) => {
                    tracing::error!(
                        "Failed to extract products from page {}: {}",
                        page_number,
                        e
                    );
                }
                Err(e) => tracing::error!("Parse task failed: {}", e),
            }
        }
        parsed
    }
}
