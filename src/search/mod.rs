//! Search module for fetching and extracting paginated results
//!
//! This module contains the core scraping logic, including:
//! - HTTP fetching through a bounded-concurrency gate
//! - Page-count detection from the first result page
//! - Product extraction from result markup
//! - Overall session orchestration

mod client;
mod extract;
mod pagination;
mod session;

pub use client::{build_http_client, PageFetchResult, SearchClient, LANDING_URL};
pub use extract::{clean_number, extract_products, ProductRecord};
pub use pagination::detect_page_count;
pub use session::{SearchSession, SessionContext};

use crate::{Config, Result};

/// Runs one search end to end against the production storefront
///
/// This is the main entry point for a search. It will:
/// 1. Resolve the session base URL (fatal on failure)
/// 2. Fetch and parse every result page up to the configured maximum
/// 3. Return the records with absolute product paths
///
/// # Arguments
///
/// * `config` - The scraper configuration
/// * `query` - The search query
///
/// # Returns
///
/// * `Ok(Vec<ProductRecord>)` - Ordered records across all fetched pages
/// * `Err(HarvestError)` - Initialization failed or no page came back
pub async fn search(config: &Config, query: &str) -> Result<Vec<ProductRecord>> {
    let session = SearchSession::start(config).await?;
    session.search(query).await
}
