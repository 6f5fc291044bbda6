//! Product extraction from search result markup
//!
//! This module turns one page of raw search result HTML into an ordered list
//! of product records. It is a pure function over the markup text: no I/O,
//! no shared state, safe to run concurrently across independent pages.

use scraper::{ElementRef, Html, Selector};
use serde::Serialize;

/// One extracted product
///
/// Numeric fields use `f64::NAN` as the "field absent or unparseable"
/// sentinel; absence of a price or rating node is never an error.
#[derive(Debug, Clone, Serialize)]
pub struct ProductRecord {
    /// Product link target, site-relative until the session base URL is
    /// joined in by the orchestrator
    pub path: String,

    /// Current price, NAN if the page shows none
    pub selling_price: f64,

    /// Pre-discount price, NAN if the page shows none
    pub old_price: f64,

    /// Star rating, NAN if the product is unrated
    pub rating: f64,
}

/// Extracts the products from one page of search result HTML
///
/// Every anchor whose class marks it as a product box yields one record, in
/// document order. Fields that have no matching node inside the anchor's
/// subtree come back as the NAN sentinel.
///
/// # Arguments
///
/// * `markup` - Text of one search results page
///
/// # Returns
///
/// The products found on the page, in document order. Markup with no product
/// anchors (including non-HTML garbage, which the parser error-recovers into
/// an empty document) yields an empty vector.
pub fn extract_products(markup: &str) -> Vec<ProductRecord> {
    let document = Html::parse_document(markup);
    let mut products = Vec::new();

    let anchor_selector = match Selector::parse(r#"a[class*="ProductBoxLinkHandler_productBoxLink"]"#)
    {
        Ok(s) => s,
        Err(_) => return products,
    };

    for anchor in document.select(&anchor_selector) {
        // Anchors without a link target carry no usable record
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };

        products.push(ProductRecord {
            path: href.to_string(),
            selling_price: first_number(&anchor, r#"strong[class*="Price_amount"]"#),
            old_price: first_number(&anchor, r#"span[class*="Price_oldPrice"]"#),
            rating: first_number(&anchor, r#"div[class*="RatingPreviewStar_textCtr"]"#),
        });
    }

    products
}

/// Finds the first element matching `selector` inside the anchor's subtree
/// and parses its text content as a number, NAN if absent or unparseable
fn first_number(anchor: &ElementRef, selector: &str) -> f64 {
    let Ok(selector) = Selector::parse(selector) else {
        return f64::NAN;
    };

    anchor
        .select(&selector)
        .next()
        .map(|element| clean_number(&element.text().collect::<String>()))
        .unwrap_or(f64::NAN)
}

/// Normalizes a displayed number: trims whitespace, strips thousands
/// separators, and parses as f64, NAN on failure
pub fn clean_number(text: &str) -> f64 {
    text.trim().replace(',', "").parse().unwrap_or(f64::NAN)
}
