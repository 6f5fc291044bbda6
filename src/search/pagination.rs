//! Page-count detection from the first result page
//!
//! The site renders its pager as a `ul` with a navigation role whose list
//! items hold page numbers. The highest number is the page count.

use scraper::{Html, Selector};

/// Determines how many result pages a search query has
///
/// Collects the text of every item in the navigation-role list that parses
/// cleanly as a non-negative integer and returns the maximum. Malformed
/// markup or an absent pager degrades to 1 rather than erroring.
///
/// # Arguments
///
/// * `markup` - Text of the first search results page
///
/// # Returns
///
/// The total page count, always >= 1
pub fn detect_page_count(markup: &str) -> u32 {
    let document = Html::parse_document(markup);

    let Ok(item_selector) = Selector::parse(r#"ul[role="navigation"] li"#) else {
        return 1;
    };

    document
        .select(&item_selector)
        .filter_map(|item| {
            item.text()
                .collect::<String>()
                .trim()
                .parse::<u32>()
                .ok()
        })
        .max()
        .unwrap_or(1)
}
