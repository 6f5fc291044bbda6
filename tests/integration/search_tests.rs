//! Integration tests for the search session
//!
//! These tests use wiremock to stand in for the storefront and exercise the
//! full fetch/detect/fan-out/parse/normalize cycle end to end.

use noon_harvest::config::Config;
use noon_harvest::search::{extract_products, SearchSession};
use noon_harvest::HarvestError;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config() -> Config {
    Config {
        connection_limiter: 3,
        max_pages: 10,
        max_workers: 4,
    }
}

/// Renders one product anchor the way the storefront does
fn product(path: &str, price: &str, rating: Option<&str>) -> String {
    let rating_node = rating
        .map(|r| format!(r#"<div class="RatingPreviewStar_textCtr__z">{}</div>"#, r))
        .unwrap_or_default();
    format!(
        r#"<a class="ProductBoxLinkHandler_productBoxLink__abc" href="{}">
             <strong class="Price_amount__x">{}</strong>{}
           </a>"#,
        path, price, rating_node
    )
}

/// Renders a result page with the given products and an optional pager
fn result_page(products: &[String], page_count: Option<u32>) -> String {
    let pager = page_count
        .map(|count| {
            let items: String = (1..=count).map(|n| format!("<li>{}</li>", n)).collect();
            format!(r#"<ul role="navigation">{}</ul>"#, items)
        })
        .unwrap_or_default();
    format!(
        "<html><body>{}{}</body></html>",
        products.concat(),
        pager
    )
}

/// Mounts the landing redirect chain: `/` 302-redirects to `/egypt-ar/`,
/// which answers 200. The session base URL must resolve to `/egypt-ar/`.
async fn mount_landing(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/egypt-ar/"))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/egypt-ar/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><body>home</body></html>"))
        .mount(server)
        .await;
}

/// Mounts a mock for one numbered result page (page >= 2)
async fn mount_page(server: &MockServer, page: u32, template: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/egypt-ar/search/"))
        .and(query_param("page", page.to_string()))
        .respond_with(template)
        .mount(server)
        .await;
}

/// Mounts a mock for the first page request (no `page` parameter)
///
/// Consumes at most one request: the first search request of a run is always
/// page one, so later numbered requests fall through to their own mocks.
async fn mount_first_page(server: &MockServer, query: &str, template: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/egypt-ar/search/"))
        .and(query_param("q", query))
        .respond_with(template)
        .up_to_n_times(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_multi_page_search_merges_in_page_order() {
    let server = MockServer::start().await;
    mount_landing(&server).await;

    let page1 = result_page(
        &[product("/p/one", "100", Some("4.0"))],
        Some(3),
    );
    let page2 = result_page(&[product("/p/two", "200", None)], Some(3));
    let page3 = result_page(&[product("/p/three", "300", Some("3.5"))], Some(3));

    mount_page(&server, 2, ResponseTemplate::new(200).set_body_string(page2)).await;
    mount_page(&server, 3, ResponseTemplate::new(200).set_body_string(page3)).await;
    mount_first_page(&server, "widget", ResponseTemplate::new(200).set_body_string(page1)).await;

    let landing = format!("{}/", server.uri());
    let session = SearchSession::start_at(&test_config(), &landing)
        .await
        .expect("session init failed");

    let records = session.search("widget").await.expect("search failed");

    // Page-number order, one record per page
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].path, format!("{}/p/one", server.uri()));
    assert_eq!(records[1].path, format!("{}/p/two", server.uri()));
    assert_eq!(records[2].path, format!("{}/p/three", server.uri()));

    assert_eq!(records[1].selling_price, 200.0);
    assert!(records[1].rating.is_nan());
}

#[tokio::test]
async fn test_partial_page_failure_is_tolerated() {
    let server = MockServer::start().await;
    mount_landing(&server).await;

    let page1 = result_page(&[product("/p/one", "100", None)], Some(3));
    let page3 = result_page(&[product("/p/three", "300", None)], Some(3));

    mount_page(&server, 2, ResponseTemplate::new(500)).await;
    mount_page(&server, 3, ResponseTemplate::new(200).set_body_string(page3)).await;
    mount_first_page(&server, "widget", ResponseTemplate::new(200).set_body_string(page1)).await;

    let landing = format!("{}/", server.uri());
    let session = SearchSession::start_at(&test_config(), &landing)
        .await
        .expect("session init failed");

    let records = session.search("widget").await.expect("search failed");

    // Page 2 contributes nothing; the run still completes
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].path, format!("{}/p/one", server.uri()));
    assert_eq!(records[1].path, format!("{}/p/three", server.uri()));
}

#[tokio::test]
async fn test_total_failure_is_fatal() {
    let server = MockServer::start().await;
    mount_landing(&server).await;

    // Every search request fails
    Mock::given(method("GET"))
        .and(path("/egypt-ar/search/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let landing = format!("{}/", server.uri());
    let session = SearchSession::start_at(&test_config(), &landing)
        .await
        .expect("session init failed");

    let result = session.search("widget").await;
    assert!(matches!(result, Err(HarvestError::NoResults { .. })));
}

#[tokio::test]
async fn test_single_page_matches_plain_extraction() {
    let server = MockServer::start().await;
    mount_landing(&server).await;

    // No pager at all: detected count is 1, no fan-out happens
    let page1 = result_page(
        &[
            product("/p/one", "1,299.50", Some("4.3")),
            product("/p/two", "89", None),
        ],
        None,
    );
    mount_first_page(
        &server,
        "widget",
        ResponseTemplate::new(200).set_body_string(page1.clone()),
    )
    .await;

    let landing = format!("{}/", server.uri());
    let session = SearchSession::start_at(&test_config(), &landing)
        .await
        .expect("session init failed");

    let records = session.search("widget").await.expect("search failed");

    // Equals extract_products(page1) with paths absolutized
    let expected = extract_products(&page1);
    assert_eq!(records.len(), expected.len());
    for (got, want) in records.iter().zip(&expected) {
        assert_eq!(got.path, session.base_url().join(&want.path).unwrap().as_str());
        assert_eq!(
            got.selling_price.is_nan(),
            want.selling_price.is_nan()
        );
        if !want.selling_price.is_nan() {
            assert_eq!(got.selling_price, want.selling_price);
        }
    }
    assert_eq!(records[0].selling_price, 1299.5);
}

#[tokio::test]
async fn test_max_pages_caps_fan_out() {
    let server = MockServer::start().await;
    mount_landing(&server).await;

    // Pager advertises 5 pages but config allows only 2
    let page1 = result_page(&[product("/p/one", "100", None)], Some(5));
    let page2 = result_page(&[product("/p/two", "200", None)], Some(5));

    mount_page(&server, 2, ResponseTemplate::new(200).set_body_string(page2)).await;

    // Pages past the cap must never be requested; verified on server drop
    Mock::given(method("GET"))
        .and(path("/egypt-ar/search/"))
        .and(query_param("page", "3"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    mount_first_page(&server, "widget", ResponseTemplate::new(200).set_body_string(page1)).await;

    let config = Config {
        connection_limiter: 3,
        max_pages: 2,
        max_workers: 4,
    };

    let landing = format!("{}/", server.uri());
    let session = SearchSession::start_at(&config, &landing)
        .await
        .expect("session init failed");

    let records = session.search("widget").await.expect("search failed");
    assert_eq!(records.len(), 2);
}

#[tokio::test]
async fn test_failed_initialization_is_fatal() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let landing = format!("{}/", server.uri());
    let result = SearchSession::start_at(&test_config(), &landing).await;

    assert!(matches!(result, Err(HarvestError::Init { .. })));
}

#[tokio::test]
async fn test_base_url_follows_landing_redirect() {
    let server = MockServer::start().await;
    mount_landing(&server).await;

    let page1 = result_page(&[product("p/relative", "50", None)], None);
    mount_first_page(&server, "widget", ResponseTemplate::new(200).set_body_string(page1)).await;

    let landing = format!("{}/", server.uri());
    let session = SearchSession::start_at(&test_config(), &landing)
        .await
        .expect("session init failed");

    assert_eq!(
        session.base_url().as_str(),
        format!("{}/egypt-ar/", server.uri())
    );

    // A path relative to the base URL resolves under /egypt-ar/
    let records = session.search("widget").await.expect("search failed");
    assert_eq!(
        records[0].path,
        format!("{}/egypt-ar/p/relative", server.uri())
    );
}
