use crate::common::{create_test_config, landing_page, listing_page, user_agent, USER_AGENT};
use catalog_miner::sink::{HttpIngestEndpoint, IngestEndpoint};
use catalog_miner::source::{build_http_client, HtmlSource, SourceAdapter};
use catalog_miner::{Category, Product, SinkError, SourceError};
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn html_source(shop: &MockServer) -> HtmlSource {
    let config = create_test_config(&shop.uri(), "http://127.0.0.1:9", 1000, false);
    let client = build_http_client(&config.user_agent, Duration::from_secs(5)).unwrap();
    HtmlSource::from_config(&config.sources[0], client).unwrap()
}

fn product(path: &str) -> Product {
    Product::new(
        "MockShop",
        "Blender 600W",
        350_000,
        true,
        "https://shop.example.com/img/blender.jpg",
        &format!("https://shop.example.com/item/{}", path),
        "Kitchen",
    )
}

#[tokio::test]
async fn test_discovery_resolves_and_dedups_links() {
    let shop = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("user-agent", USER_AGENT))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(landing_page(&["/tv", "/audio", "/tv"])),
        )
        .mount(&shop)
        .await;

    let categories = html_source(&shop).discover_categories().await.unwrap();

    assert_eq!(categories.len(), 2);
    assert_eq!(categories[0].name, "tv");
    assert_eq!(categories[0].slug, "/tv");
    assert_eq!(categories[0].page_url(3), format!("{}/tv?p=3", shop.uri()));
    assert_eq!(categories[1].name, "audio");
}

#[tokio::test]
async fn test_discovery_http_error_surfaces_status() {
    let shop = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&shop)
        .await;

    let result = html_source(&shop).discover_categories().await;
    assert!(matches!(result, Err(SourceError::Http { status: 503, .. })));
}

#[tokio::test]
async fn test_fetch_and_parse_listing_page() {
    let shop = MockServer::start().await;
    let body = listing_page(&[("k1", "Kettle", "Gs. 150.000"), ("k2", "Toaster", "Gs. 99.000")])
        .replace(
            r#"<span class="price">Gs. 150.000</span>"#,
            r#"<span class="price">Gs. 150.000</span><span class="price">Gs. 120.000</span><span class="sale">Oferta</span>"#,
        );
    Mock::given(method("GET"))
        .and(path("/kitchen"))
        .and(query_param("p", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&shop)
        .await;

    let source = html_source(&shop);
    let category = Category::new(
        "Kitchen",
        "/kitchen",
        format!("{}/kitchen?p={{page}}", shop.uri()),
    );

    let raw = source.fetch_page(&category, 2).await.unwrap();
    assert_eq!(raw.page, 2);

    let parsed = source.parse_page(&category, &raw);
    assert_eq!(parsed.skipped, 0);
    assert_eq!(parsed.products.len(), 2);

    let kettle = &parsed.products[0];
    assert_eq!(kettle.name, "Kettle");
    assert_eq!(kettle.price, 120_000);
    assert!(kettle.is_discounted);
    assert_eq!(kettle.origin, "MockShop");
    assert_eq!(kettle.category_name, "Kitchen");
    assert_eq!(kettle.product_url, format!("{}/item/k1", shop.uri()));
    assert_eq!(kettle.image_url, format!("{}/img/k1.jpg", shop.uri()));

    assert!(!parsed.products[1].is_discounted);
}

#[tokio::test]
async fn test_fetch_page_non_success_is_error() {
    let shop = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/kitchen"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&shop)
        .await;

    let source = html_source(&shop);
    let category = Category::new(
        "Kitchen",
        "/kitchen",
        format!("{}/kitchen?p={{page}}", shop.uri()),
    );

    let result = source.fetch_page(&category, 1).await;
    assert!(matches!(result, Err(SourceError::Http { status: 404, .. })));
}

#[tokio::test]
async fn test_ingest_posts_json_array() {
    let api = MockServer::start().await;
    let batch = vec![product("1"), product("2")];

    Mock::given(method("POST"))
        .and(path("/products/"))
        .and(header("content-type", "application/json"))
        .and(body_json(&batch))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&api)
        .await;

    let endpoint = HttpIngestEndpoint::new(
        format!("{}/products/", api.uri()),
        Duration::from_secs(5),
        &user_agent(),
    )
    .unwrap();

    endpoint.submit(&batch).await.unwrap();

    let requests = api.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let first = &body[0];
    assert_eq!(first["id"], batch[0].id.as_str());
    assert_eq!(first["price"], 350_000);
    assert_eq!(first["is_discounted"], true);
    assert_eq!(first["category_name"], "Kitchen");
}

#[tokio::test]
async fn test_ingest_accepts_any_success_status() {
    let api = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&api)
        .await;

    let endpoint = HttpIngestEndpoint::new(api.uri(), Duration::from_secs(5), &user_agent()).unwrap();
    assert!(endpoint.submit(&[product("1")]).await.is_ok());
}

#[tokio::test]
async fn test_ingest_rejection_reports_status() {
    let api = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(422))
        .mount(&api)
        .await;

    let endpoint = HttpIngestEndpoint::new(api.uri(), Duration::from_secs(5), &user_agent()).unwrap();
    let result = endpoint.submit(&[product("1")]).await;
    assert!(matches!(result, Err(SinkError::Rejected { status: 422 })));
}

#[tokio::test]
async fn test_ingest_timeout() {
    let api = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201).set_delay(Duration::from_secs(3)))
        .mount(&api)
        .await;

    let endpoint =
        HttpIngestEndpoint::new(api.uri(), Duration::from_millis(200), &user_agent()).unwrap();
    let result = endpoint.submit(&[product("1")]).await;
    assert!(matches!(result, Err(SinkError::Timeout)));
}
