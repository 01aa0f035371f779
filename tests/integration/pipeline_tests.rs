use crate::common::{
    create_test_config, landing_page, listing_page, received_batches, USER_AGENT,
};
use catalog_miner::sink::HttpIngestEndpoint;
use catalog_miner::source::{build_http_client, HtmlSource};
use catalog_miner::{Config, Coordinator, MinerError, RunState, RunSummary};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_page(server: &MockServer, page_path: &str, page: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .and(query_param("p", page))
        .respond_with(response)
        .mount(server)
        .await;
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/html")
}

async fn mount_landing(server: &MockServer, paths: &[&str]) {
    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("user-agent", USER_AGENT))
        .respond_with(html(landing_page(paths)))
        .mount(server)
        .await;
}

async fn mount_ingest(api: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/products/"))
        .respond_with(ResponseTemplate::new(201))
        .mount(api)
        .await;
}

async fn run_pipeline(config: &Config) -> Result<RunSummary, MinerError> {
    let source_config = &config.sources[0];
    let client = build_http_client(&config.user_agent, Duration::from_secs(5)).unwrap();
    let source = Arc::new(HtmlSource::from_config(source_config, client).unwrap());
    let endpoint =
        Arc::new(HttpIngestEndpoint::from_config(&config.sink, &config.user_agent).unwrap());

    Coordinator::from_config(config, source_config, source, endpoint)
        .run()
        .await
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_mixed_category_outcomes_end_to_end() {
    let shop = MockServer::start().await;
    let api = MockServer::start().await;

    mount_landing(&shop, &["/a", "/b", "/c"]).await;

    // Category A: two products, then an empty page
    mount_page(
        &shop,
        "/a",
        "1",
        html(listing_page(&[
            ("a1", "Item A1", "Gs. 10.000"),
            ("a2", "Item A2", "Gs. 20.000"),
        ])),
    )
    .await;
    mount_page(&shop, "/a", "2", html(listing_page(&[]))).await;

    // Category B: first page fails
    mount_page(&shop, "/b", "1", ResponseTemplate::new(503)).await;

    // Category C: one product, then a server error
    mount_page(
        &shop,
        "/c",
        "1",
        html(listing_page(&[("c1", "Item C1", "Gs. 5.000")])),
    )
    .await;
    mount_page(&shop, "/c", "2", ResponseTemplate::new(500)).await;

    mount_ingest(&api).await;

    let config = create_test_config(&shop.uri(), &api.uri(), 2, false);
    let summary = run_pipeline(&config).await.expect("run should reach delivery");

    assert_eq!(summary.state, RunState::Done);
    assert_eq!(summary.categories_attempted, 3);
    assert_eq!(summary.categories_complete, 1);
    assert_eq!(summary.categories_failed, 1);
    assert_eq!(summary.categories_partial, 1);
    assert_eq!(summary.unique_products, 3);
    assert_eq!(summary.batches_sent, 2);
    assert_eq!(summary.batches_failed, 0);
    assert_eq!(summary.products_delivered, 3);

    let batches = received_batches(&api).await;
    let sizes: Vec<usize> = batches.iter().map(Vec::len).collect();
    assert_eq!(sizes, vec![2, 1]);

    let names: HashSet<String> = batches.into_iter().flatten().map(|p| p.name).collect();
    let expected: HashSet<String> = ["Item A1", "Item A2", "Item C1"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    assert_eq!(names, expected);
}

#[tokio::test]
async fn test_pagination_stops_at_first_empty_page() {
    let shop = MockServer::start().await;
    let api = MockServer::start().await;

    mount_landing(&shop, &["/tv"]).await;
    mount_page(
        &shop,
        "/tv",
        "1",
        html(listing_page(&[("tv1", "TV 1", "1.000")])),
    )
    .await;
    mount_page(
        &shop,
        "/tv",
        "2",
        html(listing_page(&[("tv2", "TV 2", "2.000")])),
    )
    .await;
    mount_page(&shop, "/tv", "3", html(listing_page(&[]))).await;

    // Page 4 must never be requested
    Mock::given(method("GET"))
        .and(path("/tv"))
        .and(query_param("p", "4"))
        .respond_with(html(listing_page(&[("tv4", "TV 4", "4.000")])))
        .expect(0)
        .mount(&shop)
        .await;

    mount_ingest(&api).await;

    let config = create_test_config(&shop.uri(), &api.uri(), 1000, false);
    let summary = run_pipeline(&config).await.unwrap();

    assert_eq!(summary.pages_fetched, 3);
    assert_eq!(summary.unique_products, 2);
    assert_eq!(summary.batches_sent, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_products_listed_in_two_categories_delivered_once() {
    let shop = MockServer::start().await;
    let api = MockServer::start().await;

    mount_landing(&shop, &["/phones", "/offers"]).await;
    mount_page(
        &shop,
        "/phones",
        "1",
        html(listing_page(&[
            ("x1", "Phone X1", "1.500.000"),
            ("x2", "Phone X2", "2.000.000"),
        ])),
    )
    .await;
    mount_page(
        &shop,
        "/offers",
        "1",
        html(listing_page(&[("x1", "Phone X1 (promo)", "1.200.000")])),
    )
    .await;
    mount_page(&shop, "/phones", "2", html(listing_page(&[]))).await;
    mount_page(&shop, "/offers", "2", html(listing_page(&[]))).await;
    mount_ingest(&api).await;

    let config = create_test_config(&shop.uri(), &api.uri(), 1000, false);
    let summary = run_pipeline(&config).await.unwrap();

    assert_eq!(summary.raw_products, 3);
    assert_eq!(summary.unique_products, 2);
    assert_eq!(summary.duplicates_dropped, 1);

    let delivered: Vec<_> = received_batches(&api).await.into_iter().flatten().collect();
    let ids: HashSet<_> = delivered.iter().map(|p| p.id.clone()).collect();
    assert_eq!(delivered.len(), 2);
    assert_eq!(ids.len(), 2);
}

#[tokio::test]
async fn test_name_dedup_drops_relisted_items() {
    let shop = MockServer::start().await;
    let api = MockServer::start().await;

    mount_landing(&shop, &["/audio"]).await;
    mount_page(
        &shop,
        "/audio",
        "1",
        html(listing_page(&[
            ("speaker-1", "Speaker Mini", "300.000"),
            ("speaker-1-black", "Speaker  Mini", "300.000"),
            ("headset", "Headset Pro", "450.000"),
        ])),
    )
    .await;
    mount_page(&shop, "/audio", "2", html(listing_page(&[]))).await;
    mount_ingest(&api).await;

    let config = create_test_config(&shop.uri(), &api.uri(), 1000, true);
    let summary = run_pipeline(&config).await.unwrap();

    assert_eq!(summary.unique_products, 2);
    assert_eq!(summary.name_duplicates_dropped, 1);
    assert_eq!(summary.duplicates_dropped, 0);
}

#[tokio::test]
async fn test_discovery_failure_aborts_run() {
    let shop = MockServer::start().await;
    let api = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&shop)
        .await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&api)
        .await;

    let config = create_test_config(&shop.uri(), &api.uri(), 1000, false);
    let result = run_pipeline(&config).await;

    match result {
        Err(MinerError::Discovery { origin, .. }) => assert_eq!(origin, "MockShop"),
        other => panic!("expected discovery failure, got {:?}", other.map(|s| s.state)),
    }
}

#[tokio::test]
async fn test_failed_batch_does_not_block_the_next() {
    let shop = MockServer::start().await;
    let api = MockServer::start().await;

    mount_landing(&shop, &["/home"]).await;
    mount_page(
        &shop,
        "/home",
        "1",
        html(listing_page(&[
            ("h1", "Lamp", "100.000"),
            ("h2", "Chair", "200.000"),
            ("h3", "Table", "300.000"),
        ])),
    )
    .await;
    mount_page(&shop, "/home", "2", html(listing_page(&[]))).await;

    // First delivery is rejected, later ones succeed
    Mock::given(method("POST"))
        .and(path("/products/"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&api)
        .await;
    mount_ingest(&api).await;

    let config = create_test_config(&shop.uri(), &api.uri(), 2, false);
    let summary = run_pipeline(&config).await.unwrap();

    assert_eq!(summary.state, RunState::Done);
    assert_eq!(summary.batches_sent, 2);
    assert_eq!(summary.batches_failed, 1);
    assert_eq!(summary.products_delivered, 1);
    assert_eq!(received_batches(&api).await.len(), 2);
}
