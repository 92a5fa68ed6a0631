use series_core::{
    reconcile, CatalogStore, ClientConfig, JsonCatalogStore, JsonStatsSink, Pacing,
    ScraperConfig, SeriesScraper,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LISTING: &str = r#"<html><body>
    <div class="MovieBlock">
        <a href="/show/1"><img src="/img/1.jpg"></a>
        <h3>45 : Breaking News</h3>
    </div>
    <div class="MovieBlock">
        <a href="/show/2"></a>
        <h3>12 Drama Show</h3>
    </div>
    <div class="MovieBlock"><span>broken card</span></div>
</body></html>"#;

async fn mount_page(server: &MockServer, route: &str, status: u16, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}

async fn mock_site() -> MockServer {
    let server = MockServer::start().await;
    mount_page(&server, "/series", 200, LISTING).await;
    mount_page(
        &server,
        "/show/1",
        200,
        r#"<a href="/episode/1-1">1</a><a href="/episode/1-2">2</a>"#,
    )
    .await;
    mount_page(&server, "/show/2", 200, r#"<a href="/episode/2-1">1</a>"#).await;
    mount_page(
        &server,
        "/episode/1-1",
        200,
        r#"<script>var hls = "https://cdn.test/1-1/index.m3u8";</script>
           <a href="https://cdn.test/1-1.mp4">mp4</a>"#,
    )
    .await;
    mount_page(
        &server,
        "/episode/1-2",
        200,
        r#"<iframe src="https://player.test/embed/1-2"></iframe>"#,
    )
    .await;
    mount_page(&server, "/episode/2-1", 500, "").await;
    server
}

fn scraper_for(server: &MockServer) -> SeriesScraper {
    let config = ScraperConfig {
        base_url: server.uri(),
        listing_url: format!("{}/series?year=2026", server.uri()),
        start_page: 1,
        end_page: 1,
        enrich_limit: None,
        pacing: Pacing::none(),
        ..ScraperConfig::default()
    };
    let client = ClientConfig {
        requests_per_second: 0.0,
        timeout_secs: 5,
        ..ClientConfig::default()
    };
    SeriesScraper::with_client_config(config, client).unwrap()
}

#[tokio::test]
async fn full_run_then_identical_rerun() {
    let server = mock_site().await;
    let dir = tempfile::tempdir().unwrap();
    let store = JsonCatalogStore::new(dir.path().join("series_data.json"));
    let stats = JsonStatsSink::new(dir.path().join("stats.json"));
    let scraper = scraper_for(&server);

    let first = scraper.run(&store, &stats).await.unwrap();
    assert_eq!(first.summary.series_added, 2);
    assert_eq!(first.summary.episodes_added, 0);
    assert_eq!(first.stats.total_series, 2);
    assert_eq!(first.stats.total_episodes, 3);
    assert_eq!(first.stats.episodes_with_watch_url, 2);
    assert_eq!(first.stats.pages_scraped, 1);

    let catalog = store.load().await;
    assert_eq!(catalog.total_series, 2);
    let news = &catalog.series[0];
    assert_eq!(news.title, "Breaking News");
    assert_eq!(news.url, format!("{}/show/1", server.uri()));
    assert_eq!(news.image_url, format!("{}/img/1.jpg", server.uri()));
    assert_eq!(
        news.episodes[0].watch_url.as_deref(),
        Some("https://cdn.test/1-1/index.m3u8")
    );
    assert_eq!(
        news.episodes[1].watch_url.as_deref(),
        Some("https://player.test/embed/1-2")
    );
    let drama = &catalog.series[1];
    assert_eq!(drama.title, "Drama Show");
    assert_eq!(drama.episodes.len(), 1);
    assert_eq!(drama.episodes[0].watch_url, None);

    let second = scraper.run(&store, &stats).await.unwrap();
    assert_eq!(second.summary.series_added, 0);
    assert_eq!(second.summary.episodes_added, 0);
    assert_eq!(second.stats.total_series, 2);
    assert_eq!(second.stats.total_episodes, 3);

    let rerun = store.load().await;
    assert_eq!(rerun.series, catalog.series);
    assert_ne!(rerun.last_update, catalog.last_update);

    let raw_stats: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join("stats.json")).unwrap())
            .unwrap();
    assert_eq!(raw_stats["totalSeries"], 2);
    assert_eq!(raw_stats["pagesScraped"], 1);
}

#[tokio::test]
async fn known_series_gains_only_new_episodes() {
    let server = mock_site().await;
    let dir = tempfile::tempdir().unwrap();
    let store = JsonCatalogStore::new(dir.path().join("series_data.json"));
    let stats = JsonStatsSink::new(dir.path().join("stats.json"));
    let scraper = scraper_for(&server);

    // Seed the catalog with series 1 knowing only its first episode.
    let mut seed = scraper.collect().await.series;
    seed.truncate(1);
    seed[0].episodes.truncate(1);
    seed[0].episodes[0].watch_url = Some("https://cdn.test/original.m3u8".to_string());
    let (catalog, _) = reconcile(Default::default(), seed);
    store.save(&catalog).await.unwrap();

    let report = scraper.run(&store, &stats).await.unwrap();
    assert_eq!(report.summary.series_added, 1);
    assert_eq!(report.summary.episodes_added, 1);

    let merged = store.load().await;
    let numbers: Vec<u32> = merged.series[0].episodes.iter().map(|e| e.number).collect();
    assert_eq!(numbers, vec![1, 2]);
    assert_eq!(
        merged.series[0].episodes[0].watch_url.as_deref(),
        Some("https://cdn.test/original.m3u8")
    );
}

#[tokio::test]
async fn unreachable_listing_keeps_existing_catalog() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let store = JsonCatalogStore::new(dir.path().join("series_data.json"));
    let stats = JsonStatsSink::new(dir.path().join("stats.json"));

    let populated = mock_site().await;
    scraper_for(&populated).run(&store, &stats).await.unwrap();
    let before = store.load().await;

    let report = scraper_for(&server).run(&store, &stats).await.unwrap();
    assert_eq!(report.stats.pages_scraped, 0);
    assert_eq!(report.summary.series_added, 0);

    let after = store.load().await;
    assert_eq!(after.series, before.series);
}

#[tokio::test]
async fn save_failure_is_reported() {
    let server = mock_site().await;
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, b"x").unwrap();
    let store = JsonCatalogStore::new(blocker.join("series_data.json"));
    let stats = JsonStatsSink::new(dir.path().join("stats.json"));

    let err = scraper_for(&server).run(&store, &stats).await.unwrap_err();
    assert!(err.is_fatal());
    assert!(!dir.path().join("stats.json").exists());
}

#[tokio::test]
async fn uncommitted_merge_leaves_catalog_bytes_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let catalog_path = dir.path().join("series_data.json");
    let store = JsonCatalogStore::new(&catalog_path);
    let stats = JsonStatsSink::new(dir.path().join("stats.json"));

    let (seed, _) = reconcile(Default::default(), Vec::new());
    store.save(&seed).await.unwrap();
    let before = std::fs::read(&catalog_path).unwrap();

    let server = mock_site().await;
    let scraper = scraper_for(&server);
    let prepared = scraper.prepare(&store).await;
    assert_eq!(prepared.summary.series_added, 2);
    assert_eq!(prepared.catalog.total_series, 2);
    drop(prepared);

    assert_eq!(std::fs::read(&catalog_path).unwrap(), before);
    assert!(!dir.path().join("stats.json").exists());

    let report = scraper.prepare(&store).await.commit(&store, &stats).await.unwrap();
    assert_eq!(report.stats.total_series, 2);
    assert_ne!(std::fs::read(&catalog_path).unwrap(), before);
}
