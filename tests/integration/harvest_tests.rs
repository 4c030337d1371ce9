//! End-to-end harvest runs against a mock site

use reel_harvest::config::{Config, CrawlerConfig, FetcherConfig, OutputConfig, SiteConfig};
use reel_harvest::crawler::Coordinator;
use reel_harvest::storage::{CatalogStore, CheckpointStore};
use reel_harvest::RunSummary;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at the mock server
fn create_test_config(base_url: &str, dir: &Path, batch_size: u32) -> Config {
    Config {
        site: SiteConfig {
            base_url: base_url.to_string(),
            listing_path: "/page/{page}/".to_string(),
        },
        fetcher: FetcherConfig {
            max_attempts: 1,
            timeout_secs: 5,
            user_agent: "TestBrowser/1.0".to_string(),
        },
        crawler: CrawlerConfig {
            batch_size,
            min_delay_ms: 0,
            max_delay_ms: 0,
        },
        output: OutputConfig {
            catalog_path: dir.join("movies.json"),
            checkpoint_path: dir.join("last_page.txt"),
        },
    }
}

/// Renders a listing page linking to `/movie/{slug}/` for each slug
fn listing_page(total_pages: u32, slugs: &[&str]) -> String {
    let items: String = slugs
        .iter()
        .map(|slug| {
            format!(
                r#"<div class="item"><a class="thumnail-imagee" href="/movie/{}/"><img src="/t/{}.jpg"></a></div>"#,
                slug, slug
            )
        })
        .collect();

    format!(
        r#"<html><body>{}<div class="nav"><span class="pages">Page 1 of {}</span></div></body></html>"#,
        items, total_pages
    )
}

/// Renders an item detail page
fn detail_page(title: &str) -> String {
    format!(
        r#"<html><body>
        <h1 itemprop="name">{title}</h1>
        <img itemprop="image" src="https://img.example.com/{title}.jpg" />
        <a href="https://streamtape.com/v/{title}-st">Streamtape 720p</a>
        <a href="https://mixdrop.co/f/{title}-md">MixDrop 360p</a>
        </body></html>"#
    )
}

async fn mount_page(server: &MockServer, route: &str, body: String, hits: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(hits)
        .mount(server)
        .await;
}

async fn mount_status(server: &MockServer, route: &str, status: u16, hits: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status))
        .expect(hits)
        .mount(server)
        .await;
}

async fn run(config: Config) -> RunSummary {
    let coordinator = Coordinator::new(config).expect("Failed to create coordinator");
    coordinator.run().await.expect("Harvest failed")
}

fn stored_titles(config: &Config) -> Vec<String> {
    CatalogStore::new(config.output.catalog_path.clone())
        .load()
        .records()
        .iter()
        .map(|record| record.title.clone())
        .collect()
}

fn stored_checkpoint(config: &Config) -> u32 {
    CheckpointStore::new(config.output.checkpoint_path.clone()).load()
}

#[tokio::test]
async fn test_two_page_harvest_then_rerun() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), dir.path(), 10);

    // Page 1 serves discovery and its own items, so one hit per run
    mount_page(&server, "/page/1/", listing_page(2, &["a"]), 2).await;
    mount_page(&server, "/page/2/", listing_page(2, &["b"]), 2).await;
    mount_page(&server, "/movie/a/", detail_page("A"), 2).await;
    mount_page(&server, "/movie/b/", detail_page("B"), 2).await;

    let first = run(config.clone()).await;

    assert_eq!(first.total_pages, 2);
    assert_eq!(first.items_captured, 2);
    assert_eq!(first.duplicates, 0);
    assert_eq!(first.checkpoint, 2);
    assert_eq!(stored_titles(&config), vec!["A", "B"]);
    assert_eq!(stored_checkpoint(&config), 2);

    let catalog = CatalogStore::new(config.output.catalog_path.clone()).load();
    let record = &catalog.records()[0];
    assert_eq!(
        record.poster_url.as_deref(),
        Some("https://img.example.com/A.jpg")
    );
    assert_eq!(record.streaming_embed_url, "https://streamtape.com/e/A-st/");
    assert_eq!(
        record.download_links["MixDrop"]["360p"],
        vec!["https://mixdrop.co/f/A-md".to_string()]
    );

    // Rewind the checkpoint so the second run walks both pages again
    std::fs::write(&config.output.checkpoint_path, "1").unwrap();
    let second = run(config.clone()).await;

    assert_eq!(second.items_captured, 0);
    assert_eq!(second.duplicates, 2);
    assert_eq!(second.catalog_size, 2);
    assert_eq!(stored_titles(&config), vec!["A", "B"]);
    assert_eq!(stored_checkpoint(&config), 2);
}

#[tokio::test]
async fn test_resume_skips_pages_before_checkpoint() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), dir.path(), 10);
    std::fs::write(&config.output.checkpoint_path, "3").unwrap();

    // Page 1 is fetched only to discover the page count
    mount_page(&server, "/page/1/", listing_page(4, &["a"]), 1).await;
    mount_page(&server, "/page/2/", listing_page(4, &["b"]), 0).await;
    mount_page(&server, "/page/3/", listing_page(4, &["c"]), 1).await;
    mount_page(&server, "/page/4/", listing_page(4, &["d"]), 1).await;
    mount_page(&server, "/movie/a/", detail_page("A"), 0).await;
    mount_page(&server, "/movie/b/", detail_page("B"), 0).await;
    mount_page(&server, "/movie/c/", detail_page("C"), 1).await;
    mount_page(&server, "/movie/d/", detail_page("D"), 1).await;

    let summary = run(config.clone()).await;

    assert_eq!(summary.start_page, 3);
    assert_eq!(summary.pages_processed, 2);
    assert_eq!(stored_titles(&config), vec!["C", "D"]);
    assert_eq!(stored_checkpoint(&config), 4);
}

#[tokio::test]
async fn test_resume_keeps_existing_catalog() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), dir.path(), 10);

    std::fs::write(&config.output.checkpoint_path, "2").unwrap();
    std::fs::write(
        &config.output.catalog_path,
        r#"[{"title": "B", "poster_url": null, "download_links": {}, "streaming_embed": "No link found"}]"#,
    )
    .unwrap();

    mount_page(&server, "/page/1/", listing_page(2, &["a"]), 1).await;
    mount_page(&server, "/page/2/", listing_page(2, &["b", "c"]), 1).await;
    mount_page(&server, "/movie/b/", detail_page("B"), 1).await;
    mount_page(&server, "/movie/c/", detail_page("C"), 1).await;

    let summary = run(config.clone()).await;

    assert_eq!(summary.items_captured, 1);
    assert_eq!(summary.duplicates, 1);
    assert_eq!(stored_titles(&config), vec!["B", "C"]);

    // The existing record is kept as it was, not replaced by the fresh fetch
    let catalog = CatalogStore::new(config.output.catalog_path.clone()).load();
    assert_eq!(catalog.records()[0].poster_url, None);
}

#[tokio::test]
async fn test_unavailable_listing_page_is_skipped_and_checkpointed() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), dir.path(), 2);

    mount_page(&server, "/page/1/", listing_page(3, &["a"]), 1).await;
    mount_status(&server, "/page/2/", 500, 1).await;
    mount_page(&server, "/page/3/", listing_page(3, &["c"]), 1).await;
    mount_page(&server, "/movie/a/", detail_page("A"), 1).await;
    mount_page(&server, "/movie/c/", detail_page("C"), 1).await;

    let summary = run(config.clone()).await;

    assert_eq!(summary.pages_processed, 2);
    assert_eq!(summary.pages_skipped, 1);
    assert_eq!(stored_titles(&config), vec!["A", "C"]);
    assert_eq!(stored_checkpoint(&config), 3);
}

#[tokio::test]
async fn test_unavailable_item_is_skipped() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), dir.path(), 10);

    mount_page(&server, "/page/1/", listing_page(1, &["a", "gone", "c"]), 1).await;
    mount_page(&server, "/movie/a/", detail_page("A"), 1).await;
    mount_status(&server, "/movie/gone/", 404, 1).await;
    mount_page(&server, "/movie/c/", detail_page("C"), 1).await;

    let summary = run(config.clone()).await;

    assert_eq!(summary.items_captured, 2);
    assert_eq!(summary.items_unavailable, 1);
    assert_eq!(stored_titles(&config), vec!["A", "C"]);
}

#[tokio::test]
async fn test_unreachable_first_page_assumes_single_page() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), dir.path(), 10);

    // Discovery fails, then page 1 is attempted once more by the loop
    mount_status(&server, "/page/1/", 503, 2).await;
    mount_page(&server, "/page/2/", listing_page(2, &["b"]), 0).await;

    let summary = run(config.clone()).await;

    assert_eq!(summary.total_pages, 1);
    assert_eq!(summary.pages_skipped, 1);
    assert_eq!(stored_checkpoint(&config), 1);
    assert!(stored_titles(&config).is_empty());
    assert_eq!(
        std::fs::read_to_string(&config.output.catalog_path).unwrap(),
        "[]"
    );
}

#[tokio::test]
async fn test_listing_without_pagination_is_one_page() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), dir.path(), 10);

    let body = r#"<html><body><a class="thumnail-imagee" href="/movie/a/">A</a></body></html>"#;
    mount_page(&server, "/page/1/", body.to_string(), 1).await;
    mount_page(&server, "/page/2/", listing_page(2, &["b"]), 0).await;
    mount_page(&server, "/movie/a/", detail_page("A"), 1).await;

    let summary = run(config.clone()).await;

    assert_eq!(summary.total_pages, 1);
    assert_eq!(stored_titles(&config), vec!["A"]);
}

#[tokio::test]
async fn test_untitled_items_collide() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), dir.path(), 10);

    let untitled = r#"<html><body><p>Coming soon</p></body></html>"#.to_string();
    mount_page(&server, "/page/1/", listing_page(1, &["x", "y"]), 1).await;
    mount_page(&server, "/movie/x/", untitled.clone(), 1).await;
    mount_page(&server, "/movie/y/", untitled, 1).await;

    let summary = run(config.clone()).await;

    assert_eq!(summary.items_captured, 1);
    assert_eq!(summary.duplicates, 1);
    assert_eq!(stored_titles(&config), vec!["No Title"]);
}

#[tokio::test]
async fn test_corrupt_catalog_is_replaced() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), dir.path(), 10);
    std::fs::write(&config.output.catalog_path, "[{\"title\": \"Tru").unwrap();
    std::fs::write(&config.output.checkpoint_path, "not a number").unwrap();

    mount_page(&server, "/page/1/", listing_page(1, &["a"]), 1).await;
    mount_page(&server, "/movie/a/", detail_page("A"), 1).await;

    run(config.clone()).await;

    let content = std::fs::read_to_string(&config.output.catalog_path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(parsed.as_array().map(Vec::len), Some(1));
    assert_eq!(stored_checkpoint(&config), 1);
}

#[tokio::test]
async fn test_checkpoint_written_at_batch_boundaries() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), dir.path(), 2);

    mount_page(&server, "/page/1/", listing_page(3, &["a"]), 1).await;
    mount_page(&server, "/page/2/", listing_page(3, &["b"]), 1).await;
    // The last page's item cannot be fetched, so only the page 2 flush
    // and the final flush decide what is on disk.
    mount_page(&server, "/page/3/", listing_page(3, &["c"]), 1).await;
    mount_status(&server, "/movie/c/", 500, 1).await;
    mount_page(&server, "/movie/a/", detail_page("A"), 1).await;
    mount_page(&server, "/movie/b/", detail_page("B"), 1).await;

    let summary = run(config.clone()).await;

    assert_eq!(summary.checkpoint, 3);
    assert_eq!(stored_titles(&config), vec!["A", "B"]);
    assert!(!dir.path().join("movies.json.tmp").exists());
}

#[tokio::test]
async fn test_failed_discovery_keeps_saved_checkpoint() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), dir.path(), 10);

    let stored = r#"[{"title": "Heat", "poster_url": null, "download_links": {}, "streaming_embed": "No link found"}]"#;
    std::fs::write(&config.output.checkpoint_path, "500").unwrap();
    std::fs::write(&config.output.catalog_path, stored).unwrap();

    // Only discovery is attempted; page 1 is behind the checkpoint
    mount_status(&server, "/page/1/", 503, 1).await;

    let summary = run(config.clone()).await;

    assert_eq!(summary.total_pages, 1);
    assert_eq!(summary.pages_processed, 0);
    assert_eq!(summary.checkpoint, 500);
    assert_eq!(stored_checkpoint(&config), 500);
    assert_eq!(
        std::fs::read_to_string(&config.output.catalog_path).unwrap(),
        stored
    );
}

#[tokio::test]
async fn test_catalog_entries_without_embed_survive_a_run() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), dir.path(), 10);
    std::fs::write(
        &config.output.catalog_path,
        r#"[
  {"title": "Heat", "poster_url": null, "download_links": {}},
  {"title": "Ronin", "poster_url": null, "download_links": {}, "streaming_embed": "No link found"}
]"#,
    )
    .unwrap();

    mount_page(&server, "/page/1/", listing_page(1, &["a"]), 1).await;
    mount_page(&server, "/movie/a/", detail_page("A"), 1).await;

    let summary = run(config.clone()).await;

    assert_eq!(summary.items_captured, 1);
    assert_eq!(stored_titles(&config), vec!["Heat", "Ronin", "A"]);

    let content = std::fs::read_to_string(&config.output.catalog_path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(parsed[0]["streaming_embed"], "No link found");
}
