//! Integration tests for the walker and downloader
//!
//! These tests use wiremock to create mock comic sites and test
//! the full walk, download and resume cycle end-to-end.

use comic_walker::crawler::{CrawlOutcome, Crawler, Scraper};
use comic_walker::download::Downloader;
use comic_walker::site::extract::{comic_image_attr, link_by_rel, resolve_href};
use comic_walker::site::{default_is_last_page, site_by_name, PageContent, SiteAdapter};
use comic_walker::state::{PageRecord, PageStore};
use comic_walker::storage::{PersistentCache, RunStatus, SqliteCache};
use reqwest::Client;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tracing::Span;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A comic served by the mock server: `/<n>/` pages linked with `rel="next"`
struct StubComic {
    base: String,
    never_last: Option<u32>,
    only_first_guessable: bool,
}

impl StubComic {
    fn new(base: &str) -> Self {
        Self {
            base: base.to_string(),
            never_last: None,
            only_first_guessable: false,
        }
    }

    /// A site whose page URLs are slugs: only page 1 can be guessed
    fn slugged(base: &str) -> Self {
        Self {
            only_first_guessable: true,
            ..Self::new(base)
        }
    }
}

impl SiteAdapter for StubComic {
    fn base_identity(&self) -> &str {
        "stub.example"
    }

    fn next_link_of(&self, page: PageContent<'_>, _number: u32) -> Option<String> {
        link_by_rel(page.document, "next").and_then(|href| resolve_href(href, page.url))
    }

    fn image_url_of(&self, page: PageContent<'_>, _number: u32) -> Option<String> {
        comic_image_attr(page.document, "src")
    }

    fn title_of(&self, page: PageContent<'_>, _number: u32) -> Option<String> {
        comic_image_attr(page.document, "title")
    }

    fn guessed_urls(&self, number: u32) -> Vec<String> {
        if self.only_first_guessable && number != 1 {
            return Vec::new();
        }
        vec![format!("{}/{}/", self.base, number)]
    }

    fn is_last_page(&self, record: &PageRecord) -> bool {
        Some(record.number) != self.never_last && default_is_last_page(record)
    }
}

/// Builds a comic page; `image` is the src attribute, `next` the next href
fn comic_page(image: &str, title: &str, next: Option<&str>) -> String {
    let next_link = next
        .map(|href| format!(r#"<a rel="next" href="{}">Next</a>"#, href))
        .unwrap_or_default();
    format!(
        r#"<html><head><title>Comic</title></head><body>
        <div id="comic"><img src="{}" title="{}"></div>
        {}
        </body></html>"#,
        image, title, next_link
    )
}

async fn mount_page(server: &MockServer, number: u32, body: String) {
    Mock::given(method("GET"))
        .and(path(format!("/{}/", number)))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

async fn mount_image(server: &MockServer, name: &str, bytes: &[u8]) {
    Mock::given(method("GET"))
        .and(path(format!("/img/{}", name)))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(bytes.to_vec()))
        .mount(server)
        .await;
}

/// Mounts a clean chain of pages 1 to 3, with images
async fn mount_three_page_comic(server: &MockServer) {
    let uri = server.uri();
    mount_page(server, 1, comic_page(&format!("{}/img/one.png", uri), "Title 1", Some("/2/"))).await;
    mount_page(server, 2, comic_page(&format!("{}/img/two.GIF", uri), "Title 2", Some("/3/"))).await;
    mount_page(server, 3, comic_page(&format!("{}/img/three.jpeg", uri), "Title 3", Some("/4/"))).await;
    mount_image(server, "one.png", b"one").await;
    mount_image(server, "two.GIF", b"two").await;
    mount_image(server, "three.jpeg", b"three").await;
}

fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .expect("Failed to read output directory")
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

async fn request_count(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .expect("Request recording is enabled")
        .len()
}

fn open_scraper(adapter: Arc<dyn SiteAdapter>, db_path: &Path, out_dir: &Path) -> Scraper<SqliteCache> {
    let cache = SqliteCache::open(db_path).expect("Failed to open cache");
    Scraper::new(adapter, cache, Client::new(), out_dir, 2).with_config_hash("integration")
}

#[tokio::test]
async fn test_crawl_clean_chain() {
    let server = MockServer::start().await;
    mount_three_page_comic(&server).await;

    let site = StubComic::new(&server.uri());
    let client = Client::new();
    let crawler = Crawler::new(&site, &client, Span::none());

    let mut store = PageStore::new();
    let report = crawler.crawl(1, Some(3), &mut store).await;

    assert_eq!(report.outcome, CrawlOutcome::StopReached);
    assert_eq!(report.last_page, Some(3));
    assert_eq!(store.len(), 3);
    for number in 1..=3 {
        let record = store.get(number).expect("Page should be stored");
        assert!(record.image_url.is_some(), "Page {} should have an image", number);
    }
    assert_eq!(store.get(2).unwrap().source_url, format!("{}/2/", server.uri()));
}

#[tokio::test]
async fn test_download_names_files_by_page() {
    let server = MockServer::start().await;
    mount_three_page_comic(&server).await;

    let site = StubComic::new(&server.uri());
    let client = Client::new();
    let mut store = PageStore::new();
    Crawler::new(&site, &client, Span::none())
        .crawl(1, Some(3), &mut store)
        .await;

    let tmp = TempDir::new().unwrap();
    let comic_dir = tmp.path().join("stub.example");
    let report = Downloader::new(client.clone(), &comic_dir, 2, Span::none())
        .download(1..=3, Arc::new(store))
        .await
        .expect("Download should succeed");

    assert_eq!(report.written, 3);
    assert_eq!(
        file_names(&comic_dir),
        vec![
            "000001__Title 1.png".to_string(),
            "000002__Title 2.GIF".to_string(),
            "000003__Title 3.jpeg".to_string(),
        ]
    );
    assert_eq!(std::fs::read(comic_dir.join("000003__Title 3.jpeg")).unwrap(), b"three");
}

#[tokio::test]
async fn test_download_skips_page_without_image() {
    let server = MockServer::start().await;
    let uri = server.uri();
    mount_page(&server, 1, comic_page(&format!("{}/img/one.png", uri), "One", Some("/2/"))).await;
    mount_page(&server, 2, comic_page("", "Two", Some("/3/"))).await;
    mount_page(&server, 3, comic_page(&format!("{}/img/three.png", uri), "Three", None)).await;
    mount_image(&server, "one.png", b"one").await;
    mount_image(&server, "three.png", b"three").await;

    let site = StubComic::new(&uri);
    let client = Client::new();
    let mut store = PageStore::new();
    Crawler::new(&site, &client, Span::none())
        .crawl(1, Some(3), &mut store)
        .await;
    assert!(store.get(2).unwrap().image_url.is_none());

    let tmp = TempDir::new().unwrap();
    let report = Downloader::new(client.clone(), tmp.path(), 2, Span::none())
        .download(1..=3, Arc::new(store))
        .await
        .expect("Skipping is not a failure");

    assert_eq!(report.written, 2);
    assert_eq!(report.skipped, 1);
    assert_eq!(
        file_names(tmp.path()),
        vec!["000001__One.png".to_string(), "000003__Three.png".to_string()]
    );
}

#[tokio::test]
async fn test_last_page_override_keeps_walking() {
    let server = MockServer::start().await;
    let uri = server.uri();
    mount_page(&server, 5, comic_page(&format!("{}/img/5.png", uri), "Five", Some("/6/"))).await;
    // Page 6 links nowhere; page 7 is only reachable by guessing
    mount_page(&server, 6, comic_page(&format!("{}/img/6.png", uri), "Six", None)).await;
    mount_page(&server, 7, comic_page(&format!("{}/img/7.png", uri), "Seven", None)).await;

    let mut site = StubComic::new(&uri);
    site.never_last = Some(6);
    let client = Client::new();

    let mut store = PageStore::new();
    let report = Crawler::new(&site, &client, Span::none())
        .crawl(5, None, &mut store)
        .await;

    assert_eq!(report.outcome, CrawlOutcome::LastPage(7));
    assert_eq!(report.fetched, 3);
    assert!(!store.get(6).unwrap().status.is_terminal());
    assert!(store.get(7).unwrap().status.is_terminal());
}

#[tokio::test]
async fn test_default_rule_stops_at_page_without_next_link() {
    let server = MockServer::start().await;
    let uri = server.uri();
    mount_page(&server, 1, comic_page(&format!("{}/img/1.png", uri), "One", None)).await;
    Mock::given(method("GET"))
        .and(path("/2/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let site = StubComic::new(&uri);
    let client = Client::new();
    let mut store = PageStore::new();
    let report = Crawler::new(&site, &client, Span::none())
        .crawl(1, None, &mut store)
        .await;

    assert_eq!(report.outcome, CrawlOutcome::LastPage(1));
}

#[tokio::test]
async fn test_previous_next_link_beats_guess() {
    let server = MockServer::start().await;
    let uri = server.uri();
    Mock::given(method("GET"))
        .and(path("/custom-two"))
        .respond_with(ResponseTemplate::new(200).set_body_string(comic_page(
            &format!("{}/img/2.png", uri),
            "Two",
            None,
        )))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/2/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let site = StubComic::new(&uri);
    let client = Client::new();
    let mut store: PageStore = std::iter::once(PageRecord::new(
        1,
        format!("{}/1/", uri),
        Some(format!("{}/custom-two", uri)),
        Some(format!("{}/img/1.png", uri)),
        Some("One".to_string()),
    ))
    .collect();

    let report = Crawler::new(&site, &client, Span::none())
        .crawl(2, Some(2), &mut store)
        .await;

    assert_eq!(report.last_page, Some(2));
    assert_eq!(store.get(2).unwrap().source_url, format!("{}/custom-two", uri));
}

#[tokio::test]
async fn test_second_scrape_makes_no_requests() {
    let server = MockServer::start().await;
    mount_three_page_comic(&server).await;

    let tmp = TempDir::new().unwrap();
    let db_path = tmp.path().join("walker.db");
    let out_dir = tmp.path().join("comics");

    {
        let mut scraper = open_scraper(Arc::new(StubComic::new(&server.uri())), &db_path, &out_dir);
        let report = scraper.scrape(1, Some(3), None).await.expect("First scrape");
        assert_eq!(report.status, RunStatus::Completed);
        assert_eq!(report.download.written, 3);
    }
    let after_first = request_count(&server).await;
    assert_eq!(after_first, 6);

    let mut scraper = open_scraper(Arc::new(StubComic::new(&server.uri())), &db_path, &out_dir);
    let report = scraper.scrape(1, Some(3), None).await.expect("Second scrape");

    assert_eq!(request_count(&server).await, after_first);
    assert_eq!(report.crawl.fetched, 0);
    assert_eq!(report.crawl.skipped, 3);
    assert_eq!(report.download.already_present, 3);
    assert_eq!(report.download.written, 0);
}

#[tokio::test]
async fn test_resume_after_halt() {
    let server = MockServer::start().await;
    let uri = server.uri();
    mount_page(&server, 1, comic_page(&format!("{}/img/one.png", uri), "One", Some("/2/"))).await;
    mount_image(&server, "one.png", b"one").await;
    Mock::given(method("GET"))
        .and(path("/2/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let tmp = TempDir::new().unwrap();
    let db_path = tmp.path().join("walker.db");
    let out_dir = tmp.path().join("comics");

    {
        let mut scraper = open_scraper(Arc::new(StubComic::new(&uri)), &db_path, &out_dir);
        let report = scraper.scrape(1, None, None).await.expect("Halting is not an error");

        assert_eq!(report.status, RunStatus::Halted);
        assert_eq!(report.crawl.halted_at(), Some(2));
        assert_eq!(report.download.written, 1);

        let run = scraper.cache().latest_run("stub.example").unwrap().unwrap();
        assert_eq!(run.halted_at, Some(2));
        assert_eq!(run.last_page, Some(1));
    }

    server.reset().await;
    mount_three_page_comic(&server).await;

    let mut scraper = open_scraper(Arc::new(StubComic::new(&uri)), &db_path, &out_dir);
    let report = scraper.scrape(1, Some(3), None).await.expect("Resumed scrape");

    assert_eq!(report.status, RunStatus::Completed);
    assert_eq!(report.crawl.skipped, 1);
    assert_eq!(report.crawl.fetched, 2);
    assert_eq!(report.download.already_present, 1);
    assert_eq!(report.download.written, 2);

    let requested: Vec<String> = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|request| request.url.path().to_string())
        .collect();
    assert!(!requested.contains(&"/1/".to_string()));
    assert!(!requested.contains(&"/img/one.png".to_string()));
}

#[tokio::test]
async fn test_reset_leaves_other_comics_alone() {
    let server = MockServer::start().await;
    mount_three_page_comic(&server).await;

    let tmp = TempDir::new().unwrap();
    let db_path = tmp.path().join("walker.db");
    let out_dir = tmp.path().join("comics");

    {
        let mut cache = SqliteCache::open(&db_path).unwrap();
        let xkcd: PageStore =
            std::iter::once(PageRecord::new(1, "http://xkcd.com/1", None, None, None)).collect();
        cache.save("xkcd.com", &xkcd).unwrap();
    }

    let mut scraper = open_scraper(Arc::new(StubComic::new(&server.uri())), &db_path, &out_dir);
    scraper.scrape(1, Some(3), None).await.unwrap();
    scraper.reset().unwrap();

    let stub = scraper.cache().load("stub.example").unwrap().unwrap();
    assert!(stub.is_empty());
    let xkcd = scraper.cache().load("xkcd.com").unwrap().unwrap();
    assert_eq!(xkcd.len(), 1);

    // Registered sites keep their own identities
    assert_eq!(site_by_name("xkcd").unwrap().base_identity(), "xkcd.com");
}

#[tokio::test]
async fn test_unbounded_scrape_finds_page_published_after_last_run() {
    let server = MockServer::start().await;
    let uri = server.uri();
    mount_page(&server, 1, comic_page(&format!("{}/img/one.png", uri), "One", Some("/2/"))).await;
    mount_page(&server, 2, comic_page(&format!("{}/img/two.png", uri), "Two", None)).await;
    mount_image(&server, "one.png", b"one").await;
    mount_image(&server, "two.png", b"two").await;

    let tmp = TempDir::new().unwrap();
    let db_path = tmp.path().join("walker.db");
    let out_dir = tmp.path().join("comics");

    {
        let mut scraper = open_scraper(Arc::new(StubComic::slugged(&uri)), &db_path, &out_dir);
        let report = scraper.scrape(1, None, None).await.expect("First scrape");
        assert_eq!(report.crawl.outcome, CrawlOutcome::LastPage(2));
    }

    // Page 3 is published and page 2 now links to it
    server.reset().await;
    mount_page(&server, 1, comic_page(&format!("{}/img/one.png", uri), "One", Some("/2/"))).await;
    mount_page(&server, 2, comic_page(&format!("{}/img/two.png", uri), "Two", Some("/3/"))).await;
    mount_page(&server, 3, comic_page(&format!("{}/img/three.png", uri), "Three", None)).await;
    mount_image(&server, "three.png", b"three").await;

    let mut scraper = open_scraper(Arc::new(StubComic::slugged(&uri)), &db_path, &out_dir);
    let report = scraper.scrape(1, None, None).await.expect("Second scrape");

    assert_eq!(report.crawl.outcome, CrawlOutcome::LastPage(3));
    assert_eq!(report.crawl.skipped, 1);
    assert_eq!(report.crawl.fetched, 2);
    assert_eq!(report.download.written, 1);
    assert_eq!(report.download.already_present, 2);

    let requested: Vec<String> = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|request| request.url.path().to_string())
        .collect();
    assert!(!requested.contains(&"/1/".to_string()));
    assert!(requested.contains(&"/3/".to_string()));

    let stored = scraper.cache().load("stub.example").unwrap().unwrap();
    assert!(!stored.get(2).unwrap().status.is_terminal());
    assert!(stored.get(3).unwrap().status.is_terminal());
}
