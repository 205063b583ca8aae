//! Integration tests for the fetch → filter → render pipeline.
//!
//! Each test starts its own mock feed server, so the HTTP source, the
//! parser, the keyword filter and the print-mode renderers are exercised
//! together exactly as the binary uses them.

use feedsift::feed::{FeedEntry, FeedSource, FetchError, HttpFeedSource};
use feedsift::filter::{fetch_filtered, filter_feed, highlight, KeywordSet, MatchMode};
use feedsift::render::{paginate, render_json, render_markdown, DisplayMode, RenderOptions, Report};
use pretty_assertions::assert_eq;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss xmlns:dc="http://purl.org/dc/elements/1.1/" version="2.0">
  <channel>
    <title>astro-ph.GA updates on arXiv.org</title>
    <link>http://rss.arxiv.org/rss/astro-ph.GA</link>
    <description>astro-ph.GA updates</description>
    <item>
      <title>Metallicity in a dwarf galaxy</title>
      <link>https://arxiv.org/abs/2401.00001</link>
      <description>&lt;p&gt;We study the gas-phase metallicity.&lt;/p&gt;</description>
      <dc:creator>Cecilia Payne, Henrietta Leavitt</dc:creator>
    </item>
    <item>
      <title>Black hole binaries</title>
      <link>https://arxiv.org/abs/2401.00002</link>
      <description>AGN feedback regulates star formation.</description>
      <dc:creator>Vera Rubin</dc:creator>
    </item>
    <item>
      <title>MAGNETAR flares in the Galactic centre</title>
      <link>https://arxiv.org/abs/2401.00003</link>
      <description>Bursts from a young neutron star.</description>
    </item>
  </channel>
</rss>"#;

async fn feed_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rss/astro-ph.GA"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(FEED)
                .insert_header("Content-Type", "application/rss+xml"),
        )
        .mount(&server)
        .await;
    server
}

fn source() -> HttpFeedSource {
    HttpFeedSource::new(reqwest::Client::new()).with_backoff_base(Duration::from_millis(1))
}

fn titles(entries: &[FeedEntry]) -> Vec<&str> {
    entries.iter().map(|e| e.title.as_str()).collect()
}

// ============================================================================
// Fetch and filter
// ============================================================================

#[tokio::test]
async fn test_any_keeps_entries_matching_either_keyword() {
    let server = feed_server().await;
    let url = format!("{}/rss/astro-ph.GA", server.uri());
    let keywords = KeywordSet::parse("galaxy, AGN");

    let feed = fetch_filtered(&source(), &url, &keywords, MatchMode::Any).await.unwrap();
    assert_eq!(feed.fetched, 3);
    assert_eq!(titles(&feed.entries), ["Metallicity in a dwarf galaxy", "Black hole binaries"]);
}

#[tokio::test]
async fn test_all_requires_every_keyword() {
    let server = feed_server().await;
    let url = format!("{}/rss/astro-ph.GA", server.uri());
    let keywords = KeywordSet::parse("galaxy, AGN");

    let feed = fetch_filtered(&source(), &url, &keywords, MatchMode::All).await.unwrap();
    assert_eq!(feed.fetched, 3);
    assert!(feed.entries.is_empty());
}

#[tokio::test]
async fn test_whole_word_matching_through_fetch() {
    let server = feed_server().await;
    let url = format!("{}/rss/astro-ph.GA", server.uri());

    // "AGN" hides inside "MAGNETAR" but must not match it
    let feed = fetch_filtered(&source(), &url, &KeywordSet::parse("agn"), MatchMode::Any)
        .await
        .unwrap();
    assert_eq!(titles(&feed.entries), ["Black hole binaries"]);

    let feed = fetch_filtered(&source(), &url, &KeywordSet::parse("magnetar"), MatchMode::Any)
        .await
        .unwrap();
    assert_eq!(titles(&feed.entries), ["MAGNETAR flares in the Galactic centre"]);
}

#[tokio::test]
async fn test_unreachable_feed_is_an_error_not_an_empty_result() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let url = format!("{}/rss/astro-ph.XX", server.uri());
    let result = fetch_filtered(&source(), &url, &KeywordSet::parse("galaxy"), MatchMode::Any).await;
    assert!(matches!(result, Err(FetchError::HttpStatus(404))));
}

#[tokio::test]
async fn test_malformed_feed_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><body>Maintenance</body>"))
        .mount(&server)
        .await;

    let result = fetch_filtered(
        &source(),
        &format!("{}/rss", server.uri()),
        &KeywordSet::parse("galaxy"),
        MatchMode::Any,
    )
    .await;
    assert!(matches!(result, Err(FetchError::Parse(_))));
}

#[tokio::test]
async fn test_authors_and_summary_survive_parsing() {
    let server = feed_server().await;
    let entries = source()
        .fetch(&format!("{}/rss/astro-ph.GA", server.uri()))
        .await
        .unwrap();
    assert_eq!(entries[0].authors, ["Cecilia Payne", "Henrietta Leavitt"]);
    assert_eq!(entries[0].summary, "<p>We study the gas-phase metallicity.</p>");
    assert_eq!(entries[2].authors, Vec::<String>::new());
}

// ============================================================================
// End to end, in memory
// ============================================================================

#[test]
fn test_galaxies_is_not_a_whole_word_match_for_galaxy() {
    let entries = vec![
        FeedEntry::new("Metallicity in dwarf galaxies", "We study...", "https://arxiv.org/abs/1"),
        FeedEntry::new("Black hole binaries", "AGN feedback...", "https://arxiv.org/abs/2"),
    ];
    let keywords = KeywordSet::from_keywords(["galaxy", "AGN"]);

    assert_eq!(titles(&filter_feed(&entries, &keywords, MatchMode::Any)), ["Black hole binaries"]);
    assert!(filter_feed(&entries, &keywords, MatchMode::All).is_empty());
}

#[test]
fn test_highlighting_is_idempotent_and_keeps_casing() {
    let keywords = KeywordSet::parse("agn");
    let once = highlight("Agn and AGN, not MAGNETAR", &keywords, "red");
    assert_eq!(
        once,
        "<span style=\"color:red; font-weight:bold;\">Agn</span> and \
         <span style=\"color:red; font-weight:bold;\">AGN</span>, not MAGNETAR"
    );
    assert_eq!(highlight(&once, &keywords, "red"), once);
}

// ============================================================================
// Rendering fetched results
// ============================================================================

#[tokio::test]
async fn test_markdown_document_from_fetched_feed() {
    let server = feed_server().await;
    let url = format!("{}/rss/astro-ph.GA", server.uri());
    let keywords = KeywordSet::parse("galaxy, AGN");
    let feed = fetch_filtered(&source(), &url, &keywords, MatchMode::Any).await.unwrap();

    let report = Report {
        keywords: &keywords,
        mode: MatchMode::Any,
        fetched: feed.fetched,
        page: paginate(&feed.entries, 10, 1).unwrap(),
    };
    let options = RenderOptions {
        display: DisplayMode::Full,
        ..RenderOptions::default()
    };
    let md = render_markdown(&report, &options);

    assert!(md.starts_with("## Keywords\n\ngalaxy, AGN\n\n## Filtered Articles\n\n"));
    assert!(md.contains("*2 of 3 entries matched (ANY (OR)). Page 1 of 1.*"));
    assert!(md.contains(
        "### [Metallicity in a dwarf <span style=\"color:red; font-weight:bold;\">galaxy</span>](https://arxiv.org/abs/2401.00001)"
    ));
    assert!(md.contains("*Cecilia Payne, Henrietta Leavitt*"));
    // Summary markup is stripped before highlighting
    assert!(md.contains("We study the gas-phase metallicity."));
    assert!(!md.contains("<p>"));
    assert!(md.contains("<span style=\"color:red; font-weight:bold;\">AGN</span> feedback regulates"));
    assert_eq!(md.matches("---").count(), 2);
}

#[tokio::test]
async fn test_no_matches_document() {
    let server = feed_server().await;
    let url = format!("{}/rss/astro-ph.GA", server.uri());
    let keywords = KeywordSet::parse("exoplanet");
    let feed = fetch_filtered(&source(), &url, &keywords, MatchMode::Any).await.unwrap();

    let report = Report {
        keywords: &keywords,
        mode: MatchMode::Any,
        fetched: feed.fetched,
        page: paginate(&feed.entries, 10, 1).unwrap(),
    };
    let md = render_markdown(&report, &RenderOptions::default());
    assert!(md.ends_with("No articles matched the specified keywords.\n"));
}

#[tokio::test]
async fn test_json_second_page() {
    let server = feed_server().await;
    let url = format!("{}/rss/astro-ph.GA", server.uri());
    let keywords = KeywordSet::parse("galaxy, AGN, magnetar");
    let feed = fetch_filtered(&source(), &url, &keywords, MatchMode::Any).await.unwrap();
    assert_eq!(feed.entries.len(), 3);

    let report = Report {
        keywords: &keywords,
        mode: MatchMode::Any,
        fetched: feed.fetched,
        page: paginate(&feed.entries, 2, 2).unwrap(),
    };
    let json = render_json(&report, &RenderOptions::default()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["matched"], 3);
    assert_eq!(value["total_pages"], 2);
    assert_eq!(value["entries"].as_array().map(Vec::len), Some(1));
    assert_eq!(value["entries"][0]["title"], "MAGNETAR flares in the Galactic centre");
    assert_eq!(value["entries"][0]["summary"], "Bursts from a young neutron star.");
}
