// End-to-end tests for the per-site check and the batch runner, against a
// local mock server. No test here needs a browser: rendering is pinned
// unavailable, which the check must treat as a silent negative.

use std::sync::Arc;
use std::time::{Duration, Instant};

use linkback_checker::fetch::build_client;
use linkback_checker::{CheckRunner, Renderer, SiteStatus, TargetIdentity, check_site};
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TARGET: &str = "https://myblog.example";

fn target_identity(legacy: Option<&str>) -> TargetIdentity {
    let current = Url::parse(TARGET).unwrap();
    let legacy = legacy.map(|l| Url::parse(l).unwrap());
    TargetIdentity::from_urls(&current, legacy.as_ref()).unwrap()
}

async fn mount_homepage(server: &MockServer, body: &str) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html")
                .set_body_string(body),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_backlink_on_homepage() {
    let server = MockServer::start().await;
    mount_homepage(
        &server,
        r#"<html><body><a href="https://myblog.example/">back</a></body></html>"#,
    )
    .await;

    let url = Url::parse(&server.uri()).unwrap();
    let outcome = check_site(
        "Friend",
        &url,
        &target_identity(None),
        &build_client(),
        &Renderer::disabled(),
    )
    .await;

    assert_eq!(outcome.status, SiteStatus::Online);
    assert!(outcome.backlink_found);
    assert_eq!(outcome.backlink_location.as_deref(), Some("Homepage"));
    assert!(!outcome.legacy_match);
    assert!(outcome.html_snippet.unwrap().contains("back"));
    assert!(outcome.error.is_none());
}

#[tokio::test]
async fn test_legacy_backlink_on_homepage() {
    let server = MockServer::start().await;
    mount_homepage(
        &server,
        r#"<a href="https://oldblog.example/posts">old me</a>"#,
    )
    .await;

    let url = Url::parse(&server.uri()).unwrap();
    let outcome = check_site(
        "Friend",
        &url,
        &target_identity(Some("https://oldblog.example")),
        &build_client(),
        &Renderer::disabled(),
    )
    .await;

    assert!(outcome.backlink_found);
    assert!(outcome.legacy_match);
    assert_eq!(outcome.backlink_location.as_deref(), Some("Homepage (OLD)"));
}

#[tokio::test]
async fn test_backlink_on_friends_page_via_navigation_link() {
    let server = MockServer::start().await;
    mount_homepage(&server, r#"<nav><a href="/links">友链</a></nav>"#).await;
    Mock::given(method("GET"))
        .and(path("/links"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"<ul><li><a href="https://myblog.example/">me</a></li></ul>"#),
        )
        .mount(&server)
        .await;

    let url = Url::parse(&server.uri()).unwrap();
    let outcome = check_site(
        "Friend",
        &url,
        &target_identity(None),
        &build_client(),
        &Renderer::disabled(),
    )
    .await;

    assert_eq!(outcome.status, SiteStatus::Online);
    assert!(outcome.backlink_found);
    // The location is the resolved friends-page URL, with no rendered marker.
    let expected = format!("{}/links", server.uri());
    assert_eq!(outcome.backlink_location.as_deref(), Some(expected.as_str()));
    assert!(outcome.error.is_none());
}

#[tokio::test]
async fn test_unreachable_site_is_offline() {
    // Grab a free port, then close the listener so connections are refused.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let url = Url::parse(&format!("http://127.0.0.1:{port}/")).unwrap();
    let outcome = check_site(
        "Gone",
        &url,
        &target_identity(None),
        &build_client(),
        &Renderer::disabled(),
    )
    .await;

    assert_eq!(outcome.status, SiteStatus::Offline);
    assert!(!outcome.backlink_found);
    assert!(outcome.error.is_some());
    assert!(!outcome.error.unwrap().is_empty());
}

#[tokio::test]
async fn test_http_error_on_homepage() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let url = Url::parse(&server.uri()).unwrap();
    let outcome = check_site(
        "Missing",
        &url,
        &target_identity(None),
        &build_client(),
        &Renderer::disabled(),
    )
    .await;

    assert_eq!(outcome.status, SiteStatus::HttpError(404));
    assert_eq!(outcome.status.label(), "Error (404)");
    assert!(!outcome.backlink_found);
}

#[tokio::test]
async fn test_no_candidate_is_a_plain_negative() {
    let server = MockServer::start().await;
    mount_homepage(&server, r#"<a href="/about">about me</a>"#).await;
    // Every fallback probe hits the mock server's default 404.

    let url = Url::parse(&server.uri()).unwrap();
    let outcome = check_site(
        "Quiet",
        &url,
        &target_identity(None),
        &build_client(),
        &Renderer::disabled(),
    )
    .await;

    assert_eq!(outcome.status, SiteStatus::Online);
    assert!(!outcome.backlink_found);
    // Distinguished from the offline case by the absence of an error.
    assert!(outcome.error.is_none());
}

#[tokio::test]
async fn test_homepage_match_stops_the_cascade() {
    let server = MockServer::start().await;
    mount_homepage(
        &server,
        concat!(
            r#"<a href="https://myblog.example/">back</a>"#,
            r#"<a href="/links">friends</a>"#,
        ),
    )
    .await;
    // The friends page must never be fetched once the homepage matched.
    Mock::given(method("GET"))
        .and(path("/links"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let url = Url::parse(&server.uri()).unwrap();
    let outcome = check_site(
        "Friend",
        &url,
        &target_identity(None),
        &build_client(),
        &Renderer::disabled(),
    )
    .await;

    assert_eq!(outcome.backlink_location.as_deref(), Some("Homepage"));
}

#[tokio::test]
async fn test_navigation_link_suppresses_path_probing() {
    let server = MockServer::start().await;
    mount_homepage(&server, r#"<a href="/my-friends">friends</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/my-friends"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"<a href="https://myblog.example/">me</a>"#),
        )
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/link/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/links"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let url = Url::parse(&server.uri()).unwrap();
    let outcome = check_site(
        "Friend",
        &url,
        &target_identity(None),
        &build_client(),
        &Renderer::disabled(),
    )
    .await;

    assert!(outcome.backlink_found);
    assert!(
        outcome
            .backlink_location
            .unwrap()
            .ends_with("/my-friends")
    );
}

#[tokio::test]
async fn test_fallback_probing_finds_the_friends_page() {
    let server = MockServer::start().await;
    mount_homepage(&server, r#"<a href="/about">nothing to see</a>"#).await;
    // "/link/" misses (default 404), "/links" answers the probe and serves
    // the page.
    Mock::given(method("HEAD"))
        .and(path("/links"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/links"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"<a href="https://myblog.example/">me</a>"#),
        )
        .mount(&server)
        .await;

    let url = Url::parse(&server.uri()).unwrap();
    let outcome = check_site(
        "Friend",
        &url,
        &target_identity(None),
        &build_client(),
        &Renderer::disabled(),
    )
    .await;

    assert!(outcome.backlink_found);
    let expected = format!("{}/links", server.uri());
    assert_eq!(outcome.backlink_location.as_deref(), Some(expected.as_str()));
}

#[tokio::test]
async fn test_friends_page_error_is_recorded_but_site_stays_online() {
    let server = MockServer::start().await;
    mount_homepage(&server, r#"<a href="/links">links</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/links"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let url = Url::parse(&server.uri()).unwrap();
    let outcome = check_site(
        "Flaky",
        &url,
        &target_identity(None),
        &build_client(),
        &Renderer::disabled(),
    )
    .await;

    assert_eq!(outcome.status, SiteStatus::Online);
    assert!(!outcome.backlink_found);
    assert!(outcome.error.unwrap().contains("500"));
}

#[tokio::test]
async fn test_unavailable_renderer_stays_silent() {
    let server = MockServer::start().await;
    mount_homepage(&server, r#"<a href="/links">links</a>"#).await;
    // The friends page exists but its link widget would only render
    // client-side; the static scan finds nothing.
    Mock::given(method("GET"))
        .and(path("/links"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<div id=\"widget\"></div>"))
        .mount(&server)
        .await;

    let url = Url::parse(&server.uri()).unwrap();
    let outcome = check_site(
        "Scripted",
        &url,
        &target_identity(None),
        &build_client(),
        &Renderer::disabled(),
    )
    .await;

    assert_eq!(outcome.status, SiteStatus::Online);
    assert!(!outcome.backlink_found);
    // Rendering being unavailable never shows up as an error.
    assert!(outcome.error.is_none());
}

#[tokio::test]
async fn test_runner_produces_one_outcome_per_site() {
    let server = MockServer::start().await;
    mount_homepage(
        &server,
        r#"<a href="https://myblog.example/">back</a>"#,
    )
    .await;

    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let dead_port = listener.local_addr().unwrap().port();
    drop(listener);

    let sites = vec![
        ("alpha".to_string(), Url::parse(&server.uri()).unwrap()),
        ("beta".to_string(), Url::parse(&server.uri()).unwrap()),
        (
            "gamma".to_string(),
            Url::parse(&format!("http://127.0.0.1:{dead_port}/")).unwrap(),
        ),
        ("delta".to_string(), Url::parse(&server.uri()).unwrap()),
    ];

    let runner = CheckRunner::new(2);
    let outcomes = runner
        .run(sites, target_identity(None), Arc::new(Renderer::disabled()))
        .await;

    assert_eq!(outcomes.len(), 4);
    let mut names: Vec<&str> = outcomes.iter().map(|o| o.name.as_str()).collect();
    names.sort_unstable();
    assert_eq!(names, vec!["alpha", "beta", "delta", "gamma"]);

    // One failing site must not poison the others.
    let gamma = outcomes.iter().find(|o| o.name == "gamma").unwrap();
    assert_eq!(gamma.status, SiteStatus::Offline);
    let alpha = outcomes.iter().find(|o| o.name == "alpha").unwrap();
    assert!(alpha.backlink_found);
}

#[tokio::test]
async fn test_runner_respects_the_concurrency_limit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"<a href="https://myblog.example/">back</a>"#)
                .set_delay(Duration::from_millis(200)),
        )
        .mount(&server)
        .await;

    let sites: Vec<(String, Url)> = (0..4)
        .map(|i| (format!("site{i}"), Url::parse(&server.uri()).unwrap()))
        .collect();

    // With a limit of one the four checks cannot overlap, so the run takes
    // at least the sum of the response delays.
    let started = Instant::now();
    let outcomes = CheckRunner::new(1)
        .run(sites, target_identity(None), Arc::new(Renderer::disabled()))
        .await;
    let elapsed = started.elapsed();

    assert_eq!(outcomes.len(), 4);
    assert!(
        elapsed >= Duration::from_millis(800),
        "serialized checks finished too fast: {elapsed:?}"
    );
}

#[tokio::test]
async fn test_runner_progress_callback_fires_per_site() {
    let server = MockServer::start().await;
    mount_homepage(&server, "<p>nothing</p>").await;

    let sites = vec![
        ("one".to_string(), Url::parse(&server.uri()).unwrap()),
        ("two".to_string(), Url::parse(&server.uri()).unwrap()),
    ];

    let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
    let seen_clone = seen.clone();
    let runner = CheckRunner::new(2).with_progress_callback(Arc::new(move |name| {
        seen_clone.lock().unwrap().push(name);
    }));

    let outcomes = runner
        .run(sites, target_identity(None), Arc::new(Renderer::disabled()))
        .await;

    assert_eq!(outcomes.len(), 2);
    let mut seen = seen.lock().unwrap().clone();
    seen.sort_unstable();
    assert_eq!(seen, vec!["one", "two"]);
}
