use std::collections::BTreeMap;

use linkback_core::config::LinkEntry;
use linkback_core::run::{CheckOptions, execute_checks};
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn entry(url: &str) -> LinkEntry {
    LinkEntry {
        link: Url::parse(url).unwrap(),
        avatar: String::new(),
        description: String::new(),
    }
}

#[tokio::test]
async fn test_execute_checks_returns_outcomes_sorted_by_name() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"<a href="https://myblog.example/">back</a>"#),
        )
        .mount(&server)
        .await;

    let mut links = BTreeMap::new();
    links.insert("zeta".to_string(), entry(&server.uri()));
    links.insert("alpha".to_string(), entry(&server.uri()));
    links.insert("mid".to_string(), entry(&server.uri()));

    let outcomes = execute_checks(CheckOptions {
        links,
        target_url: Url::parse("https://myblog.example").unwrap(),
        legacy_url: None,
        concurrency: 2,
        show_progress: false,
    })
    .await
    .unwrap();

    let names: Vec<&str> = outcomes.iter().map(|o| o.name.as_str()).collect();
    assert_eq!(names, vec!["alpha", "mid", "zeta"]);
    assert!(outcomes.iter().all(|o| o.backlink_found));
}

#[tokio::test]
async fn test_execute_checks_rejects_a_hostless_target() {
    let mut links = BTreeMap::new();
    links.insert("alpha".to_string(), entry("https://alpha.example/"));

    let result = execute_checks(CheckOptions {
        links,
        target_url: Url::parse("mailto:me@example.com").unwrap(),
        legacy_url: None,
        concurrency: 2,
        show_progress: false,
    })
    .await;

    assert!(result.is_err());
}
