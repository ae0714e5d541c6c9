//! Retrieval against a mock server: access-path failover, partial batch
//! failure and changelog candidate fallback.

use merges_lib::{
    AccessPath, ChangelogSide, Classification, Fetcher, MergeRecord, MergesConfig, RetrievalError,
    normalize,
};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const HELLO_CHANGELOG: &str = "\
hello (1:2.10-3ubuntu1) noble; urgency=medium

  * Merge from Debian unstable. Remaining changes:
    - Keep the Ubuntu-specific greeting.

 -- Jane Doe <jane@example.com>  Mon, 01 Apr 2024 10:00:00 +0000

hello (1:2.10-2ubuntu1) mantic; urgency=medium

  * Previous merge.

 -- Jane Doe <jane@example.com>  Mon, 01 Jan 2024 10:00:00 +0000
";

fn config_for(server: &MockServer) -> MergesConfig {
    let uri = server.uri();
    MergesConfig::default()
        .with_report_base_url(&format!("{uri}/reports"))
        .expect("valid report URL")
        .with_changelog_base_urls(&format!("{uri}/ubuntu"), &format!("{uri}/debian"))
        .expect("valid changelog URLs")
}

fn hello_record() -> MergeRecord {
    normalize(
        &json!([["hello", "1:2.10-3ubuntu1", "2.10-3"]]),
        Classification::Main,
    )
    .remove(0)
}

#[tokio::test]
async fn proxy_is_used_when_direct_access_fails() {
    let server = MockServer::start().await;
    let target = format!("{}/reports/main.json", server.uri());

    Mock::given(method("GET"))
        .and(path("/reports/main.json"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/proxy"))
        .and(query_param("url", target.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([["via-proxy", "1.0", "1.1"]])))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server).with_proxies(vec![format!("{}/proxy?url=", server.uri())]);
    let fetcher = Fetcher::new(config).expect("fetcher");

    assert_eq!(fetcher.access_paths()[0], AccessPath::Direct);

    let records = fetcher
        .fetch_report(Classification::Main)
        .await
        .expect("proxy should serve the report");
    assert_eq!(records[0].name, "via-proxy");
}

#[tokio::test]
async fn failed_batches_do_not_hide_loaded_ones() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/reports/main.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "glibc": { "source_package": "glibc", "age": "3d", "teams": ["foundations"] }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/reports/multiverse.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([["unrar", "1.0", "1.1"]])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/reports/universe.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<!doctype html>"))
        .mount(&server)
        .await;

    let fetcher = Fetcher::new(config_for(&server)).expect("fetcher");
    let snapshot = fetcher.fetch_batches().await.expect("two batches load");

    let names: Vec<&str> = snapshot.records.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["glibc", "unrar"]);
    assert!(snapshot.is_partial());
    assert_eq!(
        snapshot.loaded(),
        vec![Classification::Main, Classification::Multiverse]
    );

    let failed: Vec<Classification> = snapshot.failures.iter().map(|(c, _)| *c).collect();
    assert_eq!(failed, vec![Classification::Universe, Classification::Restricted]);
}

#[tokio::test]
async fn every_batch_failing_is_an_error() {
    let server = MockServer::start().await;
    let fetcher = Fetcher::new(config_for(&server)).expect("fetcher");

    match fetcher.fetch_batches().await {
        Err(RetrievalError::AllBatchesFailed { failures }) => {
            assert_eq!(failures.len(), 4);
            assert!(failures.iter().all(|(_, e)| e.attempt_count() == 1));
        }
        other => panic!("expected AllBatchesFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn changelog_falls_back_past_error_pages_to_later_candidates() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ubuntu/main/h/hello/hello_1:2.10-3ubuntu1/changelog"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("<html><body>Not here</body></html>"),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ubuntu/main/h/hello/hello_2.10-3ubuntu1/changelog"))
        .respond_with(ResponseTemplate::new(200).set_body_string(HELLO_CHANGELOG))
        .mount(&server)
        .await;

    let fetcher = Fetcher::new(config_for(&server)).expect("fetcher");
    let entry = fetcher
        .fetch_changelog(&hello_record(), ChangelogSide::Primary)
        .await
        .expect("epoch-stripped candidate should succeed");

    assert!(entry.matched);
    assert!(entry.text.starts_with("hello (1:2.10-3ubuntu1) noble"));
    assert!(entry.text.contains("Keep the Ubuntu-specific greeting."));
    assert!(!entry.text.contains("Previous merge."));
    assert_eq!(entry.versions, vec!["1:2.10-3ubuntu1", "1:2.10-2ubuntu1"]);

    let requests = server.received_requests().await.expect("recording enabled");
    assert_eq!(requests.len(), 3);
}

#[tokio::test]
async fn changelog_pair_tolerates_one_failed_side() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ubuntu/main/h/hello/hello_1:2.10-3ubuntu1/changelog"))
        .respond_with(ResponseTemplate::new(200).set_body_string(HELLO_CHANGELOG))
        .mount(&server)
        .await;

    let fetcher = Fetcher::new(config_for(&server)).expect("fetcher");
    let pair = fetcher.fetch_changelog_pair(&hello_record()).await;

    let primary = pair.side(ChangelogSide::Primary).as_ref().expect("primary side");
    assert!(primary.text.starts_with("hello (1:2.10-3ubuntu1)"));

    let reference = pair
        .side(ChangelogSide::Reference)
        .as_ref()
        .expect_err("reference side has no mock");
    assert_eq!(
        reference.external_link(),
        Some("https://tracker.debian.org/pkg/hello")
    );
    assert_eq!(reference.attempt_count(), 1);
}

#[tokio::test]
async fn record_without_version_has_no_candidates() {
    let server = MockServer::start().await;
    let record = normalize(&json!([["hello", "2.10-3ubuntu1"]]), Classification::Main).remove(0);

    let fetcher = Fetcher::new(config_for(&server)).expect("fetcher");
    let error = fetcher
        .fetch_changelog(&record, ChangelogSide::Reference)
        .await
        .expect_err("no reference version");

    assert!(matches!(
        error,
        RetrievalError::ChangelogUnavailable { ref attempts, .. } if attempts.is_empty()
    ));
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn changelog_without_the_version_reports_a_fallback() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/debian/main/h/hello/hello_2.10-3_changelog"))
        .respond_with(ResponseTemplate::new(200).set_body_string(HELLO_CHANGELOG))
        .mount(&server)
        .await;

    let fetcher = Fetcher::new(config_for(&server)).expect("fetcher");
    let entry = fetcher
        .fetch_changelog(&hello_record(), ChangelogSide::Reference)
        .await
        .expect("changelog body is valid");

    assert!(entry.is_fallback());
    assert!(entry.text.starts_with("hello (1:2.10-3ubuntu1)"));
    assert_eq!(entry.versions.len(), 2);
}
