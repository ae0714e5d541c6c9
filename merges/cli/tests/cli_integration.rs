//! Integration tests for the merges CLI.
//!
//! Report fetching runs against a wiremock server passed in through
//! `--report-base-url`.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn merges_cmd() -> Command {
    let mut cmd = Command::cargo_bin("merges").unwrap();
    for key in [
        "MERGES_REPORT_BASE_URL",
        "MERGES_UBUNTU_CHANGELOG_BASE_URL",
        "MERGES_DEBIAN_CHANGELOG_BASE_URL",
        "MERGES_PROXIES",
        "MERGES_TIMEOUT_SECS",
        "RUST_LOG",
        "FORCE_COLOR",
        "CLICOLOR_FORCE",
    ] {
        cmd.env_remove(key);
    }
    cmd
}

async fn report_server() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/main.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "source_package": "glibc",
                "left_version": "2.39-0ubuntu8",
                "right_version": "2.39-3",
                "teams": ["foundations"],
                "age": "12d",
                "uploader": "Jane Doe"
            },
            {
                "source_package": "libpng1.6",
                "left_version": "1.6.43-5ubuntu1",
                "right_version": "1.6.44-1",
                "teams": ["desktop"],
                "age": "2w"
            }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/universe.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "hello": ["hello", "2.10-3ubuntu1", "2.10-3"]
        })))
        .mount(&server)
        .await;

    server
}

/// Points both changelog bases at `server`.
fn with_changelog_bases(cmd: &mut Command, server: &MockServer) {
    cmd.env("MERGES_UBUNTU_CHANGELOG_BASE_URL", format!("{}/ubuntu", server.uri()))
        .env("MERGES_DEBIAN_CHANGELOG_BASE_URL", format!("{}/debian", server.uri()));
}

const UBUNTU_HELLO: &str = "\
hello (2.10-3ubuntu1) noble; urgency=medium

  * Merge from Debian unstable. Remaining changes:
    - Keep the Ubuntu greeting.

 -- Jane Doe <jane@example.com>  Mon, 01 Apr 2024 10:00:00 +0000
";

const DEBIAN_HELLO: &str = "\
hello (2.10-4) unstable; urgency=medium

  * New upstream translations.

 -- John Roe <john@example.com>  Tue, 02 Apr 2024 09:00:00 +0000

hello (2.10-2) unstable; urgency=low

  * Older packaging fixes.

 -- John Roe <john@example.com>  Sat, 30 Mar 2024 09:00:00 +0000
";

#[test]
fn cli_shows_help() {
    merges_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Browse pending Ubuntu package merges"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("teams"))
        .stdout(predicate::str::contains("changelog"));
}

#[test]
fn cli_shows_version() {
    merges_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("merges 0.1.0"));
}

#[test]
fn cli_rejects_unknown_classification() {
    merges_cmd()
        .args(["list", "-c", "partner"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn cli_rejects_unknown_sort_key() {
    merges_cmd()
        .args(["list", "--sort", "size"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[tokio::test(flavor = "multi_thread")]
async fn list_outputs_json_filtered_by_pattern() {
    let server = report_server().await;

    merges_cmd()
        .args(["list", "lib*", "--json", "--report-base-url", &server.uri()])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"name\": \"libpng1.6\""))
        .stdout(predicate::str::contains("\"ageDays\": 14"))
        .stdout(predicate::str::contains("glibc").not())
        .stderr(predicate::str::contains("RESTRICTED report unavailable"));
}

#[tokio::test(flavor = "multi_thread")]
async fn list_renders_a_table() {
    let server = report_server().await;

    merges_cmd()
        .args(["list", "-c", "universe", "--report-base-url", &server.uri()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Package"))
        .stdout(predicate::str::contains("hello"))
        .stdout(predicate::str::contains("UNIVERSE"))
        .stdout(predicate::str::contains("glibc").not());
}

#[tokio::test(flavor = "multi_thread")]
async fn teams_counts_records() {
    let server = report_server().await;

    merges_cmd()
        .args(["teams", "--json", "--report-base-url", &server.uri()])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"team\": \"desktop\""))
        .stdout(predicate::str::contains("\"team\": \"foundations\""));
}

#[tokio::test(flavor = "multi_thread")]
async fn unreachable_reports_exit_with_error() {
    let server = MockServer::start().await;

    merges_cmd()
        .args(["list", "--report-base-url", &server.uri()])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("no merge report could be loaded"));
}

#[tokio::test(flavor = "multi_thread")]
async fn changelog_for_unknown_package_fails() {
    let server = report_server().await;

    merges_cmd()
        .args(["changelog", "nonexistent", "--report-base-url", &server.uri()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("'nonexistent' is not in the loaded merge reports"));
}

#[tokio::test(flavor = "multi_thread")]
async fn changelog_prints_both_entries_and_flags_a_fallback() {
    let server = report_server().await;
    Mock::given(method("GET"))
        .and(path("/ubuntu/universe/h/hello/hello_2.10-3ubuntu1/changelog"))
        .respond_with(ResponseTemplate::new(200).set_body_string(UBUNTU_HELLO))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/debian/main/h/hello/hello_2.10-3_changelog"))
        .respond_with(ResponseTemplate::new(200).set_body_string(DEBIAN_HELLO))
        .mount(&server)
        .await;

    let mut cmd = merges_cmd();
    with_changelog_bases(&mut cmd, &server);
    cmd.args(["changelog", "hello", "--report-base-url", &server.uri()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Ubuntu hello (2.10-3ubuntu1)"))
        .stdout(predicate::str::contains("Keep the Ubuntu greeting."))
        .stdout(predicate::str::contains("Debian hello (2.10-3)"))
        .stdout(predicate::str::contains(
            "No entry for 2.10-3; showing the latest entry instead.",
        ))
        .stdout(predicate::str::contains("Versions in this changelog: 2.10-4, 2.10-2"))
        .stdout(predicate::str::contains("New upstream translations."))
        .stdout(predicate::str::contains("Older packaging fixes.").not())
        .stdout(predicate::str::contains("\u{1b}[").not());
}

#[tokio::test(flavor = "multi_thread")]
async fn changelog_shows_links_when_unavailable() {
    let server = report_server().await;

    let mut cmd = merges_cmd();
    with_changelog_bases(&mut cmd, &server);
    cmd.args(["changelog", "hello", "--report-base-url", &server.uri()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Changelog unavailable."))
        .stdout(predicate::str::contains(
            "View it at https://launchpad.net/ubuntu/+source/hello/2.10-3ubuntu1",
        ))
        .stdout(predicate::str::contains(
            "View it at https://tracker.debian.org/pkg/hello",
        ));
}

#[tokio::test(flavor = "multi_thread")]
async fn changelog_side_limits_output() {
    let server = report_server().await;
    Mock::given(method("GET"))
        .and(path("/ubuntu/universe/h/hello/hello_2.10-3ubuntu1/changelog"))
        .respond_with(ResponseTemplate::new(200).set_body_string(UBUNTU_HELLO))
        .mount(&server)
        .await;

    let mut cmd = merges_cmd();
    with_changelog_bases(&mut cmd, &server);
    cmd.args([
        "changelog",
        "hello",
        "--side",
        "primary",
        "--report-base-url",
        &server.uri(),
    ])
    .assert()
    .success()
    .stdout(predicate::str::contains("Keep the Ubuntu greeting."))
    .stdout(predicate::str::contains("No entry for").not())
    .stdout(predicate::str::contains("Debian hello").not());
}
