//! Mock Mailgun server and result archive fixtures

use mailgun_bulk_validate::{Config, MailgunClient, ValidationWorkflow};
use std::io::{Cursor, Write};
use std::time::Duration;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Matches `/v4/address/validate/bulk/<generated job name>`
pub const JOB_PATH_PATTERN: &str =
    r"^/v4/address/validate/bulk/validation_\d{8}_\d{4}_[a-z0-9]{6}$";

/// Path the mock serves the result archive from
pub const DOWNLOAD_PATH: &str = "/download/results.zip";

/// JSON results for the `a@x.com`, `B@x.com`, `a@x.com` scenario
pub const SCENARIO_JSON: &str = r#"[
  {"address": "a@x.com", "result": "deliverable", "risk": "low"},
  {"address": "B@x.com", "result": "deliverable", "risk": "medium"},
  {"address": "a@x.com", "result": "deliverable", "error": "duplicate address"}
]"#;

/// Same scenario as exported CSV, with capitalized headers
pub const SCENARIO_CSV: &str = "address,Result,Risk,Error\n\
a@x.com,Deliverable,Low,\n\
B@x.com,Deliverable,Medium,\n\
a@x.com,Deliverable,,duplicate address\n";

/// Build a zip archive holding the given members, in order
pub fn zip_archive(members: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in members {
        writer
            .start_file(*name, zip::write::FileOptions::default())
            .expect("start zip member");
        writer
            .write_all(content.as_bytes())
            .expect("write zip member");
    }
    writer.finish().expect("finish zip").into_inner()
}

/// Configuration pointing at the mock server with a fast polling cadence
pub fn mock_config(server: &MockServer, interval: Duration, timeout: Duration) -> Config {
    Config::new("key-integration")
        .expect("valid key")
        .with_api_base(&format!("{}/v4/", server.uri()))
        .expect("valid base url")
        .with_polling(interval, timeout)
}

/// Workflow over a real HTTP client talking to the mock server
pub fn mock_workflow(
    server: &MockServer,
    interval: Duration,
    timeout: Duration,
) -> ValidationWorkflow<MailgunClient> {
    ValidationWorkflow::<MailgunClient>::new(mock_config(server, interval, timeout))
        .expect("workflow")
}

/// Accept every upload with 202
pub async fn mount_accepting_upload(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path_regex(JOB_PATH_PATTERN))
        .respond_with(ResponseTemplate::new(202).set_body_string(r#"{"id":"job"}"#))
        .mount(server)
        .await;
}

/// Report the job as in progress for the first `times` status queries
pub async fn mount_in_progress(server: &MockServer, times: u64) {
    Mock::given(method("GET"))
        .and(path_regex(JOB_PATH_PATTERN))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(r#"{"status":"uploaded","quantity":3}"#),
        )
        .up_to_n_times(times)
        .mount(server)
        .await;
}

/// Report the job as finished with a download link of the given kind
pub async fn mount_ready(server: &MockServer, link_kind: &str) {
    let body = format!(
        r#"{{"status":"uploaded","download_url":{{"{}":"{}{}?sig=abc"}}}}"#,
        link_kind,
        server.uri(),
        DOWNLOAD_PATH
    );
    Mock::given(method("GET"))
        .and(path_regex(JOB_PATH_PATTERN))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

/// Serve the result archive
pub async fn mount_archive(server: &MockServer, archive: Vec<u8>) {
    Mock::given(method("GET"))
        .and(path(DOWNLOAD_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(archive))
        .mount(server)
        .await;
}
