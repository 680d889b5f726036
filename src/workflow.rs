//! End-to-end validation run
//!
//! Stages run strictly in sequence, each consuming the previous one's output:
//! submit → poll → fetch → classify. Any failure aborts the run before the
//! output file is touched; the remote job is left as it is.

use crate::classifier::{ValidationSummary, classify, write_output};
use crate::client::{MailgunClient, ValidationService};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::fetcher::fetch_results;
use crate::input::read_addresses;
use crate::poller::{PollState, StatusPoller};
use crate::submitter::submit_job;
use crate::types::{EmailAddress, JobName};
use std::path::Path;
use tracing::info;

/// Runs one bulk validation job from input list to output file
pub struct ValidationWorkflow<S = MailgunClient> {
    config: Config,
    service: S,
}

impl ValidationWorkflow<MailgunClient> {
    /// Create a workflow talking to the Mailgun API
    ///
    /// # Errors
    /// Returns [`Error::Config`] if the API key is missing or a placeholder.
    pub fn new(config: Config) -> Result<Self> {
        let service = MailgunClient::new(&config)?;
        Self::with_service(config, service)
    }
}

impl<S> ValidationWorkflow<S>
where
    S: ValidationService,
{
    /// Create a workflow over any [`ValidationService`]
    pub fn with_service(config: Config, service: S) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, service })
    }

    /// Validate the addresses in `input_file` and write deliverable ones to `output_file`
    pub async fn run(&self, input_file: &Path, output_file: &Path) -> Result<ValidationSummary> {
        let addresses = read_addresses(input_file).await?;
        self.validate(&addresses, output_file).await
    }

    /// Validate an in-memory address list under a freshly generated job name
    pub async fn validate(
        &self,
        addresses: &[EmailAddress],
        output_file: &Path,
    ) -> Result<ValidationSummary> {
        self.validate_as(&JobName::generate(), addresses, output_file)
            .await
    }

    /// Validate an address list under an explicit job name
    pub async fn validate_as(
        &self,
        job: &JobName,
        addresses: &[EmailAddress],
        output_file: &Path,
    ) -> Result<ValidationSummary> {
        info!("Uploading file to Mailgun API...");
        submit_job(&self.service, job, addresses).await?;

        info!(
            "Waiting for validation to complete... (This may take a few minutes depending on list size)"
        );
        let report = StatusPoller::from_config(&self.service, &self.config)
            .run(job)
            .await?;

        let download = match report.state {
            PollState::Ready(download) => download,
            PollState::Failed(reason) => {
                return Err(Error::JobFailed {
                    job: job.to_string(),
                    reason,
                });
            }
            PollState::TimedOut | PollState::Polling => {
                return Err(Error::Timeout {
                    job: job.to_string(),
                    elapsed: report.elapsed,
                });
            }
        };

        let results = fetch_results(&self.service, &download)
            .await?
            .ok_or_else(|| Error::NoResults("no result file in download".to_string()))?;
        if results.rows.is_empty() {
            return Err(Error::NoResults(format!(
                "{} contains no result rows",
                results.member
            )));
        }

        info!("Extracting valid emails...");
        let summary = classify(&results.rows, addresses);
        write_output(output_file, &summary).await?;
        Ok(summary)
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{BulkStatus, DownloadUrls};
    use crate::config::PLACEHOLDER_API_KEY;
    use crate::input::parse_addresses;
    use async_trait::async_trait;
    use std::io::{Cursor, Write};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;
    use tempfile::TempDir;

    /// In-memory service: accepts uploads and serves a fixed status and archive
    struct FakeService {
        status: BulkStatus,
        archive: Option<Vec<u8>>,
        uploads: AtomicU32,
    }

    #[async_trait]
    impl ValidationService for FakeService {
        async fn submit(&self, _job: &JobName, _document: Vec<u8>) -> Result<()> {
            self.uploads.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn status(&self, _job: &JobName) -> Result<BulkStatus> {
            Ok(self.status.clone())
        }

        async fn download(&self, _url: &str) -> Result<Option<Vec<u8>>> {
            Ok(self.archive.clone())
        }
    }

    fn test_config() -> Config {
        Config::new("key-test")
            .unwrap()
            .with_polling(Duration::from_millis(5), Duration::from_millis(40))
    }

    fn json_archive(body: &str) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("results.json", zip::write::FileOptions::default())
            .unwrap();
        writer.write_all(body.as_bytes()).unwrap();
        writer.finish().unwrap().into_inner()
    }

    fn ready_status() -> BulkStatus {
        BulkStatus {
            status: Some("uploaded".to_string()),
            download_url: Some(DownloadUrls {
                csv: None,
                json: Some("https://dl.example.com/results.json.zip".to_string()),
            }),
            error: None,
        }
    }

    #[test]
    fn test_placeholder_key_rejected_at_construction() {
        let mut config = test_config();
        config.api_key = PLACEHOLDER_API_KEY.to_string();
        let service = FakeService {
            status: ready_status(),
            archive: None,
            uploads: AtomicU32::new(0),
        };
        assert!(matches!(
            ValidationWorkflow::with_service(config, service),
            Err(Error::Config { .. })
        ));
    }

    #[tokio::test]
    async fn test_job_failure_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("out.txt");
        let workflow = ValidationWorkflow::with_service(
            test_config(),
            FakeService {
                status: BulkStatus {
                    status: Some("failed".to_string()),
                    download_url: None,
                    error: Some("malformed upload".to_string()),
                },
                archive: None,
                uploads: AtomicU32::new(0),
            },
        )
        .unwrap();

        let err = workflow
            .validate(&parse_addresses("a@x.com\n"), &output)
            .await
            .unwrap_err();
        match err {
            Error::JobFailed { reason, .. } => assert_eq!(reason, "malformed upload"),
            other => panic!("expected job failure, got {other:?}"),
        }
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_timeout_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("out.txt");
        let workflow = ValidationWorkflow::with_service(
            test_config(),
            FakeService {
                status: BulkStatus {
                    status: Some("uploading".to_string()),
                    ..Default::default()
                },
                archive: None,
                uploads: AtomicU32::new(0),
            },
        )
        .unwrap();

        let err = workflow
            .validate(&parse_addresses("a@x.com\n"), &output)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Timeout { .. }));
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_unavailable_download_is_no_results() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("out.txt");
        let workflow = ValidationWorkflow::with_service(
            test_config(),
            FakeService {
                status: ready_status(),
                archive: None,
                uploads: AtomicU32::new(0),
            },
        )
        .unwrap();

        let err = workflow
            .validate(&parse_addresses("a@x.com\n"), &output)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NoResults(_)));
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_empty_result_set_is_no_results() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("out.txt");
        let workflow = ValidationWorkflow::with_service(
            test_config(),
            FakeService {
                status: ready_status(),
                archive: Some(json_archive("[]")),
                uploads: AtomicU32::new(0),
            },
        )
        .unwrap();

        let err = workflow
            .validate(&parse_addresses("a@x.com\n"), &output)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NoResults(_)));
    }

    #[tokio::test]
    async fn test_successful_run_writes_output() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("out.txt");
        let workflow = ValidationWorkflow::with_service(
            test_config(),
            FakeService {
                status: ready_status(),
                archive: Some(json_archive(
                    r#"[{"address":"z@x.com","result":"deliverable","risk":"high"},
                        {"address":"m@x.com","result":"undeliverable"}]"#,
                )),
                uploads: AtomicU32::new(0),
            },
        )
        .unwrap();

        let summary = workflow
            .validate(&parse_addresses("z@x.com\nm@x.com\n"), &output)
            .await
            .unwrap();
        assert_eq!(summary.deliverable, 1);
        assert_eq!(summary.high_risk, 1);
        assert_eq!(summary.undeliverable, 1);
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "z@x.com\n");
        assert_eq!(workflow.service.uploads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_input_makes_no_upload() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("in.txt");
        std::fs::write(&input, "\n\n").unwrap();
        let workflow = ValidationWorkflow::with_service(
            test_config(),
            FakeService {
                status: ready_status(),
                archive: None,
                uploads: AtomicU32::new(0),
            },
        )
        .unwrap();

        let err = workflow
            .run(&input, &temp_dir.path().join("out.txt"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::EmptyInput { .. }));
        assert_eq!(workflow.service.uploads.load(Ordering::SeqCst), 0);
    }
}
