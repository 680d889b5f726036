//! Mailgun bulk validation HTTP client
//!
//! The remote service is reached through three calls, expressed by the
//! [`ValidationService`] trait so the workflow can be driven by a scripted
//! service in tests:
//! - submit: multipart CSV upload, accepted with HTTP 202
//! - status: JSON job status, HTTP 200
//! - download: unauthenticated fetch of the result archive
//!
//! The API key is never logged, and download URLs are logged without their
//! query string (they are pre-signed).

use crate::config::Config;
use crate::error::{Error, Result};
use crate::types::{DownloadRef, JobName, ResultFormat};
use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::{debug, info};
use url::Url;

/// User agent sent with every request
const USER_AGENT: &str = concat!("mailgun-bulk-validate/", env!("CARGO_PKG_VERSION"));

/// File name of the uploaded address list
const UPLOAD_FILE_NAME: &str = "emails.csv";

/// Download links of a finished job
#[derive(Clone, Debug, Default, Deserialize)]
pub struct DownloadUrls {
    /// Archive containing a CSV result file
    #[serde(default)]
    pub csv: Option<String>,
    /// Archive containing a JSON result file
    #[serde(default)]
    pub json: Option<String>,
}

/// Body of a bulk job status response
///
/// Only the fields this tool acts on are modeled; the service sends more
/// (summary, quantity, records_processed) which are ignored.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct BulkStatus {
    /// Job status as reported by the service (e.g. "uploaded", "failed")
    #[serde(default)]
    pub status: Option<String>,
    /// Present once results are ready
    #[serde(default)]
    pub download_url: Option<DownloadUrls>,
    /// Failure reason when the job failed
    #[serde(default)]
    pub error: Option<String>,
}

impl BulkStatus {
    /// Usable download reference, preferring the CSV link over the JSON link
    pub fn download_ref(&self) -> Option<DownloadRef> {
        let urls = self.download_url.as_ref()?;
        fn non_empty(u: &Option<String>) -> Option<&str> {
            u.as_deref().filter(|s| !s.trim().is_empty())
        }

        if let Some(url) = non_empty(&urls.csv) {
            return Some(DownloadRef {
                url: url.to_string(),
                format: ResultFormat::Csv,
            });
        }
        non_empty(&urls.json).map(|url| DownloadRef {
            url: url.to_string(),
            format: ResultFormat::Json,
        })
    }

    /// True if the service reports the job as failed
    pub fn is_failed(&self) -> bool {
        self.status
            .as_deref()
            .is_some_and(|s| s.trim().eq_ignore_ascii_case("failed"))
    }

    /// Status text, lowercased, `unknown` when absent
    pub fn status_text(&self) -> String {
        self.status
            .as_deref()
            .map(str::to_lowercase)
            .unwrap_or_else(|| "unknown".to_string())
    }
}

/// Remote bulk validation service
#[async_trait]
pub trait ValidationService: Send + Sync {
    /// Upload a CSV address document under the given job name
    ///
    /// # Errors
    /// Returns [`Error::Submission`] unless the service answers 202 Accepted.
    async fn submit(&self, job: &JobName, document: Vec<u8>) -> Result<()>;

    /// Query the status of a job
    ///
    /// # Errors
    /// Returns [`Error::Status`] unless the service answers 200 OK.
    async fn status(&self, job: &JobName) -> Result<BulkStatus>;

    /// Fetch a result archive
    ///
    /// Returns `Ok(None)` when the download answers with a non-success status.
    async fn download(&self, url: &str) -> Result<Option<Vec<u8>>>;
}

/// [`ValidationService`] backed by the Mailgun v4 API
pub struct MailgunClient {
    /// HTTP client shared by all calls
    http_client: reqwest::Client,

    /// API root, e.g. `https://api.mailgun.net/v4/`
    api_base: Url,

    /// Private API key
    api_key: String,
}

impl MailgunClient {
    /// Create a client from a validated configuration
    ///
    /// # Errors
    /// Returns error if the configuration is unusable or the HTTP client
    /// cannot be created
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;

        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            http_client,
            api_base: config.api_base.clone(),
            api_key: config.api_key.trim().to_string(),
        })
    }

    /// Endpoint for a bulk job
    fn job_url(&self, job: &JobName) -> Result<Url> {
        Ok(self
            .api_base
            .join(&format!("address/validate/bulk/{}", job.as_str()))?)
    }
}

#[async_trait]
impl ValidationService for MailgunClient {
    async fn submit(&self, job: &JobName, document: Vec<u8>) -> Result<()> {
        let url = self.job_url(job)?;
        let size = document.len();

        let part = Part::bytes(document)
            .file_name(UPLOAD_FILE_NAME)
            .mime_str("text/csv")?;
        let form = Form::new().part("file", part);

        info!(%job, bytes = size, "uploading address list");

        let response = self
            .http_client
            .post(url)
            .basic_auth("api", Some(&self.api_key))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        debug!(%job, status = status.as_u16(), "upload response");

        if status != StatusCode::ACCEPTED {
            return Err(Error::Submission {
                status: status.as_u16(),
            });
        }
        Ok(())
    }

    async fn status(&self, job: &JobName) -> Result<BulkStatus> {
        let url = self.job_url(job)?;

        let response = self
            .http_client
            .get(url)
            .basic_auth("api", Some(&self.api_key))
            .send()
            .await?;

        let status = response.status();
        debug!(%job, status = status.as_u16(), "status response");

        if status != StatusCode::OK {
            return Err(Error::Status {
                status: status.as_u16(),
            });
        }

        Ok(response.json::<BulkStatus>().await?)
    }

    async fn download(&self, url: &str) -> Result<Option<Vec<u8>>> {
        info!(url = %redact_query(url), "downloading results");

        let response = self.http_client.get(url).send().await?;
        let status = response.status();

        if status != StatusCode::OK {
            debug!(status = status.as_u16(), "result download not available");
            return Ok(None);
        }

        let body = response.bytes().await?;
        debug!(bytes = body.len(), "result archive downloaded");
        Ok(Some(body.to_vec()))
    }
}

/// Strip the query string (signatures, tokens) from a URL for logging
pub fn redact_query(url: &str) -> String {
    match Url::parse(url) {
        Ok(mut parsed) => {
            parsed.set_query(None);
            parsed.to_string()
        }
        Err(_) => "<invalid url>".to_string(),
    }
}
