//! Error types for mailgun-bulk-validate
//!
//! Every failure is terminal for a run. The variants follow the stages of
//! the workflow so the binary can render a precise message:
//! - input and configuration problems (no network activity happened)
//! - HTTP-level failures while submitting or polling
//! - job-level failures reported by the service (failed, timed out)
//! - download and archive parsing failures

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for mailgun-bulk-validate operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for mailgun-bulk-validate
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "api_key")
        key: Option<String>,
    },

    /// The input file could not be read
    #[error("failed to read input file {}: {source}", .path.display())]
    Input {
        /// Path of the input file
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// The input file contained no addresses
    #[error("no emails found in input file {}", .path.display())]
    EmptyInput {
        /// Path of the input file
        path: PathBuf,
    },

    /// An empty address list was handed to the submitter
    #[error("refusing to submit an empty address list")]
    NothingToSubmit,

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Upload was not accepted by the service
    #[error("error uploading file: HTTP {status}")]
    Submission {
        /// HTTP status code returned by the service
        status: u16,
    },

    /// Status query returned a non-success response
    #[error("error checking status: HTTP {status}")]
    Status {
        /// HTTP status code returned by the service
        status: u16,
    },

    /// The service reported that the job failed
    #[error("job {job} failed: {reason}")]
    JobFailed {
        /// Job name
        job: String,
        /// Service-provided failure reason
        reason: String,
    },

    /// The job did not produce a download reference before the deadline
    #[error("job {job} timed out after {}s, check the Mailgun dashboard", .elapsed.as_secs())]
    Timeout {
        /// Job name
        job: String,
        /// Time spent polling
        elapsed: Duration,
    },

    /// Download failed or the archive held no recognized result member
    #[error("failed to process results: {0}")]
    NoResults(String),

    /// Result archive could not be opened or read
    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Tabular document could not be written or parsed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Endpoint URL could not be built
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl Error {
    /// Shorthand for a configuration error tied to a specific key
    pub fn config(key: &str, message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.to_string()),
        }
    }

    /// True when the run failed before anything was sent to the service
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Error::Config { .. }
                | Error::Input { .. }
                | Error::EmptyInput { .. }
                | Error::NothingToSubmit
        )
    }
}
