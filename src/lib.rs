//! # mailgun-bulk-validate
//!
//! Validates a list of email addresses through the Mailgun bulk validation
//! API and keeps the deliverable ones.
//!
//! A run is a single sequential workflow:
//! 1. **Submit** - the list is uploaded as a one-column CSV under a generated job name
//! 2. **Poll** - the job status is queried at a fixed interval until a download
//!    link appears, the job fails, or the deadline passes
//! 3. **Fetch** - the result archive is downloaded and its JSON or CSV member parsed
//! 4. **Classify** - rows are tallied by outcome and risk, and deliverable
//!    addresses are written out deduplicated and sorted
//!
//! ## Quick Start
//!
//! ```no_run
//! use mailgun_bulk_validate::{Config, MailgunClient, ValidationWorkflow};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::new("key-xxxxxxxx")?;
//!     let workflow = ValidationWorkflow::<MailgunClient>::new(config)?;
//!
//!     let summary = workflow
//!         .run(Path::new("emails.txt"), Path::new("validated-emails.txt"))
//!         .await?;
//!     println!("{}", summary.render(Path::new("validated-emails.txt")));
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Result classification and output file
pub mod classifier;
/// Mailgun HTTP client
pub mod client;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Result download and archive parsing
pub mod fetcher;
/// Input address list loading
pub mod input;
/// Job status polling
pub mod poller;
/// Job submission
pub mod submitter;
/// Core types
pub mod types;
/// End-to-end workflow
pub mod workflow;

// Re-export commonly used types
pub use classifier::{SummaryReport, ValidationSummary};
pub use client::{BulkStatus, MailgunClient, ValidationService};
pub use config::Config;
pub use error::{Error, Result};
pub use poller::{JobStatus, PollState, StatusPoller};
pub use types::{DownloadRef, EmailAddress, JobName, Outcome, ResultFormat, ResultRow, RiskTier};
pub use workflow::ValidationWorkflow;
