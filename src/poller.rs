//! Job status polling
//!
//! Polling is modeled as a small state machine:
//!
//! ```text
//!            in progress, within deadline
//!              ┌──────────┐
//!              ▼          │
//!  ──────► Polling ───────┘
//!              │ download reference   ──► Ready
//!              │ status "failed"      ──► Failed
//!              │ deadline exceeded    ──► TimedOut
//! ```
//!
//! The service is queried first and the fixed interval is slept only after a
//! non-terminal answer, so a job that is already finished costs no wait. A
//! non-success HTTP status while polling is returned as an error, never retried.

use crate::client::{BulkStatus, ValidationService};
use crate::config::Config;
use crate::error::Result;
use crate::types::{DownloadRef, JobName};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Job status derived from one status response
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JobStatus {
    /// Still running; carries the service's status text
    InProgress(String),
    /// The service reported failure
    Failed(String),
    /// Results can be downloaded
    Ready(DownloadRef),
}

impl JobStatus {
    /// Derive the status from a response body
    ///
    /// Readiness is inferred from a download reference rather than from the
    /// status text, and a reference wins over a `failed` status.
    pub fn from_response(response: &BulkStatus) -> Self {
        if let Some(download) = response.download_ref() {
            JobStatus::Ready(download)
        } else if response.is_failed() {
            JobStatus::Failed(
                response
                    .error
                    .clone()
                    .filter(|e| !e.trim().is_empty())
                    .unwrap_or_else(|| "Unknown error".to_string()),
            )
        } else {
            JobStatus::InProgress(response.status_text())
        }
    }
}

/// State of the polling state machine
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PollState {
    /// Waiting for the job to finish
    Polling,
    /// Results are available at the reference
    Ready(DownloadRef),
    /// The job failed with the given reason
    Failed(String),
    /// Deadline exceeded while the job was still in progress
    TimedOut,
}

impl PollState {
    /// Whether polling stops in this state
    pub fn is_terminal(&self) -> bool {
        !matches!(self, PollState::Polling)
    }

    /// Next state after observing `status` at `elapsed` since the first query
    pub fn next(status: JobStatus, elapsed: Duration, timeout: Duration) -> Self {
        match status {
            JobStatus::Ready(download) => PollState::Ready(download),
            JobStatus::Failed(reason) => PollState::Failed(reason),
            JobStatus::InProgress(_) if elapsed > timeout => PollState::TimedOut,
            JobStatus::InProgress(_) => PollState::Polling,
        }
    }
}

/// Outcome of a completed polling run
#[derive(Clone, Debug)]
pub struct PollReport {
    /// Terminal state reached
    pub state: PollState,
    /// Number of status queries made
    pub queries: u32,
    /// Number of interval waits performed
    pub waits: u32,
    /// Time since the first query
    pub elapsed: Duration,
}

/// Polls a job until it reaches a terminal state
pub struct StatusPoller<'a, S: ?Sized> {
    service: &'a S,
    interval: Duration,
    timeout: Duration,
}

impl<'a, S> StatusPoller<'a, S>
where
    S: ValidationService + ?Sized,
{
    /// Create a poller with an explicit cadence
    pub fn new(service: &'a S, interval: Duration, timeout: Duration) -> Self {
        Self {
            service,
            interval,
            timeout,
        }
    }

    /// Create a poller using the configured cadence
    pub fn from_config(service: &'a S, config: &Config) -> Self {
        Self::new(service, config.poll_interval, config.poll_timeout)
    }

    /// Poll until the job is ready, failed, or the deadline passes
    ///
    /// # Errors
    /// Propagates transport errors and [`crate::Error::Status`] from the service.
    pub async fn run(&self, job: &JobName) -> Result<PollReport> {
        let started = Instant::now();
        let mut queries = 0u32;
        let mut waits = 0u32;

        loop {
            let response = self.service.status(job).await?;
            queries += 1;

            let elapsed = started.elapsed();
            let status = JobStatus::from_response(&response);
            debug!(%job, ?status, queries, "status received");

            let secs = elapsed.as_secs();
            info!("Processing... (Elapsed: {}m {}s)", secs / 60, secs % 60);

            let state = PollState::next(status, elapsed, self.timeout);
            if state.is_terminal() {
                match &state {
                    PollState::Ready(download) => {
                        info!(%job, format = %download.format, "results ready")
                    }
                    PollState::Failed(reason) => warn!(%job, %reason, "job failed"),
                    PollState::TimedOut => warn!(%job, ?elapsed, "polling deadline exceeded"),
                    PollState::Polling => {}
                }
                return Ok(PollReport {
                    state,
                    queries,
                    waits,
                    elapsed,
                });
            }

            tokio::time::sleep(self.interval).await;
            waits += 1;
        }
    }
}
