//! Result classification, summary, and output file

use crate::error::Result;
use crate::types::{EmailAddress, Outcome, ResultRow, RiskTier};
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::path::Path;
use tracing::{debug, info, warn};

/// Width of the summary banner rules
const RULE_WIDTH: usize = 50;

/// Aggregate outcome of a validation run
///
/// Percentages use the number of submitted addresses (duplicates included)
/// as denominator, while the tallies only count classified rows. Rows
/// without an address are skipped and therefore lower the reported
/// coverage without changing the denominator.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationSummary {
    /// Number of submitted addresses
    pub total: usize,
    /// Deliverable rows
    pub deliverable: usize,
    /// Deliverable rows with low (or missing) risk
    pub low_risk: usize,
    /// Deliverable rows with medium risk
    pub medium_risk: usize,
    /// Deliverable rows with high or unrecognized risk
    pub high_risk: usize,
    /// Rows with any other verdict
    pub undeliverable: usize,
    /// Rows the service could not validate
    pub errors: usize,
    /// Rows skipped for lacking an address
    pub skipped: usize,
    /// Deliverable rows whose address was never submitted (not written out)
    pub unmatched: usize,
    /// Deduplicated deliverable addresses, byte-wise ascending
    pub emails: Vec<String>,
}

impl ValidationSummary {
    /// `count` as a percentage of submitted addresses
    pub fn percent(&self, count: usize) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            count as f64 / self.total as f64 * 100.0
        }
    }

    /// Human-readable summary block naming where addresses were saved
    pub fn render<'a>(&'a self, output_file: &'a Path) -> SummaryReport<'a> {
        SummaryReport {
            summary: self,
            output_file,
        }
    }
}

/// Printable summary of a run
pub struct SummaryReport<'a> {
    summary: &'a ValidationSummary,
    output_file: &'a Path,
}

impl fmt::Display for SummaryReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.summary;
        let rule = "=".repeat(RULE_WIDTH);

        writeln!(f, "{rule}")?;
        writeln!(f, "VALIDATION SUMMARY")?;
        writeln!(f, "{rule}")?;
        writeln!(f, "Total emails processed: {}", s.total)?;
        writeln!(
            f,
            "Deliverable emails: {} ({:.1}%)",
            s.deliverable,
            s.percent(s.deliverable)
        )?;
        writeln!(f, "  - Low risk: {}", s.low_risk)?;
        writeln!(f, "  - Medium risk: {}", s.medium_risk)?;
        writeln!(f, "  - High risk: {}", s.high_risk)?;
        writeln!(
            f,
            "Undeliverable emails: {} ({:.1}%)",
            s.undeliverable,
            s.percent(s.undeliverable)
        )?;
        writeln!(f, "Errors: {} ({:.1}%)", s.errors, s.percent(s.errors))?;
        if s.unmatched > 0 {
            writeln!(f, "Not in input (not saved): {}", s.unmatched)?;
        }
        writeln!(
            f,
            "Low risk / validated emails saved to: {}",
            self.output_file.display()
        )?;
        write!(f, "{rule}")
    }
}

/// Tally result rows against the submitted address list
///
/// Per row: rows without an address are skipped; an error wins over the
/// verdict; deliverable rows add their address to the output set and count
/// toward their risk tier; everything else is undeliverable.
pub fn classify(rows: &[ResultRow], submitted: &[EmailAddress]) -> ValidationSummary {
    let known: HashSet<&str> = submitted.iter().map(EmailAddress::as_str).collect();
    let mut emails = BTreeSet::new();
    let mut summary = ValidationSummary {
        total: submitted.len(),
        ..Default::default()
    };

    for row in rows {
        if row.address.is_empty() {
            summary.skipped += 1;
            continue;
        }

        match row.outcome {
            Outcome::Errored => summary.errors += 1,
            Outcome::Undeliverable => summary.undeliverable += 1,
            Outcome::Deliverable => {
                summary.deliverable += 1;
                match row.risk {
                    RiskTier::Low => summary.low_risk += 1,
                    RiskTier::Medium => summary.medium_risk += 1,
                    RiskTier::High => summary.high_risk += 1,
                }
                if known.contains(row.address.as_str()) {
                    emails.insert(row.address.clone());
                } else {
                    warn!(address = %row.address, "deliverable address was not submitted");
                    summary.unmatched += 1;
                }
            }
        }
    }

    if summary.skipped > 0 {
        debug!(skipped = summary.skipped, "rows without an address");
    }

    summary.emails = emails.into_iter().collect();
    summary
}

/// Write deliverable addresses, one per line, replacing any existing file
pub async fn write_output(path: &Path, summary: &ValidationSummary) -> Result<()> {
    let mut content = String::with_capacity(summary.emails.iter().map(|e| e.len() + 1).sum());
    for email in &summary.emails {
        content.push_str(email);
        content.push('\n');
    }

    tokio::fs::write(path, content).await?;
    info!(?path, count = summary.emails.len(), "saved validated emails");
    Ok(())
}
