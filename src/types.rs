//! Core types for mailgun-bulk-validate

use chrono::{DateTime, Local};
use rand::seq::SliceRandom;

/// Prefix shared by every generated job name
pub const JOB_NAME_PREFIX: &str = "validation";

/// Length of the random job name suffix
const JOB_SUFFIX_LEN: usize = 6;

/// Alphabet for the random job name suffix
const JOB_SUFFIX_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// One address from the input list
///
/// Opaque and case-preserved; two addresses are equal only if their text is
/// byte-for-byte identical.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Build an address from a raw input line, trimming surrounding whitespace
    ///
    /// Returns `None` for blank lines.
    pub fn parse(line: &str) -> Option<Self> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// Borrow the address text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Name of a bulk job on the remote service
///
/// Format: `validation_<YYYYmmdd_HHMM>_<6 lowercase alphanumerics>`. The
/// suffix only avoids collisions between runs started in the same minute.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct JobName(String);

impl JobName {
    /// Generate a fresh job name from the local clock
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let suffix: String = (0..JOB_SUFFIX_LEN)
            .filter_map(|_| JOB_SUFFIX_CHARSET.choose(&mut rng))
            .map(|&b| b as char)
            .collect();
        Self::from_parts(Local::now(), &suffix)
    }

    /// Build a job name from an explicit timestamp and suffix
    pub fn from_parts(timestamp: DateTime<Local>, suffix: &str) -> Self {
        Self(format!(
            "{}_{}_{}",
            JOB_NAME_PREFIX,
            timestamp.format("%Y%m%d_%H%M"),
            suffix
        ))
    }

    /// Borrow the job name
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for JobName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Payload format of a downloaded result set
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResultFormat {
    /// JSON array of result objects
    Json,
    /// Header row followed by one row per address
    Csv,
}

impl ResultFormat {
    /// Detect the format from an archive member name
    pub fn from_member_name(name: &str) -> Option<Self> {
        let lower = name.to_ascii_lowercase();
        if lower.ends_with(".json") {
            Some(ResultFormat::Json)
        } else if lower.ends_with(".csv") {
            Some(ResultFormat::Csv)
        } else {
            None
        }
    }
}

impl std::fmt::Display for ResultFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResultFormat::Json => f.write_str("json"),
            ResultFormat::Csv => f.write_str("csv"),
        }
    }
}

/// URL at which a finished job's result archive can be fetched
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DownloadRef {
    /// Download URL (pre-signed, unauthenticated)
    pub url: String,
    /// Which download key the URL came from
    pub format: ResultFormat,
}

/// Delivery outcome of one result row
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// Address is believed to accept mail
    Deliverable,
    /// Any non-deliverable verdict (undeliverable, unknown, do_not_send...)
    Undeliverable,
    /// The service could not validate the address
    Errored,
}

/// Risk tier assigned to a deliverable address
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RiskTier {
    /// Low risk (also used when the service omits the field)
    #[default]
    Low,
    /// Medium risk
    Medium,
    /// High risk, or any tier this tool does not recognize
    High,
}

impl RiskTier {
    /// Normalize a raw risk value
    pub fn from_field(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None | Some("") => RiskTier::Low,
            Some(v) if v.eq_ignore_ascii_case("low") => RiskTier::Low,
            Some(v) if v.eq_ignore_ascii_case("medium") => RiskTier::Medium,
            Some(_) => RiskTier::High,
        }
    }
}

/// One normalized result row, independent of the payload format
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResultRow {
    /// Address as reported by the service; empty when the row had none
    pub address: String,
    /// Classified outcome
    pub outcome: Outcome,
    /// Risk tier (meaningful for deliverable rows)
    pub risk: RiskTier,
    /// Error text when the row errored
    pub error: Option<String>,
}

impl ResultRow {
    /// Build a row from raw field values
    ///
    /// An error value wins over the result verdict, so a row carrying both
    /// an error and `deliverable` is errored.
    pub fn from_fields(
        address: Option<&str>,
        result: Option<&str>,
        risk: Option<&str>,
        error: Option<&str>,
    ) -> Self {
        let address = address.map(str::trim).unwrap_or_default().to_string();
        let error = error
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(str::to_string);

        let outcome = if error.is_some() {
            Outcome::Errored
        } else if result.is_some_and(|r| r.trim().eq_ignore_ascii_case("deliverable")) {
            Outcome::Deliverable
        } else {
            Outcome::Undeliverable
        };

        Self {
            address,
            outcome,
            risk: RiskTier::from_field(risk),
            error,
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_email_address_trims_and_skips_blank() {
        assert_eq!(
            EmailAddress::parse("  a@x.com \r").unwrap().as_str(),
            "a@x.com"
        );
        assert!(EmailAddress::parse("   ").is_none());
        assert!(EmailAddress::parse("").is_none());
    }

    #[test]
    fn test_email_address_preserves_case() {
        let upper = EmailAddress::parse("B@x.com").unwrap();
        let lower = EmailAddress::parse("b@x.com").unwrap();
        assert_ne!(upper, lower);
        assert_eq!(upper.to_string(), "B@x.com");
    }

    #[test]
    fn test_job_name_from_parts() {
        let ts = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 59).unwrap();
        let name = JobName::from_parts(ts, "ab12cd");
        assert_eq!(name.as_str(), "validation_20240309_1405_ab12cd");
    }

    #[test]
    fn test_job_name_generate_shape() {
        let name = JobName::generate();
        let parts: Vec<&str> = name.as_str().split('_').collect();
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[0], "validation");
        assert_eq!(parts[1].len(), 8);
        assert_eq!(parts[2].len(), 4);
        assert_eq!(parts[3].len(), 6);
        assert!(
            parts[3]
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        );
    }

    #[test]
    fn test_result_format_from_member_name() {
        assert_eq!(
            ResultFormat::from_member_name("results.json"),
            Some(ResultFormat::Json)
        );
        assert_eq!(
            ResultFormat::from_member_name("dir/RESULTS.CSV"),
            Some(ResultFormat::Csv)
        );
        assert_eq!(ResultFormat::from_member_name("readme.txt"), None);
    }

    #[test]
    fn test_risk_tier_normalization() {
        assert_eq!(RiskTier::from_field(None), RiskTier::Low);
        assert_eq!(RiskTier::from_field(Some("")), RiskTier::Low);
        assert_eq!(RiskTier::from_field(Some("LOW")), RiskTier::Low);
        assert_eq!(RiskTier::from_field(Some("Medium")), RiskTier::Medium);
        assert_eq!(RiskTier::from_field(Some("high")), RiskTier::High);
        assert_eq!(RiskTier::from_field(Some("unknown")), RiskTier::High);
    }

    #[test]
    fn test_error_takes_precedence_over_deliverable() {
        let row = ResultRow::from_fields(
            Some("a@x.com"),
            Some("deliverable"),
            None,
            Some("mailbox lookup failed"),
        );
        assert_eq!(row.outcome, Outcome::Errored);
        assert_eq!(row.error.as_deref(), Some("mailbox lookup failed"));
    }

    #[test]
    fn test_empty_error_is_ignored() {
        let row = ResultRow::from_fields(Some("a@x.com"), Some("Deliverable"), None, Some(""));
        assert_eq!(row.outcome, Outcome::Deliverable);
        assert!(row.error.is_none());
    }

    #[test]
    fn test_non_deliverable_verdicts() {
        for verdict in ["undeliverable", "do_not_send", "catch_all", "unknown"] {
            let row = ResultRow::from_fields(Some("a@x.com"), Some(verdict), None, None);
            assert_eq!(row.outcome, Outcome::Undeliverable, "verdict {verdict}");
        }
        let missing = ResultRow::from_fields(Some("a@x.com"), None, None, None);
        assert_eq!(missing.outcome, Outcome::Undeliverable);
    }
}
