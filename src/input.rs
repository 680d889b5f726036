//! Input address list loading

use crate::error::{Error, Result};
use crate::types::EmailAddress;
use std::path::Path;
use tracing::debug;

/// Read a newline-delimited address list
///
/// Lines are trimmed and blank lines dropped; order and duplicates are kept
/// because the submitted count is the denominator of the final report.
///
/// # Errors
/// - [`Error::Input`] if the file cannot be read
/// - [`Error::EmptyInput`] if it contains no addresses
pub async fn read_addresses(path: &Path) -> Result<Vec<EmailAddress>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| Error::Input {
            path: path.to_path_buf(),
            source,
        })?;

    let addresses = parse_addresses(&content);
    if addresses.is_empty() {
        return Err(Error::EmptyInput {
            path: path.to_path_buf(),
        });
    }

    debug!(?path, count = addresses.len(), "loaded input addresses");
    Ok(addresses)
}

/// Split raw text into addresses, one per non-blank line
pub fn parse_addresses(content: &str) -> Vec<EmailAddress> {
    content.lines().filter_map(EmailAddress::parse).collect()
}
