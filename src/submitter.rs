//! Job submission: address list to single-column CSV upload

use crate::client::ValidationService;
use crate::error::{Error, Result};
use crate::types::{EmailAddress, JobName};
use tracing::info;

/// Header of the uploaded address column
pub const EMAIL_COLUMN: &str = "email";

/// Serialize addresses as a CSV document with an `email` header row
///
/// Rows keep input order; duplicates are not removed.
pub fn build_csv(addresses: &[EmailAddress]) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record([EMAIL_COLUMN])?;
    for address in addresses {
        writer.write_record([address.as_str()])?;
    }

    writer
        .into_inner()
        .map_err(|e| Error::Io(std::io::Error::other(format!("failed to flush CSV: {}", e))))
}

/// Upload the address list as a new bulk job
///
/// Fails fast with [`Error::NothingToSubmit`] before any network call when
/// the list is empty. Any response other than 202 Accepted is terminal.
pub async fn submit_job<S>(service: &S, job: &JobName, addresses: &[EmailAddress]) -> Result<()>
where
    S: ValidationService + ?Sized,
{
    if addresses.is_empty() {
        return Err(Error::NothingToSubmit);
    }

    let document = build_csv(addresses)?;
    info!(%job, count = addresses.len(), "submitting bulk validation job");
    service.submit(job, document).await?;
    info!(%job, "job submitted successfully");
    Ok(())
}
