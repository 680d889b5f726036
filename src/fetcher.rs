//! Result download and archive parsing
//!
//! Results arrive as a zip archive holding either a JSON array of result
//! objects or a CSV file with a header row. Both are normalized into
//! [`ResultRow`] by one adapter per format, so classification never looks
//! at raw field names. Field names are matched case-insensitively
//! (`result` in JSON, `Result` in CSV exports).

use crate::client::ValidationService;
use crate::error::Result;
use crate::types::{DownloadRef, ResultFormat, ResultRow};
use serde_json::{Map, Value};
use std::io::{Cursor, Read};
use tracing::{debug, info, warn};

/// Rows parsed from a result archive
#[derive(Clone, Debug)]
pub struct ParsedResults {
    /// Normalized rows in file order
    pub rows: Vec<ResultRow>,
    /// Format of the member that was parsed
    pub format: ResultFormat,
    /// Archive member the rows came from
    pub member: String,
}

/// Download and parse a result archive
///
/// Returns `Ok(None)` when the download answered with a non-success status
/// or the archive holds no `.json`/`.csv` member. Callers treat both as
/// terminal.
pub async fn fetch_results<S>(
    service: &S,
    download: &DownloadRef,
) -> Result<Option<ParsedResults>>
where
    S: ValidationService + ?Sized,
{
    let Some(body) = service.download(&download.url).await? else {
        warn!("result download returned a non-success status");
        return Ok(None);
    };

    let parsed = parse_archive(&body)?;
    if let Some(results) = &parsed {
        info!(
            member = %results.member,
            format = %results.format,
            rows = results.rows.len(),
            "download complete, processing results"
        );
    }
    Ok(parsed)
}

/// Parse the first recognized member of a zip archive
///
/// Members are visited in archive order; the first whose name ends in
/// `.json` or `.csv` is parsed and the rest are ignored.
///
/// # Errors
/// Returns an error if the archive cannot be opened or the selected member
/// is not valid JSON/CSV.
pub fn parse_archive(bytes: &[u8]) -> Result<Option<ParsedResults>> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;

    for index in 0..archive.len() {
        let mut file = archive.by_index(index)?;
        if file.is_dir() {
            continue;
        }

        let member = file.name().to_string();
        let Some(format) = ResultFormat::from_member_name(&member) else {
            debug!(%member, "skipping unrecognized archive member");
            continue;
        };

        let mut content = Vec::new();
        file.read_to_end(&mut content)?;

        let rows = match format {
            ResultFormat::Json => parse_json_rows(&content)?,
            ResultFormat::Csv => parse_csv_rows(&content)?,
        };

        return Ok(Some(ParsedResults {
            rows,
            format,
            member,
        }));
    }

    warn!("archive contains no .json or .csv member");
    Ok(None)
}

/// Parse a JSON array of result objects
pub fn parse_json_rows(content: &[u8]) -> Result<Vec<ResultRow>> {
    let records: Vec<Map<String, Value>> = serde_json::from_slice(content)?;
    Ok(records.iter().map(row_from_json).collect())
}

/// Parse a CSV result file with a header row
pub fn parse_csv_rows(content: &[u8]) -> Result<Vec<ResultRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(content);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let fields: Vec<(&str, &str)> = headers
            .iter()
            .map(String::as_str)
            .zip(record.iter())
            .collect();
        rows.push(row_from_csv(&fields));
    }
    Ok(rows)
}

/// Adapter for one JSON result object
///
/// `null` and `false` count as an absent field. Any other non-string value
/// is taken as its JSON text, so `"error": 0` or `"error": true` still marks
/// the row as errored.
fn row_from_json(record: &Map<String, Value>) -> ResultRow {
    let field = |key: &str| -> Option<String> {
        record
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .and_then(|(_, v)| match v {
                Value::Null | Value::Bool(false) => None,
                Value::String(s) => Some(s.clone()),
                other => Some(other.to_string()),
            })
    };

    let address = first_non_empty(field("address"), field("email"));
    ResultRow::from_fields(
        address.as_deref(),
        field("result").as_deref(),
        field("risk").as_deref(),
        field("error").as_deref(),
    )
}

/// Adapter for one CSV row, given as (header, value) pairs
fn row_from_csv(fields: &[(&str, &str)]) -> ResultRow {
    let address = first_non_empty(
        csv_field(fields, "address").map(str::to_string),
        csv_field(fields, "email").map(str::to_string),
    );
    ResultRow::from_fields(
        address.as_deref(),
        csv_field(fields, "result"),
        csv_field(fields, "risk"),
        csv_field(fields, "error"),
    )
}

fn csv_field<'a>(fields: &[(&str, &'a str)], key: &str) -> Option<&'a str> {
    fields
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .map(|(_, v)| *v)
}

fn first_non_empty(primary: Option<String>, fallback: Option<String>) -> Option<String> {
    primary
        .filter(|s| !s.trim().is_empty())
        .or(fallback.filter(|s| !s.trim().is_empty()))
}
