use tracing::debug;

use crate::error::ParseFailure;
use crate::ingest::{ColumnLayout, RawTable};

/// Rows shorter than the header are padded with blanks in both modes. Rows
/// longer than the header, or not valid UTF-8, fail strict and are skipped by lenient.
pub fn parse(bytes: &[u8], delimiter: char, lenient: bool) -> Result<RawTable, ParseFailure> {
    if !delimiter.is_ascii() {
        return Err(ParseFailure::Encoding(format!(
            "delimiter {:?} is not a single byte",
            delimiter
        )));
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let headers = reader.headers().map_err(classify)?.clone();
    let layout = ColumnLayout::from_headers(headers.iter());
    if layout.is_empty() {
        return Err(ParseFailure::HeaderMismatch);
    }

    let expected = headers.len();
    let mut rows = Vec::new();
    let mut skipped = 0usize;

    for result in reader.records() {
        match result {
            Ok(record) if record.len() <= expected => {
                rows.push(layout.extract(|idx| record.get(idx)));
            }
            Ok(record) => {
                let line = record.position().map(|pos| pos.line()).unwrap_or(0);
                if !lenient {
                    return Err(ParseFailure::MalformedRow {
                        line,
                        detail: format!("found {} fields, expected {}", record.len(), expected),
                    });
                }
                debug!(line, fields = record.len(), expected, "skipping row with extra fields");
                skipped += 1;
            }
            Err(err) if lenient => {
                debug!(error = %err, "skipping unreadable row");
                skipped += 1;
            }
            Err(err) => return Err(classify(err)),
        }
    }

    if skipped > 0 {
        debug!(skipped, kept = rows.len(), "lenient parse dropped malformed rows");
    }

    Ok(RawTable {
        columns: layout.presence(),
        rows,
    })
}

fn classify(err: csv::Error) -> ParseFailure {
    let line = err.position().map(|pos| pos.line()).unwrap_or(0);
    match err.kind() {
        csv::ErrorKind::Utf8 { .. } => ParseFailure::Encoding(err.to_string()),
        _ => ParseFailure::MalformedRow {
            line,
            detail: err.to_string(),
        },
    }
}
