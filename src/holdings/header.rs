// src/holdings/header.rs
use csv::ReaderBuilder;
use tracing::{debug, instrument, warn};

use super::{HeaderMatch, HeaderRow, HoldingsFile};
use crate::error::{Error, Result, Stage};

/// Find the first record whose text carries `keyword`.
///
/// The file is really comma separated, but it is read here with `;` as the
/// delimiter so each line lands in one wide field regardless of how many
/// columns it has. Preamble lines and table lines can then be scanned alike.
/// Records wider than the first one are malformed; they are counted and
/// passed over.
#[instrument(level = "debug", skip(file), fields(source = %file.source))]
pub fn locate_header(file: &HoldingsFile, keyword: &str, mode: HeaderMatch) -> Result<HeaderRow> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .flexible(true)
        .from_reader(file.bytes.as_slice());

    let mut width = None;
    let mut skipped = 0;
    for (index, result) in rdr.byte_records().enumerate() {
        let record = match result {
            Ok(r) => r,
            Err(e) if e.is_io_error() => break,
            Err(e) => {
                debug!(index, error = %e, "skipping unreadable record");
                skipped += 1;
                continue;
            }
        };
        let expected = *width.get_or_insert(record.len());
        if record.len() > expected {
            debug!(index, fields = record.len(), expected, "skipping malformed record");
            skipped += 1;
            continue;
        }

        let Some(first) = record.get(0) else {
            continue;
        };
        let text = String::from_utf8_lossy(first);
        if matches_header(&text, keyword, mode) {
            if skipped > 0 {
                warn!(skipped, "malformed records skipped before header");
            }
            let line = record.position().map_or(1, |p| p.line());
            debug!(index, line, "header row found");
            return Ok(HeaderRow {
                index,
                line,
                keyword: keyword.to_string(),
                skipped,
            });
        }
    }

    Err(Error::NotFound {
        stage: Stage::HeaderLocator,
        what: "header keyword",
        needle: keyword.to_string(),
        source_name: file.source.clone(),
    })
}

fn matches_header(line: &str, keyword: &str, mode: HeaderMatch) -> bool {
    match mode {
        HeaderMatch::Substring => line.contains(keyword),
        HeaderMatch::Field => line
            .split(',')
            .map(|f| f.trim().trim_matches('"').trim_start_matches('\u{feff}'))
            .any(|f| f == keyword),
    }
}
