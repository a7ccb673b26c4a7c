// src/holdings/extract.rs
use csv::ReaderBuilder;
use tracing::{debug, info, instrument, trace, warn};

use super::{HeaderRow, HoldingsFile, TickerList};
use crate::error::{Error, Result, Stage};
use crate::tickers::{self, SuffixRules};

/// Re-read the file as CSV starting at `header`, take `column` from each
/// data row, and keep the values that survive [`tickers::normalize`].
///
/// Records starting above the header's line are preamble. Data records
/// wider than the header are skipped and counted; short ones read as blank.
#[instrument(level = "debug", skip(file, header, rules), fields(source = %file.source, header = header.line))]
pub fn extract_tickers(
    file: &HoldingsFile,
    header: &HeaderRow,
    column: &str,
    rules: &SuffixRules,
) -> Result<TickerList> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(file.bytes.as_slice());

    let mut out = TickerList::default();
    // (column position, header width), set once the header record is reached
    let mut layout: Option<(usize, usize)> = None;

    for (index, result) in rdr.byte_records().enumerate() {
        let start = match &result {
            Ok(r) => r.position(),
            Err(e) => e.position(),
        };
        if start.map_or(0, |p| p.line()) < header.line {
            continue;
        }
        let record = match result {
            Ok(r) => r,
            Err(e) if e.is_io_error() => break,
            Err(e) => {
                debug!(index, error = %e, "skipping unreadable record");
                out.skipped += 1;
                continue;
            }
        };

        let Some((col, width)) = layout else {
            let pos = record
                .iter()
                .position(|name| clean_header(&String::from_utf8_lossy(name)) == column)
                .ok_or_else(|| Error::Parse {
                    stage: Stage::TickerExtractor,
                    source_name: file.source.clone(),
                    expected: format!("column '{}' in header on line {}", column, header.line),
                })?;
            trace!(column, pos, width = record.len(), "header parsed");
            layout = Some((pos, record.len()));
            continue;
        };

        if record.len() > width {
            debug!(index, fields = record.len(), width, "skipping malformed row");
            out.skipped += 1;
            continue;
        }

        out.rows += 1;
        let raw = record
            .get(col)
            .map(String::from_utf8_lossy)
            .unwrap_or_default();
        match tickers::normalize(&raw, rules) {
            Some(ticker) => {
                if ticker.as_str() != raw {
                    out.corrected += 1;
                }
                out.tickers.push(ticker);
            }
            None => out.dropped += 1,
        }
    }

    if layout.is_none() {
        return Err(Error::Parse {
            stage: Stage::TickerExtractor,
            source_name: file.source.clone(),
            expected: format!("header on line {}", header.line),
        });
    }

    if out.skipped > 0 {
        warn!(skipped = out.skipped, "malformed rows skipped");
    }
    info!(
        kept = out.tickers.len(),
        rows = out.rows,
        dropped = out.dropped,
        corrected = out.corrected,
        "tickers extracted"
    );
    Ok(out)
}

fn clean_header(name: &str) -> &str {
    name.trim_start_matches('\u{feff}').trim()
}
