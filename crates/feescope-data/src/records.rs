//! Block record CSV ingestion.
//!
//! One block per line, no header, seven comma-separated columns:
//!
//! ```text
//! block_id,height,time,bandwidth,db_read,db_write,compute
//! ```
//!
//! `block_id` is CB58 text and may be left empty. Blank lines are skipped
//! and fields are trimmed. Any malformed row aborts the load.

use std::path::Path;

use tracing::{debug, info};

use feescope_core::dimension::{DIMENSION_COUNT, Dimension, Dimensions};
use feescope_core::id::BlockId;
use feescope_core::sample::{RecordStore, Sample};

use crate::loader::{DataLoadError, read_file};

/// Column names, in file order.
pub const COLUMNS: [&str; 3 + DIMENSION_COUNT] = [
    "block_id",
    "height",
    "time",
    "bandwidth",
    "db_read",
    "db_write",
    "compute",
];

fn parse_u64(row: usize, field: &'static str, raw: &str) -> Result<u64, DataLoadError> {
    raw.parse().map_err(|e: std::num::ParseIntError| DataLoadError::Row {
        row,
        field,
        reason: format!("{raw:?}: {e}"),
    })
}

/// Parse one non-blank line. `row` is the 0-based line index.
pub fn parse_row(row: usize, line: &str) -> Result<Sample, DataLoadError> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() != COLUMNS.len() {
        return Err(DataLoadError::Row {
            row,
            field: "*",
            reason: format!("expected {} columns, found {}", COLUMNS.len(), fields.len()),
        });
    }

    let id = match fields[0] {
        "" => BlockId::EMPTY,
        raw => raw.parse().map_err(|e| DataLoadError::Row {
            row,
            field: COLUMNS[0],
            reason: format!("{e}"),
        })?,
    };
    let height = parse_u64(row, COLUMNS[1], fields[1])?;
    let time = parse_u64(row, COLUMNS[2], fields[2])?;
    let mut complexity = Dimensions::EMPTY;
    for d in Dimension::ALL {
        complexity[d] = parse_u64(row, COLUMNS[3 + d.index()], fields[3 + d.index()])?;
    }

    Ok(Sample::new(height, time, complexity).with_id(id))
}

/// Parse a whole CSV document into a validated record store.
pub fn parse_records(content: &str) -> Result<RecordStore, DataLoadError> {
    let mut samples = Vec::new();
    for (row, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        samples.push(parse_row(row, line)?);
    }
    debug!(samples = samples.len(), "parsed block records");
    Ok(RecordStore::new(samples)?)
}

/// Read and parse the record CSV at `path`.
pub fn load_records(path: &Path) -> Result<RecordStore, DataLoadError> {
    let store = parse_records(&read_file(path)?)?;
    info!(
        file = %path.display(),
        blocks = store.len(),
        first_height = store.first().map(|s| s.height),
        last_height = store.last().map(|s| s.height),
        "loaded block records"
    );
    Ok(store)
}

// ===========================================================================
// Tests
// ===========================================================================
