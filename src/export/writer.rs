//! CSV writer for extracted records.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::Result;
use crate::export::record::{ExtractedRecord, COLUMNS};
use crate::fs::paths::ensure_parent_dir;

/// UTF-8 byte order mark, so spreadsheet tools detect the encoding.
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Write records to `path` as CSV, header first, in the given order.
pub fn write_records(records: &[ExtractedRecord], path: &Path) -> Result<()> {
    ensure_parent_dir(path)?;

    let mut file = File::create(path)?;
    file.write_all(UTF8_BOM)?;

    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::CRLF)
        .from_writer(file);

    wtr.write_record(COLUMNS)?;
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;

    tracing::debug!("Wrote {} rows to {}", records.len(), path.display());
    Ok(())
}
