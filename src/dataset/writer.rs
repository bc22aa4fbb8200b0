use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::io::Write;
use std::path::Path;

use super::generator::DatasetRow;

/// Write rows as CSV (with a header row) to any writer.
pub fn write_rows<W: Write>(writer: W, rows: &[DatasetRow]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer.serialize(row).context("Failed to serialize dataset row")?;
    }
    csv_writer.flush().context("Failed to flush dataset")?;
    Ok(())
}

/// Save rows to a CSV file atomically.
///
/// Nothing is written when `rows` is empty, so an existing file is left as is.
pub fn save_dataset(path: &Path, rows: &[DatasetRow]) -> Result<()> {
    if rows.is_empty() {
        return Ok(());
    }

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;

    write_rows(&mut file, rows)?;

    file.commit()
        .with_context(|| format!("Failed to save dataset to {}", path.display()))?;

    Ok(())
}
