//! CSV export sink

use crate::output::OutputError;
use crate::search::ProductRecord;
use std::path::Path;

/// Writes the extracted records to a CSV file
///
/// The header row comes from the record's field names; columns are
/// `path, selling_price, old_price, rating`. Absent numeric fields render as
/// `NaN`, matching their in-memory sentinel.
///
/// # Arguments
///
/// * `path` - Destination file path
/// * `records` - The records to write
///
/// # Returns
///
/// * `Ok(())` - File written and flushed
/// * `Err(OutputError::Empty)` - Refused to write zero records
/// * `Err(OutputError)` - CSV or IO failure
pub fn write_records(path: &Path, records: &[ProductRecord]) -> Result<(), OutputError> {
    if records.is_empty() {
        return Err(OutputError::Empty);
    }

    let mut writer = csv::Writer::from_path(path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    Ok(())
}
