//! Output module for exporting extracted records
//!
//! This module handles writing the final ordered record list to disk. The
//! sink refuses an empty record list; an export either carries data or the
//! run should have failed earlier.

mod csv_output;

pub use csv_output::write_records;

use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("The record list is empty, nothing to write")]
    Empty,

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
