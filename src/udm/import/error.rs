use std::path::PathBuf;

use thiserror::Error;

use crate::udm::import::directory::DirectoryError;
use crate::udm::import::model::Action;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, ImportError>;

/// Error type covering every condition that aborts an import run.
///
/// Per-row failures that only skip a single row never surface as an
/// `ImportError`; see [`RowFailure`](crate::udm::import::executor::RowFailure).
#[derive(Debug, Error)]
pub enum ImportError {
    /// Wrapper for IO failures such as reading the CSV file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when the CSV reader rejects a record.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Raised when a JSON document cannot be parsed or written.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Raised when the user provides a path that does not exist.
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when no delimiter can be derived from the first line.
    #[error("Could not determine CSV dialect. Error: {0}")]
    DialectDetection(String),

    /// Raised when the file has a header but no data rows.
    #[error("File contains no data: {0}")]
    EmptyInput(PathBuf),

    /// Raised when a column is present that the action does not allow.
    #[error("Column {column:?} not allowed with operation '{action}'.")]
    InvalidColumn { column: String, action: Action },

    /// Raised when neither `dn` nor the identifying property is present.
    #[error("Column {identifying_property:?} or \"dn\" required with operation '{action}'.")]
    MissingIdentifier {
        identifying_property: String,
        action: Action,
    },

    /// Raised when header columns do not match known module properties.
    #[error("Unknown properties: {columns:?}. Use \"udm {module}\" to see known attributes.")]
    UnknownColumns { module: String, columns: Vec<String> },

    /// Errors bubbled up from the directory service outside the row loop.
    #[error(transparent)]
    Directory(#[from] DirectoryError),

    /// Raised when a row hits a condition that makes the remaining rows futile.
    #[error("{source}\nRow {row}: {fields}")]
    Aborted {
        row: usize,
        fields: String,
        #[source]
        source: DirectoryError,
    },

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}
