use thiserror::Error;

/// Failures raised by catalog loading, index building and ranking.
///
/// "No title matched" and "nothing survived the filters" are not errors; those
/// come back as `None` or an empty result.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The catalog input lacks required columns (names sorted).
    #[error("catalog missing columns: {missing:?}")]
    SchemaValidation { missing: Vec<String> },

    /// A vector index cannot be built from this catalog.
    #[error("invalid catalog: {0}")]
    InvalidCatalog(String),

    /// A row index does not address a row of the index matrix.
    #[error("row {row} out of range for index with {rows} rows")]
    RowIndexOutOfRange { row: usize, rows: usize },

    /// A single input record could not be normalized.
    #[error("invalid record at line {line}: {message}")]
    InvalidRecord { line: u64, message: String },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
