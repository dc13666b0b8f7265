use thiserror::Error;

/// Failures the table core can surface to its caller.
///
/// None of these are fatal: a malformed row becomes an error placeholder and
/// the rest of the table keeps rendering.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("malformed row: missing required field '{field}'")]
    MalformedRow { field: &'static str },

    #[error("sort view '{0}' not present in dataset")]
    UnknownSortView(String),

    #[error("failed to serialize row: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type TableResult<T> = std::result::Result<T, TableError>;
