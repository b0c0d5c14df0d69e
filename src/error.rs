use thiserror::Error;

/// Errors produced by a k-means run. Every variant is fatal to the run it occurs in;
/// no round is ever applied from an incomplete set of partial aggregates.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("table has no rows")]
    EmptyTable,
    #[error("partition {partition} is ragged: column {column} has {found} rows, expected {expected}")]
    RaggedPartition { partition: usize, column: usize, expected: usize, found: usize },
    #[error("dimension mismatch: expected {expected} columns, found {found}")]
    DimensionMismatch { expected: usize, found: usize },
    #[error("partial aggregates have different shapes ({0}x{1} vs {2}x{3})")]
    ShapeMismatch(usize, usize, usize, usize),
    #[error("row {row} is out of range (table has {row_count} rows)")]
    RowOutOfRange { row: usize, row_count: usize },
    #[error("task for partition {partition} failed: {source}")]
    PartitionFailed { partition: usize, #[source] source: Box<Error> },
    #[error("executor returned {found} results for {expected} partitions")]
    MissingResults { expected: usize, found: usize },
    #[error("run was cancelled")]
    Cancelled,
}

/// Convenient alias for results produced by this crate.
pub type Result<T> = std::result::Result<T, Error>;
