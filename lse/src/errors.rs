use thiserror::Error;

/// A result type for level set estimation errors
pub type Result<T> = std::result::Result<T, LseError>;

/// An error for active set selection of level set estimation
#[derive(Error, Debug)]
pub enum LseError {
    /// When configuration is invalid
    #[error("Invalid configuration: {0}")]
    InvalidConfigError(String),
    /// When gaussian process computation fails
    #[error("GP error")]
    GpError(#[from] lsebox_gp::GpError),
    /// When an invalid value is encountered
    #[error("Value error: {0}")]
    InvalidValue(String),
    /// When IO fails
    #[error("IO error")]
    IoError(#[from] std::io::Error),
    /// When csv read or write fails
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    /// When json serialization fails
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}
