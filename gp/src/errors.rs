use thiserror::Error;

/// A result type for active set gaussian process computations
pub type Result<T> = std::result::Result<T, GpError>;

/// An error when growing an [`ActiveSet`](crate::ActiveSet) or solving its linear system
#[derive(Error, Debug)]
pub enum GpError {
    #[error(transparent)]
    /// When linear algebra computation fails (e.g. kernel matrix not positive definite)
    LinalgError(#[from] linfa_linalg::LinalgError),
    /// When active set is used before any point was absorbed
    #[error("Empty active set: {0}")]
    EmptyActiveSetError(String),
    /// When absorbing a point in an active set which reached its capacity
    #[error("Active set full: capacity {0} reached")]
    ActiveSetFullError(usize),
    /// When error due to a bad value
    #[error("InvalidValue error: {0}")]
    InvalidValueError(String),
}
