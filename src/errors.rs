use thiserror::Error;

/// A result type for Morris screening operations
pub type Result<T> = std::result::Result<T, ScreeningError>;

/// Output of a single model evaluation.
///
/// Failures reported by the model function are propagated verbatim through
/// [`ScreeningError::ModelFailure`]; the library never retries, caches or
/// masks model calls.
pub type ModelResult<F> = std::result::Result<F, Box<dyn std::error::Error + Send + Sync>>;

/// An error raised by trajectory generation, selection or the screening driver
#[derive(Error, Debug)]
pub enum ScreeningError {
    /// When a parameter value is invalid
    #[error("InvalidValue error: {0}")]
    InvalidValue(String),
    /// When a coordinate ends up with no elementary effect at all.
    /// Surfaced explicitly since a silent zero would mask a sampling defect.
    #[error("Empty effect set: no elementary effect collected for coordinate {0}")]
    EmptyEffects(usize),
    /// When the user-supplied model function fails
    #[error("Model evaluation error: {0}")]
    ModelFailure(#[source] Box<dyn std::error::Error + Send + Sync>),
}
