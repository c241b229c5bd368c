//! Error types for the EcoFlow core.

/// Core error type for client configuration.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A required environment variable is not set.
    #[error("missing environment variable: {0}")]
    MissingEnv(&'static str),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Convenience result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
