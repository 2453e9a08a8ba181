use thiserror::Error;

/// Failure taxonomy of the grading pipeline. `Unauthenticated` and
/// `InvalidRequest` surface to the caller verbatim; the remaining variants
/// are logged with full detail server-side and collapsed to one generic
/// internal error at the handler boundary, so clients cannot branch on
/// internal causes.
#[derive(Debug, Error)]
pub enum GradingError {
    #[error("unauthenticated")]
    Unauthenticated,

    #[error("{0}")]
    InvalidRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("persistence failure: {0}")]
    Persistence(#[source] anyhow::Error),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl GradingError {
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }
}
