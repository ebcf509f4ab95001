use thiserror::Error;

/// Errors surfaced by the logging facade.
#[derive(Debug, Error)]
pub enum FacadeError {
    /// A raw category value outside the closed set. Programming error.
    #[error("invalid log category: {0}")]
    InvalidCategory(String),

    /// A notification listener failed; later listeners were not invoked.
    #[error("{channel} listener #{index} failed")]
    Listener {
        channel: &'static str,
        index: usize,
        #[source]
        source: anyhow::Error,
    },

    #[error("logger already initialized")]
    AlreadyInitialized,
}
