use crate::config::ConfigError;
use crate::query::QueryError;
use thiserror::Error;

/// Startup failures of the server binary.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("query client error: {0}")]
    Query(#[from] QueryError),
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}
