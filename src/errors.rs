use finansys_config::ConfigError;
use finansys_core::CoreError;
use thiserror::Error;

/// Failures surfaced by the composition root and the front end.
#[derive(Debug, Error)]
pub enum FinansysError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("outbox worker stopped unexpectedly")]
    WorkerPanicked,
}
