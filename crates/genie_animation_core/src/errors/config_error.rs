use thiserror::Error;

/// Errors produced while reading an avatar rig configuration
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read rig config: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not parse rig config RON: {0}")]
    Ron(#[from] ron::error::SpannedError),
}
