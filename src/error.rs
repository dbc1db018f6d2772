use thiserror::Error;

#[derive(Error, Debug)]
pub enum EvotestError {
    #[error("Position {position} out of range for sequence of size {size}")]
    InvalidPosition { position: usize, size: usize },

    #[error("Statement at position {position} references value {input}, which does not exist yet")]
    ForwardReference { position: usize, input: usize },

    #[error("Construction failed: {0}")]
    Construction(String),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serde error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EvotestError>;
