use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
