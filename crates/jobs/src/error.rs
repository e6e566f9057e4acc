use thiserror::Error;

pub type Result<T> = std::result::Result<T, JobError>;

#[derive(Error, Debug)]
pub enum JobError {
    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Scoring error: {0}")]
    Scoring(#[from] scoring::ScoringError),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(#[from] validator::ValidationErrors),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Not visible: {0}")]
    NotVisible(String),

    #[error("Unsupported contest rule: {0}")]
    UnsupportedRule(String),

    #[error("Job cancelled")]
    Cancelled,
}
