use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScoringError>;

#[derive(Error, Debug)]
pub enum ScoringError {
    #[error("Invalid score profile for slot {slot}: minimum {minimum} exceeds base {base}")]
    InvalidProfile { slot: usize, base: i64, minimum: i64 },

    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
