pub mod annotated;
pub mod fasta;

use thiserror::Error;
use tropism_core::UsageError;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Usage(#[from] UsageError),
}
