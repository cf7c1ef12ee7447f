use thiserror::Error;

use crate::scraper::DriverError;

#[derive(Error, Debug)]
pub enum HarvestError {
    #[error("Browser driver error: {0}")]
    Driver(#[from] DriverError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid run options: {0}")]
    InvalidOptions(String),

    #[error("{0}")]
    Other(String),
}

impl HarvestError {
    /// The driver fault behind this error, if any.
    pub fn driver_fault(&self) -> Option<&DriverError> {
        match self {
            HarvestError::Driver(e) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, HarvestError>;
