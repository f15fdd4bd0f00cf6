//! The module contains the error the engine can throw.
//!
//! The errors are:
//!
//! - [`InvalidFormat`] thrown when a user supplied argument (history range,
//!   amount, callback token) does not follow the expected grammar.
//! - [`Database`] wraps any failure of the persistence backend.
//!
//!  [`InvalidFormat`]: EngineError::InvalidFormat
//!  [`Database`]: EngineError::Database
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidFormat(a), Self::InvalidFormat(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
