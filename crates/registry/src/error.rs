//! The module contains the errors the registry can surface.
//!
//! Validation failures ([`EmptyName`], [`NegativeDetailAmount`],
//! [`DetailSumMismatch`]) are caller-data problems and abort the write that
//! contains them. [`InvalidBatchSize`] is a misuse of the push options.
//! Storage errors pass through unchanged as [`Database`].
//!
//! [`EmptyName`]: RegistryError::EmptyName
//! [`NegativeDetailAmount`]: RegistryError::NegativeDetailAmount
//! [`DetailSumMismatch`]: RegistryError::DetailSumMismatch
//! [`InvalidBatchSize`]: RegistryError::InvalidBatchSize
//! [`Database`]: RegistryError::Database
use sea_orm::DbErr;
use thiserror::Error;

/// Registry custom errors.
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("{0} cannot have an empty name")]
    EmptyName(&'static str),
    #[error("detail amount cannot be negative, got {0}")]
    NegativeDetailAmount(i64),
    #[error("transaction details don't add up, expected {expected} but got {actual}")]
    DetailSumMismatch { expected: i64, actual: i64 },
    #[error("batch size must be a positive number")]
    InvalidBatchSize,
    #[error("malformed stored record: {0}")]
    Malformed(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for RegistryError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::EmptyName(a), Self::EmptyName(b)) => a == b,
            (Self::NegativeDetailAmount(a), Self::NegativeDetailAmount(b)) => a == b,
            (
                Self::DetailSumMismatch {
                    expected: a,
                    actual: b,
                },
                Self::DetailSumMismatch {
                    expected: c,
                    actual: d,
                },
            ) => a == c && b == d,
            (Self::InvalidBatchSize, Self::InvalidBatchSize) => true,
            (Self::Malformed(a), Self::Malformed(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
