//! Custom error types for Retro-Search

use std::fmt;
use thiserror::Error;

use super::{Address, DataType};

/// Main error type for search operations
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Invalid memory address: {0}")]
    InvalidAddress(String),

    #[error("Read of {size} bytes at {address} is out of range (snapshot size {len})")]
    OutOfRange {
        address: Address,
        size: usize,
        len: usize,
    },

    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: DataType, actual: String },

    #[error("Ambiguous result: {0} candidates remain")]
    AmbiguousResult(usize),

    #[error("Empty result: no candidates remain")]
    EmptyResult,

    #[error("Search not found: {0}")]
    SearchNotFound(String),

    #[error("Variable not found: {0}")]
    VariableNotFound(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for search operations
pub type SearchResult<T> = Result<T, SearchError>;

impl SearchError {
    /// Creates an invalid configuration error
    pub fn invalid_configuration(reason: impl Into<String>) -> Self {
        SearchError::InvalidConfiguration(reason.into())
    }

    /// Creates the error reported for an unrecognized operator token
    pub fn unknown_operator(token: impl fmt::Display) -> Self {
        SearchError::InvalidConfiguration(format!("unknown operator '{}'", token))
    }

    /// Creates an out of range error for a read past the end of a snapshot
    pub fn out_of_range(address: Address, size: usize, len: usize) -> Self {
        SearchError::OutOfRange { address, size, len }
    }

    /// Creates a type mismatch error
    pub fn type_mismatch(expected: DataType, actual: impl fmt::Display) -> Self {
        SearchError::TypeMismatch {
            expected,
            actual: actual.to_string(),
        }
    }
}
