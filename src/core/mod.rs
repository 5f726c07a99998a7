//! Core module containing fundamental types for Retro-Search
//!
//! This module provides the building blocks used throughout the crate,
//! including address handling, typed scalar decoding, comparison operators
//! and error types.

pub mod types;

// Re-export commonly used types for convenience
pub use types::{
    Address, Candidate, ComparisonOperator, DataType, SearchError, SearchResult, TypedResult,
    Value,
};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const AUTHORS: &str = env!("CARGO_PKG_AUTHORS");
