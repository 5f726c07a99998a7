//! Core type definitions for Retro-Search
//!
//! This module contains the value types shared by the search engine:
//! addresses, data types, scalar values, comparison operators, search
//! results and the error type.

mod address;
mod data_type;
mod error;
mod operator;
mod search_result;
mod value;

// Re-export all public types
pub use address::Address;
pub use data_type::{ByteOrder, DataType, Kind};
pub use error::{SearchError, SearchResult};
pub use operator::{ComparisonOperator, Operand};
pub use search_result::{Candidate, TypedResult};
pub use value::Value;
