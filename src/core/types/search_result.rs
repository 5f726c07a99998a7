//! Candidate and result types produced by a search

use super::{Address, DataType, Value};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One (address, type) pair still consistent with every search so far
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub address: Address,
    pub data_type: DataType,
    /// Value at `address` in the most recently scanned snapshot
    pub last_value: Value,
}

impl Candidate {
    /// Creates a new candidate
    pub fn new(address: Address, data_type: DataType, last_value: Value) -> Self {
        Candidate {
            address,
            data_type,
            last_value,
        }
    }

    /// Projects the candidate to its externally visible result
    pub fn result(&self) -> TypedResult {
        TypedResult::new(self.address, self.data_type)
    }
}

/// Read-only answer from a search: where a value lives and how to read it.
///
/// This is a point-in-time answer, not a live handle into the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TypedResult {
    pub address: Address,
    #[serde(rename = "type")]
    pub data_type: DataType,
}

impl TypedResult {
    /// Creates a new typed result
    pub fn new(address: Address, data_type: DataType) -> Self {
        TypedResult { address, data_type }
    }
}

impl fmt::Display for TypedResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{:#x}", self.data_type, self.address.as_usize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_projection() {
        let data_type: DataType = "<u2".parse().unwrap();
        let candidate = Candidate::new(Address::new(0x20), data_type, Value::UInt(300));
        let result = candidate.result();
        assert_eq!(result.address, Address::new(0x20));
        assert_eq!(result.data_type, data_type);
        assert_eq!(result.to_string(), "<u2@0x20");
    }

    #[test]
    fn test_result_json_shape() {
        let result = TypedResult::new(Address::new(16), ">i4".parse().unwrap());
        let json = serde_json::to_value(result).unwrap();
        assert_eq!(json, serde_json::json!({"address": 16, "type": ">i4"}));
    }
}
