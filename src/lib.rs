//! Retro-Search library for locating game variables in emulator memory
//!
//! Given successive snapshots of an emulated machine's RAM, a
//! [`SearchEngine`](memory::SearchEngine) narrows down the set of addresses
//! that could hold a quantity such as a score or a life counter until a
//! single (address, type) pair is left.

pub mod config;
pub mod core;
pub mod memory;

// Re-export main types from core module
pub use core::types::{
    Address, ByteOrder, Candidate, ComparisonOperator, DataType, Kind, Operand, SearchError,
    SearchResult, TypedResult, Value,
};

pub use memory::{
    MemorySnapshot, ScanOptions, SearchEngine, SearchHandle, SearchRegistry, Snapshot, Variable,
};
