//! Memory search module
//!
//! This module provides the moving parts of an incremental memory search:
//! - Read-only snapshots of emulated memory
//! - The candidate-narrowing search engine
//! - A registry of named searches and the variables they resolve to

pub mod registry;
pub mod search;
pub mod snapshot;

pub use registry::{SearchHandle, SearchRegistry, Variable};
pub use search::{ScanOptions, SearchEngine};
pub use snapshot::{MemorySnapshot, Snapshot, SnapshotReader};
