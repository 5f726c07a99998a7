//! Read-only views of emulated memory

use crate::core::types::{Address, DataType, SearchError, SearchResult, Value};

/// A byte-addressable view of the emulated machine's memory at one instant.
///
/// Addresses are offsets in `[0, len())`. The view must not change while a
/// search pass is reading it.
pub trait MemorySnapshot: Sync {
    /// Size of the addressable range in bytes
    fn len(&self) -> usize;

    /// Returns `size` bytes starting at `address`, or `OutOfRange` if any of
    /// them fall outside the snapshot
    fn bytes(&self, address: Address, size: usize) -> SearchResult<&[u8]>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Decodes a value of `data_type` at `address`
    fn read_value(&self, address: Address, data_type: DataType) -> SearchResult<Value> {
        data_type.decode(self.bytes(address, data_type.width())?)
    }
}

fn slice_at(memory: &[u8], address: Address, size: usize) -> SearchResult<&[u8]> {
    address
        .offset(size)
        .and_then(|end| memory.get(address.as_usize()..end.as_usize()))
        .ok_or_else(|| SearchError::out_of_range(address, size, memory.len()))
}

impl MemorySnapshot for [u8] {
    fn len(&self) -> usize {
        <[u8]>::len(self)
    }

    fn bytes(&self, address: Address, size: usize) -> SearchResult<&[u8]> {
        slice_at(self, address, size)
    }
}

impl MemorySnapshot for Vec<u8> {
    fn len(&self) -> usize {
        self.as_slice().len()
    }

    fn bytes(&self, address: Address, size: usize) -> SearchResult<&[u8]> {
        slice_at(self, address, size)
    }
}

impl<T: MemorySnapshot + ?Sized> MemorySnapshot for &T {
    fn len(&self) -> usize {
        (**self).len()
    }

    fn bytes(&self, address: Address, size: usize) -> SearchResult<&[u8]> {
        (**self).bytes(address, size)
    }
}

/// Owned copy of emulator RAM tagged with the frame it was taken at
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    data: Vec<u8>,
    frame: u64,
}

impl Snapshot {
    /// Creates a snapshot from a copy of emulator memory
    pub fn new(data: Vec<u8>, frame: u64) -> Self {
        Snapshot { data, frame }
    }

    /// Copies `memory` into a new snapshot
    pub fn capture(memory: &[u8], frame: u64) -> Self {
        Snapshot::new(memory.to_vec(), frame)
    }

    /// Frame counter the snapshot was taken at
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Replaces the contents with a newer copy of memory
    pub fn update(&mut self, memory: &[u8], frame: u64) {
        self.data.clear();
        self.data.extend_from_slice(memory);
        self.frame = frame;
    }
}

impl MemorySnapshot for Snapshot {
    fn len(&self) -> usize {
        self.data.len()
    }

    fn bytes(&self, address: Address, size: usize) -> SearchResult<&[u8]> {
        slice_at(&self.data, address, size)
    }
}

/// Convenience reads over any snapshot
pub struct SnapshotReader<'a, S: MemorySnapshot + ?Sized> {
    snapshot: &'a S,
}

impl<'a, S: MemorySnapshot + ?Sized> SnapshotReader<'a, S> {
    /// Create a new reader over `snapshot`
    pub fn new(snapshot: &'a S) -> Self {
        SnapshotReader { snapshot }
    }

    /// Read raw bytes from memory
    pub fn read_raw(&self, address: Address, size: usize) -> SearchResult<Vec<u8>> {
        Ok(self.snapshot.bytes(address, size)?.to_vec())
    }

    /// Read a value by type
    pub fn read_value(&self, address: Address, data_type: DataType) -> SearchResult<Value> {
        self.snapshot.read_value(address, data_type)
    }

    /// Read multiple values in batch
    pub fn read_batch(&self, reads: &[(Address, DataType)]) -> Vec<SearchResult<Value>> {
        reads
            .iter()
            .map(|&(address, data_type)| self.read_value(address, data_type))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_bounds() {
        let memory = vec![1u8, 2, 3, 4];
        assert_eq!(memory.bytes(Address::new(1), 3).unwrap(), &[2, 3, 4]);
        assert_eq!(memory.bytes(Address::new(4), 0).unwrap(), &[] as &[u8]);

        let err = memory.bytes(Address::new(2), 4).unwrap_err();
        assert!(matches!(err, SearchError::OutOfRange { size: 4, len: 4, .. }));
        assert!(memory.bytes(Address::new(usize::MAX), 2).is_err());
    }

    #[test]
    fn test_read_value_past_end() {
        let memory: &[u8] = &[0xFF, 0xFF, 0xFF];
        let u2: DataType = "<u2".parse().unwrap();
        assert_eq!(memory.read_value(Address::new(1), u2).unwrap(), Value::UInt(0xFFFF));
        assert!(matches!(
            memory.read_value(Address::new(2), u2),
            Err(SearchError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_owned_snapshot() {
        let mut snapshot = Snapshot::capture(&[7, 0, 9], 10);
        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot.frame(), 10);

        snapshot.update(&[1, 2], 11);
        assert_eq!(snapshot.as_slice(), &[1, 2]);
        assert_eq!(snapshot.frame(), 11);
        assert!(!snapshot.is_empty());
        assert!(Snapshot::default().is_empty());
    }

    #[test]
    fn test_reader_batch() {
        let snapshot = Snapshot::capture(&[0x01, 0x02, 0x03], 0);
        let reader = SnapshotReader::new(&snapshot);
        let u1: DataType = "|u1".parse().unwrap();
        let be2: DataType = ">u2".parse().unwrap();

        assert_eq!(reader.read_raw(Address::new(1), 2).unwrap(), vec![2, 3]);

        let results = reader.read_batch(&[
            (Address::new(0), u1),
            (Address::new(1), be2),
            (Address::new(2), be2),
        ]);
        assert_eq!(results.len(), 3);
        assert_eq!(*results[0].as_ref().unwrap(), Value::UInt(1));
        assert_eq!(*results[1].as_ref().unwrap(), Value::UInt(0x0203));
        assert!(results[2].is_err());
    }
}
