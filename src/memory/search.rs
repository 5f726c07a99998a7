//! Incremental memory search
//!
//! A [`SearchEngine`] locates the addresses that could hold some game-state
//! quantity without knowing where it is stored. An initial [`search`] scans
//! the whole snapshot once per requested [`DataType`] for an exact value, and
//! each [`delta_search`] afterwards keeps only the candidates whose value
//! still satisfies a comparison. Repeat until one candidate is left.
//!
//! [`search`]: SearchEngine::search
//! [`delta_search`]: SearchEngine::delta_search

use crate::core::types::{
    Address, Candidate, ComparisonOperator, DataType, SearchError, SearchResult, TypedResult,
    Value,
};
use crate::memory::snapshot::MemorySnapshot;
use rayon::prelude::*;
use std::collections::BTreeMap;
use tracing::{debug, trace, warn};

/// Options for the initial full-memory scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    /// Only addresses that are multiples of this are scanned (1, 2, 4, 8)
    pub alignment: usize,
    /// Run the per-type passes on the rayon thread pool
    pub parallel: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        ScanOptions {
            alignment: 1,
            parallel: false,
        }
    }
}

impl ScanOptions {
    /// Largest supported scan alignment
    pub const MAX_ALIGNMENT: usize = 8;

    /// Checks that the alignment is one of 1, 2, 4 or 8
    pub fn validate(&self) -> SearchResult<()> {
        if !self.alignment.is_power_of_two() || self.alignment > Self::MAX_ALIGNMENT {
            return Err(SearchError::invalid_configuration(format!(
                "scan alignment must be 1, 2, 4 or 8, got {}",
                self.alignment
            )));
        }
        Ok(())
    }
}

type CandidateKey = (Address, DataType);

/// Candidate set for one named search
#[derive(Debug, Clone)]
pub struct SearchEngine {
    types: Vec<DataType>,
    options: ScanOptions,
    candidates: BTreeMap<CandidateKey, Value>,
    searched: bool,
}

impl SearchEngine {
    /// Creates an engine testing each of `types`.
    ///
    /// Fails with `InvalidConfiguration` if `types` is empty.
    pub fn new<I>(types: I) -> SearchResult<Self>
    where
        I: IntoIterator<Item = DataType>,
    {
        let mut types: Vec<DataType> = types.into_iter().collect();
        types.sort();
        types.dedup();
        if types.is_empty() {
            return Err(SearchError::invalid_configuration(
                "a search needs at least one data type",
            ));
        }

        Ok(SearchEngine {
            types,
            options: ScanOptions::default(),
            candidates: BTreeMap::new(),
            searched: false,
        })
    }

    /// Creates an engine from textual type specifiers such as `"<u4"`
    pub fn from_specifiers<S: AsRef<str>>(specifiers: &[S]) -> SearchResult<Self> {
        let types = specifiers
            .iter()
            .map(|s| s.as_ref().parse())
            .collect::<SearchResult<Vec<DataType>>>()?;
        Self::new(types)
    }

    /// Sets the scan options used by the initial search
    pub fn with_options(mut self, options: ScanOptions) -> SearchResult<Self> {
        options.validate()?;
        self.options = options;
        Ok(self)
    }

    /// Data types tested by this engine
    pub fn types(&self) -> &[DataType] {
        &self.types
    }

    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    /// Whether the initial search has run
    pub fn is_searched(&self) -> bool {
        self.searched
    }

    /// Scans the whole snapshot for `target` under every data type.
    ///
    /// Any existing candidates are discarded first, so calling this again
    /// re-derives the set from scratch.
    pub fn search<S, V>(&mut self, snapshot: &S, target: V) -> SearchResult<()>
    where
        S: MemorySnapshot + ?Sized,
        V: Into<Value>,
    {
        let target = target.into();
        if self.searched {
            warn!(
                previous = self.candidates.len(),
                "Repeated initial search, re-deriving candidates from a full scan"
            );
        }

        let alignment = self.options.alignment;
        let passes: Vec<Vec<(CandidateKey, Value)>> = if self.options.parallel {
            self.types
                .par_iter()
                .map(|&data_type| scan_type(snapshot, data_type, target, alignment))
                .collect::<SearchResult<_>>()?
        } else {
            self.types
                .iter()
                .map(|&data_type| scan_type(snapshot, data_type, target, alignment))
                .collect::<SearchResult<_>>()?
        };

        self.candidates = passes.into_iter().flatten().collect();
        self.searched = true;

        debug!(
            value = %target,
            memory = snapshot.len(),
            types = self.types.len(),
            candidates = self.candidates.len(),
            "Initial search complete"
        );
        Ok(())
    }

    /// Narrows the candidate set with `op`.
    ///
    /// Every surviving candidate is re-read from `snapshot` and tested
    /// against its cached value (delta operators) or `reference` (relational
    /// operators). Survivors have their cached value updated. On error the
    /// candidate set is left exactly as it was.
    pub fn delta_search<S>(
        &mut self,
        snapshot: &S,
        op: ComparisonOperator,
        reference: Option<Value>,
    ) -> SearchResult<()>
    where
        S: MemorySnapshot + ?Sized,
    {
        if op.requires_reference() && reference.is_none() {
            return Err(SearchError::invalid_configuration(format!(
                "operator '{}' requires a reference value",
                op
            )));
        }

        let before = self.candidates.len();
        let mut survivors = Vec::with_capacity(before);
        for (&(address, data_type), &previous) in &self.candidates {
            let current = snapshot.read_value(address, data_type)?;
            if data_type.compare(op, previous, current, reference)? {
                survivors.push(((address, data_type), current));
            } else {
                trace!(%address, %data_type, %previous, %current, "Eliminated candidate");
            }
        }

        self.candidates = survivors.into_iter().collect();

        debug!(
            op = %op,
            before,
            after = self.candidates.len(),
            "Delta search complete"
        );
        Ok(())
    }

    /// Parses `op` and narrows with it. An unknown token fails before any
    /// candidate is touched.
    pub fn delta_search_str<S>(
        &mut self,
        snapshot: &S,
        op: &str,
        reference: Option<Value>,
    ) -> SearchResult<()>
    where
        S: MemorySnapshot + ?Sized,
    {
        let op: ComparisonOperator = op.parse()?;
        self.delta_search(snapshot, op, reference)
    }

    /// Number of live candidates
    pub fn num_results(&self) -> usize {
        self.candidates.len()
    }

    pub fn has_unique_result(&self) -> bool {
        self.num_results() == 1
    }

    /// The single remaining candidate.
    ///
    /// Fails with `EmptyResult` or `AmbiguousResult` unless exactly one
    /// candidate is left.
    pub fn unique_result(&self) -> SearchResult<TypedResult> {
        let mut keys = self.candidates.keys();
        match (keys.next(), keys.next()) {
            (Some(&(address, data_type)), None) => Ok(TypedResult::new(address, data_type)),
            (None, _) => Err(SearchError::EmptyResult),
            (Some(_), Some(_)) => Err(SearchError::AmbiguousResult(self.candidates.len())),
        }
    }

    /// All live results ordered by address, then type
    pub fn typed_results(&self) -> Vec<TypedResult> {
        self.candidates
            .keys()
            .map(|&(address, data_type)| TypedResult::new(address, data_type))
            .collect()
    }

    /// Iterates over the live candidates with their cached values
    pub fn candidates(&self) -> impl Iterator<Item = Candidate> + '_ {
        self.candidates
            .iter()
            .map(|(&(address, data_type), &value)| Candidate::new(address, data_type, value))
    }

    /// Drops every candidate, returning the engine to its unsearched state
    pub fn clear(&mut self) {
        self.candidates.clear();
        self.searched = false;
    }
}

fn scan_type<S>(
    snapshot: &S,
    data_type: DataType,
    target: Value,
    alignment: usize,
) -> SearchResult<Vec<(CandidateKey, Value)>>
where
    S: MemorySnapshot + ?Sized,
{
    let width = data_type.width();
    let len = snapshot.len();
    if len < width {
        return Ok(Vec::new());
    }

    let target = data_type.coerce(target);
    let memory = snapshot.bytes(Address::new(0), len)?;
    let mut found = Vec::new();
    for offset in (0..=len - width).step_by(alignment) {
        let value = data_type.decode(&memory[offset..offset + width])?;
        if value.numeric_eq(&target) {
            found.push(((Address::new(offset), data_type), value));
        }
    }

    trace!(%data_type, found = found.len(), "Scanned memory for type");
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::snapshot::Snapshot;

    fn dt(s: &str) -> DataType {
        s.parse().unwrap()
    }

    #[test]
    fn test_rejects_empty_types() {
        let err = SearchEngine::new(Vec::new()).unwrap_err();
        assert!(matches!(err, SearchError::InvalidConfiguration(_)));

        let empty: [&str; 0] = [];
        assert!(SearchEngine::from_specifiers(&empty).is_err());
    }

    #[test]
    fn test_duplicate_types_collapse() {
        let engine = SearchEngine::from_specifiers(&["<u1", "|u1", ">u2"]).unwrap();
        assert_eq!(engine.types(), &[dt("|u1"), dt(">u2")]);
    }

    #[test]
    fn test_unsearched_engine_is_empty() {
        let engine = SearchEngine::new([dt("|u1")]).unwrap();
        assert!(!engine.is_searched());
        assert_eq!(engine.num_results(), 0);
        assert!(!engine.has_unique_result());
        assert!(matches!(engine.unique_result(), Err(SearchError::EmptyResult)));
    }

    #[test]
    fn test_search_finds_every_type() {
        // 0x0102 little endian at 0, big endian at 2
        let memory = vec![0x02u8, 0x01, 0x01, 0x02];
        let mut engine = SearchEngine::new([dt("<u2"), dt(">u2"), dt("|u1")]).unwrap();
        engine.search(&memory, 0x0102u16).unwrap();

        assert_eq!(
            engine.typed_results(),
            vec![
                TypedResult::new(Address::new(0), dt("<u2")),
                TypedResult::new(Address::new(2), dt(">u2")),
            ]
        );
    }

    #[test]
    fn test_search_with_alignment() {
        let memory = vec![5u8, 5, 5, 5, 5, 5];
        let mut engine = SearchEngine::new([dt("|u1")])
            .unwrap()
            .with_options(ScanOptions {
                alignment: 2,
                parallel: false,
            })
            .unwrap();
        engine.search(&memory, 5).unwrap();
        let addresses: Vec<usize> = engine
            .typed_results()
            .iter()
            .map(|r| r.address.as_usize())
            .collect();
        assert_eq!(addresses, vec![0, 2, 4]);
    }

    #[test]
    fn test_invalid_alignment() {
        for alignment in [0, 3, 16] {
            let engine = SearchEngine::new([dt("|u1")]).unwrap();
            let err = engine
                .with_options(ScanOptions {
                    alignment,
                    parallel: false,
                })
                .unwrap_err();
            assert!(matches!(err, SearchError::InvalidConfiguration(_)));
        }

        let options = ScanOptions {
            alignment: ScanOptions::MAX_ALIGNMENT,
            parallel: false,
        };
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_memory_smaller_than_type() {
        let memory = vec![1u8];
        let mut engine = SearchEngine::new([dt("<u4")]).unwrap();
        engine.search(&memory, 1).unwrap();
        assert!(engine.is_searched());
        assert_eq!(engine.num_results(), 0);
    }

    #[test]
    fn test_delta_updates_last_value() {
        let mut engine = SearchEngine::new([dt("|u1")]).unwrap();
        engine.search(&vec![3u8, 3, 1], 3).unwrap();

        engine
            .delta_search(&vec![4u8, 2, 1], ComparisonOperator::Increased, None)
            .unwrap();
        let candidates: Vec<Candidate> = engine.candidates().collect();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].address, Address::new(0));
        assert_eq!(candidates[0].last_value, Value::UInt(4));

        // A second increase is measured from 4, not from the initial 3
        engine
            .delta_search(&vec![4u8, 9, 9], ComparisonOperator::Increased, None)
            .unwrap();
        assert_eq!(engine.num_results(), 0);
    }

    #[test]
    fn test_delta_on_empty_set_is_noop() {
        let mut engine = SearchEngine::new([dt("|u1")]).unwrap();
        engine
            .delta_search(&Vec::<u8>::new(), ComparisonOperator::Changed, None)
            .unwrap();
        assert_eq!(engine.num_results(), 0);
    }

    #[test]
    fn test_delta_requires_reference() {
        let mut engine = SearchEngine::new([dt("|u1")]).unwrap();
        engine.search(&vec![1u8, 1], 1).unwrap();
        let err = engine
            .delta_search(&vec![1u8, 1], ComparisonOperator::Greater, None)
            .unwrap_err();
        assert!(matches!(err, SearchError::InvalidConfiguration(_)));
        assert_eq!(engine.num_results(), 2);
    }

    #[test]
    fn test_delta_out_of_range_leaves_set_untouched() {
        let mut engine = SearchEngine::new([dt("|u1")]).unwrap();
        engine.search(&vec![0u8, 1, 0, 1], 1).unwrap();
        let before = engine.typed_results();

        // Address 1 is still readable and would be dropped; address 3 is not
        let err = engine
            .delta_search(&vec![0u8, 0], ComparisonOperator::Unchanged, None)
            .unwrap_err();
        assert!(matches!(err, SearchError::OutOfRange { .. }));
        assert_eq!(engine.typed_results(), before);
        assert!(engine.candidates().all(|c| c.last_value == Value::UInt(1)));
    }

    #[test]
    fn test_delta_search_str_unknown_operator() {
        let mut engine = SearchEngine::new([dt("|u1")]).unwrap();
        engine.search(&vec![1u8, 1], 1).unwrap();
        let err = engine
            .delta_search_str(&vec![2u8, 2], "~=", None)
            .unwrap_err();
        assert!(err.to_string().contains("unknown operator"));
        assert_eq!(engine.num_results(), 2);
        assert!(engine.candidates().all(|c| c.last_value == Value::UInt(1)));
    }

    #[test]
    fn test_repeat_search_rederives() {
        let mut engine = SearchEngine::new([dt("|u1")]).unwrap();
        engine.search(&vec![7u8, 0, 7], 7).unwrap();
        engine
            .delta_search(&vec![7u8, 0, 8], ComparisonOperator::Unchanged, None)
            .unwrap();
        assert_eq!(engine.num_results(), 1);

        engine.search(&vec![7u8, 7, 7], 7).unwrap();
        assert_eq!(engine.num_results(), 3);
    }

    #[test]
    fn test_unique_and_ambiguous() {
        let mut engine = SearchEngine::new([dt("|u1")]).unwrap();
        engine.search(&vec![9u8, 9, 9], 9).unwrap();
        assert!(matches!(
            engine.unique_result(),
            Err(SearchError::AmbiguousResult(3))
        ));

        engine
            .delta_search(&vec![9u8, 1, 2], ComparisonOperator::Equal, Some(Value::Int(9)))
            .unwrap();
        assert!(engine.has_unique_result());
        assert_eq!(
            engine.unique_result().unwrap(),
            TypedResult::new(Address::new(0), dt("|u1"))
        );
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let memory: Vec<u8> = (0..512u32).map(|i| (i % 7) as u8).collect();
        let snapshot = Snapshot::new(memory, 0);
        let types = [dt("|u1"), dt("|i1"), dt("<u2"), dt(">u2")];

        let mut sequential = SearchEngine::new(types).unwrap();
        sequential.search(&snapshot, 3).unwrap();

        let mut parallel = SearchEngine::new(types)
            .unwrap()
            .with_options(ScanOptions {
                alignment: 1,
                parallel: true,
            })
            .unwrap();
        parallel.search(&snapshot, 3).unwrap();

        assert_eq!(sequential.typed_results(), parallel.typed_results());
    }

    #[test]
    fn test_clear() {
        let mut engine = SearchEngine::new([dt("|u1")]).unwrap();
        engine.search(&vec![1u8], 1).unwrap();
        engine.clear();
        assert!(!engine.is_searched());
        assert_eq!(engine.num_results(), 0);
    }
}
