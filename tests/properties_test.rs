//! Property tests for search narrowing

use proptest::prelude::*;
use retro_search::core::types::{Address, ComparisonOperator, DataType, SearchError};
use retro_search::memory::{MemorySnapshot, SearchEngine};

fn data_type() -> impl Strategy<Value = DataType> {
    prop::sample::select(vec![
        "|u1", "|i1", "<u2", ">u2", "<i2", ">i2", "<u4", ">i4", "<u8", ">i8",
    ])
    .prop_map(|s| s.parse().unwrap())
}

fn operator() -> impl Strategy<Value = ComparisonOperator> {
    prop::sample::select(ComparisonOperator::ALL.to_vec())
}

proptest! {
    #[test]
    fn search_results_decode_to_target(
        memory in prop::collection::vec(0u8..4, 0..128),
        types in prop::collection::vec(data_type(), 1..4),
        target in 0i64..4,
    ) {
        let mut engine = SearchEngine::new(types).unwrap();
        engine.search(&memory, target).unwrap();

        for candidate in engine.candidates() {
            let value = memory.read_value(candidate.address, candidate.data_type).unwrap();
            prop_assert!(value.numeric_eq(&target.into()));
            prop_assert_eq!(value, candidate.last_value);
        }
    }

    #[test]
    fn delta_search_never_grows(
        first in prop::collection::vec(0u8..3, 32),
        second in prop::collection::vec(0u8..3, 32),
        op in operator(),
        reference in 0i64..3,
    ) {
        let mut engine = SearchEngine::new(["|u1".parse().unwrap(), "<u2".parse().unwrap()]).unwrap();
        engine.search(&first, 1).unwrap();
        let before = engine.typed_results();

        engine.delta_search(&second, op, Some(reference.into())).unwrap();
        let after = engine.typed_results();

        prop_assert!(after.len() <= before.len());
        prop_assert!(after.iter().all(|r| before.contains(r)));
        for candidate in engine.candidates() {
            prop_assert_eq!(
                second.read_value(candidate.address, candidate.data_type).unwrap(),
                candidate.last_value
            );
        }
    }

    #[test]
    fn unchanged_on_same_memory_is_identity(
        memory in prop::collection::vec(0u8..3, 0..64),
        target in 0i64..3,
    ) {
        let mut engine = SearchEngine::new(["|u1".parse().unwrap(), ">u2".parse().unwrap()]).unwrap();
        engine.search(&memory, target).unwrap();
        let before = engine.typed_results();

        engine.delta_search(&memory, ComparisonOperator::Unchanged, None).unwrap();
        prop_assert_eq!(engine.typed_results(), before);
    }

    #[test]
    fn unique_result_iff_one_candidate(
        memory in prop::collection::vec(0u8..6, 1..24),
        target in 0i64..6,
    ) {
        let mut engine = SearchEngine::new(["|u1".parse::<DataType>().unwrap()]).unwrap();
        engine.search(&memory, target).unwrap();

        match engine.unique_result() {
            Ok(result) => {
                prop_assert_eq!(engine.num_results(), 1);
                prop_assert_eq!(Some(result), engine.typed_results().first().copied());
            }
            Err(SearchError::EmptyResult) => prop_assert_eq!(engine.num_results(), 0),
            Err(SearchError::AmbiguousResult(n)) => {
                prop_assert!(n > 1);
                prop_assert_eq!(n, engine.num_results());
            }
            Err(other) => prop_assert!(false, "unexpected error {}", other),
        }
    }

    #[test]
    fn decode_never_reads_past_end(
        memory in prop::collection::vec(any::<u8>(), 0..16),
        address in 0usize..20,
        data_type in data_type(),
    ) {
        let result = memory.read_value(Address::new(address), data_type);
        if address + data_type.width() <= memory.len() {
            prop_assert!(result.is_ok());
        } else {
            let is_out_of_range = matches!(result, Err(SearchError::OutOfRange { .. }));
            prop_assert!(is_out_of_range);
        }
    }
}
