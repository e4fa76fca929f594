//! Property tests for `ChunkedContainer`.
//!
//! Any interleaving of bulk and incremental appends must behave like one
//! flat `Vec` for indexing, overwriting, iteration and trimming.

use point_cloud_store::{ChunkedContainer, StoreError};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Append {
    Batch(Vec<u32>, Option<usize>),
    One(u32),
    Trim,
}

fn arb_append() -> impl Strategy<Value = Append> {
    prop_oneof![
        (
            prop::collection::vec(any::<u32>(), 0..40),
            prop::option::of(0usize..50)
        )
            .prop_map(|(batch, valid_len)| Append::Batch(batch, valid_len)),
        any::<u32>().prop_map(Append::One),
        Just(Append::Trim),
    ]
}

/// Apply `ops` to a container and to a reference `Vec`.
fn build(capacity: usize, ops: &[Append]) -> (ChunkedContainer<u32>, Vec<u32>) {
    let mut container = ChunkedContainer::new(capacity);
    let mut expected = Vec::new();
    for op in ops {
        match op {
            Append::Batch(batch, valid_len) => {
                let take = valid_len.map_or(batch.len(), |n| n.min(batch.len()));
                expected.extend_from_slice(&batch[..take]);
                container.append_batch(batch.clone(), *valid_len);
            }
            Append::One(value) => {
                expected.push(*value);
                container.append_one(*value);
            }
            Append::Trim => container.trim_last_chunk(),
        }
    }
    (container, expected)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn indexing_matches_append_order(
        capacity in 1usize..12,
        ops in prop::collection::vec(arb_append(), 0..30),
    ) {
        let (container, expected) = build(capacity, &ops);
        prop_assert_eq!(container.len(), expected.len());
        for (i, value) in expected.iter().enumerate() {
            prop_assert_eq!(container.get(i as isize), Some(value));
        }
        prop_assert_eq!(container.get(-1), expected.last());
    }

    #[test]
    fn out_of_range_indices_are_rejected(
        capacity in 1usize..12,
        ops in prop::collection::vec(arb_append(), 0..20),
        past in 0isize..5,
    ) {
        let (mut container, expected) = build(capacity, &ops);
        let len = expected.len() as isize;

        prop_assert_eq!(container.get(len + past), None);
        prop_assert_eq!(container.get(-len - 1 - past), None);
        prop_assert_eq!(
            container.set(len + past, 0),
            Err(StoreError::OutOfRange { index: len + past, len: expected.len() })
        );
        prop_assert_eq!(
            container.set(-len - 1 - past, 0),
            Err(StoreError::OutOfRange { index: -len - 1 - past, len: expected.len() })
        );
    }

    #[test]
    fn set_then_get_touches_one_slot(
        capacity in 1usize..12,
        ops in prop::collection::vec(arb_append(), 1..20),
        pick in any::<prop::sample::Index>(),
        value in any::<u32>(),
    ) {
        let (mut container, mut expected) = build(capacity, &ops);
        prop_assume!(!expected.is_empty());
        let target = pick.index(expected.len());

        container.set(target as isize, value).unwrap();
        expected[target] = value;

        prop_assert_eq!(container.get(target as isize), Some(&value));
        prop_assert_eq!(container.each().copied().collect::<Vec<_>>(), expected);
    }

    #[test]
    fn iteration_matches_indexing(
        ops in prop::collection::vec(arb_append(), 0..30),
        relative in 0usize..3,
    ) {
        // capacity smaller than, equal to and larger than the element count
        let (probe, _) = build(1, &ops);
        let n = probe.len().max(1);
        let capacity = match relative {
            0 => (n / 2).max(1),
            1 => n,
            _ => n * 2,
        };

        let (container, expected) = build(capacity, &ops);
        let iterated: Vec<u32> = container.each().copied().collect();
        let indexed: Vec<u32> = (0..container.len()).map(|i| container[i]).collect();

        prop_assert_eq!(&iterated, &expected);
        prop_assert_eq!(iterated, indexed);
        prop_assert_eq!(container.each().len(), expected.len());
    }

    #[test]
    fn trim_is_idempotent(
        capacity in 1usize..12,
        ops in prop::collection::vec(arb_append(), 0..30),
    ) {
        let (mut container, expected) = build(capacity, &ops);

        container.trim_last_chunk();
        let once: Vec<Vec<u32>> = container.chunks().map(<[u32]>::to_vec).collect();
        let allocated = container.allocated();
        container.trim_last_chunk();
        let twice: Vec<Vec<u32>> = container.chunks().map(<[u32]>::to_vec).collect();

        prop_assert_eq!(&once, &twice);
        prop_assert_eq!(allocated, container.allocated());
        prop_assert_eq!(allocated, expected.len());
        prop_assert_eq!(container.len(), expected.len());
        prop_assert_eq!(container.each().copied().collect::<Vec<_>>(), expected);
    }

    #[test]
    fn chunks_never_exceed_capacity(
        capacity in 1usize..12,
        ops in prop::collection::vec(arb_append(), 0..30),
    ) {
        let (container, _) = build(capacity, &ops);
        for chunk in container.chunks() {
            prop_assert!(!chunk.is_empty());
            prop_assert!(chunk.len() <= capacity);
        }
    }
}
