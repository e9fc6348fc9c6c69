//! Model-based checks: random operation sequences against `Vec` models.

mod common;

use common::assert_links_agree;
use nexus_linked::{List, NodeHandle, Ring};
use proptest::prelude::*;
use proptest::sample::Index;

#[derive(Debug, Clone)]
enum Op {
    Append(u32),
    Prepend(u32),
    InsertAfter(Index, u32),
    InsertBefore(Index, u32),
    Delete(Index),
    DeleteTwice(Index),
    PopFront,
    PopBack,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => any::<u32>().prop_map(Op::Append),
        2 => any::<u32>().prop_map(Op::Prepend),
        2 => (any::<Index>(), any::<u32>()).prop_map(|(at, v)| Op::InsertAfter(at, v)),
        2 => (any::<Index>(), any::<u32>()).prop_map(|(at, v)| Op::InsertBefore(at, v)),
        3 => any::<Index>().prop_map(Op::Delete),
        1 => any::<Index>().prop_map(Op::DeleteTwice),
        1 => Just(Op::PopFront),
        1 => Just(Op::PopBack),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn list_matches_vec_model(ops in prop::collection::vec(op(), 0..120)) {
        let list = List::new();
        let mut model: Vec<NodeHandle<u32>> = Vec::new();

        for op in ops {
            match op {
                Op::Append(v) => model.push(list.append(v)),
                Op::Prepend(v) => model.insert(0, list.prepend(v)),
                Op::InsertAfter(at, v) if !model.is_empty() => {
                    let i = at.index(model.len());
                    let node = list.insert_after(&model[i], v).unwrap();
                    model.insert(i + 1, node);
                }
                Op::InsertBefore(at, v) if !model.is_empty() => {
                    let i = at.index(model.len());
                    let node = list.insert_before(&model[i], v).unwrap();
                    model.insert(i, node);
                }
                Op::Delete(at) if !model.is_empty() => {
                    let node = model.remove(at.index(model.len()));
                    prop_assert!(list.delete(&node));
                }
                Op::DeleteTwice(at) if !model.is_empty() => {
                    let node = model.remove(at.index(model.len()));
                    prop_assert!(list.delete(&node));
                    prop_assert!(!list.delete(&node));
                    prop_assert!(list.insert_after(&node, 0).is_err());
                }
                Op::PopFront => {
                    let expected = (!model.is_empty()).then(|| model.remove(0));
                    prop_assert_eq!(list.pop_front(), expected);
                }
                Op::PopBack => {
                    prop_assert_eq!(list.pop_back(), model.pop());
                }
                _ => {}
            }

            prop_assert_eq!(list.len(), model.len());
        }

        prop_assert_eq!(list.snapshot(), model.clone());
        let data: Vec<u32> = list.data().collect();
        let expected: Vec<u32> = model.iter().map(|node| **node).collect();
        prop_assert_eq!(data, expected);
        assert_links_agree(&list);
    }

    #[test]
    fn ring_keeps_last_write_per_slot(
        capacity in 1usize..16,
        values in prop::collection::vec(any::<u64>(), 0..64),
    ) {
        let ring = Ring::with_capacity(capacity).unwrap();
        let mut model: Vec<Option<u64>> = vec![None; capacity];

        for (n, &value) in values.iter().enumerate() {
            let displaced = ring.add(value).map(|entry| *entry);
            prop_assert_eq!(displaced, model[n % capacity]);
            model[n % capacity] = Some(value);
        }

        prop_assert_eq!(ring.len(), values.len().min(capacity));

        let expected: Vec<u64> = model.into_iter().flatten().collect();
        let walked: Vec<u64> = ring.iter().map(|entry| *entry).collect();
        prop_assert_eq!(walked, expected);
        prop_assert_eq!(ring.latest().map(|entry| *entry), values.last().copied());
    }
}
