//! Generator-driven invariants for the combinator runtime.

use proptest::prelude::*;
use serde_json::json;
use typeguard::{Checker, NodeId, SchemaGraph, ValueGraph};

fn build(schema: impl FnOnce(&mut SchemaGraph) -> NodeId) -> Checker {
    let mut graph = SchemaGraph::new();
    let root = schema(&mut graph);
    Checker::build(&graph, root).expect("schema compiles")
}

/// Scalar JSON values of every runtime kind.
fn any_scalar() -> impl Strategy<Value = serde_json::Value> {
    prop_oneof![
        Just(json!(null)),
        any::<bool>().prop_map(|b| json!(b)),
        any::<i32>().prop_map(|n| json!(n)),
        ".*".prop_map(|s| json!(s)),
    ]
}

proptest! {
    #[test]
    fn numbers_always_pass_number(n in any::<i32>()) {
        let checker = build(|g| g.primitive("number"));
        let (values, root) = ValueGraph::from_json(&json!(n));
        prop_assert!(checker.check(&values, root));
    }

    #[test]
    fn strings_always_pass_string(s in ".*") {
        let checker = build(|g| g.primitive("string"));
        let (values, root) = ValueGraph::from_json(&json!(s));
        prop_assert!(checker.check(&values, root));
    }

    #[test]
    fn silent_and_collecting_agree(value in any_scalar()) {
        let mut checker = build(|g| {
            let number = g.primitive("number");
            let string = g.primitive("string");
            g.union(vec![number, string])
        });
        let (values, root) = ValueGraph::from_json(&value);

        let silent = checker.check(&values, root);
        let collecting = checker.check_with_errors(&values, root);
        prop_assert_eq!(silent, collecting);

        // A passing collecting check leaves an empty buffer.
        if collecting {
            prop_assert!(checker.read_errors().is_empty());
        } else {
            prop_assert!(!checker.read_errors().is_empty());
        }
    }

    #[test]
    fn checks_are_independent(values in proptest::collection::vec(any_scalar(), 1..8)) {
        // Result per value is pure: interleaving calls changes nothing.
        let mut checker = build(|g| g.primitive("string"));

        let individual: Vec<bool> = values
            .iter()
            .map(|v| {
                let (graph, root) = ValueGraph::from_json(v);
                let mut fresh = checker.clone();
                fresh.check_with_errors(&graph, root)
            })
            .collect();

        let sequential: Vec<bool> = values
            .iter()
            .map(|v| {
                let (graph, root) = ValueGraph::from_json(v);
                checker.check_with_errors(&graph, root)
            })
            .collect();

        prop_assert_eq!(individual, sequential);
    }

    #[test]
    fn array_reports_exactly_the_failing_indices(
        numbers in proptest::collection::vec(any::<i32>(), 0..8),
        bad_positions in proptest::collection::btree_set(0usize..8, 0..4),
    ) {
        let mut checker = build(|g| {
            let number = g.primitive("number");
            g.array(number)
        });

        let items: Vec<serde_json::Value> = numbers
            .iter()
            .enumerate()
            .map(|(i, n)| {
                if bad_positions.contains(&i) {
                    json!(n.to_string())
                } else {
                    json!(n)
                }
            })
            .collect();
        let expected_failures = bad_positions
            .iter()
            .filter(|i| **i < numbers.len())
            .count();

        let (values, root) = ValueGraph::from_json(&json!(items));
        let ok = checker.check_with_errors(&values, root);

        prop_assert_eq!(ok, expected_failures == 0);
        prop_assert_eq!(checker.read_errors().len(), expected_failures);
    }
}
