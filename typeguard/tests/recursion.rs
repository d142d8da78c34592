//! Cyclic schemas and cyclic value graphs must both terminate.

use serde_json::json;
use typeguard::{
    build_validator, Property, SchemaGraph, SchemaNode, Validator, Value, ValueGraph,
};

/// type Tree = { value: number, left?: Tree, right?: Tree }
fn tree_validator() -> Validator {
    let mut graph = SchemaGraph::new();
    let tree = graph.reserve();
    let number = graph.primitive("number");
    graph.fill(
        tree,
        SchemaNode::Object(vec![
            Property::required("value", number),
            Property::optional("left", tree),
            Property::optional("right", tree),
        ]),
    );
    build_validator(&graph, tree).expect("schema compiles")
}

/// type A = { value: number, next?: B }
/// type B = { value: string, next?: A }
fn pair_validator() -> Validator {
    let mut graph = SchemaGraph::new();
    let a = graph.reserve();
    let b = graph.reserve();
    let number = graph.primitive("number");
    let string = graph.primitive("string");
    graph.fill(
        a,
        SchemaNode::Object(vec![
            Property::required("value", number),
            Property::optional("next", b),
        ]),
    );
    graph.fill(
        b,
        SchemaNode::Object(vec![
            Property::required("value", string),
            Property::optional("next", a),
        ]),
    );
    build_validator(&graph, a).expect("schema compiles")
}

fn check(validator: &Validator, value: serde_json::Value) -> bool {
    let (values, root) = ValueGraph::from_json(&value);
    validator.check(&values, root)
}

#[test]
fn validates_one_cycle() {
    let is_tree = tree_validator();

    assert!(check(&is_tree, json!({"value": 1})));
    assert!(check(&is_tree, json!({"value": 1, "left": {"value": 2}})));
    assert!(check(
        &is_tree,
        json!({"value": 1, "left": {"value": 2, "left": {"value": 3}}})
    ));
    assert!(!check(
        &is_tree,
        json!({"value": 1, "left": {"value": 2, "left": {"value": "3"}}})
    ));
    assert!(check(
        &is_tree,
        json!({
            "value": 1,
            "left": {"value": 2, "left": {"value": 3}},
            "right": {"value": 4},
        })
    ));
    assert!(!check(
        &is_tree,
        json!({
            "value": 1,
            "left": {"value": 2, "left": {"value": 3}},
            "right": {"value": "4"},
        })
    ));
}

#[test]
fn validates_two_cycle() {
    let is_a = pair_validator();

    assert!(check(&is_a, json!({"value": 1})));
    assert!(check(&is_a, json!({"value": 1, "next": {"value": "2"}})));
    assert!(check(
        &is_a,
        json!({"value": 1, "next": {"value": "2", "next": {"value": 3}}})
    ));
    assert!(!check(
        &is_a,
        json!({"value": 1, "next": {"value": "2", "next": {"value": "nope"}}})
    ));
    assert!(!check(&is_a, json!({"next": 123})));
}

#[test]
fn terminates_on_cyclic_values() {
    let is_a = pair_validator();

    // a.next = b, b.next = a
    let mut values = ValueGraph::new();
    let a = values.reserve();
    let b = values.reserve();
    let one = values.add(Value::Number(1.0));
    let two = values.add(Value::String("2".into()));
    values.set(
        a,
        Value::Object(vec![("value".into(), one), ("next".into(), b)]),
    );
    values.set(
        b,
        Value::Object(vec![("value".into(), two), ("next".into(), a)]),
    );

    assert!(is_a.check(&values, a));
}

#[test]
fn fails_on_bad_cyclic_values() {
    let is_a = pair_validator();

    // Same cycle, but a.value has the wrong type.
    let mut values = ValueGraph::new();
    let a = values.reserve();
    let b = values.reserve();
    let one = values.add(Value::String("1".into()));
    let two = values.add(Value::String("2".into()));
    values.set(
        a,
        Value::Object(vec![("value".into(), one), ("next".into(), b)]),
    );
    values.set(
        b,
        Value::Object(vec![("value".into(), two), ("next".into(), a)]),
    );

    assert!(!is_a.check(&values, a));
}

#[test]
fn self_referential_value_against_tree_schema() {
    let is_tree = tree_validator();

    // node.left = node
    let mut values = ValueGraph::new();
    let node = values.reserve();
    let one = values.add(Value::Number(1.0));
    values.set(
        node,
        Value::Object(vec![("value".into(), one), ("left".into(), node)]),
    );

    assert!(is_tree.check(&values, node));
}

#[test]
fn guard_does_not_leak_across_calls() {
    let is_a = pair_validator();

    let mut values = ValueGraph::new();
    let a = values.reserve();
    let b = values.reserve();
    let one = values.add(Value::Number(1.0));
    let two = values.add(Value::String("2".into()));
    values.set(
        a,
        Value::Object(vec![("value".into(), one), ("next".into(), b)]),
    );
    values.set(
        b,
        Value::Object(vec![("value".into(), two), ("next".into(), a)]),
    );

    // Repeated calls behave identically: the guard is per-call state,
    // never a persistent cache.
    assert!(is_a.check(&values, a));
    assert!(is_a.check(&values, a));

    values.set(one, Value::String("1".into()));
    assert!(!is_a.check(&values, a));
    assert!(!is_a.check(&values, a));
}
