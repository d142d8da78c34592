//! # typeguard
//!
//! Compile structural type schemas into runtime validators.
//!
//! `typeguard` is a two-stage system: a compiler walks a possibly-cyclic
//! [`SchemaGraph`] once and builds an executable [`Validator`] from a
//! fixed set of combinators, and a runtime engine executes those
//! combinators against values, producing a boolean plus, optionally, a
//! path-tracked list of structured errors.
//!
//! ## Quick Start
//!
//! ```rust
//! use serde_json::json;
//! use typeguard::{Checker, Property, SchemaGraph, ValueGraph};
//!
//! // { name: string, age?: number }
//! let mut schema = SchemaGraph::new();
//! let name = schema.primitive("string");
//! let age = schema.primitive("number");
//! let user = schema.object(vec![
//!     Property::required("name", name),
//!     Property::optional("age", age),
//! ]);
//!
//! let mut checker = Checker::build(&schema, user)?;
//!
//! let (values, root) = ValueGraph::from_json(&json!({"name": "John"}));
//! assert!(checker.check(&values, root));
//!
//! let (values, root) = ValueGraph::from_json(&json!({"age": 30}));
//! assert!(!checker.check_with_errors(&values, root));
//! assert_eq!(
//!     serde_json::to_value(checker.read_errors())?,
//!     json!([{"kind": "missing-property", "target": "name", "path": []}])
//! );
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Cyclic schemas and cyclic values
//!
//! Schema nodes live in an arena and are addressed by [`NodeId`], so a
//! type can reference itself ([`SchemaGraph::reserve`] /
//! [`SchemaGraph::fill`]). The compiler breaks schema cycles with
//! recursion cells, and the runtime guards each `(cell, value)` pair per
//! call, so even cyclic *value* graphs terminate:
//!
//! ```rust
//! use typeguard::{build_validator, Property, SchemaGraph, SchemaNode, Value, ValueGraph};
//!
//! // type Node = { value: number, next?: Node }
//! let mut schema = SchemaGraph::new();
//! let node = schema.reserve();
//! let number = schema.primitive("number");
//! schema.fill(node, SchemaNode::Object(vec![
//!     Property::required("value", number),
//!     Property::optional("next", node),
//! ]));
//! let validator = build_validator(&schema, node)?;
//!
//! // a.next = b, b.next = a
//! let mut values = ValueGraph::new();
//! let a = values.reserve();
//! let b = values.reserve();
//! let one = values.add(Value::Number(1.0));
//! let two = values.add(Value::Number(2.0));
//! values.set(a, Value::Object(vec![("value".into(), one), ("next".into(), b)]));
//! values.set(b, Value::Object(vec![("value".into(), two), ("next".into(), a)]));
//!
//! assert!(validator.check(&values, a));
//! # Ok::<(), typeguard::CompileError>(())
//! ```
//!
//! ## Error model
//!
//! Compilation is the only fallible stage ([`CompileError`], returned
//! once from [`build_validator`]). A built validator never fails at call
//! time: checks return `bool`, and collecting checks append
//! [`ValidationError`] records shaped as
//! `{"kind": "missing-property" | "invalid-type", "target": ..., "path": [...]}`.
//!
//! ## Modules
//!
//! - [`schema`] - schema graph arena and node kinds
//! - [`value`] - runtime value graph (shared, possibly cyclic)
//! - [`compile`] - schema-to-expression compiler
//! - [`runtime`] - combinator runtime, [`Validator`] and [`Checker`]
//! - [`emit`] - combinator source-text emission
//! - [`context`] - per-call path, sink, and recursion guard
//! - [`error`] - compile and validation error types

pub mod compile;
pub mod context;
pub mod emit;
pub mod error;
pub mod runtime;
pub mod schema;
pub mod value;

pub use compile::{compile, CellId, Compiler, Expr, Primitive, PropertyExpr};
pub use context::Context;
pub use emit::{emit, Emitted};
pub use error::{CompileError, CompileResult, ErrorKind, PathSegment, ValidationError};
pub use runtime::{build_validator, Checker, Validator};
pub use schema::{LiteralValue, NodeId, Property, SchemaGraph, SchemaNode};
pub use value::{Value, ValueGraph, ValueId};
