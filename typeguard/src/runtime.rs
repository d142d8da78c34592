//! Validator combinator runtime.
//!
//! [`Validator`] lowers a compiled expression tree into executable
//! combinators plus a table of recursion cells, then walks values with a
//! per-call [`Context`]. Checking never fails with an `Err`: every
//! combinator returns a boolean and, in collecting mode, appends zero or
//! more structured errors.
//!
//! Both [`Expr::Recursive`] and [`Expr::Ref`] lower to a guarded cell
//! entry, so every path into a recursive schema node passes the
//! recursion guard. A `(cell, value)` pair already held by an ancestor
//! call is treated as vacuously valid, which bounds descent on cyclic
//! value graphs to the cycle's actual length.

use crate::compile::{self, CellId, Expr, Primitive};
use crate::context::Context;
use crate::error::{CompileResult, ErrorKind, PathSegment, ValidationError};
use crate::schema::{LiteralValue, NodeId, SchemaGraph};
use crate::value::{Value, ValueGraph, ValueId};

/// One compiled object property.
#[derive(Debug, Clone)]
struct PropertySlot {
    name: String,
    inner: Combinator,
    optional: bool,
}

/// Executable validator node. Closed set, matched exhaustively.
#[derive(Debug, Clone)]
enum Combinator {
    Primitive(Primitive),
    Literal(LiteralValue),
    Union(Vec<Combinator>),
    Intersection(Vec<Combinator>),
    Object(Vec<PropertySlot>),
    Array(Box<Combinator>),
    Tuple(Vec<Combinator>),
    Record(Box<Combinator>),
    /// Advisory wrapper; validation delegates to `inner` unchanged. The
    /// key and payload are kept for `Debug` introspection only.
    #[allow(unused)]
    Annotation {
        key: String,
        payload: serde_json::Value,
        inner: Box<Combinator>,
    },
    /// Guarded entry into a recursion cell.
    Recurse(CellId),
}

/// A compiled, executable validator.
///
/// Built once per schema via [`build_validator`]; checking is pure and
/// reusable across any number of values.
#[derive(Debug, Clone)]
pub struct Validator {
    root: Combinator,
    cells: Vec<Option<Combinator>>,
}

/// Compile a schema node into an executable validator.
///
/// This is the only fallible stage: an unsupported schema construct
/// fails here, and a built validator never fails at call time.
pub fn build_validator(graph: &SchemaGraph, root: NodeId) -> CompileResult<Validator> {
    let expr = compile::compile(graph, root)?;
    Ok(Validator::from_expr(&expr))
}

impl Validator {
    /// Lower an expression tree into an executable validator.
    pub fn from_expr(expr: &Expr) -> Self {
        let mut cells = Vec::new();
        let root = lower(expr, &mut cells);
        Self { root, cells }
    }

    /// Silent check: runs with the allocation-free sink.
    pub fn check(&self, graph: &ValueGraph, value: ValueId) -> bool {
        let mut ctx = Context::silent();
        self.validate(graph, value, &mut ctx)
    }

    /// Collecting check: replaces `errors` with the structured errors of
    /// this call.
    pub fn check_with_errors(
        &self,
        graph: &ValueGraph,
        value: ValueId,
        errors: &mut Vec<ValidationError>,
    ) -> bool {
        let mut ctx = Context::collecting();
        let ok = self.validate(graph, value, &mut ctx);
        *errors = ctx.into_errors();
        ok
    }

    /// Explicit-context entry point.
    pub fn validate(&self, graph: &ValueGraph, value: ValueId, ctx: &mut Context) -> bool {
        self.run(&self.root, graph, value, ctx)
    }

    fn run(&self, c: &Combinator, graph: &ValueGraph, value: ValueId, ctx: &mut Context) -> bool {
        match c {
            Combinator::Primitive(primitive) => {
                if primitive_matches(*primitive, graph.get(value)) {
                    true
                } else {
                    ctx.error(ErrorKind::InvalidType, primitive.name());
                    false
                }
            }

            Combinator::Literal(literal) => {
                if literal_matches(literal, graph.get(value)) {
                    true
                } else {
                    ctx.error(ErrorKind::InvalidType, literal.to_target());
                    false
                }
            }

            Combinator::Object(properties) => self.run_object(properties, graph, value, ctx),

            Combinator::Array(element) => {
                let Value::Array(items) = graph.get(value) else {
                    ctx.error(ErrorKind::InvalidType, "array");
                    return false;
                };
                let mut valid = true;
                for (index, item) in items.iter().enumerate() {
                    let ok = ctx.with_segment(PathSegment::Index(index), |ctx| {
                        self.run(element, graph, *item, ctx)
                    });
                    valid &= ok;
                }
                valid
            }

            Combinator::Tuple(elements) => {
                let Value::Array(items) = graph.get(value) else {
                    ctx.error(ErrorKind::InvalidType, "tuple");
                    return false;
                };
                if items.len() != elements.len() {
                    ctx.error(ErrorKind::InvalidType, "tuple");
                    return false;
                }
                let mut valid = true;
                for (index, (element, item)) in elements.iter().zip(items).enumerate() {
                    let ok = ctx.with_segment(PathSegment::Index(index), |ctx| {
                        self.run(element, graph, *item, ctx)
                    });
                    valid &= ok;
                }
                valid
            }

            // Entry failures fail the record without surfacing entry
            // errors; only a non-object subject produces a record.
            Combinator::Record(inner) => {
                let Value::Object(entries) = graph.get(value) else {
                    ctx.error(ErrorKind::InvalidType, "object");
                    return false;
                };
                let mut valid = true;
                for (_, entry) in entries {
                    valid &= ctx.silenced(|ctx| self.run(inner, graph, *entry, ctx));
                }
                valid
            }

            Combinator::Union(members) => self.run_union(members, graph, value, ctx),

            Combinator::Intersection(members) => {
                let mut valid = true;
                for member in members {
                    // Every member's own errors surface: no short-circuit.
                    valid &= self.run(member, graph, value, ctx);
                }
                valid
            }

            Combinator::Annotation { inner, .. } => self.run(inner, graph, value, ctx),

            Combinator::Recurse(cell) => {
                let Some(inner) = self.cells.get(cell.0).and_then(|slot| slot.as_ref()) else {
                    return true;
                };
                if !ctx.guard_enter(*cell, value) {
                    // An ancestor call is already verifying this pair.
                    return true;
                }
                let ok = self.run(inner, graph, value, ctx);
                ctx.guard_exit(*cell, value);
                ok
            }
        }
    }

    fn run_object(
        &self,
        properties: &[PropertySlot],
        graph: &ValueGraph,
        value: ValueId,
        ctx: &mut Context,
    ) -> bool {
        let subject = graph.get(value);
        if !matches!(subject, Value::Object(_)) {
            ctx.error(ErrorKind::InvalidType, "object");
            return false;
        }

        // Every declared property is checked, so one call surfaces every
        // violation. Undeclared keys are ignored.
        let mut valid = true;
        for property in properties {
            match subject.field(&property.name) {
                None if property.optional => {}
                None => {
                    ctx.error(ErrorKind::MissingProperty, property.name.clone());
                    valid = false;
                }
                Some(field) => {
                    let ok = ctx.with_segment(PathSegment::Key(property.name.clone()), |ctx| {
                        self.run(&property.inner, graph, field, ctx)
                    });
                    valid &= ok;
                }
            }
        }
        valid
    }

    fn run_union(
        &self,
        members: &[Combinator],
        graph: &ValueGraph,
        value: ValueId,
        ctx: &mut Context,
    ) -> bool {
        // Probe branches with the sink silenced; path and guard carry over.
        let passed = members
            .iter()
            .any(|member| ctx.silenced(|ctx| self.run(member, graph, value, ctx)));
        if passed {
            return true;
        }

        // A unique discriminant match pins the failure to one branch: its
        // own errors surface directly at the union's path, unwrapped.
        let subject = graph.get(value);
        if matches!(subject, Value::Object(_)) {
            let mut matched = members
                .iter()
                .filter(|member| self.discriminant_matches(member, graph, subject));
            if let (Some(only), None) = (matched.next(), matched.next()) {
                self.run(only, graph, value, ctx);
                return false;
            }
        }

        // Full merge of branch summaries, in reverse declaration order.
        for member in members.iter().rev() {
            ctx.error(ErrorKind::InvalidType, self.type_name(member));
        }
        false
    }

    /// Whether `member` is an object branch with a literal-typed property
    /// equal to the subject's corresponding field.
    fn discriminant_matches(
        &self,
        member: &Combinator,
        graph: &ValueGraph,
        subject: &Value,
    ) -> bool {
        let Combinator::Object(properties) = self.resolve(member) else {
            return false;
        };
        properties.iter().any(|property| {
            let Combinator::Literal(literal) = self.resolve(&property.inner) else {
                return false;
            };
            subject
                .field(&property.name)
                .map_or(false, |field| literal_matches(literal, graph.get(field)))
        })
    }

    /// Strip annotation wrappers and recursion cells down to the
    /// structural combinator.
    fn resolve<'v>(&'v self, c: &'v Combinator) -> &'v Combinator {
        match c {
            Combinator::Annotation { inner, .. } => self.resolve(inner),
            Combinator::Recurse(cell) => match self.cells.get(cell.0).and_then(|s| s.as_ref()) {
                Some(inner) => self.resolve(inner),
                None => c,
            },
            _ => c,
        }
    }

    /// Type name reported for a failed union branch.
    fn type_name(&self, c: &Combinator) -> String {
        match c {
            Combinator::Primitive(primitive) => primitive.name().to_string(),
            Combinator::Literal(literal) => literal.to_target(),
            Combinator::Object(_) | Combinator::Record(_) => "object".to_string(),
            Combinator::Array(_) => "array".to_string(),
            Combinator::Tuple(_) => "tuple".to_string(),
            Combinator::Union(_) => "union".to_string(),
            Combinator::Intersection(_) => "intersection".to_string(),
            Combinator::Annotation { inner, .. } => self.type_name(inner),
            Combinator::Recurse(cell) => self
                .cells
                .get(cell.0)
                .and_then(|slot| slot.as_ref())
                .map(|inner| self.type_name(inner))
                .unwrap_or_else(|| "unknown".to_string()),
        }
    }
}

fn lower(expr: &Expr, cells: &mut Vec<Option<Combinator>>) -> Combinator {
    match expr {
        Expr::Primitive(primitive) => Combinator::Primitive(*primitive),
        Expr::Literal(literal) => Combinator::Literal(literal.clone()),
        Expr::Union(members) => {
            Combinator::Union(members.iter().map(|m| lower(m, cells)).collect())
        }
        Expr::Intersection(members) => {
            Combinator::Intersection(members.iter().map(|m| lower(m, cells)).collect())
        }
        Expr::Object(properties) => Combinator::Object(
            properties
                .iter()
                .map(|property| PropertySlot {
                    name: property.name.clone(),
                    inner: lower(&property.expr, cells),
                    optional: property.optional,
                })
                .collect(),
        ),
        Expr::Array(element) => Combinator::Array(Box::new(lower(element, cells))),
        Expr::Tuple(elements) => {
            Combinator::Tuple(elements.iter().map(|e| lower(e, cells)).collect())
        }
        Expr::Record(inner) => Combinator::Record(Box::new(lower(inner, cells))),
        Expr::Annotation {
            key,
            payload,
            inner,
        } => Combinator::Annotation {
            key: key.clone(),
            payload: payload.clone(),
            inner: Box::new(lower(inner, cells)),
        },
        Expr::Recursive { cell, body } => {
            // The body can forward to its own cell before the slot is
            // filled; nothing dereferences cells until validate-time.
            let body = lower(body, cells);
            if cells.len() <= cell.0 {
                cells.resize_with(cell.0 + 1, || None);
            }
            cells[cell.0] = Some(body);
            Combinator::Recurse(*cell)
        }
        Expr::Ref(cell) => Combinator::Recurse(*cell),
    }
}

fn primitive_matches(primitive: Primitive, value: &Value) -> bool {
    match primitive {
        Primitive::String => matches!(value, Value::String(_)),
        Primitive::Number => matches!(value, Value::Number(_)),
        Primitive::Boolean => matches!(value, Value::Bool(_)),
        Primitive::Null => matches!(value, Value::Null),
        Primitive::Object => matches!(value, Value::Object(_)),
        Primitive::Any | Primitive::Unknown => true,
    }
}

fn literal_matches(literal: &LiteralValue, value: &Value) -> bool {
    match (literal, value) {
        (LiteralValue::Bool(a), Value::Bool(b)) => a == b,
        (LiteralValue::Number(a), Value::Number(b)) => a == b,
        (LiteralValue::String(a), Value::String(b)) => a == b,
        _ => false,
    }
}

/// Facade pairing a validator with the error buffer of the most recent
/// collecting check.
///
/// The buffer is replaced on each [`Checker::check_with_errors`] call and
/// stays readable through [`Checker::read_errors`] until the next one.
/// Silent [`Checker::check`] calls never touch it.
#[derive(Debug, Clone)]
pub struct Checker {
    validator: Validator,
    errors: Vec<ValidationError>,
}

impl Checker {
    /// Wrap an already-built validator.
    pub fn new(validator: Validator) -> Self {
        Self {
            validator,
            errors: Vec::new(),
        }
    }

    /// Compile a schema node and wrap the result.
    pub fn build(graph: &SchemaGraph, root: NodeId) -> CompileResult<Self> {
        Ok(Self::new(build_validator(graph, root)?))
    }

    /// Silent check.
    pub fn check(&self, graph: &ValueGraph, value: ValueId) -> bool {
        self.validator.check(graph, value)
    }

    /// Collecting check; replaces the readable buffer.
    pub fn check_with_errors(&mut self, graph: &ValueGraph, value: ValueId) -> bool {
        self.validator.check_with_errors(graph, value, &mut self.errors)
    }

    /// Errors from the most recent collecting check.
    pub fn read_errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// The wrapped validator.
    pub fn validator(&self) -> &Validator {
        &self.validator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Property;
    use serde_json::json;

    fn build(schema: impl FnOnce(&mut SchemaGraph) -> NodeId) -> Checker {
        let mut graph = SchemaGraph::new();
        let root = schema(&mut graph);
        Checker::build(&graph, root).expect("schema compiles")
    }

    #[test]
    fn test_primitive_kinds() {
        let checker = build(|g| g.primitive("number"));
        let (graph, v) = ValueGraph::from_json(&json!(1.5));
        assert!(checker.check(&graph, v));
        let (graph, v) = ValueGraph::from_json(&json!("1.5"));
        assert!(!checker.check(&graph, v));
    }

    #[test]
    fn test_any_and_unknown_pass_everything() {
        for name in ["any", "unknown"] {
            let checker = build(|g| g.primitive(name));
            for value in [json!(null), json!(true), json!(1), json!("x"), json!([]), json!({})] {
                let (graph, v) = ValueGraph::from_json(&value);
                assert!(checker.check(&graph, v), "{name} vs {value}");
            }
        }
    }

    #[test]
    fn test_null_primitive() {
        let checker = build(|g| g.primitive("null"));
        let (graph, v) = ValueGraph::from_json(&json!(null));
        assert!(checker.check(&graph, v));
        let (graph, v) = ValueGraph::from_json(&json!(0));
        assert!(!checker.check(&graph, v));
    }

    #[test]
    fn test_literal_targets_in_errors() {
        let mut checker = build(|g| g.literal("dog"));
        let (graph, v) = ValueGraph::from_json(&json!("cat"));
        assert!(!checker.check_with_errors(&graph, v));
        assert_eq!(
            checker.read_errors(),
            &[ValidationError::invalid_type("dog", vec![])]
        );

        let mut checker = build(|g| g.literal(5.0));
        let (graph, v) = ValueGraph::from_json(&json!(6));
        assert!(!checker.check_with_errors(&graph, v));
        assert_eq!(
            checker.read_errors(),
            &[ValidationError::invalid_type("5", vec![])]
        );
    }

    #[test]
    fn test_tuple_length_mismatch() {
        let mut checker = build(|g| {
            let n = g.primitive("number");
            let s = g.primitive("string");
            g.tuple(vec![n, s])
        });
        let (graph, v) = ValueGraph::from_json(&json!([1]));
        assert!(!checker.check_with_errors(&graph, v));
        assert_eq!(
            checker.read_errors(),
            &[ValidationError::invalid_type("tuple", vec![])]
        );
    }

    #[test]
    fn test_annotation_is_transparent() {
        let mut checker = build(|g| {
            let s = g.primitive("string");
            let format = g.annotation("format", json!("email"));
            g.intersection(vec![s, format])
        });
        // Not remotely an email: annotations are advisory only.
        let (graph, v) = ValueGraph::from_json(&json!("not an email"));
        assert!(checker.check(&graph, v));

        let (graph, v) = ValueGraph::from_json(&json!(42));
        assert!(!checker.check_with_errors(&graph, v));
        assert_eq!(
            checker.read_errors(),
            &[ValidationError::invalid_type("string", vec![])]
        );
    }

    #[test]
    fn test_union_member_names() {
        let mut checker = build(|g| {
            let n = g.primitive("number");
            let a = g.array(n);
            let s = g.primitive("string");
            g.union(vec![a, s])
        });
        let (graph, v) = ValueGraph::from_json(&json!(true));
        assert!(!checker.check_with_errors(&graph, v));
        assert_eq!(
            checker.read_errors(),
            &[
                ValidationError::invalid_type("string", vec![]),
                ValidationError::invalid_type("array", vec![]),
            ]
        );
    }

    #[test]
    fn test_discriminant_through_annotation() {
        // The branch resolution sees through annotation wrappers.
        let mut checker = build(|g| {
            let dog_tag = g.literal("dog");
            let name = g.primitive("string");
            let dog = g.object(vec![
                Property::required("type", dog_tag),
                Property::required("name", name),
            ]);
            let deprecated = g.annotation("deprecated", json!(true));
            let annotated_dog = g.intersection(vec![dog, deprecated]);

            let cat_tag = g.literal("cat");
            let age = g.primitive("number");
            let cat = g.object(vec![
                Property::required("type", cat_tag),
                Property::required("age", age),
            ]);
            g.union(vec![annotated_dog, cat])
        });

        let (graph, v) = ValueGraph::from_json(&json!({"type": "dog", "age": 5}));
        assert!(!checker.check_with_errors(&graph, v));
        assert_eq!(
            checker.read_errors(),
            &[ValidationError::missing_property("name", vec![])]
        );
    }

    #[test]
    fn test_checker_buffer_lifecycle() {
        let mut checker = build(|g| g.primitive("number"));

        let (graph, bad) = ValueGraph::from_json(&json!("x"));
        assert!(!checker.check_with_errors(&graph, bad));
        assert_eq!(checker.read_errors().len(), 1);

        // A silent check leaves the buffer untouched.
        assert!(!checker.check(&graph, bad));
        assert_eq!(checker.read_errors().len(), 1);

        // The next collecting check replaces it.
        let (graph, good) = ValueGraph::from_json(&json!(1));
        assert!(checker.check_with_errors(&graph, good));
        assert!(checker.read_errors().is_empty());
    }
}
