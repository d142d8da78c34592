//! Combinator source emission.
//!
//! Renders a compiled [`Expr`] to the source text of nested combinator
//! calls, collecting the set of combinator names referenced so a build
//! step can link them. Output is deterministic: recursion cells get
//! stable `r{n}` placeholders keyed on their cell id.

use std::collections::BTreeSet;

use crate::compile::Expr;
use crate::schema::{format_number, LiteralValue};

/// Rendered combinator source plus the names it references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Emitted {
    /// Source text of the validator expression.
    pub source: String,
    /// Combinator names referenced, for linking.
    pub imports: BTreeSet<String>,
}

/// Render an expression tree to combinator source text.
pub fn emit(expr: &Expr) -> Emitted {
    let mut imports = BTreeSet::new();
    let source = render(expr, &mut imports);
    Emitted { source, imports }
}

fn render(expr: &Expr, imports: &mut BTreeSet<String>) -> String {
    match expr {
        Expr::Primitive(primitive) => {
            imports.insert(primitive.name().to_string());
            primitive.name().to_string()
        }

        Expr::Literal(literal) => {
            imports.insert("literal".to_string());
            format!("literal({})", render_literal(literal))
        }

        Expr::Union(members) => {
            imports.insert("union".to_string());
            format!("union({})", render_list(members, imports))
        }

        Expr::Intersection(members) => {
            imports.insert("intersection".to_string());
            format!("intersection({})", render_list(members, imports))
        }

        Expr::Object(properties) => {
            imports.insert("object".to_string());
            let body = properties
                .iter()
                .map(|property| {
                    let mut inner = render(&property.expr, imports);
                    if property.optional {
                        imports.insert("optional".to_string());
                        inner = format!("optional({})", inner);
                    }
                    format!("{}: {}", json_string(&property.name), inner)
                })
                .collect::<Vec<_>>()
                .join(", ");
            format!("object({{{}}})", body)
        }

        Expr::Array(element) => {
            imports.insert("array".to_string());
            format!("array({})", render(element, imports))
        }

        Expr::Tuple(elements) => {
            imports.insert("tuple".to_string());
            format!("tuple({})", render_list(elements, imports))
        }

        Expr::Record(inner) => {
            imports.insert("record".to_string());
            format!("record({})", render(inner, imports))
        }

        Expr::Annotation {
            key,
            payload,
            inner,
        } => {
            imports.insert(key.clone());
            format!("{}({}, {})", key, payload, render(inner, imports))
        }

        Expr::Recursive { cell, body } => {
            imports.insert("recursive".to_string());
            format!("recursive((r{}) => {})", cell.0, render(body, imports))
        }

        Expr::Ref(cell) => format!("r{}", cell.0),
    }
}

fn render_list(members: &[Expr], imports: &mut BTreeSet<String>) -> String {
    members
        .iter()
        .map(|member| render(member, imports))
        .collect::<Vec<_>>()
        .join(", ")
}

fn render_literal(literal: &LiteralValue) -> String {
    match literal {
        LiteralValue::Bool(b) => b.to_string(),
        LiteralValue::Number(n) => format_number(*n),
        LiteralValue::String(s) => json_string(s),
    }
}

fn json_string(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}
