//! Schema compiler.
//!
//! [`Compiler::compile`] walks a [`SchemaGraph`] once and produces a
//! validator expression tree ([`Expr`]). Cyclic schemas are handled with
//! an in-progress map keyed on node identity: re-entering a node that is
//! currently being compiled marks it recursive and yields a forward
//! reference to its recursion cell instead of descending again. There is
//! no cross-sibling memoization — a type used twice independently is
//! compiled twice.

use std::collections::HashMap;

use crate::error::{CompileError, CompileResult};
use crate::schema::{LiteralValue, NodeId, SchemaGraph, SchemaNode};

/// Identifier of a recursion cell allocated during compilation.
///
/// One cell exists per node the compiler entered; only cells whose node
/// turned out to be self-referential survive into the expression tree,
/// where they key the runtime recursion guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellId(pub usize);

/// Primitive kinds the runtime can check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    String,
    Number,
    Boolean,
    Null,
    Object,
    /// Matches anything.
    Any,
    /// Matches anything.
    Unknown,
}

impl Primitive {
    /// Resolve a schema primitive name. Unknown names compile-error.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "string" => Some(Primitive::String),
            "number" => Some(Primitive::Number),
            "boolean" => Some(Primitive::Boolean),
            "null" => Some(Primitive::Null),
            "object" => Some(Primitive::Object),
            "any" => Some(Primitive::Any),
            "unknown" => Some(Primitive::Unknown),
            _ => None,
        }
    }

    /// Schema name of this kind, used as the error target on mismatch.
    pub fn name(&self) -> &'static str {
        match self {
            Primitive::String => "string",
            Primitive::Number => "number",
            Primitive::Boolean => "boolean",
            Primitive::Null => "null",
            Primitive::Object => "object",
            Primitive::Any => "any",
            Primitive::Unknown => "unknown",
        }
    }
}

/// One compiled object property.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyExpr {
    pub name: String,
    pub expr: Expr,
    pub optional: bool,
}

/// Validator expression tree produced by the compiler.
///
/// This is the compiler's output and the runtime's input; the emitter
/// renders it to combinator source text.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Primitive(Primitive),
    Literal(LiteralValue),
    Union(Vec<Expr>),
    Intersection(Vec<Expr>),
    Object(Vec<PropertyExpr>),
    Array(Box<Expr>),
    Tuple(Vec<Expr>),
    Record(Box<Expr>),
    /// Advisory annotation wrapper; delegates to `inner` unchanged.
    Annotation {
        key: String,
        payload: serde_json::Value,
        inner: Box<Expr>,
    },
    /// Recursion point: `body` is stored in `cell`, and [`Expr::Ref`]
    /// occurrences inside `body` forward to it.
    Recursive { cell: CellId, body: Box<Expr> },
    /// Forward reference to an enclosing [`Expr::Recursive`] cell.
    Ref(CellId),
}

#[derive(Debug)]
struct InProgress {
    cell: CellId,
    recursive: bool,
}

/// Compiles schema nodes into validator expressions.
#[derive(Debug)]
pub struct Compiler<'a> {
    graph: &'a SchemaGraph,
    in_progress: HashMap<NodeId, InProgress>,
    next_cell: usize,
}

impl<'a> Compiler<'a> {
    /// Create a compiler over a schema graph.
    pub fn new(graph: &'a SchemaGraph) -> Self {
        Self {
            graph,
            in_progress: HashMap::new(),
            next_cell: 0,
        }
    }

    /// Compile one node into an expression tree.
    pub fn compile(&mut self, node: NodeId) -> CompileResult<Expr> {
        if let Some(entry) = self.in_progress.get_mut(&node) {
            entry.recursive = true;
            return Ok(Expr::Ref(entry.cell));
        }

        let cell = CellId(self.next_cell);
        self.next_cell += 1;
        self.in_progress.insert(
            node,
            InProgress {
                cell,
                recursive: false,
            },
        );

        let body = self.compile_node(node);
        let entry = self.in_progress.remove(&node);
        let body = body?;

        match entry {
            Some(entry) if entry.recursive => Ok(Expr::Recursive {
                cell: entry.cell,
                body: Box::new(body),
            }),
            _ => Ok(body),
        }
    }

    fn compile_node(&mut self, node: NodeId) -> CompileResult<Expr> {
        let schema = self
            .graph
            .get(node)
            .ok_or(CompileError::MissingNode { id: node })?;

        match schema {
            SchemaNode::Primitive(name) => {
                let primitive = Primitive::from_name(name).ok_or_else(|| {
                    CompileError::UnknownPrimitive { name: name.clone() }
                })?;
                Ok(Expr::Primitive(primitive))
            }

            SchemaNode::Literal(value) => Ok(Expr::Literal(value.clone())),

            SchemaNode::Union(members) => self.compile_union(members.clone()),

            SchemaNode::Intersection(members) => self.compile_intersection(members.clone()),

            SchemaNode::Object(properties) => {
                let properties = properties.clone();
                let mut compiled = Vec::with_capacity(properties.len());
                for property in properties {
                    compiled.push(PropertyExpr {
                        expr: self.compile(property.node)?,
                        name: property.name,
                        optional: property.optional,
                    });
                }
                Ok(Expr::Object(compiled))
            }

            SchemaNode::Array(element) => {
                let element = *element;
                Ok(Expr::Array(Box::new(self.compile(element)?)))
            }

            SchemaNode::Tuple(elements) => {
                let elements = elements.clone();
                let mut compiled = Vec::with_capacity(elements.len());
                for element in elements {
                    compiled.push(self.compile(element)?);
                }
                Ok(Expr::Tuple(compiled))
            }

            // The key constraint stays documentation-only: just the value
            // side is compiled.
            SchemaNode::Record { value, .. } => {
                let value = *value;
                Ok(Expr::Record(Box::new(self.compile(value)?)))
            }

            SchemaNode::Annotation { key, .. } => Err(CompileError::DanglingAnnotation {
                key: key.clone(),
            }),
        }
    }

    fn compile_union(&mut self, members: Vec<NodeId>) -> CompileResult<Expr> {
        if members.is_empty() {
            return Err(CompileError::EmptyUnion);
        }

        let mut compiled = Vec::with_capacity(members.len());
        for member in members {
            compiled.push(self.compile(member)?);
        }

        // `true | false` collapses to one boolean member: semantically
        // equivalent, fewer branches, cleaner union error reporting.
        let has_true = compiled
            .iter()
            .any(|expr| *expr == Expr::Literal(LiteralValue::Bool(true)));
        let has_false = compiled
            .iter()
            .any(|expr| *expr == Expr::Literal(LiteralValue::Bool(false)));
        if has_true && has_false {
            compiled.retain(|expr| {
                !matches!(expr, Expr::Literal(LiteralValue::Bool(_)))
            });
            compiled.push(Expr::Primitive(Primitive::Boolean));
        }

        Ok(Expr::Union(compiled))
    }

    fn compile_intersection(&mut self, members: Vec<NodeId>) -> CompileResult<Expr> {
        // Annotations are split off by schema-node kind before compiling,
        // keeping member order on both sides.
        let mut annotations = Vec::new();
        let mut rest = Vec::new();
        for member in members {
            match self.graph.get(member) {
                Some(SchemaNode::Annotation { key, payload }) => {
                    annotations.push((key.clone(), payload.clone()));
                }
                _ => rest.push(member),
            }
        }

        if rest.is_empty() {
            return Err(CompileError::EmptyIntersection);
        }

        let mut compiled = Vec::with_capacity(rest.len());
        for member in rest {
            compiled.push(self.compile(member)?);
        }

        // A single remaining member degenerates to itself, unwrapped.
        let mut out = if compiled.len() == 1 {
            compiled.remove(0)
        } else {
            Expr::Intersection(compiled)
        };

        for (key, payload) in annotations {
            out = Expr::Annotation {
                key,
                payload,
                inner: Box::new(out),
            };
        }

        Ok(out)
    }
}

/// Compile a schema node into an expression tree.
pub fn compile(graph: &SchemaGraph, root: NodeId) -> CompileResult<Expr> {
    Compiler::new(graph).compile(root)
}
