//! Schema graph definitions.
//!
//! Schemas are stored in an arena ([`SchemaGraph`]) and addressed by
//! [`NodeId`]. Identity matters here: the compiler keys its cycle
//! detection on node ids, so every occurrence of "the same" type must
//! share one node. Two structurally identical but distinct nodes are
//! deliberately treated as different types.
//!
//! The arena supports [`SchemaGraph::reserve`] / [`SchemaGraph::fill`]
//! so self-referential graphs can be built:
//!
//! ```rust
//! use typeguard::schema::{Property, SchemaGraph};
//!
//! // type Tree = { value: number, next?: Tree }
//! let mut graph = SchemaGraph::new();
//! let tree = graph.reserve();
//! let number = graph.primitive("number");
//! graph.fill(
//!     tree,
//!     typeguard::schema::SchemaNode::Object(vec![
//!         Property::required("value", number),
//!         Property::optional("next", tree),
//!     ]),
//! );
//! ```

use serde::{Deserialize, Serialize};

/// Identifier of a node in a [`SchemaGraph`].
///
/// Ids are stable indices into the owning graph and double as type
/// identity for cycle detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub usize);

/// A literal value a schema can pin a field to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LiteralValue {
    /// Boolean literal (`true` / `false`).
    Bool(bool),
    /// Numeric literal.
    Number(f64),
    /// String literal.
    String(String),
}

impl LiteralValue {
    /// Textual form used as the `target` of an `invalid-type` error.
    ///
    /// Numbers with integer values render without a fraction, strings
    /// render unquoted.
    pub fn to_target(&self) -> String {
        match self {
            LiteralValue::Bool(b) => b.to_string(),
            LiteralValue::Number(n) => format_number(*n),
            LiteralValue::String(s) => s.clone(),
        }
    }
}

impl From<bool> for LiteralValue {
    fn from(value: bool) -> Self {
        LiteralValue::Bool(value)
    }
}

impl From<f64> for LiteralValue {
    fn from(value: f64) -> Self {
        LiteralValue::Number(value)
    }
}

impl From<i64> for LiteralValue {
    fn from(value: i64) -> Self {
        LiteralValue::Number(value as f64)
    }
}

impl From<&str> for LiteralValue {
    fn from(value: &str) -> Self {
        LiteralValue::String(value.to_string())
    }
}

impl From<String> for LiteralValue {
    fn from(value: String) -> Self {
        LiteralValue::String(value)
    }
}

/// Render a float the way JSON does: no trailing `.0` on integers.
pub(crate) fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// One declared property of an object schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    /// Property name as it appears on the value.
    pub name: String,

    /// Schema node the property's value must conform to.
    pub node: NodeId,

    /// Whether the property may be absent.
    #[serde(default)]
    pub optional: bool,
}

impl Property {
    /// Create a required property.
    pub fn required(name: impl Into<String>, node: NodeId) -> Self {
        Self {
            name: name.into(),
            node,
            optional: false,
        }
    }

    /// Create an optional property.
    pub fn optional(name: impl Into<String>, node: NodeId) -> Self {
        Self {
            name: name.into(),
            node,
            optional: true,
        }
    }
}

/// A single schema node.
///
/// This is a closed set: both the compiler and the runtime match on it
/// exhaustively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "kebab-case")]
pub enum SchemaNode {
    /// A named primitive kind (`"string"`, `"number"`, ...). Unknown
    /// names are rejected at compile time.
    Primitive(String),

    /// An exact literal value.
    Literal(LiteralValue),

    /// Union of members, in declaration order.
    Union(Vec<NodeId>),

    /// Intersection of members, in declaration order. Annotation members
    /// are carried here until the compiler separates them.
    Intersection(Vec<NodeId>),

    /// Object with an ordered property list.
    Object(Vec<Property>),

    /// Homogeneous array.
    Array(NodeId),

    /// Fixed-length heterogeneous tuple.
    Tuple(Vec<NodeId>),

    /// Key-value mapping. The key constraint is recorded for
    /// documentation but never compiled into a runtime check.
    Record {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        key: Option<NodeId>,
        value: NodeId,
    },

    /// Annotation marker inside an intersection; carried, never enforced.
    Annotation {
        key: String,
        payload: serde_json::Value,
    },
}

/// Arena of schema nodes, possibly cyclic.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaGraph {
    nodes: Vec<Option<SchemaNode>>,
}

impl SchemaGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node and return its id.
    pub fn add(&mut self, node: SchemaNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Some(node));
        id
    }

    /// Reserve an id to be filled later, for building cyclic graphs.
    ///
    /// Compiling a reserved-but-unfilled node is a compile error.
    pub fn reserve(&mut self) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(None);
        id
    }

    /// Fill a previously reserved slot.
    pub fn fill(&mut self, id: NodeId, node: SchemaNode) {
        self.nodes[id.0] = Some(node);
    }

    /// Look up a node. Returns `None` for dangling or unfilled ids.
    pub fn get(&self, id: NodeId) -> Option<&SchemaNode> {
        self.nodes.get(id.0).and_then(|slot| slot.as_ref())
    }

    /// Number of slots in the arena, filled or not.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check whether the arena is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // ==========================================================================
    // Convenience constructors
    // ==========================================================================

    /// Add a primitive node.
    pub fn primitive(&mut self, name: impl Into<String>) -> NodeId {
        self.add(SchemaNode::Primitive(name.into()))
    }

    /// Add a literal node.
    pub fn literal(&mut self, value: impl Into<LiteralValue>) -> NodeId {
        self.add(SchemaNode::Literal(value.into()))
    }

    /// Add a union node.
    pub fn union(&mut self, members: Vec<NodeId>) -> NodeId {
        self.add(SchemaNode::Union(members))
    }

    /// Add an intersection node.
    pub fn intersection(&mut self, members: Vec<NodeId>) -> NodeId {
        self.add(SchemaNode::Intersection(members))
    }

    /// Add an object node.
    pub fn object(&mut self, properties: Vec<Property>) -> NodeId {
        self.add(SchemaNode::Object(properties))
    }

    /// Add an array node.
    pub fn array(&mut self, element: NodeId) -> NodeId {
        self.add(SchemaNode::Array(element))
    }

    /// Add a tuple node.
    pub fn tuple(&mut self, elements: Vec<NodeId>) -> NodeId {
        self.add(SchemaNode::Tuple(elements))
    }

    /// Add a record node checking values only.
    pub fn record(&mut self, value: NodeId) -> NodeId {
        self.add(SchemaNode::Record { key: None, value })
    }

    /// Add a record node with a documented (unenforced) key constraint.
    pub fn record_with_key(&mut self, key: NodeId, value: NodeId) -> NodeId {
        self.add(SchemaNode::Record {
            key: Some(key),
            value,
        })
    }

    /// Add an annotation node.
    pub fn annotation(&mut self, key: impl Into<String>, payload: serde_json::Value) -> NodeId {
        self.add(SchemaNode::Annotation {
            key: key.into(),
            payload,
        })
    }
}
