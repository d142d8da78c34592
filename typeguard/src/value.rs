//! Runtime value graph.
//!
//! Subjects under validation are stored in an arena ([`ValueGraph`]) and
//! addressed by [`ValueId`]. Arrays and objects hold id edges rather than
//! owned children, so value graphs can share nodes and cycle; the id
//! doubles as object identity for the recursion guard.
//!
//! Plain JSON trees import via [`ValueGraph::from_json`]; cyclic graphs
//! are built by hand with [`ValueGraph::reserve`] / [`ValueGraph::set`].

/// Identifier of a value in a [`ValueGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ValueId(pub usize);

/// A single runtime value node.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    /// Ordered elements, by id.
    Array(Vec<ValueId>),
    /// Ordered key-value entries, by id.
    Object(Vec<(String, ValueId)>),
}

impl Value {
    /// Runtime kind name, matching primitive schema names.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    /// Look up an object field by name. Returns `None` for absent fields
    /// and for non-object values.
    pub fn field(&self, name: &str) -> Option<ValueId> {
        match self {
            Value::Object(entries) => entries
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, id)| *id),
            _ => None,
        }
    }
}

/// Arena of runtime values, possibly cyclic.
#[derive(Debug, Clone, Default)]
pub struct ValueGraph {
    values: Vec<Value>,
}

impl ValueGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value and return its id.
    pub fn add(&mut self, value: Value) -> ValueId {
        let id = ValueId(self.values.len());
        self.values.push(value);
        id
    }

    /// Reserve an id (initially `Null`) to be overwritten later, for
    /// building cyclic graphs.
    pub fn reserve(&mut self) -> ValueId {
        self.add(Value::Null)
    }

    /// Overwrite a previously added or reserved value.
    pub fn set(&mut self, id: ValueId, value: Value) {
        self.values[id.0] = value;
    }

    /// Look up a value by id.
    ///
    /// Ids must come from this graph; a foreign id panics like any
    /// out-of-bounds index.
    pub fn get(&self, id: ValueId) -> &Value {
        &self.values[id.0]
    }

    /// Number of values in the arena.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check whether the arena is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Import a JSON tree, returning the graph and the root id.
    pub fn from_json(json: &serde_json::Value) -> (Self, ValueId) {
        let mut graph = Self::new();
        let root = graph.add_json(json);
        (graph, root)
    }

    /// Import a JSON tree into an existing graph, returning the root id.
    ///
    /// Numbers are widened to `f64`.
    pub fn add_json(&mut self, json: &serde_json::Value) -> ValueId {
        let value = match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::String(s.clone()),
            serde_json::Value::Array(items) => {
                let ids = items.iter().map(|item| self.add_json(item)).collect();
                Value::Array(ids)
            }
            serde_json::Value::Object(entries) => {
                let ids = entries
                    .iter()
                    .map(|(key, item)| (key.clone(), self.add_json(item)))
                    .collect();
                Value::Object(ids)
            }
        };
        self.add(value)
    }
}
