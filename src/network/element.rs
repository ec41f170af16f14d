use std::{borrow::Borrow, fmt::Display};

use serde::Deserialize;

use crate::network::{edge::Edge, node::Node};

/// Identifier shared by nodes and edges. Both live in one namespace, so an edge
/// may not reuse the id of a node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(transparent)]
pub struct ElementId(String);

impl ElementId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ElementId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ElementId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ElementId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A single element record as it appears on the wire.
///
/// The endpoint emits renderer-style records (`{"data": {...}}`), but bare objects
/// are accepted too so hand-written snapshots stay short.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ElementRecord<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> ElementRecord<T> {
    pub fn into_inner(self) -> T {
        match self {
            ElementRecord::Wrapped { data } => data,
            ElementRecord::Bare(data) => data,
        }
    }
}

/// Body of `GET /api/nodes_and_edges`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ElementsWire {
    #[serde(default)]
    pub nodes: Vec<ElementRecord<Node>>,
    #[serde(default)]
    pub edges: Vec<ElementRecord<Edge>>,
}

/// The raw element set handed to the engine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Elements {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl Elements {
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        Self { nodes, edges }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let wire: ElementsWire = serde_json::from_str(json)?;
        Ok(wire.into())
    }
}

impl From<ElementsWire> for Elements {
    fn from(wire: ElementsWire) -> Self {
        Self {
            nodes: wire.nodes.into_iter().map(ElementRecord::into_inner).collect(),
            edges: wire.edges.into_iter().map(ElementRecord::into_inner).collect(),
        }
    }
}
