use serde::Deserialize;

use crate::network::element::ElementId;

/// A link between two nodes. In the NetBox-derived data this is device -> subnet,
/// one per interface address.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Edge {
    pub id: ElementId,
    pub source: ElementId,
    pub target: ElementId,
    #[serde(default)]
    pub label: Option<String>,
}

impl Edge {
    pub fn new(
        id: impl Into<ElementId>,
        source: impl Into<ElementId>,
        target: impl Into<ElementId>,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}
