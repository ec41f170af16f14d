use std::collections::HashMap;

use egui::Pos2;
use egui_graphs::Graph;
use petgraph::{
    Directed,
    csr::DefaultIx,
    graph::{EdgeIndex, NodeIndex},
    prelude::StableGraph,
};
use rand::Rng;
use tracing::debug;

use crate::{
    controller::engine::TopologyEngine,
    export::{ExportError, ImageFormat},
    gui::{edge_shape::NetworkGraphEdgeShape, node_shape::NetworkGraphNodeShape},
    network::{
        edge::Edge,
        element::ElementId,
        node::Node,
        topology::{Point, Topology},
    },
};

/// Node payload of the egui graph.
#[derive(Debug, Clone)]
pub struct GraphNode {
    pub node: Node,
    pub highlighted: bool,
}

/// Edge payload of the egui graph.
#[derive(Debug, Clone)]
pub struct GraphEdge {
    pub edge: Edge,
    pub highlighted: bool,
}

pub type ViewGraph = Graph<
    GraphNode,
    GraphEdge,
    Directed,
    DefaultIx,
    NetworkGraphNodeShape,
    NetworkGraphEdgeShape,
>;

/// The egui projection of a [`Topology`].
///
/// Grouping nodes (vrf, tenant) stay in the topology but are not part of the egui graph;
/// the GUI draws them as frames around their members. Highlight changes go through the
/// [`TopologyEngine`] impl so the topology and the drawn payloads never disagree.
pub struct NetworkGraph {
    pub graph: ViewGraph,
    topology: Topology,
    node_index: HashMap<ElementId, NodeIndex>,
    edge_index: HashMap<ElementId, EdgeIndex>,
}

impl Default for NetworkGraph {
    fn default() -> Self {
        Self::build_new(Topology::default())
    }
}

impl NetworkGraph {
    /// Build the egui graph from the laid-out topology.
    ///
    /// Starting positions are the topology's seeded layout with a little jitter, so the
    /// force-directed layout does not start from a perfectly symmetric state.
    pub fn build_new(topology: Topology) -> Self {
        let mut stable = StableGraph::<GraphNode, GraphEdge, Directed, DefaultIx>::default();
        let mut node_index = HashMap::new();
        for node in topology.nodes().iter().filter(|n| !n.is_grouping()) {
            let index = stable.add_node(GraphNode {
                node: node.clone(),
                highlighted: topology.is_marked(&node.id),
            });
            node_index.insert(node.id.clone(), index);
        }

        let mut edge_index = HashMap::new();
        for edge in topology.edges() {
            let (Some(&source), Some(&target)) =
                (node_index.get(&edge.source), node_index.get(&edge.target))
            else {
                debug!(id = %edge.id, "Edge touches a grouping node, not drawn");
                continue;
            };
            let index = stable.add_edge(
                source,
                target,
                GraphEdge {
                    edge: edge.clone(),
                    highlighted: topology.is_marked(&edge.id),
                },
            );
            edge_index.insert(edge.id.clone(), index);
        }

        let mut graph: ViewGraph = egui_graphs::to_graph(&stable);

        let mut rng = rand::rng();
        for (id, &index) in node_index.iter() {
            let Some(node) = graph.node_mut(index) else {
                continue;
            };
            let seed = topology.position(id).unwrap_or_default();
            node.set_location(Pos2::new(
                seed.x + rng.random_range(-5.0..5.0),
                seed.y + rng.random_range(-5.0..5.0),
            ));
            node.set_label(id.to_string());
        }

        Self {
            graph,
            topology,
            node_index,
            edge_index,
        }
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Id of the node under the pointer, as tracked by the graph view.
    pub fn hovered_id(&self) -> Option<ElementId> {
        let index = self.graph.hovered_node()?;
        self.graph.node(index).map(|n| n.payload().node.id.clone())
    }

    /// Copy the current on-screen layout into the topology so exports match the window.
    pub fn sync_positions(&mut self) {
        for (id, &index) in self.node_index.iter() {
            if let Some(node) = self.graph.node(index) {
                let location = node.location();
                self.topology
                    .set_position(id, Point::new(location.x, location.y));
            }
        }
    }

    fn set_node_highlight(&mut self, index: NodeIndex, highlighted: bool) {
        if let Some(node) = self.graph.node_mut(index) {
            node.payload_mut().highlighted = highlighted;
            node.display_mut().set_highlighted(highlighted);
        }
    }

    fn set_edge_highlight(&mut self, index: EdgeIndex, highlighted: bool) {
        if let Some(edge) = self.graph.edge_mut(index) {
            edge.payload_mut().highlighted = highlighted;
            edge.display_mut().set_highlighted(highlighted);
        }
    }
}

impl TopologyEngine for NetworkGraph {
    fn node(&self, id: &ElementId) -> Option<&Node> {
        self.topology.node(id)
    }

    fn shortest_path(&self, start: &ElementId, goal: &ElementId) -> Option<Vec<ElementId>> {
        self.topology.shortest_path(start, goal)
    }

    fn mark_highlighted(&mut self, id: &ElementId) {
        if !self.topology.mark(id) {
            return;
        }
        if let Some(&index) = self.node_index.get(id) {
            self.set_node_highlight(index, true);
        } else if let Some(&index) = self.edge_index.get(id) {
            self.set_edge_highlight(index, true);
        }
    }

    fn clear_highlighted(&mut self) {
        let marked: Vec<ElementId> = self.topology.marked().cloned().collect();
        self.topology.clear_marks();
        for id in marked {
            if let Some(&index) = self.node_index.get(&id) {
                self.set_node_highlight(index, false);
            } else if let Some(&index) = self.edge_index.get(&id) {
                self.set_edge_highlight(index, false);
            }
        }
    }

    fn export_image(&mut self, format: ImageFormat, scale: f32) -> Result<Vec<u8>, ExportError> {
        self.sync_positions();
        self.topology.export_image(format, scale)
    }
}
