use std::collections::{HashMap, HashSet};

use petgraph::{algo::astar, graph::NodeIndex, graph::UnGraph};
use tracing::{debug, warn};

use crate::{
    controller::engine::TopologyEngine,
    export::{self, ExportError, ImageFormat},
    network::{edge::Edge, element::ElementId, element::Elements, node::Node},
    style::DEFAULT_STYLE,
};

/// A position on the layout canvas.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// The element set plus the visual state that belongs to it: layout positions and the
/// highlighted marker.
///
/// Pathfinding runs on an undirected index where every edge costs one hop, so the
/// direction of an edge only matters for drawing its arrow. Edges touching a vrf or
/// tenant node are kept for lookup but never enter that index.
#[derive(Debug, Clone, Default)]
pub struct Topology {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    node_lookup: HashMap<ElementId, usize>,
    edge_lookup: HashMap<ElementId, usize>,
    // Weights are positions in `nodes` / `edges`.
    path_index: UnGraph<usize, usize>,
    positions: Vec<Point>,
    highlighted: HashSet<ElementId>,
}

impl Topology {
    /// Build the engine state from raw elements.
    ///
    /// Invalid references are dropped rather than failing the load: duplicate ids keep the
    /// first element, edges with unknown endpoints are skipped, dangling parents are cleared.
    pub fn build(elements: Elements) -> Self {
        let mut topology = Topology::default();

        for node in elements.nodes {
            if topology.node_lookup.contains_key(&node.id) {
                warn!(id = %node.id, "Duplicate node id, keeping the first occurrence");
                continue;
            }
            let position = topology.nodes.len();
            let index = topology.path_index.add_node(position);
            debug_assert_eq!(index.index(), position);
            topology.node_lookup.insert(node.id.clone(), position);
            topology.nodes.push(node);
        }

        let known: HashSet<ElementId> = topology.node_lookup.keys().cloned().collect();
        for node in topology.nodes.iter_mut() {
            let Some(parent) = &node.parent else {
                continue;
            };
            if parent == &node.id || !known.contains(parent) {
                warn!(id = %node.id, parent = %parent, "Dropping unknown parent reference");
                node.parent = None;
            }
        }

        for edge in elements.edges {
            if topology.edge_lookup.contains_key(&edge.id) || topology.node_lookup.contains_key(&edge.id) {
                warn!(id = %edge.id, "Duplicate element id, skipping edge");
                continue;
            }
            let (Some(&source), Some(&target)) = (
                topology.node_lookup.get(&edge.source),
                topology.node_lookup.get(&edge.target),
            ) else {
                warn!(id = %edge.id, source = %edge.source, target = %edge.target, "Edge references an unknown node, skipping");
                continue;
            };
            let position = topology.edges.len();
            // Grouping nodes are boundaries, so paths never run through them.
            if topology.nodes[source].is_grouping() || topology.nodes[target].is_grouping() {
                debug!(id = %edge.id, "Edge touches a grouping node, left out of path finding");
            } else {
                topology
                    .path_index
                    .add_edge(NodeIndex::new(source), NodeIndex::new(target), position);
            }
            topology.edge_lookup.insert(edge.id.clone(), position);
            topology.edges.push(edge);
        }

        topology.positions = seed_layout(topology.nodes.len());
        debug!(
            nodes = topology.nodes.len(),
            edges = topology.edges.len(),
            "Topology built"
        );
        topology
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node(&self, id: &ElementId) -> Option<&Node> {
        self.node_lookup.get(id).map(|&i| &self.nodes[i])
    }

    pub fn edge(&self, id: &ElementId) -> Option<&Edge> {
        self.edge_lookup.get(id).map(|&i| &self.edges[i])
    }

    pub fn contains(&self, id: &ElementId) -> bool {
        self.node_lookup.contains_key(id) || self.edge_lookup.contains_key(id)
    }

    pub fn position(&self, id: &ElementId) -> Option<Point> {
        self.node_lookup.get(id).map(|&i| self.positions[i])
    }

    pub fn set_position(&mut self, id: &ElementId, point: Point) {
        if let Some(&i) = self.node_lookup.get(id) {
            self.positions[i] = point;
        }
    }

    /// Unit-weight shortest path, as an alternating node/edge id sequence starting at `start`.
    pub fn shortest_path(&self, start: &ElementId, goal: &ElementId) -> Option<Vec<ElementId>> {
        let start = NodeIndex::new(*self.node_lookup.get(start)?);
        let goal = NodeIndex::new(*self.node_lookup.get(goal)?);

        let (_, hops) = astar(&self.path_index, start, |n| n == goal, |_| 1u32, |_| 0u32)?;

        let mut path = Vec::with_capacity(hops.len() * 2);
        for (i, &index) in hops.iter().enumerate() {
            if i > 0 {
                let edge = self.path_index.find_edge(hops[i - 1], index)?;
                path.push(self.edges[self.path_index[edge]].id.clone());
            }
            path.push(self.nodes[self.path_index[index]].id.clone());
        }
        Some(path)
    }

    /// Adds the highlighted marker. Unknown ids are ignored.
    pub fn mark(&mut self, id: &ElementId) -> bool {
        if !self.contains(id) {
            return false;
        }
        self.highlighted.insert(id.clone());
        true
    }

    pub fn clear_marks(&mut self) {
        self.highlighted.clear();
    }

    pub fn is_marked(&self, id: &ElementId) -> bool {
        self.highlighted.contains(id)
    }

    pub fn marked(&self) -> impl Iterator<Item = &ElementId> {
        self.highlighted.iter()
    }
}

impl TopologyEngine for Topology {
    fn node(&self, id: &ElementId) -> Option<&Node> {
        Topology::node(self, id)
    }

    fn shortest_path(&self, start: &ElementId, goal: &ElementId) -> Option<Vec<ElementId>> {
        Topology::shortest_path(self, start, goal)
    }

    fn mark_highlighted(&mut self, id: &ElementId) {
        self.mark(id);
    }

    fn clear_highlighted(&mut self) {
        self.clear_marks();
    }

    fn export_image(&mut self, format: ImageFormat, scale: f32) -> Result<Vec<u8>, ExportError> {
        export::render(self, &DEFAULT_STYLE, format, scale)
    }
}

/// Deterministic starting positions on a ring. The force-directed layout takes over from here.
fn seed_layout(count: usize) -> Vec<Point> {
    if count == 0 {
        return Vec::new();
    }
    let radius = (count as f32 * 60.0 / std::f32::consts::TAU).max(100.0);
    (0..count)
        .map(|i| {
            let angle = i as f32 / count as f32 * std::f32::consts::TAU;
            Point::new(radius * angle.cos(), radius * angle.sin())
        })
        .collect()
}
