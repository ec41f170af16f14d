use crate::{
    export::{ExportError, ImageFormat},
    network::{element::ElementId, node::Node},
};

/// What the controller needs from the thing that owns the elements and their visual state.
///
/// `Topology` implements it headless; `NetworkGraph` implements it for the egui view and
/// keeps the on-screen shapes in sync with the marker.
pub trait TopologyEngine {
    fn node(&self, id: &ElementId) -> Option<&Node>;

    /// Unit-weight shortest path between two nodes, nodes and edges in path order.
    fn shortest_path(&self, start: &ElementId, goal: &ElementId) -> Option<Vec<ElementId>>;

    fn mark_highlighted(&mut self, id: &ElementId);

    fn clear_highlighted(&mut self);

    /// Serialize the current rendering.
    fn export_image(&mut self, format: ImageFormat, scale: f32) -> Result<Vec<u8>, ExportError>;
}
