use std::cell::RefCell;

use egui::{FontId, Pos2, Shape, Stroke, Vec2};
use egui_graphs::{DisplayEdge, DisplayNode, DrawContext, EdgeProps};
use petgraph::{EdgeType, stable_graph::IndexType};

use crate::{
    gui::node_shape::{NetworkGraphNodeShape, color, mix},
    network::{
        element::ElementId,
        network_graph::{GraphEdge, GraphNode},
    },
    style::DEFAULT_STYLE,
};

thread_local! {
    static EDGE_LABELS_ENABLED: RefCell<bool> = const { RefCell::new(false) };
}

/// Enable/disable edge id labels globally.
pub fn set_edge_labels_enabled(enabled: bool) {
    EDGE_LABELS_ENABLED.with(|b| *b.borrow_mut() = enabled);
}

pub fn edge_labels_enabled() -> bool {
    EDGE_LABELS_ENABLED.with(|b| *b.borrow())
}

/// Straight edge with an arrow head at the target boundary.
#[derive(Clone, Debug)]
pub struct NetworkGraphEdgeShape {
    id: ElementId,
    highlighted: bool,
}

impl NetworkGraphEdgeShape {
    pub fn set_highlighted(&mut self, highlighted: bool) {
        self.highlighted = highlighted;
    }
}

impl From<EdgeProps<GraphEdge>> for NetworkGraphEdgeShape {
    fn from(props: EdgeProps<GraphEdge>) -> Self {
        Self {
            id: props.payload.edge.id.clone(),
            highlighted: props.payload.highlighted,
        }
    }
}

fn boundaries<Ty: EdgeType, Ix: IndexType>(
    start: &egui_graphs::Node<GraphNode, GraphEdge, Ty, Ix, NetworkGraphNodeShape>,
    end: &egui_graphs::Node<GraphNode, GraphEdge, Ty, Ix, NetworkGraphNodeShape>,
) -> (Pos2, Pos2) {
    let a = start.props().location();
    let b = end.props().location();
    let a_boundary = <NetworkGraphNodeShape as DisplayNode<GraphNode, GraphEdge, Ty, Ix>>::closest_boundary_point(
        start.display(),
        b - a,
    );
    let b_boundary = <NetworkGraphNodeShape as DisplayNode<GraphNode, GraphEdge, Ty, Ix>>::closest_boundary_point(
        end.display(),
        a - b,
    );
    (a_boundary, b_boundary)
}

impl<Ty: EdgeType, Ix: IndexType> DisplayEdge<GraphNode, GraphEdge, Ty, Ix, NetworkGraphNodeShape>
    for NetworkGraphEdgeShape
{
    fn shapes(
        &mut self,
        start: &egui_graphs::Node<GraphNode, GraphEdge, Ty, Ix, NetworkGraphNodeShape>,
        end: &egui_graphs::Node<GraphNode, GraphEdge, Ty, Ix, NetworkGraphNodeShape>,
        ctx: &DrawContext,
    ) -> Vec<Shape> {
        let (a, b) = boundaries(start, end);
        let a_screen = ctx.meta.canvas_to_screen_pos(a);
        let b_screen = ctx.meta.canvas_to_screen_pos(b);

        let style = &DEFAULT_STYLE.edge;
        let highlight = &DEFAULT_STYLE.highlight;
        let fade = ctx.ctx.animate_bool_with_time(
            egui::Id::new(("edge_highlight", self.id.as_str())),
            self.highlighted,
            highlight.transition.as_secs_f32(),
        );
        let line_color = mix(color(style.line_color), color(highlight.line_color), fade);
        let arrow_color = mix(color(style.arrow_color), color(highlight.arrow_color), fade);

        let dir = b_screen - a_screen;
        let length = dir.length();
        if length <= f32::EPSILON {
            return Vec::new();
        }
        let unit = dir / length;
        let arrow = ctx.meta.canvas_to_screen_size(style.arrow_size);
        let base = b_screen - unit * arrow;
        let normal = Vec2::new(-unit.y, unit.x) * (arrow / 2.0);

        let mut shapes = vec![
            Shape::line_segment(
                [a_screen, base],
                Stroke::new(ctx.meta.canvas_to_screen_size(style.width), line_color),
            ),
            Shape::convex_polygon(
                vec![b_screen, base + normal, base - normal],
                arrow_color,
                Stroke::NONE,
            ),
        ];

        if edge_labels_enabled() {
            let mid = a_screen + dir * 0.5;
            let offset = Vec2::new(-dir.y, dir.x) * (8.0 / length);
            let text_color = color(style.label_color);
            let galley = ctx.ctx.fonts_mut(|fonts| {
                fonts.layout_no_wrap(
                    self.id.to_string(),
                    FontId::proportional(11.0),
                    text_color,
                )
            });
            let pos = mid + offset - galley.size() / 2.0;
            shapes.push(Shape::galley(pos, galley, text_color));
        }
        shapes
    }

    fn update(&mut self, props: &EdgeProps<GraphEdge>) {
        self.id = props.payload.edge.id.clone();
        self.highlighted = props.payload.highlighted;
    }

    fn is_inside(
        &self,
        start: &egui_graphs::Node<GraphNode, GraphEdge, Ty, Ix, NetworkGraphNodeShape>,
        end: &egui_graphs::Node<GraphNode, GraphEdge, Ty, Ix, NetworkGraphNodeShape>,
        pos: Pos2,
    ) -> bool {
        let (a, b) = boundaries(start, end);
        distance_point_to_segment(pos, a, b) <= DEFAULT_STYLE.edge.width.max(3.0)
    }
}

fn distance_point_to_segment(p: Pos2, a: Pos2, b: Pos2) -> f32 {
    let ap = p - a;
    let ab = b - a;
    let ab_len2 = ab.length_sq();
    if ab_len2 <= f32::EPSILON {
        return ap.length();
    }
    let t = (ap.dot(ab) / ab_len2).clamp(0.0, 1.0);
    let closest = a + ab * t;
    (p - closest).length()
}
