/*!
Frames around vrf/tenant members, painted on top of the graph view.

Node shapes record their screen rectangle while the graph view draws; after the view is done
the app turns those rectangles into group frames, paints them, and uses them to route clicks
that land on a frame border area to the grouping node.
*/

use std::{cell::RefCell, collections::HashMap};

use egui::{Align2, CornerRadius, FontId, Painter, Pos2, Rect, Stroke, StrokeKind};

use crate::{
    gui::node_shape::color,
    network::{
        element::ElementId,
        groups::{Bounds, GroupFrame, group_frames},
        topology::Topology,
    },
    style::DEFAULT_STYLE,
};

const PADDING: f32 = 12.0;
const LABEL_SPACE: f32 = 16.0;

thread_local! {
    static MEMBER_RECTS: RefCell<HashMap<ElementId, Rect>> = RefCell::new(HashMap::new());
}

/// Reset the collector at the start of a frame.
pub fn clear_member_rects() {
    MEMBER_RECTS.with(|v| v.borrow_mut().clear());
}

pub fn record_member_rect(id: &ElementId, rect: Rect) {
    MEMBER_RECTS.with(|v| {
        v.borrow_mut().insert(id.clone(), rect);
    });
}

fn take_member_bounds() -> HashMap<ElementId, Bounds> {
    MEMBER_RECTS.with(|v| {
        v.borrow_mut()
            .drain()
            .map(|(id, r)| {
                let bounds = Bounds {
                    min_x: r.min.x,
                    min_y: r.min.y,
                    max_x: r.max.x,
                    max_y: r.max.y,
                };
                (id, bounds)
            })
            .collect()
    })
}

/// Screen-space frames for this frame's drawn members, outermost first.
pub fn collect_frames(topology: &Topology) -> Vec<GroupFrame> {
    group_frames(topology, &take_member_bounds(), PADDING, LABEL_SPACE)
}

fn to_rect(bounds: &Bounds) -> Rect {
    Rect::from_min_max(
        Pos2::new(bounds.min_x, bounds.min_y),
        Pos2::new(bounds.max_x, bounds.max_y),
    )
}

pub fn paint_frames(painter: &Painter, topology: &Topology, frames: &[GroupFrame]) {
    for frame in frames {
        let Some(node) = topology.node(&frame.id) else {
            continue;
        };
        let style = DEFAULT_STYLE.node_style(node);
        let rect = to_rect(&frame.bounds);
        painter.rect_stroke(
            rect,
            CornerRadius::same(8),
            Stroke::new(style.border_width, color(style.border_color)),
            StrokeKind::Inside,
        );
        painter.text(
            Pos2::new(rect.center().x, rect.top() + 2.0),
            Align2::CENTER_TOP,
            node.display_label(),
            FontId::proportional(13.0),
            color(style.border_color),
        );
    }
}

/// Innermost frame containing `pos`.
pub fn frame_at(frames: &[GroupFrame], pos: Pos2) -> Option<&ElementId> {
    frames
        .iter()
        .filter(|f| f.bounds.contains(pos.x, pos.y))
        .max_by_key(|f| f.depth)
        .map(|f| &f.id)
}
