use egui::{
    Color32, CornerRadius, FontId, Pos2, Rect, Shape, Stroke, StrokeKind, Vec2,
    epaint::EllipseShape,
};
use egui_graphs::{DisplayNode, DrawContext, NodeProps};
use petgraph::{EdgeType, stable_graph::IndexType};

use crate::{
    gui::{group_overlay, icons},
    network::{element::ElementId, network_graph::GraphNode},
    style::{DEFAULT_STYLE, LabelPosition, NodeStyle, Rgb, ShapeKind},
};

pub fn color(rgb: Rgb) -> Color32 {
    Color32::from_rgb(rgb.0, rgb.1, rgb.2)
}

/// Linear blend, `t = 0` gives `a`.
pub fn mix(a: Color32, b: Color32, t: f32) -> Color32 {
    let t = t.clamp(0.0, 1.0);
    let channel = |x: u8, y: u8| (x as f32 + (y as f32 - x as f32) * t).round() as u8;
    Color32::from_rgba_unmultiplied(
        channel(a.r(), b.r()),
        channel(a.g(), b.g()),
        channel(a.b(), b.b()),
        channel(a.a(), b.a()),
    )
}

/// Role-styled node: ellipse for subnets, icon for devices, plain ellipse otherwise.
#[derive(Clone, Debug)]
pub struct NetworkGraphNodeShape {
    pub id: ElementId,
    pub label: String,
    pub pos: Pos2,
    pub selected: bool,
    pub dragged: bool,
    pub hovered: bool,
    pub highlighted: bool,
    style: NodeStyle,
}

impl NetworkGraphNodeShape {
    pub fn set_highlighted(&mut self, highlighted: bool) {
        self.highlighted = highlighted;
    }

    fn size(&self) -> Vec2 {
        Vec2::new(self.style.width, self.style.height)
    }

    fn label_shapes(&self, ctx: &DrawContext, rect: Rect, out: &mut Vec<Shape>) {
        let font = FontId::proportional(ctx.meta.canvas_to_screen_size(12.0).max(6.0));
        let text_color = color(self.style.label_color);
        let galley = ctx
            .ctx
            .fonts_mut(|f| f.layout_no_wrap(self.label.clone(), font.clone(), text_color));
        let anchor = match self.style.label_position {
            LabelPosition::Center => rect.center() - galley.size() / 2.0,
            LabelPosition::Top => {
                Pos2::new(rect.center().x - galley.size().x / 2.0, rect.top() - galley.size().y - 2.0)
            }
        };

        if let Some(outline) = self.style.label_outline {
            let outline = color(outline);
            let halo = ctx
                .ctx
                .fonts_mut(|f| f.layout_no_wrap(self.label.clone(), font, outline));
            for offset in [Vec2::new(-1.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(0.0, -1.0), Vec2::new(0.0, 1.0)] {
                out.push(Shape::galley(anchor + offset, halo.clone(), outline));
            }
        }
        out.push(Shape::galley(anchor, galley, text_color));
    }
}

impl From<NodeProps<GraphNode>> for NetworkGraphNodeShape {
    fn from(props: NodeProps<GraphNode>) -> Self {
        let payload = &props.payload;
        Self {
            id: payload.node.id.clone(),
            label: payload.node.display_label().to_string(),
            pos: props.location(),
            selected: props.selected,
            dragged: props.dragged,
            hovered: props.hovered,
            highlighted: payload.highlighted,
            style: DEFAULT_STYLE.node_style(&payload.node),
        }
    }
}

impl<E: Clone, Ty: EdgeType, Ix: IndexType> DisplayNode<GraphNode, E, Ty, Ix>
    for NetworkGraphNodeShape
{
    fn closest_boundary_point(&self, dir: Vec2) -> Pos2 {
        let (dx, dy) = self.style.boundary_offset(dir.x, dir.y, 1.0);
        self.pos + Vec2::new(dx, dy)
    }

    fn is_inside(&self, pos: Pos2) -> bool {
        let half = self.size() / 2.0;
        match self.style.shape {
            ShapeKind::Ellipse => {
                if half.x <= 0.0 || half.y <= 0.0 {
                    return false;
                }
                let d = pos - self.pos;
                (d.x / half.x).powi(2) + (d.y / half.y).powi(2) <= 1.0
            }
            ShapeKind::Rectangle | ShapeKind::RoundRectangle => {
                Rect::from_center_size(self.pos, self.size()).contains(pos)
            }
        }
    }

    fn shapes(&mut self, ctx: &DrawContext) -> Vec<Shape> {
        let mut res = Vec::with_capacity(8);
        let center = ctx.meta.canvas_to_screen_pos(self.pos);
        let size = Vec2::new(
            ctx.meta.canvas_to_screen_size(self.style.width),
            ctx.meta.canvas_to_screen_size(self.style.height),
        );
        let rect = Rect::from_center_size(center, size);
        group_overlay::record_member_rect(&self.id, rect);

        let highlight = &DEFAULT_STYLE.highlight;
        let fade = ctx.ctx.animate_bool_with_time(
            egui::Id::new(("path_highlight", self.id.as_str())),
            self.highlighted,
            highlight.transition.as_secs_f32(),
        );

        let base_fill = self.style.fill.map_or(Color32::TRANSPARENT, color);
        let fill = mix(base_fill, color(highlight.fill), fade);
        let border_width = self.style.border_width + (highlight.border_width - self.style.border_width) * fade;
        let stroke = Stroke::new(
            ctx.meta.canvas_to_screen_size(border_width),
            mix(color(self.style.border_color), color(highlight.border_color), fade),
        );
        let stroke = if border_width > 0.0 { stroke } else { Stroke::NONE };

        match self.style.shape {
            ShapeKind::Ellipse => res.push(
                EllipseShape {
                    center,
                    radius: size / 2.0,
                    fill,
                    stroke,
                }
                .into(),
            ),
            ShapeKind::Rectangle | ShapeKind::RoundRectangle => {
                let rounding = if self.style.shape == ShapeKind::RoundRectangle {
                    CornerRadius::same(8)
                } else {
                    CornerRadius::ZERO
                };
                res.push(Shape::rect_filled(rect, rounding, fill));
                if stroke != Stroke::NONE {
                    res.push(Shape::rect_stroke(rect, rounding, stroke, StrokeKind::Outside));
                }
            }
        }

        if let Some(tex_id) = self.style.icon.and_then(|icon| icons::texture_id(ctx.ctx, icon)) {
            let uv = Rect::from_min_max(Pos2::new(0.0, 0.0), Pos2::new(1.0, 1.0));
            let tint = if self.hovered || self.dragged {
                Color32::from_gray(220)
            } else {
                Color32::WHITE
            };
            res.push(Shape::image(tex_id, rect, uv, tint));
        }

        self.label_shapes(ctx, rect, &mut res);
        res
    }

    fn update(&mut self, state: &NodeProps<GraphNode>) {
        self.pos = state.location();
        self.selected = state.selected;
        self.dragged = state.dragged;
        self.hovered = state.hovered;
        self.label = state.label.to_string();
        self.highlighted = state.payload.highlighted;
    }
}
