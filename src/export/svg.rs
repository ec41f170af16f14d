use std::{collections::HashMap, fmt::Write};

use base64::{Engine as _, engine::general_purpose::STANDARD};

use crate::{
    network::{
        element::ElementId,
        groups::{Bounds, group_frames},
        node::Node,
        topology::{Point, Topology},
    },
    style::{Icon, LabelPosition, NodeStyle, Rgb, ShapeKind, StyleSheet},
};

const MARGIN: f32 = 30.0;
const GROUP_PADDING: f32 = 15.0;
const GROUP_LABEL_SPACE: f32 = 16.0;
const FONT_SIZE: f32 = 12.0;

/// Write the scene as a standalone SVG document.
pub fn write_document(topology: &Topology, style: &StyleSheet) -> String {
    let mut layout: HashMap<ElementId, (Point, NodeStyle)> = HashMap::new();
    let mut member_bounds: HashMap<ElementId, Bounds> = HashMap::new();
    for node in topology.nodes().iter().filter(|n| !n.is_grouping()) {
        let Some(position) = topology.position(&node.id) else {
            continue;
        };
        let node_style = style.node_style(node);
        member_bounds.insert(
            node.id.clone(),
            Bounds::from_center(position.x, position.y, node_style.width, node_style.height),
        );
        layout.insert(node.id.clone(), (position, node_style));
    }
    let frames = group_frames(topology, &member_bounds, GROUP_PADDING, GROUP_LABEL_SPACE);

    let scene = member_bounds
        .values()
        .chain(frames.iter().map(|f| &f.bounds))
        .copied()
        .reduce(|a, b| a.union(&b))
        .unwrap_or(Bounds::from_center(0.0, 0.0, 0.0, 0.0))
        .expand(MARGIN, 0.0);

    let mut out = String::new();
    let _ = write!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" width="{w}" height="{h}" viewBox="{x} {y} {w} {h}" font-family="sans-serif" font-size="{FONT_SIZE}">"#,
        w = fmt_num(scene.width().max(1.0)),
        h = fmt_num(scene.height().max(1.0)),
        x = fmt_num(scene.min_x),
        y = fmt_num(scene.min_y),
    );
    out.push('\n');

    for frame in &frames {
        let Some(node) = topology.node(&frame.id) else {
            continue;
        };
        write_group(&mut out, node, &frame.bounds, &style.node_style(node));
    }

    for edge in topology.edges() {
        let (Some((from, from_style)), Some((to, to_style))) =
            (layout.get(&edge.source), layout.get(&edge.target))
        else {
            continue;
        };
        let highlighted = topology.is_marked(&edge.id);
        let (line, arrow) = if highlighted {
            (style.highlight.line_color, style.highlight.arrow_color)
        } else {
            (style.edge.line_color, style.edge.arrow_color)
        };

        let (dx, dy) = (to.x - from.x, to.y - from.y);
        let (sx, sy) = from_style.boundary_offset(dx, dy, 1.0);
        let (tx, ty) = to_style.boundary_offset(-dx, -dy, 1.0);
        let start = Point::new(from.x + sx, from.y + sy);
        let tip = Point::new(to.x + tx, to.y + ty);

        let _ = writeln!(
            out,
            r#"<g id="{id}"><line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{line}" stroke-width="{}"/>{}"#,
            fmt_num(start.x),
            fmt_num(start.y),
            fmt_num(tip.x),
            fmt_num(tip.y),
            fmt_num(style.edge.width),
            arrow_head(start, tip, style.edge.arrow_size, arrow),
            id = escape(edge.id.as_str()),
        );
        let mid = Point::new((start.x + tip.x) / 2.0, (start.y + tip.y) / 2.0);
        let _ = writeln!(
            out,
            r#"<text x="{}" y="{}" text-anchor="middle" fill="{}" font-size="{}">{}</text></g>"#,
            fmt_num(mid.x),
            fmt_num(mid.y - 4.0),
            style.edge.label_color,
            fmt_num(FONT_SIZE - 2.0),
            escape(edge.id.as_str()),
        );
    }

    for node in topology.nodes().iter().filter(|n| !n.is_grouping()) {
        let Some((position, node_style)) = layout.get(&node.id) else {
            continue;
        };
        write_node(
            &mut out,
            node,
            *position,
            node_style,
            topology.is_marked(&node.id),
            style,
        );
    }

    out.push_str("</svg>\n");
    out
}

fn write_group(out: &mut String, node: &Node, bounds: &Bounds, style: &NodeStyle) {
    let _ = writeln!(
        out,
        r#"<g id="{id}"><rect x="{}" y="{}" width="{}" height="{}" rx="8" fill="none" stroke="{}" stroke-width="{}"/><text x="{}" y="{}" text-anchor="middle" fill="{}">{id}</text></g>"#,
        fmt_num(bounds.min_x),
        fmt_num(bounds.min_y),
        fmt_num(bounds.width()),
        fmt_num(bounds.height()),
        style.border_color,
        fmt_num(style.border_width),
        fmt_num((bounds.min_x + bounds.max_x) / 2.0),
        fmt_num(bounds.min_y + FONT_SIZE + 2.0),
        style.label_color,
        id = escape(node.display_label()),
    );
}

fn write_node(
    out: &mut String,
    node: &Node,
    center: Point,
    node_style: &NodeStyle,
    highlighted: bool,
    sheet: &StyleSheet,
) {
    let (fill, border_width, border_color) = if highlighted {
        (
            Some(sheet.highlight.fill),
            sheet.highlight.border_width,
            sheet.highlight.border_color,
        )
    } else {
        (node_style.fill, node_style.border_width, node_style.border_color)
    };
    let fill = fill.map_or("none".to_string(), |c| c.to_hex());
    let stroke = if border_width > 0.0 {
        format!(
            r#" stroke="{}" stroke-width="{}""#,
            border_color,
            fmt_num(border_width)
        )
    } else {
        String::new()
    };

    let (w, h) = (node_style.width, node_style.height);
    let (x, y) = (center.x - w / 2.0, center.y - h / 2.0);

    let _ = write!(out, r#"<g id="{}">"#, escape(node.id.as_str()));
    let _ = match node_style.shape {
        ShapeKind::Ellipse => write!(
            out,
            r#"<ellipse cx="{}" cy="{}" rx="{}" ry="{}" fill="{fill}"{stroke}/>"#,
            fmt_num(center.x),
            fmt_num(center.y),
            fmt_num(w / 2.0),
            fmt_num(h / 2.0),
        ),
        ShapeKind::Rectangle | ShapeKind::RoundRectangle => write!(
            out,
            r#"<rect x="{}" y="{}" width="{}" height="{}"{} fill="{fill}"{stroke}/>"#,
            fmt_num(x),
            fmt_num(y),
            fmt_num(w),
            fmt_num(h),
            if node_style.shape == ShapeKind::RoundRectangle {
                r#" rx="8""#
            } else {
                ""
            },
        ),
    };

    if let Some(icon) = node_style.icon {
        let _ = write!(
            out,
            r#"<image x="{}" y="{}" width="{}" height="{}" preserveAspectRatio="xMidYMid slice" xlink:href="{}"/>"#,
            fmt_num(x),
            fmt_num(y),
            fmt_num(w),
            fmt_num(h),
            icon_data_uri(icon),
        );
    }

    let label_y = match node_style.label_position {
        LabelPosition::Center => center.y + FONT_SIZE / 3.0,
        LabelPosition::Top => y - 4.0,
    };
    let outline = node_style.label_outline.map_or(String::new(), |c| {
        format!(r#" stroke="{c}" stroke-width="2" paint-order="stroke""#)
    });
    let _ = writeln!(
        out,
        r#"<text x="{}" y="{}" text-anchor="middle" fill="{}"{outline}>{}</text></g>"#,
        fmt_num(center.x),
        fmt_num(label_y),
        node_style.label_color,
        escape(node.display_label()),
    );
}

fn arrow_head(from: Point, tip: Point, size: f32, color: Rgb) -> String {
    let (dx, dy) = (tip.x - from.x, tip.y - from.y);
    let len = (dx * dx + dy * dy).sqrt();
    if len <= f32::EPSILON {
        return String::new();
    }
    let (ux, uy) = (dx / len, dy / len);
    let base = Point::new(tip.x - ux * size, tip.y - uy * size);
    let (px, py) = (-uy * size / 2.0, ux * size / 2.0);
    format!(
        r#"<polygon points="{},{} {},{} {},{}" fill="{color}"/>"#,
        fmt_num(tip.x),
        fmt_num(tip.y),
        fmt_num(base.x + px),
        fmt_num(base.y + py),
        fmt_num(base.x - px),
        fmt_num(base.y - py),
    )
}

fn icon_data_uri(icon: Icon) -> String {
    format!("data:image/svg+xml;base64,{}", STANDARD.encode(icon.svg()))
}

fn fmt_num(v: f32) -> String {
    let rounded = (v * 100.0).round() / 100.0;
    if rounded == 0.0 {
        "0".to_string()
    } else {
        rounded.to_string()
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}
