/*!
The fixed style sheet of the viewer.

Both the egui shapes and the image exporter read from here so the window and the exported
files agree: role -> shape/icon/size, edge -> arrow style, highlighted -> emphasis.
*/

use std::{fmt::Display, time::Duration};

use once_cell::sync::Lazy;

use crate::network::node::{Node, RoleKind};

pub static DEFAULT_STYLE: Lazy<StyleSheet> = Lazy::new(StyleSheet::default);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Rgb = Rgb(0xFF, 0xFF, 0xFF);
    pub const YELLOW: Rgb = Rgb(0xFF, 0xFF, 0x00);
    pub const RED: Rgb = Rgb(0xFF, 0x00, 0x00);

    /// Parses `#RRGGBB` (the leading `#` is optional).
    pub fn parse_hex(s: &str) -> Option<Rgb> {
        let digits = s.trim().trim_start_matches('#');
        let bytes = hex::decode(digits).ok()?;
        match bytes.as_slice() {
            [r, g, b] => Some(Rgb(*r, *g, *b)),
            _ => None,
        }
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

impl Display for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Ellipse,
    Rectangle,
    RoundRectangle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelPosition {
    Center,
    Top,
}

/// Device icons compiled into the binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Icon {
    Router,
    Switch,
    Server,
    Firewall,
}

impl Icon {
    pub const ALL: [Icon; 4] = [Icon::Router, Icon::Switch, Icon::Server, Icon::Firewall];

    pub fn name(&self) -> &'static str {
        match self {
            Icon::Router => "router",
            Icon::Switch => "switch",
            Icon::Server => "server",
            Icon::Firewall => "firewall",
        }
    }

    pub fn svg(&self) -> &'static [u8] {
        match self {
            Icon::Router => include_bytes!("resources/router.svg"),
            Icon::Switch => include_bytes!("resources/switch.svg"),
            Icon::Server => include_bytes!("resources/server.svg"),
            Icon::Firewall => include_bytes!("resources/firewall.svg"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeStyle {
    pub shape: ShapeKind,
    pub width: f32,
    pub height: f32,
    /// `None` means a transparent background.
    pub fill: Option<Rgb>,
    pub icon: Option<Icon>,
    pub border_width: f32,
    pub border_color: Rgb,
    pub label_color: Rgb,
    pub label_outline: Option<Rgb>,
    pub label_position: LabelPosition,
}

impl NodeStyle {
    /// Offset from the node center to its outline in direction `(dx, dy)`, for sizes
    /// multiplied by `scale`.
    pub fn boundary_offset(&self, dx: f32, dy: f32, scale: f32) -> (f32, f32) {
        let half_w = self.width * scale / 2.0;
        let half_h = self.height * scale / 2.0;
        let len = (dx * dx + dy * dy).sqrt();
        if len <= f32::EPSILON || half_w <= 0.0 || half_h <= 0.0 {
            return (0.0, 0.0);
        }
        let t = match self.shape {
            ShapeKind::Ellipse => 1.0 / ((dx / half_w).powi(2) + (dy / half_h).powi(2)).sqrt(),
            ShapeKind::Rectangle | ShapeKind::RoundRectangle => {
                let tx = if dx.abs() > f32::EPSILON { half_w / dx.abs() } else { f32::INFINITY };
                let ty = if dy.abs() > f32::EPSILON { half_h / dy.abs() } else { f32::INFINITY };
                tx.min(ty)
            }
        };
        (dx * t, dy * t)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EdgeStyle {
    pub width: f32,
    pub line_color: Rgb,
    pub arrow_color: Rgb,
    pub arrow_size: f32,
    pub label_color: Rgb,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HighlightStyle {
    pub border_width: f32,
    pub border_color: Rgb,
    pub fill: Rgb,
    pub line_color: Rgb,
    pub arrow_color: Rgb,
    pub transition: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StyleSheet {
    pub subnet: NodeStyle,
    pub router: NodeStyle,
    pub switch: NodeStyle,
    pub server: NodeStyle,
    pub firewall: NodeStyle,
    pub group: NodeStyle,
    pub fallback: NodeStyle,
    pub edge: EdgeStyle,
    pub highlight: HighlightStyle,
}

impl Default for StyleSheet {
    fn default() -> Self {
        let outline = Some(Rgb(0x88, 0x88, 0x88));
        let device = |icon, width, height| NodeStyle {
            shape: ShapeKind::Rectangle,
            width,
            height,
            fill: None,
            icon: Some(icon),
            border_width: 0.0,
            border_color: Rgb(0x88, 0x88, 0x88),
            label_color: Rgb::WHITE,
            label_outline: outline,
            label_position: LabelPosition::Center,
        };

        Self {
            subnet: NodeStyle {
                shape: ShapeKind::Ellipse,
                width: 150.0,
                height: 40.0,
                fill: Some(Rgb(0xD3, 0xD3, 0xD3)),
                icon: None,
                border_width: 0.0,
                border_color: Rgb(0x88, 0x88, 0x88),
                label_color: Rgb::WHITE,
                label_outline: outline,
                label_position: LabelPosition::Center,
            },
            router: device(Icon::Router, 80.0, 55.0),
            switch: device(Icon::Switch, 90.0, 50.0),
            server: device(Icon::Server, 60.0, 70.0),
            firewall: device(Icon::Firewall, 80.0, 55.0),
            group: NodeStyle {
                shape: ShapeKind::RoundRectangle,
                width: 0.0,
                height: 0.0,
                fill: None,
                icon: None,
                border_width: 2.0,
                border_color: Rgb(0x99, 0x99, 0x99),
                label_color: Rgb(0x33, 0x33, 0x33),
                label_outline: None,
                label_position: LabelPosition::Top,
            },
            fallback: NodeStyle {
                shape: ShapeKind::Ellipse,
                width: 30.0,
                height: 30.0,
                fill: Some(Rgb(0x99, 0x99, 0x99)),
                icon: None,
                border_width: 0.0,
                border_color: Rgb(0x88, 0x88, 0x88),
                label_color: Rgb(0x33, 0x33, 0x33),
                label_outline: None,
                label_position: LabelPosition::Center,
            },
            edge: EdgeStyle {
                width: 3.0,
                line_color: Rgb(0xCC, 0xCC, 0xCC),
                arrow_color: Rgb(0xCC, 0xCC, 0xCC),
                arrow_size: 9.0,
                label_color: Rgb(0x66, 0x66, 0x66),
            },
            highlight: HighlightStyle {
                border_width: 6.0,
                border_color: Rgb::YELLOW,
                fill: Rgb::YELLOW,
                line_color: Rgb::RED,
                arrow_color: Rgb::RED,
                transition: Duration::from_millis(500),
            },
        }
    }
}

impl StyleSheet {
    /// Resolves the style of a node. Grouping nodes take their border color from the data.
    pub fn node_style(&self, node: &Node) -> NodeStyle {
        match node.kind() {
            RoleKind::Subnet => self.subnet.clone(),
            RoleKind::Router => self.router.clone(),
            RoleKind::Switch => self.switch.clone(),
            RoleKind::Server => self.server.clone(),
            RoleKind::Firewall => self.firewall.clone(),
            RoleKind::Vrf | RoleKind::Tenant => {
                let mut style = self.group.clone();
                if let Some(color) = node.border_color.as_deref().and_then(Rgb::parse_hex) {
                    style.border_color = color;
                }
                style
            }
            RoleKind::Other => self.fallback.clone(),
        }
    }
}
