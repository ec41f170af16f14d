/*!
Image export.

The current rendering is written as a standalone SVG document (`svg`), which is also the
input of the PNG rasterizer (`png`). Both formats therefore show exactly the same scene.
*/

use std::fmt::Display;

use thiserror::Error;

use crate::{network::topology::Topology, style::StyleSheet};

pub mod png;
pub mod svg;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Png,
    Svg,
}

impl ImageFormat {
    /// Fixed download name per format.
    pub fn file_name(&self) -> &'static str {
        match self {
            ImageFormat::Png => "network_diagram.png",
            ImageFormat::Svg => "network_diagram.svg",
        }
    }
}

impl Display for ImageFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImageFormat::Png => write!(f, "PNG"),
            ImageFormat::Svg => write!(f, "SVG"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to parse generated SVG: {0}")]
    Svg(#[from] usvg::Error),
    #[error("cannot allocate a {width}x{height} pixmap")]
    Pixmap { width: u32, height: u32 },
    #[error("PNG encoding failed: {0}")]
    Png(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Serialize the topology with its current positions and highlights.
pub fn render(
    topology: &Topology,
    style: &StyleSheet,
    format: ImageFormat,
    scale: f32,
) -> Result<Vec<u8>, ExportError> {
    let document = svg::write_document(topology, style);
    match format {
        ImageFormat::Svg => Ok(document.into_bytes()),
        ImageFormat::Png => png::render_png(document.as_bytes(), scale),
    }
}
