use std::sync::Arc;

use once_cell::sync::Lazy;
use tiny_skia::{Pixmap, Transform};
use usvg::{Options, Tree};

use crate::export::ExportError;

// Loading system fonts is slow; do it once per process.
static FONTS: Lazy<Arc<usvg::fontdb::Database>> = Lazy::new(|| {
    let mut db = usvg::fontdb::Database::new();
    db.load_system_fonts();
    Arc::new(db)
});

fn options() -> Options<'static> {
    Options {
        fontdb: FONTS.clone(),
        ..Options::default()
    }
}

/// Rasterize SVG bytes, scaling the document's own size by `scale`.
pub fn rasterize(svg_bytes: &[u8], scale: f32) -> Result<Pixmap, ExportError> {
    let tree = Tree::from_data(svg_bytes, &options())?;
    let size = tree.size().to_int_size();
    let scale = if scale.is_finite() && scale > 0.0 { scale } else { 1.0 };

    let width = ((size.width() as f32) * scale).ceil().max(1.0) as u32;
    let height = ((size.height() as f32) * scale).ceil().max(1.0) as u32;

    let mut pixmap = Pixmap::new(width, height).ok_or(ExportError::Pixmap { width, height })?;
    let transform = Transform::from_scale(scale, scale);
    resvg::render(&tree, transform, &mut pixmap.as_mut());
    Ok(pixmap)
}

/// Rasterize so the longest side is `target_px`, keeping the aspect ratio.
pub fn rasterize_to_fit(svg_bytes: &[u8], target_px: u32) -> Result<Pixmap, ExportError> {
    let tree = Tree::from_data(svg_bytes, &options())?;
    let size = tree.size().to_int_size();
    let longest = size.width().max(size.height()).max(1) as f32;
    rasterize(svg_bytes, target_px as f32 / longest)
}

pub fn render_png(svg_bytes: &[u8], scale: f32) -> Result<Vec<u8>, ExportError> {
    let pixmap = rasterize(svg_bytes, scale)?;
    pixmap
        .encode_png()
        .map_err(|e| ExportError::Png(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::Icon;

    const SQUARE: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="40" height="20"><rect width="40" height="20" fill="#FF0000"/></svg>"##;

    #[test]
    fn scale_changes_pixel_size() {
        let pixmap = rasterize(SQUARE.as_bytes(), 2.0).unwrap();
        assert_eq!((pixmap.width(), pixmap.height()), (80, 40));

        let pixmap = rasterize(SQUARE.as_bytes(), -1.0).unwrap();
        assert_eq!((pixmap.width(), pixmap.height()), (40, 20));
    }

    #[test]
    fn fit_keeps_aspect_ratio() {
        let pixmap = rasterize_to_fit(SQUARE.as_bytes(), 96).unwrap();
        assert_eq!((pixmap.width(), pixmap.height()), (96, 48));
    }

    #[test]
    fn encodes_png() {
        let bytes = render_png(SQUARE.as_bytes(), 1.0).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn bundled_icons_parse() {
        for icon in Icon::ALL {
            assert!(rasterize_to_fit(icon.svg(), 64).is_ok(), "{}", icon.name());
        }
    }

    #[test]
    fn invalid_svg_is_an_error() {
        assert!(matches!(
            render_png(b"not svg", 1.0),
            Err(ExportError::Svg(_))
        ));
    }
}
