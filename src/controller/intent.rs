use std::{collections::HashMap, path::PathBuf};

use thiserror::Error;
use tracing::info;

use crate::{
    controller::{engine::TopologyEngine, viewer::TopologyController},
    export::{ExportError, ImageFormat},
};

/// User actions that are not node clicks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    ClearPath,
    ExportPng,
    ExportSvg,
}

impl Intent {
    pub const ALL: [Intent; 3] = [Intent::ClearPath, Intent::ExportPng, Intent::ExportSvg];

    pub fn label(&self) -> &'static str {
        match self {
            Intent::ClearPath => "Clear path",
            Intent::ExportPng => "Export PNG",
            Intent::ExportSvg => "Export SVG",
        }
    }
}

/// Where exported images land and how large the raster is.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSettings {
    pub directory: PathBuf,
    pub scale: f32,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            scale: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum IntentOutcome {
    Cleared,
    Exported(PathBuf),
}

#[derive(Debug, Error)]
pub enum IntentError {
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error("no handler registered for {0:?}")]
    Unhandled(Intent),
}

pub struct IntentContext<'a> {
    pub engine: &'a mut dyn TopologyEngine,
    pub controller: &'a mut TopologyController,
    pub settings: &'a ExportSettings,
}

pub type IntentHandler = fn(&mut IntentContext<'_>) -> Result<IntentOutcome, IntentError>;

/// Maps intents to their handlers. The GUI only emits intents and never touches the
/// engine for them directly.
pub struct IntentTable {
    handlers: HashMap<Intent, IntentHandler>,
}

impl Default for IntentTable {
    fn default() -> Self {
        let mut table = Self::empty();
        table.register(Intent::ClearPath, clear_path);
        table.register(Intent::ExportPng, export_png);
        table.register(Intent::ExportSvg, export_svg);
        table
    }
}

impl IntentTable {
    pub fn empty() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    pub fn register(&mut self, intent: Intent, handler: IntentHandler) {
        self.handlers.insert(intent, handler);
    }

    pub fn dispatch(
        &self,
        intent: Intent,
        ctx: &mut IntentContext<'_>,
    ) -> Result<IntentOutcome, IntentError> {
        let handler = self
            .handlers
            .get(&intent)
            .ok_or(IntentError::Unhandled(intent))?;
        handler(ctx)
    }
}

fn clear_path(ctx: &mut IntentContext<'_>) -> Result<IntentOutcome, IntentError> {
    ctx.controller.clear(&mut *ctx.engine);
    info!("Highlighted path cleared");
    Ok(IntentOutcome::Cleared)
}

fn export_png(ctx: &mut IntentContext<'_>) -> Result<IntentOutcome, IntentError> {
    export_to_file(ctx, ImageFormat::Png)
}

fn export_svg(ctx: &mut IntentContext<'_>) -> Result<IntentOutcome, IntentError> {
    export_to_file(ctx, ImageFormat::Svg)
}

fn export_to_file(
    ctx: &mut IntentContext<'_>,
    format: ImageFormat,
) -> Result<IntentOutcome, IntentError> {
    let bytes = ctx.engine.export_image(format, ctx.settings.scale)?;
    std::fs::create_dir_all(&ctx.settings.directory).map_err(ExportError::Io)?;
    let path = ctx.settings.directory.join(format.file_name());
    std::fs::write(&path, bytes).map_err(ExportError::Io)?;
    info!(path = %path.display(), "Exported {}", format);
    Ok(IntentOutcome::Exported(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::{element::Elements, topology::Topology};

    fn three_hop() -> Topology {
        let json = include_str!("../../test_data/three_hop.json");
        Topology::build(Elements::from_json(json).unwrap())
    }

    #[test]
    fn every_intent_has_a_handler() {
        let table = IntentTable::default();
        for intent in Intent::ALL {
            assert!(table.handlers.contains_key(&intent), "{intent:?}");
        }
    }

    #[test]
    fn clear_intent_removes_highlights() {
        let mut topology = three_hop();
        let mut controller = TopologyController::new();
        controller.handle_click(&mut topology, &"R1".into());
        controller.handle_click(&mut topology, &"Net1".into());

        let settings = ExportSettings::default();
        let table = IntentTable::default();
        let mut ctx = IntentContext {
            engine: &mut topology,
            controller: &mut controller,
            settings: &settings,
        };
        let outcome = table.dispatch(Intent::ClearPath, &mut ctx).unwrap();

        assert_eq!(outcome, IntentOutcome::Cleared);
        assert_eq!(topology.marked().count(), 0);
    }

    #[test]
    fn export_intents_write_fixed_file_names() {
        let dir = tempfile::tempdir().unwrap();
        let settings = ExportSettings {
            directory: dir.path().join("out"),
            scale: 1.0,
        };
        let mut topology = three_hop();
        let mut controller = TopologyController::new();
        let table = IntentTable::default();

        let mut ctx = IntentContext {
            engine: &mut topology,
            controller: &mut controller,
            settings: &settings,
        };
        let svg = table.dispatch(Intent::ExportSvg, &mut ctx).unwrap();
        let png = table.dispatch(Intent::ExportPng, &mut ctx).unwrap();

        let svg_path = settings.directory.join("network_diagram.svg");
        let png_path = settings.directory.join("network_diagram.png");
        assert_eq!(svg, IntentOutcome::Exported(svg_path.clone()));
        assert_eq!(png, IntentOutcome::Exported(png_path.clone()));

        let svg_text = std::fs::read_to_string(svg_path).unwrap();
        assert!(svg_text.starts_with("<svg"));
        let png_bytes = std::fs::read(png_path).unwrap();
        assert_eq!(&png_bytes[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn missing_handler_is_an_error() {
        let mut topology = three_hop();
        let mut controller = TopologyController::new();
        let settings = ExportSettings::default();
        let mut ctx = IntentContext {
            engine: &mut topology,
            controller: &mut controller,
            settings: &settings,
        };
        let err = IntentTable::empty()
            .dispatch(Intent::ExportPng, &mut ctx)
            .unwrap_err();
        assert!(matches!(err, IntentError::Unhandled(Intent::ExportPng)));
    }
}
