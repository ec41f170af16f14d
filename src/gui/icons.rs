use std::{cell::RefCell, collections::HashMap};

use egui::{ColorImage, Context, TextureHandle, TextureId, TextureOptions};
use tracing::warn;

use crate::{export::png::rasterize_to_fit, style::Icon};

// Base texture resolution; icons are drawn at most a few hundred pixels wide.
const ICON_PX: u32 = 128;

thread_local! {
    // `None` records a failed rasterization so it is not retried every frame.
    static TEXTURES: RefCell<HashMap<Icon, Option<TextureHandle>>> = RefCell::new(HashMap::new());
}

fn load(ctx: &Context, icon: Icon) -> Option<TextureHandle> {
    let pixmap = match rasterize_to_fit(icon.svg(), ICON_PX) {
        Ok(pixmap) => pixmap,
        Err(e) => {
            warn!(icon = icon.name(), error = %e, "Failed to rasterize icon");
            return None;
        }
    };
    let size = [pixmap.width() as usize, pixmap.height() as usize];
    let image = ColorImage::from_rgba_premultiplied(size, pixmap.data());
    Some(ctx.load_texture(icon.name(), image, TextureOptions::LINEAR))
}

pub fn texture_id(ctx: &Context, icon: Icon) -> Option<TextureId> {
    TEXTURES.with(|slot| {
        slot.borrow_mut()
            .entry(icon)
            .or_insert_with(|| load(ctx, icon))
            .as_ref()
            .map(TextureHandle::id)
    })
}

/// Rasterize every bundled icon up front so the first graph frame does not pay for it.
pub fn preload(ctx: &Context) {
    for icon in Icon::ALL {
        texture_id(ctx, icon);
    }
}
