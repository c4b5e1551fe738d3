//! Rendering backend seam.
//!
//! The engine never talks to a graphics API, font library or image decoder
//! directly. Everything platform-specific goes through [`GuiBackend`].

use std::collections::HashSet;

use crate::layout::{Size, Viewport};
use crate::style::Theme;
use crate::widget::WidgetId;

/// Handle to a texture owned by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub u32);

/// Handle to a loaded font.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FontId(pub u32);

/// A texture together with the pixel size of its content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bitmap {
    /// Backend texture.
    pub texture: TextureId,
    /// Content size in pixels.
    pub size: Size,
}

/// Services the engine needs from the platform.
///
/// Failures are reported as `None`; the engine degrades to an empty visual.
pub trait GuiBackend {
    /// Current drawable size.
    fn viewport(&self) -> Viewport;

    /// Opens a font file.
    fn load_font(&mut self, path: &str) -> Option<FontId>;

    /// Pixel size of `text` rendered at `px`.
    fn measure_text(&self, font: FontId, px: i32, text: &str) -> Size;

    /// Renders `text` into a new texture.
    fn rasterize_text(&mut self, font: FontId, px: i32, text: &str) -> Option<Bitmap>;

    /// Loads an image file into a new texture.
    fn load_image(&mut self, path: &str) -> Option<Bitmap>;

    /// Frees a texture returned earlier.
    fn release_texture(&mut self, texture: TextureId);

    /// Loads the named background theme.
    fn load_theme(&mut self, name: &str) -> Option<Theme>;

    /// Called when keyboard or pointer focus moves to a new widget.
    fn focus_changed(&mut self, _focused: WidgetId) {}
}

/// Backend without a window, for tests, benchmarks and tools.
///
/// Text is monospace: every character is `px * 3 / 5` wide and `px` tall.
/// Textures are plain counters; the backend tracks which are live.
#[derive(Debug, Clone)]
pub struct HeadlessBackend {
    viewport: Viewport,
    next_texture: u32,
    live: HashSet<TextureId>,
    fonts: Vec<String>,
    focus_cues: Vec<WidgetId>,
}

impl HeadlessBackend {
    /// Creates a headless backend with the given viewport.
    #[must_use]
    pub fn new(w: i32, h: i32) -> Self {
        Self {
            viewport: Viewport::new(w, h),
            next_texture: 1,
            live: HashSet::new(),
            fonts: Vec::new(),
            focus_cues: Vec::new(),
        }
    }

    /// Changes the viewport; call `Gui::resize` afterwards.
    pub fn set_viewport(&mut self, w: i32, h: i32) {
        self.viewport = Viewport::new(w, h);
    }

    /// Number of textures allocated and not yet released.
    #[must_use]
    pub fn live_textures(&self) -> usize {
        self.live.len()
    }

    /// Returns true if the texture is allocated.
    #[must_use]
    pub fn is_live(&self, texture: TextureId) -> bool {
        self.live.contains(&texture)
    }

    /// Widgets that received focus, oldest first.
    #[must_use]
    pub fn focus_cues(&self) -> &[WidgetId] {
        &self.focus_cues
    }

    /// Paths of fonts opened so far.
    #[must_use]
    pub fn fonts(&self) -> &[String] {
        &self.fonts
    }

    /// Monospace advance for a pixel size.
    #[must_use]
    pub const fn advance(px: i32) -> i32 {
        px * 3 / 5
    }

    fn texture(&mut self) -> TextureId {
        let id = TextureId(self.next_texture);
        self.next_texture += 1;
        self.live.insert(id);
        id
    }
}

impl GuiBackend for HeadlessBackend {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn load_font(&mut self, path: &str) -> Option<FontId> {
        if path.is_empty() {
            return None;
        }
        self.fonts.push(path.to_owned());
        Some(FontId(self.fonts.len() as u32 - 1))
    }

    fn measure_text(&self, _font: FontId, px: i32, text: &str) -> Size {
        Size::new(text.chars().count() as i32 * Self::advance(px), px)
    }

    fn rasterize_text(&mut self, font: FontId, px: i32, text: &str) -> Option<Bitmap> {
        if text.is_empty() {
            return None;
        }
        let size = self.measure_text(font, px, text);
        Some(Bitmap {
            texture: self.texture(),
            size,
        })
    }

    fn load_image(&mut self, path: &str) -> Option<Bitmap> {
        if path.is_empty() {
            return None;
        }
        Some(Bitmap {
            texture: self.texture(),
            size: Size::new(64, 64),
        })
    }

    fn release_texture(&mut self, texture: TextureId) {
        self.live.remove(&texture);
    }

    fn load_theme(&mut self, _name: &str) -> Option<Theme> {
        let textures = [
            Some(self.texture()),
            Some(self.texture()),
            Some(self.texture()),
            Some(self.texture()),
        ];
        Some(Theme {
            textures,
            ..Theme::BLANK
        })
    }

    fn focus_changed(&mut self, focused: WidgetId) {
        self.focus_cues.push(focused);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monospace_metrics() {
        let backend = HeadlessBackend::new(800, 600);
        assert_eq!(backend.measure_text(FontId(0), 20, "abcd"), Size::new(48, 20));
        assert_eq!(backend.measure_text(FontId(0), 20, ""), Size::new(0, 20));
    }

    #[test]
    fn test_texture_lifecycle() {
        let mut backend = HeadlessBackend::new(800, 600);
        let bitmap = backend.rasterize_text(FontId(0), 10, "hi").unwrap();
        assert_eq!(backend.live_textures(), 1);
        assert!(backend.rasterize_text(FontId(0), 10, "").is_none());

        backend.release_texture(bitmap.texture);
        assert_eq!(backend.live_textures(), 0);
        assert!(!backend.is_live(bitmap.texture));
    }

    #[test]
    fn test_theme_has_four_textures() {
        let mut backend = HeadlessBackend::new(800, 600);
        let theme = backend.load_theme("classic").unwrap();
        assert!(theme.textures.iter().all(Option::is_some));
        assert_eq!(backend.live_textures(), 4);
    }
}
