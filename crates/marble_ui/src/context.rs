//! The GUI context: one widget tree, its focus state and the backend that
//! draws it.
//!
//! Every public method accepts any [`WidgetId`]. The null id and ids that do
//! not name a live widget are logged and ignored, so a screen built from
//! failed allocations still runs.

use crate::animation::{decay_pulse, Slide, SlideFlags, Sweep};
use crate::backend::{FontId, GuiBackend};
use crate::config::GuiConfig;
use crate::error::GuiError;
use crate::input::{MouseButton, PointerState, StickAxis};
use crate::layout::{LayoutEngine, Size, Viewport};
use crate::navigation;
use crate::render::{self, DigitCache, DirtyRanges, DrawList, Glyph, PaintContext, RenderBatcher};
use crate::style::{Color, FontSize, Sides, Theme};
use crate::text::{self, Truncation, MAX_LINES};
use crate::widget::{ContainerKind, LeafKind, Widget, WidgetArena, WidgetFlags, WidgetId, WidgetKind};

/// Fonts the context keeps open at once.
const MAX_FONTS: usize = 4;

#[derive(Debug, Clone)]
struct LoadedFont {
    path: String,
    id: FontId,
}

/// Retained-mode GUI over a [`GuiBackend`].
///
/// Drive it once per frame with [`Gui::timer`] then [`Gui::paint`]; call
/// [`Gui::resize`] after the viewport changes.
pub struct Gui<B: GuiBackend> {
    backend: B,
    config: GuiConfig,
    arena: WidgetArena,
    layout: LayoutEngine,
    batcher: RenderBatcher,
    theme: Theme,
    fonts: Vec<LoadedFont>,
    digits: DigitCache,
    pointer: PointerState,
    focused: WidgetId,
    reduced_motion: bool,
}

impl<B: GuiBackend> Gui<B> {
    /// Creates a context, opening the default font and the theme.
    pub fn new(backend: B, config: GuiConfig) -> Self {
        let viewport = backend.viewport();
        let mut gui = Self {
            layout: LayoutEngine::new(viewport, config.padding_divisor),
            reduced_motion: !config.screen_animations,
            backend,
            config,
            arena: WidgetArena::new(),
            batcher: RenderBatcher::new(),
            theme: Theme::BLANK,
            fonts: Vec::with_capacity(MAX_FONTS),
            digits: DigitCache::default(),
            pointer: PointerState::default(),
            focused: WidgetId::NULL,
        };

        let default_font = gui.config.default_font.clone();
        gui.load_font(&default_font);
        gui.resize();
        gui
    }

    /// Re-derives every viewport-dependent metric and replays saved layouts.
    pub fn resize(&mut self) {
        let viewport = self.backend.viewport();
        self.layout = LayoutEngine::new(viewport, self.config.padding_divisor);

        self.load_theme();
        self.cache_digits();

        // Text sizes follow the font size, which follows the viewport.
        let ids: Vec<WidgetId> = self.arena.iter().map(|(id, _)| id).collect();
        for &id in &ids {
            let Some(w) = self.arena.get(id) else {
                continue;
            };
            if let Some(init) = w.init_text.clone() {
                let content = self.measure_text(w.font, w.size, &init);
                if let Some(w) = self.arena.get_mut(id) {
                    w.content = content;
                }
            }
        }

        for id in ids {
            let saved = self
                .arena
                .get(id)
                .filter(|w| w.flags.has(WidgetFlags::LAYOUT))
                .map(|w| w.layout_align);
            if let Some((x_align, y_align)) = saved {
                self.layout(id, x_align, y_align);
            }
        }

        tracing::debug!(
            "GUI resized to {}x{} (padding {})",
            viewport.w,
            viewport.h,
            self.layout.padding
        );
    }

    /// Releases every backend resource and hands the backend back.
    pub fn shutdown(mut self) -> B {
        let backend = &mut self.backend;
        self.arena.clear(&mut |_, w| {
            if let Some(texture) = w.texture {
                backend.release_texture(texture);
            }
        });
        for texture in self.digits.drain() {
            self.backend.release_texture(texture);
        }
        self.release_theme();

        tracing::debug!("GUI shut down");
        self.backend
    }

    /// Turns reduced-motion mode on or off.
    ///
    /// While on, slides are not installed and the next [`Gui::timer`] settles
    /// every widget in the ticked tree.
    pub fn set_reduced_motion(&mut self, on: bool) {
        self.reduced_motion = on;
    }

    /// Returns true in reduced-motion mode.
    #[must_use]
    pub fn reduced_motion(&self) -> bool {
        self.reduced_motion
    }

    // =========================================================================
    // Resources
    // =========================================================================

    /// Opens a font, reusing an already open one. Falls back to index 0.
    fn load_font(&mut self, path: &str) -> usize {
        if let Some(index) = self.fonts.iter().position(|f| f.path == path) {
            return index;
        }
        if self.fonts.len() >= MAX_FONTS {
            tracing::warn!("Font table full, {} uses the default font", path);
            return 0;
        }

        match self.backend.load_font(path) {
            Some(id) => {
                self.fonts.push(LoadedFont {
                    path: path.to_owned(),
                    id,
                });
                self.fonts.len() - 1
            }
            None => {
                tracing::warn!("{}", GuiError::BackendResource(format!("font {path}")));
                0
            }
        }
    }

    fn font_id(&self, index: usize) -> Option<FontId> {
        self.fonts.get(index).or_else(|| self.fonts.first()).map(|f| f.id)
    }

    fn font_px(&self, size: FontSize) -> i32 {
        self.config.font_px(size, self.layout.viewport.min_side())
    }

    fn measure_text(&self, font: usize, size: FontSize, text: &str) -> Size {
        match self.font_id(font) {
            Some(font) => self.backend.measure_text(font, self.font_px(size), text),
            None => Size::ZERO,
        }
    }

    fn release_theme(&mut self) {
        for texture in self.theme.textures.iter().flatten() {
            self.backend.release_texture(*texture);
        }
        self.theme = Theme::BLANK;
    }

    fn load_theme(&mut self) {
        self.release_theme();
        self.theme = match self.backend.load_theme(&self.config.theme) {
            Some(theme) => theme,
            None => {
                tracing::warn!(
                    "{}",
                    GuiError::BackendResource(format!("theme {}", self.config.theme))
                );
                Theme::BLANK
            }
        };
    }

    /// Rasterizes the digit and colon glyphs for every size class.
    fn cache_digits(&mut self) {
        for texture in self.digits.drain() {
            self.backend.release_texture(texture);
        }
        let Some(font) = self.font_id(0) else {
            return;
        };

        for size in FontSize::ALL {
            let px = self.font_px(size);
            for (glyph, text) in DigitCache::TEXT.iter().enumerate() {
                let bitmap = self.backend.rasterize_text(font, px, text);
                let value = Glyph {
                    texture: bitmap.map(|b| b.texture),
                    size: bitmap.map_or(Size::ZERO, |b| b.size),
                };
                self.digits.set(size, glyph, value);
                self.batcher.geometry_mut().write_text(
                    DigitCache::slot(size, glyph),
                    value.size,
                    Color::DEFAULT_GRADIENT,
                );
            }
            self.layout.digits[size.index()] = self.digits.digit_size(size);
        }
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// Maps an incoming id to a live widget, logging anything else.
    fn resolve(&self, id: WidgetId, op: &str) -> Option<WidgetId> {
        match self.arena.resolve(id) {
            Ok(Some(id)) => Some(id),
            Ok(None) => {
                tracing::trace!("{} ignored on the null widget", op);
                None
            }
            Err(e) => {
                tracing::warn!("{}: {}", op, e);
                None
            }
        }
    }

    fn with_widget(&mut self, id: WidgetId, op: &str, f: impl FnOnce(&mut Widget)) {
        if let Some(id) = self.resolve(id, op) {
            if let Some(w) = self.arena.get_mut(id) {
                f(w);
            }
        }
    }

    /// True if some ancestor of `id` draws a background.
    fn covered_by_ancestor(&self, id: WidgetId) -> bool {
        let mut ancestor = self.arena.parent(id);
        while !ancestor.is_null() {
            if self
                .arena
                .get(ancestor)
                .is_some_and(|w| w.flags.has(WidgetFlags::RECT))
            {
                return true;
            }
            ancestor = self.arena.parent(ancestor);
        }
        false
    }

    // =========================================================================
    // Construction
    // =========================================================================

    fn create(&mut self, parent: WidgetId, kind: WidgetKind) -> WidgetId {
        match self.arena.allocate(parent, kind) {
            Ok(id) => id,
            Err(e @ GuiError::ArenaExhausted { .. }) => {
                tracing::error!("Cannot create {}: {}", kind.name(), e);
                WidgetId::NULL
            }
            Err(e) => {
                tracing::warn!("Cannot create {} under {}: {}", kind.name(), parent, e);
                WidgetId::NULL
            }
        }
    }

    /// Row of equal cells.
    pub fn harray(&mut self, parent: WidgetId) -> WidgetId {
        self.create(parent, WidgetKind::Container(ContainerKind::Harray))
    }

    /// Column of equal cells.
    pub fn varray(&mut self, parent: WidgetId) -> WidgetId {
        self.create(parent, WidgetKind::Container(ContainerKind::Varray))
    }

    /// Row packed at natural widths.
    pub fn hstack(&mut self, parent: WidgetId) -> WidgetId {
        self.create(parent, WidgetKind::Container(ContainerKind::Hstack))
    }

    /// Column packed at natural heights.
    pub fn vstack(&mut self, parent: WidgetId) -> WidgetId {
        self.create(parent, WidgetKind::Container(ContainerKind::Vstack))
    }

    /// Spacer that absorbs leftover stack space.
    pub fn filler(&mut self, parent: WidgetId) -> WidgetId {
        self.create(parent, WidgetKind::Leaf(LeafKind::Filler))
    }

    /// Zero-sized spacer; grows only with [`Gui::set_fill`].
    pub fn space(&mut self, parent: WidgetId) -> WidgetId {
        self.create(parent, WidgetKind::Leaf(LeafKind::Space))
    }

    /// Top-level anchor for unrelated subtrees.
    pub fn root(&mut self) -> WidgetId {
        self.create(WidgetId::NULL, WidgetKind::Container(ContainerKind::Root))
    }

    /// Image of `w`×`h` pixels at the current viewport; scales with resizes.
    pub fn image(&mut self, parent: WidgetId, path: &str, w: i32, h: i32) -> WidgetId {
        let id = self.create(parent, WidgetKind::Leaf(LeafKind::Image));
        if id.is_null() {
            return id;
        }

        let texture = self.load_image(path);
        let s = self.layout.viewport.min_side().max(1) as f32;
        if let Some(widget) = self.arena.get_mut(id) {
            widget.texture = texture;
            widget.content = Size::new(
                (w as f32 / s * 1000.0).round() as i32,
                (h as f32 / s * 1000.0).round() as i32,
            );
            widget.flags.set(WidgetFlags::RECT);
        }
        id
    }

    fn load_image(&mut self, path: &str) -> Option<crate::backend::TextureId> {
        let bitmap = self.backend.load_image(path);
        if bitmap.is_none() {
            tracing::warn!("{}", GuiError::BackendResource(format!("image {path}")));
        }
        bitmap.map(|b| b.texture)
    }

    fn text_leaf(&mut self, parent: WidgetId, kind: LeafKind, text: &str, size: FontSize) -> WidgetId {
        let id = self.create(parent, WidgetKind::Leaf(kind));
        let content = self.measure_text(0, size, text);
        if let Some(w) = self.arena.get_mut(id) {
            w.text = Some(text.to_owned());
            w.init_text = Some(text.to_owned());
            w.size = size;
            w.content = content;
            w.flags.set(WidgetFlags::RECT);
        }
        id
    }

    /// Static text with a vertical color gradient.
    ///
    /// The text is measured now and rasterized at layout.
    pub fn label(&mut self, parent: WidgetId, text: &str, size: FontSize, colors: [Color; 2]) -> WidgetId {
        let id = self.text_leaf(parent, LeafKind::Label, text, size);
        if let Some(w) = self.arena.get_mut(id) {
            w.colors = colors;
        }
        id
    }

    /// Column of labels, one per line of `text` (split on `\` or newline).
    ///
    /// Empty text creates nothing.
    pub fn multi(&mut self, parent: WidgetId, text: &str, size: FontSize, colors: [Color; 2]) -> WidgetId {
        if text.is_empty() {
            return WidgetId::NULL;
        }
        let id = self.varray(parent);
        if id.is_null() {
            return id;
        }

        for line in text::split_lines(text, MAX_LINES) {
            self.label(id, line, size, colors);
        }
        if let Some(w) = self.arena.get_mut(id) {
            w.flags.set(WidgetFlags::RECT | WidgetFlags::CLIP);
        }
        id
    }

    /// Focusable button that reports `(token, value)` when activated.
    pub fn state(&mut self, parent: WidgetId, text: &str, size: FontSize, token: i32, value: i32) -> WidgetId {
        let id = self.text_leaf(parent, LeafKind::Button, text, size);
        if let Some(w) = self.arena.get_mut(id) {
            w.flags.set(WidgetFlags::STATE);
            w.token = token;
            w.value = value;
        }
        id
    }

    /// Like [`Gui::state`], and takes focus.
    pub fn start(&mut self, parent: WidgetId, text: &str, size: FontSize, token: i32, value: i32) -> WidgetId {
        let id = self.state(parent, text, size, token, value);
        if !id.is_null() {
            self.focused = id;
        }
        id
    }

    fn numeric(&mut self, parent: WidgetId, kind: LeafKind, value: i32, size: FontSize) -> WidgetId {
        let id = self.create(parent, WidgetKind::Leaf(kind));
        if let Some(w) = self.arena.get_mut(id) {
            w.init_value = value;
            w.value = value;
            w.size = size;
            w.colors = Color::DEFAULT_GRADIENT;
            w.flags.set(WidgetFlags::RECT);
        }
        id
    }

    /// Counter sized for as many digits as `value` has.
    pub fn count(&mut self, parent: WidgetId, value: i32, size: FontSize) -> WidgetId {
        self.numeric(parent, LeafKind::Count, value, size)
    }

    /// Clock showing `value` centiseconds.
    pub fn clock(&mut self, parent: WidgetId, value: i32, size: FontSize) -> WidgetId {
        self.numeric(parent, LeafKind::Clock, value, size)
    }

    // =========================================================================
    // Content
    // =========================================================================

    /// Replaces the text of a label or button and rasterizes it.
    pub fn set_label(&mut self, id: WidgetId, text: &str) {
        if let Some(id) = self.resolve(id, "set_label") {
            self.render_label(id, text.to_owned());
        }
    }

    /// Rasterizes `text` truncated to the widget width and rewrites its quad.
    fn render_label(&mut self, id: WidgetId, text: String) {
        let Some(w) = self.arena.get(id) else {
            return;
        };
        let font = self.font_id(w.font);
        let px = self.font_px(w.size);
        // Not laid out yet: nothing to truncate against.
        let max_width = if w.rect.w > 0 { w.rect.w } else { i32::MAX };
        let (trunc, colors, old) = (w.trunc, w.colors, w.texture);

        if let Some(texture) = old {
            self.backend.release_texture(texture);
        }

        let bitmap = match font {
            Some(font) => {
                let shown = text::truncate(&text, max_width, trunc, |s| {
                    self.backend.measure_text(font, px, s).w
                });
                if shown.is_empty() {
                    None
                } else {
                    self.backend.rasterize_text(font, px, &shown)
                }
            }
            None => None,
        };
        if bitmap.is_none() && !text.is_empty() {
            tracing::debug!("{}", GuiError::BackendResource(format!("text for {id}")));
        }

        let size = bitmap.map_or(Size::ZERO, |b| b.size);
        if let Some(w) = self.arena.get_mut(id) {
            w.text = Some(text);
            w.texture = bitmap.map(|b| b.texture);
            w.content = size;
        }
        self.batcher.geometry_mut().write_text(id.index(), size, colors);
    }

    /// Re-rasterizes every text widget in a subtree.
    fn render_text(&mut self, id: WidgetId) {
        if let Some(text) = self.arena.get(id).and_then(|w| w.text.clone()) {
            self.render_label(id, text);
        }
        for child in self.arena.child_ids(id) {
            self.render_text(child);
        }
    }

    /// Spreads lines of `text` over the labels of a [`Gui::multi`].
    ///
    /// Labels beyond the last line are emptied.
    pub fn set_multi(&mut self, id: WidgetId, text: &str) {
        let Some(id) = self.resolve(id, "set_multi") else {
            return;
        };
        let labels = self.arena.child_ids(id);
        let count = labels.len();
        let lines = text::split_lines(text, count);

        // Child lists run newest first.
        for (k, label) in labels.into_iter().enumerate() {
            let line = lines.get(count - 1 - k).copied().unwrap_or("");
            self.render_label(label, line.to_owned());
        }
    }

    /// Replaces an image.
    pub fn set_image(&mut self, id: WidgetId, path: &str) {
        let Some(id) = self.resolve(id, "set_image") else {
            return;
        };
        if let Some(old) = self.arena.get_mut(id).and_then(|w| w.texture.take()) {
            self.backend.release_texture(old);
        }
        let texture = self.load_image(path);
        if let Some(w) = self.arena.get_mut(id) {
            w.texture = texture;
        }
    }

    /// Selects the font used the next time the widget's text is rendered.
    pub fn set_font(&mut self, id: WidgetId, path: &str) {
        let Some(id) = self.resolve(id, "set_font") else {
            return;
        };
        let font = self.load_font(path);
        if let Some(w) = self.arena.get_mut(id) {
            w.font = font;
        }
    }

    /// Sets a counter's value.
    pub fn set_count(&mut self, id: WidgetId, value: i32) {
        self.with_widget(id, "set_count", |w| w.value = value);
    }

    /// Sets a clock's value in centiseconds.
    pub fn set_clock(&mut self, id: WidgetId, value: i32) {
        self.with_widget(id, "set_clock", |w| w.value = value);
    }

    /// Sets the text gradient, rewriting the text quad when it changed.
    pub fn set_color(&mut self, id: WidgetId, colors: [Color; 2]) {
        let Some(id) = self.resolve(id, "set_color") else {
            return;
        };
        let Some(w) = self.arena.get_mut(id) else {
            return;
        };
        if w.colors != colors {
            w.colors = colors;
            let content = w.content;
            self.batcher.geometry_mut().write_text(id.index(), content, colors);
        }
    }

    /// Sets how text is cut when it does not fit.
    pub fn set_trunc(&mut self, id: WidgetId, trunc: Truncation) {
        self.with_widget(id, "set_trunc", |w| w.trunc = trunc);
    }

    /// Lets the widget grow into leftover stack space.
    pub fn set_fill(&mut self, id: WidgetId) {
        self.with_widget(id, "set_fill", |w| w.flags.set(WidgetFlags::FILL));
    }

    /// Makes any widget focusable, e.g. an image button or a whole row.
    pub fn set_state(&mut self, id: WidgetId, token: i32, value: i32) -> WidgetId {
        let Some(id) = self.resolve(id, "set_state") else {
            return WidgetId::NULL;
        };
        if let Some(w) = self.arena.get_mut(id) {
            w.flags.set(WidgetFlags::STATE);
            w.token = token;
            w.value = value;
        }
        id
    }

    /// Sets or clears highlighting.
    pub fn set_hilite(&mut self, id: WidgetId, hilite: bool) {
        self.with_widget(id, "set_hilite", |w| w.flags.assign(WidgetFlags::HILITE, hilite));
    }

    /// Flips highlighting.
    pub fn toggle(&mut self, id: WidgetId) {
        self.with_widget(id, "toggle", |w| w.flags.toggle(WidgetFlags::HILITE));
    }

    /// Gives the widget its own background with insets on `sides`.
    pub fn set_rect(&mut self, id: WidgetId, sides: Sides) {
        self.with_widget(id, "set_rect", |w| {
            w.sides = sides;
            w.flags.set(WidgetFlags::RECT);
        });
    }

    /// Removes backgrounds from a whole subtree.
    pub fn clr_rect(&mut self, id: WidgetId) {
        if let Some(id) = self.resolve(id, "clr_rect") {
            self.clear_flag(id, WidgetFlags::RECT);
        }
    }

    /// Clips the subtree to the widget's rectangle.
    pub fn set_clip(&mut self, id: WidgetId) {
        self.with_widget(id, "set_clip", |w| w.flags.set(WidgetFlags::CLIP));
    }

    /// Removes clipping from a whole subtree.
    pub fn clr_clip(&mut self, id: WidgetId) {
        if let Some(id) = self.resolve(id, "clr_clip") {
            self.clear_flag(id, WidgetFlags::CLIP);
        }
    }

    fn clear_flag(&mut self, id: WidgetId, flag: u32) {
        if let Some(w) = self.arena.get_mut(id) {
            w.flags.clear(flag);
        }
        for child in self.arena.child_ids(id) {
            self.clear_flag(child, flag);
        }
    }

    /// Hides or shows a widget and its subtree.
    pub fn set_hidden(&mut self, id: WidgetId, hidden: bool) {
        self.with_widget(id, "set_hidden", |w| w.hidden = hidden);
    }

    // =========================================================================
    // Layout
    // =========================================================================

    /// Lays out a tree in the viewport.
    ///
    /// Negative alignment anchors at the left or bottom, zero centers,
    /// positive anchors at the right or top. The alignment is replayed by
    /// [`Gui::resize`].
    pub fn layout(&mut self, id: WidgetId, x_align: i32, y_align: i32) {
        let Some(id) = self.resolve(id, "layout") else {
            return;
        };

        self.layout.arrange(&mut self.arena, id, x_align, y_align);
        self.begin_slides(id, None);

        let covered = self.covered_by_ancestor(id);
        render::build_geometry(
            self.batcher.geometry_mut(),
            &self.arena,
            id,
            self.layout.borders,
            &self.theme,
            covered,
        );
        self.render_text(id);

        self.point(id, -1, -1);
    }

    // =========================================================================
    // Animation
    // =========================================================================

    /// Installs a slide on a subtree without starting it.
    ///
    /// Child `k` of `c` starts `stagger * (c - 1 - k)` seconds late, so
    /// children built first move first. Ignored in reduced-motion mode.
    pub fn set_slide(&mut self, id: WidgetId, flags: SlideFlags, delay: f32, duration: f32, stagger: f32) {
        if self.reduced_motion {
            return;
        }
        if let Some(id) = self.resolve(id, "set_slide") {
            self.install_slide(id, flags, delay, duration, stagger);
        }
    }

    fn install_slide(&mut self, id: WidgetId, flags: SlideFlags, delay: f32, duration: f32, stagger: f32) {
        if let Some(w) = self.arena.get_mut(id) {
            w.slide = Some(Slide::new(flags, delay, duration));
        }

        let children = self.arena.child_ids(id);
        let count = children.len();
        for (k, child) in children.into_iter().enumerate() {
            let offset = stagger * (count - 1 - k) as f32;
            self.install_slide(child, flags, delay + offset, duration, 0.0);
        }
    }

    /// Installs and starts a slide.
    pub fn slide(&mut self, id: WidgetId, flags: SlideFlags, delay: f32, duration: f32, stagger: f32) {
        let Some(id) = self.resolve(id, "slide") else {
            return;
        };
        self.set_slide(id, flags, delay, duration, stagger);
        self.begin_slides(id, None);
    }

    /// Computes starting offsets down a subtree.
    fn begin_slides(&mut self, id: WidgetId, inherited: Option<(f32, f32)>) {
        let viewport = self.layout.viewport;
        let Some(w) = self.arena.get_mut(id) else {
            return;
        };

        let rect = w.rect;
        let passed = w.slide.as_mut().map(|slide| {
            slide.begin(rect, viewport, inherited);
            slide.init
        });

        for child in self.arena.child_ids(id) {
            self.begin_slides(child, passed);
        }
    }

    /// Advances animations in a tree by `dt` seconds.
    pub fn timer(&mut self, id: WidgetId, dt: f32) {
        if let Some(id) = self.resolve(id, "timer") {
            self.tick(id, dt);
        }
    }

    fn tick(&mut self, id: WidgetId, dt: f32) {
        let Some(w) = self.arena.get_mut(id) else {
            // Removed earlier in this tick.
            return;
        };
        w.alpha_slide = 1.0;

        if self.reduced_motion {
            // Dropping the slide parks the widget at rest for good.
            let remove = w
                .slide
                .take()
                .is_some_and(|s| s.flags.has(SlideFlags::REMOVE));
            self.fill_alpha(id, 1.0);
            if let Some(w) = self.arena.get_mut(id) {
                w.sweep = Sweep::NONE;
            }
            if remove {
                self.remove(id);
                return;
            }
        }

        for child in self.arena.child_ids(id) {
            self.tick(child, dt);
        }

        let decay = self.config.pulse_decay;
        let Some(w) = self.arena.get_mut(id) else {
            return;
        };
        if w.opacity() >= 0.5 {
            w.pulse_scale = decay_pulse(w.pulse_scale, dt, decay);
        }

        let Some(slide) = w.slide.as_mut() else {
            return;
        };
        let step = slide.tick(dt);
        let remove = step.finished && slide.flags.has(SlideFlags::REMOVE);
        if let Some(fade) = step.fade {
            w.alpha_slide = fade;
        }
        if remove {
            self.remove(id);
        }
    }

    /// Raises the pulse scale to at least `k`.
    pub fn pulse(&mut self, id: WidgetId, k: f32) {
        self.with_widget(id, "pulse", |w| {
            if w.pulse_scale < k {
                w.pulse_scale = k;
            }
        });
    }

    /// Sets one widget's opacity.
    pub fn alpha(&mut self, id: WidgetId, alpha: f32) {
        self.with_widget(id, "alpha", |w| w.alpha = alpha.clamp(0.0, 1.0));
    }

    /// Sets a subtree's opacity and the screen sweep driven by it.
    pub fn set_alpha(&mut self, id: WidgetId, alpha: f32, sweep: Sweep) {
        let Some(id) = self.resolve(id, "set_alpha") else {
            return;
        };
        self.fill_alpha(id, alpha.clamp(0.0, 1.0));
        if let Some(w) = self.arena.get_mut(id) {
            w.sweep = sweep;
        }
    }

    fn fill_alpha(&mut self, id: WidgetId, alpha: f32) {
        if let Some(w) = self.arena.get_mut(id) {
            w.alpha = alpha;
        }
        for child in self.arena.child_ids(id) {
            self.fill_alpha(child, alpha);
        }
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    /// Records the draw commands for a tree.
    pub fn paint(&mut self, id: WidgetId) -> DrawList<'_> {
        let id = self.resolve(id, "paint").unwrap_or(WidgetId::NULL);
        let cx = PaintContext {
            arena: &self.arena,
            theme: &self.theme,
            digits: &self.digits,
            focused: self.focused,
            viewport: self.layout.viewport,
        };
        self.batcher.paint(&cx, id)
    }

    /// Geometry rewritten since the last call, for sub-range uploads.
    pub fn take_dirty(&mut self) -> DirtyRanges {
        self.batcher.geometry_mut().take_dirty()
    }

    // =========================================================================
    // Input and focus
    // =========================================================================

    fn change_focus(&mut self, id: WidgetId) -> WidgetId {
        if id.is_null() || id == self.focused {
            return WidgetId::NULL;
        }
        self.focused = id;
        self.backend.focus_changed(id);
        id
    }

    /// Moves the pointer; negative coordinates reuse the last position.
    ///
    /// # Returns
    ///
    /// The newly focused widget, or NULL if focus did not change.
    pub fn point(&mut self, id: WidgetId, x: i32, y: i32) -> WidgetId {
        let (x, y) = self.pointer.locate(x, y);
        let Some(root) = self.resolve(id, "point") else {
            return WidgetId::NULL;
        };

        let mut hit = navigation::search(&self.arena, self.focused, x, y);
        if hit.is_null() {
            hit = navigation::search(&self.arena, root, x, y);
        }
        self.pointer.hovered = hit;
        self.change_focus(hit)
    }

    /// Moves focus with a joystick or d-pad, wrapping around at the edges.
    ///
    /// Only edge-triggered motion moves focus.
    ///
    /// # Returns
    ///
    /// The newly focused widget, or NULL if focus did not change.
    pub fn stick(&mut self, id: WidgetId, axis: StickAxis, value: f32, edge: bool) -> WidgetId {
        if !edge {
            return WidgetId::NULL;
        }
        let Some(root) = self.resolve(id, "stick") else {
            return WidgetId::NULL;
        };
        let Some(direction) = axis.direction(value) else {
            return WidgetId::NULL;
        };

        let next = navigation::wrap(&self.arena, root, self.focused, direction);
        self.change_focus(next)
    }

    /// Feeds a mouse button.
    ///
    /// # Returns
    ///
    /// On left release, the widget pressed and released on; otherwise NULL.
    pub fn click(&mut self, button: MouseButton, down: bool) -> WidgetId {
        if button != MouseButton::Left {
            return WidgetId::NULL;
        }
        if down {
            self.pointer.press();
            WidgetId::NULL
        } else {
            self.pointer.release()
        }
    }

    /// Sets focus, firing the focus cue when it changes.
    pub fn focus(&mut self, id: WidgetId) {
        if !id.is_null() && self.resolve(id, "focus").is_none() {
            return;
        }
        if self.focused != id {
            self.focused = id;
            self.backend.focus_changed(id);
        }
    }

    /// Focused widget.
    #[must_use]
    pub fn active(&self) -> WidgetId {
        self.focused
    }

    /// Widget under the pointer at the last hit test.
    #[must_use]
    pub fn hovered(&self) -> WidgetId {
        self.pointer.hovered
    }

    /// Action token of a widget, 0 for none.
    #[must_use]
    pub fn token(&self, id: WidgetId) -> i32 {
        self.resolve(id, "token")
            .and_then(|id| self.arena.get(id))
            .map_or(0, |w| w.token)
    }

    /// Value of a widget, 0 for none.
    #[must_use]
    pub fn value(&self, id: WidgetId) -> i32 {
        self.resolve(id, "value")
            .and_then(|id| self.arena.get(id))
            .map_or(0, |w| w.value)
    }

    /// Focusable widget at `(x, y)` inside `id`.
    #[must_use]
    pub fn search(&self, id: WidgetId, x: i32, y: i32) -> WidgetId {
        match self.resolve(id, "search") {
            Some(id) => navigation::search(&self.arena, id, x, y),
            None => WidgetId::NULL,
        }
    }

    /// Child by construction order.
    #[must_use]
    pub fn child(&self, id: WidgetId, index: usize) -> WidgetId {
        match self.resolve(id, "child") {
            Some(id) => self.arena.child(id, index),
            None => WidgetId::NULL,
        }
    }

    // =========================================================================
    // Destruction
    // =========================================================================

    /// Frees a subtree and its textures. Always returns NULL, for
    /// `id = gui.delete(id)`.
    pub fn delete(&mut self, id: WidgetId) -> WidgetId {
        if let Some(id) = self.resolve(id, "delete") {
            self.free_tree(id);
        }
        WidgetId::NULL
    }

    fn free_tree(&mut self, id: WidgetId) {
        let backend = &mut self.backend;
        self.arena.delete(id, &mut |_, w| {
            if let Some(texture) = w.texture {
                backend.release_texture(texture);
            }
        });

        let arena = &self.arena;
        if !self.focused.is_null() && !arena.contains(self.focused) {
            self.focused = WidgetId::NULL;
        }
        self.pointer.forget(|w| !w.is_null() && !arena.contains(w));
    }

    /// Detaches a widget, re-lays out its parent in place, then frees it.
    pub fn remove(&mut self, id: WidgetId) {
        let Some(id) = self.resolve(id, "remove") else {
            return;
        };

        let parent = self.arena.detach(id);
        if let Some(rect) = self.arena.get(parent).map(|p| p.rect) {
            self.layout.distribute(&mut self.arena, parent, rect);
            let covered = self.covered_by_ancestor(parent);
            render::build_geometry(
                self.batcher.geometry_mut(),
                &self.arena,
                parent,
                self.layout.borders,
                &self.theme,
                covered,
            );
        }

        self.free_tree(id);
    }

    /// Logs the subtree at debug level.
    pub fn dump(&self, id: WidgetId) {
        if let Some(id) = self.resolve(id, "dump") {
            self.arena.dump(id);
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// A live widget.
    #[must_use]
    pub fn widget(&self, id: WidgetId) -> Option<&Widget> {
        self.arena.get(id)
    }

    /// Widget storage.
    #[must_use]
    pub fn arena(&self) -> &WidgetArena {
        &self.arena
    }

    /// Current viewport.
    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.layout.viewport
    }

    /// Current padding in pixels.
    #[must_use]
    pub fn padding(&self) -> i32 {
        self.layout.padding
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &GuiConfig {
        &self.config
    }

    /// The backend.
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The backend, for viewport changes and the like.
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::HeadlessBackend;

    fn gui() -> Gui<HeadlessBackend> {
        Gui::new(HeadlessBackend::new(800, 600), GuiConfig::default())
    }

    #[test]
    fn test_null_and_stale_ids_are_no_ops() {
        let mut gui = gui();
        gui.set_label(WidgetId::NULL, "x");
        gui.set_count(WidgetId::new(9999), 3);
        assert_eq!(gui.token(WidgetId::new(77)), 0);
        assert_eq!(gui.harray(WidgetId::new(42)), WidgetId::NULL);
        assert!(gui.arena().is_empty());
    }

    #[test]
    fn test_label_rasterized_at_layout() {
        let mut gui = gui();
        let root = gui.vstack(WidgetId::NULL);
        let label = gui.label(root, "Play", FontSize::Small, Color::DEFAULT_GRADIENT);
        assert!(gui.widget(label).unwrap().texture.is_none());

        gui.layout(root, 0, 0);
        let texture = gui.widget(label).unwrap().texture.unwrap();
        assert!(gui.backend().is_live(texture));

        gui.set_label(label, "Quit");
        assert!(!gui.backend().is_live(texture));
    }

    #[test]
    fn test_delete_releases_textures_and_focus() {
        let mut gui = gui();
        let root = gui.vstack(WidgetId::NULL);
        let button = gui.start(root, "Go", FontSize::Small, 1, 0);
        gui.layout(root, 0, 0);
        let before = gui.backend().live_textures();

        assert_eq!(gui.delete(root), WidgetId::NULL);
        assert_eq!(gui.active(), WidgetId::NULL);
        assert_eq!(gui.backend().live_textures(), before - 1);
        assert!(gui.widget(button).is_none());
    }

    #[test]
    fn test_focus_cue_fires_on_change_only() {
        let mut gui = gui();
        let root = gui.harray(WidgetId::NULL);
        let a = gui.state(root, "A", FontSize::Small, 1, 0);
        gui.focus(a);
        gui.focus(a);
        assert_eq!(gui.backend().focus_cues(), &[a]);
    }

    #[test]
    fn test_shutdown_releases_everything() {
        let mut gui = gui();
        let root = gui.vstack(WidgetId::NULL);
        gui.label(root, "Hello", FontSize::Large, Color::DEFAULT_GRADIENT);
        gui.image(root, "png/logo.png", 100, 50);
        gui.layout(root, 0, 0);

        let backend = gui.shutdown();
        assert_eq!(backend.live_textures(), 0);
    }
}
