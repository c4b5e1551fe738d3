//! UI rendering system.
//!
//! Geometry lives in one vertex buffer with a fixed slot per widget id (plus
//! slots for the shared digit glyphs). Slots are rewritten only when content
//! changes; per-frame motion is expressed as draw-time transforms, so a frame
//! produces a short list of [`DrawCommand`]s and no vertex traffic.
//!
//! ```text
//! slot layout (24 vertices)
//! ┌──────────────────────────────┬───────────────────────┐
//! │ 16 nine-slice background     │ 8 content (text/image)│
//! └──────────────────────────────┴───────────────────────┘
//! ```

use std::ops::Range;

use crate::animation::ScreenTransform;
use crate::backend::TextureId;
use crate::layout::{Borders, Rect, Size, Viewport};
use crate::style::{Color, FontSize, Sides, Theme, WidgetState};
use crate::widget::{LeafKind, Widget, WidgetArena, WidgetFlags, WidgetId, WidgetKind, CAPACITY};

/// Background vertices per slot (4×4 grid).
pub const RECT_VERTS: usize = 16;
/// Text vertices per slot (shadow quad + main quad).
pub const TEXT_VERTS: usize = 8;
/// Image vertices per slot.
pub const IMAGE_VERTS: usize = 4;
/// Vertices per slot.
pub const SLOT_VERTS: usize = RECT_VERTS + TEXT_VERTS;
/// Background strip indices per slot, stitches included.
pub const RECT_INDICES: usize = 28;
/// Glyphs cached per font size: digits 0-9 and a colon.
pub const DIGIT_GLYPHS: usize = 11;
/// Total geometry slots.
pub const SLOT_COUNT: usize = CAPACITY + FontSize::COUNT * DIGIT_GLYPHS;

/// One triangle strip per grid row, joined by degenerate triangles.
const RECT_INDEX_BASE: [u16; RECT_INDICES] = [
    0, 1, 4, 5, 8, 9, 12, 13, 13, 1, // top
    1, 2, 5, 6, 9, 10, 13, 14, 14, 2, // middle
    2, 3, 6, 7, 10, 11, 14, 15, // bottom
];

/// Vertex for UI rendering.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GuiVertex {
    /// Color (RGBA).
    pub color: [u8; 4],
    /// Texture coordinates (u, v).
    pub uv: [f32; 2],
    /// Position relative to the widget center.
    pub pos: [i16; 2],
}

impl GuiVertex {
    fn new(x: i32, y: i32, u: f32, v: f32, color: Color) -> Self {
        Self {
            color: color.to_array(),
            uv: [u, v],
            pos: [to_i16(x), to_i16(y)],
        }
    }
}

/// Saturating pixel coordinate.
#[inline]
fn to_i16(v: i32) -> i16 {
    v.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16
}

/// Smallest power of two not below `n`.
fn pow2(n: i32) -> i32 {
    (n.max(1) as u32).next_power_of_two() as i32
}

/// Buffer regions rewritten since the last upload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirtyRanges {
    /// Vertex ranges, sorted and disjoint.
    pub vertices: Vec<Range<usize>>,
    /// Index ranges, sorted and disjoint.
    pub indices: Vec<Range<usize>>,
}

impl DirtyRanges {
    /// Returns true if nothing needs uploading.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.indices.is_empty()
    }
}

/// Adds `range`, merging with neighbours.
fn mark(ranges: &mut Vec<Range<usize>>, range: Range<usize>) {
    let at = ranges.partition_point(|r| r.end < range.start);
    let mut merged = range;
    while at < ranges.len() && ranges[at].start <= merged.end {
        let r = ranges.remove(at);
        merged = merged.start.min(r.start)..merged.end.max(r.end);
    }
    ranges.insert(at, merged);
}

/// Slot-addressed vertex and index storage.
pub struct GeometryBuffer {
    vertices: Vec<GuiVertex>,
    indices: Vec<u16>,
    dirty: DirtyRanges,
}

impl GeometryBuffer {
    /// Allocates every slot up front; the index buffer never changes after this.
    #[must_use]
    pub fn new() -> Self {
        let indices: Vec<u16> = (0..SLOT_COUNT)
            .flat_map(|slot| {
                RECT_INDEX_BASE
                    .iter()
                    .map(move |&i| (slot * SLOT_VERTS) as u16 + i)
            })
            .collect();
        let vertex_count = SLOT_COUNT * SLOT_VERTS;
        let index_count = indices.len();

        Self {
            vertices: vec![GuiVertex::default(); vertex_count],
            indices,
            dirty: DirtyRanges {
                vertices: vec![0..vertex_count],
                indices: vec![0..index_count],
            },
        }
    }

    /// All vertices.
    #[must_use]
    pub fn vertices(&self) -> &[GuiVertex] {
        &self.vertices
    }

    /// All indices.
    #[must_use]
    pub fn indices(&self) -> &[u16] {
        &self.indices
    }

    /// Index range of a slot's background strip.
    #[must_use]
    pub const fn rect_indices(slot: usize) -> Range<usize> {
        slot * RECT_INDICES..(slot + 1) * RECT_INDICES
    }

    /// Vertex range of a slot's content quads.
    #[must_use]
    pub const fn content_vertices(slot: usize, count: usize) -> Range<usize> {
        let start = slot * SLOT_VERTS + RECT_VERTS;
        start..start + count
    }

    /// Hands out and clears the dirty ranges.
    pub fn take_dirty(&mut self) -> DirtyRanges {
        std::mem::take(&mut self.dirty)
    }

    /// Writes a nine-slice background centered on the origin.
    ///
    /// Insets apply only on the sides in `sides`; UVs come from the theme grid.
    pub fn write_rect(&mut self, slot: usize, size: Size, sides: Sides, borders: Borders, theme: &Theme) {
        let (x, y, w, h) = (-size.w / 2, -size.h / 2, size.w, size.h);
        let inset = |side: Sides, by: i32| if sides.has(side) { by } else { 0 };

        let xs = [
            x,
            x + inset(Sides::W, borders.west),
            x + w - inset(Sides::E, borders.east),
            x + w,
        ];
        let ys = [
            y + h,
            y + h - inset(Sides::N, borders.north),
            y + inset(Sides::S, borders.south),
            y,
        ];

        let base = slot * SLOT_VERTS;
        for (i, &vx) in xs.iter().enumerate() {
            for (j, &vy) in ys.iter().enumerate() {
                self.vertices[base + i * 4 + j] =
                    GuiVertex::new(vx, vy, theme.s[i], theme.t[j], Color::WHITE);
            }
        }
        mark(&mut self.dirty.vertices, base..base + RECT_VERTS);
    }

    /// Writes a text quad and its drop shadow, centered on the origin.
    ///
    /// The texture is assumed padded to power-of-two dimensions; the quad
    /// samples only the centered content. An empty size zeroes the slot.
    pub fn write_text(&mut self, slot: usize, size: Size, colors: [Color; 2]) {
        if size.is_empty() {
            self.clear_content(slot);
            return;
        }

        let (x, y, w, h) = (-size.w / 2, -size.h / 2, size.w, size.h);
        let (tw, th) = (pow2(w), pow2(h));
        let d = h / 16;

        let ww = if (tw - w) % 2 == 1 { w + 1 } else { w };
        let hh = if (th - h) % 2 == 1 { h + 1 } else { h };

        let s0 = 0.5 * (tw - ww) as f32 / tw as f32;
        let t0 = 0.5 * (th - hh) as f32 / th as f32;
        let (s1, t1) = (1.0 - s0, 1.0 - t0);

        let [c0, c1] = colors;
        let shadow = if c0.a < 0xFF {
            Color::SHADOW.with_alpha((f32::from(c0.a) * 0.5) as u8)
        } else {
            Color::SHADOW
        };

        let base = slot * SLOT_VERTS + RECT_VERTS;
        let quads = [
            GuiVertex::new(x + d, y + hh - d, s0, t0, shadow),
            GuiVertex::new(x + d, y - d, s0, t1, shadow),
            GuiVertex::new(x + ww + d, y + hh - d, s1, t0, shadow),
            GuiVertex::new(x + ww + d, y - d, s1, t1, shadow),
            GuiVertex::new(x, y + hh, s0, t0, c1),
            GuiVertex::new(x, y, s0, t1, c0),
            GuiVertex::new(x + ww, y + hh, s1, t0, c1),
            GuiVertex::new(x + ww, y, s1, t1, c0),
        ];
        self.vertices[base..base + TEXT_VERTS].copy_from_slice(&quads);
        mark(&mut self.dirty.vertices, base..base + TEXT_VERTS);
    }

    /// Writes an image quad inside the background insets.
    pub fn write_image(&mut self, slot: usize, size: Size, sides: Sides, borders: Borders) {
        let (x, y, w, h) = (-size.w / 2, -size.h / 2, size.w, size.h);
        let inset = |side: Sides, by: i32| if sides.has(side) { by } else { 0 };

        let x0 = x + inset(Sides::W, borders.west);
        let x1 = x + w - inset(Sides::E, borders.east);
        let y0 = y + h - inset(Sides::N, borders.north);
        let y1 = y + inset(Sides::S, borders.south);

        let base = slot * SLOT_VERTS + RECT_VERTS;
        let quad = [
            GuiVertex::new(x0, y0, 0.0, 1.0, Color::WHITE),
            GuiVertex::new(x0, y1, 0.0, 0.0, Color::WHITE),
            GuiVertex::new(x1, y0, 1.0, 1.0, Color::WHITE),
            GuiVertex::new(x1, y1, 1.0, 0.0, Color::WHITE),
        ];
        self.vertices[base..base + IMAGE_VERTS].copy_from_slice(&quad);
        mark(&mut self.dirty.vertices, base..base + IMAGE_VERTS);
    }

    /// Zeroes a slot's content vertices.
    pub fn clear_content(&mut self, slot: usize) {
        let base = slot * SLOT_VERTS + RECT_VERTS;
        self.vertices[base..base + TEXT_VERTS].fill(GuiVertex::default());
        mark(&mut self.dirty.vertices, base..base + TEXT_VERTS);
    }
}

impl Default for GeometryBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// One pre-rendered glyph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Glyph {
    /// Texture, if rasterization succeeded.
    pub texture: Option<TextureId>,
    /// Rendered size.
    pub size: Size,
}

/// Digit and colon glyphs shared by every counter and clock.
#[derive(Debug, Clone, Default)]
pub struct DigitCache {
    glyphs: [[Glyph; DIGIT_GLYPHS]; FontSize::COUNT],
}

impl DigitCache {
    /// Glyph index of the colon.
    pub const COLON: usize = 10;

    /// Text rendered for each glyph index.
    pub const TEXT: [&'static str; DIGIT_GLYPHS] =
        ["0", "1", "2", "3", "4", "5", "6", "7", "8", "9", ":"];

    /// Geometry slot of a glyph.
    #[must_use]
    pub const fn slot(size: FontSize, glyph: usize) -> usize {
        CAPACITY + size.index() * DIGIT_GLYPHS + glyph
    }

    /// Gets a glyph.
    #[must_use]
    pub fn get(&self, size: FontSize, glyph: usize) -> Glyph {
        self.glyphs[size.index()][glyph]
    }

    /// Replaces a glyph, returning the texture it held.
    pub fn set(&mut self, size: FontSize, glyph: usize, value: Glyph) -> Option<TextureId> {
        std::mem::replace(&mut self.glyphs[size.index()][glyph], value).texture
    }

    /// Size of the "0" glyph, used to size counters and clocks.
    #[must_use]
    pub fn digit_size(&self, size: FontSize) -> Size {
        self.get(size, 0).size
    }

    /// Empties the cache, returning every texture it held.
    pub fn drain(&mut self) -> Vec<TextureId> {
        let textures = self
            .glyphs
            .iter()
            .flatten()
            .filter_map(|g| g.texture)
            .collect();
        self.glyphs = [[Glyph::default(); DIGIT_GLYPHS]; FontSize::COUNT];
        textures
    }
}

/// 2D similarity transform: uniform scale followed by translation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Uniform scale.
    pub scale: f32,
    /// Horizontal translation.
    pub tx: f32,
    /// Vertical translation.
    pub ty: f32,
}

impl Transform {
    /// No transform.
    pub const IDENTITY: Self = Self {
        scale: 1.0,
        tx: 0.0,
        ty: 0.0,
    };

    /// Pure translation.
    #[must_use]
    pub const fn translate(tx: f32, ty: f32) -> Self {
        Self { scale: 1.0, tx, ty }
    }

    /// Pure scale about the origin.
    #[must_use]
    pub const fn scale(k: f32) -> Self {
        Self {
            scale: k,
            tx: 0.0,
            ty: 0.0,
        }
    }

    /// Scale about `(cx, cy)`.
    #[must_use]
    pub fn scale_about(cx: f32, cy: f32, k: f32) -> Self {
        Self {
            scale: k,
            tx: cx - k * cx,
            ty: cy - k * cy,
        }
    }

    /// `self` applied after `inner`.
    #[must_use]
    pub fn then(self, inner: Self) -> Self {
        Self {
            scale: self.scale * inner.scale,
            tx: self.scale * inner.tx + self.tx,
            ty: self.scale * inner.ty + self.ty,
        }
    }

    /// Maps a point.
    #[must_use]
    pub fn apply(self, x: f32, y: f32) -> (f32, f32) {
        (x * self.scale + self.tx, y * self.scale + self.ty)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// A draw call for the backend.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Nine-slice background: an indexed triangle strip.
    Background {
        /// Widget drawn.
        widget: WidgetId,
        /// Theme texture for the widget state.
        texture: TextureId,
        /// Range into the index buffer.
        indices: Range<usize>,
        /// Placement.
        transform: Transform,
        /// Vertex color multiplier.
        tint: Color,
    },
    /// Textured quads: each run of 4 vertices is one triangle strip.
    Quads {
        /// Widget drawn (for glyphs, the counter or clock).
        widget: WidgetId,
        /// Text, image or glyph texture.
        texture: TextureId,
        /// Range into the vertex buffer.
        vertices: Range<usize>,
        /// Placement.
        transform: Transform,
        /// Vertex color multiplier.
        tint: Color,
    },
    /// Scissor rect (clip following draws).
    PushClip {
        /// Clip bounds, already intersected with the enclosing clip.
        bounds: Rect,
    },
    /// Pop scissor rect.
    PopClip,
}

/// Everything the backend needs for one frame.
#[derive(Debug, Clone, Copy)]
pub struct DrawList<'a> {
    /// First pass: backgrounds.
    pub backgrounds: &'a [DrawCommand],
    /// Second pass: text, images and glyphs.
    pub content: &'a [DrawCommand],
    /// Screen-level sweep applied around the viewport center.
    pub screen: ScreenTransform,
    /// Vertex buffer.
    pub vertices: &'a [GuiVertex],
    /// Index buffer.
    pub indices: &'a [u16],
}

impl DrawList<'_> {
    /// Total command count over both passes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.backgrounds.len() + self.content.len()
    }

    /// Returns true if nothing is drawn.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Read-only state a paint pass walks.
pub struct PaintContext<'a> {
    /// Widget storage.
    pub arena: &'a WidgetArena,
    /// Background theme.
    pub theme: &'a Theme,
    /// Shared digit glyphs.
    pub digits: &'a DigitCache,
    /// Focused widget.
    pub focused: WidgetId,
    /// Current viewport.
    pub viewport: Viewport,
}

/// Collects draw commands and owns the geometry buffer.
pub struct RenderBatcher {
    geometry: GeometryBuffer,
    backgrounds: Vec<DrawCommand>,
    content: Vec<DrawCommand>,
    clip_stack: Vec<Rect>,
    screen: ScreenTransform,
}

impl RenderBatcher {
    /// Creates a batcher with every geometry slot allocated.
    #[must_use]
    pub fn new() -> Self {
        Self {
            geometry: GeometryBuffer::new(),
            backgrounds: Vec::with_capacity(CAPACITY),
            content: Vec::with_capacity(CAPACITY),
            clip_stack: Vec::with_capacity(16),
            screen: ScreenTransform::IDENTITY,
        }
    }

    /// Geometry storage.
    #[must_use]
    pub fn geometry(&self) -> &GeometryBuffer {
        &self.geometry
    }

    /// Geometry storage, for writes.
    pub fn geometry_mut(&mut self) -> &mut GeometryBuffer {
        &mut self.geometry
    }

    /// Begins a new frame.
    pub fn begin_frame(&mut self) {
        self.backgrounds.clear();
        self.content.clear();
        self.clip_stack.clear();
        self.screen = ScreenTransform::IDENTITY;
    }

    /// Adds a background command.
    pub fn push_background(&mut self, command: DrawCommand) {
        self.backgrounds.push(command);
    }

    /// Adds a content command.
    pub fn push(&mut self, command: DrawCommand) {
        self.content.push(command);
    }

    /// Pushes a clip rect.
    pub fn push_clip(&mut self, bounds: Rect) {
        // Intersect with current clip if any
        let actual_clip = match self.clip_stack.last() {
            Some(current) => current.intersection(&bounds).unwrap_or(Rect::ZERO),
            None => bounds,
        };

        self.clip_stack.push(actual_clip);
        self.content.push(DrawCommand::PushClip {
            bounds: actual_clip,
        });
    }

    /// Pops the current clip rect.
    pub fn pop_clip(&mut self) {
        self.clip_stack.pop();
        self.content.push(DrawCommand::PopClip);
    }

    /// Returns the current clip rect.
    #[must_use]
    pub fn current_clip(&self) -> Option<Rect> {
        self.clip_stack.last().copied()
    }

    /// Ends the frame.
    #[must_use]
    pub fn end_frame(&self) -> DrawList<'_> {
        DrawList {
            backgrounds: &self.backgrounds,
            content: &self.content,
            screen: self.screen,
            vertices: self.geometry.vertices(),
            indices: self.geometry.indices(),
        }
    }

    /// Records a full frame for the tree at `id`.
    pub fn paint(&mut self, cx: &PaintContext<'_>, id: WidgetId) -> DrawList<'_> {
        self.begin_frame();

        if let Some(w) = cx.arena.get(id) {
            self.screen = w.sweep.transform(w.alpha, cx.viewport);
            self.paint_backgrounds(cx, id, WidgetState::Normal, false);
            self.paint_content(cx, id, Transform::IDENTITY);
        }

        self.end_frame()
    }

    fn paint_backgrounds(&mut self, cx: &PaintContext<'_>, id: WidgetId, inherited: WidgetState, covered: bool) {
        let Some(w) = cx.arena.get(id) else {
            return;
        };
        if w.hidden {
            return;
        }

        let state = WidgetState::from_bits(
            inherited.bits()
                | if w.flags.has(WidgetFlags::HILITE) { 2 } else { 0 }
                | u8::from(id == cx.focused),
        );

        let mut covered = covered;
        if w.flags.has(WidgetFlags::RECT) && !covered {
            if let Some(texture) = cx.theme.texture(state) {
                self.push_background(DrawCommand::Background {
                    widget: id,
                    texture,
                    indices: GeometryBuffer::rect_indices(id.index()),
                    transform: leaf_origin(w),
                    tint: Color::tint(w.opacity()),
                });
            }
            covered = true;
        }

        if w.kind.is_container() {
            for child in cx.arena.children(id) {
                self.paint_backgrounds(cx, child, state, covered);
            }
        }
    }

    fn paint_content(&mut self, cx: &PaintContext<'_>, id: WidgetId, parent: Transform) {
        let Some(w) = cx.arena.get(id) else {
            return;
        };
        if w.hidden || w.opacity() < 0.5 {
            return;
        }

        let tint = Color::tint(w.opacity());
        let slot = id.index();

        match w.kind {
            WidgetKind::Leaf(LeafKind::Filler | LeafKind::Space) => {}
            WidgetKind::Container(_) => {
                let (ox, oy) = w.offset();
                let cx_ = w.rect.x as f32 + w.rect.w as f32 / 2.0 + ox;
                let cy_ = w.rect.y as f32 + w.rect.h as f32 / 2.0 + oy;
                let k = w.pulse_scale;

                let transform = if (k - 1.0).abs() > f32::EPSILON {
                    parent.then(Transform::scale_about(cx_, cy_, k))
                } else {
                    parent
                };

                let clip = w.flags.has(WidgetFlags::CLIP);
                if clip {
                    self.push_clip(w.shifted_rect());
                }
                for child in cx.arena.children(id) {
                    self.paint_content(cx, child, transform);
                }
                if clip {
                    self.pop_clip();
                }
            }
            WidgetKind::Leaf(leaf) => {
                let base = parent
                    .then(leaf_origin(w))
                    .then(Transform::scale(w.pulse_scale));

                match leaf {
                    LeafKind::Image => {
                        if let Some(texture) = w.texture {
                            self.push(DrawCommand::Quads {
                                widget: id,
                                texture,
                                vertices: GeometryBuffer::content_vertices(slot, IMAGE_VERTS),
                                transform: base,
                                tint,
                            });
                        }
                    }
                    LeafKind::Label | LeafKind::Button => {
                        if let Some(texture) = w.texture {
                            self.push(DrawCommand::Quads {
                                widget: id,
                                texture,
                                vertices: GeometryBuffer::content_vertices(slot, TEXT_VERTS),
                                transform: base,
                                tint,
                            });
                        }
                    }
                    LeafKind::Count => self.paint_count(cx, id, w, base, tint),
                    LeafKind::Clock => self.paint_clock(cx, id, w, base, tint),
                    LeafKind::Filler | LeafKind::Space => {}
                }
            }
        }
    }

    fn glyph(&mut self, cx: &PaintContext<'_>, id: WidgetId, size: FontSize, glyph: usize, transform: Transform, tint: Color) {
        if let Some(texture) = cx.digits.get(size, glyph).texture {
            self.push(DrawCommand::Quads {
                widget: id,
                texture,
                vertices: GeometryBuffer::content_vertices(DigitCache::slot(size, glyph), TEXT_VERTS),
                transform,
                tint,
            });
        }
    }

    /// Digits centered on the widget, least significant drawn first.
    fn paint_count(&mut self, cx: &PaintContext<'_>, id: WidgetId, w: &Widget, base: Transform, tint: Color) {
        let size = w.size;
        let width = |g: usize| cx.digits.get(size, g).size.w as f32;

        if w.value > 0 {
            let mut x = -width(0) * 0.5;
            let mut v = w.value;
            while v != 0 {
                x += width((v % 10) as usize) * 0.5;
                v /= 10;
            }

            let mut v = w.value;
            while v != 0 {
                let g = (v % 10) as usize;
                self.glyph(cx, id, size, g, base.then(Transform::translate(x, 0.0)), tint);
                x -= width(g);
                v /= 10;
            }
        } else if w.value == 0 {
            self.glyph(cx, id, size, 0, base, tint);
        }
    }

    /// `[H]H:MM:SS` with hundredths at half scale; leading zero fields elided.
    fn paint_clock(&mut self, cx: &PaintContext<'_>, id: WidgetId, w: &Widget, base: Transform, tint: Color) {
        const DAY: i32 = 24 * 60 * 60 * 100;

        if w.value < 0 {
            return;
        }

        let v = w.value % DAY;
        let hours = v / 360_000;
        let hrt = (hours / 10) as usize;
        let hro = (hours % 10) as usize;
        let mt = ((v / 6000) / 10 % 6) as usize;
        let mo = ((v / 6000) % 10) as usize;
        let st = ((v % 6000) / 100 / 10) as usize;
        let so = ((v % 6000) / 100 % 10) as usize;
        let ht = ((v % 100) / 10) as usize;
        let ho = (v % 10) as usize;

        let size = w.size;
        let large = cx.digits.digit_size(size).w as f32;
        let small = large * 0.75;

        let lead = if hrt > 0 {
            -3.75
        } else if hro > 0 {
            -3.25
        } else if mt > 0 {
            -2.25
        } else {
            -1.75
        };
        let mut t = base.then(Transform::translate(lead * large, 0.0));

        let mut emit = |batcher: &mut Self, t: &mut Transform, glyph: usize, advance: f32| {
            batcher.glyph(cx, id, size, glyph, *t, tint);
            *t = t.then(Transform::translate(advance, 0.0));
        };

        if hrt > 0 {
            emit(self, &mut t, hrt, large);
        }
        if hours > 0 {
            emit(self, &mut t, hro, small);
            emit(self, &mut t, DigitCache::COLON, small);
        }
        if mt > 0 || hours > 0 {
            emit(self, &mut t, mt, large);
        }
        emit(self, &mut t, mo, small);
        emit(self, &mut t, DigitCache::COLON, small);
        emit(self, &mut t, st, large);
        emit(self, &mut t, so, small);

        t = t.then(Transform::scale(0.5));
        emit(self, &mut t, ht, large);
        emit(self, &mut t, ho, 0.0);
    }
}

impl Default for RenderBatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Translation to a widget's center plus its slide offset.
fn leaf_origin(w: &Widget) -> Transform {
    let (ox, oy) = w.offset();
    Transform::translate(
        (w.rect.x + w.rect.w / 2) as f32 + ox,
        (w.rect.y + w.rect.h / 2) as f32 + oy,
    )
}

/// Rebuilds background and image geometry for a subtree.
///
/// Text geometry is written separately when text is rasterized. A widget
/// under an ancestor with a background gets none of its own.
pub fn build_geometry(
    geometry: &mut GeometryBuffer,
    arena: &WidgetArena,
    id: WidgetId,
    borders: Borders,
    theme: &Theme,
    covered: bool,
) {
    let Some(w) = arena.get(id) else {
        return;
    };
    let slot = id.index();
    let size = w.rect.size();

    let mut covered = covered;
    if w.flags.has(WidgetFlags::RECT) && !covered {
        geometry.write_rect(slot, size, w.sides, borders, theme);
        covered = true;
    }

    match w.kind {
        WidgetKind::Container(_) => {
            for child in arena.children(id) {
                build_geometry(geometry, arena, child, borders, theme, covered);
            }
        }
        WidgetKind::Leaf(LeafKind::Image) => geometry.write_image(slot, size, w.sides, borders),
        WidgetKind::Leaf(LeafKind::Count | LeafKind::Clock) => geometry.clear_content(slot),
        WidgetKind::Leaf(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_layout() {
        assert_eq!(std::mem::size_of::<GuiVertex>(), 16);
        let v = GuiVertex::new(3, -4, 0.5, 0.25, Color::RED);
        let bytes: &[u8] = bytemuck::bytes_of(&v);
        assert_eq!(&bytes[0..4], &[0xFF, 0, 0, 0xFF]);
    }

    #[test]
    fn test_vertex_position_saturates() {
        let v = GuiVertex::new(40_000, -40_000, 0.0, 0.0, Color::WHITE);
        assert_eq!(v.pos, [i16::MAX, i16::MIN]);
        assert_eq!(GuiVertex::new(-3, 7, 0.0, 0.0, Color::WHITE).pos, [-3, 7]);
    }

    #[test]
    fn test_index_buffer_offsets() {
        let geometry = GeometryBuffer::new();
        assert_eq!(geometry.indices().len(), SLOT_COUNT * RECT_INDICES);
        let second = &geometry.indices()[GeometryBuffer::rect_indices(1)];
        assert_eq!(second[0], SLOT_VERTS as u16);
        assert_eq!(second[RECT_INDICES - 1], SLOT_VERTS as u16 + 15);
    }

    #[test]
    fn test_mark_merges() {
        let mut ranges = Vec::new();
        mark(&mut ranges, 10..20);
        mark(&mut ranges, 40..50);
        mark(&mut ranges, 20..30);
        assert_eq!(ranges, vec![10..30, 40..50]);
        mark(&mut ranges, 0..5);
        mark(&mut ranges, 25..45);
        assert_eq!(ranges, vec![0..5, 10..50]);
    }

    #[test]
    fn test_dirty_tracking() {
        let mut geometry = GeometryBuffer::new();
        let initial = geometry.take_dirty();
        assert_eq!(initial.indices.len(), 1);
        assert!(geometry.take_dirty().is_empty());

        geometry.write_rect(2, Size::new(100, 40), Sides::ALL, Borders::uniform(5), &Theme::BLANK);
        geometry.write_text(2, Size::new(30, 10), Color::DEFAULT_GRADIENT);

        let dirty = geometry.take_dirty();
        assert_eq!(dirty.vertices, vec![2 * SLOT_VERTS..3 * SLOT_VERTS]);
        assert!(dirty.indices.is_empty());
    }

    #[test]
    fn test_rect_grid_insets() {
        let mut geometry = GeometryBuffer::new();
        geometry.write_rect(1, Size::new(100, 40), Sides::W | Sides::N, Borders::uniform(5), &Theme::BLANK);

        let v = &geometry.vertices()[SLOT_VERTS..SLOT_VERTS + RECT_VERTS];
        // Column 1 is inset on the west side, column 2 is not inset on the east.
        assert_eq!(v[4].pos, [-45, 20]);
        assert_eq!(v[8].pos, [50, 20]);
        // Row 1 is inset on the north side, row 2 is not inset on the south.
        assert_eq!(v[1].pos, [-50, 15]);
        assert_eq!(v[2].pos, [-50, -20]);
    }

    #[test]
    fn test_text_quads() {
        let mut geometry = GeometryBuffer::new();
        geometry.write_text(3, Size::new(31, 32), [Color::WHITE_TRANSLUCENT, Color::YELLOW]);

        let v = &geometry.vertices()[GeometryBuffer::content_vertices(3, TEXT_VERTS)];
        // Odd padding to the power-of-two width rounds the quad up to even.
        assert_eq!(v[6].pos[0] - v[4].pos[0], 32);
        assert_eq!(v[0].pos, [-15 + 2, -16 + 32 - 2]);
        assert_eq!(v[0].color[3], 0x30);
        assert_eq!(v[4].color, Color::YELLOW.to_array());
        assert_eq!(v[5].color, Color::WHITE_TRANSLUCENT.to_array());

        geometry.write_text(3, Size::ZERO, Color::DEFAULT_GRADIENT);
        let v = &geometry.vertices()[GeometryBuffer::content_vertices(3, TEXT_VERTS)];
        assert!(v.iter().all(|v| *v == GuiVertex::default()));
    }

    #[test]
    fn test_transform_compose() {
        let t = Transform::translate(10.0, 20.0).then(Transform::scale(2.0));
        assert_eq!(t.apply(1.0, 1.0), (12.0, 22.0));

        let about = Transform::scale_about(5.0, 5.0, 2.0);
        assert_eq!(about.apply(5.0, 5.0), (5.0, 5.0));
        assert_eq!(about.apply(6.0, 5.0), (7.0, 5.0));
    }

    #[test]
    fn test_clip_stack_intersects() {
        let mut batcher = RenderBatcher::new();
        batcher.begin_frame();
        batcher.push_clip(Rect::new(0, 0, 100, 100));
        batcher.push_clip(Rect::new(50, 50, 100, 100));
        assert_eq!(batcher.current_clip(), Some(Rect::new(50, 50, 50, 50)));
        batcher.pop_clip();
        batcher.pop_clip();
        assert_eq!(batcher.current_clip(), None);
        assert_eq!(batcher.end_frame().content.len(), 4);
    }

    #[test]
    fn test_digit_cache_drain() {
        let mut digits = DigitCache::default();
        let glyph = Glyph {
            texture: Some(TextureId(9)),
            size: Size::new(12, 20),
        };
        assert_eq!(digits.set(FontSize::Medium, 0, glyph), None);
        assert_eq!(digits.digit_size(FontSize::Medium), Size::new(12, 20));
        assert_eq!(digits.drain(), vec![TextureId(9)]);
        assert_eq!(digits.digit_size(FontSize::Medium), Size::ZERO);
        assert_eq!(DigitCache::slot(FontSize::Tiny, 0), CAPACITY);
    }
}
