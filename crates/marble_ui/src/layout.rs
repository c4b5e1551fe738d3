//! Layout system: measure bottom-up, distribute top-down.
//!
//! Coordinates are integer pixels with the origin at the bottom-left corner
//! of the viewport and y growing upward.

use crate::style::FontSize;
use crate::widget::{ContainerKind, LeafKind, WidgetArena, WidgetFlags, WidgetId, WidgetKind};

/// A rectangle in viewport pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    /// Left edge.
    pub x: i32,
    /// Bottom edge.
    pub y: i32,
    /// Width.
    pub w: i32,
    /// Height.
    pub h: i32,
}

impl Rect {
    /// A zero-sized rect at the origin.
    pub const ZERO: Self = Self::new(0, 0, 0, 0);

    /// Creates a new rectangle.
    #[must_use]
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Returns the right edge.
    #[must_use]
    pub const fn right(&self) -> i32 {
        self.x + self.w
    }

    /// Returns the top edge.
    #[must_use]
    pub const fn top(&self) -> i32 {
        self.y + self.h
    }

    /// Returns the size.
    #[must_use]
    pub const fn size(&self) -> Size {
        Size::new(self.w, self.h)
    }

    /// Returns true if the point is inside the rectangle.
    ///
    /// The right and top edges are outside, so tiled cells never share a pixel.
    #[must_use]
    pub const fn contains(&self, x: i32, y: i32) -> bool {
        self.x <= x && x < self.right() && self.y <= y && y < self.top()
    }

    /// Returns the rectangle moved by `(dx, dy)`.
    #[must_use]
    pub const fn translate(&self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.w, self.h)
    }

    /// Returns the intersection of two rectangles, or None if they don't intersect.
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let top = self.top().min(other.top());

        if right <= x || top <= y {
            return None;
        }
        Some(Self::new(x, y, right - x, top - y))
    }
}

/// Width and height in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Size {
    /// Width.
    pub w: i32,
    /// Height.
    pub h: i32,
}

impl Size {
    /// Zero size.
    pub const ZERO: Self = Self::new(0, 0);

    /// Creates a new size.
    #[must_use]
    pub const fn new(w: i32, h: i32) -> Self {
        Self { w, h }
    }

    /// Returns true when either dimension is zero or negative.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.w <= 0 || self.h <= 0
    }
}

/// Drawable area reported by the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Viewport {
    /// Width in pixels.
    pub w: i32,
    /// Height in pixels.
    pub h: i32,
}

impl Viewport {
    /// Creates a new viewport.
    #[must_use]
    pub const fn new(w: i32, h: i32) -> Self {
        Self { w, h }
    }

    /// Smaller of the two dimensions; every scaled metric derives from it.
    #[must_use]
    pub const fn min_side(&self) -> i32 {
        if self.w < self.h {
            self.w
        } else {
            self.h
        }
    }

    /// The whole viewport as a rectangle.
    #[must_use]
    pub const fn rect(&self) -> Rect {
        Rect::new(0, 0, self.w, self.h)
    }
}

/// Fixed background insets, one per side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Borders {
    /// Left inset.
    pub west: i32,
    /// Right inset.
    pub east: i32,
    /// Top inset.
    pub north: i32,
    /// Bottom inset.
    pub south: i32,
}

impl Borders {
    /// Same inset on every side.
    #[must_use]
    pub const fn uniform(inset: i32) -> Self {
        Self {
            west: inset,
            east: inset,
            north: inset,
            south: inset,
        }
    }
}

/// Packing axis of a stack or array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    const fn extent(self, size: Size) -> i32 {
        match self {
            Self::Horizontal => size.w,
            Self::Vertical => size.h,
        }
    }

    const fn origin(self, rect: Rect) -> i32 {
        match self {
            Self::Horizontal => rect.x,
            Self::Vertical => rect.y,
        }
    }

    /// `rect` with its span on this axis replaced.
    const fn span(self, rect: Rect, start: i32, len: i32) -> Rect {
        match self {
            Self::Horizontal => Rect::new(start, rect.y, len, rect.h),
            Self::Vertical => Rect::new(rect.x, start, rect.w, len),
        }
    }
}

/// Share `k` of `total` split into `count` parts; shares always sum to `total`.
#[inline]
const fn split(total: i32, count: i32, k: i32) -> i32 {
    (k + 1) * total / count - k * total / count
}

/// Screen-derived metrics used by measure and distribute.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutEngine {
    /// Current viewport.
    pub viewport: Viewport,
    /// Padding added to leaves and kept around top-level layouts.
    pub padding: i32,
    /// Background insets.
    pub borders: Borders,
    /// Size of one digit glyph, per font size class.
    pub digits: [Size; FontSize::COUNT],
}

impl LayoutEngine {
    /// Derives metrics for a viewport.
    ///
    /// # Arguments
    ///
    /// * `viewport` - Drawable area
    /// * `padding_divisor` - Padding is `min(w, h) / padding_divisor`
    #[must_use]
    pub fn new(viewport: Viewport, padding_divisor: i32) -> Self {
        let padding = viewport.min_side() / padding_divisor.max(1);
        Self {
            viewport,
            padding,
            borders: Borders::uniform(padding),
            digits: [Size::ZERO; FontSize::COUNT],
        }
    }

    /// Measures `id` and its subtree, storing each natural size.
    ///
    /// Always recomputed from content, so repeated layouts agree.
    pub fn measure(&self, arena: &mut WidgetArena, id: WidgetId) -> Size {
        let Some(kind) = arena.kind(id) else {
            return Size::ZERO;
        };

        let natural = match kind {
            WidgetKind::Container(container) => {
                let mut max = Size::ZERO;
                let mut sum = Size::ZERO;
                let mut count = 0;

                let mut child = arena.first_child(id);
                while !child.is_null() {
                    let s = self.measure(arena, child);
                    max.w = max.w.max(s.w);
                    max.h = max.h.max(s.h);
                    sum.w += s.w;
                    sum.h += s.h;
                    count += 1;
                    child = arena.next_sibling(child);
                }

                match container {
                    ContainerKind::Harray => Size::new(max.w * count, max.h),
                    ContainerKind::Varray => Size::new(max.w, max.h * count),
                    ContainerKind::Hstack => Size::new(sum.w, max.h),
                    ContainerKind::Vstack => Size::new(max.w, sum.h),
                    ContainerKind::Root => Size::ZERO,
                }
            }
            WidgetKind::Leaf(LeafKind::Filler | LeafKind::Space) => Size::ZERO,
            WidgetKind::Leaf(leaf) => self.pad_leaf(self.content_size(arena, id, leaf)),
        };

        if let Some(w) = arena.get_mut(id) {
            w.natural = natural;
        }
        natural
    }

    /// Intrinsic content size of a leaf, before padding.
    fn content_size(&self, arena: &WidgetArena, id: WidgetId, leaf: LeafKind) -> Size {
        let Some(w) = arena.get(id) else {
            return Size::ZERO;
        };
        let digit = self.digits[w.size.index()];

        match leaf {
            LeafKind::Label | LeafKind::Button => w.content,
            LeafKind::Image => {
                let s = self.viewport.min_side() as f32;
                Size::new(
                    (w.content.w as f32 / 1000.0 * s).round() as i32,
                    (w.content.h as f32 / 1000.0 * s).round() as i32,
                )
            }
            LeafKind::Count => {
                let mut digits = 0;
                let mut v = w.init_value;
                while v != 0 {
                    digits += 1;
                    v /= 10;
                }
                Size::new(digit.w * digits, digit.h)
            }
            LeafKind::Clock => Size::new(digit.w * 6, digit.h),
            LeafKind::Filler | LeafKind::Space => Size::ZERO,
        }
    }

    fn pad_leaf(&self, mut s: Size) -> Size {
        if 0 < s.w && s.w < s.h {
            s.w = s.h;
        }
        if s.w < self.viewport.w {
            s.w += self.padding;
        }
        if s.h < self.viewport.h {
            s.h += self.padding;
        }
        s.w = s.w.max(self.borders.west + self.borders.east);
        s.h = s.h.max(self.borders.north + self.borders.south);
        s
    }

    /// Clamps a natural size to the padded viewport and aligns it.
    ///
    /// Negative alignment anchors at the origin, zero centers, positive
    /// anchors at the far edge.
    #[must_use]
    pub fn place(&self, natural: Size, x_align: i32, y_align: i32) -> Rect {
        let vp = self.viewport;
        let w = natural.w.min(vp.w - 2 * self.padding);
        let h = natural.h.min(vp.h - 2 * self.padding);

        let x = match x_align.signum() {
            -1 => 0,
            0 => (vp.w - w) / 2,
            _ => vp.w - w,
        };
        let y = match y_align.signum() {
            -1 => 0,
            0 => (vp.h - h) / 2,
            _ => vp.h - h,
        };
        Rect::new(x, y, w, h)
    }

    /// Measures, places and distributes a top-level widget.
    ///
    /// A root instead aligns each of its children on its own.
    pub fn arrange(&self, arena: &mut WidgetArena, id: WidgetId, x_align: i32, y_align: i32) {
        let Some(w) = arena.get_mut(id) else {
            return;
        };
        w.flags.set(WidgetFlags::LAYOUT);
        w.layout_align = (x_align, y_align);

        // A root measures its children but reports no size of its own.
        let natural = self.measure(arena, id);
        if arena.kind(id).is_some_and(WidgetKind::is_root) {
            self.distribute(arena, id, self.viewport.rect());
        } else {
            let rect = self.place(natural, x_align, y_align);
            self.distribute(arena, id, rect);
        }
    }

    /// Assigns `rect` to `id` and splits it among its children.
    ///
    /// Uses the natural sizes from the last [`LayoutEngine::measure`].
    pub fn distribute(&self, arena: &mut WidgetArena, id: WidgetId, rect: Rect) {
        let Some(w) = arena.get_mut(id) else {
            return;
        };
        w.rect = rect;
        let align = w.layout_align;
        let kind = w.kind;

        match kind {
            WidgetKind::Container(ContainerKind::Harray) => {
                self.tile(arena, id, rect, Axis::Horizontal);
            }
            WidgetKind::Container(ContainerKind::Varray) => {
                self.tile(arena, id, rect, Axis::Vertical);
            }
            WidgetKind::Container(ContainerKind::Hstack) => {
                self.pack(arena, id, rect, Axis::Horizontal);
            }
            WidgetKind::Container(ContainerKind::Vstack) => {
                self.pack(arena, id, rect, Axis::Vertical);
            }
            WidgetKind::Container(ContainerKind::Root) => {
                let mut child = arena.first_child(id);
                while !child.is_null() {
                    let natural = arena.get(child).map_or(Size::ZERO, |c| c.natural);
                    let placed = self.place(natural, align.0, align.1);
                    self.distribute(arena, child, placed);
                    child = arena.next_sibling(child);
                }
            }
            WidgetKind::Leaf(_) => {}
        }
    }

    /// Equal cells along `axis`.
    fn tile(&self, arena: &mut WidgetArena, id: WidgetId, rect: Rect, axis: Axis) {
        let count = arena.child_count(id) as i32;
        let extent = axis.extent(rect.size());
        let origin = axis.origin(rect);

        let mut i = 0;
        let mut child = arena.first_child(id);
        while !child.is_null() {
            let start = origin + i * extent / count;
            let end = origin + (i + 1) * extent / count;
            self.distribute(arena, child, axis.span(rect, start, end - start));
            i += 1;
            child = arena.next_sibling(child);
        }
    }

    /// Natural extents along `axis`, leftover shared by fillers and FILL children.
    fn pack(&self, arena: &mut WidgetArena, id: WidgetId, rect: Rect, axis: Axis) {
        let mut growers = 0;
        let mut used = 0;
        for child in arena.children(id) {
            if let Some(c) = arena.get(child) {
                if c.kind.is_filler() || c.flags.has(WidgetFlags::FILL) {
                    growers += 1;
                }
                used += axis.extent(c.natural);
            }
        }
        let left = axis.extent(rect.size()) - used;

        let mut k = 0;
        let mut pos = axis.origin(rect);
        let mut child = arena.first_child(id);
        while !child.is_null() {
            let (natural, filler, fill) = arena.get(child).map_or((0, false, false), |c| {
                (
                    axis.extent(c.natural),
                    c.kind.is_filler(),
                    c.flags.has(WidgetFlags::FILL),
                )
            });

            let share = if filler || fill {
                k += 1;
                split(left, growers, k - 1)
            } else {
                0
            };
            let len = (natural + share).max(0);

            self.distribute(arena, child, axis.span(rect, pos, len));
            pos += len;
            child = arena.next_sibling(child);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_contains_half_open() {
        let rect = Rect::new(10, 10, 100, 50);
        assert!(rect.contains(10, 10));
        assert!(rect.contains(109, 59));
        assert!(!rect.contains(110, 30));
        assert!(!rect.contains(50, 60));
        assert!(!rect.contains(50, 9));
    }

    #[test]
    fn test_rect_intersection() {
        let a = Rect::new(0, 0, 100, 100);
        let b = Rect::new(50, 50, 100, 100);
        assert_eq!(a.intersection(&b), Some(Rect::new(50, 50, 50, 50)));
        assert_eq!(a.intersection(&Rect::new(200, 0, 10, 10)), None);
    }

    #[test]
    fn test_split_sums_exactly() {
        for total in [0, 1, 7, 100, 101, -5] {
            for count in 1..6 {
                let sum: i32 = (0..count).map(|k| split(total, count, k)).sum();
                assert_eq!(sum, total);
            }
        }
    }

    #[test]
    fn test_place_alignment() {
        let engine = LayoutEngine::new(Viewport::new(600, 600), 60);
        assert_eq!(engine.padding, 10);

        let natural = Size::new(100, 40);
        assert_eq!(engine.place(natural, 0, 0), Rect::new(250, 280, 100, 40));
        assert_eq!(engine.place(natural, -1, -1), Rect::new(0, 0, 100, 40));
        assert_eq!(engine.place(natural, 1, 1), Rect::new(500, 560, 100, 40));
    }

    #[test]
    fn test_place_clamps_to_padded_viewport() {
        let engine = LayoutEngine::new(Viewport::new(600, 300), 60);
        let rect = engine.place(Size::new(2000, 2000), 0, 0);
        assert_eq!(rect.w, 600 - 10);
        assert_eq!(rect.h, 300 - 10);
    }

    #[test]
    fn test_pad_leaf_square_and_borders() {
        let engine = LayoutEngine::new(Viewport::new(600, 600), 60);
        assert_eq!(engine.pad_leaf(Size::new(5, 30)), Size::new(40, 40));
        assert_eq!(engine.pad_leaf(Size::ZERO), Size::new(20, 20));
    }
}
