//! Core widget types.

use std::fmt;

use crate::animation::{Slide, Sweep};
use crate::backend::TextureId;
use crate::layout::{Rect, Size};
use crate::style::{Color, FontSize, Sides};
use crate::text::Truncation;

/// Identifier of a widget slot. Id 0 is the null widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct WidgetId(pub u32);

impl WidgetId {
    /// The null widget: "no widget", "no focus", "no result".
    pub const NULL: Self = Self(0);

    /// Creates a new widget ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Returns the slot index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Returns true for the null widget.
    #[inline]
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Containers arrange their children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    /// Row of equal cells.
    Harray,
    /// Column of equal cells.
    Varray,
    /// Row packed at natural widths.
    Hstack,
    /// Column packed at natural heights.
    Vstack,
    /// Top-level anchor; each child is aligned in the viewport on its own.
    Root,
}

/// Leaves draw content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LeafKind {
    /// Absorbs leftover stack space.
    Filler,
    /// Zero-sized spacer.
    Space,
    /// Textured image.
    Image,
    /// Static text.
    Label,
    /// Text that can take focus.
    Button,
    /// Integer counter drawn with digit glyphs.
    Count,
    /// Centisecond clock drawn with digit glyphs.
    Clock,
}

/// What a widget is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WidgetKind {
    /// A container.
    Container(ContainerKind),
    /// A leaf.
    Leaf(LeafKind),
}

impl WidgetKind {
    /// Short name used in debug dumps.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Container(ContainerKind::Harray) => "harray",
            Self::Container(ContainerKind::Varray) => "varray",
            Self::Container(ContainerKind::Hstack) => "hstack",
            Self::Container(ContainerKind::Vstack) => "vstack",
            Self::Container(ContainerKind::Root) => "root",
            Self::Leaf(LeafKind::Filler) => "filler",
            Self::Leaf(LeafKind::Space) => "space",
            Self::Leaf(LeafKind::Image) => "image",
            Self::Leaf(LeafKind::Label) => "label",
            Self::Leaf(LeafKind::Button) => "button",
            Self::Leaf(LeafKind::Count) => "count",
            Self::Leaf(LeafKind::Clock) => "clock",
        }
    }

    /// Returns true for containers, including the root.
    #[inline]
    #[must_use]
    pub const fn is_container(self) -> bool {
        matches!(self, Self::Container(_))
    }

    /// Returns true for the root container.
    #[inline]
    #[must_use]
    pub const fn is_root(self) -> bool {
        matches!(self, Self::Container(ContainerKind::Root))
    }

    /// Returns true for fillers.
    #[inline]
    #[must_use]
    pub const fn is_filler(self) -> bool {
        matches!(self, Self::Leaf(LeafKind::Filler))
    }
}

/// Widget flags (bitfield).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WidgetFlags(u32);

impl WidgetFlags {
    /// Widget can take focus and be activated.
    pub const STATE: u32 = 1 << 0;
    /// Widget grows into leftover stack space.
    pub const FILL: u32 = 1 << 1;
    /// Widget is highlighted.
    pub const HILITE: u32 = 1 << 2;
    /// Widget draws its own background.
    pub const RECT: u32 = 1 << 3;
    /// Widget is a layout root and remembers its alignment.
    pub const LAYOUT: u32 = 1 << 4;
    /// Widget clips its subtree.
    pub const CLIP: u32 = 1 << 5;

    /// Creates empty flags.
    #[must_use]
    pub const fn new() -> Self {
        Self(0)
    }

    /// Creates flags from raw bits.
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Returns the raw bits.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Returns true if the flag is set.
    #[inline]
    #[must_use]
    pub const fn has(self, flag: u32) -> bool {
        (self.0 & flag) != 0
    }

    /// Sets a flag.
    #[inline]
    pub fn set(&mut self, flag: u32) {
        self.0 |= flag;
    }

    /// Clears a flag.
    #[inline]
    pub fn clear(&mut self, flag: u32) {
        self.0 &= !flag;
    }

    /// Sets or clears a flag.
    #[inline]
    pub fn assign(&mut self, flag: u32, on: bool) {
        if on {
            self.set(flag);
        } else {
            self.clear(flag);
        }
    }

    /// Toggles a flag.
    #[inline]
    pub fn toggle(&mut self, flag: u32) {
        self.0 ^= flag;
    }
}

/// One widget slot.
///
/// Tree links are ids into the same arena; only the arena edits them.
#[derive(Debug, Clone)]
pub struct Widget {
    /// Widget variant.
    pub kind: WidgetKind,
    pub(crate) parent: WidgetId,
    pub(crate) first_child: WidgetId,
    pub(crate) next_sibling: WidgetId,

    /// Allocated rectangle, valid after layout.
    pub rect: Rect,
    /// Size from the last measure pass.
    pub natural: Size,
    /// Behavior and draw flags.
    pub flags: WidgetFlags,
    /// Hidden widgets are skipped by paint and hit testing.
    pub hidden: bool,

    /// Opaque action code returned on activation.
    pub token: i32,
    /// Current value (button argument, count, clock centiseconds).
    pub value: i32,
    /// Value at construction, used for sizing counters.
    pub init_value: i32,
    /// Full, untruncated text.
    pub text: Option<String>,
    /// Text at construction, re-measured on resize.
    pub init_text: Option<String>,

    /// Index into the font table.
    pub font: usize,
    /// Font size class.
    pub size: FontSize,
    /// Truncation applied when text is wider than the widget.
    pub trunc: Truncation,
    /// Content size: text pixels, or per-mille image fractions for images.
    pub content: Size,
    /// Backend texture holding rendered text or an image.
    pub texture: Option<TextureId>,

    /// Which background borders are inset.
    pub sides: Sides,
    /// Top and bottom gradient colors.
    pub colors: [Color; 2],
    /// Alignment remembered by [`WidgetFlags::LAYOUT`].
    pub layout_align: (i32, i32),

    /// Slide animation, when one was installed.
    pub slide: Option<Slide>,
    /// Opacity set by the application.
    pub alpha: f32,
    /// Opacity driven by fading slides.
    pub alpha_slide: f32,
    /// Current pulse scale (1.0 at rest).
    pub pulse_scale: f32,
    /// Screen-level sweep used while fading a whole screen.
    pub sweep: Sweep,
}

impl Widget {
    /// Creates a widget with default content.
    #[must_use]
    pub fn new(kind: WidgetKind) -> Self {
        Self {
            kind,
            parent: WidgetId::NULL,
            first_child: WidgetId::NULL,
            next_sibling: WidgetId::NULL,
            rect: Rect::ZERO,
            natural: Size::ZERO,
            flags: WidgetFlags::new(),
            hidden: false,
            token: 0,
            value: 0,
            init_value: 0,
            text: None,
            init_text: None,
            font: 0,
            size: FontSize::Small,
            trunc: Truncation::None,
            content: Size::ZERO,
            texture: None,
            sides: Sides::ALL,
            colors: [Color::WHITE, Color::WHITE],
            layout_align: (0, 0),
            slide: None,
            alpha: 1.0,
            alpha_slide: 0.0,
            pulse_scale: 1.0,
            sweep: Sweep::NONE,
        }
    }

    /// Parent id, NULL for top-level widgets.
    #[inline]
    #[must_use]
    pub const fn parent(&self) -> WidgetId {
        self.parent
    }

    /// Returns true if the widget can currently take focus.
    #[inline]
    #[must_use]
    pub const fn is_hot(&self) -> bool {
        self.flags.has(WidgetFlags::STATE) && !self.hidden
    }

    /// Current slide offset, zero when not animating.
    #[inline]
    #[must_use]
    pub fn offset(&self) -> (f32, f32) {
        self.slide.as_ref().map_or((0.0, 0.0), |s| s.offset)
    }

    /// Combined opacity used for culling and tinting.
    #[inline]
    #[must_use]
    pub fn opacity(&self) -> f32 {
        self.alpha * self.alpha_slide
    }

    /// Rectangle shifted by the rounded slide offset.
    #[must_use]
    pub fn shifted_rect(&self) -> Rect {
        let (dx, dy) = self.offset();
        self.rect.translate(dx.round() as i32, dy.round() as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_id() {
        assert!(WidgetId::NULL.is_null());
        assert!(!WidgetId::new(3).is_null());
        assert_eq!(WidgetId::new(3).index(), 3);
        assert_eq!(WidgetId::new(7).to_string(), "#7");
    }

    #[test]
    fn test_flags() {
        let mut flags = WidgetFlags::new();
        flags.set(WidgetFlags::STATE | WidgetFlags::RECT);
        assert!(flags.has(WidgetFlags::STATE));
        flags.toggle(WidgetFlags::HILITE);
        assert!(flags.has(WidgetFlags::HILITE));
        flags.assign(WidgetFlags::HILITE, false);
        assert!(!flags.has(WidgetFlags::HILITE));
        flags.clear(WidgetFlags::RECT);
        assert_eq!(flags.bits(), WidgetFlags::STATE);
    }

    #[test]
    fn test_hot_requires_visible() {
        let mut w = Widget::new(WidgetKind::Leaf(LeafKind::Button));
        w.flags.set(WidgetFlags::STATE);
        assert!(w.is_hot());
        w.hidden = true;
        assert!(!w.is_hot());
    }

    #[test]
    fn test_defaults() {
        let w = Widget::new(WidgetKind::Container(ContainerKind::Vstack));
        assert_eq!(w.sides, Sides::ALL);
        assert!((w.pulse_scale - 1.0).abs() < f32::EPSILON);
        assert!((w.alpha - 1.0).abs() < f32::EPSILON);
        assert!(w.alpha_slide.abs() < f32::EPSILON);
        assert_eq!(w.offset(), (0.0, 0.0));
    }
}
