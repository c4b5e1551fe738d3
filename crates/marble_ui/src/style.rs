//! Styling: palette, font size classes, background sides and the theme.
//!
//! Colors are stored as 8-bit RGBA because they go straight into vertex
//! data. Themes supply one background texture per interaction state plus
//! the UV grid used to cut it into nine slices.

use serde::{Deserialize, Serialize};

use crate::backend::TextureId;

/// RGBA color, 8 bits per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    /// Red component.
    pub r: u8,
    /// Green component.
    pub g: u8,
    /// Blue component.
    pub b: u8,
    /// Alpha component.
    pub a: u8,
}

impl Color {
    /// Transparent black.
    pub const TRANSPARENT: Self = Self::rgba(0x00, 0x00, 0x00, 0x00);
    /// White.
    pub const WHITE: Self = Self::rgba(0xFF, 0xFF, 0xFF, 0xFF);
    /// Yellow (default top gradient).
    pub const YELLOW: Self = Self::rgba(0xFF, 0xFF, 0x00, 0xFF);
    /// Cyan.
    pub const CYAN: Self = Self::rgba(0x00, 0xFF, 0xFF, 0xFF);
    /// Twilight.
    pub const TWILIGHT: Self = Self::rgba(0x80, 0x00, 0xFF, 0xFF);
    /// Violet.
    pub const VIOLET: Self = Self::rgba(0xFF, 0x00, 0xFF, 0xFF);
    /// Pink.
    pub const PINK: Self = Self::rgba(0xFF, 0x55, 0xFF, 0xFF);
    /// Red (default bottom gradient).
    pub const RED: Self = Self::rgba(0xFF, 0x00, 0x00, 0xFF);
    /// Green.
    pub const GREEN: Self = Self::rgba(0x00, 0xFF, 0x00, 0xFF);
    /// Blue.
    pub const BLUE: Self = Self::rgba(0x00, 0x00, 0xFF, 0xFF);
    /// Brown.
    pub const BROWN: Self = Self::rgba(0xCB, 0x4A, 0x00, 0xFF);
    /// Black.
    pub const BLACK: Self = Self::rgba(0x00, 0x00, 0x00, 0xFF);
    /// Gray, used for disabled buttons.
    pub const GRAY: Self = Self::rgba(0x55, 0x55, 0x55, 0xFF);
    /// Half-transparent black, used for text drop shadows.
    pub const SHADOW: Self = Self::rgba(0x00, 0x00, 0x00, 0x80);
    /// Translucent white.
    pub const WHITE_TRANSLUCENT: Self = Self::rgba(0xFF, 0xFF, 0xFF, 0x60);

    /// Default gradient for labels, counters and clocks.
    pub const DEFAULT_GRADIENT: [Self; 2] = [Self::YELLOW, Self::RED];

    /// Creates a color from RGBA bytes.
    #[must_use]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Creates an opaque color.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 0xFF)
    }

    /// Creates a color from hex value (0xRRGGBBAA).
    #[must_use]
    pub const fn hex(hex: u32) -> Self {
        Self::rgba(
            ((hex >> 24) & 0xFF) as u8,
            ((hex >> 16) & 0xFF) as u8,
            ((hex >> 8) & 0xFF) as u8,
            (hex & 0xFF) as u8,
        )
    }

    /// Returns a new color with different alpha.
    #[must_use]
    pub const fn with_alpha(self, a: u8) -> Self {
        Self::rgba(self.r, self.g, self.b, a)
    }

    /// White with alpha `255 * opacity`, the per-draw tint.
    #[must_use]
    pub fn tint(opacity: f32) -> Self {
        Self::WHITE.with_alpha((255.0 * opacity.clamp(0.0, 1.0)).round() as u8)
    }

    /// Converts to array format.
    #[must_use]
    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Font size classes.
///
/// Pixel sizes are derived from the viewport: `min(w, h) / divisor`, with the
/// divisors held in [`crate::GuiConfig::font_scales`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FontSize {
    /// Tiny print.
    Tiny,
    /// Extra small.
    ExtraSmall,
    /// Small, the usual button size.
    #[default]
    Small,
    /// Touch-friendly.
    Touch,
    /// Medium headings.
    Medium,
    /// Large titles.
    Large,
}

impl FontSize {
    /// Number of size classes.
    pub const COUNT: usize = 6;

    /// Every size class, smallest first.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Tiny,
        Self::ExtraSmall,
        Self::Small,
        Self::Touch,
        Self::Medium,
        Self::Large,
    ];

    /// Position of this class in [`FontSize::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Bit mask of rectangle sides (N/E/S/W).
///
/// On a background it selects which borders get a fixed-size inset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Sides(pub u8);

impl Sides {
    /// No side.
    pub const NONE: Self = Self(0);
    /// Top.
    pub const N: Self = Self(1);
    /// Right.
    pub const E: Self = Self(2);
    /// Bottom.
    pub const S: Self = Self(4);
    /// Left.
    pub const W: Self = Self(8);
    /// Left column.
    pub const LEFT: Self = Self(Self::N.0 | Self::S.0 | Self::W.0);
    /// Right column.
    pub const RIGHT: Self = Self(Self::N.0 | Self::S.0 | Self::E.0);
    /// Top row.
    pub const TOP: Self = Self(Self::N.0 | Self::E.0 | Self::W.0);
    /// Bottom row.
    pub const BOTTOM: Self = Self(Self::S.0 | Self::E.0 | Self::W.0);
    /// All four sides.
    pub const ALL: Self = Self(0x0F);

    /// Returns true if every side in `other` is set.
    #[inline]
    #[must_use]
    pub const fn has(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for Sides {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Interaction state of a background, used to pick a theme texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WidgetState {
    /// Neither focused nor highlighted.
    Normal = 0,
    /// Focused.
    Focused = 1,
    /// Highlighted (toggled on).
    Hilited = 2,
    /// Focused and highlighted.
    Both = 3,
}

impl WidgetState {
    /// Combines an inherited state with a widget's own flags.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 3 {
            0 => Self::Normal,
            1 => Self::Focused,
            2 => Self::Hilited,
            _ => Self::Both,
        }
    }

    /// Raw 2-bit value.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self as u8
    }
}

/// Background theme: per-state textures and the nine-slice UV grid.
///
/// `s` runs left to right, `t` runs top to bottom; index 1 and 2 are the
/// inner cut lines.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    /// One texture per [`WidgetState`].
    pub textures: [Option<TextureId>; 4],
    /// Horizontal texture coordinates of the four grid columns.
    pub s: [f32; 4],
    /// Vertical texture coordinates of the four grid rows.
    pub t: [f32; 4],
}

impl Theme {
    /// A theme with no textures and an even quarter-cut grid.
    pub const BLANK: Self = Self {
        textures: [None; 4],
        s: [0.0, 0.25, 0.75, 1.0],
        t: [0.0, 0.25, 0.75, 1.0],
    };

    /// Texture for the given state.
    #[must_use]
    pub fn texture(&self, state: WidgetState) -> Option<TextureId> {
        self.textures[state.bits() as usize]
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::BLANK
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_hex() {
        let color = Color::hex(0xFF00_00FF);
        assert_eq!(color, Color::RED);
    }

    #[test]
    fn test_tint_rounds_and_clamps() {
        assert_eq!(Color::tint(1.0).a, 255);
        assert_eq!(Color::tint(0.5).a, 128);
        assert_eq!(Color::tint(-3.0).a, 0);
    }

    #[test]
    fn test_state_bits() {
        assert_eq!(WidgetState::from_bits(0b01), WidgetState::Focused);
        assert_eq!(WidgetState::from_bits(0b10 | 0b01), WidgetState::Both);
        assert_eq!(WidgetState::Hilited.bits(), 2);
    }

    #[test]
    fn test_sides() {
        assert!(Sides::ALL.has(Sides::N | Sides::W));
        assert!(!Sides::LEFT.has(Sides::E));
        assert_eq!(Sides::TOP | Sides::BOTTOM, Sides::ALL);
    }
}
