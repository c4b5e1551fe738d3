//! Animation primitives: easing curves, slide descriptors, pulse decay and
//! the screen-level sweep.
//!
//! Slides move a widget between an off-screen offset and its laid-out
//! position without touching layout; paint adds the offset at draw time.

use crate::layout::{Rect, Viewport};
use crate::style::Sides;

/// Easing function type.
///
/// Curves follow the common easings.net family. `ease_in` is used while a
/// widget approaches its resting position, `ease_out` while it leaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    /// Linear interpolation.
    #[default]
    Linear,
    /// Spring that overshoots and settles.
    Elastic,
    /// Slight pull-back before moving.
    Back,
    /// Bounces against the target.
    Bounce,
}

const BACK_C1: f32 = 1.701_58;
const BACK_C3: f32 = BACK_C1 + 1.0;
const ELASTIC_C4: f32 = 2.0 * std::f32::consts::PI / 3.0;

impl Easing {
    /// Accelerating variant. `t` is clamped to `0..=1`.
    #[must_use]
    pub fn ease_in(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);

        match self {
            Self::Linear => t,
            Self::Elastic => {
                if t <= 0.0 {
                    0.0
                } else if t >= 1.0 {
                    1.0
                } else {
                    -(2.0_f32.powf(10.0 * t - 10.0)) * ((t * 10.0 - 10.75) * ELASTIC_C4).sin()
                }
            }
            Self::Back => BACK_C3 * t * t * t - BACK_C1 * t * t,
            Self::Bounce => 1.0 - bounce_out(1.0 - t),
        }
    }

    /// Decelerating variant. `t` is clamped to `0..=1`.
    #[must_use]
    pub fn ease_out(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);

        match self {
            Self::Linear => t,
            Self::Elastic => {
                if t <= 0.0 {
                    0.0
                } else if t >= 1.0 {
                    1.0
                } else {
                    2.0_f32.powf(-10.0 * t) * ((t * 10.0 - 0.75) * ELASTIC_C4).sin() + 1.0
                }
            }
            Self::Back => {
                let u = t - 1.0;
                1.0 + BACK_C3 * u * u * u + BACK_C1 * u * u
            }
            Self::Bounce => bounce_out(t),
        }
    }
}

fn bounce_out(t: f32) -> f32 {
    const N1: f32 = 7.5625;
    const D1: f32 = 2.75;

    if t < 1.0 / D1 {
        N1 * t * t
    } else if t < 2.0 / D1 {
        let t = t - 1.5 / D1;
        N1 * t * t + 0.75
    } else if t < 2.5 / D1 {
        let t = t - 2.25 / D1;
        N1 * t * t + 0.9375
    } else {
        let t = t - 2.625 / D1;
        N1 * t * t + 0.984_375
    }
}

/// Slide behavior bits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SlideFlags(pub u16);

impl SlideFlags {
    /// Enter from / leave toward the top.
    pub const N: Self = Self(1 << 0);
    /// Enter from / leave toward the right.
    pub const E: Self = Self(1 << 1);
    /// Enter from / leave toward the bottom.
    pub const S: Self = Self(1 << 2);
    /// Enter from / leave toward the left.
    pub const W: Self = Self(1 << 3);
    /// Move from rest to the offset instead of the other way round.
    pub const BACKWARD: Self = Self(1 << 4);
    /// Offset is a whole viewport, not just past the edge.
    pub const FLING: Self = Self(1 << 5);
    /// Remove the widget when the slide completes.
    pub const REMOVE: Self = Self(1 << 6);
    /// Elastic easing.
    pub const EASE_ELASTIC: Self = Self(1 << 7);
    /// Back easing.
    pub const EASE_BACK: Self = Self(1 << 8);
    /// Bounce easing.
    pub const EASE_BOUNCE: Self = Self(1 << 9);

    /// No flags: a pure fade-in.
    pub const NONE: Self = Self(0);

    /// Returns true if every bit of `other` is set.
    #[inline]
    #[must_use]
    pub const fn has(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Easing selected by the flags; first match wins.
    #[must_use]
    pub const fn easing(self) -> Easing {
        if self.has(Self::EASE_ELASTIC) {
            Easing::Elastic
        } else if self.has(Self::EASE_BACK) {
            Easing::Back
        } else if self.has(Self::EASE_BOUNCE) {
            Easing::Bounce
        } else {
            Easing::Linear
        }
    }
}

impl std::ops::BitOr for SlideFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Slide animation state of one widget.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slide {
    /// Behavior bits.
    pub flags: SlideFlags,
    /// Seconds before motion starts.
    pub delay: f32,
    /// Seconds of motion.
    pub duration: f32,
    /// Seconds since the slide began.
    pub elapsed: f32,
    /// Offset away from the resting position.
    pub init: (f32, f32),
    /// Offset applied at draw time.
    pub offset: (f32, f32),
}

/// Result of one [`Slide::tick`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlideStep {
    /// Fade opacity for slides without a positional offset.
    pub fade: Option<f32>,
    /// Progress reached 1.
    pub finished: bool,
}

impl Slide {
    /// Creates a slide that has not begun yet.
    #[must_use]
    pub const fn new(flags: SlideFlags, delay: f32, duration: f32) -> Self {
        Self {
            flags,
            delay,
            duration,
            elapsed: 0.0,
            init: (0.0, 0.0),
            offset: (0.0, 0.0),
        }
    }

    /// Computes the initial offset and restarts the clock.
    ///
    /// # Arguments
    ///
    /// * `rect` - Laid-out rectangle of the widget
    /// * `viewport` - Current viewport
    /// * `inherited` - Initial offset of a sliding parent, if any
    pub fn begin(&mut self, rect: Rect, viewport: Viewport, inherited: Option<(f32, f32)>) {
        let f = self.flags;
        let (vw, vh) = (viewport.w as f32, viewport.h as f32);
        let (mut x, mut y) = (0.0, 0.0);

        if f.has(SlideFlags::FLING) {
            if f.has(SlideFlags::W) {
                x = -vw;
            }
            if f.has(SlideFlags::E) {
                x = vw;
            }
            if f.has(SlideFlags::S) {
                y = -vh;
            }
            if f.has(SlideFlags::N) {
                y = vh;
            }
        } else if let Some((px, py)) = inherited {
            if f.has(SlideFlags::W) || f.has(SlideFlags::E) {
                x = px;
            }
            if f.has(SlideFlags::S) || f.has(SlideFlags::N) {
                y = py;
            }
        } else {
            if f.has(SlideFlags::W) {
                x = (-rect.x - rect.w) as f32;
            }
            if f.has(SlideFlags::E) {
                x = (viewport.w - rect.x + 1) as f32;
            }
            if f.has(SlideFlags::S) {
                y = (-rect.y - rect.h - 1) as f32;
            }
            if f.has(SlideFlags::N) {
                y = (viewport.h - rect.y) as f32;
            }
        }

        self.elapsed = 0.0;
        self.init = (x, y);
        self.offset = if f.has(SlideFlags::BACKWARD) {
            (0.0, 0.0)
        } else {
            self.init
        };
    }

    /// Progress in `0..=1`.
    #[must_use]
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            return if self.elapsed >= self.delay { 1.0 } else { 0.0 };
        }
        ((self.elapsed - self.delay) / self.duration).clamp(0.0, 1.0)
    }

    /// Returns true for a fade: no positional offset at all.
    #[must_use]
    pub fn is_fade(&self) -> bool {
        self.init == (0.0, 0.0)
    }

    /// Advances the clock and updates the offset.
    pub fn tick(&mut self, dt: f32) -> SlideStep {
        if self.elapsed < self.delay + self.duration {
            self.elapsed += dt;
        }

        let p = self.progress();
        let finished = p >= 1.0;
        let backward = self.flags.has(SlideFlags::BACKWARD);
        let easing = self.flags.easing();

        let factor = match (backward, finished) {
            (false, true) => 0.0,
            (true, true) => 1.0,
            (false, false) => easing.ease_in(1.0 - p),
            (true, false) => easing.ease_out(p),
        };
        self.offset = (self.init.0 * factor, self.init.1 * factor);

        let fade = self
            .is_fade()
            .then_some(if backward { 1.0 - p } else { p });

        SlideStep { fade, finished }
    }
}

/// One step of pulse decay toward 1.0.
#[inline]
#[must_use]
pub fn decay_pulse(scale: f32, dt: f32, rate: f32) -> f32 {
    // A long frame lands on 1.0 instead of overshooting.
    scale + (1.0 - scale) * (dt * rate).clamp(0.0, 1.0)
}

/// Screen-level transition used while a whole screen fades.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sweep {
    /// Direction the screen moves toward as it fades out.
    pub sides: Sides,
    /// Quadratic instead of linear motion.
    pub curve: bool,
}

/// Translation and rotation about the viewport center.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScreenTransform {
    /// Horizontal shift in pixels.
    pub dx: f32,
    /// Vertical shift in pixels.
    pub dy: f32,
    /// Counter-clockwise rotation in degrees.
    pub rotation: f32,
}

impl ScreenTransform {
    /// No movement.
    pub const IDENTITY: Self = Self {
        dx: 0.0,
        dy: 0.0,
        rotation: 0.0,
    };
}

impl Sweep {
    /// No sweep.
    pub const NONE: Self = Self {
        sides: Sides::NONE,
        curve: false,
    };

    /// Linear sweep toward `sides`.
    #[must_use]
    pub const fn linear(sides: Sides) -> Self {
        Self { sides, curve: false }
    }

    /// Curved sweep toward `sides`.
    #[must_use]
    pub const fn curve(sides: Sides) -> Self {
        Self { sides, curve: true }
    }

    /// Transform for a screen at opacity `alpha`.
    ///
    /// Identity at full opacity. Only one vertical and one horizontal
    /// direction are honored; opposing pairs cancel out.
    #[must_use]
    pub fn transform(self, alpha: f32, viewport: Viewport) -> ScreenTransform {
        let a = alpha - 1.0;
        let third = viewport.h as f32 / 3.0;
        let s = self.sides;

        let north = s.has(Sides::N) && !s.has(Sides::S);
        let south = s.has(Sides::S) && !s.has(Sides::N);
        let east = s.has(Sides::E) && !s.has(Sides::W);
        let west = s.has(Sides::W) && !s.has(Sides::E);

        let (step, spin) = if self.curve {
            (a * a * third, (4.0 * a) * (4.0 * a))
        } else {
            (-a * third, 4.0 * a)
        };

        let dx = if east {
            step
        } else if west {
            -step
        } else {
            0.0
        };
        let dy = if north {
            step
        } else if south {
            -step
        } else {
            0.0
        };
        let rotation = if west {
            spin
        } else if east {
            -spin
        } else {
            0.0
        };

        ScreenTransform { dx, dy, rotation }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Viewport = Viewport::new(800, 600);

    #[test]
    fn test_easing_endpoints() {
        for easing in [Easing::Linear, Easing::Elastic, Easing::Back, Easing::Bounce] {
            assert!(easing.ease_in(0.0).abs() < 1e-5, "{easing:?}");
            assert!((easing.ease_in(1.0) - 1.0).abs() < 1e-5, "{easing:?}");
            assert!(easing.ease_out(0.0).abs() < 1e-5, "{easing:?}");
            assert!((easing.ease_out(1.0) - 1.0).abs() < 1e-5, "{easing:?}");
        }
    }

    #[test]
    fn test_back_overshoots() {
        assert!(Easing::Back.ease_in(0.2) < 0.0);
        assert!(Easing::Back.ease_out(0.8) > 1.0);
    }

    #[test]
    fn test_flags_easing() {
        assert_eq!(SlideFlags::NONE.easing(), Easing::Linear);
        assert_eq!((SlideFlags::W | SlideFlags::EASE_BACK).easing(), Easing::Back);
        assert_eq!(
            (SlideFlags::EASE_ELASTIC | SlideFlags::EASE_BOUNCE).easing(),
            Easing::Elastic
        );
    }

    #[test]
    fn test_begin_offscreen_offsets() {
        let rect = Rect::new(100, 50, 200, 40);

        let mut slide = Slide::new(SlideFlags::W, 0.0, 1.0);
        slide.begin(rect, VIEWPORT, None);
        assert_eq!(slide.init, (-300.0, 0.0));
        assert_eq!(slide.offset, slide.init);

        let mut slide = Slide::new(SlideFlags::E | SlideFlags::N, 0.0, 1.0);
        slide.begin(rect, VIEWPORT, None);
        assert_eq!(slide.init, (701.0, 550.0));

        let mut slide = Slide::new(SlideFlags::S | SlideFlags::BACKWARD, 0.0, 1.0);
        slide.begin(rect, VIEWPORT, None);
        assert_eq!(slide.init, (0.0, -91.0));
        assert_eq!(slide.offset, (0.0, 0.0));
    }

    #[test]
    fn test_begin_fling_and_inherit() {
        let rect = Rect::new(100, 50, 200, 40);

        let mut slide = Slide::new(SlideFlags::FLING | SlideFlags::W | SlideFlags::S, 0.0, 1.0);
        slide.begin(rect, VIEWPORT, None);
        assert_eq!(slide.init, (-800.0, -600.0));

        let mut child = Slide::new(SlideFlags::E, 0.0, 1.0);
        child.begin(rect, VIEWPORT, Some((42.0, 17.0)));
        assert_eq!(child.init, (42.0, 0.0));
    }

    #[test]
    fn test_tick_reaches_rest() {
        let mut slide = Slide::new(SlideFlags::W, 0.25, 0.5);
        slide.begin(Rect::new(0, 0, 100, 100), VIEWPORT, None);

        let step = slide.tick(0.25);
        assert!(!step.finished);
        assert_eq!(slide.offset, (-100.0, 0.0));

        slide.tick(0.25);
        assert!((slide.offset.0 + 50.0).abs() < 1e-4);

        let step = slide.tick(0.25);
        assert!(step.finished);
        assert_eq!(step.fade, None);
        assert_eq!(slide.offset, (0.0, 0.0));
    }

    #[test]
    fn test_fade_slide() {
        let mut slide = Slide::new(SlideFlags::NONE, 0.0, 1.0);
        slide.begin(Rect::new(0, 0, 10, 10), VIEWPORT, None);
        assert!(slide.is_fade());

        let step = slide.tick(0.5);
        assert_eq!(step.fade, Some(0.5));

        let mut out = Slide::new(SlideFlags::BACKWARD, 0.0, 1.0);
        out.begin(Rect::new(0, 0, 10, 10), VIEWPORT, None);
        let step = out.tick(1.0);
        assert_eq!(step.fade, Some(0.0));
        assert!(step.finished);
    }

    #[test]
    fn test_zero_duration_finishes_immediately() {
        let mut slide = Slide::new(SlideFlags::N, 0.0, 0.0);
        slide.begin(Rect::new(0, 0, 10, 10), VIEWPORT, None);
        assert!(slide.tick(0.0).finished);
        assert_eq!(slide.offset, (0.0, 0.0));
    }

    #[test]
    fn test_pulse_decay() {
        let s = decay_pulse(1.5, 0.05, 10.0);
        assert!((s - 1.25).abs() < 1e-6);
        assert!((decay_pulse(1.0, 0.1, 10.0) - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_pulse_decay_long_frame() {
        assert!((decay_pulse(1.5, 0.3, 10.0) - 1.0).abs() < f32::EPSILON);
        assert!((decay_pulse(1.5, 5.0, 10.0) - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_sweep_linear() {
        let t = Sweep::linear(Sides::N).transform(0.0, VIEWPORT);
        assert!((t.dy - 200.0).abs() < 1e-4);
        assert!(t.dx.abs() < f32::EPSILON);
        assert!(t.rotation.abs() < f32::EPSILON);

        let t = Sweep::linear(Sides::W).transform(0.5, VIEWPORT);
        assert!((t.dx + 100.0).abs() < 1e-4);
        assert!((t.rotation + 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_sweep_curve() {
        let t = Sweep::curve(Sides::S | Sides::E).transform(0.5, VIEWPORT);
        assert!((t.dx - 50.0).abs() < 1e-4);
        assert!((t.dy + 50.0).abs() < 1e-4);
        assert!((t.rotation + 4.0).abs() < 1e-4);

        assert_eq!(Sweep::NONE.transform(0.3, VIEWPORT), ScreenTransform::IDENTITY);
        assert_eq!(Sweep::linear(Sides::E).transform(1.0, VIEWPORT).dx, 0.0);
    }
}
