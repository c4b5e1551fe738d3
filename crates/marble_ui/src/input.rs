//! Input handling for UI.
//!
//! Pointer and joystick state that survives between frames.

use crate::navigation::Direction;
use crate::widget::WidgetId;

/// Mouse button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Left mouse button.
    Left,
    /// Right mouse button.
    Right,
    /// Middle mouse button (scroll wheel click).
    Middle,
}

/// Joystick or d-pad axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StickAxis {
    /// Left/right.
    Horizontal,
    /// Up/down. Negative values point up.
    Vertical,
}

impl StickAxis {
    /// Maps an axis deflection to a navigation direction.
    ///
    /// Zero maps to `None`.
    #[must_use]
    pub fn direction(self, value: f32) -> Option<Direction> {
        if value == 0.0 || value.is_nan() {
            return None;
        }
        Some(match (self, value < 0.0) {
            (Self::Horizontal, true) => Direction::Left,
            (Self::Horizontal, false) => Direction::Right,
            (Self::Vertical, true) => Direction::Up,
            (Self::Vertical, false) => Direction::Down,
        })
    }
}

/// Pointer state between frames.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PointerState {
    /// Last known X position.
    pub x: i32,
    /// Last known Y position.
    pub y: i32,
    /// Widget under the pointer at the last hit test.
    pub hovered: WidgetId,
    /// Widget under the pointer when the left button went down.
    pub pressed: WidgetId,
}

impl PointerState {
    /// Records a position; negative coordinates mean "reuse the last one".
    ///
    /// # Returns
    ///
    /// The effective position.
    pub fn locate(&mut self, x: i32, y: i32) -> (i32, i32) {
        if x >= 0 && y >= 0 {
            self.x = x;
            self.y = y;
        }
        (self.x, self.y)
    }

    /// Button down: remember what was pressed.
    pub fn press(&mut self) {
        self.pressed = self.hovered;
    }

    /// Button up.
    ///
    /// # Returns
    ///
    /// The widget to activate: the pressed widget if the pointer is still on it.
    pub fn release(&mut self) -> WidgetId {
        let pressed = std::mem::take(&mut self.pressed);
        if !pressed.is_null() && pressed == self.hovered {
            pressed
        } else {
            WidgetId::NULL
        }
    }

    /// Forgets every reference to widgets for which `gone` holds.
    pub fn forget(&mut self, gone: impl Fn(WidgetId) -> bool) {
        if gone(self.hovered) {
            self.hovered = WidgetId::NULL;
        }
        if gone(self.pressed) {
            self.pressed = WidgetId::NULL;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_direction() {
        assert_eq!(StickAxis::Horizontal.direction(-0.5), Some(Direction::Left));
        assert_eq!(StickAxis::Horizontal.direction(1.0), Some(Direction::Right));
        assert_eq!(StickAxis::Vertical.direction(-1.0), Some(Direction::Up));
        assert_eq!(StickAxis::Vertical.direction(0.3), Some(Direction::Down));
        assert_eq!(StickAxis::Vertical.direction(0.0), None);
    }

    #[test]
    fn test_locate_reuses_cached_position() {
        let mut pointer = PointerState::default();
        assert_eq!(pointer.locate(10, 20), (10, 20));
        assert_eq!(pointer.locate(-1, -1), (10, 20));
    }

    #[test]
    fn test_press_release() {
        let mut pointer = PointerState {
            hovered: WidgetId::new(4),
            ..PointerState::default()
        };
        pointer.press();
        assert_eq!(pointer.release(), WidgetId::new(4));

        pointer.press();
        pointer.hovered = WidgetId::new(5);
        assert_eq!(pointer.release(), WidgetId::NULL);
        assert_eq!(pointer.pressed, WidgetId::NULL);
    }
}
