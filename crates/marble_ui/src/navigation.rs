//! Focus navigation: pointer hit testing and directional stick movement.
//!
//! Directional search walks the tree and, per subtree, keeps the candidate
//! nearest to the current widget on the search axis. Horizontal moves insist
//! on vertical overlap; vertical moves take the nearest row and use overlap
//! to break ties, so columns of different widths stay reachable.

use crate::layout::Rect;
use crate::widget::{WidgetArena, WidgetId, CAPACITY};

/// Navigation direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Toward smaller x.
    Left,
    /// Toward larger x.
    Right,
    /// Toward larger y.
    Up,
    /// Toward smaller y.
    Down,
}

impl Direction {
    /// The reverse direction.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
            Self::Up => Self::Down,
            Self::Down => Self::Up,
        }
    }

    const fn is_horizontal(self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }
}

/// Laid-out rectangle; the null widget has an empty one.
fn rect_of(arena: &WidgetArena, id: WidgetId) -> Rect {
    arena.get(id).map_or(Rect::ZERO, |w| w.rect)
}

/// Gap from the bottom of `a` down to the top of `b`.
const fn vert_offset(a: Rect, b: Rect) -> i32 {
    a.y - (b.y + b.h)
}

/// Gap from the left of `a` back to the right of `b`.
const fn horz_offset(a: Rect, b: Rect) -> i32 {
    a.x - (b.x + b.w)
}

/// Length of the vertical intersection; negative when apart.
fn vert_overlap(a: Rect, b: Rect) -> i32 {
    a.h + (b.top() - a.top()).min(0) - (b.y - a.y).max(0)
}

/// Length of the horizontal intersection; negative when apart.
fn horz_overlap(a: Rect, b: Rect) -> i32 {
    a.w + (b.right() - a.right()).min(0) - (b.x - a.x).max(0)
}

/// Finds the widget at `(x, y)` inside `id`.
///
/// Containment uses the rectangle shifted by the current slide offset. A
/// root contains every point. The first hot widget in pre-order wins.
#[must_use]
pub fn search(arena: &WidgetArena, id: WidgetId, x: i32, y: i32) -> WidgetId {
    let Some(w) = arena.get(id) else {
        return WidgetId::NULL;
    };
    if w.hidden {
        return WidgetId::NULL;
    }

    let inside = w.kind.is_root() || w.shifted_rect().contains(x, y);
    if !inside {
        return WidgetId::NULL;
    }
    if w.is_hot() {
        return id;
    }

    arena
        .children(id)
        .map(|child| search(arena, child, x, y))
        .find(|found| !found.is_null())
        .unwrap_or(WidgetId::NULL)
}

/// Nearest hot widget inside `id` in direction `dir` from `from`.
///
/// # Returns
///
/// NULL when nothing lies that way.
#[must_use]
pub fn nearest(arena: &WidgetArena, id: WidgetId, from: WidgetId, dir: Direction) -> WidgetId {
    let Some(w) = arena.get(id) else {
        return WidgetId::NULL;
    };
    if w.is_hot() {
        return id;
    }

    let dd = rect_of(arena, from);
    let mut best = WidgetId::NULL;
    let mut dmin = i32::MAX;
    let mut omin = i32::MIN;

    for child in arena.children(id) {
        let kd = nearest(arena, child, from, dir);
        if kd.is_null() || kd == from {
            continue;
        }
        let k = rect_of(arena, kd);

        let (d, o) = match dir {
            Direction::Left => (horz_offset(dd, k), vert_overlap(dd, k)),
            Direction::Right => (horz_offset(k, dd), vert_overlap(dd, k)),
            Direction::Down => (vert_offset(dd, k), horz_overlap(dd, k)),
            Direction::Up => (vert_offset(k, dd), horz_overlap(dd, k)),
        };
        if d < 0 {
            continue;
        }

        let better = if dir.is_horizontal() {
            o > 0 && (omin <= 0 || d <= dmin)
        } else if omin > 0 {
            d < dmin
        } else if o > 0 {
            d <= dmin
        } else {
            d < dmin || (d == dmin && o > omin)
        };

        if better {
            best = kd;
            dmin = d;
            omin = o;
        }
    }

    best
}

/// Like [`nearest`], but wraps around to the far side when nothing lies
/// in `dir`.
#[must_use]
pub fn wrap(arena: &WidgetArena, root: WidgetId, from: WidgetId, dir: Direction) -> WidgetId {
    let found = nearest(arena, root, from, dir);
    if !found.is_null() {
        return found;
    }

    let back = dir.opposite();
    let mut current = from;
    // Each step moves strictly away, so the walk ends; the bound guards
    // degenerate zero-sized layouts.
    for _ in 0..CAPACITY {
        let next = nearest(arena, root, current, back);
        if next.is_null() {
            break;
        }
        current = next;
    }
    current
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::{ContainerKind, LeafKind, WidgetFlags, WidgetKind};

    fn button(arena: &mut WidgetArena, parent: WidgetId, rect: Rect) -> WidgetId {
        let id = arena
            .allocate(parent, WidgetKind::Leaf(LeafKind::Button))
            .unwrap();
        let w = arena.get_mut(id).unwrap();
        w.flags.set(WidgetFlags::STATE);
        w.rect = rect;
        id
    }

    fn container(arena: &mut WidgetArena, rect: Rect) -> WidgetId {
        let id = arena
            .allocate(WidgetId::NULL, WidgetKind::Container(ContainerKind::Harray))
            .unwrap();
        arena.get_mut(id).unwrap().rect = rect;
        id
    }

    #[test]
    fn test_overlap_helpers() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(5, 5, 10, 10);
        assert_eq!(horz_overlap(a, b), 5);
        assert_eq!(vert_overlap(a, b), 5);
        assert_eq!(horz_overlap(a, Rect::new(20, 0, 5, 5)), -10);
        assert_eq!(horz_offset(Rect::new(30, 0, 5, 5), a), 20);
    }

    #[test]
    fn test_rightward_picks_adjacent() {
        let mut arena = WidgetArena::new();
        let row = container(&mut arena, Rect::new(0, 0, 300, 100));
        let a = button(&mut arena, row, Rect::new(0, 0, 100, 100));
        let b = button(&mut arena, row, Rect::new(100, 0, 100, 100));
        let c = button(&mut arena, row, Rect::new(200, 0, 100, 100));

        assert_eq!(nearest(&arena, row, a, Direction::Right), b);
        assert_eq!(nearest(&arena, row, c, Direction::Left), b);
        assert_eq!(nearest(&arena, row, c, Direction::Right), WidgetId::NULL);
    }

    #[test]
    fn test_wrap_returns_far_end() {
        let mut arena = WidgetArena::new();
        let row = container(&mut arena, Rect::new(0, 0, 300, 100));
        let a = button(&mut arena, row, Rect::new(0, 0, 100, 100));
        button(&mut arena, row, Rect::new(100, 0, 100, 100));
        let c = button(&mut arena, row, Rect::new(200, 0, 100, 100));

        assert_eq!(wrap(&arena, row, c, Direction::Right), a);
        assert_eq!(wrap(&arena, row, a, Direction::Left), c);
    }

    #[test]
    fn test_vertical_takes_nearest_row() {
        let mut arena = WidgetArena::new();
        let col = container(&mut arena, Rect::new(0, 0, 300, 300));
        let top = button(&mut arena, col, Rect::new(0, 200, 100, 100));
        let wide = button(&mut arena, col, Rect::new(0, 0, 300, 50));
        let side = button(&mut arena, col, Rect::new(200, 100, 100, 50));

        // Nearer wins even without overlap.
        assert_eq!(nearest(&arena, col, top, Direction::Down), side);
        assert_eq!(nearest(&arena, col, side, Direction::Down), wide);
        assert_eq!(nearest(&arena, col, wide, Direction::Up), side);
    }

    #[test]
    fn test_search_hits_leaf_not_container() {
        let mut arena = WidgetArena::new();
        let row = container(&mut arena, Rect::new(0, 0, 200, 100));
        let a = button(&mut arena, row, Rect::new(0, 0, 100, 100));
        let b = button(&mut arena, row, Rect::new(100, 0, 100, 100));

        assert_eq!(search(&arena, row, 50, 50), a);
        assert_eq!(search(&arena, row, 150, 50), b);
        assert_eq!(search(&arena, row, 500, 50), WidgetId::NULL);

        arena.get_mut(b).unwrap().hidden = true;
        assert_eq!(search(&arena, row, 150, 50), WidgetId::NULL);
    }

    #[test]
    fn test_search_shared_edge_belongs_to_right_cell() {
        let mut arena = WidgetArena::new();
        let row = container(&mut arena, Rect::new(0, 0, 200, 100));
        // Built right to left so the left cell is searched first.
        let b = button(&mut arena, row, Rect::new(100, 0, 100, 100));
        let a = button(&mut arena, row, Rect::new(0, 0, 100, 100));

        assert_eq!(search(&arena, row, 99, 50), a);
        assert_eq!(search(&arena, row, 100, 50), b);
        assert_eq!(search(&arena, row, 200, 50), WidgetId::NULL);
    }
}
