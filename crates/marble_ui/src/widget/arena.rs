//! Widget arena: fixed slot table plus intrusive child lists.

use marble_core::SlotPool;
use tracing::debug;

use super::{Widget, WidgetId, WidgetKind};
use crate::error::{GuiError, GuiResult};

/// Number of widget slots, including the null slot.
pub const CAPACITY: usize = 512;

/// Owns every widget.
///
/// Children form a singly linked list threaded through `next_sibling`. New
/// children are prepended, so list order is the reverse of construction order.
pub struct WidgetArena {
    pool: SlotPool<Widget>,
}

impl WidgetArena {
    /// Creates an empty arena with [`CAPACITY`] slots.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pool: SlotPool::new(CAPACITY),
        }
    }

    /// Number of live widgets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pool.allocated_count()
    }

    /// Returns true if no widget is allocated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Allocates a widget in the lowest free slot and prepends it to `parent`.
    ///
    /// # Errors
    ///
    /// [`GuiError::ArenaExhausted`] when every slot is taken, or a lookup
    /// error if `parent` is not NULL and not live.
    pub fn allocate(&mut self, parent: WidgetId, kind: WidgetKind) -> GuiResult<WidgetId> {
        if !parent.is_null() {
            self.resolve(parent)?;
        }

        let mut widget = Widget::new(kind);
        widget.parent = parent;

        let index = self.pool.allocate(widget).ok_or(GuiError::ArenaExhausted {
            capacity: CAPACITY,
        })?;
        let id = WidgetId::new(index as u32);

        if let Some(p) = self.pool.get_mut(parent.index()) {
            let head = std::mem::replace(&mut p.first_child, id);
            if let Some(w) = self.pool.get_mut(index) {
                w.next_sibling = head;
            }
        }

        Ok(id)
    }

    /// Checks an id.
    ///
    /// # Returns
    ///
    /// `Ok(None)` for NULL, `Ok(Some(id))` for a live widget.
    ///
    /// # Errors
    ///
    /// [`GuiError::IndexOutOfRange`] past the table, [`GuiError::StaleWidget`]
    /// for a free slot.
    pub fn resolve(&self, id: WidgetId) -> GuiResult<Option<WidgetId>> {
        if id.index() >= CAPACITY {
            return Err(GuiError::IndexOutOfRange {
                id: id.raw(),
                capacity: CAPACITY,
            });
        }
        if id.is_null() {
            return Ok(None);
        }
        if self.pool.contains(id.index()) {
            Ok(Some(id))
        } else {
            Err(GuiError::StaleWidget(id))
        }
    }

    /// Returns true if `id` names a live widget.
    #[inline]
    #[must_use]
    pub fn contains(&self, id: WidgetId) -> bool {
        self.pool.contains(id.index())
    }

    /// Gets a widget.
    #[inline]
    #[must_use]
    pub fn get(&self, id: WidgetId) -> Option<&Widget> {
        self.pool.get(id.index())
    }

    /// Gets a widget mutably.
    #[inline]
    pub fn get_mut(&mut self, id: WidgetId) -> Option<&mut Widget> {
        self.pool.get_mut(id.index())
    }

    /// Kind of a live widget.
    #[inline]
    #[must_use]
    pub fn kind(&self, id: WidgetId) -> Option<WidgetKind> {
        self.get(id).map(|w| w.kind)
    }

    /// Parent of `id`, NULL when top-level or not live.
    #[inline]
    #[must_use]
    pub fn parent(&self, id: WidgetId) -> WidgetId {
        self.get(id).map_or(WidgetId::NULL, |w| w.parent)
    }

    /// Head of `id`'s child list.
    #[inline]
    #[must_use]
    pub fn first_child(&self, id: WidgetId) -> WidgetId {
        self.get(id).map_or(WidgetId::NULL, |w| w.first_child)
    }

    /// Next entry in the parent's child list.
    #[inline]
    #[must_use]
    pub fn next_sibling(&self, id: WidgetId) -> WidgetId {
        self.get(id).map_or(WidgetId::NULL, |w| w.next_sibling)
    }

    /// Iterates children in list order (most recently built first).
    pub fn children(&self, id: WidgetId) -> Children<'_> {
        Children {
            arena: self,
            next: self.first_child(id),
        }
    }

    /// Collects children in list order, for callers that mutate while walking.
    #[must_use]
    pub fn child_ids(&self, id: WidgetId) -> Vec<WidgetId> {
        self.children(id).collect()
    }

    /// Number of children.
    #[must_use]
    pub fn child_count(&self, id: WidgetId) -> usize {
        self.children(id).count()
    }

    /// Child by construction-order index (0 = first built).
    #[must_use]
    pub fn child(&self, id: WidgetId, index: usize) -> WidgetId {
        let count = self.child_count(id);
        if index >= count {
            return WidgetId::NULL;
        }
        self.children(id)
            .nth(count - 1 - index)
            .unwrap_or(WidgetId::NULL)
    }

    /// Unlinks `id` from its parent's child list.
    ///
    /// # Returns
    ///
    /// The former parent, NULL if `id` was top-level.
    pub fn detach(&mut self, id: WidgetId) -> WidgetId {
        let Some(widget) = self.get(id) else {
            return WidgetId::NULL;
        };
        let parent = widget.parent;
        let next = widget.next_sibling;

        if parent.is_null() {
            return WidgetId::NULL;
        }

        if self.first_child(parent) == id {
            if let Some(p) = self.get_mut(parent) {
                p.first_child = next;
            }
        } else {
            let mut prev = self.first_child(parent);
            while !prev.is_null() {
                let after = self.next_sibling(prev);
                if after == id {
                    if let Some(w) = self.get_mut(prev) {
                        w.next_sibling = next;
                    }
                    break;
                }
                prev = after;
            }
        }

        if let Some(w) = self.get_mut(id) {
            w.parent = WidgetId::NULL;
            w.next_sibling = WidgetId::NULL;
        }

        parent
    }

    /// Frees `id` and its whole subtree, children first.
    ///
    /// `released` sees every freed widget so the caller can return its
    /// backend resources. The subtree root is unlinked from its parent first.
    pub fn delete(&mut self, id: WidgetId, released: &mut impl FnMut(WidgetId, Widget)) {
        if !self.contains(id) {
            return;
        }
        self.detach(id);
        self.free_subtree(id, released);
    }

    fn free_subtree(&mut self, id: WidgetId, released: &mut impl FnMut(WidgetId, Widget)) {
        let mut child = self.first_child(id);
        while !child.is_null() {
            let next = self.next_sibling(child);
            self.free_subtree(child, released);
            child = next;
        }
        if let Some(widget) = self.pool.free(id.index()) {
            released(id, widget);
        }
    }

    /// Returns true if `id` is `ancestor` or lies below it.
    #[must_use]
    pub fn is_within(&self, id: WidgetId, ancestor: WidgetId) -> bool {
        let mut cursor = id;
        while !cursor.is_null() {
            if cursor == ancestor {
                return true;
            }
            cursor = self.parent(cursor);
        }
        false
    }

    /// Iterates live widgets in id order.
    pub fn iter(&self) -> impl Iterator<Item = (WidgetId, &Widget)> {
        self.pool.iter().map(|(i, w)| (WidgetId::new(i as u32), w))
    }

    /// Iterates live widgets mutably in id order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (WidgetId, &mut Widget)> {
        self.pool
            .iter_mut()
            .map(|(i, w)| (WidgetId::new(i as u32), w))
    }

    /// Frees every widget.
    pub fn clear(&mut self, released: &mut impl FnMut(WidgetId, Widget)) {
        for index in 1..CAPACITY {
            if let Some(widget) = self.pool.free(index) {
                released(WidgetId::new(index as u32), widget);
            }
        }
    }

    /// Logs the subtree at debug level, one line per widget.
    pub fn dump(&self, id: WidgetId) {
        self.dump_at(id, 0);
    }

    fn dump_at(&self, id: WidgetId, depth: usize) {
        let Some(w) = self.get(id) else {
            return;
        };
        let pad = "  ".repeat(depth);
        debug!(
            "{}{} {} {}x{} at ({}, {}){}{}",
            pad,
            id,
            w.kind.name(),
            w.rect.w,
            w.rect.h,
            w.rect.x,
            w.rect.y,
            if w.is_hot() { " hot" } else { "" },
            w.text.as_deref().map(|t| format!(" \"{t}\"")).unwrap_or_default(),
        );
        for child in self.children(id) {
            self.dump_at(child, depth + 1);
        }
    }
}

impl Default for WidgetArena {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over a child list.
pub struct Children<'a> {
    arena: &'a WidgetArena,
    next: WidgetId,
}

impl Iterator for Children<'_> {
    type Item = WidgetId;

    fn next(&mut self) -> Option<WidgetId> {
        if self.next.is_null() {
            return None;
        }
        let id = self.next;
        self.next = self.arena.next_sibling(id);
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::{ContainerKind, LeafKind};

    const VSTACK: WidgetKind = WidgetKind::Container(ContainerKind::Vstack);
    const LABEL: WidgetKind = WidgetKind::Leaf(LeafKind::Label);

    #[test]
    fn test_children_prepend() {
        let mut arena = WidgetArena::new();
        let root = arena.allocate(WidgetId::NULL, VSTACK).unwrap();
        let a = arena.allocate(root, LABEL).unwrap();
        let b = arena.allocate(root, LABEL).unwrap();
        let c = arena.allocate(root, LABEL).unwrap();

        assert_eq!(arena.child_ids(root), vec![c, b, a]);
        assert_eq!(arena.child(root, 0), a);
        assert_eq!(arena.child(root, 2), c);
        assert_eq!(arena.child(root, 3), WidgetId::NULL);
        assert_eq!(arena.parent(b), root);
    }

    #[test]
    fn test_detach_middle() {
        let mut arena = WidgetArena::new();
        let root = arena.allocate(WidgetId::NULL, VSTACK).unwrap();
        let a = arena.allocate(root, LABEL).unwrap();
        let b = arena.allocate(root, LABEL).unwrap();
        let c = arena.allocate(root, LABEL).unwrap();

        assert_eq!(arena.detach(b), root);
        assert_eq!(arena.child_ids(root), vec![c, a]);
        assert_eq!(arena.parent(b), WidgetId::NULL);
    }

    #[test]
    fn test_delete_subtree_only() {
        let mut arena = WidgetArena::new();
        let root = arena.allocate(WidgetId::NULL, VSTACK).unwrap();
        let keep = arena.allocate(root, LABEL).unwrap();
        let inner = arena.allocate(root, VSTACK).unwrap();
        let leaf = arena.allocate(inner, LABEL).unwrap();

        let mut freed = Vec::new();
        arena.delete(inner, &mut |id, _| freed.push(id));

        assert_eq!(freed, vec![leaf, inner]);
        assert!(arena.contains(keep));
        assert_eq!(arena.child_ids(root), vec![keep]);
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn test_resolve() {
        let mut arena = WidgetArena::new();
        let id = arena.allocate(WidgetId::NULL, LABEL).unwrap();

        assert_eq!(arena.resolve(WidgetId::NULL), Ok(None));
        assert_eq!(arena.resolve(id), Ok(Some(id)));
        assert_eq!(
            arena.resolve(WidgetId::new(9)),
            Err(GuiError::StaleWidget(WidgetId::new(9)))
        );
        assert!(matches!(
            arena.resolve(WidgetId::new(CAPACITY as u32)),
            Err(GuiError::IndexOutOfRange { .. })
        ));
    }

    #[test]
    fn test_exhaustion() {
        let mut arena = WidgetArena::new();
        for _ in 1..CAPACITY {
            arena.allocate(WidgetId::NULL, LABEL).unwrap();
        }
        assert_eq!(
            arena.allocate(WidgetId::NULL, LABEL),
            Err(GuiError::ArenaExhausted { capacity: CAPACITY })
        );
    }

    #[test]
    fn test_is_within() {
        let mut arena = WidgetArena::new();
        let root = arena.allocate(WidgetId::NULL, VSTACK).unwrap();
        let inner = arena.allocate(root, VSTACK).unwrap();
        let leaf = arena.allocate(inner, LABEL).unwrap();
        let other = arena.allocate(WidgetId::NULL, LABEL).unwrap();

        assert!(arena.is_within(leaf, root));
        assert!(arena.is_within(inner, inner));
        assert!(!arena.is_within(other, root));
    }
}
