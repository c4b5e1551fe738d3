//! # Slot Pool
//!
//! Fixed-size slot table with first-fit allocation.

/// Index of the reserved null slot.
///
/// Slot 0 is never handed out, so callers can use it as "no value".
pub const NULL_SLOT: usize = 0;

/// A fixed-capacity table of slots.
///
/// Unlike a free-list pool, allocation always returns the *lowest* free
/// index. Callers that expose slot indices as identifiers (the widget arena)
/// rely on this: freeing a slot and allocating again hands back the same
/// index, and the ordering is reproducible from run to run.
///
/// Allocation is a linear scan, which is fine for the few hundred slots a
/// GUI needs and keeps the table a single flat array.
///
/// # Thread Safety
///
/// This pool is NOT thread-safe. Use one pool per thread or wrap in a mutex.
///
/// # Example
///
/// ```rust
/// use marble_core::SlotPool;
///
/// let mut pool: SlotPool<u32> = SlotPool::new(8);
///
/// let a = pool.allocate(10).unwrap();
/// let b = pool.allocate(20).unwrap();
/// assert_eq!((a, b), (1, 2));
///
/// pool.free(a);
/// assert_eq!(pool.allocate(30), Some(1));
/// ```
pub struct SlotPool<T> {
    /// The storage array. Index 0 is permanently empty.
    storage: Box<[Option<T>]>,
    /// Number of occupied slots.
    allocated_count: usize,
}

impl<T> SlotPool<T> {
    /// Creates a new pool with the specified capacity.
    ///
    /// `capacity` counts the reserved null slot, so a pool of capacity `N`
    /// holds at most `N - 1` values.
    ///
    /// # Panics
    ///
    /// Panics if `capacity < 2`.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 1, "Capacity must leave room past the null slot");

        let storage: Vec<Option<T>> = (0..capacity).map(|_| None).collect();

        Self {
            storage: storage.into_boxed_slice(),
            allocated_count: 0,
        }
    }

    /// Returns the total capacity, including the null slot.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// Returns the number of occupied slots.
    #[inline]
    #[must_use]
    pub const fn allocated_count(&self) -> usize {
        self.allocated_count
    }

    /// Returns the number of free slots.
    #[inline]
    #[must_use]
    pub fn free_count(&self) -> usize {
        self.capacity() - 1 - self.allocated_count
    }

    /// Returns true if `index` addresses a real slot (not null, not past the end).
    #[inline]
    #[must_use]
    pub fn in_range(&self, index: usize) -> bool {
        index != NULL_SLOT && index < self.capacity()
    }

    /// Stores `value` in the lowest free slot.
    ///
    /// # Returns
    ///
    /// The slot index, or None if every slot is occupied. The value is
    /// dropped in that case.
    pub fn allocate(&mut self, value: T) -> Option<usize> {
        let index = self
            .storage
            .iter()
            .skip(1)
            .position(Option::is_none)
            .map(|i| i + 1)?;

        self.storage[index] = Some(value);
        self.allocated_count += 1;

        Some(index)
    }

    /// Frees an occupied slot.
    ///
    /// # Returns
    ///
    /// The freed value, or None if the slot was null, out of range or empty.
    pub fn free(&mut self, index: usize) -> Option<T> {
        if !self.in_range(index) {
            return None;
        }

        let value = self.storage[index].take()?;
        self.allocated_count -= 1;

        Some(value)
    }

    /// Returns true if the slot holds a value.
    #[inline]
    #[must_use]
    pub fn contains(&self, index: usize) -> bool {
        self.get(index).is_some()
    }

    /// Gets a reference to a stored value.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        if index == NULL_SLOT {
            return None;
        }
        self.storage.get(index)?.as_ref()
    }

    /// Gets a mutable reference to a stored value.
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        if index == NULL_SLOT {
            return None;
        }
        self.storage.get_mut(index)?.as_mut()
    }

    /// Empties every slot. Capacity is kept.
    pub fn clear(&mut self) {
        for slot in self.storage.iter_mut() {
            *slot = None;
        }
        self.allocated_count = 0;
    }

    /// Iterates over occupied slots in index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> {
        self.storage
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|v| (index, v)))
    }

    /// Iterates mutably over occupied slots in index order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (usize, &mut T)> {
        self.storage
            .iter_mut()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_mut().map(|v| (index, v)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_allocate_free() {
        let mut pool: SlotPool<u32> = SlotPool::new(10);

        let h1 = pool.allocate(42).unwrap();
        assert_eq!(h1, 1);
        assert_eq!(*pool.get(h1).unwrap(), 42);
        assert_eq!(pool.allocated_count(), 1);

        let freed = pool.free(h1).unwrap();
        assert_eq!(freed, 42);
        assert_eq!(pool.allocated_count(), 0);
    }

    #[test]
    fn test_pool_full() {
        let mut pool: SlotPool<u8> = SlotPool::new(3);

        assert_eq!(pool.allocate(1), Some(1));
        assert_eq!(pool.allocate(2), Some(2));
        assert!(pool.allocate(3).is_none());
        assert_eq!(pool.free_count(), 0);
    }

    #[test]
    fn test_pool_reuses_lowest_index() {
        let mut pool: SlotPool<u32> = SlotPool::new(6);

        for v in 0..5 {
            pool.allocate(v).unwrap();
        }
        pool.free(4);
        pool.free(2);

        assert_eq!(pool.allocate(7), Some(2));
        assert_eq!(pool.allocate(8), Some(4));
    }

    #[test]
    fn test_null_slot_is_never_addressable() {
        let mut pool: SlotPool<u32> = SlotPool::new(4);
        pool.allocate(1).unwrap();

        assert!(pool.get(NULL_SLOT).is_none());
        assert!(pool.free(NULL_SLOT).is_none());
        assert!(!pool.in_range(NULL_SLOT));
        assert!(!pool.in_range(4));
        assert!(pool.in_range(3));
    }

    #[test]
    fn test_iter_is_index_ordered() {
        let mut pool: SlotPool<char> = SlotPool::new(5);
        pool.allocate('a');
        pool.allocate('b');
        pool.allocate('c');
        pool.free(2);

        let seen: Vec<_> = pool.iter().map(|(i, c)| (i, *c)).collect();
        assert_eq!(seen, vec![(1, 'a'), (3, 'c')]);

        pool.clear();
        assert_eq!(pool.iter().count(), 0);
        assert_eq!(pool.allocate('z'), Some(1));
    }
}
