//! # MARBLE Core
//!
//! Fixed-capacity storage shared by the MARBLE GUI engine.
//!
//! ## Architecture Rules
//!
//! 1. **Capacity is fixed at construction** - storage never grows
//! 2. **Slot 0 is reserved** - index 0 is the universal "null" handle
//! 3. **Deterministic reuse** - the lowest free slot is always handed out first
//!
//! ## Example
//!
//! ```rust
//! use marble_core::SlotPool;
//!
//! let mut pool: SlotPool<&str> = SlotPool::new(4);
//! let a = pool.allocate("a").unwrap();
//! assert_eq!(a, 1);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod memory;

pub use memory::{SlotPool, NULL_SLOT};
