//! # Memory Management
//!
//! Pre-allocated slot tables for structures that are rebuilt often but must
//! never allocate while a frame is running.
//!
//! ## Design Philosophy
//!
//! All memory is allocated once at startup. During a frame:
//! - No heap allocations for storage
//! - Slot indices are stable for the lifetime of the stored value
//! - Freed slots are reused lowest-first

mod pool;

pub use pool::{SlotPool, NULL_SLOT};
