//! Widget system.
//!
//! Every widget lives in one fixed-size [`WidgetArena`]; the tree is expressed
//! through ids, never through pointers.

mod arena;
mod core;

pub use arena::{Children, WidgetArena, CAPACITY};
pub use core::{ContainerKind, LeafKind, Widget, WidgetFlags, WidgetId, WidgetKind};
