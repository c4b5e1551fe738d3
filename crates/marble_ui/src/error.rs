//! # GUI Error Types
//!
//! Everything that can go wrong inside the engine. None of these cross the
//! public frame-loop API: the facade logs them and degrades to a no-op.

use thiserror::Error;

use crate::widget::WidgetId;

/// Errors raised by arena and backend operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GuiError {
    /// Every widget slot is occupied.
    #[error("out of widget ids: all {capacity} slots in use")]
    ArenaExhausted {
        /// Size of the widget table.
        capacity: usize,
    },

    /// An id outside `[0, CAPACITY)` was passed in.
    #[error("widget index out of bounds: {id} (capacity {capacity})")]
    IndexOutOfRange {
        /// The offending raw id.
        id: u32,
        /// Size of the widget table.
        capacity: usize,
    },

    /// The id is in range but its slot is free.
    #[error("widget {0} is not allocated")]
    StaleWidget(WidgetId),

    /// Text rasterization, image decoding or theme loading failed.
    #[error("backend resource unavailable: {0}")]
    BackendResource(String),

    /// Invalid configuration file.
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Result type for GUI operations.
pub type GuiResult<T> = Result<T, GuiError>;
