//! # MARBLE UI
//!
//! Retained-mode GUI engine for menus, HUDs and dialogs:
//! - One fixed arena of widgets, rebuilt every time a screen is entered
//! - Two-pass layout (measure up, distribute down) on construction and resize
//! - Gamepad navigation by geometry, pointer focus by hit testing
//! - Slides, fades and pulses driven by frame delta time
//! - Geometry rewritten per widget, only when its content changes
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                        GUI PIPELINE                       │
//! ├──────────────────────────────────────────────────────────┤
//! │  Construct → Layout → Timer(dt) → Paint → DrawList        │
//! │      ↓          ↓         ↓          ↓         ↓          │
//! │   Arena     Geometry   Offsets   Transforms  Backend      │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use marble_ui::{Color, FontSize, Gui, GuiConfig, HeadlessBackend, WidgetId};
//!
//! let mut gui = Gui::new(HeadlessBackend::new(800, 600), GuiConfig::default());
//!
//! let menu = gui.vstack(WidgetId::NULL);
//! gui.label(menu, "Main Menu", FontSize::Medium, Color::DEFAULT_GRADIENT);
//! let play = gui.start(menu, "Play", FontSize::Small, 1, 0);
//! gui.layout(menu, 0, 0);
//!
//! gui.timer(menu, 0.016);
//! let frame = gui.paint(menu);
//! assert!(!frame.is_empty());
//! assert_eq!(gui.token(play), 1);
//! ```
//!
//! ## Failure Policy
//!
//! Nothing in the frame loop panics or returns an error. Bad ids and failed
//! allocations are logged through `tracing` and turn into no-ops; failed
//! backend resources render as blank space.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod animation;
pub mod backend;
pub mod config;
pub mod context;
pub mod error;
pub mod input;
pub mod layout;
pub mod navigation;
pub mod render;
pub mod style;
pub mod text;
pub mod widget;

pub use animation::{Easing, ScreenTransform, Slide, SlideFlags, Sweep};
pub use backend::{Bitmap, FontId, GuiBackend, HeadlessBackend, TextureId};
pub use config::GuiConfig;
pub use context::Gui;
pub use error::{GuiError, GuiResult};
pub use input::{MouseButton, PointerState, StickAxis};
pub use layout::{Borders, LayoutEngine, Rect, Size, Viewport};
pub use navigation::Direction;
pub use render::{DirtyRanges, DrawCommand, DrawList, GuiVertex, RenderBatcher, Transform};
pub use style::{Color, FontSize, Sides, Theme, WidgetState};
pub use text::Truncation;
pub use widget::{ContainerKind, LeafKind, Widget, WidgetArena, WidgetFlags, WidgetId, WidgetKind, CAPACITY};
