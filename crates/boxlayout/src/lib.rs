//! Boxlayout - headless docking layout engine
//!
//! This crate arranges rectangular panels in a recursive binary split tree:
//! - Containers split their area in two along one axis
//! - Tab groups stack panels behind a tab bar
//! - One document area hosts the main content in its own split tree of
//!   document groups and is never removed
//! - Panels are re-docked by dragging them onto tabs or group edges
//! - Arrangements are saved to and restored from JSON
//!
//! Drawing is left to the host through the [`Render`] factories in
//! [`LayoutConfig`]. Without them the layout runs headless and only computes
//! geometry.
//!
//! ## Quick Start
//!
//! ```rust
//! use boxlayout::{BoxLayout, LayoutConfig, TabPanel, shared};
//! use boxlayout_core::geometry::Rectangle;
//!
//! struct Outline;
//!
//! impl TabPanel for Outline {
//!     fn id(&self) -> &str {
//!         "outline"
//!     }
//!
//!     fn title(&self) -> &str {
//!         "Outline"
//!     }
//! }
//!
//! let mut layout = BoxLayout::new();
//! layout
//!     .init(Rectangle::new(0.0, 0.0, 1280.0, 720.0), LayoutConfig::default())
//!     .unwrap();
//! layout.regist_panel(shared(Outline));
//! layout.open_panel_by_id("outline", false).unwrap();
//!
//! let json = layout.get_layout_config_json().unwrap();
//! layout.apply_layout_config_json(&json).unwrap();
//! assert!(layout.check_panel_opened_by_id("outline"));
//! ```

pub mod config;
pub mod drag;
pub mod drop_zone;
pub mod error;
pub mod event;
pub mod focus;
pub mod layout;
pub mod panel;
pub mod persist;
pub mod render;
pub mod splitter;
pub mod tabs;
pub mod tree;
pub mod types;

pub use config::{DefaultPanelSerialize, LayoutConfig, PanelLookup, PanelSerialize};
pub use drag::{DRAG_THRESHOLD, DropPlacement, DropProposal};
pub use drop_zone::DropZoneDetector;
pub use error::{LayoutError, LayoutResult, TreeError, TreeResult};
pub use event::{LayoutEvent, LayoutEventKind, LayoutRequest, ListenerId};
pub use layout::{BoxLayout, MAX_REQUEST_ROUNDS};
pub use panel::{PanelId, SharedPanel, TabPanel, shared};
pub use persist::{DocumentSnapshot, GroupSnapshot, LAYOUT_VERSION, LayoutSnapshot, NodeSnapshot};
pub use render::{
    HeadlessRender, HeadlessRenderFactory, Render, RenderFactory, TitleRender, TitleRenderFactory,
};
pub use tabs::{TabGroup, TabMenuAction};
pub use tree::{DocumentArea, ElementKind, ElementNode, LayoutTree};
pub use types::{DropZone, ElementId, GroupKind, Position, TabSide};

// Re-export the geometry types used throughout the API
pub use boxlayout_core::geometry::{Point, Rectangle, TransformChain};
