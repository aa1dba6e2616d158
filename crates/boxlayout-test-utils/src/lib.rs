//! Test utilities for boxlayout.
//!
//! This crate provides recording stand-ins for the host side of a layout:
//! panels and render factories that log every callback they receive.
//!
//! # Overview
//!
//! - `MockPanel` - [`boxlayout::TabPanel`] recording mount, bounds and focus calls
//! - `MockRenderFactory` - render factories recording what the engine draws
//! - [`mock_layout`] - an initialized layout wired to a `MockRenderFactory`
//!
//! # Example
//!
//! ```rust
//! # #[cfg(feature = "mock")]
//! # {
//! use boxlayout_test_utils::{MockPanel, RenderKind, mock_layout};
//!
//! let (mut layout, renders) = mock_layout(800.0, 600.0);
//! let outline = MockPanel::new("outline");
//! let probe = outline.probe();
//! layout.regist_panel(outline.into_shared());
//!
//! layout.open_panel_by_id("outline", false).unwrap();
//! assert!(probe.is_mounted());
//! assert_eq!(renders.live_count(RenderKind::Title), 1);
//! # }
//! ```
//!
//! # Interior Mutability
//!
//! The engine owns the boxed renders and panels, so the mocks share their
//! call log with the test through `Arc<Mutex<..>>` handles.

#[cfg(feature = "mock")]
pub mod mock_panel;
#[cfg(feature = "mock")]
pub mod mock_render;

#[cfg(feature = "mock")]
pub use mock_panel::*;
#[cfg(feature = "mock")]
pub use mock_render::*;

#[cfg(feature = "mock")]
use std::rc::Rc;

#[cfg(feature = "mock")]
use boxlayout::{BoxLayout, LayoutConfig};
#[cfg(feature = "mock")]
use boxlayout_core::geometry::Rectangle;

/// Layout config whose render factories all record into `renders`.
#[cfg(feature = "mock")]
pub fn mock_config(renders: &Rc<MockRenderFactory>) -> LayoutConfig {
    LayoutConfig::new()
        .with_render_factory(renders.clone())
        .with_title_render_factory(renders.clone())
}

/// An initialized layout of the given size at the origin.
///
/// Also installs the test log subscriber, so `RUST_LOG=boxlayout=trace`
/// shows the engine's decisions for a failing test.
#[cfg(feature = "mock")]
pub fn mock_layout(width: f32, height: f32) -> (BoxLayout, Rc<MockRenderFactory>) {
    boxlayout_core::logging::try_init();
    let renders = Rc::new(MockRenderFactory::new());
    let mut layout = BoxLayout::new();
    if let Err(e) = layout.init(
        Rectangle::new(0.0, 0.0, width, height),
        mock_config(&renders),
    ) {
        panic!("mock layout init failed: {e}");
    }
    (layout, renders)
}
