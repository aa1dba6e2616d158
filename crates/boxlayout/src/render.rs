//! Host-side visuals driven by the engine.
//!
//! The engine never draws. Each visual node (separator, tab bar, tab title,
//! drop indicator) is a [`Render`] handle created through the factories in
//! [`crate::LayoutConfig`]; the engine only mounts, positions, shows and
//! unmounts them. Whether a node can also take part in docking is a separate
//! capability, see [`crate::drag::DragTarget`].

use boxlayout_core::geometry::Rectangle;

use crate::types::GroupKind;

/// A visual node the engine can place on screen.
pub trait Render {
    /// Attach to the host surface.
    fn mount(&mut self) {}

    /// Detach from the host surface.
    fn unmount(&mut self) {}

    /// Layout-local rectangle assigned by the last display update.
    fn set_bounds(&mut self, bounds: Rectangle);

    fn set_visible(&mut self, _visible: bool) {}
}

/// The title item of one tab.
pub trait TitleRender: Render {
    fn update(&mut self, title: &str, icon: &str, selected: bool);
}

/// Creates structural visuals.
pub trait RenderFactory {
    fn create_separator(&self, is_vertical: bool) -> Box<dyn Render>;

    fn create_tab_bar(&self, kind: GroupKind) -> Box<dyn Render>;

    /// The rectangle previewing where a dragged panel will land.
    fn create_drag_indicator(&self) -> Box<dyn Render>;
}

/// Creates tab title items.
pub trait TitleRenderFactory {
    fn create_title_render(&self) -> Box<dyn TitleRender>;
}

/// Render that only remembers what it was told.
///
/// Used when the host does not supply factories (headless layouts, servers
/// computing geometry for a remote UI).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeadlessRender {
    pub bounds: Rectangle,
    pub mounted: bool,
    pub visible: bool,
    pub title: String,
    pub selected: bool,
}

impl Render for HeadlessRender {
    fn mount(&mut self) {
        self.mounted = true;
        self.visible = true;
    }

    fn unmount(&mut self) {
        self.mounted = false;
    }

    fn set_bounds(&mut self, bounds: Rectangle) {
        self.bounds = bounds;
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }
}

impl TitleRender for HeadlessRender {
    fn update(&mut self, title: &str, _icon: &str, selected: bool) {
        title.clone_into(&mut self.title);
        self.selected = selected;
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HeadlessRenderFactory;

impl RenderFactory for HeadlessRenderFactory {
    fn create_separator(&self, _is_vertical: bool) -> Box<dyn Render> {
        Box::new(HeadlessRender::default())
    }

    fn create_tab_bar(&self, _kind: GroupKind) -> Box<dyn Render> {
        Box::new(HeadlessRender::default())
    }

    fn create_drag_indicator(&self) -> Box<dyn Render> {
        Box::new(HeadlessRender::default())
    }
}

impl TitleRenderFactory for HeadlessRenderFactory {
    fn create_title_render(&self) -> Box<dyn TitleRender> {
        Box::new(HeadlessRender::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headless_render_records_state() {
        let mut render = HeadlessRenderFactory.create_title_render();
        render.mount();
        render.set_bounds(Rectangle::new(1.0, 2.0, 3.0, 4.0));
        render.update("Outline", "", true);
        render.unmount();
    }

    #[test]
    fn test_headless_visibility() {
        let mut r = HeadlessRender::default();
        r.mount();
        assert!(r.visible);
        r.set_visible(false);
        assert!(!r.visible && r.mounted);
    }
}
