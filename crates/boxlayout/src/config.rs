//! Layout configuration.

use std::fmt;
use std::rc::Rc;

use crate::drag::DRAG_THRESHOLD;
use crate::drop_zone::DEFAULT_EDGE_BAND;
use crate::panel::{SharedPanel, TabPanel};
use crate::render::{HeadlessRenderFactory, RenderFactory, TitleRenderFactory};
use crate::splitter::{DEFAULT_GAP, DEFAULT_SEPARATOR_SIZE};
use crate::tabs::{DEFAULT_TAB_BAR_HEIGHT, DEFAULT_TAB_ITEM_MAX_WIDTH, DEFAULT_TAB_MENU_WIDTH};

/// Read access to the panels registered with a layout.
pub trait PanelLookup {
    fn registered_panel(&self, id: &str) -> Option<SharedPanel>;
}

/// Converts panels to and from the strings stored in a persisted layout.
pub trait PanelSerialize {
    fn serialize(&self, panel: &dyn TabPanel) -> String;

    /// Returns `None` when the stored entry cannot be turned into a panel;
    /// that entry is then skipped. Panels returned here that are not
    /// registered yet get registered.
    fn unserialize(&self, info: &str, registry: &dyn PanelLookup) -> Option<SharedPanel>;
}

/// Stores the panel id and resolves it against the registry.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultPanelSerialize;

impl PanelSerialize for DefaultPanelSerialize {
    fn serialize(&self, panel: &dyn TabPanel) -> String {
        panel.id().to_owned()
    }

    fn unserialize(&self, info: &str, registry: &dyn PanelLookup) -> Option<SharedPanel> {
        registry.registered_panel(info)
    }
}

/// Configuration for a [`crate::BoxLayout`].
#[derive(Clone)]
pub struct LayoutConfig {
    /// Show the tab menu (close, close all) in tab bars.
    pub use_tab_menu: bool,
    /// Gap between the two children of every container.
    pub gap: f32,
    /// Thickness of the separator hit area.
    pub separator_size: f32,
    pub tab_bar_height: f32,
    pub tab_item_max_width: f32,
    /// Space reserved for the tab menu when `use_tab_menu` is on.
    pub tab_menu_width: f32,
    /// Drop zone edge band as a fraction of the target's shorter side.
    pub edge_band: f32,
    /// Pointer travel in pixels before a drag starts.
    pub drag_threshold: f32,
    pub render_factory: Rc<dyn RenderFactory>,
    pub title_render_factory: Rc<dyn TitleRenderFactory>,
    /// Title factory for the document group.
    pub document_title_render_factory: Rc<dyn TitleRenderFactory>,
    pub panel_serialize: Rc<dyn PanelSerialize>,
    /// Serializer for panels hosted by the document group.
    pub document_panel_serialize: Rc<dyn PanelSerialize>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            use_tab_menu: false,
            gap: DEFAULT_GAP,
            separator_size: DEFAULT_SEPARATOR_SIZE,
            tab_bar_height: DEFAULT_TAB_BAR_HEIGHT,
            tab_item_max_width: DEFAULT_TAB_ITEM_MAX_WIDTH,
            tab_menu_width: DEFAULT_TAB_MENU_WIDTH,
            edge_band: DEFAULT_EDGE_BAND,
            drag_threshold: DRAG_THRESHOLD,
            render_factory: Rc::new(HeadlessRenderFactory),
            title_render_factory: Rc::new(HeadlessRenderFactory),
            document_title_render_factory: Rc::new(HeadlessRenderFactory),
            panel_serialize: Rc::new(DefaultPanelSerialize),
            document_panel_serialize: Rc::new(DefaultPanelSerialize),
        }
    }
}

impl fmt::Debug for LayoutConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayoutConfig")
            .field("use_tab_menu", &self.use_tab_menu)
            .field("gap", &self.gap)
            .field("separator_size", &self.separator_size)
            .field("tab_bar_height", &self.tab_bar_height)
            .field("tab_item_max_width", &self.tab_item_max_width)
            .field("tab_menu_width", &self.tab_menu_width)
            .field("edge_band", &self.edge_band)
            .field("drag_threshold", &self.drag_threshold)
            .finish_non_exhaustive()
    }
}

impl LayoutConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tab_menu(mut self, enabled: bool) -> Self {
        self.use_tab_menu = enabled;
        self
    }

    pub fn with_gap(mut self, gap: f32) -> Self {
        self.gap = gap.max(0.0);
        self
    }

    pub fn with_separator_size(mut self, size: f32) -> Self {
        self.separator_size = size.max(0.0);
        self
    }

    pub fn with_tab_bar_height(mut self, height: f32) -> Self {
        self.tab_bar_height = height.max(0.0);
        self
    }

    pub fn with_edge_band(mut self, band: f32) -> Self {
        self.edge_band = band.clamp(0.05, 0.5);
        self
    }

    pub fn with_drag_threshold(mut self, threshold: f32) -> Self {
        self.drag_threshold = threshold.max(0.0);
        self
    }

    pub fn with_render_factory(mut self, factory: Rc<dyn RenderFactory>) -> Self {
        self.render_factory = factory;
        self
    }

    /// Use `factory` for the titles of every group, document included.
    pub fn with_title_render_factory(mut self, factory: Rc<dyn TitleRenderFactory>) -> Self {
        self.title_render_factory = factory.clone();
        self.document_title_render_factory = factory;
        self
    }

    pub fn with_document_title_render_factory(
        mut self,
        factory: Rc<dyn TitleRenderFactory>,
    ) -> Self {
        self.document_title_render_factory = factory;
        self
    }

    pub fn with_panel_serialize(mut self, serialize: Rc<dyn PanelSerialize>) -> Self {
        self.panel_serialize = serialize;
        self
    }

    pub fn with_document_panel_serialize(mut self, serialize: Rc<dyn PanelSerialize>) -> Self {
        self.document_panel_serialize = serialize;
        self
    }
}
