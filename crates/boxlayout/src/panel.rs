//! Panels and the per-layout panel registry.
//!
//! Panels are created and owned by the host. The engine only keeps shared
//! handles to them and tracks, per panel, which group hosts it and whether
//! its content is currently mounted.

use std::borrow::Borrow;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use boxlayout_core::alloc::HashMap;
use boxlayout_core::geometry::Rectangle;
use serde::{Deserialize, Serialize};

use crate::config::PanelLookup;
use crate::types::ElementId;

/// Minimum width and height of a panel unless it says otherwise.
pub const DEFAULT_PANEL_MIN_SIZE: f32 = 50.0;

/// Identity of a panel, unique within one layout.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PanelId(String);

impl PanelId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PanelId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for PanelId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Borrow<str> for PanelId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PanelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Content hosted in a tab.
///
/// Every callback has a no-op default so simple panels only implement the
/// identity methods.
pub trait TabPanel {
    fn id(&self) -> &str;

    fn title(&self) -> &str;

    fn icon(&self) -> &str {
        ""
    }

    fn min_width(&self) -> f32 {
        DEFAULT_PANEL_MIN_SIZE
    }

    fn min_height(&self) -> f32 {
        DEFAULT_PANEL_MIN_SIZE
    }

    /// Weight used when sibling regions compete for space.
    fn priority_level(&self) -> i32 {
        0
    }

    /// Attach the panel content to the host surface.
    fn mount(&mut self) {}

    fn unmount(&mut self) {}

    /// Content rectangle below the tab bar, in layout-local pixels.
    fn set_bounds(&mut self, _bounds: Rectangle) {}

    fn set_visible(&mut self, _visible: bool) {}

    fn focus_in(&mut self) {}

    fn focus_out(&mut self) {}
}

pub type SharedPanel = Rc<RefCell<dyn TabPanel>>;

/// Wraps a panel into the shared handle the engine stores.
pub fn shared(panel: impl TabPanel + 'static) -> SharedPanel {
    Rc::new(RefCell::new(panel))
}

/// Engine-side state of one registered panel.
pub(crate) struct PanelSlot {
    pub panel: SharedPanel,
    /// Group currently hosting the panel; `None` while closed.
    pub owner: Option<ElementId>,
    /// Keeps the content mounted while the panel moves between groups.
    pub hold: bool,
    pub mounted: bool,
    pub visible: bool,
}

impl PanelSlot {
    fn new(panel: SharedPanel) -> Self {
        Self {
            panel,
            owner: None,
            hold: false,
            mounted: false,
            visible: false,
        }
    }

    pub fn mount(&mut self) {
        if self.mounted {
            return;
        }
        self.panel.borrow_mut().mount();
        self.mounted = true;
    }

    /// Skipped while held.
    pub fn unmount(&mut self) {
        if self.hold || !self.mounted {
            return;
        }
        self.panel.borrow_mut().unmount();
        self.mounted = false;
        self.visible = false;
    }

    pub fn set_visible(&mut self, visible: bool) {
        if self.visible != visible {
            self.visible = visible;
            self.panel.borrow_mut().set_visible(visible);
        }
    }

    pub fn set_bounds(&mut self, bounds: Rectangle) {
        self.panel.borrow_mut().set_bounds(bounds);
    }
}

/// `registPanel` dictionary of one layout instance.
#[derive(Default)]
pub(crate) struct PanelRegistry {
    slots: HashMap<PanelId, PanelSlot>,
}

impl PanelRegistry {
    /// Inserts or replaces; a replaced panel's slot state carries over and
    /// the old handle is returned.
    pub fn register(&mut self, panel: SharedPanel) -> Option<SharedPanel> {
        let id = PanelId::from(RefCell::borrow(&panel).id());
        match self.slots.get_mut(&id) {
            Some(slot) => Some(std::mem::replace(&mut slot.panel, panel)),
            None => {
                self.slots.insert(id, PanelSlot::new(panel));
                None
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&PanelSlot> {
        self.slots.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut PanelSlot> {
        self.slots.get_mut(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.slots.contains_key(id)
    }

    pub fn is_open(&self, id: &str) -> bool {
        self.slots.get(id).is_some_and(|s| s.owner.is_some())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PanelId, &PanelSlot)> {
        self.slots.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&PanelId, &mut PanelSlot)> {
        self.slots.iter_mut()
    }
}

impl PanelLookup for PanelRegistry {
    fn registered_panel(&self, id: &str) -> Option<SharedPanel> {
        self.slots.get(id).map(|slot| slot.panel.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counting {
        id: &'static str,
        mounts: u32,
        unmounts: u32,
    }

    impl TabPanel for Counting {
        fn id(&self) -> &str {
            self.id
        }

        fn title(&self) -> &str {
            self.id
        }

        fn mount(&mut self) {
            self.mounts += 1;
        }

        fn unmount(&mut self) {
            self.unmounts += 1;
        }
    }

    fn counting(id: &'static str) -> Rc<RefCell<Counting>> {
        Rc::new(RefCell::new(Counting {
            id,
            mounts: 0,
            unmounts: 0,
        }))
    }

    #[test]
    fn test_hold_skips_unmount() {
        let panel = counting("p1");
        let mut registry = PanelRegistry::default();
        registry.register(panel.clone());

        let slot = registry.get_mut("p1").unwrap();
        slot.mount();
        slot.mount();
        slot.hold = true;
        slot.unmount();
        assert!(slot.mounted);
        slot.hold = false;
        slot.unmount();

        assert_eq!(RefCell::borrow(&panel).mounts, 1);
        assert_eq!(RefCell::borrow(&panel).unmounts, 1);
    }

    #[test]
    fn test_register_overwrites() {
        let mut registry = PanelRegistry::default();
        assert!(registry.register(counting("p1")).is_none());
        registry.get_mut("p1").unwrap().owner = Some(ElementId(3));

        let replaced = registry.register(counting("p1"));
        assert!(replaced.is_some());
        assert_eq!(registry.iter().count(), 1);
        assert!(registry.is_open("p1"));
    }

    #[test]
    fn test_panel_id_conversions() {
        let id = PanelId::from("outline");
        assert_eq!(id.as_str(), "outline");
        assert_eq!(id.to_string(), "outline");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"outline\"");
    }
}
