//! Recording panel.

use std::sync::Arc;

use boxlayout::{SharedPanel, TabPanel, shared};
use boxlayout_core::geometry::Rectangle;
use parking_lot::Mutex;

/// Records a panel callback for verification in tests.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelCall {
    Mount,
    Unmount,
    SetBounds(Rectangle),
    SetVisible(bool),
    FocusIn,
    FocusOut,
}

/// Panel with configurable constraints that logs every callback.
///
/// Hand it to the layout with [`MockPanel::into_shared`] and keep a
/// [`PanelProbe`] to inspect the log afterwards.
#[derive(Debug)]
pub struct MockPanel {
    id: String,
    title: String,
    min_width: f32,
    min_height: f32,
    priority: i32,
    calls: Arc<Mutex<Vec<PanelCall>>>,
}

impl MockPanel {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            title: id.clone(),
            id,
            min_width: 50.0,
            min_height: 50.0,
            priority: 0,
            calls: Arc::default(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_min_size(mut self, width: f32, height: f32) -> Self {
        self.min_width = width;
        self.min_height = height;
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn probe(&self) -> PanelProbe {
        PanelProbe {
            calls: self.calls.clone(),
        }
    }

    pub fn into_shared(self) -> SharedPanel {
        shared(self)
    }

    fn record(&self, call: PanelCall) {
        self.calls.lock().push(call);
    }
}

impl TabPanel for MockPanel {
    fn id(&self) -> &str {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn min_width(&self) -> f32 {
        self.min_width
    }

    fn min_height(&self) -> f32 {
        self.min_height
    }

    fn priority_level(&self) -> i32 {
        self.priority
    }

    fn mount(&mut self) {
        self.record(PanelCall::Mount);
    }

    fn unmount(&mut self) {
        self.record(PanelCall::Unmount);
    }

    fn set_bounds(&mut self, bounds: Rectangle) {
        self.record(PanelCall::SetBounds(bounds));
    }

    fn set_visible(&mut self, visible: bool) {
        self.record(PanelCall::SetVisible(visible));
    }

    fn focus_in(&mut self) {
        self.record(PanelCall::FocusIn);
    }

    fn focus_out(&mut self) {
        self.record(PanelCall::FocusOut);
    }
}

/// Read side of a [`MockPanel`]'s call log.
#[derive(Debug, Clone)]
pub struct PanelProbe {
    calls: Arc<Mutex<Vec<PanelCall>>>,
}

impl PanelProbe {
    /// Get a copy of all recorded calls.
    pub fn calls(&self) -> Vec<PanelCall> {
        self.calls.lock().clone()
    }

    pub fn clear(&self) {
        self.calls.lock().clear();
    }

    pub fn count(&self, call: &PanelCall) -> usize {
        self.calls.lock().iter().filter(|c| *c == call).count()
    }

    pub fn is_mounted(&self) -> bool {
        self.count(&PanelCall::Mount) > self.count(&PanelCall::Unmount)
    }

    /// Last visibility the panel was given; `false` if never told.
    pub fn is_visible(&self) -> bool {
        self.is_mounted()
            && self.calls.lock().iter().rev().find_map(|c| match c {
                PanelCall::SetVisible(v) => Some(*v),
                _ => None,
            }) == Some(true)
    }

    pub fn bounds(&self) -> Option<Rectangle> {
        self.calls.lock().iter().rev().find_map(|c| match c {
            PanelCall::SetBounds(b) => Some(*b),
            _ => None,
        })
    }

    /// Whether the panel currently holds focus according to its callbacks.
    pub fn has_focus(&self) -> bool {
        self.calls.lock().iter().rev().find_map(|c| match c {
            PanelCall::FocusIn => Some(true),
            PanelCall::FocusOut => Some(false),
            _ => None,
        }) == Some(true)
    }
}
