//! Recording render factories.
//!
//! Every render created by a [`MockRenderFactory`] writes its calls into the
//! factory's shared log, tagged with the render's kind and a unique id.

use std::sync::Arc;

use boxlayout::{GroupKind, Render, RenderFactory, TitleRender, TitleRenderFactory};
use boxlayout_core::geometry::Rectangle;
use parking_lot::Mutex;

/// What a mock render stands in for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderKind {
    Separator,
    TabBar,
    DragIndicator,
    Title,
}

/// Records a render call for verification in tests.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCall {
    Create { id: usize, kind: RenderKind },
    Mount { id: usize, kind: RenderKind },
    Unmount { id: usize, kind: RenderKind },
    SetBounds { id: usize, kind: RenderKind, bounds: Rectangle },
    SetVisible { id: usize, kind: RenderKind, visible: bool },
    Update { id: usize, title: String, selected: bool },
}

type CallLog = Arc<Mutex<Vec<RenderCall>>>;

/// A render that only records.
#[derive(Debug)]
pub struct MockRender {
    id: usize,
    kind: RenderKind,
    log: CallLog,
}

impl MockRender {
    pub fn id(&self) -> usize {
        self.id
    }

    pub fn kind(&self) -> RenderKind {
        self.kind
    }

    fn record(&self, call: RenderCall) {
        self.log.lock().push(call);
    }
}

impl Render for MockRender {
    fn mount(&mut self) {
        self.record(RenderCall::Mount {
            id: self.id,
            kind: self.kind,
        });
    }

    fn unmount(&mut self) {
        self.record(RenderCall::Unmount {
            id: self.id,
            kind: self.kind,
        });
    }

    fn set_bounds(&mut self, bounds: Rectangle) {
        self.record(RenderCall::SetBounds {
            id: self.id,
            kind: self.kind,
            bounds,
        });
    }

    fn set_visible(&mut self, visible: bool) {
        self.record(RenderCall::SetVisible {
            id: self.id,
            kind: self.kind,
            visible,
        });
    }
}

impl TitleRender for MockRender {
    fn update(&mut self, title: &str, _icon: &str, selected: bool) {
        self.record(RenderCall::Update {
            id: self.id,
            title: title.to_owned(),
            selected,
        });
    }
}

/// Factory for every render kind, sharing one call log.
///
/// # Example
///
/// ```rust
/// use boxlayout::RenderFactory;
/// use boxlayout_test_utils::{MockRenderFactory, RenderKind};
///
/// let factory = MockRenderFactory::new();
/// let mut separator = factory.create_separator(false);
/// separator.mount();
///
/// assert_eq!(factory.count_created(RenderKind::Separator), 1);
/// assert_eq!(factory.live_count(RenderKind::Separator), 1);
/// ```
#[derive(Debug, Default)]
pub struct MockRenderFactory {
    log: CallLog,
    next_id: Mutex<usize>,
}

impl MockRenderFactory {
    pub fn new() -> Self {
        Self::default()
    }

    fn create(&self, kind: RenderKind) -> MockRender {
        let id = {
            let mut next = self.next_id.lock();
            *next += 1;
            *next
        };
        self.log.lock().push(RenderCall::Create { id, kind });
        MockRender {
            id,
            kind,
            log: self.log.clone(),
        }
    }

    /// Get a copy of all recorded calls (for test assertions).
    pub fn calls(&self) -> Vec<RenderCall> {
        self.log.lock().clone()
    }

    pub fn clear(&self) {
        self.log.lock().clear();
    }

    pub fn count_created(&self, kind: RenderKind) -> usize {
        self.log
            .lock()
            .iter()
            .filter(|c| matches!(c, RenderCall::Create { kind: k, .. } if *k == kind))
            .count()
    }

    /// Mounted minus unmounted renders of `kind`.
    pub fn live_count(&self, kind: RenderKind) -> usize {
        let log = self.log.lock();
        let mounts = log
            .iter()
            .filter(|c| matches!(c, RenderCall::Mount { kind: k, .. } if *k == kind))
            .count();
        let unmounts = log
            .iter()
            .filter(|c| matches!(c, RenderCall::Unmount { kind: k, .. } if *k == kind))
            .count();
        mounts.saturating_sub(unmounts)
    }

    /// Last bounds given to any render of `kind`.
    pub fn last_bounds(&self, kind: RenderKind) -> Option<Rectangle> {
        self.log.lock().iter().rev().find_map(|c| match c {
            RenderCall::SetBounds {
                kind: k, bounds, ..
            } if *k == kind => Some(*bounds),
            _ => None,
        })
    }

    /// Titles of the title renders that were last updated as selected.
    pub fn selected_titles(&self) -> Vec<String> {
        let log = self.log.lock();
        let mut latest: Vec<(usize, String, bool)> = Vec::new();
        for call in log.iter() {
            match call {
                RenderCall::Update {
                    id,
                    title,
                    selected,
                } => match latest.iter_mut().find(|(i, ..)| i == id) {
                    Some(entry) => *entry = (*id, title.clone(), *selected),
                    None => latest.push((*id, title.clone(), *selected)),
                },
                RenderCall::Unmount { id, .. } => latest.retain(|(i, ..)| i != id),
                _ => {}
            }
        }
        latest
            .into_iter()
            .filter(|(_, _, selected)| *selected)
            .map(|(_, title, _)| title)
            .collect()
    }
}

impl RenderFactory for MockRenderFactory {
    fn create_separator(&self, _is_vertical: bool) -> Box<dyn Render> {
        Box::new(self.create(RenderKind::Separator))
    }

    fn create_tab_bar(&self, _kind: GroupKind) -> Box<dyn Render> {
        Box::new(self.create(RenderKind::TabBar))
    }

    fn create_drag_indicator(&self) -> Box<dyn Render> {
        Box::new(self.create(RenderKind::DragIndicator))
    }
}

impl TitleRenderFactory for MockRenderFactory {
    fn create_title_render(&self) -> Box<dyn TitleRender> {
        Box::new(self.create(RenderKind::Title))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_render_records() {
        let factory = MockRenderFactory::new();
        let mut bar = factory.create_tab_bar(GroupKind::Tool);
        bar.mount();
        bar.set_bounds(Rectangle::new(0.0, 0.0, 100.0, 25.0));
        bar.unmount();

        assert_eq!(factory.count_created(RenderKind::TabBar), 1);
        assert_eq!(factory.live_count(RenderKind::TabBar), 0);
        assert_eq!(
            factory.last_bounds(RenderKind::TabBar),
            Some(Rectangle::new(0.0, 0.0, 100.0, 25.0))
        );
        assert_eq!(factory.calls().len(), 4);
    }

    #[test]
    fn test_selected_titles() {
        let factory = MockRenderFactory::new();
        let mut a = factory.create_title_render();
        let mut b = factory.create_title_render();
        a.update("a", "", true);
        b.update("b", "", false);
        a.update("a", "", false);
        b.update("b", "", true);
        assert_eq!(factory.selected_titles(), vec!["b".to_owned()]);

        b.unmount();
        assert!(factory.selected_titles().is_empty());
    }
}
