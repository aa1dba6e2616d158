//! Per-layout focus tracking.
//!
//! At most one panel of a layout is focused at a time. Focus changes are
//! queued as [`FocusEvent`]s; the controller drains them to call the panels'
//! `focus_out`/`focus_in` hooks in order and to emit `FocusChanged`.
//!
//! The manager also remembers the last active tab group per [`GroupKind`],
//! which is where panels without a remembered location are opened.

use crate::panel::PanelId;
use crate::types::{ElementId, GroupKind};

/// Focus event indicating a change in focus state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FocusEvent {
    Gained(PanelId),
    Lost(PanelId),
    /// Focus moved from one panel to another
    Changed {
        from: Option<PanelId>,
        to: Option<PanelId>,
    },
}

#[derive(Debug, Default)]
pub struct FocusManager {
    focused: Option<PanelId>,
    active_tool: Option<ElementId>,
    active_document: Option<ElementId>,
    last_active: Option<ElementId>,
    events: Vec<FocusEvent>,
}

impl FocusManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn focused(&self) -> Option<&PanelId> {
        self.focused.as_ref()
    }

    pub fn is_focused(&self, panel: &str) -> bool {
        self.focused.as_ref().is_some_and(|p| p.as_str() == panel)
    }

    /// Focus `panel`, or clear focus with `None`.
    ///
    /// Returns `false` when nothing changed.
    pub fn focus(&mut self, panel: Option<PanelId>) -> bool {
        if self.focused == panel {
            return false;
        }
        let old = std::mem::replace(&mut self.focused, panel.clone());

        if let Some(old_id) = &old {
            self.events.push(FocusEvent::Lost(old_id.clone()));
        }
        if let Some(new_id) = &panel {
            self.events.push(FocusEvent::Gained(new_id.clone()));
        }
        self.events.push(FocusEvent::Changed {
            from: old,
            to: panel,
        });
        true
    }

    /// Clear focus.
    pub fn clear_focus(&mut self) -> bool {
        self.focus(None)
    }

    /// Record `group` as the active group of its kind.
    pub fn activate_group(&mut self, group: ElementId, kind: GroupKind) {
        match kind {
            GroupKind::Tool => self.active_tool = Some(group),
            GroupKind::Document => self.active_document = Some(group),
        }
        self.last_active = Some(group);
    }

    /// Most recently activated group of any kind.
    pub fn active_group(&self) -> Option<ElementId> {
        self.last_active
    }

    pub fn active_group_of(&self, kind: GroupKind) -> Option<ElementId> {
        match kind {
            GroupKind::Tool => self.active_tool,
            GroupKind::Document => self.active_document,
        }
    }

    /// Drop every reference to a group that left the tree.
    pub fn forget_group(&mut self, group: ElementId) {
        for slot in [
            &mut self.active_tool,
            &mut self.active_document,
            &mut self.last_active,
        ] {
            if *slot == Some(group) {
                *slot = None;
            }
        }
    }

    /// Forget groups and focus. The focus change is still reported.
    pub fn reset(&mut self) {
        self.clear_focus();
        self.active_tool = None;
        self.active_document = None;
        self.last_active = None;
    }

    /// Take every queued event, oldest first.
    pub fn pop_events(&mut self) -> Vec<FocusEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn has_events(&self) -> bool {
        !self.events.is_empty()
    }
}
