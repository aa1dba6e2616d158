//! Minimal pub/sub used by the layout controller.
//!
//! Listeners are registered per event kind with a priority (higher runs
//! first) and can stop propagation. Listeners never get access to the
//! controller itself: follow-up work is queued on the event as a
//! [`LayoutRequest`] and executed once the mutation that fired the event has
//! finished.

use std::fmt;

use crate::panel::PanelId;
use crate::types::ElementId;

/// An event that can travel through an [`EventDispatcher`].
pub trait Event {
    type Kind: Copy + Eq + fmt::Debug;

    fn kind(&self) -> Self::Kind;

    fn is_propagation_stopped(&self) -> bool;
}

/// Handle returned by [`EventDispatcher::add_listener`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct Listener<E: Event> {
    id: ListenerId,
    kind: E::Kind,
    priority: i32,
    callback: Box<dyn FnMut(&mut E)>,
}

pub struct EventDispatcher<E: Event> {
    listeners: Vec<Listener<E>>,
    next_id: u64,
}

impl<E: Event> Default for EventDispatcher<E> {
    fn default() -> Self {
        Self {
            listeners: Vec::new(),
            next_id: 0,
        }
    }
}

impl<E: Event> fmt::Debug for EventDispatcher<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl<E: Event> EventDispatcher<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener(
        &mut self,
        kind: E::Kind,
        callback: impl FnMut(&mut E) + 'static,
    ) -> ListenerId {
        self.add_listener_with_priority(kind, 0, callback)
    }

    /// Listeners with a higher priority run first; equal priorities run in
    /// registration order.
    pub fn add_listener_with_priority(
        &mut self,
        kind: E::Kind,
        priority: i32,
        callback: impl FnMut(&mut E) + 'static,
    ) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;

        let index = self
            .listeners
            .iter()
            .position(|l| l.priority < priority)
            .unwrap_or(self.listeners.len());
        self.listeners.insert(
            index,
            Listener {
                id,
                kind,
                priority,
                callback: Box::new(callback),
            },
        );
        id
    }

    /// Returns `false` if the listener was already removed.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|l| l.id != id);
        self.listeners.len() != before
    }

    pub fn has_listener(&self, kind: E::Kind) -> bool {
        self.listeners.iter().any(|l| l.kind == kind)
    }

    pub fn clear(&mut self) {
        self.listeners.clear();
    }

    /// Runs every matching listener until one stops propagation.
    ///
    /// Returns `true` if propagation was not stopped.
    pub fn dispatch(&mut self, event: &mut E) -> bool {
        let kind = event.kind();
        for listener in self.listeners.iter_mut().filter(|l| l.kind == kind) {
            (listener.callback)(event);
            if event.is_propagation_stopped() {
                return false;
            }
        }
        true
    }
}

/// Events emitted by [`crate::BoxLayout`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayoutEventKind {
    PanelAdded,
    /// Fired before a panel is closed. Stopping propagation vetoes the close.
    PanelRemoving,
    PanelRemoved,
    /// A panel was re-docked by a drag gesture.
    PanelDrag,
    /// `panel` is the newly focused panel, `None` when focus was cleared.
    FocusChanged,
    ConfigChanged,
    SelectionChanged,
}

/// Follow-up work a listener asks the controller to perform.
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutRequest {
    OpenPanel { id: PanelId, old_space: bool },
    ClosePanel(PanelId),
    FocusPanel(PanelId),
    SetMaxSize(Option<ElementId>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutEvent {
    kind: LayoutEventKind,
    pub panel: Option<PanelId>,
    pub group: Option<ElementId>,
    stopped: bool,
    requests: Vec<LayoutRequest>,
}

impl LayoutEvent {
    pub fn new(kind: LayoutEventKind, panel: Option<PanelId>, group: Option<ElementId>) -> Self {
        Self {
            kind,
            panel,
            group,
            stopped: false,
            requests: Vec::new(),
        }
    }

    pub fn stop_propagation(&mut self) {
        self.stopped = true;
    }

    /// Queue a follow-up operation; it runs after the current mutation.
    pub fn request(&mut self, request: LayoutRequest) {
        self.requests.push(request);
    }

    pub(crate) fn take_requests(&mut self) -> Vec<LayoutRequest> {
        std::mem::take(&mut self.requests)
    }
}

impl Event for LayoutEvent {
    type Kind = LayoutEventKind;

    fn kind(&self) -> LayoutEventKind {
        self.kind
    }

    fn is_propagation_stopped(&self) -> bool {
        self.stopped
    }
}
