//! The root controller.
//!
//! [`BoxLayout`] owns one split tree, the panel registry, the focus context
//! and the gesture state of a layout instance. Every mutation enters through
//! its methods, runs to completion, then re-lays out the tree.
//!
//! Event listeners never get access to the controller. Follow-up work they
//! queue with [`LayoutEvent::request`] runs once the outermost mutation has
//! finished, in the order it was queued.

use std::collections::VecDeque;
use std::rc::Rc;

use boxlayout_core::alloc::{HashMap, HashSet};
use boxlayout_core::geometry::{Point, Rectangle, TransformChain};
use boxlayout_core::profiling::{profile_function, profile_scope};

use crate::config::{LayoutConfig, PanelSerialize};
use crate::drag::{DragContext, DragKind, DragManager, DragTarget, DropPlacement, DropProposal};
use crate::drop_zone::DropZoneDetector;
use crate::error::{LayoutError, LayoutResult, TreeResult};
use crate::event::{EventDispatcher, LayoutEvent, LayoutEventKind, LayoutRequest, ListenerId};
use crate::focus::{FocusEvent, FocusManager};
use crate::panel::{PanelId, PanelRegistry, SharedPanel};
use crate::persist::{self, LayoutSnapshot, NodeSnapshot};
use crate::render::{Render, TitleRenderFactory};
use crate::tabs::{TabBarMetrics, TabGroup, TabMenuAction};
use crate::tree::{DisplayMetrics, LayoutTree};
use crate::types::{ElementId, GroupKind, Position, TabSide};

/// Rounds of deferred listener requests run after one mutation.
pub const MAX_REQUEST_ROUNDS: usize = 64;

/// Where a panel was when it was last closed.
#[derive(Debug, Clone, PartialEq)]
struct ClosedLocation {
    path: Vec<Position>,
    index: usize,
    kind: GroupKind,
}

pub struct BoxLayout {
    config: LayoutConfig,
    area: Rectangle,
    transform: TransformChain,
    tree: LayoutTree,
    panels: PanelRegistry,
    focus: FocusManager,
    drag: DragManager,
    detector: DropZoneDetector,
    drag_indicator: Option<Box<dyn Render>>,
    close_cache: HashMap<PanelId, ClosedLocation>,
    events: EventDispatcher<LayoutEvent>,
    initialized: bool,
    mutation_depth: u32,
    pending: VecDeque<LayoutRequest>,
}

impl Default for BoxLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl BoxLayout {
    pub fn new() -> Self {
        Self {
            config: LayoutConfig::default(),
            area: Rectangle::ZERO,
            transform: TransformChain::new(),
            tree: LayoutTree::new(),
            panels: PanelRegistry::default(),
            focus: FocusManager::new(),
            drag: DragManager::default(),
            detector: DropZoneDetector::default(),
            drag_indicator: None,
            close_cache: HashMap::default(),
            events: EventDispatcher::new(),
            initialized: false,
            mutation_depth: 0,
            pending: VecDeque::new(),
        }
    }

    /// Creates the document area, holding one empty document group, as the
    /// root and lays it out in `area`.
    pub fn init(&mut self, area: Rectangle, config: LayoutConfig) -> LayoutResult<()> {
        if self.initialized {
            tracing::warn!("BoxLayout::init called twice, ignoring");
            return Ok(());
        }
        self.apply_settings(config);
        self.area = area;

        let installed = self
            .new_document_area()
            .and_then(|document| self.tree.set_root(document));
        if let Err(e) = installed {
            tracing::error!("Failed to install document element: {}", e);
        }
        self.initialized = true;
        tracing::debug!(%area, "BoxLayout initialized");
        self.refresh();
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn ensure_init(&self) -> LayoutResult<()> {
        if self.initialized {
            Ok(())
        } else {
            Err(LayoutError::NotInitialized)
        }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Replaces the configuration and re-lays out. Emits `ConfigChanged`.
    pub fn update_config(&mut self, config: LayoutConfig) -> LayoutResult<()> {
        self.ensure_init()?;
        self.mutate(|this| {
            this.apply_settings(config);
            this.refresh();
            this.emit(LayoutEventKind::ConfigChanged, None, None);
        });
        Ok(())
    }

    fn apply_settings(&mut self, config: LayoutConfig) {
        self.drag.set_threshold(config.drag_threshold);
        self.detector = DropZoneDetector::new().with_edge_band(config.edge_band);
        self.config = config;
    }

    fn display_metrics(&self) -> DisplayMetrics {
        DisplayMetrics {
            separator_size: self.config.separator_size,
            tab_bar: TabBarMetrics {
                height: self.config.tab_bar_height,
                item_max_width: self.config.tab_item_max_width,
                menu_width: if self.config.use_tab_menu {
                    self.config.tab_menu_width
                } else {
                    0.0
                },
            },
        }
    }

    pub fn area(&self) -> Rectangle {
        self.area
    }

    /// Lays the tree out again for a new area.
    pub fn resize(&mut self, area: Rectangle) -> LayoutResult<()> {
        self.ensure_init()?;
        self.area = area;
        self.refresh();
        Ok(())
    }

    /// Transform from layout-local to global (window) coordinates. Pointer
    /// positions passed to the gesture methods are global.
    pub fn set_area_transform(&mut self, transform: TransformChain) {
        self.transform = transform;
    }

    pub fn area_transform(&self) -> &TransformChain {
        &self.transform
    }

    fn to_local(&self, p: Point) -> Option<Point> {
        self.transform.global_to_local(p)
    }

    // Events

    pub fn add_listener(
        &mut self,
        kind: LayoutEventKind,
        callback: impl FnMut(&mut LayoutEvent) + 'static,
    ) -> ListenerId {
        self.events.add_listener(kind, callback)
    }

    pub fn add_listener_with_priority(
        &mut self,
        kind: LayoutEventKind,
        priority: i32,
        callback: impl FnMut(&mut LayoutEvent) + 'static,
    ) -> ListenerId {
        self.events.add_listener_with_priority(kind, priority, callback)
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.events.remove_listener(id)
    }

    /// Dispatches an event and queues the requests listeners made.
    ///
    /// Returns `false` if a listener stopped propagation.
    fn emit(
        &mut self,
        kind: LayoutEventKind,
        panel: Option<&PanelId>,
        group: Option<ElementId>,
    ) -> bool {
        let mut event = LayoutEvent::new(kind, panel.cloned(), group);
        let proceed = self.events.dispatch(&mut event);
        self.pending.extend(event.take_requests());
        proceed
    }

    /// Runs `f` as one mutation. Requests queued by listeners run after the
    /// outermost mutation returns.
    fn mutate<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        self.mutation_depth += 1;
        let result = f(self);
        self.mutation_depth -= 1;
        if self.mutation_depth == 0 {
            self.flush_requests();
        }
        result
    }

    fn flush_requests(&mut self) {
        let mut rounds = 0;
        while !self.pending.is_empty() {
            if rounds == MAX_REQUEST_ROUNDS {
                tracing::warn!(
                    dropped = self.pending.len(),
                    "Listener requests still pending after {} rounds, dropping them",
                    MAX_REQUEST_ROUNDS
                );
                self.pending.clear();
                break;
            }
            rounds += 1;

            let batch: Vec<LayoutRequest> = self.pending.drain(..).collect();
            tracing::debug!(count = batch.len(), round = rounds, "Running deferred requests");
            self.mutation_depth += 1;
            for request in batch {
                self.run_request(request);
            }
            self.mutation_depth -= 1;
        }
    }

    fn run_request(&mut self, request: LayoutRequest) {
        match request {
            LayoutRequest::OpenPanel { id, old_space } => {
                self.open_panel_inner(id.as_str(), old_space);
            }
            LayoutRequest::ClosePanel(id) => {
                self.close_panel_inner(id.as_str());
            }
            LayoutRequest::FocusPanel(id) => {
                self.focus_panel_inner(Some(id.as_str()));
            }
            LayoutRequest::SetMaxSize(element) => {
                self.set_max_size_inner(element);
            }
        }
    }

    // Panel registry

    /// Registers a panel so it can be opened by id. A panel registered
    /// under an existing id replaces the old one in place.
    pub fn regist_panel(&mut self, panel: SharedPanel) {
        let id = PanelId::from(panel.borrow().id());
        let Some(old) = self.panels.register(panel) else {
            return;
        };
        tracing::warn!(panel = %id, "Panel registered twice, replacing the previous one");

        let Some(slot) = self.panels.get_mut(id.as_str()) else {
            return;
        };
        if slot.mounted {
            old.borrow_mut().unmount();
            slot.mounted = false;
            slot.visible = false;
            slot.mount();
        }
        if slot.owner.is_some() {
            self.refresh_constraints_of_panel(&id);
            self.refresh();
        }
    }

    pub fn get_regist_panel_by_id(&self, id: &str) -> Option<SharedPanel> {
        self.panels.get(id).map(|slot| slot.panel.clone())
    }

    // Open / close

    /// Opens a registered panel. With `old_space` the panel goes back to
    /// where it was last closed, when that place still makes sense.
    ///
    /// Returns whether the panel is open afterwards.
    pub fn open_panel_by_id(&mut self, id: &str, old_space: bool) -> LayoutResult<bool> {
        self.ensure_init()?;
        Ok(self.mutate(|this| this.open_panel_inner(id, old_space)))
    }

    /// Opens a registered panel in the active document group.
    pub fn open_document_by_id(&mut self, id: &str) -> LayoutResult<bool> {
        self.ensure_init()?;
        Ok(self.mutate(|this| {
            if !this.panels.contains(id) {
                tracing::debug!(panel = id, "open_document_by_id: panel not registered");
                return false;
            }
            if this.reveal_open_panel(id) {
                return true;
            }
            let Some(document) = this.document_group() else {
                return false;
            };
            this.open_in(document, id, None)
        }))
    }

    fn open_panel_inner(&mut self, id: &str, old_space: bool) -> bool {
        if !self.panels.contains(id) {
            tracing::debug!(panel = id, "open_panel_by_id: panel not registered");
            return false;
        }
        if self.reveal_open_panel(id) {
            return true;
        }

        let cached = if old_space {
            self.cached_location(id)
        } else {
            None
        };
        let (group, index) = match cached {
            Some(found) => found,
            None => match self.default_tool_group() {
                Some(group) => (group, None),
                None => return false,
            },
        };
        self.open_in(group, id, index)
    }

    /// Selects and focuses an already open panel.
    fn reveal_open_panel(&mut self, id: &str) -> bool {
        let Some(group) = self.panels.get(id).and_then(|slot| slot.owner) else {
            return false;
        };
        self.select_panel_in(group, id);
        self.focus_panel_inner(Some(id));
        self.refresh();
        true
    }

    fn open_in(&mut self, group: ElementId, id: &str, index: Option<usize>) -> bool {
        if !self.attach_panel(group, id, index) {
            return false;
        }
        let panel = PanelId::from(id);
        self.emit(LayoutEventKind::PanelAdded, Some(&panel), Some(group));
        self.focus_panel_inner(Some(id));
        self.refresh();
        true
    }

    /// Resolves the remembered location of a closed panel.
    fn cached_location(&mut self, id: &str) -> Option<(ElementId, Option<usize>)> {
        let location = self.close_cache.get(id)?.clone();
        let kind = location.kind;

        if let Some(element) = self.tree.resolve_path(&location.path) {
            let element = self.enter_area(element);
            if self.tree.group(element).is_some_and(|g| g.kind() == kind) {
                return Some((element, Some(location.index)));
            }
        }

        // the group is gone; dock a new one where it used to be, on the
        // same side of the document area boundary
        let mut parent_path = location.path;
        let direction = parent_path.pop()?;
        let parent = self.tree.resolve_path(&parent_path)?;
        let parent = match kind {
            GroupKind::Tool => self.tree.document_area_of(parent).unwrap_or(parent),
            GroupKind::Document if self.tree.in_document_area(parent) => parent,
            GroupKind::Document => self.enter_area(self.tree.document()?),
        };
        let group = self.new_group(kind);
        match self.dock(parent, group, direction) {
            Ok(_) => Some((group, None)),
            Err(e) => {
                tracing::debug!(panel = id, "Stale close cache entry: {}", e);
                self.discard_detached(group);
                None
            }
        }
    }

    fn default_tool_group(&mut self) -> Option<ElementId> {
        let active = self
            .focus
            .active_group_of(GroupKind::Tool)
            .filter(|g| self.tree.is_attached(*g) && self.tree.group(*g).is_some());
        if let Some(group) = active.or_else(|| self.tree.tool_groups().first().copied()) {
            return Some(group);
        }

        let root = self.tree.root()?;
        let group = self.new_group(GroupKind::Tool);
        match self.dock(root, group, Position::Right) {
            Ok(_) => Some(group),
            Err(e) => {
                tracing::error!("Failed to create a tool group: {}", e);
                self.discard_detached(group);
                None
            }
        }
    }

    /// Closes an open panel. Returns `false` if it was not open or a
    /// `PanelRemoving` listener vetoed the close.
    pub fn close_panel_by_id(&mut self, id: &str) -> LayoutResult<bool> {
        self.ensure_init()?;
        Ok(self.mutate(|this| this.close_panel_inner(id)))
    }

    fn close_panel_inner(&mut self, id: &str) -> bool {
        let Some(group) = self.panels.get(id).and_then(|slot| slot.owner) else {
            tracing::trace!(panel = id, "close_panel_by_id: panel not open");
            return false;
        };
        let panel = PanelId::from(id);
        if !self.emit(LayoutEventKind::PanelRemoving, Some(&panel), Some(group)) {
            tracing::debug!(panel = id, "Close vetoed by listener");
            return false;
        }

        self.remember_location(group, id);

        let selection_changed = self.detach_panel(group, id);
        if let Some(slot) = self.panels.get_mut(id) {
            slot.hold = false;
            slot.unmount();
        }
        self.emit(LayoutEventKind::PanelRemoved, Some(&panel), Some(group));
        if selection_changed {
            let next = self.tree.group(group).and_then(|g| g.selected_panel()).cloned();
            self.emit(LayoutEventKind::SelectionChanged, next.as_ref(), Some(group));
        }

        let mut focus_changed = false;
        if self.focus.is_focused(id) {
            let next = self
                .tree
                .group(group)
                .and_then(|g| g.selected_panel())
                .map(|p| p.as_str().to_owned());
            focus_changed = self.focus_panel_inner(next.as_deref());
        }
        self.prune_group(group);

        // hosts rely on a FocusChanged once the last panel is gone
        let none_open = self.panels.iter().all(|(_, slot)| slot.owner.is_none());
        if none_open && !focus_changed && !self.focus.clear_focus() {
            self.emit(LayoutEventKind::FocusChanged, None, None);
        }
        self.drain_focus_events();
        self.refresh();
        true
    }

    pub fn check_panel_opened_by_id(&self, id: &str) -> bool {
        self.panels.is_open(id)
    }

    // Tabs and focus

    /// Selects tab `index` of `group` and focuses its panel.
    pub fn select_tab(&mut self, group: ElementId, index: usize) -> LayoutResult<bool> {
        self.ensure_init()?;
        Ok(self.mutate(|this| {
            let Some(id) = this
                .tree
                .group(group)
                .and_then(|g| g.panels().get(index))
                .map(|p| p.as_str().to_owned())
            else {
                return false;
            };
            this.select_panel_in(group, &id);
            this.focus_panel_inner(Some(&id));
            this.refresh();
            true
        }))
    }

    /// Focuses an open panel, selecting its tab.
    pub fn focus_panel(&mut self, id: &str) -> LayoutResult<bool> {
        self.ensure_init()?;
        Ok(self.mutate(|this| this.focus_panel_inner(Some(id))))
    }

    pub fn clear_focus(&mut self) -> LayoutResult<()> {
        self.ensure_init()?;
        self.mutate(|this| this.focus_panel_inner(None));
        Ok(())
    }

    fn focus_panel_inner(&mut self, id: Option<&str>) -> bool {
        let target = match id {
            Some(id) => {
                let Some(group) = self.panels.get(id).and_then(|slot| slot.owner) else {
                    return false;
                };
                self.select_panel_in(group, id);
                Some(PanelId::from(id))
            }
            None => None,
        };
        let changed = self.focus.focus(target);
        self.drain_focus_events();
        changed
    }

    fn drain_focus_events(&mut self) {
        for event in self.focus.pop_events() {
            match event {
                FocusEvent::Lost(panel) => {
                    if let Some(slot) = self.panels.get(panel.as_str()) {
                        slot.panel.borrow_mut().focus_out();
                    }
                }
                FocusEvent::Gained(panel) => {
                    if let Some(slot) = self.panels.get(panel.as_str()) {
                        slot.panel.borrow_mut().focus_in();
                    }
                }
                FocusEvent::Changed { to, .. } => {
                    let group = to
                        .as_ref()
                        .and_then(|p| self.panels.get(p.as_str()))
                        .and_then(|slot| slot.owner);
                    self.emit(LayoutEventKind::FocusChanged, to.as_ref(), group);
                }
            }
        }
    }

    fn select_panel_in(&mut self, group: ElementId, id: &str) {
        let Some(tab_group) = self.tree.group_mut(group) else {
            return;
        };
        let kind = tab_group.kind();
        let changed = tab_group
            .index_of(id)
            .is_some_and(|index| tab_group.select(index));
        self.focus.activate_group(group, kind);
        if changed {
            let panel = PanelId::from(id);
            self.emit(LayoutEventKind::SelectionChanged, Some(&panel), Some(group));
        }
    }

    /// Runs a tab menu entry. Does nothing while the tab menu is disabled.
    pub fn tab_menu_action(
        &mut self,
        group: ElementId,
        action: TabMenuAction,
    ) -> LayoutResult<bool> {
        self.ensure_init()?;
        if !self.config.use_tab_menu {
            return Ok(false);
        }
        Ok(self.mutate(|this| {
            let Some(tab_group) = this.tree.group(group) else {
                return false;
            };
            let targets: Vec<String> = match action {
                TabMenuAction::Close => tab_group
                    .selected_panel()
                    .map(|p| vec![p.as_str().to_owned()])
                    .unwrap_or_default(),
                TabMenuAction::CloseAll => tab_group
                    .panels()
                    .iter()
                    .map(|p| p.as_str().to_owned())
                    .collect(),
            };
            let mut closed = false;
            for id in targets {
                closed |= this.close_panel_inner(&id);
            }
            closed
        }))
    }

    // Tree editing

    /// Creates an empty, detached tool group to be docked with
    /// [`Self::add_box_element`].
    pub fn create_tab_group(&mut self) -> LayoutResult<ElementId> {
        self.ensure_init()?;
        Ok(self.new_group(GroupKind::Tool))
    }

    /// Creates an empty, detached document group. It can only be docked
    /// inside the document area.
    pub fn create_document_group(&mut self) -> LayoutResult<ElementId> {
        self.ensure_init()?;
        Ok(self.new_group(GroupKind::Document))
    }

    /// Adds a registered panel to `group` as its last tab. A panel already in
    /// the group is selected; one open elsewhere moves over.
    pub fn add_panel_to_group(&mut self, group: ElementId, id: &str) -> LayoutResult<bool> {
        self.add_panel_to(group, id, None)
    }

    /// Puts a registered panel next to `target`.
    ///
    /// Without a direction the panel joins `target`'s tabs. With one, a new
    /// group holding only the panel is docked on that side of `target`,
    /// which may be any attached element. The new group is a document group
    /// when `target` lies inside the document area. Open panels are moved
    /// without being remounted.
    pub fn add_panel_to(
        &mut self,
        target: ElementId,
        id: &str,
        direction: Option<Position>,
    ) -> LayoutResult<bool> {
        self.ensure_init()?;
        Ok(self.mutate(|this| this.add_panel_to_inner(target, id, direction)))
    }

    fn add_panel_to_inner(
        &mut self,
        target: ElementId,
        id: &str,
        direction: Option<Position>,
    ) -> bool {
        let Some(source) = self.panels.get(id).map(|slot| slot.owner) else {
            tracing::debug!(panel = id, "add_panel_to: panel not registered");
            return false;
        };
        match direction {
            None if source == Some(target) => return self.reveal_open_panel(id),
            None if self.tree.group(target).is_none() => return false,
            Some(_) if !self.tree.is_attached(target) => return false,
            _ => {}
        }

        if let Some(source) = source {
            if let Some(slot) = self.panels.get_mut(id) {
                slot.hold = true;
            }
            self.detach_panel(source, id);
        }
        let placed = match direction {
            None => self.attach_panel(target, id, None),
            Some(position) => {
                let group = self.new_group(self.kind_beside(target));
                self.attach_panel(group, id, None);
                match self.dock(target, group, position) {
                    Ok(_) => true,
                    Err(e) => {
                        tracing::debug!(panel = id, %target, "add_panel_to ignored: {}", e);
                        self.detach_panel(group, id);
                        self.discard_detached(group);
                        false
                    }
                }
            }
        };
        if let Some(slot) = self.panels.get_mut(id) {
            slot.hold = false;
        }

        if !placed {
            match source {
                Some(source) => {
                    self.attach_panel(source, id, None);
                }
                None => {
                    if let Some(slot) = self.panels.get_mut(id) {
                        slot.unmount();
                    }
                }
            }
            self.refresh();
            return false;
        }

        let group = self.panels.get(id).and_then(|slot| slot.owner);
        match source {
            Some(source) => self.prune_group(source),
            None => {
                let panel = PanelId::from(id);
                self.emit(LayoutEventKind::PanelAdded, Some(&panel), group);
            }
        }
        self.focus_panel_inner(Some(id));
        self.refresh();
        true
    }

    /// Sets the size an element requests from its parent container.
    pub fn set_explicit_size(
        &mut self,
        element: ElementId,
        width: Option<f32>,
        height: Option<f32>,
    ) -> LayoutResult<bool> {
        self.ensure_init()?;
        let Some(node) = self.tree.get_mut(element) else {
            return Ok(false);
        };
        node.explicit_width = width.map(|w| w.max(0.0));
        node.explicit_height = height.map(|h| h.max(0.0));
        self.refresh();
        Ok(true)
    }

    /// Docks `element` on the `position` side of `target`.
    ///
    /// Invalid targets (detached, the element itself or one of its
    /// descendants) are ignored.
    pub fn add_box_element(
        &mut self,
        target: ElementId,
        element: ElementId,
        position: Position,
    ) -> LayoutResult<bool> {
        self.ensure_init()?;
        Ok(self.mutate(|this| match this.dock(target, element, position) {
            Ok(_) => {
                this.refresh();
                true
            }
            Err(e) => {
                tracing::debug!(%target, %element, "add_box_element ignored: {}", e);
                false
            }
        }))
    }

    /// Docks `element` relative to the root element.
    pub fn add_box_element_to_root(
        &mut self,
        element: ElementId,
        position: Position,
    ) -> LayoutResult<bool> {
        self.ensure_init()?;
        match self.tree.root() {
            Some(root) => self.add_box_element(root, element, position),
            None => Ok(false),
        }
    }

    /// Removes an element and its subtree, closing the panels it hosted.
    /// The document area, anything containing it and its top element stay.
    ///
    /// Hosted panels go through the same close sequence as
    /// [`Self::close_panel_by_id`]: a `PanelRemoving` listener can veto the
    /// whole removal, and each panel remembers its place for reopening.
    pub fn remove_box_element(&mut self, element: ElementId) -> LayoutResult<bool> {
        self.ensure_init()?;
        Ok(self.mutate(|this| {
            if !this.tree.contains(element) {
                return false;
            }
            if this
                .tree
                .document()
                .is_some_and(|doc| this.tree.is_in_subtree(element, doc))
                || this.tree.is_area_root(element)
            {
                tracing::debug!(%element, "remove_box_element: subtree holds the document area");
                return false;
            }

            let hosted: Vec<(ElementId, PanelId)> = this
                .tree
                .subtree(element)
                .into_iter()
                .filter_map(|id| this.tree.group(id).map(|g| (id, g)))
                .flat_map(|(id, g)| g.panels().iter().map(move |p| (id, p.clone())))
                .collect();
            for (group, panel) in &hosted {
                if !this.emit(LayoutEventKind::PanelRemoving, Some(panel), Some(*group)) {
                    tracing::debug!(%element, panel = %panel, "Removal vetoed by listener");
                    return false;
                }
            }
            for (group, panel) in &hosted {
                this.remember_location(*group, panel.as_str());
            }

            this.tree.set_maximized(None);
            if this.tree.is_attached(element) {
                if let Err(e) = this.tree.detach(element) {
                    tracing::debug!(%element, "remove_box_element ignored: {}", e);
                    return false;
                }
            }
            this.discard_detached(element);
            this.drain_focus_events();
            this.refresh();
            true
        }))
    }

    fn dock(
        &mut self,
        target: ElementId,
        element: ElementId,
        position: Position,
    ) -> TreeResult<ElementId> {
        self.tree.set_maximized(None);
        let separator = self
            .config
            .render_factory
            .create_separator(position.is_vertical());
        self.tree
            .add_box_element(target, element, position, self.config.gap, separator)
    }

    fn new_group(&mut self, kind: GroupKind) -> ElementId {
        let tab_bar = self.config.render_factory.create_tab_bar(kind);
        self.tree.insert_group(TabGroup::new(kind, tab_bar))
    }

    /// A detached document area around one empty document group.
    fn new_document_area(&mut self) -> TreeResult<ElementId> {
        let group = self.new_group(GroupKind::Document);
        self.tree.insert_document_area(group)
    }

    /// Kind of group that can be docked next to `target`.
    fn kind_beside(&self, target: ElementId) -> GroupKind {
        if self.tree.in_document_area(target) {
            GroupKind::Document
        } else {
            GroupKind::Tool
        }
    }

    /// The area's top element when `element` is a document area.
    fn enter_area(&self, element: ElementId) -> ElementId {
        self.tree
            .get(element)
            .and_then(|n| n.document_area())
            .map_or(element, |area| area.root)
    }

    /// Caches where `id` sits so it can be reopened there.
    fn remember_location(&mut self, group: ElementId, id: &str) {
        let Some(tab_group) = self.tree.group(group) else {
            return;
        };
        let (Some(path), Some(index)) = (self.tree.path_of(group), tab_group.index_of(id)) else {
            return;
        };
        let kind = tab_group.kind();
        self.close_cache
            .insert(PanelId::from(id), ClosedLocation { path, index, kind });
    }

    fn title_factory(&self, kind: GroupKind) -> Rc<dyn TitleRenderFactory> {
        match kind {
            GroupKind::Tool => self.config.title_render_factory.clone(),
            GroupKind::Document => self.config.document_title_render_factory.clone(),
        }
    }

    fn serializer(&self, kind: GroupKind) -> Rc<dyn PanelSerialize> {
        match kind {
            GroupKind::Tool => self.config.panel_serialize.clone(),
            GroupKind::Document => self.config.document_panel_serialize.clone(),
        }
    }

    /// Inserts a closed panel into `group` and mounts it. No events.
    fn attach_panel(&mut self, group: ElementId, id: &str, index: Option<usize>) -> bool {
        let Some(kind) = self.tree.group(group).map(|g| g.kind()) else {
            return false;
        };
        if !matches!(self.panels.get(id), Some(slot) if slot.owner.is_none()) {
            return false;
        }

        let mut title = self.title_factory(kind).create_title_render();
        title.mount();
        let Some(tab_group) = self.tree.group_mut(group) else {
            return false;
        };
        let index = index.unwrap_or(tab_group.len());
        tab_group.insert(index, PanelId::from(id), title);

        if let Some(slot) = self.panels.get_mut(id) {
            slot.owner = Some(group);
            slot.mount();
        }
        self.close_cache.remove(id);
        self.focus.activate_group(group, kind);
        self.refresh_constraints(group);
        true
    }

    /// Takes a panel out of its group without touching its mount state.
    /// Returns whether the group's selection changed.
    fn detach_panel(&mut self, group: ElementId, id: &str) -> bool {
        let removed = self.tree.group_mut(group).and_then(|g| g.remove(id));
        if let Some(slot) = self.panels.get_mut(id) {
            slot.owner = None;
        }
        self.refresh_constraints(group);
        match removed {
            Some(mut tab) => {
                tab.title.unmount();
                tab.selection_changed
            }
            None => false,
        }
    }

    /// Removes an emptied group, collapsing its parent. The last group of
    /// the document area stays.
    fn prune_group(&mut self, group: ElementId) {
        let prunable = self.tree.group(group).is_some_and(|g| g.is_empty())
            && !self.tree.is_area_root(group);
        if !prunable {
            return;
        }
        self.tree.set_maximized(None);
        if self.tree.is_attached(group) {
            if let Err(e) = self.tree.detach(group) {
                tracing::debug!(%group, "Could not prune group: {}", e);
                return;
            }
        }
        self.discard_detached(group);
    }

    /// Drops a detached subtree, closing whatever panels it still hosted.
    fn discard_detached(&mut self, element: ElementId) {
        let subtree = self.tree.subtree(element);
        match self.tree.discard(element) {
            Ok(panels) => {
                for id in subtree {
                    self.focus.forget_group(id);
                }
                self.release_panels(panels);
            }
            Err(e) => tracing::debug!(%element, "Could not discard element: {}", e),
        }
    }

    /// Bookkeeping for panels whose group was discarded.
    fn release_panels(&mut self, panels: Vec<PanelId>) {
        for panel in panels {
            if let Some(slot) = self.panels.get_mut(panel.as_str()) {
                slot.owner = None;
                slot.hold = false;
                slot.unmount();
            }
            if self.focus.is_focused(panel.as_str()) {
                self.focus.clear_focus();
            }
            self.emit(LayoutEventKind::PanelRemoved, Some(&panel), None);
        }
        self.drain_focus_events();
    }

    fn refresh_constraints(&mut self, group: ElementId) {
        let Some(tab_group) = self.tree.group_mut(group) else {
            return;
        };
        let mut min_width: f32 = 0.0;
        let mut min_height: f32 = 0.0;
        let mut priority: Option<i32> = None;
        for id in tab_group.panels() {
            if let Some(slot) = self.panels.get(id.as_str()) {
                let panel = slot.panel.borrow();
                min_width = min_width.max(panel.min_width());
                min_height = min_height.max(panel.min_height());
                let level = panel.priority_level();
                priority = Some(priority.map_or(level, |p| p.max(level)));
            }
        }
        tab_group.set_constraints(min_width, min_height, priority.unwrap_or(0));
    }

    fn refresh_constraints_of_panel(&mut self, id: &PanelId) {
        if let Some(group) = self.panels.get(id.as_str()).and_then(|slot| slot.owner) {
            self.refresh_constraints(group);
        }
    }

    // Maximize

    /// Maximizes an element over the whole layout, or restores with `None`.
    pub fn set_max_size(&mut self, element: Option<ElementId>) -> LayoutResult<bool> {
        self.ensure_init()?;
        Ok(self.mutate(|this| this.set_max_size_inner(element)))
    }

    /// Maximizes `element`, or restores it if it already is.
    pub fn toggle_maximize(&mut self, element: ElementId) -> LayoutResult<bool> {
        let target = if self.tree.maximized() == Some(element) {
            None
        } else {
            Some(element)
        };
        self.set_max_size(target)
    }

    fn set_max_size_inner(&mut self, element: Option<ElementId>) -> bool {
        if element.is_some_and(|e| !self.tree.is_attached(e)) {
            return false;
        }
        self.drag.cancel_drag();
        self.hide_drag_indicator();
        let changed = self.tree.set_maximized(element);
        if changed {
            self.refresh();
        }
        changed
    }

    // Panel drag

    /// Starts dragging an open panel. Refused while an element is maximized.
    pub fn begin_panel_drag(&mut self, id: &str, pointer: Point) -> LayoutResult<bool> {
        self.ensure_init()?;
        if self.tree.maximized().is_some() {
            tracing::debug!(panel = id, "Panel drag refused while maximized");
            return Ok(false);
        }
        let Some(group) = self.panels.get(id).and_then(|slot| slot.owner) else {
            return Ok(false);
        };
        let (Some(index), Some(local)) = (
            self.tree.group(group).and_then(|g| g.index_of(id)),
            self.to_local(pointer),
        ) else {
            return Ok(false);
        };
        self.drag
            .start_panel_drag(PanelId::from(id), group, index, local);
        Ok(true)
    }

    /// Moves the dragged panel. Returns the current drop proposal with its
    /// preview in global coordinates, `None` while below the drag threshold
    /// or over no valid target.
    pub fn drag_panel(&mut self, pointer: Point) -> LayoutResult<Option<DropProposal>> {
        self.ensure_init()?;
        profile_function!();
        if !self.drag.is_panel_drag() {
            return Ok(None);
        }
        let Some(local) = self.to_local(pointer) else {
            return Ok(None);
        };
        if !self.drag.update(local) {
            return Ok(None);
        }

        let proposal = self.negotiate(local);
        if let Some(state) = self.drag.drag_state_mut() {
            state.proposal = proposal.clone();
        }
        match &proposal {
            Some(p) => self.show_drag_indicator(p.preview),
            None => self.hide_drag_indicator(),
        }
        Ok(proposal.map(|p| DropProposal {
            preview: self.transform.rect_to_global(&p.preview),
            ..p
        }))
    }

    fn negotiate(&self, local: Point) -> Option<DropProposal> {
        let Some(DragKind::Panel {
            panel,
            source,
            start_index,
        }) = self.drag.drag_state().map(|s| &s.kind)
        else {
            return None;
        };
        let leaf = self.tree.leaf_at(local)?;
        let group = self.tree.group(leaf)?;
        let ctx = DragContext {
            panel,
            source: *source,
            start_index: *start_index,
            detector: &self.detector,
        };
        group.propose_drop(leaf, &ctx, local)
    }

    /// Releases the dragged panel, committing the last proposal.
    /// Returns `true` if the panel moved.
    pub fn end_panel_drag(&mut self) -> LayoutResult<bool> {
        self.ensure_init()?;
        if !self.drag.is_panel_drag() {
            return Ok(false);
        }
        self.hide_drag_indicator();
        let Some(state) = self.drag.end_drag() else {
            return Ok(false);
        };
        let (DragKind::Panel { panel, source, .. }, Some(proposal), true) =
            (state.kind, state.proposal, state.is_active)
        else {
            return Ok(false);
        };
        Ok(self.mutate(|this| this.commit_drop(&panel, source, proposal)))
    }

    /// Abandons the panel drag; nothing changes.
    pub fn cancel_panel_drag(&mut self) {
        if self.drag.is_panel_drag() {
            self.drag.cancel_drag();
            self.hide_drag_indicator();
        }
    }

    fn commit_drop(&mut self, panel: &PanelId, source: ElementId, proposal: DropProposal) -> bool {
        profile_function!();
        let id = panel.as_str();
        if self.panels.get(id).and_then(|slot| slot.owner) != Some(source)
            || !self.tree.is_attached(proposal.target)
        {
            return false;
        }
        self.tree.set_maximized(None);
        if let Some(slot) = self.panels.get_mut(id) {
            slot.hold = true;
        }

        let moved = match proposal.placement {
            DropPlacement::Tab { anchor, side } if proposal.target == source => {
                let selected = self
                    .tree
                    .group(source)
                    .and_then(|g| g.selected_panel())
                    .cloned();
                let moved = self
                    .tree
                    .group_mut(source)
                    .is_some_and(|g| g.move_next_to(id, anchor.as_str(), side));
                // the moved tab becomes the selected one
                if moved && selected.as_ref() != Some(panel) {
                    self.emit(LayoutEventKind::SelectionChanged, Some(panel), Some(source));
                }
                moved
            }
            DropPlacement::Tab { anchor, side } => {
                self.detach_panel(source, id);
                let index = self
                    .tree
                    .group(proposal.target)
                    .and_then(|g| g.index_of(anchor.as_str()))
                    .map(|i| if side == TabSide::After { i + 1 } else { i });
                self.attach_panel(proposal.target, id, index)
            }
            DropPlacement::Center => {
                self.detach_panel(source, id);
                self.attach_panel(proposal.target, id, None)
            }
            DropPlacement::Edge(position) => {
                self.detach_panel(source, id);
                let group = self.new_group(self.kind_beside(proposal.target));
                self.attach_panel(group, id, None);
                match self.dock(proposal.target, group, position) {
                    Ok(_) => true,
                    Err(e) => {
                        tracing::debug!(panel = id, "Drop target rejected: {}", e);
                        self.detach_panel(group, id);
                        self.discard_detached(group);
                        self.attach_panel(source, id, None);
                        false
                    }
                }
            }
        };

        if let Some(slot) = self.panels.get_mut(id) {
            slot.hold = false;
        }
        if !moved {
            self.refresh();
            return false;
        }

        let target = self.panels.get(id).and_then(|slot| slot.owner);
        self.prune_group(source);
        self.emit(LayoutEventKind::PanelDrag, Some(panel), target);
        self.focus_panel_inner(Some(id));
        self.refresh();
        true
    }

    fn show_drag_indicator(&mut self, preview: Rectangle) {
        if self.drag_indicator.is_none() {
            let mut indicator = self.config.render_factory.create_drag_indicator();
            indicator.mount();
            self.drag_indicator = Some(indicator);
        }
        if let Some(indicator) = self.drag_indicator.as_mut() {
            indicator.set_bounds(preview);
            indicator.set_visible(true);
        }
    }

    fn hide_drag_indicator(&mut self) {
        if let Some(mut indicator) = self.drag_indicator.take() {
            indicator.unmount();
        }
    }

    // Separator drag

    /// Starts resizing with the separator under `pointer`, if any. Refused
    /// while an element is maximized.
    pub fn begin_separator_drag(&mut self, pointer: Point) -> LayoutResult<Option<ElementId>> {
        self.ensure_init()?;
        if self.tree.maximized().is_some() {
            return Ok(None);
        }
        let Some(local) = self.to_local(pointer) else {
            return Ok(None);
        };
        let Some(container) = self.tree.separator_at(local) else {
            return Ok(None);
        };
        let Some((lock, start_size)) = self.tree.split_lock(container) else {
            return Ok(None);
        };
        self.drag
            .start_separator_drag(container, lock, start_size, local);
        Ok(Some(container))
    }

    /// Moves the dragged separator. Only the lock child's explicit size
    /// changes; the split algorithm still decides the final sizes.
    pub fn drag_separator(&mut self, pointer: Point) -> LayoutResult<bool> {
        self.ensure_init()?;
        profile_function!();
        let Some(local) = self.to_local(pointer) else {
            return Ok(false);
        };
        let Some(DragKind::Separator {
            container,
            lock,
            start_size,
        }) = self.drag.drag_state().map(|s| s.kind.clone())
        else {
            return Ok(false);
        };
        if !self.drag.update(local) {
            return Ok(false);
        }
        let Some(start) = self.drag.drag_state().map(|s| s.start_pos) else {
            return Ok(false);
        };

        let Some((child, is_vertical, size)) = self.tree.get(container).and_then(|n| {
            let c = n.container()?;
            let delta = c.axis_delta(start, local);
            Some((
                c.child(lock),
                c.is_vertical,
                c.apply_drag_delta_from_original(start_size, delta, lock),
            ))
        }) else {
            self.drag.cancel_drag();
            return Ok(false);
        };

        if let Some(node) = self.tree.get_mut(child) {
            node.set_explicit(is_vertical, Some(size));
        }
        self.refresh();

        // keep the request equal to what was granted so clamping never drifts
        if let Some(node) = self.tree.get_mut(child) {
            let granted = if is_vertical {
                node.bounds.height
            } else {
                node.bounds.width
            };
            node.set_explicit(is_vertical, Some(granted));
        }
        Ok(true)
    }

    /// Releases the separator. Returns `true` if a resize happened.
    pub fn end_separator_drag(&mut self) -> LayoutResult<bool> {
        self.ensure_init()?;
        if !self.drag.is_separator_drag() {
            return Ok(false);
        }
        Ok(self.drag.end_drag().is_some_and(|s| s.is_active))
    }

    // Persistence

    /// Snapshot of the current arrangement.
    pub fn get_layout_config(&self) -> LayoutResult<LayoutSnapshot> {
        self.ensure_init()?;
        let root = match self.tree.root() {
            Some(root) => persist::capture(&self.tree, root, &|id: &PanelId, kind: GroupKind| {
                let slot = self.panels.get(id.as_str())?;
                let panel = slot.panel.borrow();
                Some(self.serializer(kind).serialize(&*panel))
            }),
            None => None,
        };
        Ok(LayoutSnapshot {
            root,
            ..LayoutSnapshot::default()
        })
    }

    pub fn get_layout_config_json(&self) -> LayoutResult<String> {
        Ok(self.get_layout_config()?.to_json()?)
    }

    /// Rebuilds the tree from a snapshot.
    ///
    /// Entries that cannot be resolved to a panel are skipped, and groups
    /// left without panels are dropped. Panels open before and after stay
    /// mounted; panels missing from the snapshot are closed.
    pub fn apply_layout_config(&mut self, snapshot: &LayoutSnapshot) -> LayoutResult<()> {
        self.ensure_init()?;
        self.mutate(|this| this.apply_snapshot(snapshot));
        Ok(())
    }

    pub fn apply_layout_config_json(&mut self, text: &str) -> LayoutResult<()> {
        let snapshot = LayoutSnapshot::from_json(text)?;
        self.apply_layout_config(&snapshot)
    }

    fn apply_snapshot(&mut self, snapshot: &LayoutSnapshot) {
        profile_function!();
        self.drag.cancel_drag();
        self.hide_drag_indicator();
        self.focus.reset();
        self.drain_focus_events();

        let previously_open: Vec<(PanelId, Option<ClosedLocation>)> = {
            profile_scope!("collect_open_panels");
            let mut open = Vec::new();
            for leaf in self.tree.leaves() {
                let Some(group) = self.tree.group(leaf) else {
                    continue;
                };
                let path = self.tree.path_of(leaf);
                let kind = group.kind();
                for (index, panel) in group.panels().iter().enumerate() {
                    let location = path
                        .clone()
                        .map(|path| ClosedLocation { path, index, kind });
                    open.push((panel.clone(), location));
                }
            }
            open
        };
        let was_open: HashSet<PanelId> = previously_open.iter().map(|(p, _)| p.clone()).collect();
        for panel in &was_open {
            if let Some(slot) = self.panels.get_mut(panel.as_str()) {
                slot.hold = true;
            }
        }

        self.tree.clear();
        for (_, slot) in self.panels.iter_mut() {
            slot.owner = None;
        }

        let mut has_document = false;
        let root = snapshot
            .root
            .as_ref()
            .and_then(|node| self.build_node(node, GroupKind::Tool, &mut has_document));
        if let Some(root) = root {
            if let Err(e) = self.tree.set_root(root) {
                tracing::error!("Failed to install restored root: {}", e);
            }
        }
        if self.tree.document().is_none() {
            let installed = self.new_document_area().and_then(|document| match self.tree.root() {
                Some(root) => self.dock(root, document, Position::Right).map(|_| ()),
                None => self.tree.set_root(document),
            });
            if let Err(e) = installed {
                tracing::error!("Failed to install document element: {}", e);
            }
        }

        for (panel, location) in previously_open {
            let Some(slot) = self.panels.get_mut(panel.as_str()) else {
                continue;
            };
            slot.hold = false;
            if slot.owner.is_some() {
                continue;
            }
            slot.unmount();
            if let Some(location) = location {
                self.close_cache.insert(panel.clone(), location);
            }
            self.emit(LayoutEventKind::PanelRemoved, Some(&panel), None);
        }

        let opened: Vec<(PanelId, ElementId)> = self
            .tree
            .leaves()
            .into_iter()
            .filter_map(|leaf| self.tree.group(leaf).map(|g| (leaf, g)))
            .flat_map(|(leaf, g)| g.panels().iter().map(move |p| (p.clone(), leaf)))
            .filter(|(panel, _)| !was_open.contains(panel))
            .collect();
        for (panel, group) in opened {
            self.emit(LayoutEventKind::PanelAdded, Some(&panel), Some(group));
        }

        tracing::debug!(elements = self.tree.len(), "Applied layout config");
        self.refresh();
    }

    /// Builds a detached element from a snapshot node. `kind` is the kind of
    /// group allowed at this depth: tool groups outside the document area,
    /// document groups inside it.
    fn build_node(
        &mut self,
        node: &NodeSnapshot,
        kind: GroupKind,
        has_document: &mut bool,
    ) -> Option<ElementId> {
        match node {
            NodeSnapshot::Container {
                is_vertical,
                bounds,
                explicit_width,
                explicit_height,
                first,
                second,
            } => {
                let first = self.build_node(first, kind, has_document);
                let second = self.build_node(second, kind, has_document);
                let id = match (first, second) {
                    (Some(first), Some(second)) => {
                        let separator = self.config.render_factory.create_separator(*is_vertical);
                        match self.tree.insert_container(
                            first,
                            second,
                            *is_vertical,
                            self.config.gap,
                            separator,
                        ) {
                            Ok(id) => id,
                            Err(e) => {
                                tracing::warn!("Skipping malformed container: {}", e);
                                self.discard_detached(second);
                                return Some(first);
                            }
                        }
                    }
                    (Some(only), None) | (None, Some(only)) => only,
                    (None, None) => return None,
                };
                if let Some(element) = self.tree.get_mut(id) {
                    element.bounds = *bounds;
                    element.explicit_width = *explicit_width;
                    element.explicit_height = *explicit_height;
                }
                Some(id)
            }
            NodeSnapshot::Document(document) => {
                let inner = document.layout.as_deref();
                if kind == GroupKind::Document || *has_document {
                    // a second or nested area contributes its groups in place
                    tracing::debug!("Flattening extra document area in layout config");
                    return inner.and_then(|layout| self.build_node(layout, kind, has_document));
                }
                *has_document = true;

                let root = inner
                    .and_then(|layout| self.build_node(layout, GroupKind::Document, has_document))
                    .unwrap_or_else(|| self.new_group(GroupKind::Document));
                let area = match self.tree.insert_document_area(root) {
                    Ok(area) => area,
                    Err(e) => {
                        tracing::error!("Failed to restore the document area: {}", e);
                        self.discard_detached(root);
                        return None;
                    }
                };
                if let Some(element) = self.tree.get_mut(area) {
                    element.bounds = document.bounds;
                    element.explicit_width = document.explicit_width;
                    element.explicit_height = document.explicit_height;
                }
                Some(area)
            }
            NodeSnapshot::Group(snapshot) => {
                let group = self.new_group(kind);
                let serializer = self.serializer(kind);

                for info in &snapshot.panels {
                    let Some(panel) = serializer.unserialize(info, &self.panels) else {
                        tracing::debug!(entry = %info, "Skipping unknown panel in layout config");
                        continue;
                    };
                    let id = PanelId::from(panel.borrow().id());
                    if !self.panels.contains(id.as_str()) {
                        self.panels.register(panel);
                    }
                    if !self.attach_panel(group, id.as_str(), None) {
                        tracing::debug!(panel = %id, "Panel listed twice in layout config");
                    }
                }

                let Some(tab_group) = self.tree.group_mut(group) else {
                    return None;
                };
                // only groups emptied by unresolved entries are dropped
                if tab_group.is_empty() && !snapshot.panels.is_empty() {
                    self.discard_detached(group);
                    return None;
                }
                if let Some(index) = snapshot.selected_index {
                    tab_group.select(index);
                }
                if let Some(element) = self.tree.get_mut(group) {
                    element.bounds = snapshot.bounds;
                    element.explicit_width = snapshot.explicit_width;
                    element.explicit_height = snapshot.explicit_height;
                }
                Some(group)
            }
        }
    }

    /// Unmounts everything and returns to the uninitialized state. Panel
    /// registrations and listeners are kept.
    pub fn dispose(&mut self) {
        if !self.initialized {
            return;
        }
        self.drag.cancel_drag();
        self.hide_drag_indicator();
        self.focus.reset();
        self.drain_focus_events();
        for (_, slot) in self.panels.iter_mut() {
            slot.owner = None;
            slot.hold = false;
            slot.unmount();
        }
        self.tree.clear();
        self.close_cache.clear();
        self.pending.clear();
        self.initialized = false;
        tracing::debug!("BoxLayout disposed");
    }

    // Display

    /// Runs the display-update pass and pushes the result to the panels.
    fn refresh(&mut self) {
        if !self.initialized {
            return;
        }
        profile_function!();
        let metrics = self.display_metrics();
        self.tree.update_display(self.area, &metrics);

        for leaf in self.tree.leaves() {
            let Some(node) = self.tree.get_mut(leaf) else {
                continue;
            };
            let visible = node.visible;
            let Some(group) = node.group_mut() else {
                continue;
            };
            let selected = group.selected_index();
            let content = group.content_bounds();
            let panels = group.panels().to_vec();

            for (index, id) in panels.iter().enumerate() {
                let Some(slot) = self.panels.get_mut(id.as_str()) else {
                    continue;
                };
                let is_selected = selected == Some(index);
                if let Some(title) = group.title_mut(index) {
                    let panel = slot.panel.borrow();
                    title.update(panel.title(), panel.icon(), is_selected);
                }
                if is_selected && visible {
                    slot.set_bounds(content);
                    slot.set_visible(true);
                } else {
                    slot.set_visible(false);
                }
            }
        }
    }

    // Queries

    pub fn tree(&self) -> &LayoutTree {
        &self.tree
    }

    pub fn group(&self, id: ElementId) -> Option<&TabGroup> {
        self.tree.group(id)
    }

    pub fn root_element(&self) -> Option<ElementId> {
        self.tree.root()
    }

    /// The document area. Tool groups dock around it; its own groups are
    /// reached through [`Self::document_group`].
    pub fn document_element(&self) -> Option<ElementId> {
        self.tree.document()
    }

    /// The most recently active document group, or the first one.
    pub fn document_group(&self) -> Option<ElementId> {
        self.get_active_tab_group_of(GroupKind::Document)
            .filter(|g| self.tree.group(*g).is_some() && self.tree.is_attached(*g))
            .or_else(|| self.tree.document_groups().first().copied())
    }

    /// Whether a panel or separator drag has passed the threshold and is
    /// still running.
    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }

    pub fn max_size_element(&self) -> Option<ElementId> {
        self.tree.maximized()
    }

    /// The most recently active group still in the tree.
    pub fn get_active_tab_group(&self) -> Option<ElementId> {
        self.focus
            .active_group()
            .filter(|g| self.tree.is_attached(*g))
    }

    pub fn get_active_tab_group_of(&self, kind: GroupKind) -> Option<ElementId> {
        self.focus
            .active_group_of(kind)
            .filter(|g| self.tree.is_attached(*g))
    }

    pub fn focused_panel_id(&self) -> Option<&PanelId> {
        self.focus.focused()
    }

    pub fn get_active_panel(&self) -> Option<SharedPanel> {
        let id = self.focus.focused()?;
        self.get_regist_panel_by_id(id.as_str())
    }

    /// Open panels in tree and tab order.
    pub fn get_all_open_panels(&self) -> Vec<SharedPanel> {
        self.tree
            .leaves()
            .into_iter()
            .filter_map(|leaf| self.tree.group(leaf))
            .flat_map(|g| g.panels().iter())
            .filter_map(|id| self.get_regist_panel_by_id(id.as_str()))
            .collect()
    }

    /// Every tab group in the tree, document included.
    pub fn get_all_tab_groups(&self) -> Vec<ElementId> {
        self.tree.leaves()
    }

    pub fn get_element_by_panel_id(&self, id: &str) -> Option<ElementId> {
        self.panels.get(id).and_then(|slot| slot.owner)
    }

    /// Visible group under a global point.
    pub fn group_at(&self, pointer: Point) -> Option<ElementId> {
        self.tree.leaf_at(self.to_local(pointer)?)
    }

    /// Group and tab index under a global point.
    pub fn tab_at(&self, pointer: Point) -> Option<(ElementId, usize)> {
        let local = self.to_local(pointer)?;
        let leaf = self.tree.leaf_at(local)?;
        let index = self.tree.group(leaf)?.tab_at(local)?;
        Some((leaf, index))
    }
}
