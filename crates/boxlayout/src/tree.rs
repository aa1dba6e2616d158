//! The layout split tree.
//!
//! Elements live in an arena keyed by [`ElementId`]. Containers own exactly
//! two children; leaves are tab groups. The document area is a leaf of the
//! outer tree that holds a split tree of its own, made of document groups.
//! Parent links are plain ids, so moving a subtree never copies it.
//!
//! The primitives here are strict and report misuse as [`TreeError`]. The
//! controller decides which of those are routine and turns them into no-ops.

use boxlayout_core::geometry::{Point, Rectangle};
use boxlayout_core::profiling::profile_function;
use indexmap::IndexMap;

use crate::error::{TreeError, TreeResult};
use crate::panel::PanelId;
use crate::render::Render;
use crate::splitter::{self, BoxContainer, Slot, SplitChild};
use crate::tabs::{TabBarMetrics, TabGroup};
use crate::types::{ElementId, GroupKind, Position};

/// Payload of a tree node.
#[derive(Debug)]
pub enum ElementKind {
    Container(BoxContainer),
    Group(TabGroup),
    /// A group inside the document area.
    Document(TabGroup),
    /// The always-present document area.
    DocumentArea(DocumentArea),
}

/// Nested split tree of document groups. `root` is a container or a
/// document group whose parent is the area itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentArea {
    pub root: ElementId,
}

#[derive(Debug)]
pub struct ElementNode {
    pub parent: Option<ElementId>,
    /// Rectangle assigned by the last display update, layout-local.
    pub bounds: Rectangle,
    /// Size requested from the parent container; `None` means auto.
    pub explicit_width: Option<f32>,
    pub explicit_height: Option<f32>,
    pub visible: bool,
    pub kind: ElementKind,
}

impl ElementNode {
    fn new(kind: ElementKind) -> Self {
        Self {
            parent: None,
            bounds: Rectangle::ZERO,
            explicit_width: None,
            explicit_height: None,
            visible: true,
            kind,
        }
    }

    /// Explicit size along an axis (`true` = height).
    pub fn explicit(&self, vertical: bool) -> Option<f32> {
        if vertical {
            self.explicit_height
        } else {
            self.explicit_width
        }
    }

    pub fn set_explicit(&mut self, vertical: bool, size: Option<f32>) {
        if vertical {
            self.explicit_height = size;
        } else {
            self.explicit_width = size;
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self.kind, ElementKind::Container(_))
    }

    /// Whether this is a group inside the document area.
    pub fn is_document(&self) -> bool {
        matches!(self.kind, ElementKind::Document(_))
    }

    pub fn is_document_area(&self) -> bool {
        matches!(self.kind, ElementKind::DocumentArea(_))
    }

    pub fn container(&self) -> Option<&BoxContainer> {
        match &self.kind {
            ElementKind::Container(c) => Some(c),
            _ => None,
        }
    }

    pub fn container_mut(&mut self) -> Option<&mut BoxContainer> {
        match &mut self.kind {
            ElementKind::Container(c) => Some(c),
            _ => None,
        }
    }

    pub fn document_area(&self) -> Option<&DocumentArea> {
        match &self.kind {
            ElementKind::DocumentArea(area) => Some(area),
            _ => None,
        }
    }

    /// The tab group of a leaf, document groups included.
    pub fn group(&self) -> Option<&TabGroup> {
        match &self.kind {
            ElementKind::Group(g) | ElementKind::Document(g) => Some(g),
            ElementKind::Container(_) | ElementKind::DocumentArea(_) => None,
        }
    }

    pub fn group_mut(&mut self) -> Option<&mut TabGroup> {
        match &mut self.kind {
            ElementKind::Group(g) | ElementKind::Document(g) => Some(g),
            ElementKind::Container(_) | ElementKind::DocumentArea(_) => None,
        }
    }

    /// Children in `first`, `second` order; the area has its root only.
    fn children(&self) -> Vec<ElementId> {
        match &self.kind {
            ElementKind::Container(c) => vec![c.first, c.second],
            ElementKind::DocumentArea(area) => vec![area.root],
            ElementKind::Group(_) | ElementKind::Document(_) => Vec::new(),
        }
    }

    fn set_visible(&mut self, visible: bool) {
        if self.visible == visible {
            return;
        }
        self.visible = visible;
        match &mut self.kind {
            ElementKind::Container(c) => c.separator.set_visible(visible),
            ElementKind::Group(g) | ElementKind::Document(g) => {
                g.tab_bar.set_visible(visible);
                for title in g.titles_mut() {
                    title.set_visible(visible);
                }
            }
            ElementKind::DocumentArea(_) => {}
        }
    }

    fn unmount_renders(&mut self) -> Vec<PanelId> {
        match &mut self.kind {
            ElementKind::Container(c) => {
                c.separator.unmount();
                Vec::new()
            }
            ElementKind::Group(g) | ElementKind::Document(g) => {
                g.tab_bar.unmount();
                let panels = g.panels().to_vec();
                for mut title in g.drain_titles() {
                    title.unmount();
                }
                panels
            }
            ElementKind::DocumentArea(_) => Vec::new(),
        }
    }
}

/// Pixel settings for the display-update pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayMetrics {
    pub separator_size: f32,
    pub tab_bar: TabBarMetrics,
}

impl Default for DisplayMetrics {
    fn default() -> Self {
        Self {
            separator_size: splitter::DEFAULT_SEPARATOR_SIZE,
            tab_bar: TabBarMetrics::default(),
        }
    }
}

#[derive(Debug)]
struct MaximizeState {
    element: ElementId,
    saved: Vec<(ElementId, Rectangle, Option<f32>, Option<f32>)>,
}

#[derive(Debug, Default)]
pub struct LayoutTree {
    nodes: IndexMap<ElementId, ElementNode>,
    root: Option<ElementId>,
    next_id: usize,
    maximized: Option<MaximizeState>,
}

impl LayoutTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of elements in the arena, detached ones included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn root(&self) -> Option<ElementId> {
        self.root
    }

    pub fn get(&self, id: ElementId) -> Option<&ElementNode> {
        self.nodes.get(&id)
    }

    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut ElementNode> {
        self.nodes.get_mut(&id)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ElementId, &ElementNode)> {
        self.nodes.iter().map(|(id, node)| (*id, node))
    }

    fn node(&self, id: ElementId) -> TreeResult<&ElementNode> {
        self.nodes.get(&id).ok_or(TreeError::ElementNotFound(id))
    }

    fn node_mut(&mut self, id: ElementId) -> TreeResult<&mut ElementNode> {
        self.nodes.get_mut(&id).ok_or(TreeError::ElementNotFound(id))
    }

    pub fn group(&self, id: ElementId) -> Option<&TabGroup> {
        self.nodes.get(&id).and_then(|n| n.group())
    }

    pub fn group_mut(&mut self, id: ElementId) -> Option<&mut TabGroup> {
        self.nodes.get_mut(&id).and_then(|n| n.group_mut())
    }

    /// Adds a detached leaf and mounts its tab bar.
    pub(crate) fn insert_group(&mut self, mut group: TabGroup) -> ElementId {
        group.tab_bar.mount();
        let kind = match group.kind() {
            GroupKind::Tool => ElementKind::Group(group),
            GroupKind::Document => ElementKind::Document(group),
        };
        self.insert_node(ElementNode::new(kind))
    }

    fn ensure_detached(&self, id: ElementId) -> TreeResult<()> {
        if self.node(id)?.parent.is_some() || self.root == Some(id) {
            return Err(TreeError::SameElement);
        }
        Ok(())
    }

    /// Joins two detached elements under a new detached container.
    pub(crate) fn insert_container(
        &mut self,
        first: ElementId,
        second: ElementId,
        is_vertical: bool,
        gap: f32,
        mut separator: Box<dyn Render>,
    ) -> TreeResult<ElementId> {
        if first == second {
            return Err(TreeError::SameElement);
        }
        self.ensure_detached(first)?;
        self.ensure_detached(second)?;
        if self.holds_documents(first) != self.holds_documents(second) {
            return Err(TreeError::AreaMismatch(second));
        }

        separator.mount();
        let id = self.insert_node(ElementNode::new(ElementKind::Container(BoxContainer::new(
            first,
            second,
            is_vertical,
            gap,
            separator,
        ))));
        self.node_mut(first)?.parent = Some(id);
        self.node_mut(second)?.parent = Some(id);
        Ok(id)
    }

    /// Wraps a detached subtree of document groups in a new detached
    /// document area.
    pub(crate) fn insert_document_area(&mut self, root: ElementId) -> TreeResult<ElementId> {
        self.ensure_detached(root)?;
        if !self.holds_documents(root) {
            return Err(TreeError::AreaMismatch(root));
        }
        let id = self.insert_node(ElementNode::new(ElementKind::DocumentArea(DocumentArea {
            root,
        })));
        self.node_mut(root)?.parent = Some(id);
        Ok(id)
    }

    fn insert_node(&mut self, node: ElementNode) -> ElementId {
        let id = ElementId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, node);
        id
    }

    /// Makes a detached element the root. The previous root, if any, becomes
    /// detached and stays in the arena.
    pub(crate) fn set_root(&mut self, id: ElementId) -> TreeResult<()> {
        if self.node(id)?.parent.is_some() {
            return Err(TreeError::SameElement);
        }
        if self.holds_documents(id) {
            return Err(TreeError::AreaMismatch(id));
        }
        self.root = Some(id);
        Ok(())
    }

    /// Whether the leaves under `id` are document groups. Mixed subtrees
    /// never exist, so the first leaf decides.
    fn holds_documents(&self, id: ElementId) -> bool {
        let mut current = id;
        loop {
            match self.nodes.get(&current).map(|n| &n.kind) {
                Some(ElementKind::Container(c)) => current = c.first,
                Some(ElementKind::Document(_)) => return true,
                _ => return false,
            }
        }
    }

    /// The document area `id` lies strictly inside of.
    pub fn document_area_of(&self, id: ElementId) -> Option<ElementId> {
        let mut current = self.parent(id);
        while let Some(cur) = current {
            if self.nodes.get(&cur).is_some_and(|n| n.is_document_area()) {
                return Some(cur);
            }
            current = self.parent(cur);
        }
        None
    }

    pub fn in_document_area(&self, id: ElementId) -> bool {
        self.document_area_of(id).is_some()
    }

    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.nodes.get(&id).and_then(|n| n.parent)
    }

    pub fn sibling(&self, id: ElementId) -> Option<ElementId> {
        let parent = self.parent(id)?;
        let c = self.nodes.get(&parent)?.container()?;
        c.slot_of(id).map(|slot| c.child(slot.other()))
    }

    /// Puts `new` where `old` hangs under `parent`, or at the root.
    fn replace_child(
        &mut self,
        parent: Option<ElementId>,
        old: ElementId,
        new: ElementId,
    ) -> TreeResult<()> {
        let Some(parent) = parent else {
            self.root = Some(new);
            return Ok(());
        };
        match &mut self.node_mut(parent)?.kind {
            ElementKind::Container(c) => {
                let slot = c.slot_of(old).ok_or(TreeError::NotAContainer(parent))?;
                c.set_child(slot, new);
            }
            ElementKind::DocumentArea(area) if area.root == old => area.root = new,
            _ => return Err(TreeError::NotAContainer(parent)),
        }
        self.node_mut(new)?.parent = Some(parent);
        Ok(())
    }

    /// Whether `id` is reachable from the root.
    pub fn is_attached(&self, id: ElementId) -> bool {
        let mut current = id;
        loop {
            match self.nodes.get(&current) {
                None => return false,
                Some(node) => match node.parent {
                    Some(parent) => current = parent,
                    None => return self.root == Some(current),
                },
            }
        }
    }

    /// Whether `id` is `ancestor` or lies below it.
    pub fn is_in_subtree(&self, ancestor: ElementId, id: ElementId) -> bool {
        let mut current = Some(id);
        while let Some(cur) = current {
            if cur == ancestor {
                return true;
            }
            current = self.parent(cur);
        }
        false
    }

    /// Docks `element` beside `target`.
    ///
    /// A new container takes `target`'s slot in the tree, with `element`
    /// first for [`Position::Left`]/[`Position::Top`]. The container inherits
    /// `target`'s explicit sizes. An `element` without an explicit size
    /// along the new axis asks for half of `target`'s current size.
    ///
    /// Inside the document area only document groups can be docked, and
    /// outside it only tool groups.
    ///
    /// An `element` that is already attached is first removed from its
    /// current place; if that collapses `target` itself, the element docks
    /// next to the sibling that replaced it.
    pub(crate) fn add_box_element(
        &mut self,
        target: ElementId,
        element: ElementId,
        position: Position,
        gap: f32,
        separator: Box<dyn Render>,
    ) -> TreeResult<ElementId> {
        if target == element {
            return Err(TreeError::SameElement);
        }
        self.node(element)?;
        self.node(target)?;
        if !self.is_attached(target) {
            return Err(TreeError::Detached(target));
        }
        if self.is_in_subtree(element, target) {
            return Err(TreeError::SameElement);
        }
        if self.in_document_area(target) != self.holds_documents(element) {
            return Err(TreeError::AreaMismatch(element));
        }

        let mut target = target;
        if self.is_attached(element) {
            let parent = self.parent(element);
            let promoted = self.detach(element)?;
            if parent == Some(target) {
                target = promoted;
            }
        }

        let is_vertical = position.is_vertical();
        let grandparent = self.node(target)?.parent;
        let target_bounds = self.node(target)?.bounds;
        let inherited = {
            let t = self.node_mut(target)?;
            t.parent = None;
            (t.explicit_width.take(), t.explicit_height.take())
        };
        if self.root == Some(target) {
            self.root = None;
        }

        let axis_size = if is_vertical {
            target_bounds.height
        } else {
            target_bounds.width
        };
        let half = (axis_size - gap) * 0.5;
        {
            let e = self.node_mut(element)?;
            if e.explicit(is_vertical).is_none() && half > 0.0 {
                e.set_explicit(is_vertical, Some(half));
            }
        }

        let (first, second) = if position.is_before() {
            (element, target)
        } else {
            (target, element)
        };
        let container = self.insert_container(first, second, is_vertical, gap, separator)?;
        {
            let c = self.node_mut(container)?;
            c.explicit_width = inherited.0;
            c.explicit_height = inherited.1;
            c.bounds = target_bounds;
        }
        self.replace_child(grandparent, target, container)?;

        tracing::trace!(%target, %element, ?position, %container, "docked element");
        Ok(container)
    }

    /// Takes `element` out of the tree and collapses its parent container,
    /// promoting the sibling into the parent's slot. Returns the sibling.
    ///
    /// The element and its subtree stay in the arena, detached. The root of
    /// a document area cannot be taken out.
    pub(crate) fn detach(&mut self, element: ElementId) -> TreeResult<ElementId> {
        let parent = match self.node(element)?.parent {
            Some(parent) => parent,
            None if self.root == Some(element) => return Err(TreeError::CannotRemoveRoot),
            None => return Err(TreeError::Detached(element)),
        };

        let (sibling, explicit, grandparent) = {
            let p = self.node(parent)?;
            if p.is_document_area() {
                return Err(TreeError::DocumentNotRemovable);
            }
            let c = p.container().ok_or(TreeError::NotAContainer(parent))?;
            let slot = c.slot_of(element).ok_or(TreeError::Detached(element))?;
            (
                c.child(slot.other()),
                (p.explicit_width, p.explicit_height),
                p.parent,
            )
        };

        self.replace_child(grandparent, parent, sibling)?;
        {
            let s = self.node_mut(sibling)?;
            s.parent = grandparent;
            s.explicit_width = explicit.0;
            s.explicit_height = explicit.1;
        }
        self.node_mut(element)?.parent = None;

        if let Some(mut removed) = self.nodes.shift_remove(&parent) {
            removed.unmount_renders();
        }
        if self
            .maximized
            .as_ref()
            .is_some_and(|m| m.element == parent || self.is_in_subtree(element, m.element))
        {
            self.maximized = None;
        }

        tracing::trace!(%element, %sibling, "collapsed container");
        Ok(sibling)
    }

    /// Drops a detached subtree (or the whole tree when `id` is the root)
    /// from the arena, unmounting its visuals. Returns the ids of the panels
    /// its groups were hosting.
    pub(crate) fn discard(&mut self, id: ElementId) -> TreeResult<Vec<PanelId>> {
        if self.node(id)?.parent.is_some() {
            return Err(TreeError::SameElement);
        }
        if self.root == Some(id) {
            self.root = None;
            self.maximized = None;
        }

        let mut panels = Vec::new();
        for element in self.subtree(id) {
            if let Some(mut node) = self.nodes.shift_remove(&element) {
                panels.extend(node.unmount_renders());
            }
        }
        Ok(panels)
    }

    /// Discards every element, attached or not.
    pub(crate) fn clear(&mut self) -> Vec<PanelId> {
        let mut panels = Vec::new();
        for (_, mut node) in self.nodes.drain(..) {
            panels.extend(node.unmount_renders());
        }
        self.root = None;
        self.maximized = None;
        panels
    }

    /// Pre-order ids of the subtree rooted at `id`, `first` before `second`.
    /// A document area is followed into its nested tree.
    pub fn subtree(&self, id: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.nodes.get(&current) else {
                continue;
            };
            out.push(current);
            stack.extend(node.children().into_iter().rev());
        }
        out
    }

    /// Attached tab groups in tree order, document groups included.
    pub fn leaves(&self) -> Vec<ElementId> {
        let Some(root) = self.root else {
            return Vec::new();
        };
        self.subtree(root)
            .into_iter()
            .filter(|id| self.nodes.get(id).is_some_and(|n| n.group().is_some()))
            .collect()
    }

    /// Attached ordinary tab groups in tree order.
    pub fn tool_groups(&self) -> Vec<ElementId> {
        self.leaves()
            .into_iter()
            .filter(|id| self.nodes.get(id).is_some_and(|n| !n.is_document()))
            .collect()
    }

    /// Attached groups of the document area in tree order.
    pub fn document_groups(&self) -> Vec<ElementId> {
        self.leaves()
            .into_iter()
            .filter(|id| self.nodes.get(id).is_some_and(|n| n.is_document()))
            .collect()
    }

    /// The attached document area.
    pub fn document(&self) -> Option<ElementId> {
        let root = self.root?;
        self.subtree(root)
            .into_iter()
            .find(|id| self.nodes.get(id).is_some_and(|n| n.is_document_area()))
    }

    /// Whether `id` is the top element inside a document area, which stays
    /// as long as the area does.
    pub fn is_area_root(&self, id: ElementId) -> bool {
        self.parent(id)
            .and_then(|p| self.nodes.get(&p))
            .and_then(|n| n.document_area())
            .is_some_and(|area| area.root == id)
    }

    /// Attached leaf currently hosting `panel`.
    pub fn group_of_panel(&self, panel: &str) -> Option<ElementId> {
        self.leaves()
            .into_iter()
            .find(|id| self.group(*id).is_some_and(|g| g.contains(panel)))
    }

    /// Minimum `(width, height)` of an element.
    pub fn min_size(&self, id: ElementId) -> (f32, f32) {
        match self.nodes.get(&id).map(|n| &n.kind) {
            Some(ElementKind::Container(c)) => splitter::container_min(
                c.is_vertical,
                c.gap,
                self.min_size(c.first),
                self.min_size(c.second),
            ),
            Some(ElementKind::Group(g)) | Some(ElementKind::Document(g)) => {
                (g.min_width(), g.min_height())
            }
            Some(ElementKind::DocumentArea(area)) => self.min_size(area.root),
            None => (0.0, 0.0),
        }
    }

    pub fn priority_level(&self, id: ElementId) -> i32 {
        match self.nodes.get(&id).map(|n| &n.kind) {
            Some(ElementKind::Container(c)) => self
                .priority_level(c.first)
                .max(self.priority_level(c.second)),
            Some(ElementKind::Group(g)) | Some(ElementKind::Document(g)) => g.priority_level(),
            Some(ElementKind::DocumentArea(_)) => i32::MAX,
            None => 0,
        }
    }

    /// Directions leading from the root to `id`; `None` when detached.
    /// Entering a document area takes no step.
    pub fn path_of(&self, id: ElementId) -> Option<Vec<Position>> {
        let mut path = Vec::new();
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            let node = self.nodes.get(&parent)?;
            if !node.is_document_area() {
                let c = node.container()?;
                let slot = c.slot_of(current)?;
                path.push(Position::of_child(c.is_vertical, slot == Slot::First));
            }
            current = parent;
        }
        if self.root != Some(current) || !self.contains(id) {
            return None;
        }
        path.reverse();
        Some(path)
    }

    /// Follows a path produced by [`Self::path_of`]. Fails as soon as a step
    /// does not match the orientation of the container it walks through.
    pub fn resolve_path(&self, path: &[Position]) -> Option<ElementId> {
        let mut current = self.root?;
        for step in path {
            if let Some(area) = self.nodes.get(&current)?.document_area() {
                current = area.root;
            }
            let c = self.nodes.get(&current)?.container()?;
            if c.is_vertical != step.is_vertical() {
                return None;
            }
            current = if step.is_before() { c.first } else { c.second };
        }
        Some(current)
    }

    pub fn maximized(&self) -> Option<ElementId> {
        self.maximized.as_ref().map(|m| m.element)
    }

    /// Maximizes `target`, or restores with `None`. Returns `true` if the
    /// state changed.
    pub(crate) fn set_maximized(&mut self, target: Option<ElementId>) -> bool {
        if self.maximized() == target {
            return false;
        }
        if let Some(state) = self.maximized.take() {
            for (id, bounds, explicit_width, explicit_height) in state.saved {
                if let Some(node) = self.nodes.get_mut(&id) {
                    node.bounds = bounds;
                    node.explicit_width = explicit_width;
                    node.explicit_height = explicit_height;
                }
            }
        }
        if let Some(element) = target {
            if !self.is_attached(element) {
                return true;
            }
            let saved = self
                .nodes
                .iter()
                .map(|(id, n)| (*id, n.bounds, n.explicit_width, n.explicit_height))
                .collect();
            self.maximized = Some(MaximizeState { element, saved });
        }
        true
    }

    /// Assigns rectangles to every attached element, top-down.
    ///
    /// While an element is maximized it alone receives `area` and everything
    /// outside its subtree is hidden.
    pub(crate) fn update_display(&mut self, area: Rectangle, metrics: &DisplayMetrics) {
        profile_function!();
        let Some(root) = self.root else {
            return;
        };

        match self.maximized() {
            Some(element) => {
                for id in self.subtree(root) {
                    let visible = self.is_in_subtree(element, id);
                    if let Some(node) = self.nodes.get_mut(&id) {
                        node.set_visible(visible);
                    }
                }
                self.layout_subtree(element, area, metrics);
            }
            None => {
                for id in self.subtree(root) {
                    if let Some(node) = self.nodes.get_mut(&id) {
                        node.set_visible(true);
                    }
                }
                self.layout_subtree(root, area, metrics);
            }
        }
    }

    fn split_child(&self, id: ElementId, vertical: bool) -> SplitChild {
        let (min_w, min_h) = self.min_size(id);
        SplitChild::new(
            if vertical { min_h } else { min_w },
            self.nodes.get(&id).and_then(|n| n.explicit(vertical)),
            self.priority_level(id),
        )
    }

    /// The lock child of a container and its current size along the axis.
    pub fn split_lock(&self, container: ElementId) -> Option<(Slot, f32)> {
        let node = self.nodes.get(&container)?;
        let c = node.container()?;
        let lock = splitter::lock_slot(
            &self.split_child(c.first, c.is_vertical),
            &self.split_child(c.second, c.is_vertical),
        );
        let bounds = self.nodes.get(&c.child(lock))?.bounds;
        Some((lock, c.axis_size(&bounds)))
    }

    fn layout_subtree(&mut self, id: ElementId, rect: Rectangle, metrics: &DisplayMetrics) {
        let split = match self.nodes.get(&id).map(|n| &n.kind) {
            Some(ElementKind::Container(c)) => Some((c.first, c.second, c.is_vertical, c.gap)),
            Some(ElementKind::DocumentArea(area)) => {
                let inner = area.root;
                if let Some(node) = self.nodes.get_mut(&id) {
                    node.bounds = rect;
                }
                self.layout_subtree(inner, rect, metrics);
                return;
            }
            Some(_) => None,
            None => return,
        };

        let Some((first, second, is_vertical, gap)) = split else {
            if let Some(node) = self.nodes.get_mut(&id) {
                node.bounds = rect;
                if let Some(group) = node.group_mut() {
                    group.layout(rect, &metrics.tab_bar);
                }
            }
            return;
        };

        let a = self.split_child(first, is_vertical);
        let b = self.split_child(second, is_vertical);
        let total = if is_vertical { rect.height } else { rect.width };
        let sizes = splitter::split(total, gap, &a, &b);

        let Some(node) = self.nodes.get_mut(&id) else {
            return;
        };
        node.bounds = rect;
        let Some(c) = node.container_mut() else {
            return;
        };
        let (first_rect, second_rect) = c.child_rects(&rect, &sizes);
        c.separator_bounds = c.separator_rect(&rect, &first_rect, metrics.separator_size);
        c.separator.set_bounds(c.separator_bounds);

        self.layout_subtree(first, first_rect, metrics);
        self.layout_subtree(second, second_rect, metrics);
    }

    /// Visible container whose separator is under `p`, deepest first.
    pub fn separator_at(&self, p: Point) -> Option<ElementId> {
        let root = self.root?;
        self.subtree(root).into_iter().rev().find(|id| {
            self.nodes.get(id).is_some_and(|n| {
                n.visible && n.container().is_some_and(|c| c.separator_bounds.contains(p))
            })
        })
    }

    /// Visible leaf under `p`.
    pub fn leaf_at(&self, p: Point) -> Option<ElementId> {
        let element = self.maximized().or(self.root)?;
        self.subtree(element).into_iter().find(|id| {
            self.nodes
                .get(id)
                .is_some_and(|n| n.group().is_some() && n.visible && n.bounds.contains(p))
        })
    }

    /// Checks parent links, the two-children rule of every attached
    /// container and that document groups stay inside the document area.
    pub fn validate(&self) -> TreeResult<()> {
        let Some(root) = self.root else {
            return Ok(());
        };
        if self.node(root)?.parent.is_some() {
            return Err(TreeError::Detached(root));
        }
        for id in self.subtree(root) {
            let node = self.node(id)?;
            if let Some(c) = node.container() {
                if c.first == c.second {
                    return Err(TreeError::SameElement);
                }
                if self.holds_documents(c.first) != self.holds_documents(c.second) {
                    return Err(TreeError::AreaMismatch(c.second));
                }
            }
            if let Some(area) = node.document_area() {
                if !self.holds_documents(area.root) {
                    return Err(TreeError::AreaMismatch(area.root));
                }
            }
            for child in node.children() {
                if self.node(child)?.parent != Some(id) {
                    return Err(TreeError::Detached(child));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::HeadlessRender;

    fn leaf(tree: &mut LayoutTree, kind: GroupKind) -> ElementId {
        tree.insert_group(TabGroup::new(kind, Box::new(HeadlessRender::default())))
    }

    fn sep() -> Box<dyn Render> {
        Box::new(HeadlessRender::default())
    }

    /// Tree holding only a document area with one document group.
    fn with_document() -> (LayoutTree, ElementId) {
        let mut tree = LayoutTree::new();
        let group = leaf(&mut tree, GroupKind::Document);
        let doc = tree.insert_document_area(group).unwrap();
        tree.set_root(doc).unwrap();
        (tree, doc)
    }

    fn area_root(tree: &LayoutTree, area: ElementId) -> ElementId {
        tree.get(area).unwrap().document_area().unwrap().root
    }

    /// Shape of the attached tree, for isomorphism checks.
    fn shape(tree: &LayoutTree, id: ElementId) -> String {
        let node = tree.get(id).unwrap();
        match &node.kind {
            ElementKind::Container(c) => format!(
                "{}({},{})[{:?},{:?}]",
                if c.is_vertical { "V" } else { "H" },
                shape(tree, c.first),
                shape(tree, c.second),
                node.explicit_width,
                node.explicit_height
            ),
            ElementKind::Group(_) => format!(
                "G{}[{:?},{:?}]",
                id.0, node.explicit_width, node.explicit_height
            ),
            ElementKind::Document(_) => format!("d{}", id.0),
            ElementKind::DocumentArea(area) => format!("D({})", shape(tree, area.root)),
        }
    }

    #[test]
    fn test_add_to_root_left() {
        let (mut tree, doc) = with_document();
        let a = leaf(&mut tree, GroupKind::Tool);
        tree.get_mut(a).unwrap().explicit_width = Some(200.0);

        let c = tree.add_box_element(doc, a, Position::Left, 2.0, sep()).unwrap();
        assert_eq!(tree.root(), Some(c));
        tree.update_display(Rectangle::new(0.0, 0.0, 800.0, 600.0), &DisplayMetrics::default());

        let container = tree.get(c).unwrap().container().unwrap();
        assert!(!container.is_vertical);
        assert_eq!(container.first, a);
        assert_eq!(container.second, doc);
        assert_eq!(tree.get(a).unwrap().bounds, Rectangle::new(0.0, 0.0, 200.0, 600.0));
        assert_eq!(tree.get(doc).unwrap().bounds, Rectangle::new(202.0, 0.0, 598.0, 600.0));
        tree.validate().unwrap();
    }

    #[test]
    fn test_add_nested_replaces_target_slot() {
        let (mut tree, doc) = with_document();
        let a = leaf(&mut tree, GroupKind::Tool);
        let b = leaf(&mut tree, GroupKind::Tool);
        let outer = tree.add_box_element(doc, a, Position::Right, 1.0, sep()).unwrap();
        let inner = tree.add_box_element(a, b, Position::Bottom, 1.0, sep()).unwrap();

        let outer_c = tree.get(outer).unwrap().container().unwrap();
        assert_eq!(outer_c.second, inner);
        assert_eq!(tree.parent(inner), Some(outer));
        let inner_c = tree.get(inner).unwrap().container().unwrap();
        assert!(inner_c.is_vertical);
        assert_eq!((inner_c.first, inner_c.second), (a, b));
        assert_eq!(tree.path_of(b), Some(vec![Position::Right, Position::Bottom]));
        assert_eq!(tree.resolve_path(&[Position::Right, Position::Bottom]), Some(b));
        assert_eq!(tree.resolve_path(&[Position::Bottom]), None);
        tree.validate().unwrap();
    }

    #[test]
    fn test_detach_collapses_parent() {
        let (mut tree, doc) = with_document();
        let a = leaf(&mut tree, GroupKind::Tool);
        let b = leaf(&mut tree, GroupKind::Tool);
        tree.add_box_element(doc, a, Position::Left, 1.0, sep()).unwrap();
        let inner = tree.add_box_element(a, b, Position::Top, 1.0, sep()).unwrap();

        let promoted = tree.detach(b).unwrap();
        assert_eq!(promoted, a);
        assert!(!tree.contains(inner));
        assert!(!tree.is_attached(b));
        assert_eq!(tree.sibling(a), Some(doc));
        tree.validate().unwrap();

        assert_eq!(tree.detach(b), Err(TreeError::Detached(b)));
        tree.detach(a).unwrap();
        assert_eq!(tree.root(), Some(doc));
        assert_eq!(tree.detach(doc), Err(TreeError::CannotRemoveRoot));
    }

    #[test]
    fn test_moving_element_next_to_its_own_parent() {
        let (mut tree, doc) = with_document();
        let a = leaf(&mut tree, GroupKind::Tool);
        let c = tree.add_box_element(doc, a, Position::Left, 1.0, sep()).unwrap();

        // the container collapses, so `a` docks beside the document instead
        let c2 = tree.add_box_element(c, a, Position::Bottom, 1.0, sep()).unwrap();
        let container = tree.get(c2).unwrap().container().unwrap();
        assert_eq!((container.first, container.second), (doc, a));
        assert!(!tree.contains(c));
        tree.validate().unwrap();
    }

    #[test]
    fn test_rejects_docking_into_own_subtree() {
        let (mut tree, doc) = with_document();
        let a = leaf(&mut tree, GroupKind::Tool);
        let c = tree.add_box_element(doc, a, Position::Left, 1.0, sep()).unwrap();
        assert_eq!(
            tree.add_box_element(a, c, Position::Left, 1.0, sep()),
            Err(TreeError::SameElement)
        );
        assert_eq!(
            tree.add_box_element(a, a, Position::Left, 1.0, sep()),
            Err(TreeError::SameElement)
        );
    }

    #[test]
    fn test_add_then_remove_round_trip() {
        let (mut tree, doc) = with_document();
        let a = leaf(&mut tree, GroupKind::Tool);
        tree.get_mut(a).unwrap().explicit_width = Some(180.0);
        tree.add_box_element(doc, a, Position::Left, 1.0, sep()).unwrap();
        tree.update_display(Rectangle::new(0.0, 0.0, 900.0, 700.0), &DisplayMetrics::default());
        let before = shape(&tree, tree.root().unwrap());

        let added: Vec<ElementId> = (0..4).map(|_| leaf(&mut tree, GroupKind::Tool)).collect();
        tree.add_box_element(a, added[0], Position::Bottom, 1.0, sep()).unwrap();
        tree.add_box_element(doc, added[1], Position::Right, 1.0, sep()).unwrap();
        tree.add_box_element(added[0], added[2], Position::Left, 1.0, sep()).unwrap();
        tree.add_box_element(doc, added[3], Position::Top, 1.0, sep()).unwrap();
        tree.validate().unwrap();

        for id in [added[2], added[0], added[3], added[1]] {
            tree.detach(id).unwrap();
            tree.validate().unwrap();
        }
        assert_eq!(shape(&tree, tree.root().unwrap()), before);
    }

    #[test]
    fn test_new_element_requests_half_of_target() {
        let (mut tree, doc) = with_document();
        tree.update_display(Rectangle::new(0.0, 0.0, 800.0, 600.0), &DisplayMetrics::default());
        let a = leaf(&mut tree, GroupKind::Tool);
        tree.add_box_element(doc, a, Position::Bottom, 2.0, sep()).unwrap();
        assert_eq!(tree.get(a).unwrap().explicit_height, Some(299.0));
        assert_eq!(tree.get(a).unwrap().explicit_width, None);
    }

    #[test]
    fn test_discard_returns_panels() {
        let (mut tree, doc) = with_document();
        let a = leaf(&mut tree, GroupKind::Tool);
        tree.group_mut(a)
            .unwrap()
            .add(PanelId::from("p1"), Box::new(HeadlessRender::default()));
        tree.add_box_element(doc, a, Position::Left, 1.0, sep()).unwrap();
        tree.detach(a).unwrap();
        let panels = tree.discard(a).unwrap();
        assert_eq!(panels, vec![PanelId::from("p1")]);
        assert!(!tree.contains(a));
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn test_min_size_and_priority() {
        let (mut tree, doc) = with_document();
        let a = leaf(&mut tree, GroupKind::Tool);
        tree.group_mut(a).unwrap().set_constraints(50.0, 80.0, 3);
        let c = tree.add_box_element(doc, a, Position::Left, 2.0, sep()).unwrap();
        assert_eq!(tree.min_size(c), (52.0, 80.0));
        assert_eq!(tree.priority_level(a), 3);
        assert_eq!(tree.priority_level(c), i32::MAX);
    }

    #[test]
    fn test_maximize_and_restore() {
        let (mut tree, doc) = with_document();
        let a = leaf(&mut tree, GroupKind::Tool);
        tree.get_mut(a).unwrap().explicit_width = Some(250.0);
        tree.add_box_element(doc, a, Position::Left, 1.0, sep()).unwrap();
        let area = Rectangle::new(0.0, 0.0, 800.0, 600.0);
        let metrics = DisplayMetrics::default();
        tree.update_display(area, &metrics);
        let doc_before = tree.get(doc).unwrap().bounds;
        let a_before = tree.get(a).unwrap().bounds;

        assert!(tree.set_maximized(Some(a)));
        tree.update_display(area, &metrics);
        assert_eq!(tree.get(a).unwrap().bounds, area);
        assert!(!tree.get(doc).unwrap().visible);
        assert_eq!(tree.leaf_at(Point::new(700.0, 10.0)), Some(a));

        assert!(tree.set_maximized(None));
        tree.update_display(area, &metrics);
        assert_eq!(tree.get(doc).unwrap().bounds, doc_before);
        assert_eq!(tree.get(a).unwrap().bounds, a_before);
        assert!(tree.get(doc).unwrap().visible);
        assert!(!tree.set_maximized(None));
    }

    #[test]
    fn test_hit_testing() {
        let (mut tree, doc) = with_document();
        let a = leaf(&mut tree, GroupKind::Tool);
        tree.get_mut(a).unwrap().explicit_width = Some(200.0);
        let c = tree.add_box_element(doc, a, Position::Left, 2.0, sep()).unwrap();
        tree.update_display(Rectangle::new(0.0, 0.0, 800.0, 600.0), &DisplayMetrics::default());

        assert_eq!(tree.separator_at(Point::new(201.0, 300.0)), Some(c));
        assert_eq!(tree.separator_at(Point::new(400.0, 300.0)), None);
        let doc_group = area_root(&tree, doc);
        assert_eq!(tree.leaf_at(Point::new(100.0, 300.0)), Some(a));
        assert_eq!(tree.leaf_at(Point::new(500.0, 300.0)), Some(doc_group));
        assert_eq!(tree.leaves(), vec![a, doc_group]);
        assert_eq!(tree.tool_groups(), vec![a]);
        assert_eq!(tree.document_groups(), vec![doc_group]);
        assert_eq!(tree.document(), Some(doc));
    }

    #[test]
    fn test_split_inside_document_area() {
        let (mut tree, doc) = with_document();
        let a = leaf(&mut tree, GroupKind::Tool);
        tree.get_mut(a).unwrap().explicit_width = Some(200.0);
        tree.add_box_element(doc, a, Position::Left, 2.0, sep()).unwrap();
        let first = area_root(&tree, doc);
        let second = leaf(&mut tree, GroupKind::Document);

        let inner = tree
            .add_box_element(first, second, Position::Bottom, 2.0, sep())
            .unwrap();
        assert_eq!(area_root(&tree, doc), inner);
        assert_eq!(tree.parent(inner), Some(doc));
        assert!(tree.in_document_area(second));
        assert!(!tree.in_document_area(doc));
        tree.update_display(Rectangle::new(0.0, 0.0, 800.0, 600.0), &DisplayMetrics::default());

        assert_eq!(tree.get(doc).unwrap().bounds, Rectangle::new(202.0, 0.0, 598.0, 600.0));
        let (upper, lower) = (tree.get(first).unwrap().bounds, tree.get(second).unwrap().bounds);
        assert_eq!(upper.x, 202.0);
        assert_eq!(upper.height + lower.height + 2.0, 600.0);
        assert_eq!(tree.document_groups(), vec![first, second]);

        // the area is transparent to paths
        let path = tree.path_of(second).unwrap();
        assert_eq!(path, vec![Position::Right, Position::Bottom]);
        assert_eq!(tree.resolve_path(&path), Some(second));
        tree.validate().unwrap();

        tree.detach(second).unwrap();
        assert_eq!(area_root(&tree, doc), first);
        assert_eq!(tree.detach(first), Err(TreeError::DocumentNotRemovable));
        tree.validate().unwrap();
    }

    #[test]
    fn test_groups_stay_on_their_side_of_the_area() {
        let (mut tree, doc) = with_document();
        let inside = area_root(&tree, doc);
        let tool = leaf(&mut tree, GroupKind::Tool);
        let document = leaf(&mut tree, GroupKind::Document);

        assert_eq!(
            tree.add_box_element(inside, tool, Position::Left, 1.0, sep()),
            Err(TreeError::AreaMismatch(tool))
        );
        assert_eq!(
            tree.add_box_element(doc, document, Position::Left, 1.0, sep()),
            Err(TreeError::AreaMismatch(document))
        );
        assert!(tree.add_box_element(doc, tool, Position::Left, 1.0, sep()).is_ok());
        assert!(tree
            .add_box_element(inside, document, Position::Right, 1.0, sep())
            .is_ok());
        tree.validate().unwrap();
    }
}
