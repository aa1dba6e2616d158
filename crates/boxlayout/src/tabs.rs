//! Tab groups: the leaves of the layout tree.
//!
//! A group holds an ordered list of panel ids, the selected index and the
//! visuals of its tab bar. Panels themselves live in the controller's
//! registry; the group only references them by id.

use std::fmt;

use boxlayout_core::geometry::{Point, Rectangle};

use crate::panel::PanelId;
use crate::render::{Render, TitleRender};
use crate::types::{GroupKind, TabSide};

/// Default height of the tab bar.
pub const DEFAULT_TAB_BAR_HEIGHT: f32 = 25.0;

/// Default maximum width of a single tab title.
pub const DEFAULT_TAB_ITEM_MAX_WIDTH: f32 = 100.0;

/// Default width reserved for the tab menu button.
pub const DEFAULT_TAB_MENU_WIDTH: f32 = 20.0;

/// Geometry settings for tab bars.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TabBarMetrics {
    pub height: f32,
    pub item_max_width: f32,
    /// Width reserved on the right for the tab menu, `0` when hidden.
    pub menu_width: f32,
}

impl Default for TabBarMetrics {
    fn default() -> Self {
        Self {
            height: DEFAULT_TAB_BAR_HEIGHT,
            item_max_width: DEFAULT_TAB_ITEM_MAX_WIDTH,
            menu_width: 0.0,
        }
    }
}

/// Entries of the tab menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TabMenuAction {
    /// Close the selected panel.
    Close,
    /// Close every panel of the group.
    CloseAll,
}

/// Outcome of removing a tab.
pub struct RemovedTab {
    pub index: usize,
    pub title: Box<dyn TitleRender>,
    pub selection_changed: bool,
}

pub struct TabGroup {
    kind: GroupKind,
    panels: Vec<PanelId>,
    titles: Vec<Box<dyn TitleRender>>,
    selected: Option<usize>,
    pub(crate) tab_bar: Box<dyn Render>,
    bounds: Rectangle,
    bar_bounds: Rectangle,
    content_bounds: Rectangle,
    item_bounds: Vec<Rectangle>,
    min_width: f32,
    min_height: f32,
    priority: i32,
}

impl fmt::Debug for TabGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TabGroup")
            .field("kind", &self.kind)
            .field("panels", &self.panels)
            .field("selected", &self.selected)
            .finish_non_exhaustive()
    }
}

impl TabGroup {
    pub fn new(kind: GroupKind, tab_bar: Box<dyn Render>) -> Self {
        Self {
            kind,
            panels: Vec::new(),
            titles: Vec::new(),
            selected: None,
            tab_bar,
            bounds: Rectangle::ZERO,
            bar_bounds: Rectangle::ZERO,
            content_bounds: Rectangle::ZERO,
            item_bounds: Vec::new(),
            min_width: 0.0,
            min_height: 0.0,
            priority: 0,
        }
    }

    pub fn kind(&self) -> GroupKind {
        self.kind
    }

    pub fn panels(&self) -> &[PanelId] {
        &self.panels
    }

    pub fn len(&self) -> usize {
        self.panels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index_of(id).is_some()
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.panels.iter().position(|p| p.as_str() == id)
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_panel(&self) -> Option<&PanelId> {
        self.selected.and_then(|i| self.panels.get(i))
    }

    /// Appends a tab and selects it.
    pub fn add(&mut self, id: PanelId, title: Box<dyn TitleRender>) -> usize {
        self.insert(self.panels.len(), id, title)
    }

    /// Inserts a tab at `index` (clamped) and selects it.
    pub fn insert(&mut self, index: usize, id: PanelId, title: Box<dyn TitleRender>) -> usize {
        let index = index.min(self.panels.len());
        self.panels.insert(index, id);
        self.titles.insert(index, title);
        self.selected = Some(index);
        index
    }

    /// Removes a tab. Removing the selected tab selects its left neighbour,
    /// or clears the selection when the group became empty.
    pub fn remove(&mut self, id: &str) -> Option<RemovedTab> {
        let index = self.index_of(id)?;
        self.panels.remove(index);
        let title = self.titles.remove(index);
        if index < self.item_bounds.len() {
            self.item_bounds.remove(index);
        }

        let previous = self.selected;
        self.selected = match previous {
            Some(s) if s == index => {
                if self.panels.is_empty() {
                    None
                } else {
                    Some(index.saturating_sub(1))
                }
            }
            Some(s) if s > index => Some(s - 1),
            other => other,
        };

        Some(RemovedTab {
            index,
            title,
            selection_changed: previous == Some(index),
        })
    }

    /// Returns `true` if the selection changed.
    pub fn select(&mut self, index: usize) -> bool {
        if index >= self.panels.len() || self.selected == Some(index) {
            return false;
        }
        self.selected = Some(index);
        true
    }

    /// Moves `id` next to `anchor` within this group and selects it.
    ///
    /// Returns `false` when either tab is missing or they are the same tab.
    pub fn move_next_to(&mut self, id: &str, anchor: &str, side: TabSide) -> bool {
        if id == anchor {
            return false;
        }
        let (Some(from), Some(_)) = (self.index_of(id), self.index_of(anchor)) else {
            return false;
        };
        let panel = self.panels.remove(from);
        let title = self.titles.remove(from);

        // anchor index after removal
        let anchor_index = self.index_of(anchor).unwrap_or(self.panels.len());
        let to = match side {
            TabSide::Before => anchor_index,
            TabSide::After => anchor_index + 1,
        };
        self.panels.insert(to, panel);
        self.titles.insert(to, title);
        self.selected = Some(to);
        true
    }

    pub(crate) fn titles_mut(&mut self) -> impl Iterator<Item = &mut Box<dyn TitleRender>> {
        self.titles.iter_mut()
    }

    pub(crate) fn drain_titles(&mut self) -> impl Iterator<Item = Box<dyn TitleRender>> + '_ {
        self.titles.drain(..)
    }

    pub(crate) fn title_mut(&mut self, index: usize) -> Option<&mut Box<dyn TitleRender>> {
        self.titles.get_mut(index)
    }

    pub fn min_width(&self) -> f32 {
        self.min_width
    }

    pub fn min_height(&self) -> f32 {
        self.min_height
    }

    pub fn priority_level(&self) -> i32 {
        self.priority
    }

    /// Constraints aggregated from the hosted panels.
    pub(crate) fn set_constraints(&mut self, min_width: f32, min_height: f32, priority: i32) {
        self.min_width = min_width;
        self.min_height = min_height;
        self.priority = priority;
    }

    /// Whole area of the group, tab bar included.
    pub fn bounds(&self) -> Rectangle {
        self.bounds
    }

    pub fn bar_bounds(&self) -> Rectangle {
        self.bar_bounds
    }

    /// Area below the tab bar given to the selected panel.
    pub fn content_bounds(&self) -> Rectangle {
        self.content_bounds
    }

    pub fn item_bounds(&self) -> &[Rectangle] {
        &self.item_bounds
    }

    /// Lays out the tab bar and title items inside `bounds`.
    pub fn layout(&mut self, bounds: Rectangle, metrics: &TabBarMetrics) {
        self.bounds = bounds;
        let bar_height = metrics.height.min(bounds.height).max(0.0);
        self.bar_bounds = Rectangle::new(bounds.x, bounds.y, bounds.width, bar_height);
        self.content_bounds = Rectangle::new(
            bounds.x,
            bounds.y + bar_height,
            bounds.width,
            (bounds.height - bar_height).max(0.0),
        );
        self.tab_bar.set_bounds(self.bar_bounds);

        let count = self.panels.len();
        self.item_bounds.clear();
        if count == 0 {
            return;
        }
        let available = (bounds.width - metrics.menu_width).max(0.0);
        let item_width = (available / count as f32).min(metrics.item_max_width);
        for (i, title) in self.titles.iter_mut().enumerate() {
            let rect = Rectangle::new(
                bounds.x + item_width * i as f32,
                bounds.y,
                item_width,
                bar_height,
            );
            title.set_bounds(rect);
            self.item_bounds.push(rect);
        }
    }

    /// Index of the tab title under `p`.
    pub fn tab_at(&self, p: Point) -> Option<usize> {
        self.item_bounds.iter().position(|r| r.contains(p))
    }
}
