//! Drag gestures: panel re-docking and separator resizing.
//!
//! Negotiation is split from mutation. While the pointer moves, the leaf
//! under it is asked for a [`DropProposal`] through the [`DragTarget`]
//! capability; nothing in the tree changes until the controller commits the
//! last proposal on pointer-up.

use boxlayout_core::geometry::{Point, Rectangle};

use crate::drop_zone::DropZoneDetector;
use crate::panel::PanelId;
use crate::splitter::Slot;
use crate::tabs::TabGroup;
use crate::types::{DropZone, ElementId, Position, TabSide};

/// Distance in pixels the pointer must travel before a drag starts.
pub const DRAG_THRESHOLD: f32 = 5.0;

/// How a dropped panel joins its target.
#[derive(Debug, Clone, PartialEq)]
pub enum DropPlacement {
    /// Next to a tab of the target group.
    Tab { anchor: PanelId, side: TabSide },
    /// Appended to the target group.
    Center,
    /// In a new group docked on that side of the target.
    Edge(Position),
}

/// Immutable answer to "what happens if the panel is released here".
#[derive(Debug, Clone, PartialEq)]
pub struct DropProposal {
    pub target: ElementId,
    pub placement: DropPlacement,
    /// Drop indicator rectangle, layout-local.
    pub preview: Rectangle,
}

/// What a drop target needs to know about the gesture.
#[derive(Debug, Clone, Copy)]
pub struct DragContext<'a> {
    pub panel: &'a PanelId,
    pub source: ElementId,
    /// Tab index of the panel when the drag started.
    pub start_index: usize,
    pub detector: &'a DropZoneDetector,
}

/// Capability of tree nodes that accept dropped panels.
///
/// Only leaves implement it; containers are never drop targets.
pub trait DragTarget {
    fn propose_drop(&self, id: ElementId, ctx: &DragContext<'_>, p: Point) -> Option<DropProposal>;
}

impl DragTarget for TabGroup {
    fn propose_drop(&self, id: ElementId, ctx: &DragContext<'_>, p: Point) -> Option<DropProposal> {
        let is_source = id == ctx.source;

        if !self.is_empty() && self.bar_bounds().contains(p) {
            return propose_tab(self, id, ctx, p, is_source);
        }

        let zone = ctx.detector.detect_zone(p, self.bounds())?;
        if is_source && (zone.is_center() || self.len() <= 1) {
            return None;
        }
        let placement = match zone {
            DropZone::Center => DropPlacement::Center,
            DropZone::Edge(position) => DropPlacement::Edge(position),
        };
        Some(DropProposal {
            target: id,
            placement,
            preview: ctx.detector.preview_bounds(zone, self.bounds()),
        })
    }
}

fn propose_tab(
    group: &TabGroup,
    id: ElementId,
    ctx: &DragContext<'_>,
    p: Point,
    is_source: bool,
) -> Option<DropProposal> {
    let last = group.len().checked_sub(1)?;
    let hovered = group.tab_at(p);

    let (index, side, preview) = match hovered {
        Some(index) => {
            let side = if is_source && index > ctx.start_index {
                TabSide::After
            } else {
                TabSide::Before
            };
            (index, side, *group.item_bounds().get(index)?)
        }
        None if is_source => {
            let side = if last > ctx.start_index {
                TabSide::After
            } else {
                TabSide::Before
            };
            (last, side, *group.item_bounds().get(last)?)
        }
        None => {
            let bar = group.bar_bounds();
            let x = group
                .item_bounds()
                .get(last)
                .map_or(bar.x, |r| r.right());
            (
                last,
                TabSide::After,
                Rectangle::new(x, bar.y, bar.height, bar.height),
            )
        }
    };

    let anchor = group.panels().get(index)?;
    if anchor == ctx.panel {
        return None;
    }
    Some(DropProposal {
        target: id,
        placement: DropPlacement::Tab {
            anchor: anchor.clone(),
            side,
        },
        preview,
    })
}

/// What is being dragged.
#[derive(Debug, Clone, PartialEq)]
pub enum DragKind {
    Panel {
        panel: PanelId,
        source: ElementId,
        start_index: usize,
    },
    Separator {
        container: ElementId,
        lock: Slot,
        /// Size of the lock child when the drag started.
        start_size: f32,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct DragState {
    pub kind: DragKind,
    pub start_pos: Point,
    pub current_pos: Point,
    /// Whether the pointer has travelled past the threshold.
    pub is_active: bool,
    /// Last proposal returned by negotiation.
    pub proposal: Option<DropProposal>,
}

impl DragState {
    pub fn new(kind: DragKind, start_pos: Point) -> Self {
        Self {
            kind,
            start_pos,
            current_pos: start_pos,
            is_active: false,
            proposal: None,
        }
    }

    pub fn update(&mut self, pos: Point, threshold: f32) {
        self.current_pos = pos;
        if !self.is_active && DragManager::exceeds_threshold(self.start_pos, pos, threshold) {
            self.is_active = true;
        }
    }
}

/// Pointer-down/move/up state of the one gesture a layout can run at a time.
#[derive(Debug)]
pub struct DragManager {
    drag_state: Option<DragState>,
    threshold: f32,
}

impl Default for DragManager {
    fn default() -> Self {
        Self::new(DRAG_THRESHOLD)
    }
}

impl DragManager {
    pub fn new(threshold: f32) -> Self {
        Self {
            drag_state: None,
            threshold: threshold.max(0.0),
        }
    }

    pub fn set_threshold(&mut self, threshold: f32) {
        self.threshold = threshold.max(0.0);
    }

    pub fn start_panel_drag(
        &mut self,
        panel: PanelId,
        source: ElementId,
        start_index: usize,
        start_pos: Point,
    ) {
        self.drag_state = Some(DragState::new(
            DragKind::Panel {
                panel,
                source,
                start_index,
            },
            start_pos,
        ));
    }

    pub fn start_separator_drag(
        &mut self,
        container: ElementId,
        lock: Slot,
        start_size: f32,
        start_pos: Point,
    ) {
        self.drag_state = Some(DragState::new(
            DragKind::Separator {
                container,
                lock,
                start_size,
            },
            start_pos,
        ));
    }

    /// Returns `true` if there's an active drag operation.
    pub fn update(&mut self, pos: Point) -> bool {
        let threshold = self.threshold;
        match self.drag_state.as_mut() {
            Some(state) => {
                state.update(pos, threshold);
                state.is_active
            }
            None => false,
        }
    }

    /// Whether a gesture moved past the threshold and is still running.
    pub fn is_dragging(&self) -> bool {
        self.drag_state.as_ref().is_some_and(|s| s.is_active)
    }

    pub fn drag_state(&self) -> Option<&DragState> {
        self.drag_state.as_ref()
    }

    pub fn drag_state_mut(&mut self) -> Option<&mut DragState> {
        self.drag_state.as_mut()
    }

    pub fn cancel_drag(&mut self) {
        self.drag_state = None;
    }

    /// End the current drag operation and return the final state.
    pub fn end_drag(&mut self) -> Option<DragState> {
        self.drag_state.take()
    }

    pub fn is_panel_drag(&self) -> bool {
        self.drag_state
            .as_ref()
            .is_some_and(|s| matches!(s.kind, DragKind::Panel { .. }))
    }

    pub fn is_separator_drag(&self) -> bool {
        self.drag_state
            .as_ref()
            .is_some_and(|s| matches!(s.kind, DragKind::Separator { .. }))
    }

    pub fn exceeds_threshold(start: Point, current: Point, threshold: f32) -> bool {
        start.distance(current) >= threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::HeadlessRender;
    use crate::tabs::TabBarMetrics;
    use crate::types::GroupKind;

    fn group(ids: &[&str]) -> TabGroup {
        let mut g = TabGroup::new(GroupKind::Tool, Box::new(HeadlessRender::default()));
        for id in ids {
            g.add(PanelId::from(*id), Box::new(HeadlessRender::default()));
        }
        g.layout(Rectangle::new(0.0, 0.0, 300.0, 300.0), &TabBarMetrics::default());
        g
    }

    fn ctx<'a>(panel: &'a PanelId, source: ElementId, start_index: usize, detector: &'a DropZoneDetector) -> DragContext<'a> {
        DragContext {
            panel,
            source,
            start_index,
            detector,
        }
    }

    #[test]
    fn test_center_and_edge_on_other_group() {
        let g = group(&["a"]);
        let panel = PanelId::from("x");
        let detector = DropZoneDetector::new();
        let c = ctx(&panel, ElementId(9), 0, &detector);

        let center = g.propose_drop(ElementId(1), &c, Point::new(150.0, 150.0)).unwrap();
        assert_eq!(center.placement, DropPlacement::Center);
        assert_eq!(center.preview, g.bounds());

        let bottom = g.propose_drop(ElementId(1), &c, Point::new(150.0, 290.0)).unwrap();
        assert_eq!(bottom.placement, DropPlacement::Edge(Position::Bottom));
        assert_eq!(bottom.preview, Rectangle::new(0.0, 150.0, 300.0, 150.0));
    }

    #[test]
    fn test_source_group_restrictions() {
        let detector = DropZoneDetector::new();
        let panel = PanelId::from("a");
        let c = ctx(&panel, ElementId(1), 0, &detector);

        let single = group(&["a"]);
        assert!(single.propose_drop(ElementId(1), &c, Point::new(150.0, 150.0)).is_none());
        assert!(single.propose_drop(ElementId(1), &c, Point::new(5.0, 150.0)).is_none());

        let pair = group(&["a", "b"]);
        assert!(pair.propose_drop(ElementId(1), &c, Point::new(150.0, 150.0)).is_none());
        let edge = pair.propose_drop(ElementId(1), &c, Point::new(5.0, 150.0)).unwrap();
        assert_eq!(edge.placement, DropPlacement::Edge(Position::Left));
    }

    #[test]
    fn test_tab_bar_placement() {
        let detector = DropZoneDetector::new();
        let g = group(&["a", "b", "c"]);

        // reorder within the source group
        let panel = PanelId::from("a");
        let c = ctx(&panel, ElementId(1), 0, &detector);
        let p = g.propose_drop(ElementId(1), &c, Point::new(250.0, 10.0)).unwrap();
        assert_eq!(
            p.placement,
            DropPlacement::Tab {
                anchor: PanelId::from("c"),
                side: TabSide::After
            }
        );
        assert_eq!(p.preview, g.item_bounds()[2]);
        assert!(g.propose_drop(ElementId(1), &c, Point::new(50.0, 10.0)).is_none());

        // foreign panel hovering a tab goes before it
        let panel = PanelId::from("x");
        let c = ctx(&panel, ElementId(7), 0, &detector);
        let p = g.propose_drop(ElementId(1), &c, Point::new(150.0, 10.0)).unwrap();
        assert_eq!(
            p.placement,
            DropPlacement::Tab {
                anchor: PanelId::from("b"),
                side: TabSide::Before
            }
        );
    }

    #[test]
    fn test_tab_bar_empty_area_appends() {
        let detector = DropZoneDetector::new();
        let g = group(&["a", "b"]);
        let panel = PanelId::from("x");
        let c = ctx(&panel, ElementId(7), 0, &detector);
        let p = g.propose_drop(ElementId(1), &c, Point::new(280.0, 10.0)).unwrap();
        assert_eq!(
            p.placement,
            DropPlacement::Tab {
                anchor: PanelId::from("b"),
                side: TabSide::After
            }
        );
        assert_eq!(p.preview, Rectangle::new(200.0, 0.0, 25.0, 25.0));
    }

    #[test]
    fn test_threshold() {
        let mut manager = DragManager::default();
        manager.start_panel_drag(PanelId::from("a"), ElementId(1), 0, Point::new(100.0, 100.0));
        assert!(!manager.update(Point::new(103.0, 100.0)));
        assert!(!manager.is_dragging());

        assert!(manager.update(Point::new(106.0, 100.0)));
        assert!(manager.is_dragging());
        assert!(manager.is_panel_drag());
        assert!(!manager.is_separator_drag());
    }

    #[test]
    fn test_separator_drag() {
        let mut manager = DragManager::new(0.0);
        manager.start_separator_drag(ElementId(3), Slot::First, 200.0, Point::ZERO);
        assert!(manager.is_separator_drag());
        assert!(!manager.is_panel_drag());
        manager.update(Point::new(0.0, 12.0));

        let state = manager.end_drag().unwrap();
        assert!(state.is_active);
        assert_eq!(state.current_pos.y - state.start_pos.y, 12.0);
        assert!(manager.drag_state().is_none());
    }

    #[test]
    fn test_cancel_drag() {
        let mut manager = DragManager::default();
        manager.start_panel_drag(PanelId::from("a"), ElementId(1), 0, Point::ZERO);
        manager.cancel_drag();
        assert!(manager.drag_state().is_none());
        assert!(!manager.is_dragging());
    }
}
