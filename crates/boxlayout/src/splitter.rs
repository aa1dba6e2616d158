//! Split containers and the lock/stretch sizing algorithm.
//!
//! Along the split axis one child is the *lock* element, which gets the size
//! it asked for as far as the constraints allow, and the other is the
//! *stretch* element, which fills whatever is left. The functions here are
//! pure; [`crate::tree::LayoutTree`] feeds them the children's constraints.

use std::fmt;

use boxlayout_core::geometry::{Point, Rectangle};

use crate::render::Render;
use crate::types::ElementId;

/// Default gap between the two children of a container.
pub const DEFAULT_GAP: f32 = 1.0;

/// Default thickness of the separator hit area in pixels.
pub const DEFAULT_SEPARATOR_SIZE: f32 = 6.0;

/// Which child of a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    First,
    Second,
}

impl Slot {
    pub fn other(&self) -> Slot {
        match self {
            Slot::First => Slot::Second,
            Slot::Second => Slot::First,
        }
    }
}

/// What a child contributes to the split along one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitChild {
    pub min: f32,
    pub explicit: Option<f32>,
    pub priority: i32,
}

impl SplitChild {
    pub fn new(min: f32, explicit: Option<f32>, priority: i32) -> Self {
        Self {
            min,
            explicit,
            priority,
        }
    }
}

/// Sizes granted along the split axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitSizes {
    pub first: f32,
    pub second: f32,
    pub lock: Slot,
}

impl SplitSizes {
    pub fn get(&self, slot: Slot) -> f32 {
        match slot {
            Slot::First => self.first,
            Slot::Second => self.second,
        }
    }
}

/// Picks the child whose size is fixed.
///
/// A single explicit size locks its owner. When both are explicit the higher
/// priority locks. When neither is, the lower priority locks so the higher
/// priority stretches. Ties lock `first`.
pub fn lock_slot(first: &SplitChild, second: &SplitChild) -> Slot {
    match (first.explicit, second.explicit) {
        (Some(_), None) => Slot::First,
        (None, Some(_)) => Slot::Second,
        (Some(_), Some(_)) => {
            if second.priority > first.priority {
                Slot::Second
            } else {
                Slot::First
            }
        }
        (None, None) => {
            if first.priority > second.priority {
                Slot::Second
            } else {
                Slot::First
            }
        }
    }
}

/// Divides `total` pixels between two children separated by `gap`.
///
/// The result may exceed `total` when the minimums do not fit; the overflow
/// is left to the host to clip.
pub fn split(total: f32, gap: f32, first: &SplitChild, second: &SplitChild) -> SplitSizes {
    let lock = lock_slot(first, second);
    let (locked, stretched) = match lock {
        Slot::First => (first, second),
        Slot::Second => (second, first),
    };

    let request = locked
        .explicit
        .unwrap_or_else(|| ((total - gap) * 0.5).max(0.0));
    let lock_size = request.min(total - stretched.min - gap).max(locked.min);
    let stretch_size = (total - lock_size - gap).max(stretched.min);

    match lock {
        Slot::First => SplitSizes {
            first: lock_size,
            second: stretch_size,
            lock,
        },
        Slot::Second => SplitSizes {
            first: stretch_size,
            second: lock_size,
            lock,
        },
    }
}

/// Minimum size of a container from its children's minimums, as `(w, h)`.
pub fn container_min(
    is_vertical: bool,
    gap: f32,
    first: (f32, f32),
    second: (f32, f32),
) -> (f32, f32) {
    if is_vertical {
        (first.0.max(second.0), first.1 + gap + second.1)
    } else {
        (first.0 + second.0 + gap, first.1.max(second.1))
    }
}

/// Binary split node.
pub struct BoxContainer {
    pub first: ElementId,
    pub second: ElementId,
    /// `true` stacks children top/bottom, `false` side by side.
    pub is_vertical: bool,
    pub gap: f32,
    pub separator_bounds: Rectangle,
    pub(crate) separator: Box<dyn Render>,
}

impl fmt::Debug for BoxContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoxContainer")
            .field("first", &self.first)
            .field("second", &self.second)
            .field("is_vertical", &self.is_vertical)
            .field("gap", &self.gap)
            .field("separator_bounds", &self.separator_bounds)
            .finish()
    }
}

impl BoxContainer {
    pub fn new(
        first: ElementId,
        second: ElementId,
        is_vertical: bool,
        gap: f32,
        separator: Box<dyn Render>,
    ) -> Self {
        Self {
            first,
            second,
            is_vertical,
            gap: gap.max(0.0),
            separator_bounds: Rectangle::ZERO,
            separator,
        }
    }

    pub fn child(&self, slot: Slot) -> ElementId {
        match slot {
            Slot::First => self.first,
            Slot::Second => self.second,
        }
    }

    pub fn slot_of(&self, id: ElementId) -> Option<Slot> {
        if self.first == id {
            Some(Slot::First)
        } else if self.second == id {
            Some(Slot::Second)
        } else {
            None
        }
    }

    pub(crate) fn set_child(&mut self, slot: Slot, id: ElementId) {
        match slot {
            Slot::First => self.first = id,
            Slot::Second => self.second = id,
        }
    }

    /// Extent of `r` along the split axis.
    pub fn axis_size(&self, r: &Rectangle) -> f32 {
        if self.is_vertical { r.height } else { r.width }
    }

    /// Component of a pointer delta along the split axis.
    pub fn axis_delta(&self, from: Point, to: Point) -> f32 {
        if self.is_vertical {
            to.y - from.y
        } else {
            to.x - from.x
        }
    }

    /// Child rectangles for `bounds`, the second one starting `gap` pixels
    /// after the end of the first.
    pub fn child_rects(&self, bounds: &Rectangle, sizes: &SplitSizes) -> (Rectangle, Rectangle) {
        if self.is_vertical {
            let first = Rectangle::new(bounds.x, bounds.y, bounds.width, sizes.first);
            let second = Rectangle::new(
                bounds.x,
                first.bottom() + self.gap,
                bounds.width,
                sizes.second,
            );
            (first, second)
        } else {
            let first = Rectangle::new(bounds.x, bounds.y, sizes.first, bounds.height);
            let second = Rectangle::new(
                first.right() + self.gap,
                bounds.y,
                sizes.second,
                bounds.height,
            );
            (first, second)
        }
    }

    /// Separator hit area centered on the gap after `first`.
    pub fn separator_rect(&self, bounds: &Rectangle, first: &Rectangle, size: f32) -> Rectangle {
        let size = size.max(self.gap);
        if self.is_vertical {
            let center = first.bottom() + self.gap * 0.5;
            Rectangle::new(bounds.x, center - size * 0.5, bounds.width, size)
        } else {
            let center = first.right() + self.gap * 0.5;
            Rectangle::new(center - size * 0.5, bounds.y, size, bounds.height)
        }
    }

    /// New explicit size for the lock child after the separator moved `delta`
    /// pixels along the axis since the drag started.
    ///
    /// Moving the separator towards the second child grows `first`.
    pub fn apply_drag_delta_from_original(&self, start_size: f32, delta: f32, lock: Slot) -> f32 {
        let size = match lock {
            Slot::First => start_size + delta,
            Slot::Second => start_size - delta,
        };
        size.max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::HeadlessRender;

    fn container(is_vertical: bool, gap: f32) -> BoxContainer {
        BoxContainer::new(
            ElementId(1),
            ElementId(2),
            is_vertical,
            gap,
            Box::new(HeadlessRender::default()),
        )
    }

    #[test]
    fn test_single_explicit_locks() {
        let a = SplitChild::new(50.0, Some(200.0), 0);
        let doc = SplitChild::new(0.0, None, i32::MAX);
        let sizes = split(800.0, 2.0, &a, &doc);
        assert_eq!(sizes.lock, Slot::First);
        assert_eq!(sizes.first, 200.0);
        assert_eq!(sizes.second, 598.0);
    }

    #[test]
    fn test_conflict_priority_wins() {
        let low = SplitChild::new(50.0, Some(150.0), 1);
        let high = SplitChild::new(50.0, Some(200.0), 2);
        let sizes = split(300.0, 2.0, &low, &high);
        assert_eq!(sizes.lock, Slot::Second);
        assert_eq!(sizes.second, 200.0);
        assert_eq!(sizes.first, 98.0);
    }

    #[test]
    fn test_lock_clamped_by_stretch_min() {
        let a = SplitChild::new(50.0, Some(700.0), 0);
        let b = SplitChild::new(200.0, None, 0);
        let sizes = split(800.0, 2.0, &a, &b);
        assert_eq!(sizes.first, 598.0);
        assert_eq!(sizes.second, 200.0);
    }

    #[test]
    fn test_overflow_when_minimums_do_not_fit() {
        let a = SplitChild::new(100.0, Some(100.0), 0);
        let b = SplitChild::new(100.0, None, 0);
        let sizes = split(150.0, 2.0, &a, &b);
        assert_eq!(sizes.first, 100.0);
        assert_eq!(sizes.second, 100.0);
    }

    #[test]
    fn test_no_explicit_splits_evenly() {
        let a = SplitChild::new(0.0, None, 0);
        let b = SplitChild::new(0.0, None, 0);
        let sizes = split(102.0, 2.0, &a, &b);
        assert_eq!(sizes.first, 50.0);
        assert_eq!(sizes.second, 50.0);
    }

    #[test]
    fn test_without_explicit_higher_priority_stretches() {
        let high = SplitChild::new(300.0, None, 5);
        let low = SplitChild::new(0.0, None, 1);
        assert_eq!(lock_slot(&high, &low), Slot::Second);
        assert_eq!(lock_slot(&low, &high), Slot::First);
        assert_eq!(lock_slot(&low, &low), Slot::First);

        // the lower priority asks for half but yields to the other's minimum
        let sizes = split(502.0, 2.0, &high, &low);
        assert_eq!(sizes.second, 200.0);
        assert_eq!(sizes.first, 300.0);
    }

    #[test]
    fn test_tiling_without_overflow() {
        for (total, gap) in [(0.0, 0.0), (10.0, 2.0), (333.0, 1.0), (1024.0, 7.5)] {
            for explicit in [None, Some(0.0), Some(40.0), Some(5000.0)] {
                let a = SplitChild::new(0.0, explicit, 0);
                let b = SplitChild::new(0.0, None, 0);
                let sizes = split(total, gap, &a, &b);
                assert_eq!(sizes.first + gap + sizes.second, total);
            }
        }
    }

    #[test]
    fn test_container_min() {
        assert_eq!(container_min(false, 2.0, (50.0, 30.0), (60.0, 80.0)), (112.0, 80.0));
        assert_eq!(container_min(true, 2.0, (50.0, 30.0), (60.0, 80.0)), (60.0, 112.0));
    }

    #[test]
    fn test_child_rects_and_separator() {
        let c = container(false, 2.0);
        let bounds = Rectangle::new(0.0, 0.0, 800.0, 600.0);
        let sizes = SplitSizes {
            first: 200.0,
            second: 598.0,
            lock: Slot::First,
        };
        let (first, second) = c.child_rects(&bounds, &sizes);
        assert_eq!(first, Rectangle::new(0.0, 0.0, 200.0, 600.0));
        assert_eq!(second, Rectangle::new(202.0, 0.0, 598.0, 600.0));

        let sep = c.separator_rect(&bounds, &first, 6.0);
        assert_eq!(sep, Rectangle::new(198.0, 0.0, 6.0, 600.0));
    }

    #[test]
    fn test_vertical_child_rects() {
        let c = container(true, 1.0);
        let bounds = Rectangle::new(10.0, 20.0, 100.0, 201.0);
        let sizes = SplitSizes {
            first: 100.0,
            second: 100.0,
            lock: Slot::First,
        };
        let (first, second) = c.child_rects(&bounds, &sizes);
        assert_eq!(second.y, 121.0);
        assert_eq!(second.bottom(), bounds.bottom());
        assert_eq!(first.width, 100.0);
    }

    #[test]
    fn test_drag_delta_sign() {
        let c = container(false, 2.0);
        assert_eq!(c.apply_drag_delta_from_original(200.0, 30.0, Slot::First), 230.0);
        assert_eq!(c.apply_drag_delta_from_original(200.0, 30.0, Slot::Second), 170.0);
        assert_eq!(c.apply_drag_delta_from_original(10.0, -30.0, Slot::First), 0.0);
    }
}
