//! Drop zone detection for re-docking dragged panels.

use boxlayout_core::geometry::{Point, Rectangle};

use crate::types::{DropZone, Position};

/// Default edge band, as a fraction of the target's shorter side.
pub const DEFAULT_EDGE_BAND: f32 = 1.0 / 3.0;

/// Divides a target rectangle into five drop zones.
///
/// A pointer within `edge_band * min(width, height)` pixels of an edge
/// selects that edge. Near a corner the closer edge wins. Everything else is
/// [`DropZone::Center`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DropZoneDetector {
    /// Edge band as a fraction (0.05-0.5).
    pub edge_band: f32,
}

impl Default for DropZoneDetector {
    fn default() -> Self {
        Self {
            edge_band: DEFAULT_EDGE_BAND,
        }
    }
}

impl DropZoneDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a detector with a custom edge band.
    pub fn with_edge_band(mut self, band: f32) -> Self {
        self.edge_band = band.clamp(0.05, 0.5);
        self
    }

    /// Returns `None` if `p` is outside `bounds` or the bounds have no area.
    pub fn detect_zone(&self, p: Point, bounds: Rectangle) -> Option<DropZone> {
        if bounds.is_empty() || !bounds.contains(p) {
            return None;
        }

        let band = self.edge_band * bounds.width.min(bounds.height);
        let distances = [
            (Position::Left, p.x - bounds.x),
            (Position::Right, bounds.right() - p.x),
            (Position::Top, p.y - bounds.y),
            (Position::Bottom, bounds.bottom() - p.y),
        ];

        let (edge, distance) = distances
            .into_iter()
            .fold((Position::Left, f32::INFINITY), |best, (edge, d)| {
                if d < best.1 { (edge, d) } else { best }
            });

        if distance < band {
            Some(DropZone::Edge(edge))
        } else {
            Some(DropZone::Center)
        }
    }

    /// Where a dropped panel would land: the half of `target` on the zone's
    /// side, or all of it for the center.
    pub fn preview_bounds(&self, zone: DropZone, target: Rectangle) -> Rectangle {
        let half_w = target.width * 0.5;
        let half_h = target.height * 0.5;
        match zone {
            DropZone::Edge(Position::Left) => {
                Rectangle::new(target.x, target.y, half_w, target.height)
            }
            DropZone::Edge(Position::Right) => {
                Rectangle::new(target.x + half_w, target.y, half_w, target.height)
            }
            DropZone::Edge(Position::Top) => {
                Rectangle::new(target.x, target.y, target.width, half_h)
            }
            DropZone::Edge(Position::Bottom) => {
                Rectangle::new(target.x, target.y + half_h, target.width, half_h)
            }
            DropZone::Center => target,
        }
    }
}
