//! Shared types for the layout engine.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Handle to an element stored in the layout arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub usize);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Side of a target element where a new element is docked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    Left,
    Right,
    Top,
    Bottom,
}

impl Position {
    pub const ALL: [Position; 4] = [
        Position::Left,
        Position::Right,
        Position::Top,
        Position::Bottom,
    ];

    /// `true` when docking here produces a vertical (top/bottom) split.
    pub fn is_vertical(&self) -> bool {
        matches!(self, Position::Top | Position::Bottom)
    }

    /// Check if the docked element goes before the target.
    pub fn is_before(&self) -> bool {
        matches!(self, Position::Left | Position::Top)
    }

    /// The position a child occupies in a container of the given orientation.
    pub fn of_child(is_vertical: bool, is_first: bool) -> Self {
        match (is_vertical, is_first) {
            (false, true) => Position::Left,
            (false, false) => Position::Right,
            (true, true) => Position::Top,
            (true, false) => Position::Bottom,
        }
    }
}

/// Drop region of a drag target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DropZone {
    Edge(Position),
    /// Join the target group as a tab.
    Center,
}

impl DropZone {
    pub fn position(&self) -> Option<Position> {
        match self {
            DropZone::Edge(p) => Some(*p),
            DropZone::Center => None,
        }
    }

    pub fn is_center(&self) -> bool {
        matches!(self, DropZone::Center)
    }
}

/// Which focus lane a tab group belongs to.
///
/// Tool groups and the document area keep independent "last active" groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GroupKind {
    #[default]
    Tool,
    Document,
}

/// Side of an anchor tab where a dragged tab is inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TabSide {
    Before,
    After,
}
