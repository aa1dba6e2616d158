//! Persisted layout format.
//!
//! A snapshot mirrors the split tree: containers with their orientation and
//! explicit sizes, and leaves with the serialized form of their panels. The
//! document area nests the snapshot of its own split tree. The JSON form is
//! what hosts store between sessions.

use boxlayout_core::geometry::Rectangle;
use serde::{Deserialize, Serialize};

use crate::panel::PanelId;
use crate::tree::{ElementKind, LayoutTree};
use crate::types::{ElementId, GroupKind};

/// Current format version written by [`LayoutSnapshot`]. Version 2 nests
/// the document area's groups under `layout`.
pub const LAYOUT_VERSION: u32 = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutSnapshot {
    #[serde(default = "default_version")]
    pub version: u32,
    pub root: Option<NodeSnapshot>,
}

fn default_version() -> u32 {
    LAYOUT_VERSION
}

impl Default for LayoutSnapshot {
    fn default() -> Self {
        Self {
            version: LAYOUT_VERSION,
            root: None,
        }
    }
}

impl LayoutSnapshot {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// Every stored panel entry, in tree order.
    pub fn panels(&self) -> Vec<&str> {
        let mut out = Vec::new();
        if let Some(root) = &self.root {
            root.collect_panels(&mut out);
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NodeSnapshot {
    Container {
        is_vertical: bool,
        #[serde(default)]
        bounds: Rectangle,
        #[serde(default)]
        explicit_width: Option<f32>,
        #[serde(default)]
        explicit_height: Option<f32>,
        first: Box<NodeSnapshot>,
        second: Box<NodeSnapshot>,
    },
    Group(GroupSnapshot),
    Document(DocumentSnapshot),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentSnapshot {
    #[serde(default)]
    pub bounds: Rectangle,
    #[serde(default)]
    pub explicit_width: Option<f32>,
    #[serde(default)]
    pub explicit_height: Option<f32>,
    /// Split tree of document groups. `None` restores a single empty group.
    #[serde(default)]
    pub layout: Option<Box<NodeSnapshot>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupSnapshot {
    #[serde(default)]
    pub bounds: Rectangle,
    #[serde(default)]
    pub explicit_width: Option<f32>,
    #[serde(default)]
    pub explicit_height: Option<f32>,
    #[serde(default)]
    pub selected_index: Option<usize>,
    /// Serialized panels, see [`crate::PanelSerialize`].
    #[serde(default)]
    pub panels: Vec<String>,
}

impl NodeSnapshot {
    fn collect_panels<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            NodeSnapshot::Container { first, second, .. } => {
                first.collect_panels(out);
                second.collect_panels(out);
            }
            NodeSnapshot::Group(g) => out.extend(g.panels.iter().map(String::as_str)),
            NodeSnapshot::Document(d) => {
                if let Some(layout) = &d.layout {
                    layout.collect_panels(out);
                }
            }
        }
    }

    /// Whether the subtree contains the document area.
    pub fn has_document(&self) -> bool {
        match self {
            NodeSnapshot::Container { first, second, .. } => {
                first.has_document() || second.has_document()
            }
            NodeSnapshot::Group(_) => false,
            NodeSnapshot::Document(_) => true,
        }
    }
}

/// Snapshots the subtree under `id`. `serialize` turns a hosted panel into
/// its stored form; panels it returns `None` for are left out.
pub(crate) fn capture(
    tree: &LayoutTree,
    id: ElementId,
    serialize: &dyn Fn(&PanelId, GroupKind) -> Option<String>,
) -> Option<NodeSnapshot> {
    let node = tree.get(id)?;
    match &node.kind {
        ElementKind::Container(c) => Some(NodeSnapshot::Container {
            is_vertical: c.is_vertical,
            bounds: node.bounds,
            explicit_width: node.explicit_width,
            explicit_height: node.explicit_height,
            first: Box::new(capture(tree, c.first, serialize)?),
            second: Box::new(capture(tree, c.second, serialize)?),
        }),
        ElementKind::DocumentArea(area) => Some(NodeSnapshot::Document(DocumentSnapshot {
            bounds: node.bounds,
            explicit_width: node.explicit_width,
            explicit_height: node.explicit_height,
            layout: capture(tree, area.root, serialize).map(Box::new),
        })),
        ElementKind::Group(group) | ElementKind::Document(group) => {
            let mut panels = Vec::with_capacity(group.len());
            let mut selected_index = None;
            for (index, panel) in group.panels().iter().enumerate() {
                if let Some(info) = serialize(panel, group.kind()) {
                    if group.selected_index() == Some(index) {
                        selected_index = Some(panels.len());
                    }
                    panels.push(info);
                }
            }
            Some(NodeSnapshot::Group(GroupSnapshot {
                bounds: node.bounds,
                explicit_width: node.explicit_width,
                explicit_height: node.explicit_height,
                selected_index,
                panels,
            }))
        }
    }
}
