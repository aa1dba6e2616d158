//! Error types.
//!
//! [`TreeError`] is raised by the strict arena primitives in [`crate::tree`].
//! The [`crate::BoxLayout`] controller turns those into logged no-ops, so
//! callers only ever see [`LayoutError`].

use std::fmt;

use crate::types::ElementId;

/// Errors raised by layout tree primitives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// Element not found in the arena.
    ElementNotFound(ElementId),
    /// Element is not a container.
    NotAContainer(ElementId),
    /// Document groups live inside the document area and tool groups
    /// outside it; docking would mix them.
    AreaMismatch(ElementId),
    /// The root element has no parent to collapse.
    CannotRemoveRoot,
    /// Target and element are the same node.
    SameElement,
    /// Element is not attached to the tree.
    Detached(ElementId),
    /// The document area and its last group are never removed.
    DocumentNotRemovable,
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeError::ElementNotFound(id) => write!(f, "Element {} not found", id),
            TreeError::NotAContainer(id) => write!(f, "Element {} is not a container", id),
            TreeError::AreaMismatch(id) => {
                write!(f, "Element {} cannot cross the document area boundary", id)
            }
            TreeError::CannotRemoveRoot => write!(f, "Cannot remove the root element"),
            TreeError::SameElement => write!(f, "Cannot dock an element relative to itself"),
            TreeError::Detached(id) => write!(f, "Element {} is not attached to the tree", id),
            TreeError::DocumentNotRemovable => write!(f, "The document element cannot be removed"),
        }
    }
}

impl std::error::Error for TreeError {}

/// Result type for tree primitives.
pub type TreeResult<T> = Result<T, TreeError>;

/// Errors surfaced by the public [`crate::BoxLayout`] API.
#[derive(Debug)]
pub enum LayoutError {
    /// An operation was called before [`crate::BoxLayout::init`].
    NotInitialized,
    /// A persisted layout could not be parsed.
    Config(serde_json::Error),
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutError::NotInitialized => write!(f, "BoxLayout used before init()"),
            LayoutError::Config(e) => write!(f, "Invalid layout config: {}", e),
        }
    }
}

impl std::error::Error for LayoutError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LayoutError::Config(e) => Some(e),
            LayoutError::NotInitialized => None,
        }
    }
}

impl From<serde_json::Error> for LayoutError {
    fn from(e: serde_json::Error) -> Self {
        LayoutError::Config(e)
    }
}

/// Result type for controller operations.
pub type LayoutResult<T> = Result<T, LayoutError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            TreeError::ElementNotFound(ElementId(4)).to_string(),
            "Element #4 not found"
        );
        assert_eq!(
            LayoutError::NotInitialized.to_string(),
            "BoxLayout used before init()"
        );
    }

    #[test]
    fn test_config_error_source() {
        let err: LayoutError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, LayoutError::Config(_)));
        assert!(std::error::Error::source(&err).is_some());
    }
}
