//! Hash collections used across boxlayout.
//!
//! The engine keys its registries by short strings (panel ids), where AHash
//! is noticeably faster than SipHash.

pub use ahash::{AHashMap as HashMap, AHashSet as HashSet, RandomState};
