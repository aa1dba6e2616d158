//! Boxlayout Core
//!
//! Leaf utilities shared by the boxlayout docking engine: geometry value types,
//! math re-exports, hash collections, logging and profiling bootstrap.

pub mod alloc;
pub mod geometry;
pub mod logging;
pub mod math;
pub mod profiling;
