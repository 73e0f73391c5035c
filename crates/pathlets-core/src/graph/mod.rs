//! The sparse free-space graph, in its two flavors.

pub mod incremental;
pub mod retrieving;
