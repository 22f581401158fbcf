//! Utility modules for coverage_navigation

pub mod visualization;

pub use visualization::{Visualizer, PathStyle, PointStyle, colors};
