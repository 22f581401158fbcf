//! coverage_navigation - Hilbert-curve coverage missions for mobile robots
//!
//! Generates waypoints along a Hilbert space-filling curve inside a square
//! cell, turns them into stamped poses and hands them to a waypoint
//! navigator that executes them in order.

// Core modules
pub mod common;
pub mod config;
pub mod utils;

// Algorithm modules
pub mod path_planning;
pub mod mission_planning;

// Re-export common types for convenience
pub use common::{Point2D, Point3D, Pose2D, Path2D, GridCell, Waypoint, WaypointSequence};
pub use common::{CurveIndexer, CoveragePlanner, Visualizable};
pub use common::{CoverageError, CoverageResult};
pub use config::MissionConfig;
pub use path_planning::{generate, CoverageParameters, CoverageWaypointGenerator, HilbertCurve};
