//! Common traits defining interfaces for coverage planning

use crate::common::types::*;
use crate::common::error::CoverageResult;

/// Maps a distance along a 2D space-filling curve to grid coordinates.
///
/// Any correct Hilbert implementation (table-based, bit-interleaving or
/// recursive) can sit behind this trait. Coordinates lie in
/// `[0, 2^order - 1]` on both axes.
pub trait CurveIndexer {
    /// Grid coordinates of the cell at `distance` along a curve of `order`
    fn index_to_coordinates(&self, order: u32, distance: u64) -> CoverageResult<GridCell>;
}

/// Trait for coverage path planners that sweep a whole region
pub trait CoveragePlanner {
    /// Parameter set describing the region and sweep resolution
    type Params;

    /// Produce the ordered waypoint sequence covering the region
    fn plan_coverage(&self, params: &Self::Params) -> CoverageResult<WaypointSequence>;
}

/// Trait for visualizable algorithms
pub trait Visualizable {
    /// Draw current state to visualizer
    fn visualize(&self, vis: &mut crate::utils::Visualizer);
}
