//! Hilbert-curve coverage waypoint generation
//!
//! Samples a 2D Hilbert curve of a given order and scales its grid
//! coordinates into a square cell, producing an ordered waypoint sequence
//! for a waypoint-following navigator.
//!
//! The curve resolution must equal `2^order`. With that constraint the
//! sequence visits every grid cell exactly once, the last index
//! (`resolution^2 - 1`) is the final cell of the curve, and every
//! coordinate stays inside `[0, cell_size]`.

use crate::common::{
    CoverageError, CoveragePlanner, CoverageResult, CurveIndexer, Point2D, WaypointSequence,
};
use crate::path_planning::hilbert_curve::HilbertIndexer;

/// Largest curve order accepted for coverage (4^12 waypoints)
pub const MAX_COVERAGE_ORDER: u32 = 12;

/// Parameters of one coverage request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoverageParameters {
    /// Edge length of the square cell [m]
    pub cell_size: f64,
    /// Hilbert curve order (recursion depth)
    pub curve_order: u32,
    /// Number of samples along one axis
    pub curve_resolution: u32,
}

impl CoverageParameters {
    pub fn new(cell_size: f64, curve_order: u32, curve_resolution: u32) -> Self {
        CoverageParameters {
            cell_size,
            curve_order,
            curve_resolution,
        }
    }

    /// Parameters whose resolution matches the curve's native grid
    pub fn from_order(cell_size: f64, curve_order: u32) -> CoverageResult<Self> {
        if curve_order < 1 || curve_order > MAX_COVERAGE_ORDER {
            return Err(CoverageError::InvalidParameter(format!(
                "curve_order must be in [1, {}], got {}",
                MAX_COVERAGE_ORDER, curve_order
            )));
        }
        let params = Self::new(cell_size, curve_order, 1u32 << curve_order);
        params.validate()?;
        Ok(params)
    }

    /// Number of waypoints a valid request produces
    pub fn waypoint_count(&self) -> usize {
        self.curve_resolution as usize * self.curve_resolution as usize
    }

    /// Distance between neighbouring grid samples [m]
    pub fn spacing(&self) -> f64 {
        self.cell_size / (self.curve_resolution as f64 - 1.0)
    }

    pub fn validate(&self) -> CoverageResult<()> {
        if !self.cell_size.is_finite() || self.cell_size <= 0.0 {
            return Err(CoverageError::InvalidParameter(format!(
                "cell_size must be a positive number, got {}",
                self.cell_size
            )));
        }
        if self.curve_order < 1 || self.curve_order > MAX_COVERAGE_ORDER {
            return Err(CoverageError::InvalidParameter(format!(
                "curve_order must be in [1, {}], got {}",
                MAX_COVERAGE_ORDER, self.curve_order
            )));
        }
        if self.curve_resolution <= 1 {
            return Err(CoverageError::InvalidParameter(format!(
                "curve_resolution must be greater than 1, got {}",
                self.curve_resolution
            )));
        }
        let native = 1u32 << self.curve_order;
        if self.curve_resolution != native {
            return Err(CoverageError::InvalidParameter(format!(
                "curve_resolution {} does not match the native resolution {} of an order {} curve",
                self.curve_resolution, native, self.curve_order
            )));
        }
        Ok(())
    }
}

/// Generates coverage waypoints from a space-filling curve
#[derive(Debug, Clone, Default)]
pub struct CoverageWaypointGenerator<C = HilbertIndexer> {
    indexer: C,
}

impl CoverageWaypointGenerator<HilbertIndexer> {
    pub fn new() -> Self {
        CoverageWaypointGenerator {
            indexer: HilbertIndexer,
        }
    }
}

impl<C: CurveIndexer> CoverageWaypointGenerator<C> {
    /// Use a different curve implementation
    pub fn with_indexer(indexer: C) -> Self {
        CoverageWaypointGenerator { indexer }
    }

    pub fn generate(&self, params: &CoverageParameters) -> CoverageResult<WaypointSequence> {
        params.validate()?;

        let last_sample = params.curve_resolution as f64 - 1.0;
        let count = params.waypoint_count();
        let mut waypoints = WaypointSequence::with_capacity(count);

        for distance in 0..count as u64 {
            let cell = self.indexer.index_to_coordinates(params.curve_order, distance)?;
            waypoints.push(Point2D::new(
                cell.x as f64 / last_sample * params.cell_size,
                cell.y as f64 / last_sample * params.cell_size,
            ));
        }

        log::debug!(
            "generated {} coverage waypoints (order {}, cell {:.3} m, spacing {:.3} m)",
            waypoints.len(),
            params.curve_order,
            params.cell_size,
            params.spacing()
        );
        Ok(waypoints)
    }
}

impl<C: CurveIndexer> CoveragePlanner for CoverageWaypointGenerator<C> {
    type Params = CoverageParameters;

    fn plan_coverage(&self, params: &Self::Params) -> CoverageResult<WaypointSequence> {
        self.generate(params)
    }
}

/// Generate Hilbert coverage waypoints with the default curve
pub fn generate(params: &CoverageParameters) -> CoverageResult<WaypointSequence> {
    CoverageWaypointGenerator::new().generate(params)
}
