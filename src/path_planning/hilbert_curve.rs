//! 2D Hilbert space-filling curve
//!
//! Maps a 1D distance along the curve to integer grid coordinates and
//! back. Uses Skilling's transpose formulation ("Programming the Hilbert
//! curve", AIP Conf. Proc. 707, 2004): the distance is de-interleaved into
//! one word per axis, Gray-decoded, and the per-level rotations/reflections
//! are undone from the coarsest bit upwards.

use crate::common::{CoverageError, CoverageResult, CurveIndexer, GridCell};

/// Number of axes of the curve
const DIMENSIONS: u32 = 2;

/// Largest supported order (distance must fit into a u64)
pub const MAX_CURVE_ORDER: u32 = 32;

/// Hilbert curve of a fixed order over a `2^order x 2^order` grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HilbertCurve {
    order: u32,
}

impl HilbertCurve {
    /// Create a curve of the given order (1..=32)
    pub fn new(order: u32) -> CoverageResult<Self> {
        if order < 1 || order > MAX_CURVE_ORDER {
            return Err(CoverageError::InvalidParameter(format!(
                "curve order must be in [1, {}], got {}",
                MAX_CURVE_ORDER, order
            )));
        }
        Ok(HilbertCurve { order })
    }

    pub fn order(&self) -> u32 {
        self.order
    }

    /// Number of cells along one axis (`2^order`)
    pub fn side_length(&self) -> u64 {
        1u64 << self.order
    }

    /// Largest valid distance along the curve (`4^order - 1`)
    pub fn max_distance(&self) -> u64 {
        let bits = self.order * DIMENSIONS;
        if bits >= 64 {
            u64::MAX
        } else {
            (1u64 << bits) - 1
        }
    }

    /// Grid cell at `distance` along the curve
    pub fn point_from_distance(&self, distance: u64) -> CoverageResult<GridCell> {
        if distance > self.max_distance() {
            return Err(CoverageError::InvalidParameter(format!(
                "distance {} exceeds {} for curve order {}",
                distance,
                self.max_distance(),
                self.order
            )));
        }
        Ok(self.decode(distance))
    }

    /// Distance along the curve of a grid cell
    pub fn distance_from_point(&self, cell: GridCell) -> CoverageResult<u64> {
        let side = self.side_length();
        if cell.x as u64 >= side || cell.y as u64 >= side {
            return Err(CoverageError::InvalidParameter(format!(
                "cell ({}, {}) lies outside the {}x{} grid",
                cell.x, cell.y, side, side
            )));
        }
        Ok(self.encode(cell))
    }

    /// All cells in curve order
    pub fn points(&self) -> impl Iterator<Item = GridCell> + '_ {
        (0..=self.max_distance()).map(move |d| self.decode(d))
    }

    fn decode(&self, distance: u64) -> GridCell {
        let mut x = Self::distance_to_transpose(distance, self.order);

        // Gray decode by H ^ (H / 2)
        let t = x[1] >> 1;
        x[1] ^= x[0];
        x[0] ^= t;

        // Undo excess work
        let top = 1u64 << self.order;
        let mut q = 2u64;
        while q != top {
            let p = q - 1;
            for i in (0..DIMENSIONS as usize).rev() {
                if x[i] & q != 0 {
                    x[0] ^= p;
                } else {
                    let t = (x[0] ^ x[i]) & p;
                    x[0] ^= t;
                    x[i] ^= t;
                }
            }
            q <<= 1;
        }

        GridCell::new(x[0] as u32, x[1] as u32)
    }

    fn encode(&self, cell: GridCell) -> u64 {
        let mut x = [cell.x as u64, cell.y as u64];
        let m = 1u64 << (self.order - 1);

        // Inverse undo
        let mut q = m;
        while q > 1 {
            let p = q - 1;
            for i in 0..DIMENSIONS as usize {
                if x[i] & q != 0 {
                    x[0] ^= p;
                } else {
                    let t = (x[0] ^ x[i]) & p;
                    x[0] ^= t;
                    x[i] ^= t;
                }
            }
            q >>= 1;
        }

        // Gray encode
        x[1] ^= x[0];
        let mut t = 0u64;
        let mut q = m;
        while q > 1 {
            if x[1] & q != 0 {
                t ^= q - 1;
            }
            q >>= 1;
        }
        x[0] ^= t;
        x[1] ^= t;

        Self::transpose_to_distance(x, self.order)
    }

    /// Split the distance bits so that, level by level from the most
    /// significant pair, the high bit goes to axis 0 and the low bit to axis 1
    fn distance_to_transpose(distance: u64, order: u32) -> [u64; 2] {
        let mut x = [0u64; 2];
        for level in (0..order).rev() {
            let pair = (distance >> (level * DIMENSIONS)) & 0b11;
            x[0] |= (pair >> 1) << level;
            x[1] |= (pair & 1) << level;
        }
        x
    }

    fn transpose_to_distance(x: [u64; 2], order: u32) -> u64 {
        let mut distance = 0u64;
        for level in (0..order).rev() {
            let pair = (((x[0] >> level) & 1) << 1) | ((x[1] >> level) & 1);
            distance |= pair << (level * DIMENSIONS);
        }
        distance
    }
}

/// `CurveIndexer` backed by `HilbertCurve`
#[derive(Debug, Clone, Copy, Default)]
pub struct HilbertIndexer;

impl CurveIndexer for HilbertIndexer {
    fn index_to_coordinates(&self, order: u32, distance: u64) -> CoverageResult<GridCell> {
        HilbertCurve::new(order)?.point_from_distance(distance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use itertools::Itertools;
    use std::collections::HashSet;

    #[test]
    fn test_order_one_visits_corners() {
        let curve = HilbertCurve::new(1).unwrap();
        let cells: Vec<GridCell> = curve.points().collect();
        assert_eq!(
            cells,
            vec![
                GridCell::new(0, 0),
                GridCell::new(0, 1),
                GridCell::new(1, 1),
                GridCell::new(1, 0),
            ]
        );
    }

    #[test]
    fn test_order_two_first_quadrant() {
        let curve = HilbertCurve::new(2).unwrap();
        assert_eq!(curve.point_from_distance(0).unwrap(), GridCell::new(0, 0));
        assert_eq!(curve.point_from_distance(1).unwrap(), GridCell::new(1, 0));
        assert_eq!(curve.point_from_distance(2).unwrap(), GridCell::new(1, 1));
        assert_eq!(curve.point_from_distance(3).unwrap(), GridCell::new(0, 1));
        assert_eq!(curve.point_from_distance(4).unwrap(), GridCell::new(0, 2));
    }

    #[test]
    fn test_curve_is_continuous_and_complete() {
        for order in 1..=5 {
            let curve = HilbertCurve::new(order).unwrap();
            let cells: Vec<GridCell> = curve.points().collect();
            let side = curve.side_length();

            assert_eq!(cells.len() as u64, side * side);
            let unique: HashSet<GridCell> = cells.iter().cloned().collect();
            assert_eq!(unique.len(), cells.len());
            assert!(cells.iter().all(|c| (c.x as u64) < side && (c.y as u64) < side));

            for (a, b) in cells.iter().tuple_windows() {
                assert_eq!(a.manhattan(b), 1, "order {} jumps from {:?} to {:?}", order, a, b);
            }
        }
    }

    #[test]
    fn test_curve_ends_on_opposite_corner() {
        let curve = HilbertCurve::new(3).unwrap();
        let last = curve.point_from_distance(curve.max_distance()).unwrap();
        assert_eq!(last, GridCell::new(7, 0));
    }

    #[test]
    fn test_distance_inverts_point() {
        let curve = HilbertCurve::new(4).unwrap();
        for (x, y) in itertools::iproduct!(0..16u32, 0..16u32) {
            let cell = GridCell::new(x, y);
            let d = curve.distance_from_point(cell).unwrap();
            assert_eq!(curve.point_from_distance(d).unwrap(), cell);
        }
    }

    #[test]
    fn test_max_order_bounds() {
        let curve = HilbertCurve::new(MAX_CURVE_ORDER).unwrap();
        assert_eq!(curve.max_distance(), u64::MAX);
        let last = curve.point_from_distance(u64::MAX).unwrap();
        assert_eq!(curve.distance_from_point(last).unwrap(), u64::MAX);
    }

    #[test]
    fn test_invalid_order() {
        assert!(matches!(HilbertCurve::new(0), Err(CoverageError::InvalidParameter(_))));
        assert!(matches!(
            HilbertCurve::new(MAX_CURVE_ORDER + 1),
            Err(CoverageError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_out_of_range_inputs() {
        let curve = HilbertCurve::new(3).unwrap();
        assert!(curve.point_from_distance(64).is_err());
        assert!(curve.distance_from_point(GridCell::new(8, 0)).is_err());
    }

    #[test]
    fn test_indexer_matches_curve() {
        let curve = HilbertCurve::new(3).unwrap();
        let indexer = HilbertIndexer;
        for d in 0..64 {
            assert_eq!(
                indexer.index_to_coordinates(3, d).unwrap(),
                curve.point_from_distance(d).unwrap()
            );
        }
        assert!(indexer.index_to_coordinates(0, 0).is_err());
    }
}
