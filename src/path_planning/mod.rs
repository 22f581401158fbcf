// Coverage path planning module

pub mod hilbert_curve;
pub mod coverage_waypoints;

pub use hilbert_curve::*;
pub use coverage_waypoints::*;
