//! Common types, traits, and error definitions for coverage_navigation
//!
//! This module provides the foundational building blocks shared by the
//! curve generator, the coverage planner and the mission layer.

pub mod types;
pub mod traits;
pub mod error;

pub use types::*;
pub use traits::*;
pub use error::*;
