//! Mission configuration
//!
//! Loaded from TOML. Every section and field is optional; omitted values
//! fall back to the stock coverage mission (5.5 m cell,
//! order 3 curve, `map` frame, robot starting at the origin).
//!
//! ```toml
//! [coverage]
//! cell_size = 5.5
//! curve_order = 3
//!
//! [navigation]
//! frame_id = "map"
//! initial_pose = { x = 0.0, y = 0.0, yaw = 0.0 }
//! activation_timeout_secs = 30.0
//!
//! [simulation]
//! speed = 0.5
//! time_scale = 0.0
//! position_noise = 0.0
//! ```

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::common::{CoverageError, CoverageResult, Point2D, Pose2D};
use crate::mission_planning::messages::MAP_FRAME;
use crate::mission_planning::simulated_navigator::{ReachableArea, SimulatedNavigatorConfig};
use crate::path_planning::CoverageParameters;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoverageSection {
    /// Edge length of the square cell [m]
    pub cell_size: f64,
    pub curve_order: u32,
    /// Samples per axis; defaults to `2^curve_order`
    pub curve_resolution: Option<u32>,
}

impl Default for CoverageSection {
    fn default() -> Self {
        Self {
            cell_size: 5.5,
            curve_order: 3,
            curve_resolution: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InitialPose {
    pub x: f64,
    pub y: f64,
    pub yaw: f64,
}

impl Default for InitialPose {
    fn default() -> Self {
        Self { x: 0.0, y: 0.0, yaw: 0.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NavigationSection {
    pub frame_id: String,
    pub initial_pose: InitialPose,
    pub activation_timeout_secs: f64,
}

impl Default for NavigationSection {
    fn default() -> Self {
        Self {
            frame_id: MAP_FRAME.to_string(),
            initial_pose: InitialPose::default(),
            activation_timeout_secs: 30.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationSection {
    pub speed: f64,
    pub time_scale: f64,
    pub position_noise: f64,
    pub activation_delay_secs: f64,
    /// `[xmin, ymin, xmax, ymax]`
    pub reachable_area: Option<[f64; 4]>,
}

impl Default for SimulationSection {
    fn default() -> Self {
        Self {
            speed: 0.5,
            time_scale: 0.0,
            position_noise: 0.0,
            activation_delay_secs: 0.0,
            reachable_area: None,
        }
    }
}

/// Top-level mission configuration
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MissionConfig {
    pub coverage: CoverageSection,
    pub navigation: NavigationSection,
    pub simulation: SimulationSection,
}

impl MissionConfig {
    /// Read and validate a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> CoverageResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        log::info!("loading mission config from {}", path.as_ref().display());
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> CoverageResult<Self> {
        let config: MissionConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> CoverageResult<()> {
        self.coverage_parameters()?.validate()?;
        if self.navigation.frame_id.is_empty() {
            return Err(CoverageError::ConfigError("navigation.frame_id is empty".to_string()));
        }
        self.activation_timeout()?;
        self.simulated_navigator_config()?;
        if let Some([xmin, ymin, xmax, ymax]) = self.simulation.reachable_area {
            if xmin > xmax || ymin > ymax {
                return Err(CoverageError::ConfigError(
                    "simulation.reachable_area must be [xmin, ymin, xmax, ymax]".to_string(),
                ));
            }
        }
        Ok(())
    }

    pub fn coverage_parameters(&self) -> CoverageResult<CoverageParameters> {
        let order = self.coverage.curve_order;
        let resolution = match self.coverage.curve_resolution {
            Some(r) => r,
            None => 1u32.checked_shl(order).ok_or_else(|| {
                CoverageError::InvalidParameter(format!("curve_order {} is too large", order))
            })?,
        };
        Ok(CoverageParameters::new(self.coverage.cell_size, order, resolution))
    }

    pub fn initial_pose(&self) -> Pose2D {
        let p = &self.navigation.initial_pose;
        Pose2D::new(p.x, p.y, p.yaw)
    }

    pub fn activation_timeout(&self) -> CoverageResult<Duration> {
        Self::seconds("navigation.activation_timeout_secs", self.navigation.activation_timeout_secs)
    }

    pub fn simulated_navigator_config(&self) -> CoverageResult<SimulatedNavigatorConfig> {
        let sim = &self.simulation;
        Ok(SimulatedNavigatorConfig {
            speed: sim.speed,
            time_scale: sim.time_scale,
            position_noise: sim.position_noise,
            activation_delay: Self::seconds("simulation.activation_delay_secs", sim.activation_delay_secs)?,
            reachable: sim.reachable_area.map(|[xmin, ymin, xmax, ymax]| {
                ReachableArea::new(Point2D::new(xmin, ymin), Point2D::new(xmax, ymax))
            }),
        })
    }

    /// Non-negative seconds that fit in a `Duration`
    fn seconds(name: &str, secs: f64) -> CoverageResult<Duration> {
        Duration::try_from_secs_f64(secs).map_err(|e| {
            CoverageError::ConfigError(format!(
                "{} must be a non-negative number of seconds, got {} ({})",
                name, secs, e
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mission_planning::FullCoverageMission;

    #[test]
    fn test_defaults_match_stock_mission() {
        let config = MissionConfig::from_toml_str("").unwrap();
        let params = config.coverage_parameters().unwrap();
        assert_eq!(params, CoverageParameters::new(5.5, 3, 8));
        assert_eq!(config.navigation.frame_id, "map");
        assert_eq!(config.initial_pose(), Pose2D::origin());
    }

    #[test]
    fn test_parse_full_config() {
        let text = r#"
            [coverage]
            cell_size = 4.0
            curve_order = 2

            [navigation]
            frame_id = "odom"
            initial_pose = { x = 1.0, y = -1.0, yaw = 0.5 }
            activation_timeout_secs = 2.5

            [simulation]
            speed = 1.2
            position_noise = 0.01
            reachable_area = [0.0, 0.0, 3.0, 3.0]
        "#;
        let config = MissionConfig::from_toml_str(text).unwrap();
        assert_eq!(config.coverage_parameters().unwrap(), CoverageParameters::new(4.0, 2, 4));
        assert_eq!(config.navigation.frame_id, "odom");
        assert_eq!(config.initial_pose(), Pose2D::new(1.0, -1.0, 0.5));
        assert_eq!(config.activation_timeout().unwrap(), Duration::from_millis(2500));

        let sim = config.simulated_navigator_config().unwrap();
        assert_eq!(sim.speed, 1.2);
        assert_eq!(sim.time_scale, 0.0);
        assert_eq!(
            sim.reachable,
            Some(ReachableArea::new(Point2D::origin(), Point2D::new(3.0, 3.0)))
        );
    }

    #[test]
    fn test_mismatched_resolution_rejected() {
        let text = "[coverage]\ncurve_order = 3\ncurve_resolution = 10\n";
        assert!(matches!(
            MissionConfig::from_toml_str(text),
            Err(CoverageError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let text = "[coverage]\ncell_sise = 3.0\n";
        assert!(matches!(
            MissionConfig::from_toml_str(text),
            Err(CoverageError::ConfigError(_))
        ));
    }

    #[test]
    fn test_negative_timeout_rejected() {
        let text = "[navigation]\nactivation_timeout_secs = -1.0\n";
        assert!(MissionConfig::from_toml_str(text).is_err());
    }

    #[test]
    fn test_oversized_durations_rejected() {
        for text in [
            "[navigation]\nactivation_timeout_secs = 1e30\n",
            "[simulation]\nactivation_delay_secs = 1e30\n",
            "[navigation]\nactivation_timeout_secs = inf\n",
            "[simulation]\nactivation_delay_secs = nan\n",
        ] {
            assert!(matches!(
                MissionConfig::from_toml_str(text),
                Err(CoverageError::ConfigError(_))
            ), "accepted {:?}", text);
        }

        let mut config = MissionConfig::default();
        config.navigation.activation_timeout_secs = 1e30;
        assert!(config.activation_timeout().is_err());
        config.navigation.activation_timeout_secs = 30.0;
        config.simulation.activation_delay_secs = 1e30;
        assert!(config.simulated_navigator_config().is_err());
        assert!(FullCoverageMission::new(config).is_err());
    }

    #[test]
    fn test_load_shipped_config() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config/full_coverage.toml");
        let config = MissionConfig::load(path).unwrap();
        assert_eq!(config.coverage_parameters().unwrap().waypoint_count(), 64);
        assert_eq!(config.simulation.position_noise, 0.02);
    }

    #[test]
    fn test_missing_file() {
        let err = MissionConfig::load("/nonexistent/mission.toml").unwrap_err();
        assert!(matches!(err, CoverageError::IoError(_)));
    }
}
