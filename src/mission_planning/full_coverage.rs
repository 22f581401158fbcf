//! Full coverage mission
//!
//! Generates the Hilbert coverage waypoints for one cell, converts them to
//! stamped poses and runs them on a `WaypointNavigator`, blocking on the
//! task channel until the navigator reports a result.

use itertools::Itertools;

use crate::common::{CoverageResult, Point2D, Visualizable, WaypointSequence};
use crate::config::MissionConfig;
use crate::mission_planning::messages::{PoseStamped, Time};
use crate::mission_planning::navigator::{TaskResult, WaypointNavigator};
use crate::path_planning::{CoverageParameters, CoverageWaypointGenerator};
use crate::utils::{colors, PathStyle, PointStyle, Visualizer};

/// Summary of a finished coverage run
#[derive(Debug, Clone, PartialEq)]
pub struct MissionReport {
    pub waypoints: WaypointSequence,
    pub cell_size: f64,
    pub path_length: f64,
    pub result: TaskResult,
}

impl MissionReport {
    pub fn waypoint_count(&self) -> usize {
        self.waypoints.len()
    }
}

impl Visualizable for MissionReport {
    fn visualize(&self, vis: &mut Visualizer) {
        let s = self.cell_size;
        vis.plot_cell_boundary(s);
        vis.plot_path(&self.waypoints, &PathStyle::new(colors::PATH, "Coverage path"));
        vis.plot_points(
            &self.waypoints.points,
            &PointStyle::new(colors::WAYPOINT, "Waypoints").with_size(0.6),
        );
        if let Some(start) = self.waypoints.first() {
            vis.plot_start(*start);
        }
        if let Some(goal) = self.waypoints.last() {
            vis.plot_goal(*goal);
        }
        if let TaskResult::Failed { missed_waypoints } = &self.result {
            let missed: Vec<Point2D> = missed_waypoints
                .iter()
                .filter_map(|&i| self.waypoints.points.get(i).copied())
                .collect();
            vis.plot_points(&missed, &PointStyle::new(colors::MISSED, "Missed").with_symbol('X'));
        }
    }
}

/// Coverage mission over a single square cell
pub struct FullCoverageMission {
    config: MissionConfig,
    generator: CoverageWaypointGenerator,
}

impl FullCoverageMission {
    pub fn new(config: MissionConfig) -> CoverageResult<Self> {
        config.validate()?;
        Ok(FullCoverageMission {
            config,
            generator: CoverageWaypointGenerator::new(),
        })
    }

    pub fn config(&self) -> &MissionConfig {
        &self.config
    }

    pub fn parameters(&self) -> CoverageResult<CoverageParameters> {
        self.config.coverage_parameters()
    }

    /// Coverage waypoints for the configured cell
    pub fn waypoints(&self) -> CoverageResult<WaypointSequence> {
        self.generator.generate(&self.parameters()?)
    }

    /// Waypoints as poses in the configured frame, sharing one stamp
    pub fn poses(&self, waypoints: &WaypointSequence) -> Vec<PoseStamped> {
        let stamp = Time::now();
        let frame = &self.config.navigation.frame_id;
        waypoints
            .iter()
            .map(|w| PoseStamped::from_waypoint(frame, stamp, w))
            .collect()
    }

    /// Execute the mission and block until the navigator finishes
    pub fn run<N: WaypointNavigator>(&self, navigator: &mut N) -> CoverageResult<MissionReport> {
        let waypoints = self.waypoints()?;
        let params = self.parameters()?;
        let path_length = waypoints.total_length();
        let longest_leg = waypoints
            .iter()
            .tuple_windows()
            .map(|(a, b)| a.distance(b))
            .fold(0.0, f64::max);
        log::info!(
            "coverage of {:.2} m cell: {} waypoints, path length {:.2} m, longest leg {:.3} m",
            params.cell_size,
            waypoints.len(),
            path_length,
            longest_leg
        );

        let initial = PoseStamped::from_pose2d(
            &self.config.navigation.frame_id,
            Time::now(),
            &self.config.initial_pose(),
        );
        navigator.set_initial_pose(initial)?;
        navigator.wait_until_active(self.config.activation_timeout()?)?;

        let mut task = navigator.follow_waypoints(self.poses(&waypoints))?;
        let result = task.wait()?;
        match &result {
            TaskResult::Succeeded => log::info!("Navigation task complete!"),
            TaskResult::Canceled => log::warn!("navigation task was canceled"),
            TaskResult::Failed { missed_waypoints } => log::warn!(
                "navigation task finished with {} missed waypoints",
                missed_waypoints.len()
            ),
        }

        Ok(MissionReport {
            waypoints,
            cell_size: params.cell_size,
            path_length,
            result,
        })
    }
}
