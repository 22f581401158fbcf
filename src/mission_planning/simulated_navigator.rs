//! Simulated waypoint follower
//!
//! Stands in for a real navigation stack: a worker thread drives an ideal
//! point robot from waypoint to waypoint at constant speed and reports
//! progress through the task channel. Reported poses can be perturbed with
//! Gaussian noise to imitate localization error.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use rand_distr::{Distribution, Normal};

use crate::common::{CoverageError, CoverageResult, Point2D};
use crate::mission_planning::messages::{PoseStamped, Time};
use crate::mission_planning::navigator::{
    NavigationFeedback, TaskEvent, TaskHandle, TaskResult, TaskSender, WaypointNavigator,
};

/// Axis-aligned region the simulated robot can reach
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReachableArea {
    pub min: Point2D,
    pub max: Point2D,
}

impl ReachableArea {
    pub fn new(min: Point2D, max: Point2D) -> Self {
        ReachableArea { min, max }
    }

    pub fn contains(&self, p: &Point2D) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }
}

/// Configuration for the simulated navigator
#[derive(Debug, Clone)]
pub struct SimulatedNavigatorConfig {
    /// Travel speed [m/s]
    pub speed: f64,
    /// Real seconds slept per simulated second (0 runs instantly)
    pub time_scale: f64,
    /// Standard deviation of reported position noise [m]
    pub position_noise: f64,
    /// Time until the navigator accepts goals
    pub activation_delay: Duration,
    /// Waypoints outside this area are reported as missed
    pub reachable: Option<ReachableArea>,
}

impl Default for SimulatedNavigatorConfig {
    fn default() -> Self {
        Self {
            speed: 0.5,
            time_scale: 0.0,
            position_noise: 0.0,
            activation_delay: Duration::from_millis(0),
            reachable: None,
        }
    }
}

/// In-process navigator used for dry runs and tests
pub struct SimulatedNavigator {
    config: SimulatedNavigatorConfig,
    noise: Option<Normal<f64>>,
    initial_pose: Option<PoseStamped>,
    active: bool,
    cancel: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl SimulatedNavigator {
    pub fn new(config: SimulatedNavigatorConfig) -> CoverageResult<Self> {
        if !config.speed.is_finite() || config.speed <= 0.0 {
            return Err(CoverageError::InvalidParameter(format!(
                "speed must be positive, got {}",
                config.speed
            )));
        }
        if !config.time_scale.is_finite() || config.time_scale < 0.0 {
            return Err(CoverageError::InvalidParameter(format!(
                "time_scale must be non-negative, got {}",
                config.time_scale
            )));
        }
        let noise = if config.position_noise > 0.0 {
            let normal = Normal::new(0.0, config.position_noise)
                .map_err(|e| CoverageError::InvalidParameter(format!("position_noise: {}", e)))?;
            Some(normal)
        } else if config.position_noise == 0.0 {
            None
        } else {
            return Err(CoverageError::InvalidParameter(format!(
                "position_noise must be non-negative, got {}",
                config.position_noise
            )));
        };

        Ok(SimulatedNavigator {
            config,
            noise,
            initial_pose: None,
            active: false,
            cancel: Arc::new(AtomicBool::new(false)),
            worker: None,
        })
    }

    /// Create with default configuration
    pub fn with_defaults() -> Self {
        SimulatedNavigator {
            config: SimulatedNavigatorConfig::default(),
            noise: None,
            initial_pose: None,
            active: false,
            cancel: Arc::new(AtomicBool::new(false)),
            worker: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Stop the running task after the current leg
    pub fn cancel_task(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    fn join_worker(&mut self) {
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::warn!("simulated navigation worker panicked");
            }
        }
    }
}

impl WaypointNavigator for SimulatedNavigator {
    fn set_initial_pose(&mut self, pose: PoseStamped) -> CoverageResult<()> {
        log::info!(
            "initial pose set to ({:.2}, {:.2}) in frame '{}'",
            pose.pose.position.x,
            pose.pose.position.y,
            pose.header.frame_id
        );
        self.initial_pose = Some(pose);
        Ok(())
    }

    fn wait_until_active(&mut self, timeout: Duration) -> CoverageResult<()> {
        if self.active {
            return Ok(());
        }
        if self.initial_pose.is_none() {
            return Err(CoverageError::NavigationError(
                "navigator cannot activate before an initial pose is set".to_string(),
            ));
        }
        if self.config.activation_delay > timeout {
            return Err(CoverageError::NavigationError(format!(
                "navigator did not become active within {:?}",
                timeout
            )));
        }
        thread::sleep(self.config.activation_delay);
        self.active = true;
        log::info!("navigator is active");
        Ok(())
    }

    fn follow_waypoints(&mut self, poses: Vec<PoseStamped>) -> CoverageResult<TaskHandle> {
        if !self.active {
            return Err(CoverageError::NavigationError(
                "navigator is not active".to_string(),
            ));
        }
        if poses.is_empty() {
            return Err(CoverageError::InvalidParameter(
                "no waypoints to follow".to_string(),
            ));
        }
        if self.worker.is_some() {
            log::info!("replacing the running waypoint task");
            self.cancel_task();
            self.join_worker();
        }
        self.cancel.store(false, Ordering::SeqCst);

        let start = self
            .initial_pose
            .as_ref()
            .map(|p| p.position())
            .unwrap_or_else(Point2D::origin);
        let run = SimulationRun {
            config: self.config.clone(),
            noise: self.noise,
            cancel: Arc::clone(&self.cancel),
            position: start,
        };

        log::info!("following {} waypoints", poses.len());
        let (tx, handle) = TaskHandle::channel();
        self.worker = Some(thread::spawn(move || run.execute(poses, tx)));
        Ok(handle)
    }
}

impl Drop for SimulatedNavigator {
    fn drop(&mut self) {
        self.cancel_task();
        self.join_worker();
    }
}

struct SimulationRun {
    config: SimulatedNavigatorConfig,
    noise: Option<Normal<f64>>,
    cancel: Arc<AtomicBool>,
    position: Point2D,
}

impl SimulationRun {
    fn execute(mut self, poses: Vec<PoseStamped>, tx: TaskSender) {
        let mut rng = rand::thread_rng();
        let mut missed = Vec::new();

        for (i, target) in poses.iter().enumerate() {
            if self.cancel.load(Ordering::SeqCst) {
                log::info!("waypoint task canceled at waypoint {}", i);
                let _ = tx.send(TaskEvent::Finished(TaskResult::Canceled));
                return;
            }

            let goal = target.position();
            if let Some(area) = &self.config.reachable {
                if !area.contains(&goal) {
                    log::warn!("waypoint {} at ({:.2}, {:.2}) is unreachable", i, goal.x, goal.y);
                    missed.push(i);
                    continue;
                }
            }

            let travel = self.position.distance(&goal) / self.config.speed;
            if self.config.time_scale > 0.0 {
                match Duration::try_from_secs_f64(travel * self.config.time_scale) {
                    Ok(leg) => thread::sleep(leg),
                    Err(_) => {
                        log::warn!("waypoint {} is too far to reach at this time scale", i);
                        missed.push(i);
                        continue;
                    }
                }
            }
            self.position = goal;

            let (dx, dy) = match &self.noise {
                Some(normal) => (normal.sample(&mut rng), normal.sample(&mut rng)),
                None => (0.0, 0.0),
            };
            let reported = PoseStamped::from_xy_yaw(
                &target.header.frame_id,
                Time::now(),
                goal.x + dx,
                goal.y + dy,
                target.yaw(),
            );
            let feedback = NavigationFeedback {
                current_waypoint: i,
                current_pose: reported,
            };
            if tx.send(TaskEvent::Feedback(feedback)).is_err() {
                // handle dropped, nobody is listening
                return;
            }
        }

        let result = if missed.is_empty() {
            TaskResult::Succeeded
        } else {
            TaskResult::Failed { missed_waypoints: missed }
        };
        let _ = tx.send(TaskEvent::Finished(result));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mission_planning::messages::MAP_FRAME;

    fn poses(points: &[(f64, f64)]) -> Vec<PoseStamped> {
        points
            .iter()
            .map(|&(x, y)| PoseStamped::from_xy_yaw(MAP_FRAME, Time::default(), x, y, 0.0))
            .collect()
    }

    fn active_navigator(config: SimulatedNavigatorConfig) -> SimulatedNavigator {
        let mut nav = SimulatedNavigator::new(config).unwrap();
        nav.set_initial_pose(PoseStamped::from_xy_yaw(MAP_FRAME, Time::default(), 0.0, 0.0, 0.0))
            .unwrap();
        nav.wait_until_active(Duration::from_secs(1)).unwrap();
        nav
    }

    #[test]
    fn test_follows_all_waypoints() {
        let mut nav = active_navigator(SimulatedNavigatorConfig::default());
        let mut handle = nav.follow_waypoints(poses(&[(0.0, 1.0), (1.0, 1.0), (1.0, 0.0)])).unwrap();

        assert_eq!(handle.wait().unwrap(), TaskResult::Succeeded);
        let last = handle.feedback().unwrap();
        assert_eq!(last.current_waypoint, 2);
        assert_eq!(last.current_pose.position(), Point2D::new(1.0, 0.0));
    }

    #[test]
    fn test_unreachable_waypoints_are_missed() {
        let config = SimulatedNavigatorConfig {
            reachable: Some(ReachableArea::new(Point2D::origin(), Point2D::new(1.0, 1.0))),
            ..Default::default()
        };
        let mut nav = active_navigator(config);
        let mut handle = nav
            .follow_waypoints(poses(&[(0.5, 0.5), (2.0, 0.5), (1.0, 1.0), (-1.0, 0.0)]))
            .unwrap();

        assert_eq!(
            handle.wait().unwrap(),
            TaskResult::Failed { missed_waypoints: vec![1, 3] }
        );
    }

    #[test]
    fn test_noise_perturbs_reported_pose() {
        let config = SimulatedNavigatorConfig {
            position_noise: 0.05,
            ..Default::default()
        };
        let mut nav = active_navigator(config);
        let mut handle = nav.follow_waypoints(poses(&[(2.0, 2.0)])).unwrap();

        assert!(handle.wait().unwrap().is_success());
        let reported = handle.feedback().unwrap().current_pose.position();
        // 10 sigma
        assert!(reported.distance(&Point2D::new(2.0, 2.0)) < 0.5 * 2f64.sqrt());
    }

    #[test]
    fn test_requires_activation() {
        let mut nav = SimulatedNavigator::with_defaults();
        assert!(matches!(
            nav.wait_until_active(Duration::from_secs(1)),
            Err(CoverageError::NavigationError(_))
        ));
        assert!(nav.follow_waypoints(poses(&[(1.0, 0.0)])).is_err());
        assert!(!nav.is_active());
    }

    #[test]
    fn test_activation_timeout() {
        let config = SimulatedNavigatorConfig {
            activation_delay: Duration::from_secs(5),
            ..Default::default()
        };
        let mut nav = SimulatedNavigator::new(config).unwrap();
        nav.set_initial_pose(PoseStamped::from_xy_yaw(MAP_FRAME, Time::default(), 0.0, 0.0, 0.0))
            .unwrap();
        assert!(nav.wait_until_active(Duration::from_millis(10)).is_err());
    }

    #[test]
    fn test_cancel_running_task() {
        let config = SimulatedNavigatorConfig {
            time_scale: 1.0,
            speed: 10.0,
            ..Default::default()
        };
        let mut nav = active_navigator(config);
        let mut handle = nav.follow_waypoints(poses(&[(1.0, 0.0), (2.0, 0.0), (3.0, 0.0)])).unwrap();
        nav.cancel_task();
        assert_eq!(handle.wait().unwrap(), TaskResult::Canceled);
    }

    #[test]
    fn test_new_task_replaces_running_one() {
        let config = SimulatedNavigatorConfig {
            time_scale: 1.0,
            speed: 1.0,
            ..Default::default()
        };
        let mut nav = active_navigator(config);
        // 100 legs of 50 ms each
        let long: Vec<(f64, f64)> = (1..=100).map(|i| (i as f64 * 0.05, 0.0)).collect();
        let mut first = nav.follow_waypoints(poses(&long)).unwrap();

        let started = std::time::Instant::now();
        let mut second = nav.follow_waypoints(poses(&[(0.0, 0.0)])).unwrap();
        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(first.wait().unwrap(), TaskResult::Canceled);
        assert_eq!(second.wait().unwrap(), TaskResult::Succeeded);
    }

    #[test]
    fn test_leg_too_long_to_sleep_is_missed() {
        let config = SimulatedNavigatorConfig {
            time_scale: 1e300,
            speed: 1.0,
            ..Default::default()
        };
        let mut nav = active_navigator(config);
        let mut handle = nav.follow_waypoints(poses(&[(0.0, 0.0), (1.0, 0.0)])).unwrap();
        assert_eq!(
            handle.wait().unwrap(),
            TaskResult::Failed { missed_waypoints: vec![1] }
        );
    }

    #[test]
    fn test_rejects_invalid_config() {
        let bad_speed = SimulatedNavigatorConfig { speed: 0.0, ..Default::default() };
        assert!(SimulatedNavigator::new(bad_speed).is_err());
        let bad_noise = SimulatedNavigatorConfig { position_noise: -1.0, ..Default::default() };
        assert!(SimulatedNavigator::new(bad_noise).is_err());
        let bad_scale = SimulatedNavigatorConfig { time_scale: -0.1, ..Default::default() };
        assert!(SimulatedNavigator::new(bad_scale).is_err());
    }

    #[test]
    fn test_rejects_empty_task() {
        let mut nav = active_navigator(SimulatedNavigatorConfig::default());
        assert!(matches!(
            nav.follow_waypoints(Vec::new()),
            Err(CoverageError::InvalidParameter(_))
        ));
    }
}
