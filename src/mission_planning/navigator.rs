//! Waypoint navigator contract
//!
//! The navigation stack that actually drives the robot is an external
//! collaborator. This module fixes the narrow interface the coverage
//! mission talks to: submit a list of poses, get back a `TaskHandle`, and
//! learn about completion through a channel instead of polling in a loop.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::time::{Duration, Instant};

use crate::common::{CoverageError, CoverageResult};
use crate::mission_planning::messages::PoseStamped;

/// Progress report sent while a waypoint task is running
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationFeedback {
    /// Index of the waypoint currently being approached
    pub current_waypoint: usize,
    /// Pose reported by the navigator
    pub current_pose: PoseStamped,
}

/// Terminal outcome of a waypoint task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskResult {
    Succeeded,
    Canceled,
    /// Task ended but some waypoints were skipped
    Failed { missed_waypoints: Vec<usize> },
}

impl TaskResult {
    pub fn is_success(&self) -> bool {
        matches!(self, TaskResult::Succeeded)
    }
}

/// Message flowing from a navigator to its task handle
#[derive(Debug, Clone, PartialEq)]
pub enum TaskEvent {
    Feedback(NavigationFeedback),
    Finished(TaskResult),
}

/// Sending half handed to the navigator implementation
pub type TaskSender = Sender<TaskEvent>;

/// Handle to a submitted waypoint task
pub struct TaskHandle {
    events: Receiver<TaskEvent>,
    feedback: Option<NavigationFeedback>,
    result: Option<TaskResult>,
    disconnected: bool,
}

impl TaskHandle {
    /// Create a connected sender/handle pair
    pub fn channel() -> (TaskSender, TaskHandle) {
        let (tx, rx) = mpsc::channel();
        let handle = TaskHandle {
            events: rx,
            feedback: None,
            result: None,
            disconnected: false,
        };
        (tx, handle)
    }

    /// Non-blocking completion check
    pub fn is_complete(&mut self) -> bool {
        while self.result.is_none() && !self.disconnected {
            match self.events.try_recv() {
                Ok(event) => self.apply(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => self.disconnected = true,
            }
        }
        self.result.is_some() || self.disconnected
    }

    /// Latest feedback received so far
    pub fn feedback(&mut self) -> Option<&NavigationFeedback> {
        self.is_complete();
        self.feedback.as_ref()
    }

    /// Result, if the task has finished
    pub fn result(&mut self) -> Option<&TaskResult> {
        self.is_complete();
        self.result.as_ref()
    }

    /// Block until the task finishes
    pub fn wait(&mut self) -> CoverageResult<TaskResult> {
        while self.result.is_none() && !self.disconnected {
            match self.events.recv() {
                Ok(event) => self.apply(event),
                Err(_) => self.disconnected = true,
            }
        }
        self.finished()
    }

    /// Block until the task finishes or `timeout` elapses.
    /// Returns `Ok(None)` on timeout. A timeout past the end of the clock
    /// waits without limit.
    pub fn wait_timeout(&mut self, timeout: Duration) -> CoverageResult<Option<TaskResult>> {
        let deadline = match Instant::now().checked_add(timeout) {
            Some(deadline) => deadline,
            None => return self.wait().map(Some),
        };
        while self.result.is_none() && !self.disconnected {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.events.recv_timeout(remaining) {
                Ok(event) => self.apply(event),
                Err(RecvTimeoutError::Timeout) => return Ok(None),
                Err(RecvTimeoutError::Disconnected) => self.disconnected = true,
            }
        }
        self.finished().map(Some)
    }

    fn apply(&mut self, event: TaskEvent) {
        match event {
            TaskEvent::Feedback(feedback) => {
                log::debug!("approaching waypoint {}", feedback.current_waypoint);
                self.feedback = Some(feedback);
            }
            TaskEvent::Finished(result) => self.result = Some(result),
        }
    }

    fn finished(&self) -> CoverageResult<TaskResult> {
        match &self.result {
            Some(result) => Ok(result.clone()),
            None => Err(CoverageError::NavigationError(
                "navigator dropped the task without reporting a result".to_string(),
            )),
        }
    }
}

/// Navigation stack able to follow a list of waypoints
pub trait WaypointNavigator {
    /// Seed localization with the robot's starting pose
    fn set_initial_pose(&mut self, pose: PoseStamped) -> CoverageResult<()>;

    /// Block until the navigator accepts goals
    fn wait_until_active(&mut self, timeout: Duration) -> CoverageResult<()>;

    /// Submit poses to be visited in order
    fn follow_waypoints(&mut self, poses: Vec<PoseStamped>) -> CoverageResult<TaskHandle>;
}
