//! Pose messages handed to the navigator
//!
//! Mirrors the ROS 2 `geometry_msgs/PoseStamped` layout: a header carrying
//! the frame and stamp, a position and an orientation quaternion.

use std::convert::TryFrom;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use nalgebra::UnitQuaternion;

use crate::common::{Point2D, Point3D, Pose2D};

/// Frame every coverage waypoint is expressed in
pub const MAP_FRAME: &str = "map";

/// Timestamp split into seconds and nanoseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Time {
    pub sec: i32,
    pub nanosec: u32,
}

impl Time {
    pub fn new(sec: i32, nanosec: u32) -> Self {
        Time { sec, nanosec }
    }

    /// Current wall-clock time
    pub fn now() -> Self {
        let since_epoch = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        Self::from_duration(since_epoch)
    }

    /// Seconds past `i32::MAX` saturate
    pub fn from_duration(d: Duration) -> Self {
        Time {
            sec: i32::try_from(d.as_secs()).unwrap_or(i32::MAX),
            nanosec: d.subsec_nanos(),
        }
    }

    pub fn as_secs_f64(&self) -> f64 {
        self.sec as f64 + self.nanosec as f64 * 1e-9
    }
}

/// Standard metadata for stamped messages
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    pub stamp: Time,
    pub frame_id: String,
}

impl Header {
    pub fn new(frame_id: &str, stamp: Time) -> Self {
        Header {
            stamp,
            frame_id: frame_id.to_string(),
        }
    }
}

/// Position and orientation in free space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Point3D,
    pub orientation: UnitQuaternion<f64>,
}

/// A pose with a reference frame and timestamp
#[derive(Debug, Clone, PartialEq)]
pub struct PoseStamped {
    pub header: Header,
    pub pose: Pose,
}

impl PoseStamped {
    /// Planar pose at `(x, y)` with heading `yaw` about the z axis
    pub fn from_xy_yaw(frame_id: &str, stamp: Time, x: f64, y: f64, yaw: f64) -> Self {
        PoseStamped {
            header: Header::new(frame_id, stamp),
            pose: Pose {
                position: Point3D::new(x, y, 0.0),
                orientation: UnitQuaternion::from_euler_angles(0.0, 0.0, yaw),
            },
        }
    }

    pub fn from_waypoint(frame_id: &str, stamp: Time, waypoint: &Point2D) -> Self {
        Self::from_xy_yaw(frame_id, stamp, waypoint.x, waypoint.y, 0.0)
    }

    pub fn from_pose2d(frame_id: &str, stamp: Time, pose: &Pose2D) -> Self {
        Self::from_xy_yaw(frame_id, stamp, pose.x, pose.y, pose.yaw)
    }

    pub fn position(&self) -> Point2D {
        Point2D::new(self.pose.position.x, self.pose.position.y)
    }

    /// Heading about the z axis
    pub fn yaw(&self) -> f64 {
        self.pose.orientation.euler_angles().2
    }

    pub fn to_pose2d(&self) -> Pose2D {
        Pose2D::new(self.pose.position.x, self.pose.position.y, self.yaw())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_yaw_is_identity_quaternion() {
        let pose = PoseStamped::from_xy_yaw(MAP_FRAME, Time::default(), 1.0, 2.0, 0.0);
        let q = pose.pose.orientation;
        assert!((q.w - 1.0).abs() < 1e-10);
        assert!(q.i.abs() < 1e-10 && q.j.abs() < 1e-10 && q.k.abs() < 1e-10);
        assert_eq!(pose.pose.position, Point3D::new(1.0, 2.0, 0.0));
        assert_eq!(pose.header.frame_id, "map");
    }

    #[test]
    fn test_yaw_round_trip() {
        let yaw = 1.2;
        let pose = PoseStamped::from_xy_yaw(MAP_FRAME, Time::default(), 0.0, 0.0, yaw);
        assert!((pose.yaw() - yaw).abs() < 1e-10);

        // quaternion_from_euler(0, 0, yaw) = (0, 0, sin(yaw/2), cos(yaw/2))
        let q = pose.pose.orientation;
        assert!((q.k - (yaw / 2.0).sin()).abs() < 1e-10);
        assert!((q.w - (yaw / 2.0).cos()).abs() < 1e-10);
    }

    #[test]
    fn test_from_pose2d() {
        let pose2d = Pose2D::new(3.0, -1.0, -0.5);
        let stamped = PoseStamped::from_pose2d("odom", Time::new(10, 5), &pose2d);
        let back = stamped.to_pose2d();
        assert!((back.x - 3.0).abs() < 1e-10);
        assert!((back.y + 1.0).abs() < 1e-10);
        assert!((back.yaw + 0.5).abs() < 1e-10);
        assert_eq!(stamped.header.stamp, Time::new(10, 5));
    }

    #[test]
    fn test_time_from_duration() {
        let t = Time::from_duration(Duration::from_millis(1500));
        assert_eq!(t, Time::new(1, 500_000_000));
        assert!((t.as_secs_f64() - 1.5).abs() < 1e-12);
        assert!(Time::now().sec > 0);
    }

    #[test]
    fn test_time_saturates_past_i32_range() {
        let t = Time::from_duration(Duration::new(u64::from(u32::MAX) + 7, 250));
        assert_eq!(t, Time::new(i32::MAX, 250));
    }
}
