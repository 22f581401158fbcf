// Mission planning module: pose messages, navigator contract and the
// full coverage mission built on top of them

pub mod messages;
pub mod navigator;
pub mod simulated_navigator;
pub mod full_coverage;

pub use messages::{Header, Pose, PoseStamped, Time, MAP_FRAME};
pub use navigator::{NavigationFeedback, TaskEvent, TaskHandle, TaskResult, TaskSender, WaypointNavigator};
pub use simulated_navigator::{ReachableArea, SimulatedNavigator, SimulatedNavigatorConfig};
pub use full_coverage::{FullCoverageMission, MissionReport};
