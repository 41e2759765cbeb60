use chrono::{DateTime, Utc};
use std::fmt;

/// Wall-clock instant attached to frames, ticks and log entries.
pub type Timestamp = DateTime<Utc>;

/// A position in sensor space, in meters.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance to `other`.
    pub fn distance(&self, other: &Point3) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        let dz = other.z - self.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

/// Skeletal joints consumed by the metric trackers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Joint {
    HipCenter,
    WristRight,
    FootLeft,
    FootRight,
}

impl Joint {
    pub const ALL: [Joint; 4] = [
        Joint::HipCenter,
        Joint::WristRight,
        Joint::FootLeft,
        Joint::FootRight,
    ];

    fn index(self) -> usize {
        match self {
            Joint::HipCenter => 0,
            Joint::WristRight => 1,
            Joint::FootLeft => 2,
            Joint::FootRight => 3,
        }
    }

    /// Name used in replay files.
    pub fn as_str(self) -> &'static str {
        match self {
            Joint::HipCenter => "hip_center",
            Joint::WristRight => "wrist_right",
            Joint::FootLeft => "foot_left",
            Joint::FootRight => "foot_right",
        }
    }

    pub fn parse(s: &str) -> Option<Joint> {
        Joint::ALL.into_iter().find(|j| j.as_str() == s)
    }
}

/// Per-joint tracking confidence reported by the sensor runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JointState {
    #[default]
    NotTracked,
    /// Position guessed from neighbouring joints; not used for metrics.
    Inferred,
    Tracked,
}

impl JointState {
    pub fn parse(s: &str) -> Option<JointState> {
        match s {
            "tracked" => Some(JointState::Tracked),
            "inferred" => Some(JointState::Inferred),
            "not_tracked" => Some(JointState::NotTracked),
            _ => None,
        }
    }
}

/// One joint's position and tracking state within a frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct JointSample {
    pub position: Point3,
    pub state: JointState,
}

/// One instant of skeletal tracking.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedFrame {
    pub timestamp: Timestamp,
    joints: [JointSample; 4],
}

impl TrackedFrame {
    /// A frame with every joint untracked.
    pub fn new(timestamp: Timestamp) -> Self {
        Self {
            timestamp,
            joints: [JointSample::default(); 4],
        }
    }

    /// Builder-style helper that marks `joint` as tracked at `position`.
    pub fn with_tracked(mut self, joint: Joint, position: Point3) -> Self {
        self.set(joint, position, JointState::Tracked);
        self
    }

    pub fn set(&mut self, joint: Joint, position: Point3, state: JointState) {
        self.joints[joint.index()] = JointSample { position, state };
    }

    pub fn joint(&self, joint: Joint) -> &JointSample {
        &self.joints[joint.index()]
    }

    /// Position of `joint` if the sensor reports it as tracked this frame.
    pub fn tracked(&self, joint: Joint) -> Option<Point3> {
        let sample = self.joint(joint);
        (sample.state == JointState::Tracked).then_some(sample.position)
    }
}

/// Activity label derived from velocity and swing length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Activity {
    Standing,
    Walking,
    Running,
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Activity::Standing => "Standing",
            Activity::Walking => "Walking",
            Activity::Running => "Running",
        };
        f.write_str(label)
    }
}

/// Aggregate metrics emitted once per reporting tick.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub timestamp: Timestamp,
    /// Smoothed hip velocity in m/s.
    pub velocity: f64,
    /// Maximum wrist arc length seen during the interval, in meters.
    pub swing_length: f64,
    /// Average stride in meters; `None` until both feet have moved.
    pub average_stride: Option<f64>,
    pub activity: Activity,
}

/// One entry of the swing data log.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwingRecord {
    pub timestamp: Timestamp,
    pub max_swing_length: f64,
}

bitflags::bitflags! {
    /// Trackers that advanced while handling a frame.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct TrackerSet: u8 {
        const VELOCITY = 1 << 0;
        const SWING    = 1 << 1;
        const STRIDE   = 1 << 2;
    }
}

/// Result of feeding one frame to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameUpdate {
    pub advanced: TrackerSet,
    /// New velocity, present only when it was re-smoothed this frame.
    pub velocity: Option<f64>,
    /// New stride average, present only when a stride sample was written.
    pub stride_average: Option<f64>,
}

/// Events pushed by a running session to its consumer.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricEvent {
    Velocity { timestamp: Timestamp, velocity: f64 },
    Stride { timestamp: Timestamp, average: f64 },
    Snapshot(Snapshot),
}
