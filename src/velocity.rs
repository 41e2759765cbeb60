use crate::types::{Point3, Timestamp};

/// Default weight of the newest instantaneous speed.
pub const SMOOTHING_FACTOR: f64 = 0.1;

/// Exponentially smoothed hip velocity.
///
/// Each tracked hip sample is compared with the previous one; the
/// instantaneous speed is blended in as `α·speed + (1-α)·velocity`.
/// Samples whose timestamp does not move forward advance the reference
/// point without touching the velocity.
#[derive(Debug, Clone)]
pub struct VelocityTracker {
    alpha: f64,
    previous: Option<(Point3, Timestamp)>,
    velocity: f64,
    smoothed_last: bool,
}

impl VelocityTracker {
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha: alpha.clamp(0.0, 1.0),
            previous: None,
            velocity: 0.0,
            smoothed_last: false,
        }
    }

    /// Feed a tracked hip position and return the current velocity (m/s).
    pub fn update(&mut self, hip: Point3, timestamp: Timestamp) -> f64 {
        self.smoothed_last = false;

        if let Some((prev_pos, prev_time)) = self.previous {
            let dt = (timestamp - prev_time).num_microseconds().unwrap_or(0) as f64 / 1e6;
            if dt > 0.0 {
                let speed = prev_pos.distance(&hip) / dt;
                self.velocity = self.alpha * speed + (1.0 - self.alpha) * self.velocity;
                self.smoothed_last = true;
            }
        }

        self.previous = Some((hip, timestamp));
        self.velocity
    }

    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    /// Whether the most recent `update` re-smoothed the velocity.
    pub fn smoothed_last(&self) -> bool {
        self.smoothed_last
    }
}

impl Default for VelocityTracker {
    fn default() -> Self {
        Self::new(SMOOTHING_FACTOR)
    }
}
