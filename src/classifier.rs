use crate::types::Activity;

/// Velocity (m/s) and swing length (m) cut-offs for activity labels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActivityThresholds {
    pub standing_velocity: f64,
    pub walking_velocity: f64,
    pub running_velocity: f64,
    pub walking_swing: f64,
    pub running_swing: f64,
}

impl Default for ActivityThresholds {
    fn default() -> Self {
        Self {
            standing_velocity: 0.1,
            walking_velocity: 2.5,
            running_velocity: 10.0,
            walking_swing: 2.5,
            running_swing: 4.5,
        }
    }
}

impl ActivityThresholds {
    /// First matching rule wins. Anything past the running limits is still
    /// labelled `Running`.
    #[allow(clippy::if_same_then_else)]
    pub fn classify(&self, velocity: f64, swing_length: f64) -> Activity {
        if velocity < self.standing_velocity {
            Activity::Standing
        } else if velocity < self.walking_velocity && swing_length < self.walking_swing {
            Activity::Walking
        } else if velocity < self.running_velocity && swing_length < self.running_swing {
            Activity::Running
        } else {
            Activity::Running
        }
    }
}

/// Classify with the default thresholds.
pub fn classify(velocity: f64, swing_length: f64) -> Activity {
    ActivityThresholds::default().classify(velocity, swing_length)
}
