use crate::classifier::ActivityThresholds;
use crate::config::EngineConfig;
use crate::export::SwingDataLog;
use crate::stride::StrideTracker;
use crate::swing::SwingArcTracker;
use crate::types::{FrameUpdate, Joint, Snapshot, Timestamp, TrackedFrame, TrackerSet};
use crate::velocity::VelocityTracker;
use crate::Result;
use std::path::Path;

/// Per-frame motion metrics with a once-per-tick snapshot.
///
/// The engine is plain single-threaded state: frames go through
/// [`on_tracked_frame`](Self::on_tracked_frame), ticks through
/// [`on_reporting_tick`](Self::on_reporting_tick). Callers that deliver
/// both from different threads must serialise them (see `Session`).
#[derive(Debug, Clone)]
pub struct MotionMetricsEngine {
    velocity: VelocityTracker,
    swing: SwingArcTracker,
    stride: StrideTracker,
    thresholds: ActivityThresholds,
    swing_log: SwingDataLog,
    frames_seen: u64,
}

impl MotionMetricsEngine {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            velocity: VelocityTracker::new(config.smoothing_factor),
            swing: SwingArcTracker::new(config.window_capacity),
            stride: StrideTracker::new(config.window_capacity),
            thresholds: config.thresholds,
            swing_log: SwingDataLog::new(),
            frames_seen: 0,
        }
    }

    /// Feed one frame. Untracked joints are skipped and leave their
    /// windows untouched.
    ///
    /// The stride tracker sees every frame: once both foot windows hold two
    /// positions a sample is written even when neither foot is tracked,
    /// reusing each foot's last step.
    pub fn on_tracked_frame(&mut self, frame: &TrackedFrame) -> FrameUpdate {
        self.frames_seen += 1;
        let mut update = FrameUpdate::default();

        if let Some(hip) = frame.tracked(Joint::HipCenter) {
            let velocity = self.velocity.update(hip, frame.timestamp);
            update.advanced |= TrackerSet::VELOCITY;
            if self.velocity.smoothed_last() {
                update.velocity = Some(velocity);
            }
        }

        if let Some(wrist) = frame.tracked(Joint::WristRight) {
            self.swing.update(wrist);
            update.advanced |= TrackerSet::SWING;
        }

        let left = frame.tracked(Joint::FootLeft);
        let right = frame.tracked(Joint::FootRight);
        if left.is_some() || right.is_some() {
            update.advanced |= TrackerSet::STRIDE;
        }
        if self.stride.update(left, right).is_some() {
            update.stride_average = self.stride.average();
        }

        update
    }

    /// Close the reporting interval: consume the swing maximum, classify,
    /// log the swing length and return the snapshot.
    pub fn on_reporting_tick(&mut self, now: Timestamp) -> Snapshot {
        let swing_length = self.swing.consume_interval_max();
        let velocity = self.velocity.velocity();
        let average_stride = self.stride.average();
        let activity = self.thresholds.classify(velocity, swing_length);

        self.swing_log.push(now, swing_length);

        log::debug!(
            "tick {}: velocity={:.2} swing={:.2} stride={:?} -> {}",
            now,
            velocity,
            swing_length,
            average_stride,
            activity
        );

        Snapshot {
            timestamp: now,
            velocity,
            swing_length,
            average_stride,
            activity,
        }
    }

    pub fn velocity(&self) -> f64 {
        self.velocity.velocity()
    }

    pub fn average_stride(&self) -> Option<f64> {
        self.stride.average()
    }

    /// Maximum arc length since the last tick, without resetting it.
    pub fn pending_swing_max(&self) -> f64 {
        self.swing.interval_max()
    }

    pub fn swing_log(&self) -> &SwingDataLog {
        &self.swing_log
    }

    pub fn frames_seen(&self) -> u64 {
        self.frames_seen
    }

    /// Append the swing log to `path`; see [`SwingDataLog::export`].
    pub fn export_swing_log(&self, path: impl AsRef<Path>) -> Result<usize> {
        self.swing_log.export(path)
    }
}

impl Default for MotionMetricsEngine {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Activity, JointState, Point3};
    use crate::window::MAX_POSITIONS;
    use chrono::{TimeZone, Utc};

    fn t(ms: i64) -> Timestamp {
        Utc.timestamp_millis_opt(1_700_000_000_000 + ms).unwrap()
    }

    fn full_frame(ms: i64, x: f64) -> TrackedFrame {
        TrackedFrame::new(t(ms))
            .with_tracked(Joint::HipCenter, Point3::new(x, 0.9, 2.0))
            .with_tracked(Joint::WristRight, Point3::new(x + 0.2, 0.8 + x, 2.0))
            .with_tracked(Joint::FootLeft, Point3::new(x, 0.0, 2.0))
            .with_tracked(Joint::FootRight, Point3::new(x, 0.0, 2.2))
    }

    #[test]
    fn test_untracked_joints_do_not_advance() {
        let mut engine = MotionMetricsEngine::default();
        let mut frame = TrackedFrame::new(t(0));
        frame.set(Joint::HipCenter, Point3::new(1.0, 1.0, 1.0), JointState::Inferred);

        let update = engine.on_tracked_frame(&frame);
        assert!(update.advanced.is_empty());
        assert_eq!(update.velocity, None);
        assert_eq!(engine.frames_seen(), 1);
        assert_eq!(engine.pending_swing_max(), 0.0);
    }

    #[test]
    fn test_frame_update_reports_new_values() {
        let mut engine = MotionMetricsEngine::default();
        let first = engine.on_tracked_frame(&full_frame(0, 0.0));
        assert_eq!(first.advanced, TrackerSet::all());
        assert_eq!(first.velocity, None);
        assert_eq!(first.stride_average, None);

        let second = engine.on_tracked_frame(&full_frame(100, 0.1));
        // 0.1 m in 0.1 s -> 1 m/s instantaneous, smoothed to 0.1.
        assert!((second.velocity.unwrap() - 0.1).abs() < 1e-9);
        assert!((second.stride_average.unwrap() - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_feetless_frame_still_writes_stride_sample() {
        let mut engine = MotionMetricsEngine::default();
        let mut direct = StrideTracker::new(MAX_POSITIONS);
        for i in 0..3 {
            let frame = full_frame(i * 100, i as f64 * 0.1);
            engine.on_tracked_frame(&frame);
            direct.update(frame.tracked(Joint::FootLeft), frame.tracked(Joint::FootRight));
        }
        assert_eq!(engine.stride.sample_count(), 2);

        let hip_only = TrackedFrame::new(t(300))
            .with_tracked(Joint::HipCenter, Point3::new(0.3, 0.9, 2.0));
        let update = engine.on_tracked_frame(&hip_only);
        direct.update(None, None);

        assert!(update.advanced.contains(TrackerSet::VELOCITY));
        assert!(!update.advanced.contains(TrackerSet::STRIDE));
        assert_eq!(engine.stride.sample_count(), 3);
        assert_eq!(engine.stride.sample_count(), direct.sample_count());
        assert_eq!(engine.stride.left_window().len(), 3);
        assert!((update.stride_average.unwrap() - 0.1).abs() < 1e-9);
        assert_eq!(update.stride_average, direct.average());
    }

    #[test]
    fn test_tick_assembles_snapshot_and_logs() {
        let mut engine = MotionMetricsEngine::default();
        for i in 0..10 {
            engine.on_tracked_frame(&full_frame(i * 100, i as f64 * 0.1));
        }
        let expected_swing = engine.pending_swing_max();
        assert!(expected_swing > 0.0);

        let snapshot = engine.on_reporting_tick(t(1000));
        assert_eq!(snapshot.timestamp, t(1000));
        assert!((snapshot.swing_length - expected_swing).abs() < 1e-12);
        assert_eq!(snapshot.velocity, engine.velocity());
        assert!((snapshot.average_stride.unwrap() - 0.1).abs() < 1e-9);
        assert_eq!(
            snapshot.activity,
            ActivityThresholds::default().classify(snapshot.velocity, snapshot.swing_length)
        );

        assert_eq!(engine.pending_swing_max(), 0.0);
        assert_eq!(engine.swing_log().len(), 1);
        assert_eq!(engine.swing_log().records()[0].max_swing_length, snapshot.swing_length);
    }

    #[test]
    fn test_tick_without_frames() {
        let mut engine = MotionMetricsEngine::default();
        let snapshot = engine.on_reporting_tick(t(0));
        assert_eq!(snapshot.velocity, 0.0);
        assert_eq!(snapshot.swing_length, 0.0);
        assert_eq!(snapshot.average_stride, None);
        assert_eq!(snapshot.activity, Activity::Standing);

        // Second tick with no new frames reports a zero swing again.
        let again = engine.on_reporting_tick(t(1000));
        assert_eq!(again.swing_length, 0.0);
        assert_eq!(engine.swing_log().len(), 2);
    }

    #[test]
    fn test_custom_thresholds_flow_through() {
        let config = EngineConfig {
            thresholds: ActivityThresholds {
                standing_velocity: -1.0,
                ..ActivityThresholds::default()
            },
            ..EngineConfig::default()
        };
        let mut engine = MotionMetricsEngine::new(&config);
        assert_eq!(engine.on_reporting_tick(t(0)).activity, Activity::Walking);
    }
}
