use crate::classifier::ActivityThresholds;
use crate::export::DEFAULT_SWING_LOG;
use crate::velocity::SMOOTHING_FACTOR;
use crate::window::MAX_POSITIONS;
use std::path::PathBuf;
use std::time::Duration;

/// Tunables for the metrics engine and the session around it.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Capacity of the wrist/foot windows and the stride ring buffer.
    pub window_capacity: usize,
    /// Weight of the newest instantaneous speed in the velocity filter.
    pub smoothing_factor: f64,
    pub thresholds: ActivityThresholds,
    /// Cadence of reporting ticks.
    pub report_interval: Duration,
    /// Bound of the session's event channel; events beyond it are dropped.
    pub event_capacity: usize,
    /// Emit per-frame velocity/stride events in addition to snapshots.
    pub emit_frame_samples: bool,
    pub swing_log_path: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            window_capacity: MAX_POSITIONS,
            smoothing_factor: SMOOTHING_FACTOR,
            thresholds: ActivityThresholds::default(),
            report_interval: Duration::from_secs(1),
            event_capacity: 256,
            emit_frame_samples: true,
            swing_log_path: PathBuf::from(DEFAULT_SWING_LOG),
        }
    }
}

/// Longest accepted reporting interval.
pub const MAX_REPORT_INTERVAL: Duration = Duration::from_secs(3600);

impl EngineConfig {
    /// Defaults overridden by `MOTION_METRICS_*` environment variables.
    ///
    /// - `MOTION_METRICS_WINDOW`: window capacity
    /// - `MOTION_METRICS_SMOOTHING`: velocity smoothing factor (0..=1)
    /// - `MOTION_METRICS_INTERVAL_MS`: reporting interval, 1 ms up to one hour
    /// - `MOTION_METRICS_EVENT_CAPACITY`: event channel bound
    /// - `MOTION_METRICS_FRAME_SAMPLES`: 1/0, true/false, yes/no, on/off
    /// - `MOTION_METRICS_SWING_LOG`: export path
    ///
    /// Unparseable values keep the default.
    pub fn from_env() -> Self {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env), reading variables through `var`.
    pub fn from_vars<F>(var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let max_ms = MAX_REPORT_INTERVAL.as_millis() as u64;
        let interval_ms = read_u64(
            &var,
            "MOTION_METRICS_INTERVAL_MS",
            defaults.report_interval.as_millis() as u64,
        );
        if interval_ms > max_ms {
            log::warn!(
                "MOTION_METRICS_INTERVAL_MS={} exceeds {} ms, clamping",
                interval_ms,
                max_ms
            );
        }

        Self {
            window_capacity: read_usize(&var, "MOTION_METRICS_WINDOW", defaults.window_capacity)
                .max(2),
            smoothing_factor: read_f64(&var, "MOTION_METRICS_SMOOTHING", defaults.smoothing_factor)
                .clamp(0.0, 1.0),
            thresholds: defaults.thresholds,
            report_interval: Duration::from_millis(interval_ms.clamp(1, max_ms)),
            event_capacity: read_usize(
                &var,
                "MOTION_METRICS_EVENT_CAPACITY",
                defaults.event_capacity,
            )
            .max(1),
            emit_frame_samples: read_bool(
                &var,
                "MOTION_METRICS_FRAME_SAMPLES",
                defaults.emit_frame_samples,
            ),
            swing_log_path: var("MOTION_METRICS_SWING_LOG")
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.swing_log_path),
        }
    }
}

fn read_bool<F: Fn(&str) -> Option<String>>(var: &F, name: &str, default: bool) -> bool {
    var(name).and_then(|v| parse_bool(&v)).unwrap_or(default)
}

fn parse_bool(v: &str) -> Option<bool> {
    match v.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn read_usize<F: Fn(&str) -> Option<String>>(var: &F, name: &str, default: usize) -> usize {
    var(name)
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(default)
}

fn read_u64<F: Fn(&str) -> Option<String>>(var: &F, name: &str, default: u64) -> u64 {
    var(name)
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(default)
}

fn read_f64<F: Fn(&str) -> Option<String>>(var: &F, name: &str, default: f64) -> f64 {
    var(name)
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(default)
}
