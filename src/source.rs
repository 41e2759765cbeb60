use crate::replay;
use crate::types::TrackedFrame;
use crate::{MetricsError, Result};
use crossbeam_channel::{Receiver, Sender};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Producer of tracked skeletal frames.
///
/// `open` is called once when a session starts. An error means the sensor
/// is unavailable; the session keeps running without frame input.
pub trait FrameSource: Send {
    fn name(&self) -> &str;

    fn open(&mut self) -> Result<Receiver<TrackedFrame>>;
}

/// Frames pushed by the caller through an existing channel.
pub struct ChannelSource {
    name: String,
    receiver: Option<Receiver<TrackedFrame>>,
}

impl ChannelSource {
    pub fn new(name: impl Into<String>, receiver: Receiver<TrackedFrame>) -> Self {
        Self {
            name: name.into(),
            receiver: Some(receiver),
        }
    }
}

impl FrameSource for ChannelSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn open(&mut self) -> Result<Receiver<TrackedFrame>> {
        self.receiver
            .take()
            .ok_or_else(|| MetricsError::SensorUnavailable(format!("{} already opened", self.name)))
    }
}

/// How a [`ReplaySource`] spaces out its frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pacing {
    /// Sleep between frames according to their timestamps.
    RealTime,
    /// Send frames back to back.
    Immediate,
}

enum ReplayInput {
    File(PathBuf),
    Frames(Vec<TrackedFrame>),
}

/// Recorded frames played back on a background thread.
pub struct ReplaySource {
    name: String,
    input: Option<ReplayInput>,
    pacing: Pacing,
    stop_flag: Arc<AtomicBool>,
    thread: Option<std::thread::JoinHandle<()>>,
}

impl ReplaySource {
    /// Replay a CSV recording (see [`replay`](crate::replay) for the layout).
    pub fn from_csv(path: impl Into<PathBuf>, pacing: Pacing) -> Self {
        let path = path.into();
        Self {
            name: path.display().to_string(),
            input: Some(ReplayInput::File(path)),
            pacing,
            stop_flag: Arc::new(AtomicBool::new(false)),
            thread: None,
        }
    }

    pub fn from_frames(name: impl Into<String>, frames: Vec<TrackedFrame>, pacing: Pacing) -> Self {
        Self {
            name: name.into(),
            input: Some(ReplayInput::Frames(frames)),
            pacing,
            stop_flag: Arc::new(AtomicBool::new(false)),
            thread: None,
        }
    }

    fn shutdown(&mut self) {
        self.stop_flag.store(true, Ordering::Relaxed);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl FrameSource for ReplaySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn open(&mut self) -> Result<Receiver<TrackedFrame>> {
        let frames = match self.input.take() {
            Some(ReplayInput::File(path)) => replay::load_frames_from_csv(&path).map_err(|e| {
                MetricsError::SensorUnavailable(format!("cannot load {}: {}", path.display(), e))
            })?,
            Some(ReplayInput::Frames(frames)) => frames,
            None => {
                return Err(MetricsError::SensorUnavailable(format!(
                    "{} already opened",
                    self.name
                )))
            }
        };

        let (sender, receiver) = crossbeam_channel::bounded(64);
        let stop_clone = self.stop_flag.clone();
        let pacing = self.pacing;

        let thread = std::thread::Builder::new()
            .name("motion-replay".into())
            .spawn(move || {
                replay_loop(frames, pacing, sender, stop_clone);
            })
            .map_err(|e| MetricsError::WorkerSpawn(format!("replay thread: {}", e)))?;
        self.thread = Some(thread);

        Ok(receiver)
    }
}

impl Drop for ReplaySource {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn replay_loop(
    frames: Vec<TrackedFrame>,
    pacing: Pacing,
    sender: Sender<TrackedFrame>,
    stop_flag: Arc<AtomicBool>,
) {
    let poll = Duration::from_millis(100);
    let mut previous: Option<crate::types::Timestamp> = None;
    let total = frames.len();

    log::info!("Replay started ({} frames, {:?})", total, pacing);

    for frame in frames {
        if pacing == Pacing::RealTime {
            if let Some(prev) = previous {
                let gap = (frame.timestamp - prev).to_std().unwrap_or(Duration::ZERO);
                if !sleep_unless_stopped(gap, &stop_flag) {
                    return;
                }
            }
            previous = Some(frame.timestamp);
        }

        // Bounded send with a short timeout so the stop flag stays responsive.
        let mut pending = frame;
        loop {
            if stop_flag.load(Ordering::Relaxed) {
                log::info!("Replay stopping (stop flag set)");
                return;
            }
            match sender.send_timeout(pending, poll) {
                Ok(()) => break,
                Err(crossbeam_channel::SendTimeoutError::Timeout(f)) => pending = f,
                Err(crossbeam_channel::SendTimeoutError::Disconnected(_)) => {
                    log::info!("Replay receiver dropped, stopping");
                    return;
                }
            }
        }
    }

    log::info!("Replay finished after {} frames", total);
}

/// Sleep for `total`, waking every 100 ms to check `stop_flag`.
/// Returns false if stopped early.
fn sleep_unless_stopped(total: Duration, stop_flag: &AtomicBool) -> bool {
    let poll = Duration::from_millis(100);
    let mut remaining = total;
    while !remaining.is_zero() {
        if stop_flag.load(Ordering::Relaxed) {
            return false;
        }
        let chunk = remaining.min(poll);
        std::thread::sleep(chunk);
        remaining -= chunk;
    }
    !stop_flag.load(Ordering::Relaxed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Joint, Point3};
    use chrono::{TimeZone, Utc};

    fn frames(n: i64) -> Vec<TrackedFrame> {
        (0..n)
            .map(|i| {
                TrackedFrame::new(Utc.timestamp_millis_opt(i * 10).unwrap())
                    .with_tracked(Joint::HipCenter, Point3::new(i as f64, 0.0, 0.0))
            })
            .collect()
    }

    #[test]
    fn test_channel_source_opens_once() {
        let (_tx, rx) = crossbeam_channel::unbounded();
        let mut source = ChannelSource::new("test", rx);
        assert!(source.open().is_ok());
        assert!(matches!(source.open(), Err(MetricsError::SensorUnavailable(_))));
    }

    #[test]
    fn test_replay_delivers_all_frames_in_order() {
        let mut source = ReplaySource::from_frames("mem", frames(100), Pacing::Immediate);
        let rx = source.open().unwrap();
        let received: Vec<TrackedFrame> = rx.iter().collect();
        assert_eq!(received.len(), 100);
        assert_eq!(received[42].tracked(Joint::HipCenter), Some(Point3::new(42.0, 0.0, 0.0)));
    }

    #[test]
    fn test_replay_realtime_paces_frames() {
        let mut source = ReplaySource::from_frames("mem", frames(6), Pacing::RealTime);
        let start = std::time::Instant::now();
        let count = source.open().unwrap().iter().count();
        assert_eq!(count, 6);
        // Five 10 ms gaps.
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[test]
    fn test_replay_missing_file_is_unavailable() {
        let mut source = ReplaySource::from_csv("/nonexistent/motion.csv", Pacing::Immediate);
        assert!(matches!(source.open(), Err(MetricsError::SensorUnavailable(_))));
    }

    #[test]
    fn test_replay_drop_stops_thread() {
        let mut source = ReplaySource::from_frames("mem", frames(1000), Pacing::Immediate);
        let rx = source.open().unwrap();
        let _first = rx.recv().unwrap();
        // Channel is full; dropping the source must not hang.
        drop(source);
        drop(rx);
    }
}
