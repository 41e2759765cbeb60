use crate::config::EngineConfig;
use crate::engine::MotionMetricsEngine;
use crate::export;
use crate::source::FrameSource;
use crate::types::{MetricEvent, TrackedFrame};
use crate::{MetricsError, Result};
use crossbeam_channel::{Receiver, Sender};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// State of the frame input as seen by a running session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SensorStatus {
    Streaming,
    /// The source failed to open; the session ticks without frames.
    Unavailable(String),
    /// The source stopped delivering frames mid-session.
    Disconnected,
}

/// A running metrics session.
///
/// A background worker serialises frame delivery and reporting ticks
/// against one engine and pushes [`MetricEvent`]s onto a bounded channel.
/// When the channel is full, new events are dropped rather than blocking
/// the worker.
pub struct Session {
    engine: Arc<Mutex<MotionMetricsEngine>>,
    status: Arc<Mutex<SensorStatus>>,
    receiver: Receiver<MetricEvent>,
    stop_flag: Arc<AtomicBool>,
    thread: Option<std::thread::JoinHandle<()>>,
    swing_log_path: PathBuf,
}

impl Session {
    /// Open `source` and start the worker thread.
    ///
    /// A source that fails to open does not fail the session: the error is
    /// logged and reported through [`status`](Self::status).
    pub fn start<S>(config: EngineConfig, mut source: S) -> Result<Session>
    where
        S: FrameSource + 'static,
    {
        let (frames, status) = match source.open() {
            Ok(rx) => {
                log::info!("Frame source '{}' opened", source.name());
                (rx, SensorStatus::Streaming)
            }
            Err(e) => {
                log::warn!("Frame source '{}' unavailable: {}", source.name(), e);
                (crossbeam_channel::never(), SensorStatus::Unavailable(e.to_string()))
            }
        };

        let engine = Arc::new(Mutex::new(MotionMetricsEngine::new(&config)));
        let status = Arc::new(Mutex::new(status));
        let (sender, receiver) = crossbeam_channel::bounded(config.event_capacity.max(1));
        let stop_flag = Arc::new(AtomicBool::new(false));

        let worker = Worker {
            engine: engine.clone(),
            status: status.clone(),
            sender,
            stop_flag: stop_flag.clone(),
            report_interval: config.report_interval,
            emit_frame_samples: config.emit_frame_samples,
        };

        let thread = std::thread::Builder::new()
            .name("motion-metrics".into())
            .spawn(move || {
                worker.run(frames, source);
            })
            .map_err(|e| MetricsError::WorkerSpawn(e.to_string()))?;

        Ok(Session {
            engine,
            status,
            receiver,
            stop_flag,
            thread: Some(thread),
            swing_log_path: config.swing_log_path,
        })
    }

    /// Block until the worker emits the next metric event.
    ///
    /// Fails with [`MetricsError::StreamStopped`] once the worker has exited.
    pub fn recv(&self) -> Result<MetricEvent> {
        self.receiver.recv().map_err(|_| MetricsError::StreamStopped)
    }

    /// Next queued metric event, if the worker has produced one.
    pub fn try_recv(&self) -> Option<MetricEvent> {
        self.receiver.try_recv().ok()
    }

    /// Wait up to `timeout` for a velocity, stride or snapshot event.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<MetricEvent> {
        self.receiver.recv_timeout(timeout).map_err(|e| match e {
            crossbeam_channel::RecvTimeoutError::Timeout => MetricsError::Timeout,
            crossbeam_channel::RecvTimeoutError::Disconnected => MetricsError::StreamStopped,
        })
    }

    pub fn status(&self) -> SensorStatus {
        lock(&self.status).clone()
    }

    /// Run `f` against the engine while holding the session lock.
    pub fn with_engine<R>(&self, f: impl FnOnce(&MotionMetricsEngine) -> R) -> R {
        let guard = lock(&self.engine);
        f(&guard)
    }

    /// Append the swing log to `path`. The log is copied under the lock and
    /// written after releasing it, so frames keep flowing during file I/O.
    pub fn export_swing_log(&self, path: impl AsRef<Path>) -> Result<usize> {
        let records = self.with_engine(|engine| engine.swing_log().records().to_vec());
        export::export_records(&records, path)
    }

    /// Append the swing log to the configured path.
    pub fn export_swing_log_default(&self) -> Result<usize> {
        self.export_swing_log(&self.swing_log_path)
    }

    /// Whether reporting ticks are still being produced.
    pub fn is_active(&self) -> bool {
        !self.stop_flag.load(Ordering::Relaxed)
    }

    /// End the session: no further frames are consumed and no further
    /// snapshots are emitted. Export the swing log before calling this.
    pub fn stop(mut self) {
        self.shutdown();
    }

    /// Joining the worker also drops the frame source it owns.
    fn shutdown(&mut self) {
        self.stop_flag.store(true, Ordering::Relaxed);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::warn!("Metrics worker panicked before shutdown");
            }
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

struct Worker {
    engine: Arc<Mutex<MotionMetricsEngine>>,
    status: Arc<Mutex<SensorStatus>>,
    sender: Sender<MetricEvent>,
    stop_flag: Arc<AtomicBool>,
    report_interval: Duration,
    emit_frame_samples: bool,
}

impl Worker {
    /// Frames and ticks are handled one at a time, each under the engine
    /// lock, so a tick never observes a half-applied frame.
    fn run<S: FrameSource>(self, mut frames: Receiver<TrackedFrame>, source: S) {
        let ticker = crossbeam_channel::tick(self.report_interval);
        let poll = Duration::from_millis(100);

        log::info!("Metrics worker started (interval {:?})", self.report_interval);

        loop {
            if self.stop_flag.load(Ordering::Relaxed) {
                log::info!("Metrics worker stopping (stop flag set)");
                break;
            }

            let mut disconnected = false;
            crossbeam_channel::select! {
                recv(frames) -> msg => match msg {
                    Ok(frame) => self.handle_frame(&frame),
                    Err(_) => disconnected = true,
                },
                recv(ticker) -> _ => self.handle_tick(),
                default(poll) => {}
            }

            if disconnected {
                log::warn!("Frame source '{}' disconnected; ticking without frames", source.name());
                *lock(&self.status) = SensorStatus::Disconnected;
                frames = crossbeam_channel::never();
            }
        }

        // Dropping the source joins any replay thread it owns.
        drop(source);
    }

    fn handle_frame(&self, frame: &TrackedFrame) {
        let update = lock(&self.engine).on_tracked_frame(frame);

        if !self.emit_frame_samples {
            return;
        }
        if let Some(velocity) = update.velocity {
            self.emit(MetricEvent::Velocity {
                timestamp: frame.timestamp,
                velocity,
            });
        }
        if let Some(average) = update.stride_average {
            self.emit(MetricEvent::Stride {
                timestamp: frame.timestamp,
                average,
            });
        }
    }

    fn handle_tick(&self) {
        let snapshot = lock(&self.engine).on_reporting_tick(chrono::Utc::now());
        self.emit(MetricEvent::Snapshot(snapshot));
    }

    fn emit(&self, event: MetricEvent) {
        if let Err(e) = self.sender.try_send(event) {
            match e {
                crossbeam_channel::TrySendError::Full(_) => {
                    log::trace!("Event channel full, dropping event");
                }
                crossbeam_channel::TrySendError::Disconnected(_) => {
                    log::trace!("Event receiver gone, dropping event");
                }
            }
        }
    }
}
