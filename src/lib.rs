//! # motion_metrics - live motion metrics from skeletal tracking
//!
//! Turns a stream of tracked skeletal frames into:
//! - Smoothed hip velocity (m/s)
//! - Right-wrist swing arc length over a trailing window (m)
//! - Average stride length from both feet (m)
//! - An activity label (Standing / Walking / Running) once per reporting tick
//!
//! ## Quick Start
//! ```no_run
//! use motion_metrics::{ChannelSource, EngineConfig, MetricEvent, Session};
//! use std::time::Duration;
//!
//! let (frames_tx, frames_rx) = crossbeam_channel::unbounded();
//! let session = Session::start(EngineConfig::default(), ChannelSource::new("sensor", frames_rx)).unwrap();
//! # drop(frames_tx);
//!
//! loop {
//!     match session.recv_timeout(Duration::from_secs(2)) {
//!         Ok(MetricEvent::Snapshot(s)) => println!("{} {:.2} m/s", s.activity, s.velocity),
//!         Ok(_) => {}
//!         Err(_) => break,
//!     }
//! }
//! ```

pub mod error;
pub mod types;
pub mod window;
pub mod velocity;
pub mod swing;
pub mod stride;
pub mod classifier;
pub mod export;
pub mod config;
pub mod engine;
pub mod source;
pub mod replay;
pub mod session;

pub use classifier::{classify, ActivityThresholds};
pub use config::EngineConfig;
pub use engine::MotionMetricsEngine;
pub use error::MetricsError;
pub use export::SwingDataLog;
pub use session::{Session, SensorStatus};
pub use source::{ChannelSource, FrameSource, Pacing, ReplaySource};
pub use types::*;

/// Result type alias for motion_metrics operations.
pub type Result<T> = std::result::Result<T, MetricsError>;
