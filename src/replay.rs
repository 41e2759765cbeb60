//! Recorded skeletal frames: CSV loading and offline replay.
//!
//! The CSV layout is one row per joint sample, rows sharing a timestamp
//! forming one frame:
//!
//! ```text
//! timestamp_ms,joint,state,x,y,z
//! 0,hip_center,tracked,0.01,0.92,2.10
//! 0,wrist_right,tracked,0.25,0.85,2.05
//! 33,foot_left,not_tracked,0,0,0
//! ```
//!
//! A joint may appear at most once per timestamp.

use crate::engine::MotionMetricsEngine;
use crate::types::{Joint, JointState, Point3, Snapshot, Timestamp, TrackedFrame};
use crate::{MetricsError, Result};
use chrono::{TimeZone, Utc};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::time::Duration;

/// Load frames from a CSV file, ordered by timestamp.
pub fn load_frames_from_csv(path: impl AsRef<Path>) -> Result<Vec<TrackedFrame>> {
    let path = path.as_ref();
    let reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)?;
    let frames = read_frames(reader)?;
    log::info!("Loaded {} frames from {}", frames.len(), path.display());
    Ok(frames)
}

/// Parse frames from any CSV reader (header row required).
pub fn parse_frames<R: std::io::Read>(input: R) -> Result<Vec<TrackedFrame>> {
    let reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(input);
    read_frames(reader)
}

fn read_frames<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<Vec<TrackedFrame>> {
    let mut frames: BTreeMap<i64, TrackedFrame> = BTreeMap::new();
    let mut seen: HashSet<(i64, Joint)> = HashSet::new();

    for (idx, result) in reader.records().enumerate() {
        let row = idx + 1;
        let record = result?;
        if record.len() < 6 {
            return Err(row_error(row, format!("expected 6 columns, got {}", record.len())));
        }

        let ms: i64 = record[0]
            .parse()
            .map_err(|_| row_error(row, format!("bad timestamp '{}'", &record[0])))?;
        let joint = Joint::parse(&record[1])
            .ok_or_else(|| row_error(row, format!("unknown joint '{}'", &record[1])))?;
        let state = JointState::parse(&record[2])
            .ok_or_else(|| row_error(row, format!("unknown state '{}'", &record[2])))?;
        let mut coords = [0.0f64; 3];
        for (i, c) in coords.iter_mut().enumerate() {
            *c = record[3 + i]
                .parse()
                .map_err(|_| row_error(row, format!("bad coordinate '{}'", &record[3 + i])))?;
        }

        let timestamp = timestamp_from_millis(ms)
            .ok_or_else(|| row_error(row, format!("timestamp {} out of range", ms)))?;
        if !seen.insert((ms, joint)) {
            return Err(row_error(
                row,
                format!("duplicate {} sample at {} ms", joint.as_str(), ms),
            ));
        }
        frames
            .entry(ms)
            .or_insert_with(|| TrackedFrame::new(timestamp))
            .set(joint, Point3::new(coords[0], coords[1], coords[2]), state);
    }

    Ok(frames.into_values().collect())
}

fn row_error(row: usize, reason: String) -> MetricsError {
    MetricsError::ReplayRow { row, reason }
}

fn timestamp_from_millis(ms: i64) -> Option<Timestamp> {
    Utc.timestamp_millis_opt(ms).single()
}

/// Drive `engine` through `frames` using frame time as the clock.
///
/// A tick fires every `interval` after the first frame, always before the
/// first frame at or past the boundary, and once more after the last frame
/// to close the trailing interval. Returns the snapshots in order.
///
/// Intervals shorter than a millisecond are raised to one. An interval whose
/// boundary falls outside the representable time range never fires mid-run;
/// the closing tick then carries the last frame's timestamp.
pub fn run(
    engine: &mut MotionMetricsEngine,
    frames: &[TrackedFrame],
    interval: Duration,
) -> Vec<Snapshot> {
    let (Some(first), Some(last)) = (frames.first(), frames.last()) else {
        return Vec::new();
    };
    let step = chrono::Duration::from_std(interval.max(Duration::from_millis(1))).ok();
    let advance = |from: Timestamp| step.and_then(|s| from.checked_add_signed(s));
    let mut next_tick = advance(first.timestamp);
    let mut snapshots = Vec::new();

    for frame in frames {
        while let Some(tick) = next_tick.filter(|tick| frame.timestamp >= *tick) {
            snapshots.push(engine.on_reporting_tick(tick));
            next_tick = advance(tick);
        }
        engine.on_tracked_frame(frame);
    }
    snapshots.push(engine.on_reporting_tick(next_tick.unwrap_or(last.timestamp)));

    snapshots
}
