//! Run a live session over a synthetic walker and print metric events.
//!
//! A generator thread stands in for the sensor runtime, delivering ~30 fps
//! frames with a speed that ramps from standing to a jog. Snapshots are
//! printed as they arrive; the swing log is exported on exit.
//!
//! Usage: cargo run --example live
//! Runs for 15 seconds.

use motion_metrics::{
    ChannelSource, EngineConfig, Joint, MetricEvent, Point3, Session, TrackedFrame,
};
use std::time::{Duration, Instant};

const RUN_FOR: Duration = Duration::from_secs(15);

fn main() {
    env_logger::init();

    let config = EngineConfig::from_env();
    let (frames_tx, frames_rx) = crossbeam_channel::bounded(64);

    let generator = std::thread::Builder::new()
        .name("synthetic-walker".into())
        .spawn(move || {
            let start = Instant::now();
            let mut x = 0.0;
            while start.elapsed() < RUN_FOR {
                let t = start.elapsed().as_secs_f64();
                // 0 m/s for 3 s, then ramp to 3 m/s.
                let speed = ((t - 3.0) * 0.4).clamp(0.0, 3.0);
                x += speed / 30.0;
                let phase = (t * 2.0 * std::f64::consts::PI * (0.8 + speed * 0.3)).sin();
                let arm = 0.1 + 0.15 * speed;
                let frame = TrackedFrame::new(chrono::Utc::now())
                    .with_tracked(Joint::HipCenter, Point3::new(x, 0.92, 2.1))
                    .with_tracked(Joint::WristRight, Point3::new(x + arm * phase, 0.85, 2.05))
                    .with_tracked(Joint::FootLeft, Point3::new(x + 0.1 * speed * phase, 0.03, 2.0))
                    .with_tracked(Joint::FootRight, Point3::new(x - 0.1 * speed * phase, 0.03, 2.2));
                if frames_tx.send(frame).is_err() {
                    break;
                }
                std::thread::sleep(Duration::from_millis(33));
            }
        })
        .unwrap_or_else(|e| {
            eprintln!("Failed to spawn generator: {}", e);
            std::process::exit(1);
        });

    let session = match Session::start(config, ChannelSource::new("synthetic", frames_rx)) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to start session: {}", e);
            std::process::exit(1);
        }
    };

    println!("Streaming metrics (status: {:?})...", session.status());

    let mut velocity_points: u64 = 0;
    let mut stride_points: u64 = 0;

    loop {
        match session.recv_timeout(Duration::from_secs(2)) {
            Ok(MetricEvent::Velocity { .. }) => velocity_points += 1,
            Ok(MetricEvent::Stride { .. }) => stride_points += 1,
            Ok(MetricEvent::Snapshot(s)) => {
                println!(
                    "{}  velocity={:.2} m/s  swing={:.2} m  stride={:.2} m  {}",
                    s.timestamp.format("%H:%M:%S"),
                    s.velocity,
                    s.swing_length,
                    s.average_stride.unwrap_or(0.0),
                    s.activity,
                );
                if s.timestamp.timestamp() % 5 == 0 {
                    println!(
                        "--- {} velocity points, {} stride points so far ---",
                        velocity_points, stride_points
                    );
                }
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                break;
            }
        }

        if generator.is_finished() {
            break;
        }
    }

    let _ = generator.join();
    match session.export_swing_log_default() {
        Ok(n) => println!("\nExported {} swing records", n),
        Err(e) => eprintln!("\nExport failed: {}", e),
    }
    session.stop();
}
