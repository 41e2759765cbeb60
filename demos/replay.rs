//! Replay a recorded skeleton CSV through the metrics engine offline.
//!
//! Prints one line per reporting interval and appends the swing log to the
//! configured export path (`MOTION_METRICS_SWING_LOG`, default SwingData.txt).
//!
//! Usage: cargo run --example replay -- [demos/data/walk.csv]

use motion_metrics::{replay, EngineConfig, MotionMetricsEngine};

fn main() {
    env_logger::init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "demos/data/walk.csv".to_string());
    let config = EngineConfig::from_env();

    let frames = match replay::load_frames_from_csv(&path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Failed to load {}: {}", path, e);
            std::process::exit(1);
        }
    };

    let mut engine = MotionMetricsEngine::new(&config);
    let snapshots = replay::run(&mut engine, &frames, config.report_interval);

    for s in &snapshots {
        let stride = s
            .average_stride
            .map(|v| format!("{:.2} m", v))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{}  velocity={:.2} m/s  swing={:.2} m  stride={:<8}  {}",
            s.timestamp.format("%H:%M:%S%.3f"),
            s.velocity,
            s.swing_length,
            stride,
            s.activity,
        );
    }

    match engine.export_swing_log(&config.swing_log_path) {
        Ok(n) => eprintln!(
            "Appended {} swing records to {}",
            n,
            config.swing_log_path.display()
        ),
        Err(e) => {
            eprintln!("Export failed: {}", e);
            std::process::exit(1);
        }
    }
}
