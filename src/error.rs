use std::path::PathBuf;

/// Errors that can occur while tracking motion metrics.
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    #[error("Sensor unavailable: {0}")]
    SensorUnavailable(String),

    #[error("Failed to export swing log to {}: {source}", path.display())]
    Export {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid replay row {row}: {reason}")]
    ReplayRow { row: usize, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Timeout waiting for metric events")]
    Timeout,

    #[error("Metrics session stopped")]
    StreamStopped,

    #[error("Failed to spawn worker thread: {0}")]
    WorkerSpawn(String),
}
