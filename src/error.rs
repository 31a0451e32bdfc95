//! Crate-wide error type.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GazeError {
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unsupported {kind} schemaVersion: expected {expected}, got {actual}")]
    UnsupportedSchema {
        kind: &'static str,
        expected: u32,
        actual: u32,
    },

    #[error("Invalid screen size {width}x{height}: both sides must be finite and positive")]
    InvalidScreen { width: f64, height: f64 },

    /// Three calibration points that lie on one line cannot define an affine map.
    #[error("Calibration points are collinear (determinant {determinant:.3e})")]
    DegenerateCalibration { determinant: f64 },

    #[error("{mapper} mapper does not accept {calibration} calibration")]
    CalibrationMismatch {
        mapper: &'static str,
        calibration: &'static str,
    },

    #[error("Failed to resolve config directory")]
    NoConfigDir,

    #[error("Failed to spawn capture worker: {0}")]
    WorkerSpawn(#[source] std::io::Error),

    #[error("Failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),

    #[error("Capture worker is not running")]
    WorkerDisconnected,

    #[error("Capture worker panicked")]
    WorkerPanicked,
}

pub type Result<T> = std::result::Result<T, GazeError>;

impl GazeError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GazeError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        GazeError::Json {
            path: path.into(),
            source,
        }
    }
}
