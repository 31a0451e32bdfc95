//! trace.json I/O and paced replay of recorded sessions.

use std::path::Path;
use std::time::Duration;

use tokio::time::MissedTickBehavior;

use crate::error::{GazeError, Result};
use crate::models::settings::TrackerSettings;
use crate::models::trace::{TraceFile, SCHEMA_VERSION};
use crate::tracking::provider::{Frame, ReplayProvider};
use crate::tracking::session::GazeSession;

/// Outcome of running a trace through a fresh session.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayReport {
    /// Per frame: timestamp and the new smoothed position, `None` when the
    /// frame held the previous one.
    pub path: Vec<(u64, Option<(f64, f64)>)>,
    pub detected_frames: u64,
    pub final_position: Option<(f64, f64)>,
}

pub fn load_trace(path: &Path) -> Result<TraceFile> {
    let raw = std::fs::read_to_string(path).map_err(|e| GazeError::io(path, e))?;
    let trace: TraceFile = serde_json::from_str(&raw).map_err(|e| GazeError::json(path, e))?;

    if trace.schema_version != SCHEMA_VERSION {
        return Err(GazeError::UnsupportedSchema {
            kind: "trace",
            expected: SCHEMA_VERSION,
            actual: trace.schema_version,
        });
    }

    if !trace.screen.is_valid() {
        return Err(GazeError::InvalidScreen {
            width: trace.screen.width,
            height: trace.screen.height,
        });
    }

    log::info!(
        "load_trace: session={} frames={} path={}",
        trace.session_id,
        trace.frames.len(),
        path.display()
    );
    Ok(trace)
}

pub fn save_trace(trace: &TraceFile, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| GazeError::io(parent, e))?;
    }

    let json = serde_json::to_string_pretty(trace).map_err(|e| GazeError::json(path, e))?;
    std::fs::write(path, json).map_err(|e| GazeError::io(path, e))?;

    log::info!("save_trace: session={} path={}", trace.session_id, path.display());
    Ok(())
}

/// Feeds `trace` through a new session built from `settings`, mapped onto the
/// screen the trace was recorded on. With `fps` set, frames are paced by a
/// tokio interval; `None` (or 0) replays as fast as possible.
pub async fn replay_trace(
    trace: TraceFile,
    settings: &TrackerSettings,
    fps: Option<u32>,
) -> ReplayReport {
    let settings = TrackerSettings {
        screen: trace.screen,
        ..settings.clone()
    };
    let session_id = trace.session_id.clone();
    let mut session = GazeSession::new(&settings);
    let mut provider = ReplayProvider::new(trace);

    let mut pacer = fps.filter(|fps| *fps > 0).map(|fps| {
        let mut interval = tokio::time::interval(Duration::from_secs_f64(1.0 / f64::from(fps)));
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval
    });

    let mut path = Vec::with_capacity(provider.remaining());
    while let Some(ts) = provider.next_ts() {
        if let Some(pacer) = pacer.as_mut() {
            pacer.tick().await;
        }
        let position = session.process_frame(&mut provider, &Frame::timestamp_only(ts));
        path.push((ts, position));
    }

    log::info!(
        "replay_trace: session={session_id} frames={} detected={}",
        session.frames_processed(),
        session.detected_frames()
    );

    ReplayReport {
        path,
        detected_frames: session.detected_frames(),
        final_position: session.gaze_position(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::landmarks::{EyeLandmarks, Point2};
    use crate::models::settings::ScreenSize;
    use crate::models::trace::TraceFrame;

    fn bottom_right_eyes() -> EyeLandmarks {
        EyeLandmarks::from_irises(Point2::new(0.55, 0.4), Point2::new(0.65, 0.4))
    }

    fn sample_trace() -> TraceFile {
        TraceFile {
            schema_version: SCHEMA_VERSION,
            session_id: uuid::Uuid::new_v4().to_string(),
            start_time_ms: 1_700_000_000_000,
            screen: ScreenSize::default(),
            frames: vec![
                TraceFrame {
                    ts: 0,
                    landmarks: Some(bottom_right_eyes()),
                },
                TraceFrame {
                    ts: 33,
                    landmarks: None,
                },
            ],
        }
    }

    fn scratch_dir() -> std::path::PathBuf {
        std::env::temp_dir().join(format!("gazefocus-test-{}", uuid::Uuid::new_v4()))
    }

    #[test]
    fn saved_trace_loads_back() {
        let dir = scratch_dir();
        let path = dir.join("trace.json");
        let trace = sample_trace();

        save_trace(&trace, &path).expect("save");
        assert_eq!(load_trace(&path).expect("load"), trace);

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn unsupported_trace_schema_is_rejected() {
        let dir = scratch_dir();
        let path = dir.join("trace.json");
        let mut trace = sample_trace();
        trace.schema_version = 2;
        save_trace(&trace, &path).expect("save");

        assert!(matches!(
            load_trace(&path),
            Err(GazeError::UnsupportedSchema {
                kind: "trace",
                actual: 2,
                ..
            })
        ));

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn trace_with_degenerate_screen_is_rejected() {
        let dir = scratch_dir();
        let path = dir.join("trace.json");
        let mut trace = sample_trace();
        trace.screen = ScreenSize::new(-1600.0, 0.0);
        save_trace(&trace, &path).expect("save");

        assert!(matches!(load_trace(&path), Err(GazeError::InvalidScreen { .. })));

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn missing_trace_is_an_io_error() {
        let path = scratch_dir().join("trace.json");
        assert!(matches!(load_trace(&path), Err(GazeError::Io { .. })));
    }

    #[tokio::test]
    async fn replay_moves_then_holds() {
        let report = replay_trace(sample_trace(), &TrackerSettings::default(), None).await;

        assert_eq!(report.path.len(), 2);
        assert_eq!(report.detected_frames, 1);

        let (ts, first) = report.path[0];
        assert_eq!(ts, 0);
        let (x, y) = first.expect("first frame detected");
        assert!((x - 920.0).abs() < 1e-9);
        assert!((y - 517.5).abs() < 1e-9);

        assert_eq!(report.path[1], (33, None));
        let (fx, fy) = report.final_position.expect("position");
        assert!((fx - 920.0).abs() < 1e-9);
        assert!((fy - 517.5).abs() < 1e-9);
    }

    #[tokio::test]
    async fn paced_replay_matches_unpaced() {
        let settings = TrackerSettings::default();
        let unpaced = replay_trace(sample_trace(), &settings, None).await;
        let paced = replay_trace(sample_trace(), &settings, Some(500)).await;
        assert_eq!(paced, unpaced);
    }

    #[tokio::test]
    async fn replay_uses_recorded_screen() {
        let mut trace = sample_trace();
        trace.screen = ScreenSize::new(1000.0, 500.0);

        let report = replay_trace(trace, &TrackerSettings::default(), Some(0)).await;
        let (x, y) = report.final_position.expect("position");
        // Start at the center (500, 250), target (1000, 500).
        assert!((x - 575.0).abs() < 1e-9);
        assert!((y - 287.5).abs() < 1e-9);
    }
}
