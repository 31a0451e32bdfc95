//! Landmark trace recorder.
//!
//! Collects the provider output of every processed frame so a session can be
//! replayed later with different calibration or smoothing settings.

use crate::models::landmarks::EyeLandmarks;
use crate::models::settings::ScreenSize;
use crate::models::trace::{TraceFile, TraceFrame, SCHEMA_VERSION};

#[derive(Debug, Clone)]
pub struct TraceRecorder {
    session_id: String,
    start_time_ms: u64,
    screen: ScreenSize,
    frames: Vec<TraceFrame>,
}

impl TraceRecorder {
    pub fn new(screen: ScreenSize) -> Self {
        let session_id = uuid::Uuid::new_v4().to_string();
        let start_time_ms = chrono::Utc::now().timestamp_millis().max(0) as u64;
        log::info!("trace recorder: session={session_id} screen={}x{}", screen.width, screen.height);
        Self {
            session_id,
            start_time_ms,
            screen,
            frames: Vec::new(),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// `ts` is milliseconds since the session started.
    pub fn record(&mut self, ts: u64, landmarks: Option<&EyeLandmarks>) {
        self.frames.push(TraceFrame {
            ts,
            landmarks: landmarks.cloned(),
        });
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn finish(self) -> TraceFile {
        log::info!(
            "trace recorder: session={} frames={}",
            self.session_id,
            self.frames.len()
        );
        TraceFile {
            schema_version: SCHEMA_VERSION,
            session_id: self.session_id,
            start_time_ms: self.start_time_ms,
            screen: self.screen,
            frames: self.frames,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::landmarks::Point2;

    #[test]
    fn finished_trace_keeps_frames_in_order() {
        let mut recorder = TraceRecorder::new(ScreenSize::default());
        let eyes = EyeLandmarks::from_irises(Point2::new(0.4, 0.5), Point2::new(0.6, 0.5));
        recorder.record(0, Some(&eyes));
        recorder.record(16, None);
        recorder.record(33, Some(&eyes));

        let session_id = recorder.session_id().to_string();
        let trace = recorder.finish();
        assert_eq!(trace.schema_version, SCHEMA_VERSION);
        assert_eq!(trace.session_id, session_id);
        assert!(uuid::Uuid::parse_str(&trace.session_id).is_ok());
        assert_eq!(trace.frames.iter().map(|f| f.ts).collect::<Vec<_>>(), vec![0, 16, 33]);
        assert_eq!(trace.detected_frames(), 2);
        assert!(trace.start_time_ms > 0);
    }
}
