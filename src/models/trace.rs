//! Recorded landmark trace schema (trace.json).
//! schemaVersion: 1

use serde::{Deserialize, Serialize};

use crate::models::landmarks::EyeLandmarks;
use crate::models::settings::ScreenSize;

pub const SCHEMA_VERSION: u32 = 1;

/// One processed camera frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceFrame {
    /// Milliseconds since the session started.
    pub ts: u64,
    /// `None` when no face was detected in this frame.
    #[serde(default)]
    pub landmarks: Option<EyeLandmarks>,
}

/// Root container of trace.json.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceFile {
    pub schema_version: u32,
    pub session_id: String,
    /// Unix timestamp (ms) of the first recorded frame's session start.
    pub start_time_ms: u64,
    /// Screen the gaze was mapped onto while recording.
    pub screen: ScreenSize,
    pub frames: Vec<TraceFrame>,
}

impl TraceFile {
    pub fn detected_frames(&self) -> usize {
        self.frames
            .iter()
            .filter(|frame| frame.landmarks.is_some())
            .count()
    }

    pub fn duration_ms(&self) -> u64 {
        match (self.frames.first(), self.frames.last()) {
            (Some(first), Some(last)) => last.ts.saturating_sub(first.ts),
            _ => 0,
        }
    }
}
