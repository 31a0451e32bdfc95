//! Landmark provider seam.
//!
//! The face-mesh model lives outside this crate; it is reached through
//! [`LandmarkProvider`]. [`ReplayProvider`] plays a recorded trace back through
//! the same seam.

use std::collections::VecDeque;

use crate::models::landmarks::EyeLandmarks;
use crate::models::trace::{TraceFile, TraceFrame};

/// One RGB camera frame (row-major, 3 bytes per pixel).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
    /// Milliseconds since the session started.
    pub ts: u64,
}

impl Frame {
    /// Returns `None` when the buffer does not hold `width * height` RGB pixels.
    pub fn from_rgb(width: u32, height: u32, rgb: Vec<u8>, ts: u64) -> Option<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(3)?;
        if rgb.len() != expected {
            return None;
        }
        Some(Self {
            width,
            height,
            rgb,
            ts,
        })
    }

    /// A pixel-less frame for providers that ignore image content.
    pub fn timestamp_only(ts: u64) -> Self {
        Self {
            width: 0,
            height: 0,
            rgb: Vec::new(),
            ts,
        }
    }
}

pub trait LandmarkProvider: Send {
    /// Eye landmarks of the first face in `frame`, or `None` when no face was found.
    fn detect(&mut self, frame: &Frame) -> Option<EyeLandmarks>;
}

impl<F> LandmarkProvider for F
where
    F: FnMut(&Frame) -> Option<EyeLandmarks> + Send,
{
    fn detect(&mut self, frame: &Frame) -> Option<EyeLandmarks> {
        self(frame)
    }
}

/// Replays recorded landmarks, one trace frame per `detect` call.
#[derive(Debug, Clone, Default)]
pub struct ReplayProvider {
    frames: VecDeque<TraceFrame>,
}

impl ReplayProvider {
    pub fn new(trace: TraceFile) -> Self {
        Self {
            frames: trace.frames.into(),
        }
    }

    pub fn from_frames(frames: Vec<TraceFrame>) -> Self {
        Self {
            frames: frames.into(),
        }
    }

    /// Timestamp of the next frame to be replayed.
    pub fn next_ts(&self) -> Option<u64> {
        self.frames.front().map(|frame| frame.ts)
    }

    pub fn remaining(&self) -> usize {
        self.frames.len()
    }

    pub fn is_finished(&self) -> bool {
        self.frames.is_empty()
    }
}

impl LandmarkProvider for ReplayProvider {
    fn detect(&mut self, _frame: &Frame) -> Option<EyeLandmarks> {
        self.frames.pop_front().and_then(|frame| frame.landmarks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::landmarks::Point2;

    #[test]
    fn frame_rejects_mismatched_buffer() {
        assert!(Frame::from_rgb(2, 2, vec![0; 12], 0).is_some());
        assert!(Frame::from_rgb(2, 2, vec![0; 11], 0).is_none());
    }

    #[test]
    fn replay_yields_frames_in_order_then_nothing() {
        let eyes = EyeLandmarks::from_irises(Point2::new(0.4, 0.5), Point2::new(0.6, 0.5));
        let mut provider = ReplayProvider::from_frames(vec![
            TraceFrame {
                ts: 0,
                landmarks: Some(eyes.clone()),
            },
            TraceFrame {
                ts: 16,
                landmarks: None,
            },
        ]);

        assert_eq!(provider.next_ts(), Some(0));
        let frame = Frame::timestamp_only(0);
        assert_eq!(provider.detect(&frame), Some(eyes));
        assert_eq!(provider.next_ts(), Some(16));
        assert_eq!(provider.detect(&frame), None);
        assert!(provider.is_finished());
        assert_eq!(provider.detect(&frame), None);
    }

    #[test]
    fn closures_act_as_providers() {
        let mut calls = 0;
        let mut provider = |_frame: &Frame| -> Option<EyeLandmarks> {
            calls += 1;
            None
        };
        assert_eq!(LandmarkProvider::detect(&mut provider, &Frame::timestamp_only(0)), None);
        drop(provider);
        assert_eq!(calls, 1);
    }
}
