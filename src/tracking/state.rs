//! Gaze session shared between a capture thread and the render loop.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::models::settings::TrackerSettings;
use crate::tracking::session::GazeSession;

/// Single-mutex handle: the capture side writes, the render side reads.
#[derive(Debug, Clone)]
pub struct SharedGazeSession(pub Arc<Mutex<GazeSession>>);

impl SharedGazeSession {
    pub fn new(session: GazeSession) -> Self {
        Self(Arc::new(Mutex::new(session)))
    }

    pub fn from_settings(settings: &TrackerSettings) -> Self {
        Self::new(GazeSession::new(settings))
    }

    /// Locks the session. A writer that panicked mid-frame leaves plain
    /// numbers behind, so a poisoned lock is recovered rather than propagated.
    pub fn lock(&self) -> MutexGuard<'_, GazeSession> {
        self.0.lock().unwrap_or_else(|poisoned: PoisonError<_>| {
            log::warn!("gaze session lock was poisoned; recovering");
            poisoned.into_inner()
        })
    }

    pub fn gaze_position(&self) -> Option<(f64, f64)> {
        self.lock().gaze_position()
    }

    pub fn calibrate(&self, left: f64, right: f64, top: f64, bottom: f64) {
        self.lock().calibrate(left, right, top, bottom);
    }
}
