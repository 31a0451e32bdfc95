//! Background capture worker.
//!
//! Architecture:
//!   1. The render loop hands camera frames to `submit`, which never blocks: a
//!      full queue drops the frame and counts it.
//!   2. The worker thread (`gf-capture`) runs the landmark provider outside the
//!      session lock, then folds the result into the shared session and, when
//!      enabled, into a trace recorder.
//!   3. `stop` sends `CaptureInput::Stop`, joins the thread and returns the
//!      counters together with the recorded trace.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{sync_channel, SyncSender, TrySendError};
use std::sync::Arc;
use std::thread::JoinHandle;

use crate::error::{GazeError, Result};
use crate::models::trace::TraceFile;
use crate::telemetry::recorder::TraceRecorder;
use crate::tracking::provider::{Frame, LandmarkProvider};
use crate::tracking::state::SharedGazeSession;

pub const DEFAULT_QUEUE_DEPTH: usize = 4;

pub enum CaptureInput {
    Frame(Frame),
    /// Ends the worker loop; frames queued before it are still processed.
    Stop,
}

#[derive(Debug, Clone)]
pub struct CaptureSummary {
    pub processed: u64,
    pub dropped: u64,
    pub trace: Option<TraceFile>,
}

pub struct CaptureWorker {
    tx: SyncSender<CaptureInput>,
    dropped: Arc<AtomicU64>,
    handle: JoinHandle<(u64, Option<TraceFile>)>,
}

impl CaptureWorker {
    pub fn spawn<P>(
        session: SharedGazeSession,
        mut provider: P,
        record_trace: bool,
        queue_depth: usize,
    ) -> Result<Self>
    where
        P: LandmarkProvider + 'static,
    {
        let (tx, rx) = sync_channel::<CaptureInput>(queue_depth.max(1));
        let mut recorder = record_trace.then(|| TraceRecorder::new(session.lock().screen()));

        let handle = std::thread::Builder::new()
            .name("gf-capture".to_string())
            .spawn(move || {
                let mut processed = 0u64;

                for input in rx {
                    let frame = match input {
                        CaptureInput::Stop => break,
                        CaptureInput::Frame(frame) => frame,
                    };

                    let landmarks = provider.detect(&frame);
                    if let Some(recorder) = recorder.as_mut() {
                        recorder.record(frame.ts, landmarks.as_ref());
                    }
                    session.lock().process_landmarks(landmarks.as_ref());
                    processed += 1;
                }

                (processed, recorder.map(TraceRecorder::finish))
            })
            .map_err(GazeError::WorkerSpawn)?;

        log::info!("capture worker: started (queue={}, trace={record_trace})", queue_depth.max(1));
        Ok(Self {
            tx,
            dropped: Arc::new(AtomicU64::new(0)),
            handle,
        })
    }

    /// Queues a frame. Returns `Ok(false)` when the queue was full and the
    /// frame was dropped.
    pub fn submit(&self, frame: Frame) -> Result<bool> {
        match self.tx.try_send(CaptureInput::Frame(frame)) {
            Ok(()) => Ok(true),
            Err(TrySendError::Full(_)) => {
                let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                log::debug!("capture worker: queue full, dropped frame (total {dropped})");
                Ok(false)
            }
            Err(TrySendError::Disconnected(_)) => Err(GazeError::WorkerDisconnected),
        }
    }

    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub fn stop(self) -> Result<CaptureSummary> {
        // The thread may already be gone; joining reports how it ended.
        self.tx.send(CaptureInput::Stop).ok();
        let (processed, trace) = self.handle.join().map_err(|_| GazeError::WorkerPanicked)?;
        let dropped = self.dropped.load(Ordering::Relaxed);

        log::info!("capture worker: stopped (processed={processed}, dropped={dropped})");
        Ok(CaptureSummary {
            processed,
            dropped,
            trace,
        })
    }
}
