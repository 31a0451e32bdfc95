//! Gaze session: ratio extraction, calibration, mapping and smoothing for
//! one tracking run.
//!
//! Per frame:
//!   provider → [`RatioExtractor`] → [`GazeMapper`] (calibration) → [`EmaSmoother`]
//!
//! There is no explicit calibration mode. A calibration driver may push new
//! bounds at any time, including every frame while the user follows a target,
//! and tracking continues with whatever bounds are current.

use crate::algorithm::mapper::{mapper_for, Calibration, GazeMapper};
use crate::algorithm::ratio::{GazeDirection, GazeSample, RatioExtractor};
use crate::algorithm::smoothing::EmaSmoother;
use crate::error::Result;
use crate::models::landmarks::EyeLandmarks;
use crate::models::settings::{CalibrationBounds, DirectionThresholds, ScreenSize, TrackerSettings};
use crate::tracking::provider::{Frame, LandmarkProvider};

#[derive(Debug)]
pub struct GazeSession {
    screen: ScreenSize,
    extractor: RatioExtractor,
    mapper: Box<dyn GazeMapper>,
    smoother: EmaSmoother,
    thresholds: DirectionThresholds,
    frames_processed: u64,
    detected_frames: u64,
    last_sample: Option<GazeSample>,
    calibrated: bool,
}

impl GazeSession {
    pub fn new(settings: &TrackerSettings) -> Self {
        let mapper = mapper_for(settings.mapping, settings.default_bounds);
        Self::with_mapper(settings, mapper)
    }

    /// Session using a caller-built mapping strategy.
    pub fn with_mapper(settings: &TrackerSettings, mapper: Box<dyn GazeMapper>) -> Self {
        let screen = settings.screen;
        Self {
            screen,
            extractor: RatioExtractor::from_settings(settings),
            mapper,
            smoother: EmaSmoother::new(settings.smoothing_factor, screen.center()),
            thresholds: settings.direction,
            frames_processed: 0,
            detected_frames: 0,
            last_sample: None,
            calibrated: false,
        }
    }

    pub fn screen(&self) -> ScreenSize {
        self.screen
    }

    pub fn smoothing_factor(&self) -> f64 {
        self.smoother.alpha()
    }

    pub fn mapper_name(&self) -> &'static str {
        self.mapper.name()
    }

    /// Overwrites the ratio bounds. Cheap and idempotent; safe to call every frame.
    ///
    /// Ignored with a warning when the session maps through a non-ratio strategy.
    pub fn calibrate(&mut self, left: f64, right: f64, top: f64, bottom: f64) {
        let bounds = CalibrationBounds::new(left, right, top, bottom);
        match self.mapper.calibrate(Calibration::Bounds(bounds)) {
            Ok(()) => {
                self.calibrated = true;
                log::debug!(
                    "calibration updated: L={left:.2} R={right:.2} T={top:.2} B={bottom:.2}"
                );
            }
            Err(e) => log::warn!("calibrate: {e}"),
        }
    }

    /// Pushes any calibration kind into the active mapper.
    pub fn apply_calibration(&mut self, calibration: Calibration) -> Result<()> {
        self.mapper.calibrate(calibration)?;
        self.calibrated = true;
        log::info!(
            "calibration applied: mapper={} kind={}",
            self.mapper.name(),
            calibration.name()
        );
        Ok(())
    }

    pub fn calibration(&self) -> Calibration {
        self.mapper.calibration()
    }

    /// Current ratio bounds, when the session maps through bounds.
    pub fn bounds(&self) -> Option<CalibrationBounds> {
        match self.mapper.calibration() {
            Calibration::Bounds(bounds) => Some(bounds),
            _ => None,
        }
    }

    /// Whether any calibration has been pushed since the session started.
    pub fn is_calibrated(&self) -> bool {
        self.calibrated
    }

    /// Runs `provider` on `frame` and folds the result into the gaze position.
    ///
    /// Callers must only invoke this with a real frame; a missing camera frame
    /// is not a tracking dropout and should simply skip the call.
    pub fn process_frame(
        &mut self,
        provider: &mut dyn LandmarkProvider,
        frame: &Frame,
    ) -> Option<(f64, f64)> {
        let landmarks = provider.detect(frame);
        self.process_landmarks(landmarks.as_ref())
    }

    pub fn process_landmarks(&mut self, landmarks: Option<&EyeLandmarks>) -> Option<(f64, f64)> {
        let sample = self.extractor.extract(landmarks);
        self.process_sample(sample)
    }

    /// Returns the new smoothed position, or `None` when the frame could not
    /// move it (no face, or eyes closed). The previous position is kept then.
    pub fn process_sample(&mut self, sample: GazeSample) -> Option<(f64, f64)> {
        self.frames_processed += 1;
        self.last_sample = Some(sample);

        if !sample.is_usable() {
            log::debug!(
                "frame {}: holding gaze (detected={}, blinking={})",
                self.frames_processed,
                sample.detected,
                sample.blinking
            );
            return None;
        }

        self.detected_frames += 1;
        let target = self.map_to_screen(sample.ratio_x, sample.ratio_y);
        Some(self.smoother.update(target))
    }

    /// Unsmoothed pixel target for a ratio pair under the current calibration.
    pub fn map_to_screen(&self, ratio_x: f64, ratio_y: f64) -> (f64, f64) {
        let (norm_x, norm_y) = self.mapper.map(ratio_x, ratio_y);
        (norm_x * self.screen.width, norm_y * self.screen.height)
    }

    /// Smoothed gaze in screen pixels; `None` only before the first frame.
    pub fn gaze_position(&self) -> Option<(f64, f64)> {
        if self.frames_processed == 0 {
            return None;
        }
        Some(self.smoother.position())
    }

    pub fn last_sample(&self) -> Option<GazeSample> {
        self.last_sample
    }

    /// Left/center/right reading of the latest frame.
    pub fn direction(&self) -> GazeDirection {
        match self.last_sample {
            Some(sample) => GazeDirection::classify(&sample, &self.thresholds),
            None => GazeDirection::Unknown,
        }
    }

    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }

    pub fn detected_frames(&self) -> u64 {
        self.detected_frames
    }

    /// Forgets the gaze history; calibration is kept.
    pub fn reset(&mut self) {
        self.smoother.reset(self.screen.center());
        self.frames_processed = 0;
        self.detected_frames = 0;
        self.last_sample = None;
    }
}

impl Default for GazeSession {
    fn default() -> Self {
        Self::new(&TrackerSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::mapper::{OffsetMapper, ScreenOffset};
    use crate::error::GazeError;
    use crate::models::landmarks::Point2;
    use crate::models::settings::MappingMode;

    fn session_with_alpha(alpha: f64) -> GazeSession {
        GazeSession::new(&TrackerSettings {
            smoothing_factor: alpha,
            ..TrackerSettings::default()
        })
    }

    fn irises_at(x: f64, y: f64) -> EyeLandmarks {
        EyeLandmarks::from_irises(Point2::new(x - 0.05, y), Point2::new(x + 0.05, y))
    }

    #[test]
    fn no_position_before_first_frame() {
        let mut session = GazeSession::default();
        assert_eq!(session.gaze_position(), None);

        session.process_sample(GazeSample::NOT_DETECTED);
        assert_eq!(session.gaze_position(), Some((800.0, 450.0)));
    }

    #[test]
    fn default_bounds_map_centered_gaze_to_screen_center() {
        let session = GazeSession::default();
        assert_eq!(session.map_to_screen(0.5, 0.5), (800.0, 450.0));
        let (x, y) = session.map_to_screen(0.40, 0.60);
        assert!(x.abs() < 1e-9);
        assert!(y.abs() < 1e-9);
    }

    #[test]
    fn single_frame_moves_towards_target_by_alpha() {
        let mut session = session_with_alpha(0.15);
        // (0.60, 0.60) maps to the top-right corner (1600, 0).
        let (x, y) = session
            .process_sample(GazeSample::detected(0.60, 0.60))
            .expect("detected frame");
        assert!((x - 920.0).abs() < 1e-9);
        assert!((y - 382.5).abs() < 1e-9);
    }

    #[test]
    fn dropout_holds_last_position_exactly() {
        let mut session = session_with_alpha(0.15);
        session.process_sample(GazeSample::detected(0.43, 0.52));
        session.process_sample(GazeSample::detected(0.47, 0.55));
        let before = session.gaze_position();

        assert_eq!(session.process_sample(GazeSample::NOT_DETECTED), None);
        assert_eq!(session.gaze_position(), before);

        let mut blink = GazeSample::detected(0.6, 0.6);
        blink.blinking = true;
        assert_eq!(session.process_sample(blink), None);
        assert_eq!(session.gaze_position(), before);
        assert_eq!(session.frames_processed(), 4);
        assert_eq!(session.detected_frames(), 2);
    }

    #[test]
    fn repeated_calibration_is_idempotent() {
        let mut once = GazeSession::default();
        let mut twice = GazeSession::default();
        once.calibrate(0.35, 0.65, 0.62, 0.41);
        twice.calibrate(0.35, 0.65, 0.62, 0.41);
        twice.calibrate(0.35, 0.65, 0.62, 0.41);

        for &(rx, ry) in &[(0.3, 0.7), (0.5, 0.5), (0.61, 0.44)] {
            assert_eq!(once.map_to_screen(rx, ry), twice.map_to_screen(rx, ry));
        }
        assert_eq!(once.bounds(), twice.bounds());
        assert!(once.is_calibrated());
    }

    #[test]
    fn recalibration_applies_without_interrupting_tracking() {
        let mut session = session_with_alpha(1.0);
        let (x, _) = session
            .process_sample(GazeSample::detected(0.55, 0.5))
            .expect("detected frame");
        assert!((x - 1200.0).abs() < 1e-9);

        session.calibrate(0.5, 0.6, 0.6, 0.4);
        let (x, _) = session
            .process_sample(GazeSample::detected(0.55, 0.5))
            .expect("detected frame");
        assert!((x - 800.0).abs() < 1e-9);
        assert_eq!(session.frames_processed(), 2);
    }

    #[test]
    fn process_frame_reads_through_provider() {
        let mut session = session_with_alpha(1.0);
        let mut provider = |_frame: &Frame| -> Option<EyeLandmarks> { Some(irises_at(0.5, 0.5)) };
        let (x, y) = session
            .process_frame(&mut provider, &Frame::timestamp_only(0))
            .expect("face detected");
        assert!((x - 800.0).abs() < 1e-9);
        assert!((y - 450.0).abs() < 1e-9);
        assert_eq!(session.direction(), GazeDirection::Left);
    }

    #[test]
    fn offset_session_rejects_bounds_but_accepts_offsets() {
        let settings = TrackerSettings {
            mapping: MappingMode::Offset,
            smoothing_factor: 1.0,
            ..TrackerSettings::default()
        };
        let mut session = GazeSession::new(&settings);
        session.calibrate(0.4, 0.6, 0.6, 0.4);
        assert!(!session.is_calibrated());
        assert_eq!(session.bounds(), None);

        let err = session
            .apply_calibration(Calibration::Bounds(CalibrationBounds::default()))
            .expect_err("bounds rejected");
        assert!(matches!(err, GazeError::CalibrationMismatch { .. }));

        session
            .apply_calibration(Calibration::Offset(ScreenOffset { dx: 0.1, dy: -0.1 }))
            .expect("offset accepted");
        let (x, y) = session
            .process_sample(GazeSample::detected(0.5, 0.5))
            .expect("detected frame");
        assert!((x - 960.0).abs() < 1e-9);
        assert!((y - 360.0).abs() < 1e-9);
    }

    #[test]
    fn custom_mapper_is_used() {
        let session = GazeSession::with_mapper(
            &TrackerSettings::default(),
            Box::new(OffsetMapper::new(ScreenOffset { dx: 0.25, dy: 0.0 })),
        );
        assert_eq!(session.mapper_name(), "offset");
        assert_eq!(session.map_to_screen(0.5, 0.5), (1200.0, 450.0));
    }

    #[test]
    fn smoothed_gaze_stays_on_screen() {
        let mut session = session_with_alpha(0.6);
        for i in 0..200 {
            let wild = (i as f64 * 0.37).sin() * 5.0;
            if let Some((x, y)) = session.process_sample(GazeSample::detected(wild, -wild)) {
                assert!((-1e-9..=1600.0 + 1e-9).contains(&x));
                assert!((-1e-9..=900.0 + 1e-9).contains(&y));
            }
        }
    }

    #[test]
    fn smoothing_factor_is_clamped_when_session_is_built() {
        assert_eq!(session_with_alpha(0.15).smoothing_factor(), 0.15);
        assert_eq!(session_with_alpha(4.0).smoothing_factor(), 1.0);
        assert_eq!(session_with_alpha(f64::NAN).smoothing_factor(), 1.0);
        assert!(session_with_alpha(-1.0).smoothing_factor() > 0.0);
    }

    #[test]
    fn reset_keeps_calibration() {
        let mut session = GazeSession::default();
        session.calibrate(0.3, 0.7, 0.7, 0.3);
        session.process_sample(GazeSample::detected(0.3, 0.3));
        session.reset();
        assert_eq!(session.gaze_position(), None);
        assert_eq!(session.bounds(), Some(CalibrationBounds::new(0.3, 0.7, 0.7, 0.3)));
    }
}
