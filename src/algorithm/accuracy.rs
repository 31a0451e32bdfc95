//! Follow-the-dot tracking accuracy.

use crate::models::landmarks::Point2;

/// Mean distance (px) that scores 0 %.
pub const DEFAULT_BASELINE_PX: f64 = 200.0;
pub const DEFAULT_THRESHOLD_PX: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccuracySample {
    /// Milliseconds since the exercise started.
    pub ts: u64,
    pub target: Point2,
    pub gaze: Point2,
    pub distance: f64,
}

/// Target/gaze pairs recorded while the user follows a moving target.
#[derive(Debug, Clone, Default)]
pub struct AccuracyLog {
    samples: Vec<AccuracySample>,
}

impl AccuracyLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames without a gaze position are skipped.
    pub fn record(&mut self, ts: u64, target: Point2, gaze: Option<Point2>) {
        let Some(gaze) = gaze else {
            return;
        };
        self.samples.push(AccuracySample {
            ts,
            target,
            gaze,
            distance: target.distance(gaze),
        });
    }

    pub fn samples(&self) -> &[AccuracySample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn mean_distance(&self) -> Option<f64> {
        if self.samples.is_empty() {
            return None;
        }
        let total: f64 = self.samples.iter().map(|sample| sample.distance).sum();
        Some(total / self.samples.len() as f64)
    }

    /// 100 % at zero mean distance, 0 % at `baseline_px` or worse.
    pub fn mean_distance_accuracy(&self, baseline_px: f64) -> f64 {
        match self.mean_distance() {
            Some(mean) if baseline_px > 0.0 => ((1.0 - mean / baseline_px) * 100.0).clamp(0.0, 100.0),
            _ => 0.0,
        }
    }

    /// Percentage of samples whose gaze landed within `threshold_px` of the target.
    pub fn within_threshold_pct(&self, threshold_px: f64) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let hits = self
            .samples
            .iter()
            .filter(|sample| sample.distance <= threshold_px)
            .count();
        hits as f64 / self.samples.len() as f64 * 100.0
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_log_scores_zero() {
        let log = AccuracyLog::new();
        assert_eq!(log.mean_distance(), None);
        assert_eq!(log.mean_distance_accuracy(DEFAULT_BASELINE_PX), 0.0);
        assert_eq!(log.within_threshold_pct(DEFAULT_THRESHOLD_PX), 0.0);
    }

    #[test]
    fn accuracy_scales_with_mean_distance() {
        let mut log = AccuracyLog::new();
        let target = Point2::new(500.0, 500.0);
        log.record(0, target, Some(Point2::new(530.0, 540.0)));
        log.record(16, target, Some(Point2::new(500.0, 650.0)));
        log.record(32, target, None);

        assert_eq!(log.len(), 2);
        assert!((log.mean_distance().expect("samples") - 100.0).abs() < 1e-9);
        assert!((log.mean_distance_accuracy(DEFAULT_BASELINE_PX) - 50.0).abs() < 1e-9);
        assert!((log.within_threshold_pct(DEFAULT_THRESHOLD_PX) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn accuracy_is_floored_at_zero() {
        let mut log = AccuracyLog::new();
        log.record(0, Point2::new(0.0, 0.0), Some(Point2::new(900.0, 0.0)));
        assert_eq!(log.mean_distance_accuracy(DEFAULT_BASELINE_PX), 0.0);
    }
}
