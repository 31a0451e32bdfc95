//! Calibration drivers.
//!
//! The session accepts whatever bounds are pushed into it; the helpers here
//! decide what to push. [`SweepCalibrator`] derives bounds from ratios observed
//! while a target moves across the screen, and [`CalibrationCheck`] walks the
//! user through a left/right verification with dwell timers.

use crate::algorithm::mapper::MIN_BOUND_SPAN;
use crate::algorithm::ratio::GazeSample;
use crate::models::settings::CalibrationBounds;

/// Minimum |correlation| between target and ratio for an axis to be oriented.
const MIN_CORRELATION: f64 = 0.5;

/// Running statistics of one axis: target position vs observed ratio.
#[derive(Debug, Clone, Copy, Default)]
struct AxisStats {
    count: usize,
    sum_target: f64,
    sum_ratio: f64,
    sum_target_sq: f64,
    sum_ratio_sq: f64,
    sum_product: f64,
    min_target: f64,
    max_target: f64,
    min_ratio: f64,
    max_ratio: f64,
}

impl AxisStats {
    fn push(&mut self, target: f64, ratio: f64) {
        if self.count == 0 {
            self.min_target = target;
            self.max_target = target;
            self.min_ratio = ratio;
            self.max_ratio = ratio;
        } else {
            self.min_target = self.min_target.min(target);
            self.max_target = self.max_target.max(target);
            self.min_ratio = self.min_ratio.min(ratio);
            self.max_ratio = self.max_ratio.max(ratio);
        }
        self.count += 1;
        self.sum_target += target;
        self.sum_ratio += ratio;
        self.sum_target_sq += target * target;
        self.sum_ratio_sq += ratio * ratio;
        self.sum_product += target * ratio;
    }

    /// Pearson correlation of target and ratio; `None` when either side has
    /// no variance.
    fn correlation(&self) -> Option<f64> {
        let n = self.count as f64;
        let mean_target = self.sum_target / n;
        let mean_ratio = self.sum_ratio / n;
        let covariance = self.sum_product / n - mean_target * mean_ratio;
        let var_target = self.sum_target_sq / n - mean_target * mean_target;
        let var_ratio = self.sum_ratio_sq / n - mean_ratio * mean_ratio;
        if !(var_target > 0.0 && var_ratio > 0.0) {
            return None;
        }
        Some(covariance / (var_target.sqrt() * var_ratio.sqrt()))
    }

    /// `(low, high)`: the ratio extremes seen at the low/high end of the
    /// target range, or `None` when the data cannot orient the axis.
    fn oriented_extremes(&self, min_samples: usize) -> Option<(f64, f64)> {
        if self.count < min_samples.max(2) {
            return None;
        }
        // A target that never moved along this axis says nothing about it.
        if !(self.max_target - self.min_target > MIN_BOUND_SPAN) {
            return None;
        }
        if !(self.max_ratio - self.min_ratio > MIN_BOUND_SPAN) {
            return None;
        }

        let correlation = self.correlation()?;
        if correlation >= MIN_CORRELATION {
            Some((self.min_ratio, self.max_ratio))
        } else if correlation <= -MIN_CORRELATION {
            Some((self.max_ratio, self.min_ratio))
        } else {
            None
        }
    }
}

/// Derives calibration bounds from a sweeping target.
///
/// Targets are normalized screen positions (`0,0` = top-left). Which raw
/// extreme belongs to the left edge is read from the data: the ratio seen
/// while the target was on the left becomes `left`, whatever its value.
#[derive(Debug, Clone)]
pub struct SweepCalibrator {
    x: AxisStats,
    y: AxisStats,
    min_samples: usize,
}

impl SweepCalibrator {
    pub fn new(min_samples: usize) -> Self {
        Self {
            x: AxisStats::default(),
            y: AxisStats::default(),
            min_samples,
        }
    }

    /// Records one frame. Dropout and blink frames are ignored.
    pub fn record(&mut self, target: (f64, f64), sample: &GazeSample) -> bool {
        if !sample.is_usable() {
            return false;
        }
        self.x.push(target.0, sample.ratio_x);
        self.y.push(target.1, sample.ratio_y);
        true
    }

    pub fn sample_count(&self) -> usize {
        self.x.count
    }

    /// Bounds from the samples so far; axes without enough evidence keep
    /// their `previous` values.
    pub fn bounds(&self, previous: CalibrationBounds) -> CalibrationBounds {
        let mut bounds = previous;
        if let Some((left, right)) = self.x.oriented_extremes(self.min_samples) {
            bounds.left = left;
            bounds.right = right;
        }
        if let Some((top, bottom)) = self.y.oriented_extremes(self.min_samples) {
            bounds.top = top;
            bounds.bottom = bottom;
        }
        bounds
    }

    pub fn reset(&mut self) {
        self.x = AxisStats::default();
        self.y = AxisStats::default();
    }
}

impl Default for SweepCalibrator {
    fn default() -> Self {
        Self::new(30)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStep {
    Intro,
    VerifyLeft,
    VerifyRight,
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CheckConfig {
    /// Gaze x (px) below which the user counts as looking left.
    pub left_edge_px: f64,
    /// Gaze x (px) above which the user counts as looking right.
    pub right_edge_px: f64,
    pub hold_ms: u64,
}

impl Default for CheckConfig {
    fn default() -> Self {
        CheckConfig {
            left_edge_px: 400.0,
            right_edge_px: 800.0,
            hold_ms: 1_000,
        }
    }
}

/// Left/right verification run after calibration.
#[derive(Debug, Clone)]
pub struct CalibrationCheck {
    config: CheckConfig,
    step: CheckStep,
    hold_started_ms: Option<u64>,
}

impl CalibrationCheck {
    pub fn new(config: CheckConfig) -> Self {
        Self {
            config,
            step: CheckStep::Intro,
            hold_started_ms: None,
        }
    }

    pub fn step(&self) -> CheckStep {
        self.step
    }

    pub fn start(&mut self) {
        if self.step == CheckStep::Intro {
            self.step = CheckStep::VerifyLeft;
            self.hold_started_ms = None;
        }
    }

    pub fn reset(&mut self) {
        self.step = CheckStep::Intro;
        self.hold_started_ms = None;
    }

    /// Advances the check with the current gaze position (px) at `now_ms`.
    pub fn update(&mut self, gaze: Option<(f64, f64)>, now_ms: u64) -> CheckStep {
        let in_region = match (self.step, gaze) {
            (CheckStep::VerifyLeft, Some((x, _))) => x < self.config.left_edge_px,
            (CheckStep::VerifyRight, Some((x, _))) => x > self.config.right_edge_px,
            (CheckStep::VerifyLeft | CheckStep::VerifyRight, None) => false,
            (CheckStep::Intro | CheckStep::Complete, _) => return self.step,
        };

        if !in_region {
            self.hold_started_ms = None;
            return self.step;
        }

        match self.hold_started_ms {
            None => self.hold_started_ms = Some(now_ms),
            Some(started) if now_ms.saturating_sub(started) > self.config.hold_ms => {
                self.step = match self.step {
                    CheckStep::VerifyLeft => CheckStep::VerifyRight,
                    _ => CheckStep::Complete,
                };
                self.hold_started_ms = None;
                log::info!("calibration check: advanced to {:?}", self.step);
            }
            Some(_) => {}
        }
        self.step
    }

    /// Fraction of the dwell time completed, in `[0, 1]`.
    pub fn hold_progress(&self, now_ms: u64) -> f64 {
        match self.hold_started_ms {
            Some(started) if self.config.hold_ms > 0 => {
                (now_ms.saturating_sub(started) as f64 / self.config.hold_ms as f64).clamp(0.0, 1.0)
            }
            Some(_) => 1.0,
            None => 0.0,
        }
    }
}

impl Default for CalibrationCheck {
    fn default() -> Self {
        Self::new(CheckConfig::default())
    }
}
