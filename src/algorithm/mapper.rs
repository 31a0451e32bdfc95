//! Coordinate mapping: raw gaze signal → normalized screen position.
//!
//! Every mapper returns coordinates clamped to `[0, 1]²`; scaling to pixels is
//! left to the session, which knows the screen size.

use std::fmt;

use crate::error::{GazeError, Result};
use crate::models::landmarks::Point2;
use crate::models::settings::{CalibrationBounds, MappingMode};

/// Bound spans at or below this width are treated as uncalibrated.
pub const MIN_BOUND_SPAN: f64 = 0.01;

/// Linearly rescales `value` from `[from, to]` onto `[0, 1]`.
///
/// `from` may be larger than `to`; a span of `MIN_BOUND_SPAN` or less yields
/// the midpoint instead of a division by ~0.
pub fn normalize_axis(value: f64, from: f64, to: f64) -> f64 {
    let span = to - from;
    if !(span.abs() > MIN_BOUND_SPAN) {
        return 0.5;
    }
    clamp_unit((value - from) / span)
}

/// NaN collapses to the midpoint so callers never see an off-screen value.
fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.5
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Additive correction applied in normalized screen space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScreenOffset {
    pub dx: f64,
    pub dy: f64,
}

/// Row-major 2×3 affine transform: `[a b c; d e f]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineTransform {
    pub m: [[f64; 3]; 2],
}

impl AffineTransform {
    pub const IDENTITY: AffineTransform = AffineTransform {
        m: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
    };

    /// Solves the exact transform taking each `src[i]` onto `dst[i]`.
    pub fn from_point_pairs(src: [Point2; 3], dst: [Point2; 3]) -> Result<Self> {
        let [p0, p1, p2] = src;
        let determinant =
            p0.x * (p1.y - p2.y) - p0.y * (p1.x - p2.x) + (p1.x * p2.y - p2.x * p1.y);
        if determinant.abs() < 1e-12 {
            return Err(GazeError::DegenerateCalibration { determinant });
        }

        // Cramer's rule on [x y 1] · [a b c]ᵀ = target, once per output axis.
        let solve = |t0: f64, t1: f64, t2: f64| -> [f64; 3] {
            let a = (t0 * (p1.y - p2.y) - p0.y * (t1 - t2) + (t1 * p2.y - t2 * p1.y)) / determinant;
            let b = (p0.x * (t1 - t2) - t0 * (p1.x - p2.x) + (p1.x * t2 - p2.x * t1)) / determinant;
            let c = (p0.x * (p1.y * t2 - p2.y * t1) - p0.y * (p1.x * t2 - p2.x * t1)
                + t0 * (p1.x * p2.y - p2.x * p1.y))
                / determinant;
            [a, b, c]
        };

        Ok(AffineTransform {
            m: [
                solve(dst[0].x, dst[1].x, dst[2].x),
                solve(dst[0].y, dst[1].y, dst[2].y),
            ],
        })
    }

    pub fn apply(&self, point: Point2) -> Point2 {
        let [r0, r1] = self.m;
        Point2::new(
            r0[0] * point.x + r0[1] * point.y + r0[2],
            r1[0] * point.x + r1[1] * point.y + r1[2],
        )
    }
}

/// Calibration payload pushed into a mapper.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Calibration {
    Bounds(CalibrationBounds),
    Offset(ScreenOffset),
    Affine(AffineTransform),
}

impl Calibration {
    pub fn name(&self) -> &'static str {
        match self {
            Calibration::Bounds(_) => "bounds",
            Calibration::Offset(_) => "offset",
            Calibration::Affine(_) => "affine",
        }
    }
}

/// Strategy turning a raw ratio pair into a normalized screen position.
pub trait GazeMapper: fmt::Debug + Send {
    fn name(&self) -> &'static str;

    /// Returns `(norm_x, norm_y)` in `[0, 1]²`. Never fails.
    fn map(&self, ratio_x: f64, ratio_y: f64) -> (f64, f64);

    /// Replaces the mapper's calibration. Rejects payloads of another kind.
    fn calibrate(&mut self, calibration: Calibration) -> Result<()>;

    fn calibration(&self) -> Calibration;
}

/// Per-axis linear rescale between calibration bounds.
#[derive(Debug, Clone, Copy, Default)]
pub struct RatioMapper {
    bounds: CalibrationBounds,
}

impl RatioMapper {
    pub fn new(bounds: CalibrationBounds) -> Self {
        Self { bounds }
    }

    pub fn bounds(&self) -> CalibrationBounds {
        self.bounds
    }
}

impl GazeMapper for RatioMapper {
    fn name(&self) -> &'static str {
        "ratio"
    }

    fn map(&self, ratio_x: f64, ratio_y: f64) -> (f64, f64) {
        (
            normalize_axis(ratio_x, self.bounds.left, self.bounds.right),
            normalize_axis(ratio_y, self.bounds.top, self.bounds.bottom),
        )
    }

    fn calibrate(&mut self, calibration: Calibration) -> Result<()> {
        match calibration {
            Calibration::Bounds(bounds) => {
                self.bounds = bounds;
                Ok(())
            }
            other => Err(GazeError::CalibrationMismatch {
                mapper: self.name(),
                calibration: other.name(),
            }),
        }
    }

    fn calibration(&self) -> Calibration {
        Calibration::Bounds(self.bounds)
    }
}

/// Raw landmark position shifted by a constant screen-space offset.
#[derive(Debug, Clone, Copy, Default)]
pub struct OffsetMapper {
    offset: ScreenOffset,
}

impl OffsetMapper {
    pub fn new(offset: ScreenOffset) -> Self {
        Self { offset }
    }

    /// Offset that moves the averaged `raw` samples onto `target`.
    pub fn offset_for(raw: &[Point2], target: Point2) -> Option<ScreenOffset> {
        if raw.is_empty() {
            return None;
        }
        let n = raw.len() as f64;
        let mean_x = raw.iter().map(|p| p.x).sum::<f64>() / n;
        let mean_y = raw.iter().map(|p| p.y).sum::<f64>() / n;
        Some(ScreenOffset {
            dx: target.x - mean_x,
            dy: target.y - mean_y,
        })
    }

    pub fn calibrate_point(&mut self, raw: &[Point2], target: Point2) -> bool {
        match Self::offset_for(raw, target) {
            Some(offset) => {
                self.offset = offset;
                true
            }
            None => false,
        }
    }
}

impl GazeMapper for OffsetMapper {
    fn name(&self) -> &'static str {
        "offset"
    }

    fn map(&self, ratio_x: f64, ratio_y: f64) -> (f64, f64) {
        (
            clamp_unit(ratio_x + self.offset.dx),
            clamp_unit(ratio_y + self.offset.dy),
        )
    }

    fn calibrate(&mut self, calibration: Calibration) -> Result<()> {
        match calibration {
            Calibration::Offset(offset) => {
                self.offset = offset;
                Ok(())
            }
            other => Err(GazeError::CalibrationMismatch {
                mapper: self.name(),
                calibration: other.name(),
            }),
        }
    }

    fn calibration(&self) -> Calibration {
        Calibration::Offset(self.offset)
    }
}

/// Three-point affine fit, used for fingertip input.
#[derive(Debug, Clone, Copy)]
pub struct AffineMapper {
    transform: AffineTransform,
}

impl AffineMapper {
    pub fn new(transform: AffineTransform) -> Self {
        Self { transform }
    }

    pub fn from_point_pairs(src: [Point2; 3], dst: [Point2; 3]) -> Result<Self> {
        Ok(Self::new(AffineTransform::from_point_pairs(src, dst)?))
    }
}

impl Default for AffineMapper {
    fn default() -> Self {
        Self::new(AffineTransform::IDENTITY)
    }
}

impl GazeMapper for AffineMapper {
    fn name(&self) -> &'static str {
        "affine"
    }

    fn map(&self, ratio_x: f64, ratio_y: f64) -> (f64, f64) {
        let mapped = self.transform.apply(Point2::new(ratio_x, ratio_y));
        (clamp_unit(mapped.x), clamp_unit(mapped.y))
    }

    fn calibrate(&mut self, calibration: Calibration) -> Result<()> {
        match calibration {
            Calibration::Affine(transform) => {
                self.transform = transform;
                Ok(())
            }
            other => Err(GazeError::CalibrationMismatch {
                mapper: self.name(),
                calibration: other.name(),
            }),
        }
    }

    fn calibration(&self) -> Calibration {
        Calibration::Affine(self.transform)
    }
}

/// Builds the mapper a fresh session starts with.
pub fn mapper_for(mode: MappingMode, bounds: CalibrationBounds) -> Box<dyn GazeMapper> {
    match mode {
        MappingMode::Ratio => Box::new(RatioMapper::new(bounds)),
        MappingMode::Offset => Box::new(OffsetMapper::default()),
    }
}
