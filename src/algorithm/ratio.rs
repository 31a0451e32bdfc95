//! Ratio extraction: eye landmarks → raw `(ratio_x, ratio_y)` gaze signal.

use crate::models::landmarks::{EyeBox, EyeLandmarks, Point2};
use crate::models::settings::{DirectionThresholds, ExtractorKind, TrackerSettings};

/// Eye boxes narrower than this (normalized units) carry no position signal.
const MIN_EYE_SPAN: f64 = 1e-4;

/// One frame's raw gaze signal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GazeSample {
    pub ratio_x: f64,
    pub ratio_y: f64,
    /// False when no face/eyes were found; ratios are then meaningless.
    pub detected: bool,
    /// Eyes were found but look closed.
    pub blinking: bool,
}

impl GazeSample {
    pub const NOT_DETECTED: GazeSample = GazeSample {
        ratio_x: 0.0,
        ratio_y: 0.0,
        detected: false,
        blinking: false,
    };

    pub fn detected(ratio_x: f64, ratio_y: f64) -> Self {
        Self {
            ratio_x,
            ratio_y,
            detected: true,
            blinking: false,
        }
    }

    /// Whether the ratios may drive the smoothed gaze.
    pub fn is_usable(&self) -> bool {
        self.detected && !self.blinking
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GazeDirection {
    Left,
    Center,
    Right,
    Blinking,
    Unknown,
}

impl GazeDirection {
    pub fn classify(sample: &GazeSample, thresholds: &DirectionThresholds) -> Self {
        if !sample.detected {
            return GazeDirection::Unknown;
        }
        if sample.blinking {
            return GazeDirection::Blinking;
        }

        if sample.ratio_x <= thresholds.left_max {
            GazeDirection::Left
        } else if sample.ratio_x < thresholds.right_min {
            GazeDirection::Center
        } else {
            GazeDirection::Right
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RatioExtractor {
    kind: ExtractorKind,
    blink_threshold: f64,
}

impl RatioExtractor {
    pub fn new(kind: ExtractorKind, blink_threshold: f64) -> Self {
        Self {
            kind,
            blink_threshold,
        }
    }

    pub fn from_settings(settings: &TrackerSettings) -> Self {
        Self::new(settings.extractor, settings.blink_threshold)
    }

    /// Reads the gaze ratios of one frame. `None` means no face in the frame.
    ///
    /// The eye-box strategy falls back to the iris average when the provider
    /// reported no usable eye contours.
    pub fn extract(&self, landmarks: Option<&EyeLandmarks>) -> GazeSample {
        let Some(eyes) = landmarks else {
            return GazeSample::NOT_DETECTED;
        };

        let (ratio_x, ratio_y) = match self.kind {
            ExtractorKind::IrisAverage => iris_average(eyes),
            ExtractorKind::EyeBox => eye_box_ratio(eyes).unwrap_or_else(|| iris_average(eyes)),
        };

        let blinking = blink_ratio(eyes).is_some_and(|ratio| ratio > self.blink_threshold);

        GazeSample {
            ratio_x,
            ratio_y,
            detected: true,
            blinking,
        }
    }
}

fn iris_average(eyes: &EyeLandmarks) -> (f64, f64) {
    let mid = eyes.left_iris.midpoint(eyes.right_iris);
    (mid.x, mid.y)
}

fn iris_in_box(iris: Point2, bbox: EyeBox) -> Option<(f64, f64)> {
    if bbox.width() <= MIN_EYE_SPAN || bbox.height() <= MIN_EYE_SPAN {
        return None;
    }
    Some((
        (iris.x - bbox.min.x) / bbox.width(),
        (iris.y - bbox.min.y) / bbox.height(),
    ))
}

fn eye_box_ratio(eyes: &EyeLandmarks) -> Option<(f64, f64)> {
    let per_eye = [
        eyes.left_box().and_then(|bbox| iris_in_box(eyes.left_iris, bbox)),
        eyes.right_box().and_then(|bbox| iris_in_box(eyes.right_iris, bbox)),
    ];

    let (sum_x, sum_y, count) = per_eye
        .iter()
        .flatten()
        .fold((0.0, 0.0, 0usize), |(sx, sy, n), (x, y)| (sx + x, sy + y, n + 1));

    if count == 0 {
        return None;
    }
    Some((sum_x / count as f64, sum_y / count as f64))
}

/// Mean eye width/height over the eyes with a non-flat contour box.
/// Large values mean closed eyes.
pub fn blink_ratio(eyes: &EyeLandmarks) -> Option<f64> {
    let ratios: Vec<f64> = [eyes.left_box(), eyes.right_box()]
        .into_iter()
        .flatten()
        .filter(|bbox| bbox.height() > 0.0)
        .map(|bbox| bbox.width() / bbox.height())
        .collect();

    if ratios.is_empty() {
        return None;
    }
    Some(ratios.iter().sum::<f64>() / ratios.len() as f64)
}
