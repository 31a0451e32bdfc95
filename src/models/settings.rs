//! Tracker settings schema (settings.json).
//! schemaVersion: 1

use serde::{Deserialize, Serialize};

pub const SCHEMA_VERSION: u32 = 1;

/// Screen (window) size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenSize {
    pub width: f64,
    pub height: f64,
}

impl ScreenSize {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Both sides finite and strictly positive.
    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    pub fn center(&self) -> (f64, f64) {
        (self.width / 2.0, self.height / 2.0)
    }
}

impl Default for ScreenSize {
    fn default() -> Self {
        ScreenSize::new(1600.0, 900.0)
    }
}

/// Ratio values observed while the user looks at each screen edge.
///
/// No ordering is enforced: `left` may be larger than `right` when the
/// landmark source reports a higher ratio for a leftward gaze.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalibrationBounds {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl CalibrationBounds {
    pub const fn new(left: f64, right: f64, top: f64, bottom: f64) -> Self {
        Self {
            left,
            right,
            top,
            bottom,
        }
    }
}

impl Default for CalibrationBounds {
    fn default() -> Self {
        CalibrationBounds::new(0.40, 0.60, 0.60, 0.40)
    }
}

/// How raw landmarks become a ratio pair.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ExtractorKind {
    /// Mean of the two iris centers.
    #[default]
    IrisAverage,
    /// Iris position inside each eye's contour box, averaged over both eyes.
    EyeBox,
}

/// Which mapper a session starts with.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum MappingMode {
    #[default]
    Ratio,
    Offset,
}

/// Horizontal ratio thresholds for left/center/right classification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectionThresholds {
    /// `ratio_x <= left_max` reads as looking left.
    pub left_max: f64,
    /// `ratio_x >= right_min` reads as looking right.
    pub right_min: f64,
}

impl Default for DirectionThresholds {
    fn default() -> Self {
        DirectionThresholds {
            left_max: 0.53,
            right_min: 0.59,
        }
    }
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

fn default_smoothing_factor() -> f64 {
    0.15
}

fn default_blink_threshold() -> f64 {
    3.8
}

/// Root object of settings.json.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerSettings {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    #[serde(default)]
    pub screen: ScreenSize,
    /// EMA weight of the newest target, in (0, 1]. Lower is smoother.
    #[serde(default = "default_smoothing_factor")]
    pub smoothing_factor: f64,
    #[serde(default)]
    pub default_bounds: CalibrationBounds,
    #[serde(default)]
    pub extractor: ExtractorKind,
    #[serde(default)]
    pub mapping: MappingMode,
    #[serde(default)]
    pub direction: DirectionThresholds,
    /// Mean eye width/height above which the eyes count as closed.
    #[serde(default = "default_blink_threshold")]
    pub blink_threshold: f64,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        TrackerSettings {
            schema_version: SCHEMA_VERSION,
            screen: ScreenSize::default(),
            smoothing_factor: default_smoothing_factor(),
            default_bounds: CalibrationBounds::default(),
            extractor: ExtractorKind::default(),
            mapping: MappingMode::default(),
            direction: DirectionThresholds::default(),
            blink_threshold: default_blink_threshold(),
        }
    }
}
