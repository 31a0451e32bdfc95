//! Eye landmarks as delivered by the face-mesh provider.
//!
//! All points are in normalized image coordinates (0.0–1.0) of the already
//! mirrored camera image: `x = 0` is the left edge as the user sees it.

use serde::{Deserialize, Serialize};

/// Refined face mesh size (468 face points + 10 iris points).
pub const REFINED_MESH_LEN: usize = 478;

pub const LEFT_IRIS_CENTER: usize = 468;
pub const RIGHT_IRIS_CENTER: usize = 473;

/// 16-point contour of the subject's left eye.
pub const LEFT_EYE_CONTOUR: [usize; 16] = [
    33, 7, 163, 144, 145, 153, 154, 155, 133, 173, 157, 158, 159, 160, 161, 246,
];

/// 16-point contour of the subject's right eye.
pub const RIGHT_EYE_CONTOUR: [usize; 16] = [
    362, 382, 381, 380, 374, 373, 390, 249, 263, 466, 388, 387, 386, 385, 384, 398,
];

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn midpoint(self, other: Point2) -> Point2 {
        Point2::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    pub fn distance(self, other: Point2) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Axis-aligned box around an eye contour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EyeBox {
    pub min: Point2,
    pub max: Point2,
}

impl EyeBox {
    pub fn from_points(points: &[Point2]) -> Option<Self> {
        let first = *points.first()?;
        let (min, max) = points
            .iter()
            .fold((first, first), |(min, max), point| {
                (
                    Point2::new(min.x.min(point.x), min.y.min(point.y)),
                    Point2::new(max.x.max(point.x), max.y.max(point.y)),
                )
            });
        Some(Self { min, max })
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }
}

/// The named points the gaze core reads from one detected face.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EyeLandmarks {
    pub left_iris: Point2,
    pub right_iris: Point2,
    /// Eye contours; empty when the provider only reports iris centers.
    #[serde(default)]
    pub left_eye: Vec<Point2>,
    #[serde(default)]
    pub right_eye: Vec<Point2>,
}

impl EyeLandmarks {
    pub fn from_irises(left_iris: Point2, right_iris: Point2) -> Self {
        Self {
            left_iris,
            right_iris,
            left_eye: Vec::new(),
            right_eye: Vec::new(),
        }
    }

    /// Picks the eye points out of a refined MediaPipe face mesh.
    ///
    /// Returns `None` for an unrefined mesh, which carries no iris points.
    pub fn from_face_mesh(mesh: &[Point2]) -> Option<Self> {
        if mesh.len() < REFINED_MESH_LEN {
            return None;
        }

        Some(Self {
            left_iris: mesh[LEFT_IRIS_CENTER],
            right_iris: mesh[RIGHT_IRIS_CENTER],
            left_eye: LEFT_EYE_CONTOUR.iter().map(|&idx| mesh[idx]).collect(),
            right_eye: RIGHT_EYE_CONTOUR.iter().map(|&idx| mesh[idx]).collect(),
        })
    }

    pub fn left_box(&self) -> Option<EyeBox> {
        EyeBox::from_points(&self.left_eye)
    }

    pub fn right_box(&self) -> Option<EyeBox> {
        EyeBox::from_points(&self.right_eye)
    }
}
