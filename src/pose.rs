//! Pose data model.
//!
//! - `Landmark`: the fixed 17-point body schema (COCO order).
//! - `PersonPose`: exactly 17 keypoints plus optional per-keypoint confidence.
//! - `BoundingBox` / `FrameObservation`: everything one analysis call sees.
//!
//! A landmark the upstream model did not report is stored as [`Point::MISSING`]
//! (NaN coordinates). The element is never dropped, so indices stay fixed and
//! any comparison touching a missing landmark evaluates false.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use crate::geometry::distance;

/// Number of landmarks in the body schema.
pub const KEYPOINT_COUNT: usize = 17;

/// Named body landmarks in model output order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Landmark {
    Nose,
    LeftEye,
    RightEye,
    LeftEar,
    RightEar,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
}

impl Landmark {
    pub const ALL: [Landmark; KEYPOINT_COUNT] = [
        Landmark::Nose,
        Landmark::LeftEye,
        Landmark::RightEye,
        Landmark::LeftEar,
        Landmark::RightEar,
        Landmark::LeftShoulder,
        Landmark::RightShoulder,
        Landmark::LeftElbow,
        Landmark::RightElbow,
        Landmark::LeftWrist,
        Landmark::RightWrist,
        Landmark::LeftHip,
        Landmark::RightHip,
        Landmark::LeftKnee,
        Landmark::RightKnee,
        Landmark::LeftAnkle,
        Landmark::RightAnkle,
    ];

    /// The five face landmarks.
    pub const HEAD: [Landmark; 5] = [
        Landmark::Nose,
        Landmark::LeftEye,
        Landmark::RightEye,
        Landmark::LeftEar,
        Landmark::RightEar,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }
}

/// A 2D pixel coordinate. Smaller `y` is higher in the image.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    /// Sentinel for a landmark the model did not report.
    pub const MISSING: Point = Point {
        x: f32::NAN,
        y: f32::NAN,
    };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn is_missing(&self) -> bool {
        !(self.x.is_finite() && self.y.is_finite())
    }
}

/// Body side, used to label left/right signals.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// Landmarks of one side's limbs.
#[derive(Clone, Copy, Debug)]
pub struct Limb {
    pub shoulder: Landmark,
    pub elbow: Landmark,
    pub wrist: Landmark,
    pub hip: Landmark,
    pub knee: Landmark,
    pub ankle: Landmark,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Left, Side::Right];

    pub const fn limb(self) -> Limb {
        match self {
            Side::Left => Limb {
                shoulder: Landmark::LeftShoulder,
                elbow: Landmark::LeftElbow,
                wrist: Landmark::LeftWrist,
                hip: Landmark::LeftHip,
                knee: Landmark::LeftKnee,
                ankle: Landmark::LeftAnkle,
            },
            Side::Right => Limb {
                shoulder: Landmark::RightShoulder,
                elbow: Landmark::RightElbow,
                wrist: Landmark::RightWrist,
                hip: Landmark::RightHip,
                knee: Landmark::RightKnee,
                ankle: Landmark::RightAnkle,
            },
        }
    }
}

/// One detected person: 17 keypoints and optional confidences.
#[derive(Clone, Debug, PartialEq)]
pub struct PersonPose {
    keypoints: [Point; KEYPOINT_COUNT],
    confidence: Option<[f32; KEYPOINT_COUNT]>,
}

impl PersonPose {
    pub fn new(keypoints: [Point; KEYPOINT_COUNT]) -> Self {
        Self {
            keypoints,
            confidence: None,
        }
    }

    /// Build from upstream rows; `None` entries become [`Point::MISSING`].
    pub fn from_rows(rows: &[Option<[f32; 2]>]) -> Result<Self> {
        if rows.len() != KEYPOINT_COUNT {
            return Err(anyhow!(
                "pose must have exactly {} keypoints, got {}",
                KEYPOINT_COUNT,
                rows.len()
            ));
        }
        let mut keypoints = [Point::MISSING; KEYPOINT_COUNT];
        for (slot, row) in keypoints.iter_mut().zip(rows) {
            if let Some([x, y]) = row {
                *slot = Point::new(*x, *y);
            }
        }
        Ok(Self::new(keypoints))
    }

    /// Attach a parallel confidence array. Values must lie in [0, 1].
    pub fn with_confidence(mut self, confidence: &[f32]) -> Result<Self> {
        if confidence.len() != KEYPOINT_COUNT {
            return Err(anyhow!(
                "confidence must have exactly {} entries, got {}",
                KEYPOINT_COUNT,
                confidence.len()
            ));
        }
        let mut values = [0.0f32; KEYPOINT_COUNT];
        for (slot, &c) in values.iter_mut().zip(confidence) {
            if !(0.0..=1.0).contains(&c) {
                return Err(anyhow!("keypoint confidence {} out of [0, 1]", c));
            }
            *slot = c;
        }
        self.confidence = Some(values);
        Ok(self)
    }

    pub fn keypoints(&self) -> &[Point; KEYPOINT_COUNT] {
        &self.keypoints
    }

    pub fn confidence(&self) -> Option<&[f32; KEYPOINT_COUNT]> {
        self.confidence.as_ref()
    }

    pub fn get(&self, landmark: Landmark) -> Point {
        self.keypoints[landmark.index()]
    }

    pub fn midpoint(&self, a: Landmark, b: Landmark) -> Point {
        let (a, b) = (self.get(a), self.get(b));
        Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
    }

    pub fn shoulder_center(&self) -> Point {
        self.midpoint(Landmark::LeftShoulder, Landmark::RightShoulder)
    }

    pub fn hip_center(&self) -> Point {
        self.midpoint(Landmark::LeftHip, Landmark::RightHip)
    }

    /// Shoulder-midpoint to hip-midpoint distance.
    pub fn torso_height(&self) -> f32 {
        distance(self.shoulder_center(), self.hip_center())
    }

    pub fn shoulder_width(&self) -> f32 {
        distance(self.get(Landmark::LeftShoulder), self.get(Landmark::RightShoulder))
    }

    /// Count of landmarks with confidence strictly above `threshold`.
    /// Without a confidence array every landmark counts.
    pub fn visible_count(&self, threshold: f32) -> usize {
        match &self.confidence {
            Some(conf) => conf.iter().filter(|&&c| c > threshold).count(),
            None => KEYPOINT_COUNT,
        }
    }
}

/// Axis-aligned box in pixels, `(x1, y1)` top-left to `(x2, y2)` bottom-right.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl BoundingBox {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn diagonal(&self) -> f32 {
        (self.x2 - self.x1).hypot(self.y2 - self.y1)
    }

    /// Smallest box covering both.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
            x2: self.x2.max(other.x2),
            y2: self.y2.max(other.y2),
        }
    }
}

/// Everything one analysis call receives: poses with their boxes, index-aligned.
#[derive(Clone, Debug, Default)]
pub struct FrameObservation {
    pub persons: Vec<PersonPose>,
    pub boxes: Vec<BoundingBox>,
}

impl FrameObservation {
    pub fn new(persons: Vec<PersonPose>, boxes: Vec<BoundingBox>) -> Result<Self> {
        if persons.len() != boxes.len() {
            return Err(anyhow!(
                "observation has {} poses but {} bounding boxes",
                persons.len(),
                boxes.len()
            ));
        }
        Ok(Self { persons, boxes })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.persons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.persons.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows() -> Vec<Option<[f32; 2]>> {
        (0..KEYPOINT_COUNT)
            .map(|i| Some([i as f32, 2.0 * i as f32]))
            .collect()
    }

    #[test]
    fn landmark_order_matches_model_schema() {
        for (i, landmark) in Landmark::ALL.iter().enumerate() {
            assert_eq!(landmark.index(), i);
        }
        assert_eq!(Landmark::LeftWrist.index(), 9);
        assert_eq!(Landmark::RightAnkle.index(), 16);
    }

    #[test]
    fn from_rows_requires_seventeen_keypoints() {
        assert!(PersonPose::from_rows(&rows()[..16]).is_err());
        let pose = PersonPose::from_rows(&rows()).unwrap();
        assert_eq!(pose.get(Landmark::RightEye), Point::new(2.0, 4.0));
    }

    #[test]
    fn missing_rows_become_sentinels_not_gaps() {
        let mut rows = rows();
        rows[Landmark::Nose.index()] = None;
        let pose = PersonPose::from_rows(&rows).unwrap();
        assert_eq!(pose.keypoints().len(), KEYPOINT_COUNT);
        assert!(pose.get(Landmark::Nose).is_missing());
        assert!(!pose.get(Landmark::LeftEye).is_missing());
    }

    #[test]
    fn confidence_is_validated() {
        let pose = PersonPose::from_rows(&rows()).unwrap();
        assert!(pose.clone().with_confidence(&[0.5; 3]).is_err());
        assert!(pose.clone().with_confidence(&[1.5; KEYPOINT_COUNT]).is_err());

        let mut conf = [0.9f32; KEYPOINT_COUNT];
        conf[0] = 0.4;
        conf[1] = 0.1;
        let pose = pose.with_confidence(&conf).unwrap();
        assert_eq!(pose.visible_count(0.4), KEYPOINT_COUNT - 2);
    }

    #[test]
    fn derived_body_measures() {
        let mut points = [Point::new(0.0, 0.0); KEYPOINT_COUNT];
        points[Landmark::LeftShoulder.index()] = Point::new(70.0, 300.0);
        points[Landmark::RightShoulder.index()] = Point::new(130.0, 300.0);
        points[Landmark::LeftHip.index()] = Point::new(85.0, 400.0);
        points[Landmark::RightHip.index()] = Point::new(115.0, 400.0);
        let pose = PersonPose::new(points);
        assert_eq!(pose.shoulder_width(), 60.0);
        assert_eq!(pose.torso_height(), 100.0);
        assert_eq!(pose.hip_center(), Point::new(100.0, 400.0));
    }

    #[test]
    fn bounding_box_union_and_diagonal() {
        let a = BoundingBox::new(0.0, 0.0, 120.0, 160.0);
        let b = BoundingBox::new(60.0, 40.0, 90.0, 100.0);
        assert_eq!(a.diagonal(), 200.0);
        assert_eq!(a.union(&b), a);
    }

    #[test]
    fn observation_requires_one_box_per_pose() {
        let pose = PersonPose::from_rows(&rows()).unwrap();
        assert!(FrameObservation::new(vec![pose.clone()], vec![]).is_err());
        let obs =
            FrameObservation::new(vec![pose], vec![BoundingBox::new(0.0, 0.0, 1.0, 1.0)]).unwrap();
        assert_eq!(obs.len(), 1);
        assert!(FrameObservation::empty().is_empty());
    }
}
