//! Pose record ingestion.
//!
//! Upstream pose models emit one JSON record per frame. This module owns the
//! wire shape of those records and their conversion into a validated
//! `FrameObservation`. Sources:
//! - JSON Lines from a local file or stdin (`file`)
//!
//! The ingestion layer MUST NOT:
//! - Fetch remote URLs
//! - Retain records beyond handoff to the detector

pub mod file;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use crate::pose::{BoundingBox, FrameObservation, PersonPose};

pub use file::{FileConfig, JsonlSource};

/// One frame as produced by a pose-model wrapper.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PoseRecord {
    /// Logical stream (camera) id. Records without one share the default stream.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<String>,
    #[serde(default)]
    pub persons: Vec<PersonRecord>,
}

/// One detected person: 17 landmarks (`null` when not located), optional
/// per-landmark confidence, and the detection box.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PersonRecord {
    pub keypoints: Vec<Option<[f32; 2]>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<Vec<f32>>,
    pub bbox: [f32; 4],
}

impl PersonRecord {
    fn to_pose(&self) -> Result<PersonPose> {
        let pose = PersonPose::from_rows(&self.keypoints)?;
        match &self.confidence {
            Some(confidence) => pose.with_confidence(confidence),
            None => Ok(pose),
        }
    }

    fn to_box(&self) -> Result<BoundingBox> {
        let [x1, y1, x2, y2] = self.bbox;
        if !self.bbox.iter().all(|v| v.is_finite()) {
            return Err(anyhow!("bbox has non-finite coordinates"));
        }
        if x2 < x1 || y2 < y1 {
            return Err(anyhow!(
                "bbox corners out of order: ({}, {}) .. ({}, {})",
                x1,
                y1,
                x2,
                y2
            ));
        }
        Ok(BoundingBox::new(x1, y1, x2, y2))
    }
}

impl PoseRecord {
    pub fn stream_id(&self) -> &str {
        self.stream.as_deref().unwrap_or(crate::streams::DEFAULT_STREAM)
    }

    /// Validate every person and build the frame.
    pub fn into_observation(self) -> Result<FrameObservation> {
        let mut persons = Vec::with_capacity(self.persons.len());
        let mut boxes = Vec::with_capacity(self.persons.len());
        for (index, person) in self.persons.iter().enumerate() {
            persons.push(
                person
                    .to_pose()
                    .with_context(|| format!("person {}", index))?,
            );
            boxes.push(person.to_box().with_context(|| format!("person {}", index))?);
        }
        FrameObservation::new(persons, boxes)
    }
}
