//! Pose Threat Kernel
//!
//! A geometry-driven rule engine that turns per-frame body-pose keypoints into
//! a scored, severity-leveled crime classification.
//!
//! # Architecture
//!
//! Each call to [`ThreatDetector::analyze`] runs the same pipeline:
//!
//! 1. **Extraction**: every person's 17 landmarks become discrete signals
//!    (`PUNCH_LEFT`, `FALLEN`, ...), in parallel over persons.
//! 2. **Interaction**: every unordered pair of persons is checked for contact,
//!    strikes, grabs and pursuit; three or more persons are checked for a ring.
//! 3. **Temporal update**: the frame's signal set is appended to a bounded
//!    window; signals present in every held frame are "sustained".
//! 4. **Scoring**: weighted sum with crowd and sustain multipliers, in [0, 100].
//! 5. **Classification**: first match in an ordered rule table.
//!
//! The window is the only state that survives a call. Hold one detector per
//! stream (see [`streams::StreamRegistry`]); never share one across streams.
//!
//! # Module Structure
//!
//! - `pose`, `geometry`: input types and pure measurements
//! - `detect`: per-person and pairwise signal extraction
//! - `temporal`, `score`, `classify`: the per-call pipeline stages
//! - `policy`: optional result rewriting applied by callers
//! - `config`, `ingest`, `streams`: the daemon's outer layers

use serde::{Deserialize, Serialize};

pub mod classify;
pub mod config;
pub mod detect;
pub mod geometry;
pub mod ingest;
pub mod policy;
pub mod pose;
pub mod score;
pub mod streams;
pub mod temporal;

pub use classify::{classify, CrimeType, ThreatLevel};
pub use config::DetectorConfig;
pub use detect::{extract_frame, Activity, ExtractorSettings, Signal, TagSet};
pub use policy::{PassThrough, PostValidation, ResultPolicy};
pub use pose::{BoundingBox, FrameObservation, Landmark, PersonPose, Point, KEYPOINT_COUNT};
pub use score::{ThreatScorer, MAX_SCORE};
pub use streams::{StreamRegistry, DEFAULT_STREAM};
pub use temporal::SignalHistory;

// -------------------- Classification Result --------------------

/// Flat, serializable outcome of one analysis call.
///
/// `signals`, `activities` and `sustained_signals` are deduplicated and sorted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub persons_detected: usize,
    pub signals: Vec<Signal>,
    pub activities: Vec<Activity>,
    #[serde(default)]
    pub sustained_signals: Vec<Signal>,
    pub threat_score: f32,
    pub crime_detected: bool,
    pub crime_type: CrimeType,
    pub threat_level: ThreatLevel,
    /// `threat_score / 100`.
    pub confidence: f32,
}

impl ClassificationResult {
    /// Canonical result for a frame with nothing in it.
    pub fn empty() -> Self {
        Self {
            persons_detected: 0,
            signals: Vec::new(),
            activities: Vec::new(),
            sustained_signals: Vec::new(),
            threat_score: 0.0,
            crime_detected: false,
            crime_type: CrimeType::Normal,
            threat_level: ThreatLevel::Low,
            confidence: 0.0,
        }
    }
}

impl Default for ClassificationResult {
    fn default() -> Self {
        Self::empty()
    }
}

// -------------------- Threat Detector --------------------

/// Per-stream analysis facade. Owns the stream's signal history.
#[derive(Clone, Debug)]
pub struct ThreatDetector {
    settings: ExtractorSettings,
    scorer: ThreatScorer,
    history: SignalHistory,
    crime_threshold: f32,
}

impl ThreatDetector {
    pub fn new() -> Self {
        Self::from_config(&DetectorConfig::default())
    }

    pub fn from_config(config: &DetectorConfig) -> Self {
        Self {
            settings: config.quality,
            scorer: ThreatScorer::new()
                .with_overrides(&config.signal_weights, &config.activity_weights),
            history: SignalHistory::with_capacity(
                config.history_capacity,
                config.min_sustained_frames,
            ),
            crime_threshold: config.crime_threshold,
        }
    }

    pub fn crime_threshold(&self) -> f32 {
        self.crime_threshold
    }

    pub fn history(&self) -> &SignalHistory {
        &self.history
    }

    /// Forget every held frame.
    pub fn reset(&mut self) {
        self.history.clear();
    }

    pub fn analyze_frame(&mut self, frame: &FrameObservation) -> ClassificationResult {
        self.analyze(&frame.persons, &frame.boxes)
    }

    /// Analyze one frame. `boxes` is index-aligned with `persons`.
    ///
    /// Never fails: low-quality poses contribute nothing, degenerate geometry
    /// falls back to neutral values, and an empty frame still advances the
    /// history window.
    pub fn analyze(
        &mut self,
        persons: &[PersonPose],
        boxes: &[BoundingBox],
    ) -> ClassificationResult {
        let mut tags = extract_frame(persons, boxes, &self.settings);

        self.history.push(tags.signals.clone());
        let sustained = self.history.sustained();
        for signal in &sustained {
            tags.insert(*signal);
        }

        let persons_detected = persons.len();
        let threat_score = self
            .scorer
            .score(&tags, persons_detected, !sustained.is_empty());
        let (crime_type, threat_level) = classify(&tags, persons_detected);
        let crime_detected = threat_score >= self.crime_threshold;

        log::debug!(
            "analyzed {} person(s): score={:.1} crime={} level={} signals={}",
            persons_detected,
            threat_score,
            crime_type,
            threat_level,
            tags.signals.len()
        );

        ClassificationResult {
            persons_detected,
            signals: tags.signals.into_iter().collect(),
            activities: tags.activities.into_iter().collect(),
            sustained_signals: sustained.into_iter().collect(),
            threat_score,
            crime_detected,
            crime_type,
            threat_level,
            confidence: threat_score / MAX_SCORE,
        }
    }
}

impl Default for ThreatDetector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::detect::person::fixtures::*;
    use super::*;

    #[test]
    fn empty_frame_gives_canonical_result() {
        let mut detector = ThreatDetector::new();
        assert_eq!(detector.analyze(&[], &[]), ClassificationResult::empty());
        assert_eq!(detector.history().len(), 1);
    }

    #[test]
    fn punch_crosses_threshold_once_sustained() {
        let mut detector = ThreatDetector::new();
        let persons = [punching_left()];
        let boxes = [person_box()];

        let first = detector.analyze(&persons, &boxes);
        assert_eq!(first.threat_score, 45.0);
        assert!(!first.crime_detected);
        assert!(first.sustained_signals.is_empty());
        assert_eq!(first.crime_type, CrimeType::SuspiciousActivity);

        detector.analyze(&persons, &boxes);
        let third = detector.analyze(&persons, &boxes);
        assert!((third.threat_score - 54.0).abs() < 1e-4);
        assert!(third.crime_detected);
        assert_eq!(third.sustained_signals, vec![Signal::PunchLeft]);
        assert!((third.confidence - 0.54).abs() < 1e-4);
    }

    #[test]
    fn custom_threshold_and_reset() {
        let config = DetectorConfig {
            crime_threshold: 40.0,
            ..DetectorConfig::default()
        };
        let mut detector = ThreatDetector::from_config(&config);
        let result = detector.analyze(&[punching_left()], &[person_box()]);
        assert!(result.crime_detected);
        detector.reset();
        assert!(detector.history().is_empty());
    }

    #[test]
    fn score_equal_to_threshold_is_a_crime() {
        let at = DetectorConfig {
            crime_threshold: 45.0,
            ..DetectorConfig::default()
        };
        let result =
            ThreatDetector::from_config(&at).analyze(&[punching_left()], &[person_box()]);
        assert_eq!(result.threat_score, 45.0);
        assert!(result.crime_detected);

        let above = DetectorConfig {
            crime_threshold: 45.5,
            ..DetectorConfig::default()
        };
        let result =
            ThreatDetector::from_config(&above).analyze(&[punching_left()], &[person_box()]);
        assert!(!result.crime_detected);
    }

    #[test]
    fn result_serializes_as_flat_record() {
        let mut detector = ThreatDetector::new();
        let result = detector.analyze(&[choking_right()], &[person_box()]);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["crime_type"], "Choking / Attempted Murder");
        assert_eq!(json["threat_level"], "CRITICAL");
        assert_eq!(json["signals"][0], "GRAB_NECK_RIGHT");
        assert_eq!(json["persons_detected"], 1);
    }
}
