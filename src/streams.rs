use std::collections::HashMap;

use crate::config::DetectorConfig;
use crate::pose::FrameObservation;
use crate::{ClassificationResult, ThreatDetector};

/// Stream id used for records that do not name one.
pub const DEFAULT_STREAM: &str = "default";

/// One detector per stream, created on first use.
///
/// Detectors never share history, so sustained signals from one camera cannot
/// leak into another camera's score.
pub struct StreamRegistry {
    config: DetectorConfig,
    detectors: HashMap<String, ThreatDetector>,
}

impl StreamRegistry {
    pub fn new(config: DetectorConfig) -> Self {
        Self {
            config,
            detectors: HashMap::new(),
        }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Get the stream's detector, creating it if needed.
    pub fn detector(&mut self, stream: &str) -> &mut ThreatDetector {
        let config = &self.config;
        self.detectors.entry(stream.to_string()).or_insert_with(|| {
            log::info!("stream '{}' registered", stream);
            ThreatDetector::from_config(config)
        })
    }

    pub fn get(&self, stream: &str) -> Option<&ThreatDetector> {
        self.detectors.get(stream)
    }

    /// Analyze a frame on the named stream.
    pub fn analyze(&mut self, stream: &str, frame: &FrameObservation) -> ClassificationResult {
        self.detector(stream).analyze_frame(frame)
    }

    /// Drop a stream and its history. Returns whether it existed.
    pub fn remove(&mut self, stream: &str) -> bool {
        self.detectors.remove(stream).is_some()
    }

    /// Registered stream ids, sorted.
    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self.detectors.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.detectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detectors.is_empty()
    }
}

impl Default for StreamRegistry {
    fn default() -> Self {
        Self::new(DetectorConfig::default())
    }
}
