use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

use crate::detect::ExtractorSettings;
use crate::pose::KEYPOINT_COUNT;
use crate::score::MAX_SCORE;
use crate::temporal::{DEFAULT_HISTORY_FRAMES, DEFAULT_MIN_SUSTAINED_FRAMES};

const DEFAULT_CRIME_THRESHOLD: f32 = 50.0;
const DEFAULT_KEYPOINT_CONFIDENCE: f32 = 0.4;
const DEFAULT_MIN_VISIBLE_KEYPOINTS: usize = 10;
const DEFAULT_MIN_BODY_PX: f32 = 10.0;

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct DetectorConfigFile {
    crime_threshold: Option<f32>,
    temporal: Option<TemporalConfigFile>,
    quality: Option<QualityConfigFile>,
    weights: Option<WeightsConfigFile>,
    post_validation: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct TemporalConfigFile {
    history_capacity: Option<usize>,
    min_sustained_frames: Option<usize>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct QualityConfigFile {
    keypoint_confidence: Option<f32>,
    min_visible_keypoints: Option<usize>,
    min_body_px: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct WeightsConfigFile {
    signals: Option<BTreeMap<String, f32>>,
    activities: Option<BTreeMap<String, f32>>,
}

/// Detector settings: defaults, then an optional file, then environment.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorConfig {
    /// Score at or above which `crime_detected` is set.
    pub crime_threshold: f32,
    pub history_capacity: usize,
    pub min_sustained_frames: usize,
    pub quality: ExtractorSettings,
    pub signal_weights: BTreeMap<String, f32>,
    pub activity_weights: BTreeMap<String, f32>,
    /// Apply the post-validation policy to every result.
    pub post_validation: bool,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            crime_threshold: DEFAULT_CRIME_THRESHOLD,
            history_capacity: DEFAULT_HISTORY_FRAMES,
            min_sustained_frames: DEFAULT_MIN_SUSTAINED_FRAMES,
            quality: ExtractorSettings {
                keypoint_confidence: DEFAULT_KEYPOINT_CONFIDENCE,
                min_visible_keypoints: DEFAULT_MIN_VISIBLE_KEYPOINTS,
                min_body_px: DEFAULT_MIN_BODY_PX,
            },
            signal_weights: BTreeMap::new(),
            activity_weights: BTreeMap::new(),
            post_validation: false,
        }
    }
}

impl DetectorConfig {
    /// Load using `POSE_THREAT_CONFIG` (if set) and `POSE_THREAT_*` overrides.
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("POSE_THREAT_CONFIG").ok();
        Self::load_from(config_path.as_deref().map(Path::new))
    }

    /// Load from an explicit file path, then apply environment overrides.
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let file_cfg = match path {
            Some(path) => read_config_file(path)?,
            None => DetectorConfigFile::default(),
        };
        let mut cfg = Self::from_file(file_cfg);
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: DetectorConfigFile) -> Self {
        let defaults = Self::default();
        let temporal = file.temporal.unwrap_or_default();
        let quality = file.quality.unwrap_or_default();
        let weights = file.weights.unwrap_or_default();
        Self {
            crime_threshold: file.crime_threshold.unwrap_or(defaults.crime_threshold),
            history_capacity: temporal
                .history_capacity
                .unwrap_or(defaults.history_capacity),
            min_sustained_frames: temporal
                .min_sustained_frames
                .unwrap_or(defaults.min_sustained_frames),
            quality: ExtractorSettings {
                keypoint_confidence: quality
                    .keypoint_confidence
                    .unwrap_or(defaults.quality.keypoint_confidence),
                min_visible_keypoints: quality
                    .min_visible_keypoints
                    .unwrap_or(defaults.quality.min_visible_keypoints),
                min_body_px: quality.min_body_px.unwrap_or(defaults.quality.min_body_px),
            },
            signal_weights: weights.signals.unwrap_or_default(),
            activity_weights: weights.activities.unwrap_or_default(),
            post_validation: file.post_validation.unwrap_or(defaults.post_validation),
        }
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(threshold) = std::env::var("POSE_THREAT_CRIME_THRESHOLD") {
            self.crime_threshold = threshold.trim().parse().map_err(|_| {
                anyhow!("POSE_THREAT_CRIME_THRESHOLD must be a number between 0 and 100")
            })?;
        }
        if let Ok(history) = std::env::var("POSE_THREAT_HISTORY") {
            self.history_capacity = history
                .trim()
                .parse()
                .map_err(|_| anyhow!("POSE_THREAT_HISTORY must be a positive integer"))?;
        }
        if let Ok(sustained) = std::env::var("POSE_THREAT_MIN_SUSTAINED") {
            self.min_sustained_frames = sustained
                .trim()
                .parse()
                .map_err(|_| anyhow!("POSE_THREAT_MIN_SUSTAINED must be a positive integer"))?;
        }
        if let Ok(flag) = std::env::var("POSE_THREAT_POST_VALIDATE") {
            if !flag.trim().is_empty() {
                self.post_validation = parse_flag(&flag).ok_or_else(|| {
                    anyhow!("POSE_THREAT_POST_VALIDATE must be one of 1, 0, true, false")
                })?;
            }
        }
        Ok(())
    }

    /// Check every field's range. Call again after applying CLI overrides.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=MAX_SCORE).contains(&self.crime_threshold) {
            return Err(anyhow!(
                "crime_threshold must be within [0, {}], got {}",
                MAX_SCORE,
                self.crime_threshold
            ));
        }
        if self.history_capacity == 0 {
            return Err(anyhow!("temporal.history_capacity must be at least 1"));
        }
        if self.min_sustained_frames == 0 || self.min_sustained_frames > self.history_capacity {
            return Err(anyhow!(
                "temporal.min_sustained_frames must be within 1..={}, got {}",
                self.history_capacity,
                self.min_sustained_frames
            ));
        }
        if !(0.0..=1.0).contains(&self.quality.keypoint_confidence) {
            return Err(anyhow!("quality.keypoint_confidence must be within [0, 1]"));
        }
        if self.quality.min_visible_keypoints > KEYPOINT_COUNT {
            return Err(anyhow!(
                "quality.min_visible_keypoints must be at most {}",
                KEYPOINT_COUNT
            ));
        }
        if self.quality.min_body_px.is_nan() || self.quality.min_body_px < 0.0 {
            return Err(anyhow!("quality.min_body_px must be non-negative"));
        }
        for (tag, weight) in self.signal_weights.iter().chain(&self.activity_weights) {
            if !(weight.is_finite() && *weight >= 0.0) {
                return Err(anyhow!("weight for {} must be a non-negative number", tag));
            }
        }
        Ok(())
    }
}

fn read_config_file(path: &Path) -> Result<DetectorConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
    let cfg = if is_toml {
        toml::from_str(&raw).map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?
    } else {
        serde_json::from_str(&raw)
            .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?
    };
    Ok(cfg)
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
