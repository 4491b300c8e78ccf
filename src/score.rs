//! Threat scoring.
//!
//! A frame's score is the weighted sum of its deduplicated signals and
//! activities, scaled by crowd size and by a bonus when signals persist across
//! the temporal window, then clamped to [0, 100].

use std::collections::{BTreeMap, HashMap};

use crate::detect::{Activity, Signal, TagSet};

pub const MAX_SCORE: f32 = 100.0;

/// Weight for tags missing from both tables.
pub const DEFAULT_TAG_WEIGHT: f32 = 5.0;

const GROUP_MULTIPLIER: f32 = 1.3;
const PAIR_MULTIPLIER: f32 = 1.1;
const SUSTAINED_BONUS: f32 = 1.2;

const SIGNAL_WEIGHTS: &[(Signal, f32)] = &[
    (Signal::GrabNeckLeft, 40.0),
    (Signal::GrabNeckRight, 40.0),
    (Signal::WeaponThreatLeft, 35.0),
    (Signal::WeaponThreatRight, 35.0),
    (Signal::AssaultHead, 35.0),
    (Signal::PunchLeft, 25.0),
    (Signal::PunchRight, 25.0),
    (Signal::KickLeft, 25.0),
    (Signal::KickRight, 25.0),
    (Signal::Grabbing, 25.0),
    (Signal::Fallen, 20.0),
    (Signal::FollowingChasing, 15.0),
    (Signal::CrowdFormation, 15.0),
    (Signal::HandsUp, 15.0),
    (Signal::CloseContact, 10.0),
    (Signal::Running, 10.0),
    (Signal::Crouching, 5.0),
];

const ACTIVITY_WEIGHTS: &[(Activity, f32)] = &[
    (Activity::Choking, 30.0),
    (Activity::PhysicalAssault, 30.0),
    (Activity::ThreateningGesture, 25.0),
    (Activity::AggressiveGesture, 20.0),
    (Activity::Restraining, 20.0),
    (Activity::Chasing, 15.0),
    (Activity::PersonDown, 15.0),
    (Activity::GroupGathering, 10.0),
    (Activity::Surrender, 10.0),
    (Activity::Running, 5.0),
    (Activity::Crouching, 5.0),
    (Activity::Proximity, 5.0),
];

/// Weighted-sum scorer with per-tag lookup tables.
#[derive(Clone, Debug)]
pub struct ThreatScorer {
    signal_weights: HashMap<String, f32>,
    activity_weights: HashMap<String, f32>,
}

impl ThreatScorer {
    pub fn new() -> Self {
        Self {
            signal_weights: SIGNAL_WEIGHTS
                .iter()
                .map(|(s, w)| (s.as_str().to_string(), *w))
                .collect(),
            activity_weights: ACTIVITY_WEIGHTS
                .iter()
                .map(|(a, w)| (a.as_str().to_string(), *w))
                .collect(),
        }
    }

    /// Replace individual table entries, keyed by tag name.
    pub fn with_overrides(
        mut self,
        signals: &BTreeMap<String, f32>,
        activities: &BTreeMap<String, f32>,
    ) -> Self {
        for (tag, weight) in signals {
            self.signal_weights.insert(tag.clone(), *weight);
        }
        for (tag, weight) in activities {
            self.activity_weights.insert(tag.clone(), *weight);
        }
        self
    }

    pub fn signal_weight(&self, tag: &str) -> f32 {
        self.signal_weights
            .get(tag)
            .copied()
            .unwrap_or(DEFAULT_TAG_WEIGHT)
    }

    pub fn activity_weight(&self, tag: &str) -> f32 {
        self.activity_weights
            .get(tag)
            .copied()
            .unwrap_or(DEFAULT_TAG_WEIGHT)
    }

    /// Score arbitrary tag names. Callers must pass each tag once.
    pub fn score_tags<'a>(
        &self,
        signals: impl IntoIterator<Item = &'a str>,
        activities: impl IntoIterator<Item = &'a str>,
        persons: usize,
        sustained: bool,
    ) -> f32 {
        let base: f32 = signals.into_iter().map(|s| self.signal_weight(s)).sum::<f32>()
            + activities
                .into_iter()
                .map(|a| self.activity_weight(a))
                .sum::<f32>();

        let mut score = base * crowd_multiplier(persons);
        if sustained {
            score *= SUSTAINED_BONUS;
        }
        score.clamp(0.0, MAX_SCORE)
    }

    /// Score one frame's tags.
    ///
    /// `sustained` is true when the temporal window is full enough and its
    /// intersection is non-empty.
    pub fn score(&self, tags: &TagSet, persons: usize, sustained: bool) -> f32 {
        self.score_tags(
            tags.signals.iter().map(|s| s.as_str()),
            tags.activities.iter().map(|a| a.as_str()),
            persons,
            sustained,
        )
    }
}

impl Default for ThreatScorer {
    fn default() -> Self {
        Self::new()
    }
}

fn crowd_multiplier(persons: usize) -> f32 {
    match persons {
        0 | 1 => 1.0,
        2 => PAIR_MULTIPLIER,
        _ => GROUP_MULTIPLIER,
    }
}
